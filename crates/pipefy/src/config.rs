//! Connection settings for the Pipefy API.

use std::time::Duration;

use crate::PipefyError;

pub const DEFAULT_ENDPOINT: &str = "https://api.pipefy.com/graphql";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const ENV_ENDPOINT: &str = "PIPEFY_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PIPEFY_TIMEOUT_SECS";

/// Tuning knobs for the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipefyConfig {
    /// GraphQL endpoint every request is posted to.
    pub endpoint: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for PipefyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl PipefyConfig {
    /// Defaults overridden by `PIPEFY_API_URL` and `PIPEFY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, PipefyError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PipefyConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PipefyError> {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                PipefyError::InvalidConfig(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds, got '{raw}'"))
            })?;
            if secs == 0 {
                return Err(PipefyError::InvalidConfig(format!(
                    "{ENV_TIMEOUT_SECS} must be greater than zero"
                )));
            }
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// The endpoint must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), PipefyError> {
        let url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| PipefyError::InvalidConfig(format!("invalid endpoint '{}': {e}", self.endpoint)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PipefyError::InvalidConfig(format!(
                "endpoint must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = PipefyConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipefyConfig::default());
        assert_eq!(config.endpoint, "https://api.pipefy.com/graphql");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides() {
        let config = PipefyConfig::from_lookup(lookup(&[
            (ENV_ENDPOINT, "http://localhost:4000/graphql"),
            (ENV_TIMEOUT_SECS, "5"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint, "http://localhost:4000/graphql");
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_timeout_is_rejected() {
        for raw in ["soon", "0"] {
            assert!(matches!(
                PipefyConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, raw)])),
                Err(PipefyError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn non_http_endpoint_is_rejected() {
        assert!(PipefyConfig::from_lookup(lookup(&[(ENV_ENDPOINT, "ftp://pipefy.com")])).is_err());
        assert!(PipefyConfig::from_lookup(lookup(&[(ENV_ENDPOINT, "not a url")])).is_err());
    }
}

//! The Pipefy personal access token.

use nodes::ExecutionContext;

use crate::PipefyError;

/// Name of the credential type the node requires.
pub const CREDENTIAL_NAME: &str = "pipefyApi";

/// Fallback secret key for hosts that store tokens under flat names.
pub const ACCESS_TOKEN_SECRET: &str = "pipefy_access_token";

/// Bearer token used for every API call.
#[derive(Clone, PartialEq, Eq)]
pub struct PipefyCredentials {
    access_token: String,
}

impl PipefyCredentials {
    /// # Errors
    /// [`PipefyError::MissingCredentials`] for a blank token.
    pub fn new(access_token: impl Into<String>) -> Result<Self, PipefyError> {
        let access_token = access_token.into().trim().to_string();
        if access_token.is_empty() {
            return Err(PipefyError::MissingCredentials);
        }
        Ok(Self { access_token })
    }

    /// Read the token from the workflow's secrets.
    ///
    /// A blank `pipefyApi` secret counts as absent, so the flat key is tried next.
    pub fn from_context(ctx: &ExecutionContext) -> Result<Self, PipefyError> {
        let lookup = |key| ctx.secret(key).filter(|token| !token.trim().is_empty());
        lookup(CREDENTIAL_NAME)
            .or_else(|| lookup(ACCESS_TOKEN_SECRET))
            .ok_or(PipefyError::MissingCredentials)
            .and_then(|token| Self::new(token))
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl std::fmt::Debug for PipefyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipefyCredentials")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx(secrets: &[(&str, &str)]) -> ExecutionContext {
        ExecutionContext::standalone(
            secrets
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn reads_named_credential_first() {
        let creds = PipefyCredentials::from_context(&ctx(&[
            (CREDENTIAL_NAME, "primary"),
            (ACCESS_TOKEN_SECRET, "fallback"),
        ]))
        .unwrap();
        assert_eq!(creds.access_token(), "primary");
    }

    #[test]
    fn falls_back_to_flat_secret() {
        let creds = PipefyCredentials::from_context(&ctx(&[(ACCESS_TOKEN_SECRET, "fallback")])).unwrap();
        assert_eq!(creds.access_token(), "fallback");
    }

    #[test]
    fn blank_named_secret_falls_back() {
        let creds = PipefyCredentials::from_context(&ctx(&[
            (CREDENTIAL_NAME, "   "),
            (ACCESS_TOKEN_SECRET, "real"),
        ]))
        .unwrap();
        assert_eq!(creds.access_token(), "real");
    }

    #[test]
    fn missing_or_blank_token_is_rejected() {
        assert!(matches!(
            PipefyCredentials::from_context(&ctx(&[])),
            Err(PipefyError::MissingCredentials)
        ));
        assert!(matches!(
            PipefyCredentials::from_context(&ctx(&[(CREDENTIAL_NAME, " \t ")])),
            Err(PipefyError::MissingCredentials)
        ));
        assert!(matches!(
            PipefyCredentials::new("   "),
            Err(PipefyError::MissingCredentials)
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let creds = PipefyCredentials::new("tok_123").unwrap();
        assert!(!format!("{creds:?}").contains("tok_123"));
    }
}

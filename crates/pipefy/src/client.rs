//! Transport and response handling for the Pipefy GraphQL endpoint.
//!
//! [`GraphQlTransport`] posts one document and hands back the raw response
//! body; [`PipefyClient`] binds a transport to a token and unwraps the
//! `data` / `errors` envelope.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::graphql::Document;
use crate::{PipefyConfig, PipefyCredentials, PipefyError};

/// Longest slice of an error body kept in [`PipefyError::HttpStatus`].
const MAX_ERROR_BODY: usize = 512;

/// Sends a GraphQL document and returns the decoded response body.
#[async_trait]
pub trait GraphQlTransport: Send + Sync {
    async fn send(
        &self,
        document: &str,
        credentials: &PipefyCredentials,
    ) -> Result<Value, PipefyError>;
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// POSTs `{"query": …}` to the configured endpoint with a bearer token.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(config: &PipefyConfig) -> Result<Self, PipefyError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphQlTransport for HttpTransport {
    #[instrument(skip_all, fields(endpoint = %self.endpoint))]
    async fn send(
        &self,
        document: &str,
        credentials: &PipefyCredentials,
    ) -> Result<Value, PipefyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(credentials.access_token())
            .json(&json!({ "query": document }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Pipefy response received");

        if !status.is_success() {
            return Err(PipefyError::HttpStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            });
        }

        serde_json::from_str(&body).map_err(|e| PipefyError::InvalidResponse(e.to_string()))
    }
}

fn truncate(body: &str, max: usize) -> String {
    match body.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &body[..end]),
        None => body.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A transport bound to one set of credentials.
#[derive(Clone)]
pub struct PipefyClient {
    transport: Arc<dyn GraphQlTransport>,
    credentials: PipefyCredentials,
}

impl PipefyClient {
    pub fn new(transport: Arc<dyn GraphQlTransport>, credentials: PipefyCredentials) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Send `document` and return the response's `data` member.
    ///
    /// # Errors
    /// [`PipefyError::GraphQl`] with the first error message when the
    /// response carries a non-empty `errors` array, plus any transport error.
    #[instrument(skip_all, fields(field = document.field()))]
    pub async fn execute(&self, document: &Document) -> Result<Value, PipefyError> {
        let rendered = document.to_string();
        debug!(document = %rendered, "sending GraphQL document");
        let response = self.transport.send(&rendered, &self.credentials).await?;
        extract_data(response)
    }
}

/// Unwrap a GraphQL response envelope.
pub fn extract_data(mut response: Value) -> Result<Value, PipefyError> {
    if let Some(errors) = response.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown GraphQL error");
            return Err(PipefyError::GraphQl(message.to_string()));
        }
    }

    if !response.is_object() {
        return Err(PipefyError::InvalidResponse(format!(
            "expected a JSON object, got {response}"
        )));
    }

    Ok(response.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    #[test]
    fn data_is_unwrapped() {
        let data = extract_data(json!({ "data": { "me": { "id": "1" } } })).unwrap();
        assert_eq!(data, json!({ "me": { "id": "1" } }));
    }

    #[test]
    fn first_error_message_wins() {
        let err = extract_data(json!({
            "data": null,
            "errors": [{ "message": "Card not found" }, { "message": "second" }]
        }))
        .unwrap_err();
        assert!(matches!(err, PipefyError::GraphQl(msg) if msg == "Card not found"));
    }

    #[test]
    fn error_without_message() {
        let err = extract_data(json!({ "errors": [{ "code": 500 }] })).unwrap_err();
        assert!(matches!(err, PipefyError::GraphQl(msg) if msg == "unknown GraphQL error"));
    }

    #[test]
    fn empty_error_array_is_ignored() {
        let data = extract_data(json!({ "data": { "ok": true }, "errors": [] })).unwrap();
        assert_eq!(data["ok"], true);
    }

    #[test]
    fn non_object_response_is_invalid() {
        assert!(matches!(
            extract_data(json!("<html>")),
            Err(PipefyError::InvalidResponse(_))
        ));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("ação", 2), "aç…");
        assert_eq!(truncate("ok", 10), "ok");
    }

    #[test]
    fn http_transport_rejects_bad_endpoint() {
        let config = PipefyConfig {
            endpoint: "nope".into(),
            ..PipefyConfig::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(PipefyError::InvalidConfig(_))
        ));
    }

    // ============================================================
    // HttpTransport against a local one-shot server
    // ============================================================

    /// Answers one connection with `status` and `body`; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });
        (endpoint, server)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = header(&text[..head_end], "content-length")
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn header<'a>(head: &'a str, name: &str) -> Option<&'a str> {
        head.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    fn transport(endpoint: String) -> HttpTransport {
        HttpTransport::new(&PipefyConfig {
            endpoint,
            ..PipefyConfig::default()
        })
        .unwrap()
    }

    fn token() -> PipefyCredentials {
        PipefyCredentials::new("tok_Abc").unwrap()
    }

    #[tokio::test]
    async fn http_transport_posts_query_with_bearer() {
        let (endpoint, server) = serve_once("200 OK", r#"{"data":{"me":{"id":"1"}}}"#).await;

        let response = transport(endpoint)
            .send("query { me { id } }", &token())
            .await
            .unwrap();
        assert_eq!(response["data"]["me"]["id"], "1");

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("POST /graphql HTTP/1.1"));
        assert_eq!(header(head, "authorization"), Some("Bearer tok_Abc"));
        assert_eq!(header(head, "content-type"), Some("application/json"));
        assert_eq!(
            serde_json::from_str::<Value>(body).unwrap(),
            json!({ "query": "query { me { id } }" })
        );
    }

    #[tokio::test]
    async fn http_transport_maps_bad_gateway_to_retryable_status() {
        let (endpoint, server) = serve_once("502 Bad Gateway", "upstream down").await;

        let err = transport(endpoint)
            .send("query { me { id } }", &token())
            .await
            .unwrap_err();
        assert!(matches!(&err, PipefyError::HttpStatus { status: 502, body } if body == "upstream down"));
        assert!(err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn http_transport_rejects_non_json_body() {
        let (endpoint, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = transport(endpoint)
            .send("query { me { id } }", &token())
            .await
            .unwrap_err();
        assert!(matches!(err, PipefyError::InvalidResponse(_)));
        assert!(!err.is_retryable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn http_transport_refused_connection_is_retryable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/graphql", listener.local_addr().unwrap());
        drop(listener);

        let err = transport(endpoint)
            .send("query { me { id } }", &token())
            .await
            .unwrap_err();
        assert!(matches!(err, PipefyError::Transport(_)));
        assert!(err.is_retryable());
    }
}

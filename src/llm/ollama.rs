//! Ollama HTTP client
//!
//! Talks to two endpoints of a local server:
//!
//! - `GET /api/tags` lists installed models
//! - `POST /api/generate` with `stream = true` returns newline-delimited JSON
//!
//! The generation deadline covers sending the request and every body read.
//! When it elapses the complete lines received so far are returned with
//! [`RawResponse::timed_out`] set, so partial output is not lost.

use std::error::Error as _;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use reqwest::{Client, Response, Url};
use serde::Deserialize;
use tokio::time::{Instant, timeout_at};

use crate::config::{NetworkConfig, OllamaConfig};
use crate::constants::api::{GENERATE_PATH, TAGS_PATH};
use crate::error::{OcmError, Result};
use crate::llm::{GenerationRequest, ModelInfo, ModelService, RawResponse, truncate_for_preview};

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

/// Client for a single Ollama server
pub struct OllamaClient {
    client: Client,
    endpoint: String,
    list_timeout: Duration,
}

impl OllamaClient {
    pub fn new(ollama: &OllamaConfig, network: &NetworkConfig) -> Result<Self> {
        // reqwest is built without a bundled crypto provider
        let _ = rustls::crypto::ring::default_provider().install_default();

        let endpoint = ollama.endpoint.trim_end_matches('/').to_string();
        let user_agent = format!(
            "{}/{} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );

        // no overall timeout here: the generation deadline is enforced per read
        let mut builder = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(network.connect_timeout));
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
            list_timeout: Duration::from_secs(network.list_timeout),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn url(&self, path: &str) -> String {
        api_url(&self.endpoint, path)
    }

    fn send_error(&self, e: reqwest::Error) -> OcmError {
        if e.is_connect() || e.is_timeout() {
            OcmError::ServiceUnavailable {
                endpoint: self.endpoint.clone(),
                detail: root_cause(&e),
            }
        } else {
            OcmError::Network(e)
        }
    }
}

#[async_trait]
impl ModelService for OllamaClient {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self.url(TAGS_PATH);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.list_timeout)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let tags: TagsResponse = response.json().await?;
        tracing::debug!("Server reports {} installed model(s)", tags.models.len());
        Ok(tags.models)
    }

    async fn generate_raw(
        &self,
        request: &GenerationRequest,
        timeout: Duration,
    ) -> Result<RawResponse> {
        let deadline = Instant::now() + timeout;
        let url = self.url(GENERATE_PATH);
        tracing::debug!(
            "POST {} (model={}, prompt {} bytes, timeout {:?})",
            url,
            request.model(),
            request.prompt().len(),
            timeout
        );

        let send = self.client.post(&url).json(request).send();
        let response = match timeout_at(deadline, send).await {
            Ok(result) => result.map_err(|e| self.send_error(e))?,
            Err(_) => {
                tracing::warn!("Deadline elapsed before the server answered");
                return Ok(RawResponse::new(Vec::new(), true));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(
                match timeout_at(deadline, error_from_response(response)).await {
                    Ok(err) => err,
                    Err(_) => OcmError::ServiceStatus {
                        status: status.as_u16(),
                        message: status.to_string(),
                    },
                },
            );
        }

        read_lines(response.bytes_stream(), deadline).await
    }
}

/// Split a byte stream into lines until it ends or `deadline` passes
///
/// Chunks may split lines, and multibyte characters, at any position. On
/// deadline expiry an unterminated trailing remainder is discarded; when the
/// stream ends normally it is kept as the last line.
pub async fn read_lines<S, B, E>(stream: S, deadline: Instant) -> Result<RawResponse>
where
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<OcmError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut buffer: Vec<u8> = Vec::new();
    let mut lines = Vec::new();

    loop {
        match timeout_at(deadline, stream.next()).await {
            Err(_) => {
                if !buffer.is_empty() {
                    tracing::debug!("Dropping {} byte(s) of incomplete line", buffer.len());
                }
                tracing::debug!("Deadline elapsed after {} line(s)", lines.len());
                return Ok(RawResponse::new(lines, true));
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => return Err(e.into()),
            Ok(Some(Ok(chunk))) => {
                buffer.extend_from_slice(chunk.as_ref());
                while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    lines.push(decode_line(&line));
                }
            }
        }
    }

    if !buffer.is_empty() {
        lines.push(decode_line(&buffer));
    }
    tracing::debug!("Stream finished with {} line(s)", lines.len());
    Ok(RawResponse::new(lines, false))
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

/// Join a base URL and an API path with exactly one slash
pub fn api_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn is_loopback(endpoint: &str) -> bool {
    let Some(host) = Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
    else {
        return false;
    };
    host.eq_ignore_ascii_case("localhost")
        || host
            .trim_matches(['[', ']'])
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

fn root_cause(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message = inner.to_string();
        source = inner.source();
    }
    message
}

async fn error_from_response(response: Response) -> OcmError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    error_from_body(status, &body)
}

/// A JSON `error` field is a generation failure, anything else an HTTP failure
fn error_from_body(status: u16, body: &str) -> OcmError {
    if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str(body) {
        let message = match error {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        return OcmError::GenerationError(message);
    }

    OcmError::ServiceStatus {
        status,
        message: truncate_for_preview(body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use mockito::Server;
    use pretty_assertions::assert_eq;

    fn client_for(url: String) -> OllamaClient {
        let ollama = OllamaConfig {
            endpoint: url,
            model: None,
        };
        OllamaClient::new(&ollama, &NetworkConfig::default()).unwrap()
    }

    fn chunks(parts: &[&'static str]) -> Vec<std::result::Result<&'static [u8], OcmError>> {
        parts.iter().copied().map(|p| Ok(p.as_bytes())).collect()
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("http://localhost:11434/", "/api/tags"),
            "http://localhost:11434/api/tags"
        );
        assert_eq!(
            api_url("http://h:1", "api/generate"),
            "http://h:1/api/generate"
        );
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("http://localhost:11434"));
        assert!(is_loopback("http://127.0.0.1:11434"));
        assert!(is_loopback("http://[::1]:11434"));
        assert!(!is_loopback("http://gpu-box.lan:11434"));
        assert!(!is_loopback("not a url"));
    }

    #[test]
    fn test_error_from_body() {
        let err = error_from_body(404, r#"{"error":"model 'x' not found"}"#);
        assert!(matches!(err, OcmError::GenerationError(ref m) if m == "model 'x' not found"));

        let err = error_from_body(502, "<html>Bad Gateway</html>");
        assert!(matches!(err, OcmError::ServiceStatus { status: 502, .. }));

        let err = error_from_body(500, r#"{"error":null}"#);
        assert!(matches!(err, OcmError::ServiceStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_read_lines_reassembles_split_chunks() {
        let body = stream::iter(chunks(&[
            "{\"response\":\"fe",
            "at: \"}\n{\"resp",
            "onse\":\"x\"}\r\n",
            "{\"done\":true}",
        ]));

        let raw = read_lines(body, far_deadline()).await.unwrap();
        assert!(!raw.timed_out);
        assert_eq!(
            raw.lines,
            vec![
                r#"{"response":"feat: "}"#,
                r#"{"response":"x"}"#,
                r#"{"done":true}"#,
            ]
        );
    }

    #[tokio::test]
    async fn test_read_lines_keeps_split_multibyte_chars() {
        let bytes = "{\"response\":\"é\"}\n".as_bytes();
        let split = bytes.iter().position(|&b| b >= 0x80).unwrap() + 1;
        let parts: Vec<std::result::Result<Vec<u8>, OcmError>> =
            vec![Ok(bytes[..split].to_vec()), Ok(bytes[split..].to_vec())];

        let raw = read_lines(stream::iter(parts), far_deadline()).await.unwrap();
        assert_eq!(raw.lines, vec![r#"{"response":"é"}"#]);
    }

    #[tokio::test]
    async fn test_read_lines_timeout_keeps_complete_lines() {
        let body = stream::iter(chunks(&[
            "{\"response\":\"feat: \",\"done\":false}\n",
            "{\"response\":\"half",
        ]))
        .chain(stream::pending());

        let deadline = Instant::now() + Duration::from_millis(100);
        let raw = read_lines(body, deadline).await.unwrap();
        assert!(raw.timed_out);
        assert_eq!(raw.lines, vec![r#"{"response":"feat: ","done":false}"#]);
    }

    #[tokio::test]
    async fn test_read_lines_propagates_stream_error() {
        let parts: Vec<std::result::Result<&[u8], OcmError>> = vec![
            Ok(b"{}\n".as_slice()),
            Err(OcmError::GenerationError("reset".into())),
        ];
        let err = read_lines(stream::iter(parts), far_deadline())
            .await
            .unwrap_err();
        assert!(matches!(err, OcmError::GenerationError(_)));
    }

    #[tokio::test]
    async fn test_list_models_in_server_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"models":[{"name":"a","size":1},{"name":"b","size":2}]}"#)
            .create_async()
            .await;

        let models = client_for(server.url()).list_models().await.unwrap();
        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_models_server_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let err = client_for(server.url()).list_models().await.unwrap_err();
        assert!(matches!(err, OcmError::ServiceStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_service_unavailable() {
        // bind then drop to get a port nothing listens on
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = client_for(format!("http://127.0.0.1:{}", port));

        let err = client.list_models().await.unwrap_err();
        match err {
            OcmError::ServiceUnavailable { endpoint, .. } => {
                assert_eq!(endpoint, format!("http://127.0.0.1:{}", port));
            }
            other => panic!("Expected ServiceUnavailable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_raw_streams_lines() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "llama3.2",
                "stream": true
            })))
            .with_status(200)
            .with_header("content-type", "application/x-ndjson")
            .with_body(
                "{\"response\":\"feat: \",\"done\":false}\n{\"response\":\"add x\",\"done\":true}\n",
            )
            .create_async()
            .await;

        let request = GenerationRequest::new("llama3.2", "diff");
        let raw = client_for(server.url())
            .generate_raw(&request, Duration::from_secs(10))
            .await
            .unwrap();

        assert!(!raw.timed_out);
        assert_eq!(raw.lines.len(), 2);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_raw_model_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'x' not found"}"#)
            .create_async()
            .await;

        let request = GenerationRequest::new("x", "diff");
        let err = client_for(server.url())
            .generate_raw(&request, Duration::from_secs(10))
            .await
            .unwrap_err();
        assert!(matches!(err, OcmError::GenerationError(ref m) if m.contains("not found")));
    }
}

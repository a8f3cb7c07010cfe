//! HTTP client for the sentiment endpoint.
//!
//! One POST per analysis, no retries. Every failure mode is reported as an
//! `AnalyzeError`; the view collapses them all to the error sentinel.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{AnalyzeRequest, SentimentResult};

/// Errors from a single analysis request
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Longest status-line summary before truncation
const SUMMARY_MAX_CHARS: usize = 80;

impl AnalyzeError {
    /// One-line description for the info bar; response bodies are left out
    pub fn summary(&self) -> String {
        let text = match self {
            AnalyzeError::Status { status, .. } => format!("server returned status {}", status),
            other => other.to_string(),
        };
        let first_line = text.lines().next().unwrap_or_default();

        if first_line.chars().count() > SUMMARY_MAX_CHARS {
            let cut: String = first_line.chars().take(SUMMARY_MAX_CHARS).collect();
            format!("{}…", cut)
        } else {
            first_line.to_string()
        }
    }
}

/// Something that can turn text into a sentiment result
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<SentimentResult, AnalyzeError>;
}

/// Analyzer backed by the remote model server
#[derive(Debug, Clone)]
pub struct HttpAnalyzer {
    http: Client,
    endpoint: String,
}

impl HttpAnalyzer {
    /// Create an analyzer posting to `endpoint`.
    ///
    /// Without a timeout the call is bounded only by the transport defaults.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AnalyzeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<SentimentResult, AnalyzeError> {
        tracing::debug!("POST {} (model={})", self.endpoint, request.model);

        let response = self.http.post(&self.endpoint).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| "(no body)".into());
            return Err(AnalyzeError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalyzeError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(SentimentResult::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Model;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve exactly one HTTP response on a loopback port, returning the URL
    /// and a handle yielding the raw request that was received.
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];

            // Read headers, then as much body as Content-Length announces
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);

                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(split) = text.find("\r\n\r\n") {
                    let content_length = text[..split]
                        .lines()
                        .find_map(|l| {
                            let lower = l.to_ascii_lowercase();
                            lower
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&raw).to_string()
        });

        (format!("http://{}/analyze/", addr), handle)
    }

    fn request(text: &str, model: Model) -> AnalyzeRequest {
        AnalyzeRequest {
            text: text.to_string(),
            model,
        }
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let analyzer = HttpAnalyzer::new("http://127.0.0.1:8000/analyze/", None).unwrap();
        assert_eq!(analyzer.endpoint(), "http://127.0.0.1:8000/analyze/");
    }

    #[tokio::test]
    async fn test_success_body_returned_verbatim() {
        let (url, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"sentiment":"positive","confidence_score":0.87,"extra":"kept"}"#,
        )
        .await;

        let analyzer = HttpAnalyzer::new(url, None).unwrap();
        let result = analyzer.analyze(&request("great movie", Model::Llama)).await.unwrap();

        assert_eq!(result.sentiment(), "positive");
        assert_eq!(result.confidence_score().as_deref(), Some("0.87"));
        assert_eq!(result.body()["extra"], "kept");

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /analyze/ "));
        assert!(raw.contains(r#""text":"great movie""#));
        assert!(raw.contains(r#""model":"llama""#));
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let (url, server) = serve_once(
            "HTTP/1.1 400 Bad Request",
            r#"{"detail":"Invalid model specified"}"#,
        )
        .await;

        let analyzer = HttpAnalyzer::new(url, None).unwrap();
        let err = analyzer.analyze(&request("", Model::Custom)).await.unwrap_err();

        match err {
            AnalyzeError::Status { status, message } => {
                assert_eq!(status, 400);
                assert!(message.contains("Invalid model"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_is_error() {
        let (url, server) = serve_once("HTTP/1.1 200 OK", "not json").await;

        let analyzer = HttpAnalyzer::new(url, None).unwrap();
        let err = analyzer.analyze(&request("hi", Model::Custom)).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::InvalidResponse(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_error() {
        // Grab a free port, then close it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let analyzer = HttpAnalyzer::new(format!("http://{}/analyze/", addr), Some(Duration::from_secs(5))).unwrap();
        let err = analyzer.analyze(&request("hi", Model::Custom)).await.unwrap_err();

        assert!(matches!(err, AnalyzeError::Http(_)));
    }

    #[tokio::test]
    async fn test_timeout_cuts_off_silent_server() {
        // Accept the connection and never answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let analyzer = HttpAnalyzer::new(format!("http://{}/analyze/", addr), Some(Duration::from_millis(200))).unwrap();
        let started = std::time::Instant::now();
        let err = analyzer.analyze(&request("hello?", Model::Custom)).await.unwrap_err();

        match err {
            AnalyzeError::Http(e) => assert!(e.is_timeout(), "expected a timeout, got {e}"),
            other => panic!("expected http timeout, got {other:?}"),
        }
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[test]
    fn test_status_summary_drops_body() {
        let err = AnalyzeError::Status {
            status: 502,
            message: "<html><body>Bad Gateway</body></html>".into(),
        };
        assert_eq!(err.summary(), "server returned status 502");

        let err = AnalyzeError::InvalidResponse(format!("failed to parse response: {}", "x".repeat(500)));
        assert!(err.summary().chars().count() <= SUMMARY_MAX_CHARS + 1);
        assert!(err.summary().ends_with('…'));
    }

    #[test]
    fn test_error_display() {
        let err = AnalyzeError::Status {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "server returned status 500: boom");
    }
}

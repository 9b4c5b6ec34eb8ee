//! OCR collaborator: turn raw image bytes into positioned text lines.
//!
//! The pipeline only needs two things from OCR: the recognised string of
//! each line and the Y coordinate of its top-left corner. [`OcrProvider`]
//! captures exactly that, so tests can swap in a scripted provider and the
//! rest of the pipeline never learns which service answered.
//!
//! [`AzureVisionProvider`] is the production implementation. It calls the
//! Azure AI Vision *Image Analysis* REST endpoint with the `read` feature.

use crate::error::OcrError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// One recognised line of text and its vertical position in pixels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Y coordinate of the line's top-left corner.
    pub top_y: i64,
}

impl TextLine {
    pub fn new(text: impl Into<String>, top_y: i64) -> Self {
        Self {
            text: text.into(),
            top_y,
        }
    }
}

/// A service that recognises text in a screenshot.
///
/// An empty `Vec` is a valid answer ("no text on this image").
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Recognise every text line in `image`.
    async fn analyze(&self, image: &[u8]) -> Result<Vec<TextLine>, OcrError>;
}

const API_VERSION: &str = "2024-02-01";
const ANALYZE_PATH: &str = "computervision/imageanalysis:analyze";

/// Azure AI Vision Image Analysis 4.0 client (`features=read`).
pub struct AzureVisionProvider {
    client: reqwest::Client,
    url: String,
    key: String,
}

impl AzureVisionProvider {
    /// Build a client for `endpoint` (e.g. `https://<name>.cognitiveservices.azure.com/`).
    pub fn new(
        endpoint: &str,
        key: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OcrError::Request(e.to_string()))?;

        Ok(Self {
            client,
            url: analyze_url(endpoint),
            key: key.into(),
        })
    }
}

impl std::fmt::Debug for AzureVisionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureVisionProvider")
            .field("url", &self.url)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn analyze_url(endpoint: &str) -> String {
    format!(
        "{}/{}?features=read&api-version={}",
        endpoint.trim_end_matches('/'),
        ANALYZE_PATH,
        API_VERSION
    )
}

#[async_trait]
impl OcrProvider for AzureVisionProvider {
    fn name(&self) -> &str {
        "azure-vision"
    }

    async fn analyze(&self, image: &[u8]) -> Result<Vec<TextLine>, OcrError> {
        let response = self
            .client
            .post(&self.url)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec())
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => OcrError::Auth {
                    status: status.as_u16(),
                    detail,
                },
                code => OcrError::Http {
                    status: code,
                    detail,
                },
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        let parsed: AnalyzeResponse =
            serde_json::from_str(&body).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

        let lines = parsed.into_lines();
        debug!("Azure read returned {} lines", lines.len());
        Ok(lines)
    }
}

/// `reqwest::Error`'s own message hides the cause, so the whole source
/// chain goes into the detail. A dropped or reset socket surfaces somewhere
/// in that chain as an `io::Error` or as hyper's "connection closed" error.
fn map_transport_error(e: reqwest::Error) -> OcrError {
    let mut detail = e.to_string();
    let mut dropped = false;
    let mut source = std::error::Error::source(&e);
    while let Some(cause) = source {
        dropped |= cause.is::<std::io::Error>();
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    let lowered = detail.to_lowercase();
    dropped |= lowered.contains("connection closed")
        || lowered.contains("connection reset")
        || lowered.contains("broken pipe");

    if e.is_connect() || e.is_timeout() || dropped {
        OcrError::Connection(detail)
    } else {
        OcrError::Request(detail)
    }
}

// ── Response schema ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    #[serde(default)]
    read_result: Option<ReadResult>,
}

#[derive(Debug, Deserialize)]
struct ReadResult {
    #[serde(default)]
    blocks: Vec<ReadBlock>,
}

#[derive(Debug, Deserialize)]
struct ReadBlock {
    #[serde(default)]
    lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReadLine {
    text: String,
    #[serde(default)]
    bounding_polygon: Vec<Point>,
}

#[derive(Debug, Deserialize)]
struct Point {
    y: i64,
}

impl AnalyzeResponse {
    /// Flatten blocks into lines, keeping only lines that carry a position.
    fn into_lines(self) -> Vec<TextLine> {
        let Some(read) = self.read_result else {
            return Vec::new();
        };
        read.blocks
            .into_iter()
            .flat_map(|block| block.lines)
            .filter_map(|line| match line.bounding_polygon.first() {
                Some(p) => Some(TextLine::new(line.text, p.y)),
                None => {
                    debug!("Dropping OCR line without a bounding polygon: {:?}", line.text);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_url_normalises_trailing_slash() {
        let a = analyze_url("https://demo.cognitiveservices.azure.com/");
        let b = analyze_url("https://demo.cognitiveservices.azure.com");
        assert_eq!(a, b);
        assert!(a.starts_with(
            "https://demo.cognitiveservices.azure.com/computervision/imageanalysis:analyze?"
        ));
        assert!(a.contains("features=read"));
        assert!(a.contains("api-version=2024-02-01"));
    }

    #[test]
    fn parse_read_result_lines() {
        let json = r#"{
            "modelVersion": "2023-10-01",
            "readResult": {
                "blocks": [
                    { "lines": [
                        { "text": "Welcome", "boundingPolygon": [
                            {"x": 10, "y": 40}, {"x": 200, "y": 40},
                            {"x": 200, "y": 70}, {"x": 10, "y": 70}
                        ], "words": [] },
                        { "text": "speaker notes", "boundingPolygon": [
                            {"x": 12, "y": 900}, {"x": 300, "y": 902},
                            {"x": 300, "y": 930}, {"x": 12, "y": 928}
                        ] }
                    ] }
                ]
            }
        }"#;
        let parsed: AnalyzeResponse = serde_json::from_str(json).unwrap();
        let lines = parsed.into_lines();
        assert_eq!(
            lines,
            vec![
                TextLine::new("Welcome", 40),
                TextLine::new("speaker notes", 900)
            ]
        );
    }

    #[test]
    fn missing_read_result_is_no_text() {
        let parsed: AnalyzeResponse =
            serde_json::from_str(r#"{"modelVersion": "2023-10-01"}"#).unwrap();
        assert!(parsed.into_lines().is_empty());
    }

    #[test]
    fn line_without_polygon_is_dropped() {
        let json = r#"{"readResult": {"blocks": [{"lines": [
            {"text": "floating", "boundingPolygon": []},
            {"text": "anchored", "boundingPolygon": [{"x": 0, "y": 5}]}
        ]}]}}"#;
        let parsed: AnalyzeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.into_lines(), vec![TextLine::new("anchored", 5)]);
    }

    #[tokio::test]
    async fn dropped_connection_is_transient() {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 64];
            let _ = socket.read(&mut buf).await;
            // Closing with unread request bytes resets the connection.
        });

        let provider = AzureVisionProvider::new(&format!("http://{addr}"), "k", 5).unwrap();
        let err = provider.analyze(b"not really a png").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, OcrError::Connection(_)), "got: {err:?}");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn refused_connection_is_transient() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = AzureVisionProvider::new(&format!("http://{addr}"), "k", 5).unwrap();
        let err = provider.analyze(b"img").await.unwrap_err();
        assert!(err.is_transient(), "got: {err:?}");
    }

    #[test]
    fn debug_redacts_key() {
        let p = AzureVisionProvider::new("https://demo.example", "secret-key", 5).unwrap();
        let dbg = format!("{:?}", p);
        assert!(!dbg.contains("secret-key"));
        assert!(dbg.contains("<redacted>"));
    }
}

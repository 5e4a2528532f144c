//! Text recognition: the narrow seam to the external OCR engine.
//!
//! The engine itself (model loading, inference) is an external collaborator
//! reached through the [`RecognitionEngine`] trait, so the pipeline can be
//! tested against a mock and the production build can point at whichever
//! deployment hosts the engine. [`RemoteOcrEngine`] is the shipped
//! implementation: one blocking-style HTTP call per image.
//!
//! ## Call discipline
//!
//! The engine instance is shared process-wide and is not assumed safe for
//! concurrent calls; [`TextRecognizer`] serialises access with an async
//! mutex, so at most one recognition call is in flight per recogniser.

use crate::error::ScanError;
use crate::output::{RecognitionResult, ServiceInfo};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Plain-text lines recognised from one image, in engine emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub lines: Vec<String>,
}

impl Transcript {
    /// Join lines with newline separators, in the order the engine emitted
    /// them.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

/// External OCR engine consumed via a single narrow operation.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Recognise the image at `path` and return its text lines.
    async fn recognize(&self, path: &Path) -> Result<Transcript, ScanError>;

    /// Engine identifier for health reporting.
    fn name(&self) -> &str;
}

/// HTTP adapter for a remotely hosted OCR engine.
///
/// Sends the image as base64 JSON and accepts either response shape the
/// engine is known to produce: a flat list of `(geometry, (text, confidence))`
/// tuples, or structured records carrying a `rec_texts` array. Only the text
/// is kept either way.
pub struct RemoteOcrEngine {
    client: reqwest::Client,
    endpoint: String,
}

impl RemoteOcrEngine {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScanError::Internal(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecognitionEngine for RemoteOcrEngine {
    async fn recognize(&self, path: &Path) -> Result<Transcript, ScanError> {
        let bytes = std::fs::read(path)
            .map_err(|e| ScanError::Recognition(format!("failed to read image: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "image": STANDARD.encode(&bytes) }))
            .send()
            .await
            .map_err(|e| ScanError::Recognition(format!("engine request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ScanError::Recognition(format!(
                "engine returned HTTP {}",
                response.status()
            )));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| ScanError::Recognition(format!("engine response not JSON: {}", e)))?;

        Ok(extract_transcript(&value))
    }

    fn name(&self) -> &str {
        "remote-ocr"
    }
}

/// Pull text lines out of either known engine result shape.
///
/// Structured records (`[{"rec_texts": [...]}, ...]`) take priority; the
/// fallback is the flat tuple list where each line is
/// `[geometry, [text, confidence]]`. Anything unrecognised yields an empty
/// transcript rather than an error — the engine answered, it just found
/// nothing usable.
pub fn extract_transcript(value: &Value) -> Transcript {
    let mut lines = Vec::new();

    let Some(results) = value.as_array().filter(|a| !a.is_empty()) else {
        return Transcript::default();
    };

    if results[0].get("rec_texts").is_some() {
        for record in results {
            if let Some(texts) = record.get("rec_texts").and_then(Value::as_array) {
                lines.extend(texts.iter().filter_map(Value::as_str).map(String::from));
            }
        }
    } else if let Some(tuples) = results[0].as_array() {
        for line in tuples {
            if let Some(text) = line
                .get(1)
                .and_then(|pair| pair.get(0))
                .and_then(Value::as_str)
            {
                lines.push(text.to_string());
            }
        }
    }

    Transcript { lines }
}

/// Image input for recognition: an existing file or in-memory raster bytes.
#[derive(Debug, Clone)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// Drives the recognition engine for single images and ordered batches.
pub struct TextRecognizer {
    engine: Arc<dyn RecognitionEngine>,
    /// Serialises engine access; see module docs.
    call_guard: tokio::sync::Mutex<()>,
}

impl TextRecognizer {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self {
            engine,
            call_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Recognise one image and return its text.
    ///
    /// Byte input is spilled to a managed temp file first (the engine works
    /// on paths); the temp file is removed on every exit path, including
    /// engine failure, because [`tempfile::NamedTempFile`] deletes on drop.
    pub async fn recognize(&self, source: ImageSource) -> Result<String, ScanError> {
        // Keep the guard alive while `run` borrows either the caller's path
        // or the temp file's.
        let _tmp_guard;
        let path: &Path = match &source {
            ImageSource::Path(p) => {
                if !p.exists() {
                    return Err(ScanError::FileNotFound { path: p.clone() });
                }
                p
            }
            ImageSource::Bytes(bytes) => {
                let mut tmp = tempfile::Builder::new()
                    .prefix("ocr_")
                    .suffix(".png")
                    .tempfile()
                    .map_err(|e| {
                        ScanError::FileProcessing(format!("failed to create temp image: {}", e))
                    })?;
                tmp.write_all(bytes).map_err(|e| {
                    ScanError::FileProcessing(format!("failed to write temp image: {}", e))
                })?;
                _tmp_guard = tmp;
                _tmp_guard.path()
            }
        };

        let transcript = {
            let _permit = self.call_guard.lock().await;
            self.engine.recognize(path).await?
        };

        info!("recognition complete: {} lines", transcript.lines.len());
        Ok(transcript.into_text())
    }

    /// Recognise an ordered sequence of images, one at a time.
    ///
    /// A failed item never aborts the batch: it yields an empty-text result
    /// at its index so downstream aggregation stays positionally correct.
    pub async fn recognize_batch(&self, sources: Vec<ImageSource>) -> Vec<RecognitionResult> {
        let mut results = Vec::with_capacity(sources.len());
        for (i, source) in sources.into_iter().enumerate() {
            match self.recognize(source).await {
                Ok(text) => {
                    debug!("image {} recognised, {} chars", i + 1, text.len());
                    results.push(RecognitionResult::ok(Some(i), text));
                }
                Err(e) => {
                    warn!("image {} recognition failed: {}", i + 1, e);
                    results.push(RecognitionResult::failed(Some(i), e.to_string()));
                }
            }
        }
        results
    }

    /// Readiness snapshot for the health endpoint.
    pub fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            service: "OCRService".to_string(),
            engine: self.engine.name().to_string(),
            status: "ready".to_string(),
            supported_formats: ["jpg", "jpeg", "png", "bmp", "tiff"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

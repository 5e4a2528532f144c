//! Result types produced by the pipeline and gateways.
//!
//! Everything here is a terminal artifact handed back to the caller (and
//! serialised straight into the HTTP envelope); none of it is persisted.

use serde::{Deserialize, Serialize};

/// A single rasterised PDF page, in document order.
///
/// Ephemeral: produced only for PDF inputs and never written to disk under
/// its own name (the recogniser may spill it to a managed temp file).
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 0-based index in PDF page order.
    pub index: usize,
    /// PNG-encoded pixels.
    pub bytes: Vec<u8>,
}

/// Outcome of recognising one image.
///
/// Failures are carried here as values rather than errors so that batch and
/// per-page loops keep positionally correct output for the items that worked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// 0-based page index for PDF pages, `None` for standalone images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_index: Option<usize>,
    /// Recognised text, empty on failure.
    pub text: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecognitionResult {
    pub fn ok(page_index: Option<usize>, text: String) -> Self {
        Self {
            page_index,
            text,
            success: true,
            error: None,
        }
    }

    pub fn failed(page_index: Option<usize>, error: String) -> Self {
        Self {
            page_index,
            text: String::new(),
            success: false,
            error: Some(error),
        }
    }
}

/// Terminal artifact of a successful single-document run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingOutcome {
    /// Generated unique name the upload was stored under (already deleted).
    pub stored_name: String,
    pub original_name: String,
    /// All recognised text; PDF pages are concatenated with page headers.
    pub text: String,
    /// Base64-encoded representative image (first PDF page, or the image itself).
    pub preview: String,
    pub file_type: String,
    pub text_length: usize,
    pub has_text: bool,
}

/// One entry of a batch run, tagged with its original input index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItem {
    pub index: usize,
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counters for a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Terminal artifact of a batch run. `results` preserves input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub results: Vec<BatchItem>,
    pub summary: BatchSummary,
}

/// Result of one remote analysis call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    pub analysis_type: String,
    pub result: String,
    pub original_content_length: usize,
    /// Local wall-clock time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Display metadata for one configured analysis type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTypeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Readiness snapshot reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub engine: String,
    pub status: String,
    pub supported_formats: Vec<String>,
}

//! Error types for the scandoc library.
//!
//! The taxonomy mirrors how failures surface at the HTTP boundary:
//!
//! * [`ScanError::Validation`] — bad input, rejected before any side effect
//!   (nothing written to disk). 400-class.
//! * [`ScanError::FileProcessing`] — storage or conversion failure after
//!   validation. 500-class.
//! * [`ScanError::Recognition`] — the OCR engine failed. 500-class.
//! * [`ScanError::Analysis`] — the remote analysis workflow failed or is
//!   misconfigured. 500-class.
//!
//! Per-page and per-batch-item failures are deliberately *not* errors: they
//! travel as values ([`crate::output::RecognitionResult`],
//! [`crate::output::BatchItem`]) so a single bad page or file degrades the
//! result instead of aborting the run. Only failures that sink the whole
//! request become a `ScanError`.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the scandoc library.
#[derive(Debug, Error)]
pub enum ScanError {
    // ── Validation errors (no side effects yet) ───────────────────────────
    /// Input rejected before anything was stored.
    #[error("{0}")]
    Validation(String),

    // ── File/storage/conversion errors ────────────────────────────────────
    /// Storage I/O or document conversion failed.
    #[error("{0}")]
    FileProcessing(String),

    /// Input file was not found at the given path.
    #[error("file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    // ── Recognition errors ────────────────────────────────────────────────
    /// The OCR engine raised while recognising an image.
    #[error("recognition failed: {0}")]
    Recognition(String),

    // ── Analysis errors ───────────────────────────────────────────────────
    /// The remote analysis workflow call failed.
    #[error("analysis failed: {0}")]
    Analysis(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or registry validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScanError {
    /// Short machine-readable code for the HTTP envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            ScanError::Validation(_) => "VALIDATION_ERROR",
            ScanError::FileProcessing(_) | ScanError::FileNotFound { .. } => "PROCESSING_ERROR",
            ScanError::Recognition(_) => "OCR_ERROR",
            ScanError::Analysis(_) => "AI_ANALYSIS_ERROR",
            ScanError::InvalidConfig(_) => "CONFIG_ERROR",
            ScanError::PdfiumBindingFailed(_) | ScanError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_validation(&self) -> bool {
        matches!(self, ScanError::Validation(_))
    }
}

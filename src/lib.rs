//! # scandoc
//!
//! Document OCR service: accept PDF or image uploads, extract their text
//! through an external recognition engine, and optionally forward the
//! extracted text to a remote analysis workflow.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Validate   extension + size policy (nothing written on rejection)
//!  ├─ 2. Store      unique name under the upload directory
//!  ├─ 3. Raster     PDF → ordered PNG page images (pdfium, spawn_blocking)
//!  ├─ 4. Recognize  per-image OCR via the engine seam; failures degrade, not abort
//!  ├─ 5. Assemble   page texts joined under 第N页 headers
//!  ├─ 6. Preview    base64 first page (PDF) or raw image bytes
//!  └─ 7. Cleanup    stored file removed unconditionally, success or failure
//! ```
//!
//! The recognition engine and the analysis workflow are external
//! collaborators behind narrow seams ([`recognize::RecognitionEngine`] and
//! [`analysis::AnalysisGateway`]); this crate implements neither OCR nor any
//! model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scandoc::{DocumentPipeline, PipelineConfig, RemoteOcrEngine, TextRecognizer, Upload};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Arc::new(RemoteOcrEngine::new("http://localhost:8868/predict", 60)?);
//!     let recognizer = Arc::new(TextRecognizer::new(engine));
//!     let pipeline = DocumentPipeline::new(recognizer, PipelineConfig::default())?;
//!
//!     let upload = Upload {
//!         original_name: "invoice.pdf".into(),
//!         bytes: std::fs::read("invoice.pdf")?,
//!     };
//!     let outcome = pipeline.process(&upload).await?;
//!     println!("{}", outcome.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | Enables the HTTP API and `scandoc-server` binary (axum + clap) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analysis;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod recognize;
pub mod store;
pub mod validate;

#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analysis::AnalysisGateway;
pub use config::{AnalysisConfig, AnalysisEndpoint, PipelineConfig, PipelineConfigBuilder};
pub use error::ScanError;
pub use output::{
    AnalysisOutcome, AnalysisTypeInfo, BatchItem, BatchOutcome, BatchSummary, PageImage,
    ProcessingOutcome, RecognitionResult, ServiceInfo,
};
pub use pipeline::document::{DocumentPipeline, Upload};
pub use pipeline::raster::PdfInfo;
pub use recognize::{ImageSource, RecognitionEngine, RemoteOcrEngine, TextRecognizer, Transcript};
pub use store::{FileStore, StoredFile};
pub use validate::{DocumentKind, FileTypeValidator, ImageValidator};

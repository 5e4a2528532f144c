//! The document pipeline: one upload in, one outcome out.
//!
//! Stage order for a single upload:
//!
//! ```text
//! validate ─▶ store ─▶ dispatch by type ─▶ recognize ─▶ assemble ─▶ preview ─▶ cleanup
//! ```
//!
//! Two rules shape everything here:
//!
//! * Validation failures terminate before anything touches disk, so there is
//!   nothing to clean up.
//! * Once a file is stored, cleanup runs unconditionally — whichever later
//!   stage fails, the stored file never outlives its request.
//!
//! Each run is a single attempt; no stage retries.

use crate::config::PipelineConfig;
use crate::error::ScanError;
use crate::output::{
    BatchItem, BatchOutcome, BatchSummary, PageImage, ProcessingOutcome, RecognitionResult,
};
use crate::pipeline::{preview, raster};
use crate::recognize::{ImageSource, TextRecognizer};
use crate::store::{FileStore, StoredFile};
use crate::validate::{DocumentKind, FileTypeValidator, ImageValidator};
use std::sync::Arc;
use tracing::{info, warn};

/// One uploaded document, not yet validated or stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Orchestrates validation, storage, recognition, preview, and cleanup.
pub struct DocumentPipeline {
    store: FileStore,
    recognizer: Arc<TextRecognizer>,
    config: PipelineConfig,
}

impl DocumentPipeline {
    pub fn new(
        recognizer: Arc<TextRecognizer>,
        config: PipelineConfig,
    ) -> Result<Self, ScanError> {
        let store = FileStore::new(&config.upload_dir)?;
        Ok(Self {
            store,
            recognizer,
            config,
        })
    }

    pub fn recognizer(&self) -> &TextRecognizer {
        &self.recognizer
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline for one upload.
    pub async fn process(&self, upload: &Upload) -> Result<ProcessingOutcome, ScanError> {
        // ── Received → Validated: nothing written yet ────────────────────
        let kind = self.validate(upload)?;

        // ── Validated → Stored ───────────────────────────────────────────
        let saved = self.store.save(&upload.bytes, &upload.original_name)?;

        // ── Stored → … → PreviewBuilt, then unconditional cleanup ────────
        let result = self.run_stored_stages(&saved, kind).await;
        self.store.cleanup(&saved.path);

        let (text, preview) = result?;
        info!("processed document: {}", upload.original_name);

        Ok(ProcessingOutcome {
            stored_name: saved.stored_name,
            original_name: upload.original_name.clone(),
            text_length: text.chars().count(),
            has_text: !text.trim().is_empty(),
            text,
            preview,
            file_type: kind.as_str().to_string(),
        })
    }

    /// Run every upload independently, one at a time, collecting per-item
    /// success or failure without aborting the batch.
    pub async fn process_batch(&self, uploads: &[Upload]) -> Result<BatchOutcome, ScanError> {
        if uploads.is_empty() {
            return Err(ScanError::Validation("file list is empty".into()));
        }

        let mut results = Vec::with_capacity(uploads.len());
        for (index, upload) in uploads.iter().enumerate() {
            match self.process(upload).await {
                Ok(outcome) => results.push(BatchItem {
                    index,
                    filename: upload.original_name.clone(),
                    success: true,
                    text_length: Some(outcome.text_length),
                    has_text: Some(outcome.has_text),
                    text: Some(outcome.text),
                    error: None,
                }),
                Err(e) => {
                    warn!("batch item {} ({}) failed: {}", index, upload.original_name, e);
                    results.push(BatchItem {
                        index,
                        filename: upload.original_name.clone(),
                        success: false,
                        text: None,
                        text_length: None,
                        has_text: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let success = results.iter().filter(|r| r.success).count();
        let total = results.len();
        Ok(BatchOutcome {
            summary: BatchSummary {
                total,
                success,
                failed: total - success,
            },
            results,
        })
    }

    fn validate(&self, upload: &Upload) -> Result<DocumentKind, ScanError> {
        if upload.original_name.is_empty() {
            return Err(ScanError::Validation("no file selected".into()));
        }
        let kind = DocumentKind::from_filename(&upload.original_name)?;
        if !FileTypeValidator::validate_size(upload.bytes.len() as u64, self.config.max_file_size)
        {
            return Err(ScanError::Validation(format!(
                "file size {} exceeds the maximum of {} bytes",
                upload.bytes.len(),
                self.config.max_file_size
            )));
        }
        Ok(kind)
    }

    /// Stages that run while the stored file exists. Failures here still get
    /// cleaned up by the caller.
    async fn run_stored_stages(
        &self,
        saved: &StoredFile,
        kind: DocumentKind,
    ) -> Result<(String, String), ScanError> {
        let text = if kind.is_pdf() {
            self.recognize_pdf(saved).await?
        } else {
            self.recognize_image(saved).await?
        };

        let preview = preview::build(&saved.path, kind, self.config.preview_dpi).await?;
        Ok((text, preview))
    }

    async fn recognize_pdf(&self, saved: &StoredFile) -> Result<String, ScanError> {
        let pages = raster::convert_to_images(&saved.path, self.config.pdf_dpi).await?;
        if pages.is_empty() {
            // Zero successfully rendered pages is a processing error: an
            // "empty" success would silently drop the whole document.
            return Err(ScanError::FileProcessing(
                "PDF conversion produced no page images".into(),
            ));
        }

        let sources: Vec<ImageSource> = pages
            .into_iter()
            .map(|PageImage { bytes, .. }| ImageSource::Bytes(bytes))
            .collect();

        let results = self.recognizer.recognize_batch(sources).await;
        Ok(join_page_texts(&results))
    }

    async fn recognize_image(&self, saved: &StoredFile) -> Result<String, ScanError> {
        if !ImageValidator::is_valid(&saved.path) {
            return Err(ScanError::FileProcessing(
                "image file is invalid or damaged".into(),
            ));
        }
        self.recognizer
            .recognize(ImageSource::Path(saved.path.clone()))
            .await
    }
}

/// Concatenate per-page texts into `第N页:` blocks, in page order.
///
/// Pages with empty text (failed or genuinely blank recognition) are left
/// out, but their slot still counts toward the numbering. Numbering is over
/// the rendered sequence: pages already dropped at the render stage have no
/// slot here, so headers after a render failure shift up by one.
pub fn join_page_texts(results: &[RecognitionResult]) -> String {
    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        if !result.text.trim().is_empty() {
            let page_num = result.page_index.unwrap_or(i) + 1;
            out.push_str(&format!("第{}页:\n{}\n\n", page_num, result.text));
        }
    }
    out.trim().to_string()
}

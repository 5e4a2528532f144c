//! Preview generation: one base64 image representing the document.
//!
//! PDFs get their first page rendered at preview resolution; every other
//! allowed type is encoded as-is — no re-encoding or resizing at this layer,
//! the client decides how to display it.

use crate::error::ScanError;
use crate::pipeline::raster;
use crate::validate::DocumentKind;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::error;

/// Build the base64 preview for the stored document at `path`.
pub async fn build(path: &Path, kind: DocumentKind, preview_dpi: u32) -> Result<String, ScanError> {
    let bytes = if kind.is_pdf() {
        raster::first_page_image(path, preview_dpi).await?
    } else {
        std::fs::read(path).map_err(|e| {
            error!("preview source read failed for {}: {}", path.display(), e);
            ScanError::FileProcessing(format!("failed to read preview source: {}", e))
        })?
    };

    Ok(STANDARD.encode(bytes))
}

//! PDF rasterisation: render pages to PNG bytes via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread so Tokio worker threads never stall during CPU-heavy rendering.
//!
//! ## Per-page failure policy
//!
//! A page that fails to render is logged and skipped; the output sequence may
//! be shorter than the page count but keeps document order. Only a document
//! that cannot be opened at all is an error here — the zero-rendered-pages
//! case is judged by the pipeline, which owns that policy.
//!
//! The document handle is owned by the blocking closure and dropped on every
//! exit path, so pdfium resources are released even when a page render or the
//! open itself fails.

use crate::error::ScanError;
use crate::output::PageImage;
use image::DynamicImage;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Document-level facts read without recognising any content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfInfo {
    pub page_count: usize,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
}

/// Rasterise every page of `path` at `dpi` into PNG bytes, in page order.
///
/// Pages that fail to render are skipped (see module docs). Returns an empty
/// vec when every page failed; opening failure is a
/// [`ScanError::FileProcessing`].
pub async fn convert_to_images(path: &Path, dpi: u32) -> Result<Vec<PageImage>, ScanError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || convert_to_images_blocking(&path, dpi))
        .await
        .map_err(|e| ScanError::Internal(format!("render task panicked: {}", e)))?
}

/// Render only the first page, for previews. Fails if the document has no
/// pages.
pub async fn first_page_image(path: &Path, dpi: u32) -> Result<Vec<u8>, ScanError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || first_page_image_blocking(&path, dpi))
        .await
        .map_err(|e| ScanError::Internal(format!("render task panicked: {}", e)))?
}

/// Read page count and metadata without rendering.
pub async fn document_info(path: &Path) -> Result<PdfInfo, ScanError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || document_info_blocking(&path))
        .await
        .map_err(|e| ScanError::Internal(format!("metadata task panicked: {}", e)))?
}

/// Bind to the pdfium library, preferring an explicit `PDFIUM_LIB_PATH`.
fn bind_pdfium() -> Result<Pdfium, ScanError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir)),
        Err(_) => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ScanError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(pdfium: &'a Pdfium, path: &Path) -> Result<PdfDocument<'a>, ScanError> {
    if !path.exists() {
        return Err(ScanError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    pdfium.load_pdf_from_file(path, None).map_err(|e| {
        ScanError::FileProcessing(format!(
            "failed to open PDF '{}': {:?}",
            path.display(),
            e
        ))
    })
}

fn convert_to_images_blocking(path: &Path, dpi: u32) -> Result<Vec<PageImage>, ScanError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, path)?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    // Same scaling pdfium applies for print: points are 1/72 inch.
    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);

    let mut images = Vec::with_capacity(pages.len() as usize);
    for (index, page) in pages.iter().enumerate() {
        match page.render_with_config(&render_config) {
            Ok(bitmap) => match encode_png(&bitmap.as_image()) {
                Ok(bytes) => {
                    debug!("rendered page {} ({} bytes png)", index + 1, bytes.len());
                    images.push(PageImage { index, bytes });
                }
                Err(e) => {
                    warn!("page {} PNG encoding failed, skipping: {}", index + 1, e);
                }
            },
            Err(e) => {
                warn!("page {} render failed, skipping: {:?}", index + 1, e);
            }
        }
    }

    Ok(images)
}

fn first_page_image_blocking(path: &Path, dpi: u32) -> Result<Vec<u8>, ScanError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, path)?;

    let pages = document.pages();
    if pages.len() == 0 {
        return Err(ScanError::FileProcessing("PDF has no pages".into()));
    }

    let page = pages
        .first()
        .map_err(|e| ScanError::FileProcessing(format!("failed to load first page: {:?}", e)))?;

    let render_config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
    let bitmap = page
        .render_with_config(&render_config)
        .map_err(|e| ScanError::FileProcessing(format!("first page render failed: {:?}", e)))?;

    encode_png(&bitmap.as_image())
        .map_err(|e| ScanError::FileProcessing(format!("preview encoding failed: {}", e)))
}

fn document_info_blocking(path: &Path) -> Result<PdfInfo, ScanError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, path)?;

    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    Ok(PdfInfo {
        page_count: pages.len() as usize,
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
    })
}

/// PNG-encode a rendered page. Lossless output keeps rendered text crisp for
/// the recognition engine; JPEG artefacts measurably hurt OCR accuracy.
fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

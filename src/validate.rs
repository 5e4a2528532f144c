//! Upload validation: file-type policy, size policy, image integrity.
//!
//! Validation is the first pipeline stage and must run before anything is
//! written to disk — a rejected upload leaves no trace. The checks here are
//! deliberately cheap (string inspection, one decode attempt); anything
//! heavier belongs to later stages.

use crate::error::ScanError;
use std::path::Path;
use tracing::warn;

/// File formats the pipeline accepts, matched on extension.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "bmp", "tiff"];

/// Maximum accepted upload size in bytes (16 MiB).
pub const MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// The declared type of an uploaded document, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Png,
    Jpg,
    Jpeg,
    Bmp,
    Tiff,
}

impl DocumentKind {
    /// Parse the extension after the last `.`, case-insensitively.
    ///
    /// Returns a [`ScanError::Validation`] naming the allowed formats when
    /// the filename has no extension or an unsupported one.
    pub fn from_filename(filename: &str) -> Result<Self, ScanError> {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| unsupported_format_error(filename))?;

        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "png" => Ok(DocumentKind::Png),
            "jpg" => Ok(DocumentKind::Jpg),
            "jpeg" => Ok(DocumentKind::Jpeg),
            "bmp" => Ok(DocumentKind::Bmp),
            "tiff" => Ok(DocumentKind::Tiff),
            _ => Err(unsupported_format_error(filename)),
        }
    }

    /// Lowercase extension string, as reported in outcomes.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Png => "png",
            DocumentKind::Jpg => "jpg",
            DocumentKind::Jpeg => "jpeg",
            DocumentKind::Bmp => "bmp",
            DocumentKind::Tiff => "tiff",
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, DocumentKind::Pdf)
    }
}

fn unsupported_format_error(filename: &str) -> ScanError {
    ScanError::Validation(format!(
        "unsupported file format '{}'; allowed formats: {}",
        filename,
        ALLOWED_EXTENSIONS.join(", ")
    ))
}

/// Filename and size policy checks for uploads.
pub struct FileTypeValidator;

impl FileTypeValidator {
    /// True when the filename carries an allowed extension.
    /// A filename without an extension is never allowed.
    pub fn is_allowed(filename: &str) -> bool {
        DocumentKind::from_filename(filename).is_ok()
    }

    /// True when `byte_size` is within the configured maximum.
    /// A size exactly at the maximum passes.
    pub fn validate_size(byte_size: u64, max_size: u64) -> bool {
        byte_size <= max_size
    }
}

/// Structural verification of image files.
pub struct ImageValidator;

impl ImageValidator {
    /// Attempt to open and fully decode the image.
    ///
    /// Any decode error means the file is invalid or damaged; errors are
    /// logged and converted to `false`, never propagated.
    pub fn is_valid(path: &Path) -> bool {
        let decoded = image::ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(image::ImageError::IoError)
            .and_then(|r| r.decode());

        match decoded {
            Ok(_) => true,
            Err(e) => {
                warn!("image validation failed for {}: {}", path.display(), e);
                false
            }
        }
    }
}

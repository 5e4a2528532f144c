//! Upload persistence: unique naming, write, best-effort removal.
//!
//! Every stored filename embeds a fresh UUID, so concurrent requests never
//! touch the same file and no locking is needed beyond filesystem atomicity
//! of create/delete. The pipeline owns each stored file exclusively and is
//! responsible for calling [`FileStore::cleanup`] before returning.

use crate::error::ScanError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// A file persisted by [`FileStore::save`].
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Full path under the upload directory.
    pub path: PathBuf,
    /// Generated unique filename (`{uuid}_{original}`).
    pub stored_name: String,
}

/// Writes uploads into a dedicated directory and removes them afterwards.
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `upload_dir`, creating the directory if
    /// it does not exist yet.
    pub fn new(upload_dir: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir).map_err(|e| {
            ScanError::FileProcessing(format!(
                "failed to create upload directory '{}': {}",
                upload_dir.display(),
                e
            ))
        })?;
        Ok(Self { upload_dir })
    }

    /// The directory uploads are written into.
    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// Generate a collision-resistant stored name for `original_name`.
    pub fn unique_filename(original_name: &str) -> String {
        format!("{}_{}", Uuid::new_v4().simple(), original_name)
    }

    /// Persist `bytes` under a generated unique name.
    ///
    /// I/O failure (disk full, permission denied) is fatal for the current
    /// request and surfaces as [`ScanError::FileProcessing`].
    pub fn save(&self, bytes: &[u8], original_name: &str) -> Result<StoredFile, ScanError> {
        let stored_name = Self::unique_filename(original_name);
        let path = self.upload_dir.join(&stored_name);

        std::fs::write(&path, bytes).map_err(|e| {
            ScanError::FileProcessing(format!("failed to save uploaded file: {}", e))
        })?;

        info!("saved upload: {}", stored_name);
        Ok(StoredFile { path, stored_name })
    }

    /// Delete the file at `path` if present.
    ///
    /// Returns `true` when a file was removed. Deletion failures are logged
    /// and swallowed: by the time cleanup runs the response has already been
    /// computed, so a leftover file must not fail the request.
    pub fn cleanup(&self, path: &Path) -> bool {
        if !path.exists() {
            return false;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                info!("cleaned up: {}", path.display());
                true
            }
            Err(e) => {
                warn!("failed to clean up {}: {}", path.display(), e);
                false
            }
        }
    }
}

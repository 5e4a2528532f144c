//! Pipeline stages for document processing.
//!
//! Each submodule implements one transformation step, so every stage stays
//! independently testable and a rendering or preview backend can be swapped
//! without touching the others.
//!
//! ## Data Flow
//!
//! ```text
//! upload ──▶ validate ──▶ store ──▶ raster ──▶ recognize ──▶ preview ──▶ cleanup
//!            (policy)     (disk)    (pdfium)   (engine)      (base64)
//! ```
//!
//! 1. [`raster`]   — rasterise PDF pages to PNG bytes; runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 2. [`preview`]  — build the base64 representative image
//! 3. [`document`] — the orchestrator tying validation, storage, recognition,
//!    and cleanup into one fail-safe sequence (plus the batch loop)

pub mod document;
pub mod preview;
pub mod raster;

//! Error types surfaced to extraction callers.
//!
//! Only two failure classes reach the caller: the input path did not
//! resolve to a readable file, or the buffer violated the mandatory PE
//! header contract. Everything else degrades to default feature values
//! inside the extractor.

use std::path::PathBuf;

use thiserror::Error;

use crate::pe::PeError;

/// Errors returned by feature extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Input path does not resolve to a readable file.
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// The buffer is not a well-formed PE file at the mandatory-header
    /// level. Carries the file's display name.
    #[error("not a valid PE file: {name}")]
    InvalidFormat {
        name: String,
        #[source]
        source: PeError,
    },

    /// File I/O errors other than a missing path (permissions, size cap).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

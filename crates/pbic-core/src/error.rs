//! Error types for pbic-core.

use thiserror::Error;

/// Result type for pbic-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the compilation core.
///
/// Compile-level failures (missing executable, timeout, tool exited without
/// producing output) are not errors here; they are reported through the logs
/// of a [`crate::CompilationResult`] so the caller still receives the source
/// bundle.
#[derive(Debug, Error)]
pub enum Error {
    /// Input bytes are not a parseable ZIP archive.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// Failed to build a ZIP from a directory tree.
    #[error("archive write error: {0}")]
    ArchiveWrite(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

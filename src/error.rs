//! Error types for the md2abs library.
//!
//! A single [`PublishError`] covers the whole pipeline. Three classes matter
//! to callers:
//!
//! * **Pre-flight** — [`PublishError::InvalidConfig`],
//!   [`PublishError::MissingImages`]: raised before any network call for the
//!   affected document. A document with missing images never uploads anything.
//!
//! * **Transport** — [`PublishError::RemoteCheckFailed`],
//!   [`PublishError::UploadFailed`]: the remote store answered with something
//!   other than success (or "not found" during an existence check). Never
//!   retried; a transient network failure is a terminal failure for that
//!   document's run.
//!
//! * **Local I/O** — reading the document or an image, writing the output.
//!
//! Errors are local to the document they occurred in: the batch orchestrator
//! captures them per document so one bad document never aborts the rest of
//! the batch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the md2abs library.
#[derive(Debug, Error)]
pub enum PublishError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("markdown file not found: '{path}'\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// Could not read the input document.
    #[error("failed to read document '{path}': {source}")]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more referenced images do not exist on disk.
    ///
    /// Carries every missing resolved path, not just the first. Raised
    /// before any network call for the document.
    #[error("missing images: {}", .paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    MissingImages { paths: Vec<PathBuf> },

    /// Could not read an image file that existed at resolution time.
    #[error("failed to read image '{path}': {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Transport errors ──────────────────────────────────────────────────
    /// The remote store returned an error other than "not found" while
    /// checking whether an object already exists.
    #[error("existence check failed for key '{key}': {detail}")]
    RemoteCheckFailed { key: String, detail: String },

    /// The upload call itself failed (non-success HTTP status, connection
    /// error, malformed response payload).
    #[error("upload failed for '{path}': {detail}")]
    UploadFailed { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output Markdown file.
    #[error("failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured output directory does not exist.
    #[error("output directory does not exist: '{path}'")]
    OutputDirMissing { path: PathBuf },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Required backend parameters missing or malformed. Surfaced before
    /// any I/O begins.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The document-discovery glob pattern could not be parsed.
    #[error("invalid glob pattern '{pattern}': {detail}")]
    InvalidPattern { pattern: String, detail: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a worker task panicked).
    #[error("internal error: {0}")]
    Internal(String),
}

//! Error taxonomy for the codex engine.
//!
//! Three failure classes with different blast radii: `Config` is fatal to
//! bootstrap, `DatasetNotFound`/`RecordNotFound` abort a single request,
//! and `ChunkFetch` is recorded in a dataset's `load_errors` without
//! aborting the load of the remaining chunks.

use thiserror::Error;

/// All errors surfaced by the core engine.
#[derive(Debug, Error)]
pub enum CodexError {
    /// Malformed or missing index/presenters document. Fatal to startup.
    #[error("config error: {0}")]
    Config(String),

    /// The requested dataset key is absent from the index metadata.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The requested record id is absent from a merged dataset.
    #[error("record not found: {dataset}/{id}")]
    RecordNotFound { dataset: String, id: String },

    /// A single chunk failed to fetch or parse. Non-fatal: the merge
    /// engine records it and continues with the remaining chunks.
    #[error("failed to fetch {file}: {message}")]
    ChunkFetch { file: String, message: String },
}

impl CodexError {
    /// Machine-readable code used by the HTTP error contract.
    pub fn code(&self) -> &'static str {
        match self {
            CodexError::Config(_) => "config_error",
            CodexError::DatasetNotFound(_) | CodexError::RecordNotFound { .. } => "not_found",
            CodexError::ChunkFetch { .. } => "chunk_fetch_error",
        }
    }
}

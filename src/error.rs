//! Aggregated error type for the pair-bond engine.
//!
//! Every subsystem returns `Result<_, EngineError>`. The facade never
//! panics; all fallible paths surface through this enum, matching the
//! stable error-kind identifiers of the specification.

use thiserror::Error;

/// Every error kind the engine can produce, stable across versions.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A pair value fell outside `[0, 2499]`.
    #[error("pair value {value} out of range 0..=2499")]
    ValueOutOfRange { value: i64 },

    /// A two-character pair failed to decode (wrong length, or a
    /// character outside the 50-symbol alphabet — including `O`/`o`).
    #[error("invalid pair {pair:?}")]
    BadPair { pair: String },

    /// A Token ID string had a pair count outside `[1, 5]`.
    #[error("token id depth {depth} out of range 1..=5")]
    BadDepth { depth: usize },

    /// A surface had no mapping at any cache/storage tier.
    #[error("vocabulary miss for {surface:?}")]
    VocabularyMiss { surface: String },

    /// `info`/`retrieve`/`bonds`/`update_meta` referenced an id not in
    /// `pbm_documents`.
    #[error("unknown document {doc_id}")]
    UnknownDocument { doc_id: String },

    /// The document-address allocator returned an address already in use.
    #[error("duplicate document address {address}")]
    DuplicateDocumentAddress { address: String },

    /// A relational or KV-tier operation failed.
    #[error("storage error: {0}")]
    StorageError(String),

    /// A facade request was missing required fields or had the wrong shape.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::StorageError(err.to_string())
    }
}

impl From<r2d2::Error> for EngineError {
    fn from(err: r2d2::Error) -> Self {
        EngineError::StorageError(err.to_string())
    }
}

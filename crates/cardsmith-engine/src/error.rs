//! Engine error types.

use thiserror::Error;

/// Errors that can occur in generation and scoring.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The generation provider failed (network/API error).
    #[error("Provider error: {0}")]
    Provider(String),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned a payload the engine could not interpret.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Message generation yielded zero usable candidates.
    #[error("No usable message candidates were generated")]
    NoCandidates,

    /// Image generation exhausted its retry budget.
    #[error("Image generation failed after {attempts} attempts")]
    ImageExhausted {
        /// How many attempts were made.
        attempts: u32,
    },

    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] cardsmith_storage::StorageError),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

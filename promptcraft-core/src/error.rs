use std::path::PathBuf;

use thiserror::Error;

/// Failures of the local history store.
///
/// Read-side problems (missing slot, corrupt JSON) are not represented
/// here: reads degrade to an empty history. These variants cover
/// opening the database and persisting the slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open history database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("cannot determine local data directory")]
    NoDataDir,

    #[error("failed to create database directory: {0}")]
    CreateDir(#[from] std::io::Error),

    #[error("failed to persist history: {0}")]
    Persist(#[from] rusqlite::Error),

    #[error("failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures of the optimization gateway.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("optimization request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("no content in Gemini response")]
    EmptyResponse,

    #[error("malformed optimization payload: {0}")]
    InvalidResponse(String),
}

impl OptimizeError {
    /// The single message shown to the user for any gateway failure.
    /// The variant detail stays in the diagnostic log.
    pub fn user_message(&self) -> &'static str {
        "Failed to optimize prompt. Please try again."
    }
}

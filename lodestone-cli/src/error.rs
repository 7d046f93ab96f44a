//! CLI error type.

use lodestone::search::SearchError;
use thiserror::Error;

/// Errors surfaced to the CLI user.
#[derive(Debug, Error)]
pub enum CliError {
    /// An argument clap accepted but the engine's vocabulary rejects.
    #[error("{0}")]
    InvalidArgument(String),

    /// The search failed; the printed envelope carries the details.
    #[error(transparent)]
    Search(#[from] SearchError),

    /// JSON rendering failed.
    #[error("failed to render response: {0}")]
    Render(#[from] serde_json::Error),
}

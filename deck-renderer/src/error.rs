//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Canvas or robot dimensions are unusable.
    #[error("Invalid renderer configuration: {0}")]
    InvalidConfig(String),

    /// The scene has no deck to draw.
    #[error("Scene has no deck")]
    MissingDeck,

    /// Export to a document format failed.
    #[error("Export failed: {0}")]
    Export(String),
}

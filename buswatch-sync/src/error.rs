//! Error types for buswatch-sync.

use thiserror::Error;

use buswatch_render::RenderError;

/// All errors that can arise from reconciliation.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine (popup templating).
    #[error("render error: {0}")]
    Render(#[from] RenderError),
}

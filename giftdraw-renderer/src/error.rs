//! Error types for giftdraw-renderer.

use std::path::PathBuf;

use thiserror::Error;

use giftdraw_core::ErrorKind;

/// All errors that can arise from template rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

impl RenderError {
    /// Rendering only feeds the notification and share collaborators, so every
    /// failure is an external one.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalIoFailure
    }
}

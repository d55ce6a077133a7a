//! Error types for giftdraw-sync.

use std::path::PathBuf;

use thiserror::Error;

use giftdraw_core::{ErrorKind, RegistryError};
use giftdraw_renderer::RenderError;

/// All errors that can arise from the outbound collaborators.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the event store.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (hash store, API payloads).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP failure talking to the mirror or mail relay.
    #[error("HTTP error from {url}: {message}")]
    Http {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The configured credential env var is unset or empty.
    #[error("missing credential: environment variable {var} is not set")]
    MissingToken { var: String },

    /// The remote answered with something we cannot interpret.
    #[error("unexpected response from {url}: {message}")]
    Remote { url: String, message: String },
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::Registry(e) => e.kind(),
            _ => ErrorKind::ExternalIoFailure,
        }
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Map a `ureq` failure for `url` into [`SyncError::Http`].
pub(crate) fn http_err(url: &str, err: ureq::Error) -> SyncError {
    match err {
        ureq::Error::Status(code, resp) => SyncError::Http {
            url: url.to_string(),
            status: Some(code),
            message: format!("status {code} {}", resp.status_text()),
        },
        ureq::Error::Transport(t) => SyncError::Http {
            url: url.to_string(),
            status: None,
            message: t.to_string(),
        },
    }
}

//! Error types for giftdraw-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification shared by every crate in the workspace.
///
/// Callers branch on this instead of on concrete error enums; the concrete
/// enums carry the user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    DuplicatePhone,
    NoCapacity,
    NotFound,
    UnknownCategory,
    /// Storage, network or mail collaborator failure.
    ExternalIoFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::DuplicatePhone => "duplicate_phone",
            ErrorKind::NoCapacity => "no_capacity",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UnknownCategory => "unknown_category",
            ErrorKind::ExternalIoFailure => "external_io_failure",
        };
        f.write_str(s)
    }
}

/// All errors that can arise from registry operations and event storage.
///
/// Display strings are meant to be shown to the guest or admin verbatim.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A name, phone or capacity failed validation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("the phone number {phone} is already registered")]
    DuplicatePhone { phone: String },

    #[error("all categories have already been assigned")]
    NoCapacity,

    #[error("no guest is registered with phone number {phone}")]
    NotFound { phone: String },

    #[error("unknown category '{name}'")]
    UnknownCategory { name: String },

    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.giftdraw/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// The event has not been initialised yet.
    #[error("event not found at {path}; run `giftdraw init` first")]
    EventNotFound { path: PathBuf },

    /// Another process holds the event lock.
    #[error("event is busy (lock held at {path}); try again")]
    Locked { path: PathBuf },
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::InvalidInput(_) => ErrorKind::InvalidInput,
            RegistryError::DuplicatePhone { .. } => ErrorKind::DuplicatePhone,
            RegistryError::NoCapacity => ErrorKind::NoCapacity,
            RegistryError::NotFound { .. } => ErrorKind::NotFound,
            RegistryError::UnknownCategory { .. } => ErrorKind::UnknownCategory,
            RegistryError::Io(_)
            | RegistryError::Yaml(_)
            | RegistryError::Parse { .. }
            | RegistryError::HomeNotFound
            | RegistryError::EventNotFound { .. }
            | RegistryError::Locked { .. } => ErrorKind::ExternalIoFailure,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        RegistryError::InvalidInput(msg.into())
    }
}

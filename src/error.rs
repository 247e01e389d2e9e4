use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by registry, store and lifecycle operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistryError {
    /// Profile directory or one of its documents is absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A profile with this id is already installed.
    #[error("gateway profile '{0}' already exists")]
    AlreadyExists(String),

    /// The requested port is claimed by another profile.
    #[error("port {port} is already used by gateway '{owner}'")]
    PortConflict { port: u16, owner: String },

    /// Missing or malformed request fields.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The configuration document cannot be parsed.
    #[error("corrupt document '{}': {reason}", path.display())]
    CorruptDocument { path: PathBuf, reason: String },

    /// The supervisor rejected a load or unload request.
    #[error("lifecycle error: {0}")]
    Lifecycle(String),

    /// A bulk procedure or the keep-alive installer failed.
    #[error("external tool failed: {0}")]
    ExternalTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn corrupt(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::CorruptDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

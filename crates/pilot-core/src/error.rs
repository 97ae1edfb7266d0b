use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PilotError {
    #[error("source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("asset not found in bundle: {0}")]
    AssetNotFound(String),

    #[error("invalid JSON in {}: {reason}", path.display())]
    InvalidJson { path: PathBuf, reason: String },

    #[error("{} must contain a JSON object at the top level", .0.display())]
    NotAnObject(PathBuf),

    #[error("written file failed validation: {0}")]
    ValidationFailed(String),

    #[error("release lookup failed: {0}")]
    Network(String),

    #[error("release response has no version at '{0}'")]
    MissingVersion(String),

    #[error("executable not found on PATH: {0}")]
    ExecutableNotFound(String),

    #[error("upgrade command failed: {0}")]
    UpgradeFailed(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Coarse classification callers use to tell fallback-worthy failures from fatal ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidFormat,
    IoFailure,
    NetworkFailure,
}

impl PilotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PilotError::SourceNotFound(_)
            | PilotError::AssetNotFound(_)
            | PilotError::ExecutableNotFound(_)
            | PilotError::HomeNotFound => ErrorKind::NotFound,
            PilotError::InvalidJson { .. }
            | PilotError::NotAnObject(_)
            | PilotError::ValidationFailed(_)
            | PilotError::MissingVersion(_)
            | PilotError::Yaml(_)
            | PilotError::Json(_) => ErrorKind::InvalidFormat,
            PilotError::Network(_) => ErrorKind::NetworkFailure,
            PilotError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            PilotError::Io(_) | PilotError::UpgradeFailed(_) => ErrorKind::IoFailure,
        }
    }
}

impl From<reqwest::Error> for PilotError {
    fn from(e: reqwest::Error) -> Self {
        PilotError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PilotError>;

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{backend} not available: {reason}")]
    BackendUnavailable {
        backend: String,
        reason: String,
    },
    #[error("{backend} failed: {reason}")]
    BackendFailed {
        backend: String,
        reason: String,
    },
    #[error("failed to read bench json: {reason}")]
    ReportUnreadable {
        path: PathBuf,
        reason: String,
    },
    #[error("baseline missing: {}", .0.display())]
    BaselineMissing(PathBuf),
    #[error("baseline unreadable: {}: {reason}", .path.display())]
    BaselineCorrupt {
        path: PathBuf,
        reason: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub fn backend_failed(
        backend: &str,
        reason: impl ToString,
    ) -> Self {
        Self::BackendFailed {
            backend: backend.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, HarnessError::BackendUnavailable { .. })
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;

//! Error types for trackboard-core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("tracking service unavailable: {0}")]
    TrackingServiceUnavailable(String),

    #[error("could not preview {path}: {reason}")]
    PreviewParse { path: String, reason: String },

    #[error("artifact tree under '{path}' is deeper than {max_depth} levels")]
    MaxDepthExceeded { path: String, max_depth: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        DashError::TrackingServiceUnavailable(err.to_string())
    }
}

impl DashError {
    pub(crate) fn preview(path: &str, reason: impl ToString) -> Self {
        DashError::PreviewParse {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;

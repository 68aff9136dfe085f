use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum DataError {
    #[error("unknown dataset category: {0}")]
    #[diagnostic(help("known categories: housing, crime, calls_311"))]
    UnknownCategory(String),

    #[error("upstream request failed: {0}")]
    UpstreamRequest(String),

    #[error("upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("invalid filter (expected key=value): {0}")]
    InvalidFilter(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("no dataset could be exported")]
    NoDatasetsExported,
}

impl DataError {
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            DataError::UpstreamRequest(_) | DataError::UpstreamStatus { .. }
        )
    }
}

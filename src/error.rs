use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovmarksError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report not found: {}", .0.display())]
    ReportNotFound(PathBuf),

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CovmarksError>;

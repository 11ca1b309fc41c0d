use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the collaborators around the aggregator: loading input,
/// writing exports, reading configuration. The aggregator itself never fails.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Cannot infer input format for {0}; use --format json|csv")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid period data: {0}")]
    InvalidData(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

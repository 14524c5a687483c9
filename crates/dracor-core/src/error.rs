// crates/dracor-core/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("table is missing required column '{0}'")]
    MissingColumn(String),

    #[error("corpus '{corpus}' has no plays; relative shares are undefined")]
    EmptyGroup { corpus: String },

    #[error("unknown metric '{0}'")]
    UnknownMetric(String),

    #[error("invalid range '{0}': expected START..END")]
    InvalidRange(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

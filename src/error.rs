use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a dataset from loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited file: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed parquet file: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("unreadable arrow batch: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("expected a top-level JSON array of records")]
    NotAnArray,

    #[error("row {row}: expected a JSON object")]
    NotAnObject { row: usize },

    #[error("dataset is missing required column '{0}'")]
    MissingColumn(String),

    /// `row` counts data rows from 1, header excluded.
    #[error("data row {row} (header excluded): column '{column}' has invalid value '{value}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

pub mod config;
pub use config::{Config, DataConfig, DisplayConfig, ExportConfig, FilterConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("Dataset schema error: {0}")]
    Schema(String),
    #[error("Vocabulary error: {0}")]
    Vocabulary(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, RepDataError>;

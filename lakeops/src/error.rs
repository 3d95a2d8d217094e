use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    #[error("Delta Lake error: {0}")]
    DeltaTable(#[from] deltalake::DeltaTableError),

    #[error("Target Delta table not found at: {}", .0.display())]
    TableNotFound(PathBuf),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// True when the target table was missing before any write was attempted.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TableNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

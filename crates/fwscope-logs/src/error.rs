//! Export error types

use thiserror::Error;

use fwscope_client::ClientError;

/// Failure while building or writing an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to fetch logs for export: {0}")]
    Source(#[from] ClientError),

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write export file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

//! Error types for the driver boundary

use thiserror::Error;

/// Errors produced at the engine/driver boundary
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Unsupported engine type: {0}")]
    UnsupportedEngine(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for driver-boundary operations
pub type Result<T> = std::result::Result<T, EngineError>;

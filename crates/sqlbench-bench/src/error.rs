//! Benchmark error taxonomy
//!
//! Every failure surfaces to the caller as one of these kinds; nothing is
//! retried internally and nothing is swallowed.

use crate::normalize::NormalizeError;
use sqlbench_core::{EngineError, EngineKind, Row};
use thiserror::Error;

pub type BenchResult<T> = std::result::Result<T, BenchError>;

/// Benchmark pipeline errors
#[derive(Debug, Error)]
pub enum BenchError {
    /// Rejected before any engine call was made
    #[error("Invalid run request: {0}")]
    Validation(String),

    /// A run failed mid-sequence; accumulated samples were discarded
    #[error("Query execution failed: {0}")]
    Execution(#[from] EngineError),

    /// The raw explain payload did not have the shape the engine promises.
    /// The last run's rows are carried along so the caller can still
    /// render results even though no record was built.
    #[error("Could not normalize {engine} execution plan: {source}")]
    Normalization {
        engine: EngineKind,
        #[source]
        source: NormalizeError,
        rows: Vec<Row>,
    },

    /// A record with the same (db, group) key is already stored.
    /// Informational: execution succeeded, only persistence is withheld.
    #[error("{db} already exists in {group}")]
    Duplicate { db: String, group: String },

    /// Cancelled between runs; partial samples were discarded
    #[error("Benchmark cancelled")]
    Cancelled,
}

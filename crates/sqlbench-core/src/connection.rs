//! Connection trait for the per-engine query execution driver
//!
//! The benchmarking core never opens connections or speaks wire protocols
//! itself; it is handed an object implementing [`Connection`] by the
//! embedding application.

use crate::{EngineKind, Result, Row};
use async_trait::async_trait;

/// Raw result of one query execution against an engine
///
/// `raw_plan` is the engine-specific explain payload in whatever shape the
/// engine produced it; downstream normalization reconciles the shapes.
#[derive(Debug, Clone)]
pub struct EngineReply {
    /// Result rows
    pub rows: Vec<Row>,
    /// Engine-specific explain/plan payload, unshaped
    pub raw_plan: serde_json::Value,
}

impl EngineReply {
    /// Create a reply with rows and a raw plan payload
    pub fn new(rows: Vec<Row>, raw_plan: serde_json::Value) -> Self {
        Self { rows, raw_plan }
    }
}

/// A connection to one target database
#[async_trait]
pub trait Connection: Send + Sync {
    /// The engine this connection talks to
    fn engine(&self) -> EngineKind;

    /// Execute a statement once, returning its rows and the engine's raw
    /// explain payload for that execution.
    async fn run_query(&self, sql: &str) -> Result<EngineReply>;
}

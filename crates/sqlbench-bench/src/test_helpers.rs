//! Test doubles for benchmark pipeline tests

use async_trait::async_trait;
use serde_json::json;
use sqlbench_core::{Connection, EngineError, EngineKind, EngineReply, Result, Row, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A small result set shared by the pipeline tests
pub fn sample_rows() -> Vec<Row> {
    vec![
        Row::new(
            vec!["id".to_string(), "name".to_string()],
            vec![Value::Int64(1), Value::String("alice".to_string())],
        ),
        Row::new(
            vec!["id".to_string(), "name".to_string()],
            vec![Value::Int64(2), Value::String("bob".to_string())],
        ),
    ]
}

/// A raw Postgres explain payload with the double wrapper
pub fn pg_plan() -> serde_json::Value {
    json!([{
        "QUERY PLAN": [{
            "Node Type": "Seq Scan",
            "Relation Name": "orders",
            "Total Cost": 10.5
        }]
    }])
}

/// A raw MySQL explain payload (flat object, used as-is)
pub fn mysql_plan() -> serde_json::Value {
    json!({ "rows_examined": 42, "access_type": "ALL" })
}

/// Connection double that replays one canned reply and counts calls
///
/// `failing_on(n)` makes the n-th call (1-based) return a query error
/// instead, for abort-mid-sequence tests.
pub struct ScriptedConnection {
    engine: EngineKind,
    reply: EngineReply,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl ScriptedConnection {
    pub fn new(engine: EngineKind, reply: EngineReply) -> Self {
        Self {
            engine,
            reply,
            fail_on_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    /// Number of `run_query` calls observed so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for ScriptedConnection {
    fn engine(&self) -> EngineKind {
        self.engine
    }

    async fn run_query(&self, _sql: &str) -> Result<EngineReply> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(EngineError::Query(format!("scripted failure on call {call}")));
        }
        Ok(self.reply.clone())
    }
}

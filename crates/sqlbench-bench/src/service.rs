//! Benchmark service
//!
//! Orchestrates the pipeline: validate -> run -> normalize -> build ->
//! dedup-check -> store. Pipelines are serialized per target database so
//! overlapping UI triggers cannot interleave runs against one connection,
//! and the record store is mutated only after the duplicate check, under
//! a single writer lock.

use crate::error::{BenchError, BenchResult};
use crate::history::{BenchHistory, BenchHistoryEntry};
use crate::normalize::normalize_plan;
use crate::record::{Advisory, QueryData};
use crate::runner::BenchmarkRunner;
use crate::store::{RecordKey, RecordStore};
use parking_lot::{Mutex, RwLock};
use sqlbench_core::{CancelHandle, Connection, EngineKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// A request to benchmark one statement against one target database
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Name of the target database
    pub target_db: String,
    /// The statement to benchmark
    pub sql: String,
    /// How many times to run it (must be at least 1)
    pub run_count: u32,
    /// Engine the target database runs on
    pub engine: EngineKind,
    /// User-assigned record name; empty means run-only, not saved
    pub label: String,
    /// Logical grouping key; same emptiness rule as label
    pub group: String,
}

impl RunRequest {
    /// Reject malformed requests before any engine call
    pub fn validate(&self) -> BenchResult<()> {
        if self.run_count == 0 {
            return Err(BenchError::Validation(
                "run count must be at least 1".to_string(),
            ));
        }
        if self.sql.trim().is_empty() {
            return Err(BenchError::Validation(
                "no SQL statement to run".to_string(),
            ));
        }
        Ok(())
    }
}

/// What happened to the record after the benchmark completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Accepted into the record store
    Stored,
    /// Label or group was empty; record delivered but not stored
    NotPersistable,
    /// A record with the same (db, group) key already exists; record
    /// delivered but not stored
    Duplicate { db: String, group: String },
}

/// Result of a completed benchmark pipeline
///
/// The record is always present and renderable; `outcome` says whether it
/// was also persisted. Advisories are informational and non-fatal.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub record: QueryData,
    pub advisories: Vec<Advisory>,
    pub outcome: PersistOutcome,
}

/// Service for running benchmarks and managing their records
pub struct BenchService {
    runner: BenchmarkRunner,
    store: Arc<RwLock<RecordStore>>,
    history: Arc<RwLock<BenchHistory>>,
    /// One gate per target database; taking it serializes pipelines
    pipelines: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl BenchService {
    /// Create a service with its own store and history
    pub fn new() -> Self {
        Self {
            runner: BenchmarkRunner::new(),
            store: Arc::new(RwLock::new(RecordStore::new())),
            history: Arc::new(RwLock::new(BenchHistory::default())),
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Create a service over a shared store and history
    ///
    /// This allows multiple components to observe the same records.
    pub fn with_shared(
        store: Arc<RwLock<RecordStore>>,
        history: Arc<RwLock<BenchHistory>>,
    ) -> Self {
        Self {
            runner: BenchmarkRunner::new(),
            store,
            history,
            pipelines: Mutex::new(HashMap::new()),
        }
    }

    /// Run the full benchmark pipeline for one request
    ///
    /// Hard failures (validation, execution, normalization, cancellation)
    /// come back as `Err`; a duplicate key or an empty label/group is
    /// reported through [`BenchReport::outcome`] with the executed record
    /// still delivered.
    #[tracing::instrument(
        skip(self, connection, request, cancel),
        fields(target_db = %request.target_db, engine = %request.engine, run_count = request.run_count)
    )]
    pub async fn run_benchmark(
        &self,
        connection: Arc<dyn Connection>,
        request: RunRequest,
        cancel: &CancelHandle,
    ) -> BenchResult<BenchReport> {
        request.validate()?;
        if connection.engine() != request.engine {
            return Err(BenchError::Validation(format!(
                "connection speaks {} but the request targets {}",
                connection.engine(),
                request.engine
            )));
        }

        let gate = self.pipeline_gate(&request.target_db);
        let _serial = gate.lock().await;

        let start = std::time::Instant::now();

        let run = match self
            .runner
            .run(&connection, &request.sql, request.run_count, cancel)
            .await
        {
            Ok(run) => run,
            Err(e) => {
                self.record_attempt(&request, start, Some(e.to_string()));
                return Err(e);
            }
        };

        let plan = match normalize_plan(request.engine, &run.last_reply.raw_plan, run.stats) {
            Ok(plan) => plan,
            Err(source) => {
                self.record_attempt(&request, start, Some(source.to_string()));
                // Rows travel with the error so the caller can still show them
                return Err(BenchError::Normalization {
                    engine: request.engine,
                    source,
                    rows: run.last_reply.rows,
                });
            }
        };

        let built = QueryData::build(
            &request.label,
            &request.group,
            &request.target_db,
            &request.sql,
            run.last_reply.rows,
            plan,
        );
        for advisory in &built.advisories {
            tracing::info!(message = advisory.message(), "benchmark advisory");
        }

        let outcome = if !built.is_persistable() {
            PersistOutcome::NotPersistable
        } else {
            match self.store.write().insert(built.record.clone()) {
                Ok(()) => PersistOutcome::Stored,
                Err(BenchError::Duplicate { db, group }) => {
                    tracing::info!(db = %db, group = %group, "record key already stored");
                    PersistOutcome::Duplicate { db, group }
                }
                Err(other) => return Err(other),
            }
        };

        self.record_attempt(&request, start, None);
        tracing::info!(
            samples = run.stats.number_of_sample,
            total_ms = run.stats.total_sample_time,
            outcome = ?outcome,
            "benchmark pipeline completed"
        );

        Ok(BenchReport {
            record: built.record,
            advisories: built.advisories,
            outcome,
        })
    }

    /// All stored records, in insertion order
    pub fn records(&self) -> Vec<QueryData> {
        self.store.read().records().cloned().collect()
    }

    /// Look up a stored record
    pub fn record(&self, key: &RecordKey) -> Option<QueryData> {
        self.store.read().get(key).cloned()
    }

    /// Delete a stored record, freeing its key
    pub fn remove_record(&self, key: &RecordKey) -> Option<QueryData> {
        self.store.write().remove(key)
    }

    /// Most recent benchmark attempts
    pub fn recent_history(&self, limit: usize) -> Vec<BenchHistoryEntry> {
        self.history.read().entries().take(limit).cloned().collect()
    }

    /// Search benchmark history by SQL content
    pub fn search_history(&self, query: &str) -> Vec<BenchHistoryEntry> {
        self.history.read().search(query).cloned().collect()
    }

    /// Clear benchmark history
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    fn pipeline_gate(&self, target_db: &str) -> Arc<AsyncMutex<()>> {
        self.pipelines
            .lock()
            .entry(target_db.to_string())
            .or_default()
            .clone()
    }

    fn record_attempt(
        &self,
        request: &RunRequest,
        start: std::time::Instant,
        error: Option<String>,
    ) {
        let duration_ms = start.elapsed().as_millis() as u64;
        let entry = match error {
            None => BenchHistoryEntry::success(
                request.sql.clone(),
                request.engine,
                request.target_db.clone(),
                duration_ms,
                request.run_count,
            ),
            Some(error) => BenchHistoryEntry::failure(
                request.sql.clone(),
                request.engine,
                request.target_db.clone(),
                duration_ms,
                request.run_count,
                error,
            ),
        };
        self.history.write().add(entry);
    }
}

impl Default for BenchService {
    fn default() -> Self {
        Self::new()
    }
}

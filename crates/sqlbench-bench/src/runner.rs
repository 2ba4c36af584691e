//! Benchmark runner
//!
//! Executes one statement `run_count` times sequentially against a single
//! connection and reduces the per-run elapsed times to [`SampleStats`].
//! Runs never overlap: each run's completion is observed before the next
//! one starts, so timings are not skewed by connection contention.

use crate::error::{BenchError, BenchResult};
use crate::stats::SampleStats;
use sqlbench_core::{CancelHandle, Connection, EngineReply};
use std::sync::Arc;
use std::time::Instant;

/// Output of a completed run sequence
#[derive(Debug, Clone)]
pub struct BenchRun {
    /// Statistics over all runs
    pub stats: SampleStats,
    /// Rows and raw explain payload of the last run; earlier runs
    /// contribute timing samples only
    pub last_reply: EngineReply,
}

/// Executes repeated runs of a statement and aggregates their timings
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Create a new runner
    pub fn new() -> Self {
        Self
    }

    /// Run `sql` against `connection` exactly `run_count` times
    ///
    /// Any run failing aborts the whole sequence and discards the
    /// accumulated samples; partial statistics are never reported. The
    /// cancellation handle is checked between runs and before the first.
    #[tracing::instrument(
        skip(self, connection, sql, cancel),
        fields(engine = %connection.engine(), run_count, sql_preview = %sql.chars().take(100).collect::<String>())
    )]
    pub async fn run(
        &self,
        connection: &Arc<dyn Connection>,
        sql: &str,
        run_count: u32,
        cancel: &CancelHandle,
    ) -> BenchResult<BenchRun> {
        if run_count == 0 {
            return Err(BenchError::Validation(
                "run count must be at least 1".to_string(),
            ));
        }

        let mut samples = Vec::with_capacity(run_count as usize);
        let mut last_reply = None;

        for attempt in 1..=run_count {
            if cancel.is_cancelled() {
                tracing::info!(completed_runs = samples.len(), "benchmark cancelled between runs");
                return Err(BenchError::Cancelled);
            }

            let started = Instant::now();
            let reply = connection.run_query(sql).await.map_err(|e| {
                tracing::error!(attempt = attempt, error = %e, "run failed, aborting sequence");
                BenchError::Execution(e)
            })?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

            tracing::debug!(attempt = attempt, elapsed_ms = elapsed_ms, rows = reply.rows.len(), "run completed");
            samples.push(elapsed_ms);
            last_reply = Some(reply);
        }

        let stats = SampleStats::from_samples(&samples);
        let last_reply = last_reply.ok_or_else(|| {
            BenchError::Validation("run count must be at least 1".to_string())
        })?;

        tracing::info!(
            samples = stats.number_of_sample,
            total_ms = stats.total_sample_time,
            "benchmark sequence completed"
        );

        Ok(BenchRun { stats, last_reply })
    }
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{pg_plan, sample_rows, ScriptedConnection};
    use pretty_assertions::assert_eq;
    use sqlbench_core::EngineKind;

    fn connection() -> Arc<ScriptedConnection> {
        Arc::new(ScriptedConnection::new(
            EngineKind::Postgres,
            EngineReply::new(sample_rows(), pg_plan()),
        ))
    }

    #[tokio::test]
    async fn successful_sequence_yields_one_sample_per_run() {
        let conn = connection();
        let target: Arc<dyn Connection> = conn.clone();
        let runner = BenchmarkRunner::new();

        let run = runner
            .run(&target, "SELECT 1", 5, &CancelHandle::new())
            .await
            .unwrap();

        assert_eq!(conn.call_count(), 5);
        assert_eq!(run.stats.number_of_sample, 5);
        assert!(run.stats.minimum_sample_time <= run.stats.average_sample_time);
        assert!(run.stats.average_sample_time <= run.stats.maximum_sample_time);
        assert_eq!(run.last_reply.rows, sample_rows());
    }

    #[tokio::test]
    async fn zero_run_count_fails_before_any_engine_call() {
        let conn = connection();
        let target: Arc<dyn Connection> = conn.clone();
        let runner = BenchmarkRunner::new();

        let err = runner
            .run(&target, "SELECT 1", 0, &CancelHandle::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Validation(_)));
        assert_eq!(conn.call_count(), 0);
    }

    #[tokio::test]
    async fn mid_sequence_failure_discards_statistics() {
        let conn = Arc::new(
            ScriptedConnection::new(
                EngineKind::Postgres,
                EngineReply::new(sample_rows(), pg_plan()),
            )
            .failing_on(3),
        );
        let target: Arc<dyn Connection> = conn.clone();
        let runner = BenchmarkRunner::new();

        let err = runner
            .run(&target, "SELECT 1", 5, &CancelHandle::new())
            .await
            .unwrap_err();

        // The sequence stopped at the failing run; no further calls, no stats
        assert!(matches!(err, BenchError::Execution(_)));
        assert_eq!(conn.call_count(), 3);
    }

    #[tokio::test]
    async fn cancelled_handle_aborts_without_engine_calls() {
        let conn = connection();
        let target: Arc<dyn Connection> = conn.clone();
        let runner = BenchmarkRunner::new();

        let cancel = CancelHandle::new();
        cancel.cancel();

        let err = runner
            .run(&target, "SELECT 1", 5, &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, BenchError::Cancelled));
        assert_eq!(conn.call_count(), 0);
    }
}

//! Engine result normalization
//!
//! Each engine returns its explain payload in a different shape:
//!
//! - PostgreSQL wraps the plan twice: a one-element array whose single
//!   object holds a `"QUERY PLAN"` field that is itself a one-element
//!   array containing the actual plan object.
//! - MySQL and SQLite hand back a flat object that is used as-is.
//!
//! Normalization reconciles these into one [`ExecutionPlan`]: the timing
//! statistics plus the engine's plan fields at the top level. The
//! transform is pure — the same payload always yields the same plan.

use crate::stats::SampleStats;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlbench_core::EngineKind;
use thiserror::Error;

/// Field PostgreSQL uses to wrap its JSON-format plan
const QUERY_PLAN_FIELD: &str = "QUERY PLAN";

/// Errors that can occur when shaping a raw explain payload
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("Missing QUERY PLAN wrapper in explain output")]
    MissingPlanWrapper,

    #[error("Invalid plan structure: {0}")]
    InvalidStructure(String),
}

/// Result type for plan normalization
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// The engine-agnostic execution plan of one benchmark
///
/// Serializes the statistics fields and the engine-specific plan fields
/// side by side at the top level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPlan {
    pub number_of_sample: u64,
    pub total_sample_time: f64,
    pub minimum_sample_time: f64,
    pub maximum_sample_time: f64,
    pub average_sample_time: f64,
    /// Engine-specific plan fields, splatted beside the statistics
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ExecutionPlan {
    /// Combine timing statistics with shaped plan fields
    pub fn new(stats: SampleStats, fields: Map<String, Value>) -> Self {
        Self {
            number_of_sample: stats.number_of_sample,
            total_sample_time: stats.total_sample_time,
            minimum_sample_time: stats.minimum_sample_time,
            maximum_sample_time: stats.maximum_sample_time,
            average_sample_time: stats.average_sample_time,
            fields,
        }
    }

    /// The timing statistics carried by this plan
    pub fn stats(&self) -> SampleStats {
        SampleStats {
            number_of_sample: self.number_of_sample,
            total_sample_time: self.total_sample_time,
            minimum_sample_time: self.minimum_sample_time,
            maximum_sample_time: self.maximum_sample_time,
            average_sample_time: self.average_sample_time,
        }
    }

    /// Look up an engine-specific plan field
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Shapes one engine's raw explain payload into flat plan fields
pub trait PlanNormalizer: Send + Sync {
    /// The engine whose payload shape this normalizer understands
    fn engine(&self) -> EngineKind;

    /// Extract the flat plan field map from the raw payload
    fn shape(&self, raw: &Value) -> Result<Map<String, Value>>;
}

/// PostgreSQL: unwrap exactly the two wrapper levels around the plan object
pub struct PostgresNormalizer;

impl PlanNormalizer for PostgresNormalizer {
    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }

    fn shape(&self, raw: &Value) -> Result<Map<String, Value>> {
        let inner = raw
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|outer| outer.get(QUERY_PLAN_FIELD))
            .and_then(|wrapped| wrapped.as_array())
            .and_then(|arr| arr.first())
            .ok_or(NormalizeError::MissingPlanWrapper)?;

        inner.as_object().cloned().ok_or_else(|| {
            NormalizeError::InvalidStructure(format!(
                "QUERY PLAN entry is {}, expected an object",
                json_type_name(inner)
            ))
        })
    }
}

/// MySQL: the raw payload is already the plan object
pub struct MySqlNormalizer;

impl PlanNormalizer for MySqlNormalizer {
    fn engine(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn shape(&self, raw: &Value) -> Result<Map<String, Value>> {
        as_plan_object(raw)
    }
}

/// SQLite: same as-is handling as MySQL
pub struct SqliteNormalizer;

impl PlanNormalizer for SqliteNormalizer {
    fn engine(&self) -> EngineKind {
        EngineKind::Sqlite
    }

    fn shape(&self, raw: &Value) -> Result<Map<String, Value>> {
        as_plan_object(raw)
    }
}

fn as_plan_object(raw: &Value) -> Result<Map<String, Value>> {
    raw.as_object().cloned().ok_or_else(|| {
        NormalizeError::InvalidStructure(format!(
            "explain payload is {}, expected an object",
            json_type_name(raw)
        ))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The normalizer variant for an engine
pub fn normalizer_for(engine: EngineKind) -> &'static dyn PlanNormalizer {
    match engine {
        EngineKind::Postgres => &PostgresNormalizer,
        EngineKind::MySql => &MySqlNormalizer,
        EngineKind::Sqlite => &SqliteNormalizer,
    }
}

/// Shape a raw explain payload and merge it with timing statistics
pub fn normalize_plan(
    engine: EngineKind,
    raw: &Value,
    stats: SampleStats,
) -> Result<ExecutionPlan> {
    let fields = normalizer_for(engine).shape(raw)?;
    Ok(ExecutionPlan::new(stats, fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn stats() -> SampleStats {
        SampleStats {
            number_of_sample: 3,
            total_sample_time: 30.0,
            minimum_sample_time: 5.0,
            maximum_sample_time: 15.0,
            average_sample_time: 10.0,
        }
    }

    #[test]
    fn postgres_unwraps_both_nesting_levels() {
        let raw = json!([{ "QUERY PLAN": [ { "planField": 1 } ] }]);

        let plan = normalize_plan(EngineKind::Postgres, &raw, stats()).unwrap();

        let value = serde_json::to_value(&plan).unwrap();
        assert_eq!(value["numberOfSample"], 3);
        assert_eq!(value["totalSampleTime"], 30.0);
        assert_eq!(value["minimumSampleTime"], 5.0);
        assert_eq!(value["maximumSampleTime"], 15.0);
        assert_eq!(value["averageSampleTime"], 10.0);
        // The inner plan object's fields sit at the top level, not nested
        assert_eq!(value["planField"], 1);
        assert!(value.get("QUERY PLAN").is_none());
    }

    #[test]
    fn postgres_rejects_missing_wrapper() {
        for raw in [
            json!({ "planField": 1 }),
            json!([]),
            json!([{ "QUERY PLAN": [] }]),
            json!([{ "Plan": [ { "planField": 1 } ] }]),
        ] {
            let err = normalize_plan(EngineKind::Postgres, &raw, stats()).unwrap_err();
            assert!(matches!(err, NormalizeError::MissingPlanWrapper), "payload: {raw}");
        }
    }

    #[test]
    fn postgres_rejects_non_object_plan_entry() {
        let raw = json!([{ "QUERY PLAN": [ 42 ] }]);

        let err = normalize_plan(EngineKind::Postgres, &raw, stats()).unwrap_err();
        assert!(matches!(err, NormalizeError::InvalidStructure(_)));
    }

    #[test]
    fn mysql_splats_payload_as_is() {
        let raw = json!({ "rows_examined": 42 });

        let plan = normalize_plan(EngineKind::MySql, &raw, stats()).unwrap();

        assert_eq!(plan.get("rows_examined"), Some(&json!(42)));
        assert_eq!(plan.number_of_sample, 3);
        assert_eq!(plan.average_sample_time, 10.0);
    }

    #[test]
    fn sqlite_handling_matches_mysql() {
        let raw = json!({ "rows_examined": 42 });

        let mysql = normalize_plan(EngineKind::MySql, &raw, stats()).unwrap();
        let sqlite = normalize_plan(EngineKind::Sqlite, &raw, stats()).unwrap();

        assert_eq!(mysql.fields, sqlite.fields);
    }

    #[test]
    fn flat_engines_reject_non_object_payloads() {
        for raw in [json!([{ "rows_examined": 42 }]), json!("text plan"), json!(7)] {
            let err = normalize_plan(EngineKind::Sqlite, &raw, stats()).unwrap_err();
            assert!(matches!(err, NormalizeError::InvalidStructure(_)), "payload: {raw}");
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = json!([{ "QUERY PLAN": [ { "Node Type": "Seq Scan", "Total Cost": 10.5 } ] }]);

        let first = normalize_plan(EngineKind::Postgres, &raw, stats()).unwrap();
        let second = normalize_plan(EngineKind::Postgres, &raw, stats()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn plan_round_trips_through_serde() {
        let raw = json!({ "rows_examined": 42, "access_type": "ALL" });
        let plan = normalize_plan(EngineKind::MySql, &raw, stats()).unwrap();

        let json = serde_json::to_string(&plan).unwrap();
        let back: ExecutionPlan = serde_json::from_str(&json).unwrap();

        assert_eq!(back, plan);
        assert_eq!(back.stats(), stats());
    }
}

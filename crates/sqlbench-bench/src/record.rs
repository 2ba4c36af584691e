//! Benchmark record assembly

use crate::normalize::ExecutionPlan;
use crate::stats::SampleStats;
use crate::store::RecordKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlbench_core::Row;
use uuid::Uuid;

/// A persisted benchmark record
///
/// Built only after a full run sequence completed without engine error.
/// Never mutated in place afterwards; a stored record is replaced
/// wholesale or removed by explicit deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryData {
    /// Unique identifier
    pub id: Uuid,

    /// When the record was built
    pub created_at: DateTime<Utc>,

    /// User-assigned name; may be empty (record then runs but is not saved)
    pub label: String,

    /// Logical grouping key; same emptiness rule as label
    pub group: String,

    /// Name of the target database the query ran against
    pub db: String,

    /// The statement executed
    pub sql_string: String,

    /// Result rows from the last run only
    pub returned_rows: Vec<Row>,

    /// Timing statistics over all runs
    #[serde(flatten)]
    pub stats: SampleStats,

    /// Statistics merged with engine-specific plan fields
    pub execution_plan: ExecutionPlan,
}

impl QueryData {
    /// The store key of this record
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.db, &self.group)
    }

    /// Whether the record may be stored (label and group are both set)
    pub fn is_persistable(&self) -> bool {
        !self.label.trim().is_empty() && !self.group.trim().is_empty()
    }
}

/// Informational notice raised while building a record
///
/// Advisories are explicit return values; presenting them is the
/// caller's decision. The run itself still succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    EmptyLabel,
    EmptyGroup,
}

impl Advisory {
    /// User-facing message for this advisory
    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyLabel => "Queries without a label will run but won't be saved",
            Self::EmptyGroup => "Queries without a group will run but won't be saved",
        }
    }
}

/// A freshly assembled record plus any advisories raised while building it
#[derive(Debug, Clone)]
pub struct BuiltRecord {
    pub record: QueryData,
    pub advisories: Vec<Advisory>,
}

impl BuiltRecord {
    /// Whether the contained record may be stored
    pub fn is_persistable(&self) -> bool {
        self.record.is_persistable()
    }
}

impl QueryData {
    /// Assemble a record from a completed benchmark
    ///
    /// Pure assembly, no I/O. Empty or whitespace-only label/group still
    /// yields a complete record, accompanied by the matching advisories.
    pub fn build(
        label: impl Into<String>,
        group: impl Into<String>,
        db: impl Into<String>,
        sql_string: impl Into<String>,
        returned_rows: Vec<Row>,
        execution_plan: ExecutionPlan,
    ) -> BuiltRecord {
        let label = label.into();
        let group = group.into();

        let mut advisories = Vec::new();
        if label.trim().is_empty() {
            advisories.push(Advisory::EmptyLabel);
        }
        if group.trim().is_empty() {
            advisories.push(Advisory::EmptyGroup);
        }

        let record = QueryData {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            label,
            group,
            db: db.into(),
            sql_string: sql_string.into(),
            returned_rows,
            stats: execution_plan.stats(),
            execution_plan,
        };

        BuiltRecord { record, advisories }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use sqlbench_core::Value;

    fn plan() -> ExecutionPlan {
        let stats = SampleStats::from_samples(&[5.0, 15.0]);
        let fields = json!({ "rows_examined": 42 })
            .as_object()
            .cloned()
            .unwrap();
        ExecutionPlan::new(stats, fields)
    }

    fn rows() -> Vec<Row> {
        vec![Row::new(
            vec!["total".to_string()],
            vec![Value::Int64(99)],
        )]
    }

    #[test]
    fn builds_complete_record() {
        let built = QueryData::build("nightly", "sales", "warehouse", "SELECT 1", rows(), plan());

        assert!(built.advisories.is_empty());
        assert!(built.is_persistable());
        assert_eq!(built.record.label, "nightly");
        assert_eq!(built.record.stats, built.record.execution_plan.stats());
        assert_eq!(built.record.returned_rows.len(), 1);
        assert_eq!(built.record.key(), RecordKey::new("warehouse", "sales"));
    }

    #[test]
    fn empty_label_yields_advisory_but_full_record() {
        let built = QueryData::build("", "g1", "db", "SELECT 1", rows(), plan());

        assert_eq!(built.advisories, vec![Advisory::EmptyLabel]);
        assert!(!built.is_persistable());
        // The record itself is still complete and renderable
        assert_eq!(built.record.returned_rows.len(), 1);
        assert_eq!(built.record.stats.number_of_sample, 2);
    }

    #[test]
    fn whitespace_only_group_counts_as_empty() {
        let built = QueryData::build("label", "   ", "db", "SELECT 1", rows(), plan());

        assert_eq!(built.advisories, vec![Advisory::EmptyGroup]);
        assert!(!built.is_persistable());
    }

    #[test]
    fn record_round_trips_through_serde() {
        let built = QueryData::build("l", "g", "db", "SELECT 1", rows(), plan());

        let json = serde_json::to_string(&built.record).unwrap();
        let back: QueryData = serde_json::from_str(&json).unwrap();

        assert_eq!(back, built.record);
    }

    #[test]
    fn serialized_record_carries_stats_at_top_level() {
        let built = QueryData::build("l", "g", "db", "SELECT 1", rows(), plan());

        let value = serde_json::to_value(&built.record).unwrap();
        assert_eq!(value["numberOfSample"], 2);
        assert_eq!(value["executionPlan"]["numberOfSample"], 2);
        assert_eq!(value["executionPlan"]["rows_examined"], 42);
    }
}

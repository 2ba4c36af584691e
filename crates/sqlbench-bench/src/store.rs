//! Record store with duplicate-key protection

use crate::error::BenchError;
use crate::record::QueryData;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Uniqueness key of a stored record: the exact (db, group) pair
///
/// Matching is whole-key equality on both fields. Renders as the probe
/// string `db:<db> group:<group>` for logs and user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub db: String,
    pub group: String,
}

impl RecordKey {
    /// Create a key from a database and group name
    pub fn new(db: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            db: db.into(),
            group: group.into(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "db:{} group:{}", self.db, self.group)
    }
}

/// In-memory collection of stored benchmark records
///
/// Keyed by [`RecordKey`]; insertion order is preserved for display.
/// Check-then-insert happens under one `&mut` borrow, so a caller
/// serializing writes through a single lock gets the single-writer
/// discipline for free.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: IndexMap<RecordKey, QueryData>,
}

impl RecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, rejecting an already-occupied key
    pub fn insert(&mut self, record: QueryData) -> Result<(), BenchError> {
        let key = record.key();
        if self.records.contains_key(&key) {
            tracing::debug!(key = %key, "rejecting duplicate record");
            return Err(BenchError::Duplicate {
                db: key.db,
                group: key.group,
            });
        }

        tracing::debug!(key = %key, record_id = %record.id, "storing benchmark record");
        self.records.insert(key, record);
        Ok(())
    }

    /// Whether a record with this key is stored
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    /// Get a stored record by key
    pub fn get(&self, key: &RecordKey) -> Option<&QueryData> {
        self.records.get(key)
    }

    /// Remove a record by key, returning it if present
    pub fn remove(&mut self, key: &RecordKey) -> Option<QueryData> {
        let removed = self.records.shift_remove(key);
        if let Some(record) = &removed {
            tracing::info!(key = %key, record_id = %record.id, "removed benchmark record");
        }
        removed
    }

    /// Iterate stored records in insertion order
    pub fn records(&self) -> impl Iterator<Item = &QueryData> {
        self.records.values()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

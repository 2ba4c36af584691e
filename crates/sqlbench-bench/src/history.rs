//! Benchmark attempt history

use chrono::{DateTime, Utc};
use sqlbench_core::EngineKind;
use std::collections::VecDeque;
use uuid::Uuid;

/// One benchmark attempt, successful or not
#[derive(Clone, Debug)]
pub struct BenchHistoryEntry {
    /// Unique identifier
    pub id: Uuid,

    /// The SQL statement benchmarked
    pub sql: String,

    /// Engine the target database runs on
    pub engine: EngineKind,

    /// Name of the target database
    pub target_db: String,

    /// When the attempt started
    pub executed_at: DateTime<Utc>,

    /// Wall-clock duration of the whole pipeline in milliseconds
    pub duration_ms: u64,

    /// Requested number of runs
    pub run_count: u32,

    /// Error message if the attempt failed
    pub error: Option<String>,

    /// Whether the attempt succeeded
    pub success: bool,
}

impl BenchHistoryEntry {
    /// Create a successful history entry
    pub fn success(
        sql: String,
        engine: EngineKind,
        target_db: String,
        duration_ms: u64,
        run_count: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sql,
            engine,
            target_db,
            executed_at: Utc::now(),
            duration_ms,
            run_count,
            error: None,
            success: true,
        }
    }

    /// Create a failed history entry
    pub fn failure(
        sql: String,
        engine: EngineKind,
        target_db: String,
        duration_ms: u64,
        run_count: u32,
        error: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sql,
            engine,
            target_db,
            executed_at: Utc::now(),
            duration_ms,
            run_count,
            error: Some(error),
            success: false,
        }
    }
}

/// Bounded log of benchmark attempts, most recent first
pub struct BenchHistory {
    entries: VecDeque<BenchHistoryEntry>,
    max_entries: usize,
}

impl BenchHistory {
    /// Create a new history keeping at most `max_entries`
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    /// Add an entry
    pub fn add(&mut self, entry: BenchHistoryEntry) {
        tracing::debug!(
            entry_id = %entry.id,
            success = entry.success,
            duration_ms = entry.duration_ms,
            "adding benchmark to history"
        );
        self.entries.push_front(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    /// Iterate all entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &BenchHistoryEntry> {
        self.entries.iter()
    }

    /// Entries for one target database
    pub fn for_target(&self, target_db: &str) -> impl Iterator<Item = &BenchHistoryEntry> {
        let target = target_db.to_string();
        self.entries.iter().filter(move |e| e.target_db == target)
    }

    /// Search entries by SQL content
    pub fn search(&self, query: &str) -> impl Iterator<Item = &BenchHistoryEntry> {
        let query_lower = query.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.sql.to_lowercase().contains(&query_lower))
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        let count = self.entries.len();
        tracing::info!(entries_cleared = count, "clearing benchmark history");
        self.entries.clear();
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for BenchHistory {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(sql: &str, target: &str) -> BenchHistoryEntry {
        BenchHistoryEntry::success(sql.to_string(), EngineKind::Sqlite, target.to_string(), 12, 3)
    }

    #[test]
    fn keeps_most_recent_first_and_trims() {
        let mut history = BenchHistory::new(2);
        history.add(entry("SELECT 1", "a"));
        history.add(entry("SELECT 2", "a"));
        history.add(entry("SELECT 3", "a"));

        let sqls: Vec<_> = history.entries().map(|e| e.sql.as_str()).collect();
        assert_eq!(sqls, vec!["SELECT 3", "SELECT 2"]);
    }

    #[test]
    fn filters_by_target_and_search_term() {
        let mut history = BenchHistory::default();
        history.add(entry("SELECT * FROM users", "crm"));
        history.add(entry("SELECT * FROM orders", "shop"));

        assert_eq!(history.for_target("shop").count(), 1);
        assert_eq!(history.search("USERS").count(), 1);
        assert_eq!(history.search("missing").count(), 0);
    }
}

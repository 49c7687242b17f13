//! In-memory [`ScheduleStore`] that records operations for test assertions.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use crate::model::{ScheduleRow, WeekKey};
use crate::ports::{ScheduleStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Record of a store operation.
pub enum StoreOp {
    /// A single key lookup.
    Get {
        /// Key that was read.
        key: String,
    },
    /// A batch write.
    BatchPut {
        /// Number of rows in the batch.
        rows: usize,
    },
}

#[derive(Debug, Default)]
/// Store keeping rows in a map guarded by a lock.
///
/// Batches are applied under one write lock, so readers never observe half of one.
pub struct MemoryStore {
    rows: RwLock<BTreeMap<String, ScheduleRow>>,
    operations: Mutex<Vec<StoreOp>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents keyed by week key.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, ScheduleRow> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Operations performed since creation or the last [`Self::clear_operations`].
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp> {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of `get` calls recorded.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.operations()
            .iter()
            .filter(|op| matches!(op, StoreOp::Get { .. }))
            .count()
    }

    /// Forget recorded operations.
    pub fn clear_operations(&self) {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Make every subsequent `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `batch_put` fail without applying anything.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn record(&self, op: StoreOp) {
        self.operations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(op);
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn get(&self, week: &WeekKey) -> Result<Option<ScheduleRow>, StoreError> {
        let key = week.as_key();
        self.record(StoreOp::Get { key: key.clone() });
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!("read of {key} rejected")));
        }
        let rows = self
            .rows
            .read()
            .map_err(|_poisoned| StoreError::Unavailable("store lock poisoned".to_owned()))?;
        Ok(rows.get(&key).cloned())
    }

    async fn batch_put(&self, rows: &[ScheduleRow]) -> Result<(), StoreError> {
        self.record(StoreOp::BatchPut { rows: rows.len() });
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("batch write rejected".to_owned()));
        }
        let mut stored = self
            .rows
            .write()
            .map_err(|_poisoned| StoreError::Unavailable("store lock poisoned".to_owned()))?;
        for row in rows {
            stored.insert(row.week_key.as_key(), row.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn row(week: &str, day: &str, bin: &str) -> ScheduleRow {
        let week_key = WeekKey::new(week.parse::<NaiveDate>().expect("date")).expect("monday");
        ScheduleRow::new(week_key, day.parse().expect("date"), bin).expect("row")
    }

    #[tokio::test]
    async fn records_operations() {
        let store = MemoryStore::new();
        let written = row("2023-01-23", "2023-01-26", "Recycling bin");
        store
            .batch_put(&[written.clone()])
            .await
            .expect("put");
        let found = store.get(&written.week_key).await.expect("get");

        assert_eq!(found, Some(written));
        assert_eq!(
            store.operations(),
            vec![
                StoreOp::BatchPut { rows: 1 },
                StoreOp::Get {
                    key: "2023-01-23".to_owned()
                },
            ]
        );
        assert_eq!(store.reads(), 1);
    }

    #[tokio::test]
    async fn identical_rewrite_is_harmless() {
        let store = MemoryStore::new();
        let rows = vec![
            row("2023-01-23", "2023-01-26", "Recycling bin"),
            row("2023-01-30", "2023-02-02", "Food waste bin"),
        ];
        store.batch_put(&rows).await.expect("first");
        let once = store.snapshot();
        store.batch_put(&rows).await.expect("second");
        assert_eq!(store.snapshot(), once);
    }

    #[tokio::test]
    async fn failure_injection() {
        let store = MemoryStore::new();
        store.fail_writes(true);
        let rows = vec![row("2023-01-23", "2023-01-26", "Recycling bin")];
        assert!(store.batch_put(&rows).await.is_err());
        assert!(store.snapshot().is_empty());

        store.fail_reads(true);
        let week = WeekKey::new("2023-01-23".parse().expect("date")).expect("monday");
        assert!(store.get(&week).await.is_err());
    }
}

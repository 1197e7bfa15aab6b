//! In-memory [`SubmissionStore`] implementation.
//!
//! Records live in a `Vec` behind a `parking_lot::RwLock`. The ID counter sits
//! under the same lock as the records, so an ID is assigned and its record
//! appended in one critical section: IDs are unique, strictly increasing, and
//! appear in the vector in assignment order even with parallel writers.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use super::{
    format_submission_id, ListQuery, SortField, SortOrder, SubmissionPage, SubmissionRecord,
    SubmissionStore,
};

/// Source of `createdAt` timestamps.
pub type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

struct StoredRecord {
    seq: u64,
    record: SubmissionRecord,
}

struct Inner {
    records: Vec<StoredRecord>,
    next_seq: u64,
}

/// Process-lifetime submission store.
pub struct InMemoryStore {
    inner: RwLock<Inner>,
    clock: Clock,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(Utc::now))
    }

    /// Creates a store that stamps records with `clock` instead of the
    /// system time.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: RwLock::new(Inner {
                records: Vec::new(),
                next_seq: 1,
            }),
            clock,
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionStore for InMemoryStore {
    async fn add(&self, data: Value) -> Result<SubmissionRecord> {
        let mut inner = self.inner.write();

        let seq = inner.next_seq;
        inner.next_seq += 1;

        let record = SubmissionRecord {
            id: format_submission_id(seq),
            data,
            created_at: (self.clock)().trunc_subsecs(3),
        };
        inner.records.push(StoredRecord {
            seq,
            record: record.clone(),
        });

        Ok(record)
    }

    async fn list(&self, query: &ListQuery) -> Result<SubmissionPage> {
        let page = query.page.max(1);
        let limit = query.limit.max(1);

        let inner = self.inner.read();
        let mut sorted: Vec<&StoredRecord> = inner.records.iter().collect();
        // Equal timestamps keep assignment order in both directions.
        match query.sort_field {
            SortField::CreatedAt => sorted.sort_by(|a, b| {
                let by_time = a.record.created_at.cmp(&b.record.created_at);
                let by_time = match query.sort_order {
                    SortOrder::Asc => by_time,
                    SortOrder::Desc => by_time.reverse(),
                };
                by_time.then(a.seq.cmp(&b.seq))
            }),
        }

        let total = sorted.len();
        let items = sorted
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .map(|s| s.record.clone())
            .collect();

        Ok(SubmissionPage {
            items,
            total,
            page,
            total_pages: total.div_ceil(limit),
        })
    }

    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>> {
        let inner = self.inner.read();
        Ok(inner
            .records
            .iter()
            .find(|s| s.record.id == id)
            .map(|s| s.record.clone()))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().records.len())
    }
}

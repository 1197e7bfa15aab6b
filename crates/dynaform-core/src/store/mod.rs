//! Submission storage abstraction.
//!
//! The [`SubmissionStore`] trait defines the append-only record store used by
//! the HTTP layer. Implementations must be `Send + Sync` and must assign IDs
//! that are unique and strictly increasing in assignment order.
//!
//! # Operations
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`add`](SubmissionStore::add) | Append a validated record, assigning its ID and timestamp |
//! | [`list`](SubmissionStore::list) | Sorted, paginated read |
//! | [`get`](SubmissionStore::get) | Exact lookup by ID |
//! | [`count`](SubmissionStore::count) | Number of stored records |

pub mod memory;

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Prefix of every submission ID.
pub const ID_PREFIX: &str = "SUB";

/// Formats the `n`th submission ID: `SUB000001`, `SUB000042`, ...
///
/// The counter is zero-padded to six digits and grows wider past 999999.
pub fn format_submission_id(n: u64) -> String {
    format!("{ID_PREFIX}{n:06}")
}

/// One stored submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: String,
    pub data: Value,
    #[serde(rename = "createdAt", with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Field a listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Error)]
#[error("unsupported sort field '{0}'")]
pub struct UnknownSortField(pub String);

#[derive(Debug, Error)]
#[error("unsupported sort order '{0}'")]
pub struct UnknownSortOrder(pub String);

impl FromStr for SortField {
    type Err = UnknownSortField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            other => Err(UnknownSortField(other.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::CreatedAt => f.write_str("createdAt"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortOrder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(UnknownSortOrder(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Parameters of a paginated listing. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub page: usize,
    pub limit: usize,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            sort_field: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionPage {
    pub items: Vec<SubmissionRecord>,
    pub total: usize,
    pub page: usize,
    /// `ceil(total / limit)`; zero for an empty store.
    pub total_pages: usize,
}

/// Append-only store of validated submissions.
///
/// All operations are async (via `async-trait`) so that backends with real
/// I/O can implement it; the in-memory store returns immediately-ready
/// futures.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Appends `data`, assigning the next ID and the current time.
    async fn add(&self, data: Value) -> Result<SubmissionRecord>;

    /// Returns one page of records in the requested order.
    ///
    /// A page past the end yields an empty `items`, not an error.
    async fn list(&self, query: &ListQuery) -> Result<SubmissionPage>;

    /// Looks up a record by its exact ID.
    async fn get(&self, id: &str) -> Result<Option<SubmissionRecord>>;

    /// Number of stored records.
    async fn count(&self) -> Result<usize>;
}

/// RFC 3339 UTC with millisecond precision, e.g. `2025-01-31T09:30:00.123Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

// Trait boundary between the sequencing engine and the external record store.
//
// NotionStore is the production implementation; MemoryStore (testing.rs)
// backs unit and integration tests with no network.

use async_trait::async_trait;
use thiserror::Error;

use sequencer_common::Record;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(String),

    #[error("Malformed record {record_id}: {reason}")]
    Malformed { record_id: String, reason: String },
}

/// Server-side filters the store can evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Exact, case-sensitive title match.
    TitleEquals(String),
}

/// Options for one query call. Results are always sorted by date ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub filter: Option<RecordFilter>,
    pub cursor: Option<String>,
}

impl QueryOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn title_equals(title: impl Into<String>) -> Self {
        Self {
            filter: Some(RecordFilter::TitleEquals(title.into())),
            cursor: None,
        }
    }

    pub fn with_cursor(&self, cursor: Option<String>) -> Self {
        Self {
            filter: self.filter.clone(),
            cursor,
        }
    }
}

/// One page of query results plus continuation state.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
    pub results: Vec<Record>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one page of records matching `options`, sorted by date ascending.
    async fn query(&self, options: &QueryOptions) -> Result<RecordPage, StoreError>;

    /// Fetch a single record with its full property set.
    async fn retrieve(&self, record_id: &str) -> Result<Record, StoreError>;

    /// Set both relation pointers on a record in one update call.
    /// `None` clears the pointer.
    async fn update_relations(
        &self,
        record_id: &str,
        previous: Option<&str>,
        next: Option<&str>,
    ) -> Result<(), StoreError>;
}

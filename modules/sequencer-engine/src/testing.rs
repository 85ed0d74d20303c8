// In-memory RecordStore for tests.
//
// Behaves like the real store: date-ascending results, exact title
// filtering, offset cursors, page-size pagination. Every query and update
// is recorded for assertions, and failures can be injected per operation.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use sequencer_common::Record;

use crate::store::{QueryOptions, RecordFilter, RecordPage, RecordStore, StoreError};

/// `(record_id, previous, next)` as passed to `update_relations`.
pub type RecordedUpdate = (String, Option<String>, Option<String>);

pub struct MemoryStore {
    records: Mutex<Vec<Record>>,
    malformed: HashMap<String, String>,
    hidden: HashSet<String>,
    page_size: usize,
    fail_queries: bool,
    fail_updates: bool,
    queries: Mutex<Vec<QueryOptions>>,
    updates: Mutex<Vec<RecordedUpdate>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            malformed: HashMap::new(),
            hidden: HashSet::new(),
            page_size: 100,
            fail_queries: false,
            fail_updates: false,
            queries: Mutex::new(Vec::new()),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn with_record(self, record: Record) -> Self {
        self.records
            .lock()
            .expect("records lock poisoned")
            .push(record);
        self
    }

    pub fn with_records(self, records: impl IntoIterator<Item = Record>) -> Self {
        records.into_iter().fold(self, Self::with_record)
    }

    /// `retrieve(id)` fails as a malformed record with `reason`.
    pub fn with_malformed(mut self, id: &str, reason: &str) -> Self {
        self.malformed.insert(id.to_string(), reason.to_string());
        self
    }

    /// Keep `id` retrievable but leave it out of every query result, the
    /// way an eventually consistent query index can lag behind an edit.
    pub fn hiding_from_queries(mut self, id: &str) -> Self {
        self.hidden.insert(id.to_string());
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Every query received, in order.
    pub fn queries(&self) -> Vec<QueryOptions> {
        self.queries.lock().expect("queries lock poisoned").clone()
    }

    /// Every successful update, in order.
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().expect("updates lock poisoned").clone()
    }

    /// Current stored state of a record.
    pub fn record(&self, id: &str) -> Option<Record> {
        self.records
            .lock()
            .expect("records lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

fn matches_filter(record: &Record, filter: Option<&RecordFilter>) -> bool {
    match filter {
        None => true,
        Some(RecordFilter::TitleEquals(title)) => record.title.as_deref() == Some(title.as_str()),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn query(&self, options: &QueryOptions) -> Result<RecordPage, StoreError> {
        self.queries
            .lock()
            .expect("queries lock poisoned")
            .push(options.clone());

        if self.fail_queries {
            return Err(StoreError::Request("query failed (injected)".to_string()));
        }

        let mut matching: Vec<Record> = self
            .records
            .lock()
            .expect("records lock poisoned")
            .iter()
            .filter(|r| !self.hidden.contains(&r.id))
            .filter(|r| matches_filter(r, options.filter.as_ref()))
            .cloned()
            .collect();
        // Stable: equal dates keep insertion order, like the real store.
        matching.sort_by_key(|r| r.date);

        let offset = match options.cursor.as_deref() {
            Some(cursor) => cursor
                .parse::<usize>()
                .map_err(|_| StoreError::Request(format!("invalid cursor {cursor:?}")))?,
            None => 0,
        };
        let end = (offset + self.page_size).min(matching.len());
        let has_more = end < matching.len();

        Ok(RecordPage {
            results: matching.get(offset..end).map(<[Record]>::to_vec).unwrap_or_default(),
            next_cursor: has_more.then(|| end.to_string()),
            has_more,
        })
    }

    async fn retrieve(&self, record_id: &str) -> Result<Record, StoreError> {
        if let Some(reason) = self.malformed.get(record_id) {
            return Err(StoreError::Malformed {
                record_id: record_id.to_string(),
                reason: reason.clone(),
            });
        }
        self.record(record_id)
            .ok_or_else(|| StoreError::Request(format!("record {record_id} not found")))
    }

    async fn update_relations(
        &self,
        record_id: &str,
        previous: Option<&str>,
        next: Option<&str>,
    ) -> Result<(), StoreError> {
        if self.fail_updates {
            return Err(StoreError::Request("update rejected (injected)".to_string()));
        }

        {
            let mut records = self.records.lock().expect("records lock poisoned");
            let record = records
                .iter_mut()
                .find(|r| r.id == record_id)
                .ok_or_else(|| StoreError::Request(format!("record {record_id} not found")))?;
            record.previous = previous.map(String::from);
            record.next = next.map(String::from);
        }

        self.updates.lock().expect("updates lock poisoned").push((
            record_id.to_string(),
            previous.map(String::from),
            next.map(String::from),
        ));
        Ok(())
    }
}

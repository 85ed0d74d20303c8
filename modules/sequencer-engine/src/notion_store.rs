use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use notion_client::{
    DateValue, Filter, NotionClient, Page, PropertyValue, QueryRequest, Sort, UpdatePageRequest,
};
use tracing::{debug, warn};

use sequencer_common::{Config, PropertyNames, Record};

use crate::store::{QueryOptions, RecordFilter, RecordPage, RecordStore, StoreError};

/// `RecordStore` backed by one Notion database.
///
/// Decodes raw pages into `Record`s here so nothing downstream touches
/// untyped property maps.
pub struct NotionStore {
    client: NotionClient,
    database_id: String,
    properties: PropertyNames,
    page_size: u32,
}

impl NotionStore {
    pub fn new(
        client: NotionClient,
        database_id: impl Into<String>,
        properties: PropertyNames,
    ) -> Self {
        Self {
            client,
            database_id: database_id.into(),
            properties,
            page_size: 100,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let client =
            NotionClient::with_base_url(config.notion_token.clone(), &config.notion_base_url);
        Self::new(client, config.notion_database_id.clone(), config.properties.clone())
            .with_page_size(config.page_size)
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    fn query_request(&self, options: &QueryOptions) -> QueryRequest {
        let filter = options.filter.as_ref().map(|f| match f {
            RecordFilter::TitleEquals(title) => {
                Filter::title_equals(self.properties.title.clone(), title.clone())
            }
        });
        QueryRequest {
            filter,
            sorts: vec![Sort::ascending(self.properties.date.clone())],
            start_cursor: options.cursor.clone(),
            page_size: Some(self.page_size),
        }
    }

    /// Map a raw page onto `Record`, failing on a missing or unreadable date
    /// and on properties of an unexpected type. The title property must be
    /// Notion's `title` type, the only type the query filter targets.
    pub fn decode_page(&self, page: &Page) -> Result<Record, StoreError> {
        let malformed = |reason: String| StoreError::Malformed {
            record_id: page.id.clone(),
            reason,
        };
        let names = &self.properties;

        let date = match page.property(&names.date) {
            Some(PropertyValue::Date { date: Some(value) }) => parse_date(value)
                .ok_or_else(|| malformed(format!("unparsable {} {:?}", names.date, value.start)))?,
            Some(PropertyValue::Date { date: None }) | None => {
                return Err(malformed(format!("missing {}", names.date)))
            }
            Some(_) => return Err(malformed(format!("{} is not a date property", names.date))),
        };

        let title = match page.property(&names.title) {
            None => None,
            Some(value @ PropertyValue::Title { .. }) => value.plain_text(),
            Some(_) => return Err(malformed(format!("{} is not a title property", names.title))),
        };

        let participants: BTreeSet<String> =
            references(page, &names.participants).map_err(malformed)?.into_iter().collect();
        let previous = references(page, &names.previous).map_err(malformed)?.into_iter().next();
        let next = references(page, &names.next).map_err(malformed)?.into_iter().next();

        Ok(Record {
            id: page.id.clone(),
            date,
            title,
            participants,
            previous,
            next,
        })
    }
}

fn references(page: &Page, name: &str) -> Result<Vec<String>, String> {
    match page.property(name) {
        None => Ok(Vec::new()),
        Some(value) => value
            .referenced_ids()
            .ok_or_else(|| format!("{name} is not a relation or people property")),
    }
}

/// Accepts RFC 3339 date-times, offset-less date-times (local to
/// `time_zone` when set, otherwise UTC), and bare dates (midnight UTC).
fn parse_date(value: &DateValue) -> Option<DateTime<Utc>> {
    let raw = value.start.as_str();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return match value.time_zone.as_deref() {
            Some(name) => {
                let tz: Tz = name.parse().ok()?;
                tz.from_local_datetime(&naive)
                    .earliest()
                    .map(|local| local.with_timezone(&Utc))
            }
            None => Some(naive.and_utc()),
        };
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[async_trait]
impl RecordStore for NotionStore {
    async fn query(&self, options: &QueryOptions) -> Result<RecordPage, StoreError> {
        let response = self
            .client
            .query_database(&self.database_id, &self.query_request(options))
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        // Pages outside the cohort are never classified or sorted, so one
        // broken page must not fail unrelated invocations.
        let mut results = Vec::with_capacity(response.results.len());
        for page in &response.results {
            match self.decode_page(page) {
                Ok(record) => results.push(record),
                Err(e) => warn!(page_id = %page.id, error = %e, "Skipping undecodable page"),
            }
        }

        Ok(RecordPage {
            results,
            next_cursor: response.next_cursor,
            has_more: response.has_more,
        })
    }

    async fn retrieve(&self, record_id: &str) -> Result<Record, StoreError> {
        let page = self
            .client
            .retrieve_page(record_id)
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        self.decode_page(&page)
    }

    async fn update_relations(
        &self,
        record_id: &str,
        previous: Option<&str>,
        next: Option<&str>,
    ) -> Result<(), StoreError> {
        let as_ids = |id: Option<&str>| id.map(String::from).into_iter().collect::<Vec<_>>();
        let request = UpdatePageRequest::default()
            .set_relation(self.properties.previous.clone(), &as_ids(previous))
            .set_relation(self.properties.next.clone(), &as_ids(next));

        self.client
            .update_page(record_id, &request)
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        debug!(record_id, "Updated relation properties");
        Ok(())
    }
}

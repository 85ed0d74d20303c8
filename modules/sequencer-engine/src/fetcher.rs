use tracing::debug;

use sequencer_common::Record;

use crate::store::{QueryOptions, RecordStore, StoreError};

/// Drain a paginated query into one sequence, pages concatenated in the order
/// the store returned them.
///
/// Each call after the first passes the previous page's cursor. Stops at the
/// first page with `has_more == false`. Any page failure aborts the whole
/// fetch; there is no retry.
pub async fn fetch_all(
    store: &dyn RecordStore,
    options: &QueryOptions,
) -> Result<Vec<Record>, StoreError> {
    let mut records = Vec::new();
    let mut cursor = options.cursor.clone();
    let mut pages = 0usize;

    loop {
        let page = store.query(&options.with_cursor(cursor.take())).await?;
        pages += 1;
        records.extend(page.results);

        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => {
                return Err(StoreError::Request(
                    "store reported more results without a continuation cursor".to_string(),
                ))
            }
        }
    }

    debug!(pages, count = records.len(), "Fetched all result pages");
    Ok(records)
}

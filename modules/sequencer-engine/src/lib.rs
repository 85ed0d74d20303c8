pub mod cohort;
pub mod fetcher;
pub mod linker;
pub mod notion_store;
pub mod pipeline;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod writer;

pub use cohort::{classify, resolve, Cohort, CohortKind};
pub use fetcher::fetch_all;
pub use linker::{link, Neighbors};
pub use notion_store::NotionStore;
pub use pipeline::{Outcome, Sequencer};
pub use store::{QueryOptions, RecordFilter, RecordPage, RecordStore, StoreError};
pub use writer::write_relations;

// Per-invocation sequencing flow:
//
//   Received -> Classified -> Resolved -> Linked -> Written
//
// Unclassifiable and NotInCohort end the run successfully before Written.
// The only mutation is the final write, so a failure at any stage leaves
// nothing to roll back.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use sequencer_common::{SequencerError, Stage};

use crate::cohort::{classify, resolve, CohortKind};
use crate::linker::{link, Neighbors};
use crate::store::{RecordStore, StoreError};
use crate::writer::write_relations;

/// Terminal result of a successful invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Linked {
        previous: Option<String>,
        next: Option<String>,
    },
    Unclassifiable,
    NotInCohort,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Linked { .. } => "linked",
            Outcome::Unclassifiable => "unclassifiable",
            Outcome::NotInCohort => "not_in_cohort",
        }
    }
}

impl From<Neighbors> for Outcome {
    fn from(n: Neighbors) -> Self {
        Outcome::Linked {
            previous: n.previous,
            next: n.next,
        }
    }
}

/// Recomputes the previous/next pointers of one record against its cohort.
///
/// Holds no state between invocations; the store is the only shared resource.
#[derive(Clone)]
pub struct Sequencer {
    store: Arc<dyn RecordStore>,
}

impl Sequencer {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn sequence(&self, record_id: &str) -> Result<Outcome, SequencerError> {
        let record_id = record_id.trim();
        if record_id.is_empty() {
            return Err(SequencerError::MissingIdentifier);
        }
        let store = self.store.as_ref();

        let record = store
            .retrieve(record_id)
            .await
            .map_err(|e| source_error(Stage::Received, e))?;

        let kind = classify(&record);
        info!(record_id, stage = %Stage::Classified, cohort = %kind, "Classified record");
        if kind == CohortKind::Unclassifiable {
            info!(
                record_id,
                stage = %Stage::Classified,
                "No single participant and no title, nothing to sequence"
            );
            return Ok(Outcome::Unclassifiable);
        }

        let cohort = resolve(store, &kind)
            .await
            .map_err(|e| source_error(Stage::Resolved, e))?;
        info!(
            record_id,
            stage = %Stage::Resolved,
            cohort = %kind,
            size = cohort.len(),
            "Resolved cohort"
        );

        let Some(neighbors) = link(&record.id, &cohort.records) else {
            warn!(
                record_id,
                stage = %Stage::Linked,
                cohort = %kind,
                size = cohort.len(),
                "Record missing from its own cohort, skipping write"
            );
            return Ok(Outcome::NotInCohort);
        };

        write_relations(store, &record.id, &neighbors).await?;
        info!(record_id, stage = %Stage::Written, "Sequencing complete");
        Ok(neighbors.into())
    }
}

fn source_error(stage: Stage, err: StoreError) -> SequencerError {
    match err {
        StoreError::Malformed { record_id, reason } => SequencerError::MalformedRecord {
            record_id,
            message: reason,
        },
        StoreError::Request(message) => SequencerError::SourceUnavailable { stage, message },
    }
}

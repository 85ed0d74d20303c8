use std::fmt;

use tracing::debug;

use sequencer_common::Record;

use crate::fetcher::fetch_all;
use crate::store::{QueryOptions, RecordStore, StoreError};

/// Which partitioning rule a record is sequenced under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CohortKind {
    /// Records whose participant set is exactly `{participant}`.
    SingleParticipant(String),
    /// Records sharing this exact title.
    TitledGroup(String),
    /// Zero or several participants and no title: nothing to sequence against.
    Unclassifiable,
}

impl fmt::Display for CohortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CohortKind::SingleParticipant(id) => write!(f, "participant:{id}"),
            CohortKind::TitledGroup(title) => write!(f, "title:{title}"),
            CohortKind::Unclassifiable => f.write_str("unclassifiable"),
        }
    }
}

/// Date-ordered records sharing one classification key. Rebuilt per
/// invocation, never persisted.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub kind: CohortKind,
    pub records: Vec<Record>,
}

impl Cohort {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A single participant wins over the title; a title only applies to
/// records with zero or several participants.
pub fn classify(record: &Record) -> CohortKind {
    if let Some(participant) = record.sole_participant() {
        return CohortKind::SingleParticipant(participant.to_string());
    }
    match record.non_empty_title() {
        Some(title) => CohortKind::TitledGroup(title.to_string()),
        None => CohortKind::Unclassifiable,
    }
}

/// Fetch every record in the cohort, ordered by `(date, id)`.
///
/// The store cannot express "exactly this one participant", so the
/// single-participant cohort is fetched unfiltered and narrowed here.
/// Titles are filtered server-side with an exact match.
pub async fn resolve(store: &dyn RecordStore, kind: &CohortKind) -> Result<Cohort, StoreError> {
    let mut records = match kind {
        CohortKind::SingleParticipant(participant) => {
            let all = fetch_all(store, &QueryOptions::all()).await?;
            let fetched = all.len();
            let members: Vec<Record> = all
                .into_iter()
                .filter(|r| r.sole_participant() == Some(participant.as_str()))
                .collect();
            debug!(
                cohort = %kind,
                fetched,
                kept = members.len(),
                "Narrowed to single-participant records"
            );
            members
        }
        CohortKind::TitledGroup(title) => {
            fetch_all(store, &QueryOptions::title_equals(title.clone())).await?
        }
        CohortKind::Unclassifiable => Vec::new(),
    };

    // Store order is by date only; ties fall back to id so repeated runs agree.
    records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));

    Ok(Cohort {
        kind: kind.clone(),
        records,
    })
}

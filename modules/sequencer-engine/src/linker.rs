use serde::Serialize;

use sequencer_common::Record;

/// Immediate predecessor and successor ids of a record within its cohort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub previous: Option<String>,
    pub next: Option<String>,
}

/// Locate `trigger_id` in the ordered cohort and return its neighbours.
///
/// Uses the first match; returns `None` if the record is not a member.
/// Does not reorder `cohort`.
pub fn link(trigger_id: &str, cohort: &[Record]) -> Option<Neighbors> {
    let index = cohort.iter().position(|r| r.id == trigger_id)?;

    let previous = index
        .checked_sub(1)
        .and_then(|i| cohort.get(i))
        .map(|r| r.id.clone());
    let next = cohort.get(index + 1).map(|r| r.id.clone());

    Some(Neighbors { previous, next })
}

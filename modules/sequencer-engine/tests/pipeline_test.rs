//! End-to-end sequencing runs against the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sequencer_common::{Record, SequencerError};
use sequencer_engine::testing::MemoryStore;
use sequencer_engine::{Outcome, QueryOptions, Sequencer};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn meeting(id: &str, year: i32, month: u32, day: u32) -> Record {
    Record::new(id, Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
}

fn linked(previous: Option<&str>, next: Option<&str>) -> Outcome {
    Outcome::Linked {
        previous: previous.map(String::from),
        next: next.map(String::from),
    }
}

fn run(store: &Arc<MemoryStore>) -> Sequencer {
    Sequencer::new(store.clone())
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn middle_of_titled_group_links_both_sides() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("R3", 2024, 3, 1).with_title("Planning").with_participants(["a", "b"]),
        meeting("R1", 2024, 1, 1).with_title("Planning").with_participants(["a", "b"]),
        meeting("R2", 2024, 2, 1).with_title("Planning").with_participants(["a", "c"]),
        meeting("X", 2024, 2, 15).with_title("Retro").with_participants(["a", "b"]),
    ]));

    let outcome = run(&store).sequence("R2").await.unwrap();

    assert_eq!(outcome, linked(Some("R1"), Some("R3")));
    assert_eq!(
        store.updates(),
        vec![("R2".to_string(), Some("R1".to_string()), Some("R3".to_string()))]
    );
}

#[tokio::test]
async fn sole_member_gets_both_pointers_cleared() {
    let mut only = meeting("R1", 2024, 1, 1).with_participants(["alice"]);
    only.previous = Some("stale".into());
    let store = Arc::new(MemoryStore::new().with_record(only));

    let outcome = run(&store).sequence("R1").await.unwrap();

    assert_eq!(outcome, linked(None, None));
    let stored = store.record("R1").unwrap();
    assert_eq!(stored.previous, None);
    assert_eq!(stored.next, None);
}

#[tokio::test]
async fn untitled_multi_participant_meeting_is_left_alone() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("R1", 2024, 1, 1).with_participants(["a", "b"]),
        meeting("R2", 2024, 2, 1).with_participants(["a", "b"]),
    ]));

    let outcome = run(&store).sequence("R1").await.unwrap();

    assert_eq!(outcome, Outcome::Unclassifiable);
    assert!(store.updates().is_empty());
    assert!(store.queries().is_empty());
}

#[tokio::test]
async fn single_participant_cohort_excludes_other_and_shared_meetings() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("A1", 2024, 1, 1).with_participants(["A"]),
        meeting("B1", 2024, 1, 15).with_participants(["B"]),
        meeting("AB", 2024, 2, 1).with_participants(["A", "B"]).with_title("Sync"),
        meeting("A2", 2024, 3, 1).with_participants(["A"]),
        meeting("B2", 2024, 3, 15).with_participants(["B"]),
        meeting("A3", 2024, 4, 1).with_participants(["A"]),
    ]));

    let outcome = run(&store).sequence("A2").await.unwrap();

    assert_eq!(outcome, linked(Some("A1"), Some("A3")));
    assert_eq!(store.queries()[0], QueryOptions::all());
}

#[tokio::test]
async fn single_participant_wins_over_title() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("T1", 2024, 1, 1).with_title("1:1"),
        meeting("P1", 2024, 2, 1).with_title("1:1").with_participants(["A"]),
        meeting("P2", 2024, 3, 1).with_participants(["A"]),
    ]));

    let outcome = run(&store).sequence("P1").await.unwrap();

    assert_eq!(outcome, linked(None, Some("P2")));
}

#[tokio::test]
async fn first_and_last_have_one_sided_links() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("R1", 2024, 1, 1).with_title("Standup"),
        meeting("R2", 2024, 1, 2).with_title("Standup"),
        meeting("R3", 2024, 1, 3).with_title("Standup"),
    ]));
    let sequencer = run(&store);

    assert_eq!(sequencer.sequence("R1").await.unwrap(), linked(None, Some("R2")));
    assert_eq!(sequencer.sequence("R3").await.unwrap(), linked(Some("R2"), None));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn repeated_runs_write_identical_pointers() {
    let store = Arc::new(MemoryStore::new().with_records([
        meeting("m1", 2024, 5, 1).with_title("Weekly"),
        meeting("m3", 2024, 5, 8).with_title("Weekly"),
        meeting("m2", 2024, 5, 8).with_title("Weekly"),
        meeting("m4", 2024, 5, 15).with_title("Weekly"),
    ]));
    let sequencer = run(&store);

    let first = sequencer.sequence("m3").await.unwrap();
    let second = sequencer.sequence("m3").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, linked(Some("m2"), Some("m4")));
    let updates = store.updates();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0], updates[1]);
}

#[tokio::test]
async fn cohort_spanning_many_pages_is_fully_fetched() {
    let records: Vec<Record> = (1..=7)
        .map(|day| meeting(&format!("d{day}"), 2024, 6, day).with_title("Daily"))
        .collect();
    let store = Arc::new(MemoryStore::new().with_records(records).with_page_size(3));

    let outcome = run(&store).sequence("d7").await.unwrap();

    assert_eq!(outcome, linked(Some("d6"), None));
    let queries = store.queries();
    assert_eq!(queries.len(), 3);
    assert_eq!(queries[0].cursor, None);
    assert_eq!(queries[1].cursor.as_deref(), Some("3"));
    assert_eq!(queries[2].cursor.as_deref(), Some("6"));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_write_is_an_error() {
    let store = Arc::new(
        MemoryStore::new()
            .with_record(meeting("R1", 2024, 1, 1).with_title("Standup"))
            .failing_updates(),
    );

    let err = run(&store).sequence("R1").await.unwrap_err();

    assert!(matches!(err, SequencerError::WriteRejected { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn unknown_record_is_source_unavailable() {
    let store = Arc::new(MemoryStore::new());

    let err = run(&store).sequence("nope").await.unwrap_err();

    assert!(matches!(err, SequencerError::SourceUnavailable { .. }));
}

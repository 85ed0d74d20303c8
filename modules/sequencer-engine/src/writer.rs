use tracing::info;

use sequencer_common::SequencerError;

use crate::linker::Neighbors;
use crate::store::RecordStore;

/// Persist both pointers on the triggering record in one update call.
/// Absent neighbours clear the existing pointer. Not retried.
pub async fn write_relations(
    store: &dyn RecordStore,
    record_id: &str,
    neighbors: &Neighbors,
) -> Result<(), SequencerError> {
    store
        .update_relations(
            record_id,
            neighbors.previous.as_deref(),
            neighbors.next.as_deref(),
        )
        .await
        .map_err(|e| SequencerError::WriteRejected {
            record_id: record_id.to_string(),
            message: e.to_string(),
        })?;

    info!(
        record_id,
        previous = neighbors.previous.as_deref().unwrap_or("-"),
        next = neighbors.next.as_deref().unwrap_or("-"),
        "Wrote relation pointers"
    );
    Ok(())
}

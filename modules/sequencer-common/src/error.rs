use thiserror::Error;

use crate::types::Stage;

/// Failures of a single sequencing invocation.
///
/// `Unclassifiable` and `NotInCohort` are outcomes, not errors, and never
/// appear here.
#[derive(Error, Debug)]
pub enum SequencerError {
    #[error("Inbound event is missing the record identifier")]
    MissingIdentifier,

    #[error("Record source unavailable at stage {stage}: {message}")]
    SourceUnavailable { stage: Stage, message: String },

    #[error("Malformed record {record_id}: {message}")]
    MalformedRecord { record_id: String, message: String },

    #[error("Update rejected for record {record_id}: {message}")]
    WriteRejected { record_id: String, message: String },
}

impl SequencerError {
    /// True when the caller sent a bad request, false for upstream failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, SequencerError::MissingIdentifier)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

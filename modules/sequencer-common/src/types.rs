use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A meeting record as stored in the external database.
///
/// `previous`/`next` are references into the same database, never owned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub date: DateTime<Utc>,
    pub title: Option<String>,
    pub participants: BTreeSet<String>,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Record {
    pub fn new(id: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            date,
            title: None,
            participants: BTreeSet::new(),
            previous: None,
            next: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    /// The participant id when the record has exactly one participant.
    pub fn sole_participant(&self) -> Option<&str> {
        if self.participants.len() == 1 {
            self.participants.iter().next().map(String::as_str)
        } else {
            None
        }
    }

    /// The title as stored, or `None` when absent or whitespace-only.
    pub fn non_empty_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}

/// Pipeline stage, carried on errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Received,
    Classified,
    Resolved,
    Linked,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Received => "received",
            Stage::Classified => "classified",
            Stage::Resolved => "resolved",
            Stage::Linked => "linked",
            Stage::Written => "written",
        };
        f.write_str(s)
    }
}

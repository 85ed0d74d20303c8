use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

// --- Pages ---

/// A Notion page as returned by the pages and database query endpoints.
/// Only the fields the client consumers read are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, PropertyValue>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A single page property value, tagged by Notion's `type` field.
/// Property types nobody reads collapse into `Other`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichText>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Date {
        date: Option<DateValue>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<PageReference>,
    },
    People {
        #[serde(default)]
        people: Vec<UserReference>,
    },
    #[serde(other)]
    Other,
}

impl PropertyValue {
    /// Concatenated plain text of a title or rich_text property.
    pub fn plain_text(&self) -> Option<String> {
        match self {
            PropertyValue::Title { title: parts }
            | PropertyValue::RichText { rich_text: parts } => {
                Some(parts.iter().map(|p| p.plain_text.as_str()).collect())
            }
            _ => None,
        }
    }

    /// Referenced ids of a relation or people property.
    pub fn referenced_ids(&self) -> Option<Vec<String>> {
        match self {
            PropertyValue::Relation { relation } => {
                Some(relation.iter().map(|r| r.id.clone()).collect())
            }
            PropertyValue::People { people } => Some(people.iter().map(|u| u.id.clone()).collect()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Notion date value. `start` is either `YYYY-MM-DD` or an ISO 8601 date-time.
#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    pub start: String,
    pub end: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageReference {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserReference {
    pub id: String,
}

// --- Database query ---

/// Body for `POST /v1/databases/{id}/query`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// A property filter, e.g. `{"property": "Name", "title": {"equals": "Standup"}}`.
#[derive(Debug, Clone, Serialize)]
pub struct Filter {
    pub property: String,
    #[serde(flatten)]
    pub condition: FilterCondition,
}

impl Filter {
    pub fn title_equals(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            condition: FilterCondition::Title(TextCondition {
                equals: value.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Title(TextCondition),
}

#[derive(Debug, Clone, Serialize)]
pub struct TextCondition {
    pub equals: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn ascending(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
}

/// One page of database query results.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub results: Vec<Page>,
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

// --- Page update ---

/// Body for `PATCH /v1/pages/{id}`. Only relation properties are written.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdatePageRequest {
    pub properties: BTreeMap<String, RelationUpdate>,
}

impl UpdatePageRequest {
    /// Set a relation property to exactly `ids`. An empty slice clears it.
    pub fn set_relation(mut self, property: impl Into<String>, ids: &[String]) -> Self {
        self.properties.insert(
            property.into(),
            RelationUpdate {
                relation: ids.iter().map(|id| PageReference { id: id.clone() }).collect(),
            },
        );
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RelationUpdate {
    pub relation: Vec<PageReference>,
}

// --- Errors ---

/// Error body Notion returns alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

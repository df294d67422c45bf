//! Display preferences: the active sort key and collection filters.
//!
//! Preferences travel through the same persistence layer as books and keep
//! the exact wire shape older snapshots used, so a blob written by a previous
//! version (possibly missing whole sections) still loads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::book::ReadingStatus;

/// Which field the visible collection is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Title,
    Author,
    Status,
    #[default]
    AddedAt,
    Rating,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Title => write!(f, "title"),
            Self::Author => write!(f, "author"),
            Self::Status => write!(f, "status"),
            Self::AddedAt => write!(f, "addedAt"),
            Self::Rating => write!(f, "rating"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// A sort field plus direction, stored on the wire as `"field-direction"`
/// (for example `"addedAt-desc"`).
///
/// Parsing is lenient: an unknown field falls back to the default key and an
/// unknown direction falls back to ascending, so a stale or hand-edited
/// settings blob never fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self {
            field: SortField::AddedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field, self.direction)
    }
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        let Some((field, direction)) = value.split_once('-') else {
            return Self::default();
        };
        let field = match field {
            "title" => SortField::Title,
            "author" => SortField::Author,
            "status" => SortField::Status,
            "addedAt" => SortField::AddedAt,
            "rating" => SortField::Rating,
            _ => return Self::default(),
        };
        let direction = match direction {
            "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Self { field, direction }
    }
}

impl From<SortKey> for String {
    fn from(value: SortKey) -> Self {
        value.to_string()
    }
}

/// Restricts the visible collection to one reading status, or shows all.
///
/// Serialized as the status string itself (`"reading"`) or `"all"`; any
/// unrecognized value is read back as [`StatusFilter::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReadingStatus),
}

impl StatusFilter {
    pub fn matches(self, status: ReadingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl From<String> for StatusFilter {
    fn from(value: String) -> Self {
        match value.parse::<ReadingStatus>() {
            Ok(status) => Self::Only(status),
            Err(_) => Self::All,
        }
    }
}

impl From<StatusFilter> for String {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::All => "all".to_owned(),
            StatusFilter::Only(status) => status.to_string(),
        }
    }
}

/// The active collection filters: a free-text query and a status restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub query: String,
    #[serde(rename = "statusFilter")]
    pub status: StatusFilter,
}

/// A partial update to [`Filters`]; `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub query: Option<String>,
    pub status: Option<StatusFilter>,
}

impl FilterPatch {
    pub fn query(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Self::default()
        }
    }

    pub fn status(status: StatusFilter) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Everything the collection view remembers between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub sort: SortKey,
    pub filters: Filters,
}

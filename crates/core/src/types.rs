//! Shared primitive types: project/field type tags and paging windows.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Record identifiers are opaque strings (UUIDs in production).
pub type RecordId = String;

// ---------------------------------------------------------------------------
// Project type
// ---------------------------------------------------------------------------

/// The kind of machine-learning project. Determines which field and
/// training shapes are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Text,
    Numbers,
    Images,
}

impl ProjectType {
    /// Every project type, in the order used for a tenant's default
    /// `projecttypes` column.
    pub const ALL: [ProjectType; 3] = [ProjectType::Text, ProjectType::Images, ProjectType::Numbers];

    /// The `typeid` column value.
    pub fn typeid(self) -> i16 {
        match self {
            ProjectType::Text => 1,
            ProjectType::Numbers => 2,
            ProjectType::Images => 3,
        }
    }

    pub fn from_typeid(typeid: i16) -> Result<Self, CoreError> {
        match typeid {
            1 => Ok(ProjectType::Text),
            2 => Ok(ProjectType::Numbers),
            3 => Ok(ProjectType::Images),
            other => Err(CoreError::CorruptRow(format!("unknown project typeid {other}"))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectType::Text => "text",
            ProjectType::Numbers => "numbers",
            ProjectType::Images => "images",
        }
    }
}

impl FromStr for ProjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ProjectType::Text),
            "numbers" => Ok(ProjectType::Numbers),
            "images" => Ok(ProjectType::Images),
            other => Err(CoreError::InvalidProjectType(other.to_string())),
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field type
// ---------------------------------------------------------------------------

/// Input dimension type for numbers projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Multichoice,
}

impl FieldType {
    /// The `fieldtype` column value.
    pub fn id(self) -> i16 {
        match self {
            FieldType::Number => 1,
            FieldType::Multichoice => 2,
        }
    }

    pub fn from_id(id: i16) -> Result<Self, CoreError> {
        match id {
            1 => Ok(FieldType::Number),
            2 => Ok(FieldType::Multichoice),
            other => Err(CoreError::CorruptRow(format!("unknown fieldtype {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// Default number of rows returned by a paged read.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;

/// Upper bound on a single page.
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// An offset + limit window over rows ordered by insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    pub start: i64,
    pub limit: i64,
}

impl Paging {
    pub fn new(start: i64, limit: i64) -> Self {
        Self { start, limit }
    }

    /// Clamp `start` to non-negative and `limit` to `0..=MAX_PAGE_LIMIT`.
    pub fn normalized(self) -> Self {
        Self {
            start: self.start.max(0),
            limit: self.limit.clamp(0, MAX_PAGE_LIMIT),
        }
    }

    /// True when the window cannot contain any rows.
    pub fn is_empty(&self) -> bool {
        self.limit <= 0
    }
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            start: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_type_round_trips_typeid() {
        for t in ProjectType::ALL {
            assert_eq!(ProjectType::from_typeid(t.typeid()).unwrap(), t);
        }
    }

    #[test]
    fn unknown_project_type_names_the_input() {
        let err = "invalidtype".parse::<ProjectType>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid project type invalidtype");
    }

    #[test]
    fn unknown_typeid_is_corrupt() {
        assert!(matches!(ProjectType::from_typeid(9), Err(CoreError::CorruptRow(_))));
    }

    #[test]
    fn paging_clamps_negative_start() {
        assert_eq!(Paging::new(-4, 10).normalized(), Paging::new(0, 10));
    }

    #[test]
    fn paging_clamps_limit() {
        assert_eq!(Paging::new(0, 5000).normalized().limit, MAX_PAGE_LIMIT);
        assert!(Paging::new(0, -1).normalized().is_empty());
    }
}

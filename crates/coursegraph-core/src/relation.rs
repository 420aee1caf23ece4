//! Relation kinds and prerequisite relations.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::course::Course;

/// The kind of dependency between a course and one of its requirements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    /// The requirement must be completed beforehand.
    #[default]
    Prerequisite,
    /// The requirement may be taken concurrently.
    Corequisite,
}

impl RelationKind {
    /// Catalog label: `"prereq"` or `"coreq"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prerequisite => "prereq",
            Self::Corequisite => "coreq",
        }
    }

    /// Parse a scraped kind label.
    ///
    /// Anything that is not a corequisite label means prerequisite.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "coreq" | "corequisite" | "co-requisite" => Self::Corequisite,
            _ => Self::Prerequisite,
        }
    }

    #[must_use]
    pub const fn is_corequisite(self) -> bool {
        matches!(self, Self::Corequisite)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<String> for RelationKind {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One requirement of a dependent course: an edge `prereq → course`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The required course.
    pub prereq: Course,
    /// Whether it is a prerequisite or a corequisite.
    pub kind: RelationKind,
}

impl Relation {
    #[must_use]
    pub fn new(prereq: impl Into<Course>, kind: RelationKind) -> Self {
        Self {
            prereq: prereq.into(),
            kind,
        }
    }

    #[must_use]
    pub fn prerequisite(prereq: impl Into<Course>) -> Self {
        Self::new(prereq, RelationKind::Prerequisite)
    }

    #[must_use]
    pub fn corequisite(prereq: impl Into<Course>) -> Self {
        Self::new(prereq, RelationKind::Corequisite)
    }
}

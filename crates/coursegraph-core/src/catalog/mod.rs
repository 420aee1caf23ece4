//! Edge store: the immutable prerequisite graph of a whole catalog.
//!
//! # Edge Direction
//!
//! An edge `P → C` means "P is required by C". For every dependent course
//! the store keeps its requirements (incoming edges) together with the
//! [`RelationKind`]; for every course it also keeps its dependents
//! (outgoing edges) so both directions are cheap to walk.
//!
//! Courses that only ever appear as requirements are registered as nodes
//! with an empty requirement list.
//!
//! ## Cache Invalidation
//!
//! [`Catalog::content_hash`] is a BLAKE3 hash of the sorted edge list. Plan
//! caches compare it to decide whether memoized results are still valid.

#![allow(clippy::module_name_repetitions)]

pub mod load;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::course::{CodeStyle, Course};
use crate::graph::PrereqMap;
use crate::relation::{Relation, RelationKind};

pub use load::{CatalogError, RawCatalog, RawRelation, load_catalog_file, load_catalogs};

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Directed prerequisite graph over every course of a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Dependent course → requirement → kind. Every node is a key.
    requirements: BTreeMap<Course, BTreeMap<Course, RelationKind>>,
    /// Requirement → courses that require it. Every node is a key.
    dependents: BTreeMap<Course, BTreeSet<Course>>,
    /// Courses that appeared as keys of the scraped mapping.
    listed: BTreeSet<Course>,
    content_hash: String,
}

impl Catalog {
    /// Build a catalog from `(course, [(prereq, kind)])` pairs.
    ///
    /// Kind labels are parsed leniently (see [`RelationKind::from_label`]).
    /// Later entries for the same course replace earlier ones.
    pub fn from_pairs<I, C, R, P, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: AsRef<str>,
        R: IntoIterator<Item = (P, K)>,
        P: AsRef<str>,
        K: AsRef<str>,
    {
        let mut builder = CatalogBuilder::new(CodeStyle::Full);
        for (course, relations) in pairs {
            builder.insert_course(
                course.as_ref(),
                relations
                    .into_iter()
                    .map(|(prereq, kind)| (prereq.as_ref().to_string(), kind.as_ref().to_string())),
            );
        }
        builder.build()
    }

    /// Return `true` if `course` is a node of the catalog.
    #[must_use]
    pub fn contains(&self, course: &str) -> bool {
        self.requirements.contains_key(course)
    }

    /// Requirements of `course` (incoming edges), sorted by code.
    ///
    /// Unknown courses have no requirements.
    pub fn prerequisites<'a>(
        &'a self,
        course: &str,
    ) -> impl Iterator<Item = (&'a Course, RelationKind)> + use<'a> {
        self.requirements
            .get(course)
            .into_iter()
            .flat_map(|reqs| reqs.iter().map(|(prereq, kind)| (prereq, *kind)))
    }

    /// Courses that require `course` (outgoing edges), sorted by code.
    pub fn dependents<'a>(&'a self, course: &str) -> impl Iterator<Item = &'a Course> + use<'a> {
        self.dependents.get(course).into_iter().flatten()
    }

    /// Every node, sorted.
    pub fn courses(&self) -> impl Iterator<Item = &Course> {
        self.requirements.keys()
    }

    /// Courses with at least one requirement, sorted. These are the
    /// meaningful targets for a plan.
    #[must_use]
    pub fn courses_with_prerequisites(&self) -> Vec<&Course> {
        self.requirements
            .iter()
            .filter(|(_, reqs)| !reqs.is_empty())
            .map(|(course, _)| course)
            .collect()
    }

    /// Courses listed as keys in the source data (as opposed to courses only
    /// referenced as requirements).
    pub fn listed_courses(&self) -> impl Iterator<Item = &Course> {
        self.listed.iter()
    }

    /// Every edge as `(prereq, course, kind)`, sorted by course then prereq.
    pub fn edges(&self) -> impl Iterator<Item = (&Course, &Course, RelationKind)> {
        self.requirements.iter().flat_map(|(course, reqs)| {
            reqs.iter()
                .map(move |(prereq, kind)| (prereq, course, *kind))
        })
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.requirements.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.requirements.values().map(BTreeMap::len).sum()
    }

    /// Number of corequisite edges.
    #[must_use]
    pub fn corequisite_count(&self) -> usize {
        self.edges().filter(|(_, _, kind)| kind.is_corequisite()).count()
    }

    /// Number of courses required by at least one other course.
    #[must_use]
    pub fn gateway_count(&self) -> usize {
        self.dependents.values().filter(|deps| !deps.is_empty()).count()
    }

    /// BLAKE3 hash of the sorted edge list, prefixed with `blake3:`.
    #[must_use]
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// The whole catalog as a [`PrereqMap`].
    #[must_use]
    pub fn to_prereq_map(&self) -> PrereqMap {
        self.requirements
            .iter()
            .map(|(course, reqs)| {
                let relations = reqs
                    .iter()
                    .map(|(prereq, kind)| Relation::new(prereq, *kind))
                    .collect();
                (course.clone(), relations)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// CatalogBuilder
// ---------------------------------------------------------------------------

/// Accumulates scraped entries before freezing them into a [`Catalog`].
///
/// Entries follow mapping-update semantics: inserting a course that is
/// already present replaces its requirement list.
#[derive(Debug, Clone, Default)]
pub struct CatalogBuilder {
    style: CodeStyle,
    entries: BTreeMap<Course, Vec<(Course, RelationKind)>>,
}

impl CatalogBuilder {
    #[must_use]
    pub fn new(style: CodeStyle) -> Self {
        Self {
            style,
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace the requirement list of `course`.
    pub fn insert_course<I, P, K>(&mut self, course: &str, relations: I) -> &mut Self
    where
        I: IntoIterator<Item = (P, K)>,
        P: AsRef<str>,
        K: AsRef<str>,
    {
        let course = Course::normalized(course, self.style);
        let relations = relations
            .into_iter()
            .map(|(prereq, kind)| {
                (
                    Course::normalized(prereq.as_ref(), self.style),
                    RelationKind::from_label(kind.as_ref()),
                )
            })
            .collect();
        if self.entries.insert(course.clone(), relations).is_some() {
            debug!(course = %course, "replacing earlier catalog entry");
        }
        self
    }

    /// Merge a parsed catalog file into the builder.
    pub fn merge(&mut self, raw: RawCatalog) -> &mut Self {
        for (course, relations) in raw {
            self.insert_course(
                &course,
                relations.into_iter().map(RawRelation::into_pair),
            );
        }
        self
    }

    /// Freeze the accumulated entries.
    #[must_use]
    pub fn build(self) -> Catalog {
        let mut requirements: BTreeMap<Course, BTreeMap<Course, RelationKind>> = BTreeMap::new();
        let mut dependents: BTreeMap<Course, BTreeSet<Course>> = BTreeMap::new();
        let listed: BTreeSet<Course> = self.entries.keys().cloned().collect();

        for (course, relations) in self.entries {
            dependents.entry(course.clone()).or_default();
            let reqs = requirements.entry(course.clone()).or_default();
            for (prereq, kind) in relations {
                // One edge per pair; the last occurrence decides the kind.
                reqs.insert(prereq.clone(), kind);
                dependents.entry(prereq).or_default().insert(course.clone());
            }
        }

        // Register pure requirement leaves as nodes.
        for course in dependents.keys() {
            requirements.entry(course.clone()).or_default();
        }

        let content_hash = compute_edge_hash(&requirements);

        Catalog {
            requirements,
            dependents,
            listed,
            content_hash,
        }
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn compute_edge_hash(requirements: &BTreeMap<Course, BTreeMap<Course, RelationKind>>) -> String {
    let mut edges: Vec<(&str, &str, &str)> = requirements
        .iter()
        .flat_map(|(course, reqs)| {
            reqs.iter()
                .map(move |(prereq, kind)| (prereq.as_str(), course.as_str(), kind.as_str()))
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for (prereq, course, kind) in edges {
        hasher.update(prereq.as_bytes());
        hasher.update(b"\x00");
        hasher.update(course.as_bytes());
        hasher.update(b"\x00");
        hasher.update(kind.as_bytes());
        hasher.update(b"\x00");
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

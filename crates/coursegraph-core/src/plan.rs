//! Selections, computed plans, and plan memoization.
//!
//! A [`Selection`] is everything a user picks: targets, exclusions, whether
//! corequisites count, and how a target that is also excluded is treated.
//! [`CourseGraph::plan`] turns a selection into a [`Plan`]; [`PlanCache`]
//! remembers plans per selection so interactive sessions only recompute when
//! the selection actually changes.
//!
//! ## Cache Invalidation
//!
//! Cached plans are tied to the catalog they were computed from. Each lookup
//! compares [`Catalog::content_hash`](crate::Catalog::content_hash) with the
//! hash seen last and clears the cache on mismatch.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::course::Course;
use crate::graph::{CourseGraph, CyclicGraphError, Layers, PrereqMap, TargetExclusionPolicy};

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub targets: Vec<Course>,
    #[serde(default)]
    pub excluded: Vec<Course>,
    #[serde(default = "default_true")]
    pub include_coreqs: bool,
    #[serde(default)]
    pub policy: TargetExclusionPolicy,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            excluded: Vec::new(),
            include_coreqs: default_true(),
            policy: TargetExclusionPolicy::default(),
        }
    }
}

impl Selection {
    /// Select `targets` with corequisites included and nothing excluded.
    pub fn new<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Course>,
    {
        Self {
            targets: targets.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn excluding<I, S>(mut self, courses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Course>,
    {
        self.excluded.extend(courses.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn with_coreqs(mut self, include_coreqs: bool) -> Self {
        self.include_coreqs = include_coreqs;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: TargetExclusionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The same selection with targets and exclusions sorted and deduplicated.
    ///
    /// Normalizing never changes the resulting plan; it only makes equal
    /// selections compare equal.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut targets = self.targets.clone();
        targets.sort_unstable();
        targets.dedup();
        let mut excluded = self.excluded.clone();
        excluded.sort_unstable();
        excluded.dedup();
        Self {
            targets,
            excluded,
            include_coreqs: self.include_coreqs,
            policy: self.policy,
        }
    }
}

/// The outcome of one selection: the pruned subgraph and its layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub selection: Selection,
    pub subgraph: PrereqMap,
    pub layers: Layers,
}

impl Plan {
    /// Layer index of `course`, if it was placed.
    #[must_use]
    pub fn depth_of(&self, course: &str) -> Option<usize> {
        self.layers
            .iter()
            .position(|layer| layer.iter().any(|c| c.as_str() == course))
    }

    /// Number of placed courses.
    #[must_use]
    pub fn placed_count(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subgraph.is_empty()
    }
}

/// Memoized plans keyed by normalized selection.
#[derive(Debug, Default)]
pub struct PlanCache {
    catalog_hash: Option<String>,
    plans: HashMap<Selection, Plan>,
    hits: u64,
    misses: u64,
}

impl PlanCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached plan for `selection`, computing it on a miss.
    ///
    /// Failed computations are not cached.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] when the selected subgraph is cyclic.
    pub fn get_or_compute(
        &mut self,
        graph: &CourseGraph,
        selection: &Selection,
    ) -> Result<&Plan, CyclicGraphError> {
        let hash = graph.catalog().content_hash();
        if self.catalog_hash.as_deref() != Some(hash) {
            if !self.plans.is_empty() {
                debug!(cached = self.plans.len(), "catalog changed, dropping cached plans");
            }
            self.plans.clear();
            self.catalog_hash = Some(hash.to_string());
        }

        match self.plans.entry(selection.normalized()) {
            Entry::Occupied(entry) => {
                self.hits += 1;
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.misses += 1;
                let plan = graph.plan(entry.key())?;
                Ok(entry.insert(plan))
            }
        }
    }

    #[must_use]
    pub const fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub const fn misses(&self) -> u64 {
        self.misses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

const fn default_true() -> bool {
    true
}

//! Graph engine: reachable subgraphs, exclusion pruning, and layering.
//!
//! # Overview
//!
//! The engine wraps an immutable [`Catalog`] and derives everything a
//! renderer needs for one user selection. Nothing is mutated; every call
//! recomputes from the catalog.
//!
//! ## Pipeline
//!
//! ```text
//! Catalog (edge store, may contain cycles)
//!        ↓  CourseGraph::get_subgraph(targets, include_coreqs)
//! PrereqMap (ancestors of the targets)
//!        ↓  exclude::apply_exclusion(subgraph, excluded, targets, policy, include_coreqs)
//! PrereqMap (excluded courses removed, re-pruned for reachability)
//!        ↓  layers::layer(subgraph, include_coreqs)
//! Layers (longest-path depth from the sources)
//! ```
//!
//! ## Diagnostics
//!
//! A [`CourseGraph`] owns the [`tracing::Span`] it was constructed with and
//! enters it for every operation, so callers decide where engine events are
//! scoped instead of relying on global configuration.
//!
//! ## Typical Usage
//!
//! ```rust
//! use coursegraph_core::{Catalog, CourseGraph, Selection};
//!
//! let catalog = Catalog::from_pairs([("M332", vec![("M220", "prereq")])]);
//! let graph = CourseGraph::new(catalog);
//! let plan = graph.plan(&Selection::new(["M332"])).expect("acyclic");
//! assert_eq!(plan.layers.len(), 2);
//! ```

pub mod cycles;
pub mod exclude;
pub mod layers;
pub mod subgraph;

use std::collections::BTreeMap;

use tracing::{Span, info_span, instrument};

use crate::catalog::Catalog;
use crate::course::{CodeStyle, Course};
use crate::plan::{Plan, Selection};
use crate::relation::Relation;

// Re-export primary types at module level for convenience.
pub use cycles::{CycleReport, find_all_cycles, report_cycles};
pub use exclude::{TargetExclusionPolicy, apply_exclusion};
pub use layers::{CyclicGraphError, Layers, layer};

/// Course → its requirements, restricted to some node set.
///
/// Every node of the restricted graph is a key, including courses with no
/// requirements. Relation lists are sorted by requirement code.
pub type PrereqMap = BTreeMap<Course, Vec<Relation>>;

/// The graph engine over one catalog.
#[derive(Debug, Clone)]
pub struct CourseGraph {
    catalog: Catalog,
    span: Span,
}

impl CourseGraph {
    /// Wrap `catalog`, scoping diagnostics to a fresh `course_graph` span.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let span = info_span!("course_graph", catalog = catalog.content_hash());
        Self::with_span(catalog, span)
    }

    /// Wrap `catalog`, scoping diagnostics to the caller's span.
    #[must_use]
    pub const fn with_span(catalog: Catalog, span: Span) -> Self {
        Self { catalog, span }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn span(&self) -> &Span {
        &self.span
    }

    /// Ancestors of `targets` (plus the targets) as an induced subgraph.
    ///
    /// See [`subgraph::reachable_subgraph`].
    pub fn get_subgraph<I, S>(&self, targets: I, include_coreqs: bool) -> PrereqMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.span
            .in_scope(|| subgraph::reachable_subgraph(&self.catalog, targets, include_coreqs))
    }

    /// Run the full pipeline for one selection.
    ///
    /// Exclusion pruning only runs when the selection excludes something.
    ///
    /// # Errors
    ///
    /// Returns [`CyclicGraphError`] when the selected subgraph contains a
    /// prerequisite cycle and therefore cannot be layered.
    pub fn plan(&self, selection: &Selection) -> Result<Plan, CyclicGraphError> {
        self.span.in_scope(|| self.plan_in_scope(selection))
    }

    #[instrument(level = "debug", skip_all, fields(targets = selection.targets.len(), excluded = selection.excluded.len()))]
    fn plan_in_scope(&self, selection: &Selection) -> Result<Plan, CyclicGraphError> {
        let targets = normalize_codes(&selection.targets);
        let mut subgraph =
            subgraph::reachable_subgraph(&self.catalog, &targets, selection.include_coreqs);

        if !selection.excluded.is_empty() {
            subgraph = apply_exclusion(
                &subgraph,
                normalize_codes(&selection.excluded),
                &targets,
                selection.policy,
                selection.include_coreqs,
            );
        }

        let layers = layer(&subgraph, selection.include_coreqs)?;

        Ok(Plan {
            selection: selection.clone(),
            subgraph,
            layers,
        })
    }
}

fn normalize_codes(codes: &[Course]) -> Vec<Course> {
    codes
        .iter()
        .map(|code| Course::normalized(code.as_str(), CodeStyle::Full))
        .collect()
}

/// Every node of a [`PrereqMap`]: its keys plus all requirement endpoints.
#[must_use]
pub fn node_set(map: &PrereqMap) -> std::collections::BTreeSet<&Course> {
    map.iter()
        .flat_map(|(course, relations)| {
            std::iter::once(course).chain(relations.iter().map(|rel| &rel.prereq))
        })
        .collect()
}

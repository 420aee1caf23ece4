//! Reachable-subgraph extraction.
//!
//! Starting from each target, walk **backward** along edges (from a course to
//! its requirements) and collect every course visited. The walk uses an
//! explicit stack and a visited set, so cyclic catalogs and very long chains
//! are both safe.
//!
//! When corequisites are disabled, corequisite edges are not followed: a
//! course reachable only through a corequisite is left out, although the
//! target itself always stays.

use std::collections::BTreeSet;

use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::course::{CodeStyle, Course};
use crate::graph::PrereqMap;
use crate::relation::{Relation, RelationKind};

/// Collect the ancestors of `targets` and return the induced subgraph.
///
/// Targets missing from the catalog are kept as isolated courses. The result
/// contains every visited course as a key, mapped to its requirements that
/// are themselves visited. Corequisite edges between visited courses are
/// kept even when `include_coreqs` is false; layering filters them again.
#[instrument(level = "debug", skip(catalog, targets))]
pub fn reachable_subgraph<I, S>(catalog: &Catalog, targets: I, include_coreqs: bool) -> PrereqMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let visited = ancestors(catalog, targets, include_coreqs);

    let subgraph: PrereqMap = visited
        .iter()
        .map(|course| {
            let relations = catalog
                .prerequisites(course.as_str())
                .filter(|(prereq, _)| visited.contains(*prereq))
                .map(|(prereq, kind)| Relation::new(prereq, kind))
                .collect();
            (course.clone(), relations)
        })
        .collect();

    debug!(nodes = subgraph.len(), "extracted reachable subgraph");
    subgraph
}

/// The node set of [`reachable_subgraph`]: targets plus everything they
/// transitively require.
///
/// Target whitespace is normalized first, so `"MATH\u{a0}332"` finds the
/// catalog's `"MATH 332"`.
pub fn ancestors<I, S>(catalog: &Catalog, targets: I, include_coreqs: bool) -> BTreeSet<Course>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visited: BTreeSet<Course> = BTreeSet::new();
    let mut stack: Vec<Course> = Vec::new();

    for target in targets {
        let target = Course::normalized(target.as_ref(), CodeStyle::Full);
        if !catalog.contains(target.as_str()) {
            debug!(course = %target, "target not in catalog, treating as isolated course");
        }
        stack.push(target);

        while let Some(current) = stack.pop() {
            if visited.contains(&current) {
                continue;
            }
            for (prereq, kind) in catalog.prerequisites(current.as_str()) {
                if (include_coreqs || kind == RelationKind::Prerequisite)
                    && !visited.contains(prereq)
                {
                    stack.push(prereq.clone());
                }
            }
            visited.insert(current);
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &PrereqMap) -> Vec<&str> {
        map.keys().map(Course::as_str).collect()
    }

    #[test]
    fn walks_backward_through_prerequisites() {
        let catalog = Catalog::from_pairs([
            ("M332", vec![("M220", "prereq")]),
            ("M220", vec![("M100", "prereq")]),
            ("M400", vec![("M332", "prereq")]),
        ]);

        let sub = reachable_subgraph(&catalog, ["M332"], true);

        // M400 depends on M332 but is not an ancestor.
        assert_eq!(keys(&sub), vec!["M100", "M220", "M332"]);
        assert_eq!(sub["M332"], vec![Relation::prerequisite("M220")]);
        assert!(sub["M100"].is_empty());
    }

    #[test]
    fn corequisite_chains_skipped_when_disabled() {
        let catalog = Catalog::from_pairs([
            ("CS201", vec![("CS100", "prereq"), ("MATH151", "coreq")]),
            ("MATH151", vec![("MATH100", "prereq")]),
        ]);

        let without = reachable_subgraph(&catalog, ["CS201"], false);
        assert_eq!(keys(&without), vec!["CS100", "CS201"]);

        let with = reachable_subgraph(&catalog, ["CS201"], true);
        assert_eq!(keys(&with), vec!["CS100", "CS201", "MATH100", "MATH151"]);
    }

    #[test]
    fn unknown_target_is_isolated_node() {
        let catalog = Catalog::from_pairs([("M332", vec![("M220", "prereq")])]);

        let sub = reachable_subgraph(&catalog, ["NOPE 999"], true);

        assert_eq!(keys(&sub), vec!["NOPE 999"]);
        assert!(sub["NOPE 999"].is_empty());
        // The catalog itself is untouched.
        assert!(!catalog.contains("NOPE 999"));
    }

    #[test]
    fn target_whitespace_is_normalized() {
        let catalog = Catalog::from_pairs([("MATH 332", vec![("MATH 220", "prereq")])]);

        let sub = reachable_subgraph(&catalog, ["MATH\u{a0}332", "  MATH   220 "], true);

        assert_eq!(keys(&sub), vec!["MATH 220", "MATH 332"]);
        assert_eq!(sub["MATH 332"], vec![Relation::prerequisite("MATH 220")]);
    }

    #[test]
    fn cycles_terminate() {
        let catalog = Catalog::from_pairs([
            ("A", vec![("B", "prereq")]),
            ("B", vec![("C", "prereq")]),
            ("C", vec![("A", "prereq")]),
        ]);

        let sub = reachable_subgraph(&catalog, ["A"], true);
        assert_eq!(keys(&sub), vec!["A", "B", "C"]);
        assert_eq!(sub["C"], vec![Relation::prerequisite("A")]);
    }

    #[test]
    fn induced_edges_include_coreqs_between_visited_nodes() {
        // B is reached through A's prerequisite edge, so the coreq edge B → C
        // between two visited courses is kept for the layering step to filter.
        let catalog = Catalog::from_pairs([
            ("C", vec![("A", "prereq"), ("B", "coreq")]),
            ("A", vec![("B", "prereq")]),
        ]);

        let sub = reachable_subgraph(&catalog, ["C"], false);
        assert_eq!(
            sub["C"],
            vec![Relation::prerequisite("A"), Relation::corequisite("B")]
        );
    }

    #[test]
    fn multiple_targets_share_ancestors() {
        let catalog = Catalog::from_pairs([
            ("M332", vec![("M220", "prereq")]),
            ("M374", vec![("M220", "prereq"), ("M251", "prereq")]),
        ]);

        let sub = reachable_subgraph(&catalog, ["M374", "M332"], true);
        assert_eq!(keys(&sub), vec!["M220", "M251", "M332", "M374"]);
    }

    #[test]
    fn long_chain_does_not_overflow() {
        let pairs: Vec<(String, Vec<(String, &str)>)> = (1..20_000)
            .map(|i| (format!("C{i:05}"), vec![(format!("C{:05}", i - 1), "prereq")]))
            .collect();
        let catalog = Catalog::from_pairs(pairs);

        let visited = ancestors(&catalog, ["C19999"], true);
        assert_eq!(visited.len(), 20_000);
    }
}

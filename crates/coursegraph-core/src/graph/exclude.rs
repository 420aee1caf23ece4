//! Exclusion filtering with re-reachability pruning.
//!
//! Removing a course can disconnect courses that were only reachable through
//! it: for `target → A → X → B`, excluding `X` leaves `B` stranded even though
//! `B` itself was never excluded. Exclusion therefore runs in three steps:
//!
//! 1. drop every excluded course and every requirement edge that starts at
//!    an excluded course;
//! 2. walk backward again from every target that survived step 1, following
//!    corequisite edges only when corequisites are included;
//! 3. keep only the courses found by that walk and the edges between them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::course::Course;
use crate::graph::PrereqMap;
use crate::relation::{Relation, RelationKind};

/// What happens to a course that is both a target and excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetExclusionPolicy {
    /// The exclusion wins: the target disappears and contributes no
    /// reachability root.
    #[default]
    Drop,
    /// The target wins: explicit targets are never excluded.
    Retain,
}

impl TargetExclusionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Retain => "retain",
        }
    }
}

/// Remove `excluded` courses from `subgraph` and prune what became
/// unreachable from `targets`.
///
/// No excluded course appears in the result, neither as a key nor as a
/// requirement. Targets that are not keys of `subgraph` are ignored. With
/// `include_coreqs` false, a course reachable only through corequisite edges
/// is pruned, as in [`reachable_subgraph`](super::subgraph::reachable_subgraph).
#[instrument(level = "debug", skip(subgraph, excluded, targets))]
pub fn apply_exclusion<E, X, T, S>(
    subgraph: &PrereqMap,
    excluded: E,
    targets: T,
    policy: TargetExclusionPolicy,
    include_coreqs: bool,
) -> PrereqMap
where
    E: IntoIterator<Item = X>,
    X: AsRef<str>,
    T: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let targets: Vec<S> = targets.into_iter().collect();
    let target_set: BTreeSet<&str> = targets.iter().map(AsRef::as_ref).collect();

    let excluded: Vec<X> = excluded.into_iter().collect();
    let mut excluded_set: BTreeSet<&str> = excluded.iter().map(AsRef::as_ref).collect();
    if policy == TargetExclusionPolicy::Retain {
        excluded_set.retain(|course| !target_set.contains(course));
    }

    // Step 1: drop excluded nodes and edges that start at them.
    let filtered: PrereqMap = subgraph
        .iter()
        .filter(|(course, _)| !excluded_set.contains(course.as_str()))
        .map(|(course, relations)| {
            let kept: Vec<Relation> = relations
                .iter()
                .filter(|rel| !excluded_set.contains(rel.prereq.as_str()))
                .cloned()
                .collect();
            (course.clone(), kept)
        })
        .collect();

    // Step 2: walk backward from the surviving targets.
    let mut reachable: BTreeSet<&Course> = BTreeSet::new();
    let mut stack: Vec<&Course> = Vec::new();
    for target in &target_set {
        if excluded_set.contains(target) {
            debug!(course = *target, "excluded target contributes no root");
            continue;
        }
        let Some((root, _)) = filtered.get_key_value(*target) else {
            continue;
        };
        stack.push(root);

        while let Some(current) = stack.pop() {
            if !reachable.insert(current) {
                continue;
            }
            let Some(relations) = filtered.get(current) else {
                continue;
            };
            for rel in relations {
                if !include_coreqs && rel.kind == RelationKind::Corequisite {
                    continue;
                }
                if let Some((prereq, _)) = filtered.get_key_value(&rel.prereq) {
                    if !reachable.contains(prereq) {
                        stack.push(prereq);
                    }
                }
            }
        }
    }

    // Step 3: keep only what the walk found.
    let pruned: PrereqMap = filtered
        .iter()
        .filter(|(course, _)| reachable.contains(course))
        .map(|(course, relations)| {
            let kept: Vec<Relation> = relations
                .iter()
                .filter(|rel| reachable.contains(&rel.prereq))
                .cloned()
                .collect();
            (course.clone(), kept)
        })
        .collect();

    debug!(
        before = subgraph.len(),
        after = pruned.len(),
        "applied exclusions"
    );
    pruned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::graph::subgraph::reachable_subgraph;

    fn keys(map: &PrereqMap) -> Vec<&str> {
        map.keys().map(Course::as_str).collect()
    }

    fn chain() -> Catalog {
        // A requires B, B requires C.
        Catalog::from_pairs([("A", vec![("B", "prereq")]), ("B", vec![("C", "prereq")])])
    }

    #[test]
    fn excluding_middle_of_chain_strands_the_rest() {
        let sub = reachable_subgraph(&chain(), ["A"], true);

        let result = apply_exclusion(&sub, ["B"], ["A"], TargetExclusionPolicy::Drop, true);

        assert_eq!(keys(&result), vec!["A"]);
        assert!(result["A"].is_empty());
    }

    #[test]
    fn no_exclusions_is_identity_for_reachable_subgraph() {
        let sub = reachable_subgraph(&chain(), ["A"], true);
        let result = apply_exclusion(
            &sub,
            Vec::<&str>::new(),
            ["A"],
            TargetExclusionPolicy::Drop,
            true,
        );
        assert_eq!(result, sub);
    }

    #[test]
    fn excluded_target_is_skipped_silently() {
        let catalog = Catalog::from_pairs([
            ("A", vec![("B", "prereq")]),
            ("X", vec![("Y", "prereq")]),
        ]);
        let sub = reachable_subgraph(&catalog, ["A", "X"], true);

        let result = apply_exclusion(&sub, ["A"], ["A", "X"], TargetExclusionPolicy::Drop, true);

        // B was only reachable through the excluded target.
        assert_eq!(keys(&result), vec!["X", "Y"]);
    }

    #[test]
    fn retain_policy_keeps_excluded_targets() {
        let catalog = Catalog::from_pairs([
            ("A", vec![("B", "prereq")]),
            ("X", vec![("A", "prereq")]),
        ]);
        let sub = reachable_subgraph(&catalog, ["A", "X"], true);

        let result = apply_exclusion(
            &sub,
            ["A", "B"],
            ["A", "X"],
            TargetExclusionPolicy::Retain,
            true,
        );

        // A survives as a target; B is still excluded.
        assert_eq!(keys(&result), vec!["A", "X"]);
        assert!(result["A"].is_empty());
        assert_eq!(result["X"], vec![Relation::prerequisite("A")]);
    }

    #[test]
    fn shared_prerequisite_survives_through_other_path() {
        // T requires A and B; both require C. Excluding A keeps C via B.
        let catalog = Catalog::from_pairs([
            ("T", vec![("A", "prereq"), ("B", "prereq")]),
            ("A", vec![("C", "prereq")]),
            ("B", vec![("C", "prereq")]),
        ]);
        let sub = reachable_subgraph(&catalog, ["T"], true);

        let result = apply_exclusion(&sub, ["A"], ["T"], TargetExclusionPolicy::Drop, true);

        assert_eq!(keys(&result), vec!["B", "C", "T"]);
        assert_eq!(result["T"], vec![Relation::prerequisite("B")]);
    }

    #[test]
    fn unknown_excluded_course_is_ignored() {
        let sub = reachable_subgraph(&chain(), ["A"], true);
        let result = apply_exclusion(&sub, ["ZZZ"], ["A"], TargetExclusionPolicy::Drop, true);
        assert_eq!(result, sub);
    }

    #[test]
    fn coreq_only_courses_pruned_when_coreqs_disabled() {
        // T requires A and takes B concurrently; A requires B. Excluding A
        // leaves B connected to T only through the corequisite.
        let catalog = Catalog::from_pairs([
            ("T", vec![("A", "prereq"), ("B", "coreq")]),
            ("A", vec![("B", "prereq")]),
        ]);
        let sub = reachable_subgraph(&catalog, ["T"], false);

        let result = apply_exclusion(&sub, ["A"], ["T"], TargetExclusionPolicy::Drop, false);
        assert_eq!(keys(&result), vec!["T"]);
        assert!(result["T"].is_empty());

        let with = reachable_subgraph(&catalog, ["T"], true);
        let result = apply_exclusion(&with, ["A"], ["T"], TargetExclusionPolicy::Drop, true);
        assert_eq!(keys(&result), vec!["B", "T"]);
        assert_eq!(result["T"], vec![Relation::corequisite("B")]);
    }

    #[test]
    fn cyclic_subgraph_terminates() {
        let catalog = Catalog::from_pairs([
            ("A", vec![("B", "prereq")]),
            ("B", vec![("A", "prereq"), ("C", "prereq")]),
        ]);
        let sub = reachable_subgraph(&catalog, ["A"], true);

        let result = apply_exclusion(&sub, ["C"], ["A"], TargetExclusionPolicy::Drop, true);
        assert_eq!(keys(&result), vec!["A", "B"]);
    }
}

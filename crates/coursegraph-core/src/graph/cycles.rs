//! Catalog-wide cycle diagnostics.
//!
//! Scraped catalogs occasionally contain requirement loops (two courses that
//! list each other, or a chain that closes on itself). Layering refuses such
//! subgraphs; this module finds every loop in the whole catalog up front so
//! they can be reported together with edges whose removal breaks them.
//!
//! # Edge Direction
//!
//! Edges run `prereq → course`, the same direction layering uses.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashSet};

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::catalog::Catalog;
use crate::course::Course;
use crate::relation::RelationKind;

/// One strongly connected group of courses, with suggested edges to drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    /// Sorted courses of the loop.
    pub members: Vec<Course>,
    /// `(prereq, course)` edges closing the loop, found as DFS back-edges.
    /// Removing all of them makes the group acyclic.
    pub suggested_breaks: Vec<(Course, Course)>,
}

fn build_graph(catalog: &Catalog, include_coreqs: bool) -> DiGraph<Course, RelationKind> {
    let mut graph = DiGraph::with_capacity(catalog.node_count(), catalog.edge_count());
    let mut index: BTreeMap<&Course, NodeIndex> = BTreeMap::new();

    for course in catalog.courses() {
        index.insert(course, graph.add_node(course.clone()));
    }
    for (prereq, course, kind) in catalog.edges() {
        if !include_coreqs && kind == RelationKind::Corequisite {
            continue;
        }
        if let (Some(&from), Some(&to)) = (index.get(prereq), index.get(course)) {
            graph.add_edge(from, to, kind);
        }
    }
    graph
}

fn is_cyclic_component(graph: &DiGraph<Course, RelationKind>, component: &[NodeIndex]) -> bool {
    match component {
        [single] => graph.find_edge(*single, *single).is_some(),
        _ => component.len() > 1,
    }
}

/// Every requirement loop in `catalog`, each as a sorted member list.
///
/// Self-requirements are reported as one-element loops. The outer list is
/// sorted as well.
#[must_use]
#[instrument(level = "debug", skip(catalog))]
pub fn find_all_cycles(catalog: &Catalog, include_coreqs: bool) -> Vec<Vec<Course>> {
    report_cycles(catalog, include_coreqs)
        .into_iter()
        .map(|report| report.members)
        .collect()
}

/// Every requirement loop in `catalog` with suggested breaking edges.
#[must_use]
pub fn report_cycles(catalog: &Catalog, include_coreqs: bool) -> Vec<CycleReport> {
    let graph = build_graph(catalog, include_coreqs);

    let mut reports: Vec<CycleReport> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| is_cyclic_component(&graph, component))
        .map(|component| {
            let mut members: Vec<Course> =
                component.iter().map(|&idx| graph[idx].clone()).collect();
            members.sort_unstable();
            let suggested_breaks = back_edges(&graph, &component);
            CycleReport {
                members,
                suggested_breaks,
            }
        })
        .collect();

    reports.sort_unstable_by(|a, b| a.members.cmp(&b.members));
    debug!(cycles = reports.len(), "scanned catalog for cycles");
    reports
}

/// Back-edges of an iterative DFS restricted to one component, starting from
/// its smallest course so the result is deterministic.
fn back_edges(
    graph: &DiGraph<Course, RelationKind>,
    component: &[NodeIndex],
) -> Vec<(Course, Course)> {
    let members: HashSet<NodeIndex> = component.iter().copied().collect();
    let mut starts: Vec<NodeIndex> = component.to_vec();
    starts.sort_unstable_by(|a, b| graph[*a].cmp(&graph[*b]));

    let successors = |node: NodeIndex| -> Vec<NodeIndex> {
        let mut next: Vec<NodeIndex> = graph
            .neighbors_directed(node, Direction::Outgoing)
            .filter(|n| members.contains(n))
            .collect();
        next.sort_unstable_by(|a, b| graph[*a].cmp(&graph[*b]));
        next.dedup();
        next
    };

    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut on_path: HashSet<NodeIndex> = HashSet::new();
    let mut breaks: Vec<(Course, Course)> = Vec::new();

    for start in starts {
        if !visited.insert(start) {
            continue;
        }
        on_path.insert(start);
        let mut frames: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
            vec![(start, successors(start), 0)];

        while let Some((current, next, cursor)) = frames.last_mut() {
            let Some(&neighbor) = next.get(*cursor) else {
                on_path.remove(&*current);
                frames.pop();
                continue;
            };
            *cursor += 1;

            if on_path.contains(&neighbor) {
                breaks.push((graph[*current].clone(), graph[neighbor].clone()));
            } else if visited.insert(neighbor) {
                on_path.insert(neighbor);
                frames.push((neighbor, successors(neighbor), 0));
            }
        }
    }

    breaks.sort_unstable();
    breaks
}

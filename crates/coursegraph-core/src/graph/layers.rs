//! Topological layering of a prerequisite subgraph.
//!
//! A course's layer is the length of the longest requirement chain leading
//! to it: courses without requirements sit in layer 0, and every course sits
//! one layer below its deepest requirement. Layers are computed with Kahn's
//! algorithm over an explicit adjacency structure.
//!
//! The layering graph is rebuilt from the subgraph and filtered by kind on
//! its own: corequisite edges are dropped when `include_coreqs` is false,
//! independently of how the subgraph was extracted.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::{debug, instrument, warn};

use crate::course::Course;
use crate::graph::PrereqMap;
use crate::relation::RelationKind;

/// Courses grouped by depth; each layer sorted lexicographically.
pub type Layers = Vec<Vec<Course>>;

/// The layering input contains a prerequisite cycle.
///
/// `courses` lists, sorted, the courses that lie on a cycle or between
/// cycles; it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot order courses: cyclic prerequisite detected among {}", join_codes(.courses))]
pub struct CyclicGraphError {
    pub courses: Vec<Course>,
}

fn join_codes(courses: &[Course]) -> String {
    courses
        .iter()
        .map(Course::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Adjacency lists of the layering graph.
struct LayeringGraph<'a> {
    /// Course → its requirements.
    preds: BTreeMap<&'a Course, BTreeSet<&'a Course>>,
    /// Course → courses requiring it.
    succs: BTreeMap<&'a Course, BTreeSet<&'a Course>>,
    edge_count: usize,
}

impl<'a> LayeringGraph<'a> {
    fn build(subgraph: &'a PrereqMap, include_coreqs: bool) -> Self {
        let mut preds: BTreeMap<&Course, BTreeSet<&Course>> = BTreeMap::new();
        let mut succs: BTreeMap<&Course, BTreeSet<&Course>> = BTreeMap::new();
        let mut edge_count = 0;

        for (course, relations) in subgraph {
            preds.entry(course).or_default();
            succs.entry(course).or_default();

            for rel in relations {
                if !include_coreqs && rel.kind == RelationKind::Corequisite {
                    continue;
                }
                preds.entry(&rel.prereq).or_default();
                succs.entry(&rel.prereq).or_default().insert(course);
                if preds.entry(course).or_default().insert(&rel.prereq) {
                    edge_count += 1;
                }
            }
        }

        Self {
            preds,
            succs,
            edge_count,
        }
    }
}

/// Arrange `subgraph` into topological layers.
///
/// Nodes are the keys of `subgraph` plus every requirement endpoint.
///
/// When the filtered layering graph has no edges at all, the result is one
/// singleton layer per course whose requirement list in `subgraph` is empty,
/// in lexicographic order. Callers that pass a flat course list rely on this.
///
/// # Errors
///
/// Returns [`CyclicGraphError`] if the layering graph contains a cycle.
#[instrument(level = "debug", skip(subgraph), fields(courses = subgraph.len()))]
pub fn layer(subgraph: &PrereqMap, include_coreqs: bool) -> Result<Layers, CyclicGraphError> {
    let graph = LayeringGraph::build(subgraph, include_coreqs);

    if graph.edge_count == 0 {
        let flat: Layers = subgraph
            .iter()
            .filter(|(_, relations)| relations.is_empty())
            .map(|(course, _)| vec![course.clone()])
            .collect();
        debug!(layers = flat.len(), "no edges to layer, using flat fallback");
        return Ok(flat);
    }

    let mut indegree: BTreeMap<&Course, usize> = graph
        .preds
        .iter()
        .map(|(course, preds)| (*course, preds.len()))
        .collect();
    let mut ready: VecDeque<&Course> = indegree
        .iter()
        .filter_map(|(course, deg)| (*deg == 0).then_some(*course))
        .collect();
    let mut depth: BTreeMap<&Course, usize> = BTreeMap::new();

    while let Some(course) = ready.pop_front() {
        let d = graph
            .preds
            .get(course)
            .into_iter()
            .flatten()
            .filter_map(|pred| depth.get(pred))
            .map(|d| d + 1)
            .max()
            .unwrap_or(0);
        depth.insert(course, d);

        for next in graph.succs.get(course).into_iter().flatten() {
            if let Some(entry) = indegree.get_mut(next) {
                *entry = entry.saturating_sub(1);
                if *entry == 0 {
                    ready.push_back(*next);
                }
            }
        }
    }

    if depth.len() < indegree.len() {
        let courses = cycle_members(&graph, &depth);
        warn!(courses = %join_codes(&courses), "prerequisite cycle blocks layering");
        return Err(CyclicGraphError { courses });
    }

    let mut layers: Layers = Vec::new();
    for (course, d) in depth {
        if layers.len() <= d {
            layers.resize_with(d + 1, Vec::new);
        }
        if let Some(layer) = layers.get_mut(d) {
            layer.push(course.clone());
        }
    }
    for layer in &mut layers {
        layer.sort_unstable();
    }

    debug!(layers = layers.len(), "layered subgraph");
    Ok(layers)
}

/// Narrow the courses Kahn's algorithm could not order down to those on or
/// between cycles, by repeatedly peeling courses that nothing unresolved
/// depends on.
fn cycle_members(graph: &LayeringGraph<'_>, resolved: &BTreeMap<&Course, usize>) -> Vec<Course> {
    let mut remaining: BTreeSet<&Course> = graph
        .preds
        .keys()
        .filter(|course| !resolved.contains_key(*course))
        .copied()
        .collect();

    loop {
        let sinks: Vec<&Course> = remaining
            .iter()
            .filter(|course| {
                graph
                    .succs
                    .get(*course)
                    .is_none_or(|succs| succs.iter().all(|next| !remaining.contains(next)))
            })
            .copied()
            .collect();
        if sinks.is_empty() {
            break;
        }
        for sink in sinks {
            remaining.remove(sink);
        }
    }

    remaining.into_iter().cloned().collect()
}

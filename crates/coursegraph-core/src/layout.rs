//! Drawing positions for a layered plan.
//!
//! Each layer is a row: the course at index `i` of a layer with `n` courses
//! sits at `x = i - (n - 1) / 2`, so rows are centered on `x = 0`, and layer
//! `d` sits at `y = -d`, so requirements are drawn above the courses that
//! need them. Edges carry their kind and the color configured for it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::RenderConfig;
use crate::course::Course;
use crate::plan::Plan;
use crate::relation::RelationKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedCourse {
    pub course: Course,
    pub layer: usize,
    pub x: f64,
    pub y: f64,
}

/// A drawn edge, `from` being the requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyledEdge {
    pub from: Course,
    pub to: Course,
    pub kind: RelationKind,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    /// Placed courses, layer by layer.
    pub nodes: Vec<PlacedCourse>,
    /// Edges between placed courses, sorted by `(to, from)`.
    pub edges: Vec<StyledEdge>,
    /// Subgraph courses that no layer contains.
    pub unplaced: Vec<Course>,
}

impl Layout {
    /// Place every course of `plan` and style its edges.
    ///
    /// Corequisite edges are left out when the plan's selection excludes
    /// corequisites. Edges touching an unplaced course are left out too.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_plan(plan: &Plan, render: &RenderConfig) -> Self {
        let mut nodes = Vec::with_capacity(plan.placed_count());
        let mut placed: BTreeMap<&Course, usize> = BTreeMap::new();

        for (depth, layer) in plan.layers.iter().enumerate() {
            let offset = (layer.len() as f64 - 1.0) / 2.0;
            for (i, course) in layer.iter().enumerate() {
                placed.insert(course, depth);
                nodes.push(PlacedCourse {
                    course: course.clone(),
                    layer: depth,
                    x: i as f64 - offset,
                    y: 0.0 - depth as f64,
                });
            }
        }

        let include_coreqs = plan.selection.include_coreqs;
        let edges = plan
            .subgraph
            .iter()
            .flat_map(|(course, relations)| relations.iter().map(move |rel| (course, rel)))
            .filter(|(course, rel)| {
                (include_coreqs || rel.kind == RelationKind::Prerequisite)
                    && placed.contains_key(course)
                    && placed.contains_key(&rel.prereq)
            })
            .map(|(course, rel)| StyledEdge {
                from: rel.prereq.clone(),
                to: course.clone(),
                kind: rel.kind,
                color: render.color_for(rel.kind).to_string(),
            })
            .collect();

        let unplaced = plan
            .subgraph
            .keys()
            .filter(|course| !placed.contains_key(course))
            .cloned()
            .collect();

        Self {
            nodes,
            edges,
            unplaced,
        }
    }

    /// `(x, y)` of a placed course.
    #[must_use]
    pub fn position(&self, course: &str) -> Option<(f64, f64)> {
        self.nodes
            .iter()
            .find(|node| node.course.as_str() == course)
            .map(|node| (node.x, node.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::graph::CourseGraph;
    use crate::plan::Selection;

    fn plan(selection: &Selection) -> Plan {
        let graph = CourseGraph::new(Catalog::from_pairs([
            ("M332", vec![("M220", "prereq"), ("M251", "prereq")]),
            ("M220", vec![("M100", "prereq")]),
            ("M251", vec![("M100", "prereq"), ("M220", "coreq")]),
        ]));
        graph.plan(selection).expect("acyclic")
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn rows_are_centered_and_stacked() {
        let plan = plan(&Selection::new(["M332"]).with_coreqs(false));
        let layout = Layout::from_plan(&plan, &RenderConfig::default());

        // Layers: [M100], [M220, M251], [M332]
        assert_eq!(layout.position("M100"), Some((0.0, 0.0)));
        assert_eq!(layout.position("M220"), Some((-0.5, -1.0)));
        assert_eq!(layout.position("M251"), Some((0.5, -1.0)));
        assert_eq!(layout.position("M332"), Some((0.0, -2.0)));
        assert!(layout.unplaced.is_empty());
    }

    #[test]
    fn coreq_edges_follow_selection() {
        let with = Layout::from_plan(&plan(&Selection::new(["M332"])), &RenderConfig::default());
        let coreq: Vec<&StyledEdge> = with
            .edges
            .iter()
            .filter(|e| e.kind == RelationKind::Corequisite)
            .collect();
        assert_eq!(coreq.len(), 1);
        assert_eq!(coreq[0].from.as_str(), "M220");
        assert_eq!(coreq[0].to.as_str(), "M251");
        assert_eq!(coreq[0].color, "blue");

        let without = Layout::from_plan(
            &plan(&Selection::new(["M332"]).with_coreqs(false)),
            &RenderConfig::default(),
        );
        assert!(without.edges.iter().all(|e| e.kind == RelationKind::Prerequisite));
        assert!(without.edges.iter().all(|e| e.color == "green"));
        assert_eq!(without.edges.len(), 4);
    }

    #[test]
    fn fallback_courses_without_layer_are_unplaced() {
        let graph = CourseGraph::new(Catalog::from_pairs([("A", vec![("B", "coreq")])]));
        let plan = graph
            .plan(&Selection::new(["A", "B"]).with_coreqs(false))
            .expect("no edges");
        let layout = Layout::from_plan(&plan, &RenderConfig::default());
        assert_eq!(layout.nodes.len(), 1);
        assert_eq!(layout.unplaced, vec![Course::from("A")]);
    }
}

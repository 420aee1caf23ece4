#![forbid(unsafe_code)]
//! coursegraph-core library.
//!
//! Prerequisite and corequisite graphs for university course catalogs: an
//! immutable edge store, reachable-subgraph extraction, exclusion pruning,
//! and topological layering.
//!
//! # Conventions
//!
//! - **Errors**: Domain failures are `thiserror` types ([`CyclicGraphError`],
//!   [`CatalogError`]); config loading uses `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`). Engine
//!   events are scoped to the span a [`CourseGraph`] was built with.

pub mod catalog;
pub mod config;
pub mod course;
pub mod error;
pub mod graph;
pub mod layout;
pub mod plan;
pub mod relation;

pub use catalog::{Catalog, CatalogBuilder, CatalogError, load_catalogs};
pub use course::{CodeStyle, Course};
pub use error::ErrorCode;
pub use graph::{
    CourseGraph, CycleReport, CyclicGraphError, Layers, PrereqMap, TargetExclusionPolicy,
    apply_exclusion, find_all_cycles, layer, report_cycles,
};
pub use layout::{Layout, PlacedCourse, StyledEdge};
pub use plan::{Plan, PlanCache, Selection};
pub use relation::{Relation, RelationKind};

//! Trigger-graph primitives
//!
//! Logic entities live in an arena addressed by integer `NodeId`s. Edges
//! (`targets`, `objects`, events, reports) are plain index lists, so the
//! graph may contain cycles.

pub mod events;
#[allow(clippy::module_inception)]
pub mod graph;
pub mod index;
pub mod node;

pub use events::{EventLink, EventType, ReportLink, ReportType};
pub use graph::TriggerGraph;
pub use index::{IndexAllocator, NodeId};
pub use node::{Node, NodeKind, PlaneItem, PlaneStart, WaypointPriority};

//! Trigger-graph node kinds and storage record

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::events::{EventLink, EventType, ReportLink, ReportType};
use super::index::NodeId;
use crate::core::types::{Coalition, FormationShape};

/// How a plane item is spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaneStart {
    Parking,
    Runway,
    Air,
}

/// Waypoint priority (how hard the AI sticks to the route)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WaypointPriority {
    Low,
    #[default]
    Medium,
    High,
}

/// Properties of a plane item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneItem {
    pub plane: String,
    pub coalition: Coalition,
    /// Fuel fraction (0..1)
    pub fuel: f64,
    pub start: PlaneStart,
    pub callsign: String,
    pub number: u8,
    pub player: bool,
}

/// Kind of a trigger-graph node with its kind-specific properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group { name: String },
    Icon { visible: bool, coalitions: Vec<Coalition> },
    MissionBegin,
    Timer { time: f64 },
    TakeOff,
    Formation { shape: FormationShape },
    Cover,
    Waypoint { speed: f64, radius: f64, priority: WaypointPriority },
    Land,
    CheckZone { radius: f64, closer: bool, plane_coalitions: Vec<Coalition> },
    Proximity { distance: f64, closer: bool, player: bool, plane_coalitions: Vec<Coalition> },
    Activate,
    Deactivate,
    Delete,
    Plane(PlaneItem),
    Entity { enabled: bool },
}

impl NodeKind {
    pub fn timer(time: f64) -> Self {
        NodeKind::Timer { time }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Group { .. } => "Group",
            NodeKind::Icon { .. } => "Icon",
            NodeKind::MissionBegin => "MissionBegin",
            NodeKind::Timer { .. } => "Timer",
            NodeKind::TakeOff => "TakeOff",
            NodeKind::Formation { .. } => "Formation",
            NodeKind::Cover => "Cover",
            NodeKind::Waypoint { .. } => "Waypoint",
            NodeKind::Land => "Land",
            NodeKind::CheckZone { .. } => "CheckZone",
            NodeKind::Proximity { .. } => "Proximity",
            NodeKind::Activate => "Activate",
            NodeKind::Deactivate => "Deactivate",
            NodeKind::Delete => "Delete",
            NodeKind::Plane(_) => "Plane",
            NodeKind::Entity { .. } => "Entity",
        }
    }

    /// Kinds that are backed by a linked entity
    pub fn has_entity(&self) -> bool {
        matches!(self, NodeKind::Plane(_))
    }

    /// Events an entity of this owner kind can raise
    pub fn accepts_event(&self, event: EventType) -> bool {
        match self {
            NodeKind::Plane(_) => true,
            _ => matches!(event, EventType::OnDamaged | EventType::OnKilled),
        }
    }

    /// Reports a command of this kind can produce
    pub fn accepts_report(&self, report: ReportType) -> bool {
        matches!(
            (self, report),
            (NodeKind::TakeOff, ReportType::OnTookOff) | (NodeKind::Land, ReportType::OnLanded)
        )
    }

    pub fn as_plane(&self) -> Option<&PlaneItem> {
        match self {
            NodeKind::Plane(plane) => Some(plane),
            _ => None,
        }
    }

    pub fn as_plane_mut(&mut self) -> Option<&mut PlaneItem> {
        match self {
            NodeKind::Plane(plane) => Some(plane),
            _ => None,
        }
    }
}

/// A generated logic entity
///
/// Edges are weak references by index; cycles are legal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: Option<String>,
    pub position: DVec3,
    /// Yaw in degrees
    pub orientation: f64,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub targets: Vec<NodeId>,
    pub objects: Vec<NodeId>,
    pub events: Option<Vec<EventLink>>,
    pub reports: Option<Vec<ReportLink>>,
    /// Entity backing this node (planes)
    pub entity: Option<NodeId>,
    /// Owner node of an entity
    pub link: Option<NodeId>,
    pub removed: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            id,
            kind,
            name: None,
            position: DVec3::ZERO,
            orientation: 0.0,
            parent,
            children: Vec::new(),
            targets: Vec::new(),
            objects: Vec::new(),
            events: None,
            reports: None,
            entity: None,
            link: None,
            removed: false,
        }
    }

    /// Event list, created on first use
    pub fn events_mut(&mut self) -> &mut Vec<EventLink> {
        self.events.get_or_insert_with(Vec::new)
    }

    /// Report list, created on first use
    pub fn reports_mut(&mut self) -> &mut Vec<ReportLink> {
        self.reports.get_or_insert_with(Vec::new)
    }

    pub fn time(&self) -> Option<f64> {
        match self.kind {
            NodeKind::Timer { time } => Some(time),
            _ => None,
        }
    }
}

//! Typed event and report links raised by entities

use serde::{Deserialize, Serialize};

use super::index::NodeId;

/// Event raised by a plane entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    OnPilotKilled,
    OnPilotWounded,
    OnPlaneCrashed,
    OnPlaneCriticalDamage,
    OnPlaneDestroyed,
    OnPlaneLanded,
    OnPlaneTookOff,
    OnPlaneBingoFuel,
    OnPlaneBingoMainMG,
    OnPlaneBingoBombs,
    OnDamaged,
    OnKilled,
    OnPlaneSpawned,
}

impl EventType {
    /// Numeric event code used by the mission file format
    pub fn code(&self) -> u32 {
        match self {
            EventType::OnPilotKilled => 0,
            EventType::OnPilotWounded => 1,
            EventType::OnPlaneCrashed => 2,
            EventType::OnPlaneCriticalDamage => 3,
            EventType::OnPlaneDestroyed => 4,
            EventType::OnPlaneLanded => 5,
            EventType::OnPlaneTookOff => 6,
            EventType::OnPlaneBingoFuel => 7,
            EventType::OnPlaneBingoMainMG => 8,
            EventType::OnPlaneBingoBombs => 9,
            EventType::OnDamaged => 12,
            EventType::OnKilled => 13,
            EventType::OnPlaneSpawned => 20,
        }
    }
}

/// Report raised by an entity when one of its commands completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    OnSpawned,
    OnTargetAttacked,
    OnAreaAttacked,
    OnTookOff,
    OnLanded,
}

impl ReportType {
    pub fn code(&self) -> u32 {
        match self {
            ReportType::OnSpawned => 0,
            ReportType::OnTargetAttacked => 1,
            ReportType::OnAreaAttacked => 2,
            ReportType::OnTookOff => 3,
            ReportType::OnLanded => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLink {
    pub event: EventType,
    pub target: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLink {
    pub report: ReportType,
    /// Command whose completion is reported
    pub command: NodeId,
    /// Trigger fired by the report
    pub target: NodeId,
}

use thiserror::Error;

use crate::graph::{EventType, NodeId, ReportType};

#[derive(Error, Debug)]
pub enum SortieError {
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Unknown plane: {0}")]
    UnknownPlane(String),

    #[error("Unknown airfield: {0}")]
    UnknownAirfield(String),

    #[error("No task {task} available for unit {unit}")]
    NoTaskMatch { unit: String, task: String },

    #[error("No formation pattern for {planes} planes")]
    NoFormation { planes: usize },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Event {event:?} is not valid for {kind} nodes")]
    InvalidEvent { kind: &'static str, event: EventType },

    #[error("Report {report:?} is not valid for {kind} nodes")]
    InvalidReport { kind: &'static str, report: ReportType },

    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node is not part of a mission: {0:?}")]
    NodeNotInMission(NodeId),

    #[error("Node {0:?} cannot carry an entity")]
    NotAnEntity(NodeId),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SortieError>;

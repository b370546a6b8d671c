//! Sortie - flight-plan activity pipeline for combat flight missions
//!
//! Builds AI and player flights as trigger-graph fragments: plans of
//! activities per task, offmap path clipping, mid-mission state
//! fast-forward and the virtual level of detail for distant flights.

pub mod activity;
pub mod core;
pub mod data;
pub mod flight;
pub mod graph;
pub mod map;
pub mod mission;
pub mod plan;
pub mod state;
pub mod virtual_lod;

//! Flight, element and plane records

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::core::config::GeneratorConfig;
use crate::core::error::{Result, SortieError};
use crate::core::types::{Coalition, FormationShape, KMH_TO_MS};
use crate::data::TaxiRoute;
use crate::graph::{NodeId, TriggerGraph};
use crate::plan::{Plan, TaskKind};
use crate::virtual_lod::Checkpoint;

/// Ground phase a flight (or element) starts in
///
/// Variant order is the fixed start priority: `Start` is the slowest to
/// get airborne.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroundState {
    /// Parking, engines off
    Start,
    Taxi,
    Runway,
}

/// Initial state of a flight
///
/// `Air(f)` is a flight already airborne and `f` (0..=1) of the way
/// through its time-bearing activities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlightState {
    Ground(GroundState),
    Air(f64),
}

impl FlightState {
    pub fn is_air(&self) -> bool {
        matches!(self, FlightState::Air(_))
    }

    pub fn ground(&self) -> Option<GroundState> {
        match self {
            FlightState::Ground(g) => Some(*g),
            FlightState::Air(_) => None,
        }
    }

    /// Fraction of the plan to fast-forward (0 for ground states)
    pub fn fraction(&self) -> f64 {
        match self {
            FlightState::Ground(_) => 0.0,
            FlightState::Air(f) => f.clamp(0.0, 1.0),
        }
    }
}

impl Default for FlightState {
    fn default() -> Self {
        FlightState::Ground(GroundState::Start)
    }
}

/// One plane of a flight, backed by a plane item in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    pub item: NodeId,
    /// Position in the flight (1-based)
    pub number: u8,
}

/// A sub-group of a flight flying in one formation
#[derive(Debug, Clone)]
pub struct Element {
    pub planes: Vec<Plane>,
    pub shape: FormationShape,
    pub state: FlightState,
}

impl Element {
    /// Element leader; an element always holds at least one plane
    pub fn leader(&self) -> Option<&Plane> {
        self.planes.first()
    }

    pub fn size(&self) -> usize {
        self.planes.len()
    }
}

/// One AI or player flight
#[derive(Debug, Clone)]
pub struct Flight {
    pub id: usize,
    pub unit: String,
    pub task: TaskKind,
    pub coalition: Coalition,
    pub country: u32,
    /// Plane model id
    pub plane: String,
    pub callsign: String,
    pub player: bool,
    pub virtual_flight: bool,
    pub elements: Vec<Element>,
    /// Requested initial state
    pub state: FlightState,
    /// Plane range (km)
    pub range: f64,
    /// Cruise speed (km/h)
    pub speed: f64,
    /// Summed time of the time-bearing activities (seconds)
    pub time: f64,
    pub plan: Plan,
    /// Group node holding every node generated for this flight
    pub group: NodeId,
    pub airfield: String,
    /// Home airfield position
    pub home: DVec3,
    pub taxi: Option<TaxiRoute>,
    /// Current reference position of the flight leader
    pub position: DVec3,
    /// Current heading (degrees)
    pub heading: f64,
    /// Briefing description of the task target
    pub target: Option<String>,
    /// Virtual checkpoints, empty for normal flights
    pub checkpoints: Vec<Checkpoint>,
}

impl Flight {
    pub fn leader(&self) -> Option<&Plane> {
        self.elements.first().and_then(|e| e.leader())
    }

    pub fn planes(&self) -> impl Iterator<Item = &Plane> {
        self.elements.iter().flat_map(|e| e.planes.iter())
    }

    pub fn items(&self) -> Vec<NodeId> {
        self.planes().map(|p| p.item).collect()
    }

    pub fn size(&self) -> usize {
        self.elements.iter().map(|e| e.size()).sum()
    }

    /// Cruise speed in m/s
    pub fn speed_ms(&self) -> f64 {
        self.speed * KMH_TO_MS
    }

    /// Seconds needed to fly a distance at cruise speed
    pub fn flight_time(&self, distance: f64) -> f64 {
        if self.speed <= 0.0 {
            return 0.0;
        }
        distance / self.speed_ms()
    }

    /// Mark every element airborne
    pub fn set_airborne(&mut self) {
        for element in &mut self.elements {
            if !element.state.is_air() {
                element.state = FlightState::Air(0.0);
            }
        }
    }

    pub fn is_airborne(&self) -> bool {
        self.elements.iter().all(|e| e.state.is_air())
    }

    /// Burn fuel for a flown distance on every plane
    ///
    /// Consumption is `distance / range` and never drops below the
    /// configured floor.
    pub fn consume_distance(
        &self,
        graph: &mut TriggerGraph,
        distance: f64,
        config: &GeneratorConfig,
    ) -> Result<()> {
        if distance <= 0.0 || self.range <= 0.0 {
            return Ok(());
        }
        let used = distance / (self.range * 1000.0);
        for plane in self.planes() {
            let item = graph
                .get_mut(plane.item)?
                .kind
                .as_plane_mut()
                .ok_or(SortieError::NotAnEntity(plane.item))?;
            item.fuel = (item.fuel - used).max(config.fuel_min);
        }
        Ok(())
    }

    /// Set the same fuel fraction on every plane
    pub fn set_fuel(&self, graph: &mut TriggerGraph, fuel: f64) -> Result<()> {
        for plane in self.planes() {
            if let Some(item) = graph.get_mut(plane.item)?.kind.as_plane_mut() {
                item.fuel = fuel.clamp(0.0, 1.0);
            }
        }
        Ok(())
    }

    /// Fuel fraction per plane, flight order
    pub fn fuel(&self, graph: &TriggerGraph) -> Vec<f64> {
        self.planes()
            .filter_map(|p| graph.node(p.item))
            .filter_map(|n| n.kind.as_plane())
            .map(|item| item.fuel)
            .collect()
    }
}

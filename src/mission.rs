//! Mission context and the flight generation pipeline
//!
//! A `Mission` owns everything one build shares: config, map, static
//! data, the seeded RNG, the index allocator and the trigger graph.
//! Flights are built one at a time, start to finish.

use glam::DVec3;
use serde::Serialize;
use tracing::info;

use crate::activity::{ActivityKind, PendingLink};
use crate::core::config::GeneratorConfig;
use crate::core::error::{Result, SortieError};
use crate::core::rng::MissionRng;
use crate::core::types::{heading, Coalition};
use crate::data::GameData;
use crate::flight::{
    element_states, make_formation, pick_shape, pose_flight, Element, Flight, FlightState,
    GroundState, Plane,
};
use crate::graph::{
    EventType, IndexAllocator, NodeId, NodeKind, PlaneItem, PlaneStart, ReportType, TriggerGraph,
};
use crate::map::{is_offmap, MapBounds};
use crate::plan::{make_actions, make_plan, Plan, TaskKind};
use crate::state::fast_forward;
use crate::virtual_lod::make_virtual_flight;

/// What to generate
#[derive(Debug, Clone)]
pub struct FlightRequest {
    pub unit: String,
    pub task: TaskKind,
    pub state: FlightState,
    /// Plane count, unit default when unset
    pub planes: Option<usize>,
    pub player: bool,
    pub virtual_flight: bool,
}

impl FlightRequest {
    pub fn new(unit: impl Into<String>, task: TaskKind) -> Self {
        Self {
            unit: unit.into(),
            task,
            state: FlightState::default(),
            planes: None,
            player: false,
            virtual_flight: false,
        }
    }

    pub fn with_state(mut self, state: FlightState) -> Self {
        self.state = state;
        self
    }

    pub fn with_planes(mut self, planes: usize) -> Self {
        self.planes = Some(planes);
        self
    }

    pub fn with_player(mut self) -> Self {
        self.player = true;
        self
    }

    pub fn with_virtual(mut self) -> Self {
        self.virtual_flight = true;
        self
    }
}

pub struct Mission {
    pub config: GeneratorConfig,
    pub map: MapBounds,
    pub data: GameData,
    pub rng: MissionRng,
    pub index: IndexAllocator,
    pub graph: TriggerGraph,
    /// Root group of every generated node
    pub root: NodeId,
    /// Emit debug-only helpers (location icons for AI flights)
    pub debug: bool,
    pub flights: Vec<Flight>,
}

impl Mission {
    pub fn new(config: GeneratorConfig, data: GameData, seed: u64) -> Result<Self> {
        config.validate()?;
        let map = MapBounds::new(data.map.height, data.map.width, config.restricted_border);
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let root = graph.create(
            &mut index,
            NodeKind::Group {
                name: "Flights".to_string(),
            },
            None,
        );

        Ok(Self {
            config,
            map,
            data,
            rng: MissionRng::new(seed),
            index,
            graph,
            root,
            debug: false,
            flights: Vec::new(),
        })
    }

    /// Mission over the bundled sample data with default config
    pub fn sample(seed: u64) -> Result<Self> {
        Self::new(GeneratorConfig::default(), GameData::sample()?, seed)
    }

    pub fn create(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        self.graph.create(&mut self.index, kind, Some(parent))
    }

    pub fn create_at(&mut self, kind: NodeKind, parent: NodeId, position: DVec3) -> Result<NodeId> {
        let id = self.create(kind, parent);
        self.graph.set_position(id, position)?;
        Ok(id)
    }

    pub fn add_object(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.graph.add_object(&mut self.index, from, to)
    }

    pub fn add_event(&mut self, from: NodeId, event: EventType, target: NodeId) -> Result<()> {
        self.graph.add_event(&mut self.index, from, event, target)
    }

    pub fn add_report(
        &mut self,
        from: NodeId,
        report: ReportType,
        command: NodeId,
        target: NodeId,
    ) -> Result<()> {
        self.graph.add_report(&mut self.index, from, report, command, target)
    }

    pub fn connect(&mut self, link: PendingLink, to: NodeId) -> Result<()> {
        link.connect(&mut self.graph, to)
    }

    /// Generate one flight; returns its index in `flights`
    pub fn make_flight(&mut self, request: FlightRequest) -> Result<usize> {
        let flight = self.prepare_flight(&request)?;
        self.finish_flight(flight)
    }

    /// Build a flight up to (not including) action emission
    ///
    /// Formation, plane items, plan with shaping, initial fast-forward and
    /// pose.
    pub fn prepare_flight(&mut self, request: &FlightRequest) -> Result<Flight> {
        let unit = self.data.unit(&request.unit)?.clone();
        if !unit.tasks.contains(&request.task) {
            return Err(SortieError::NoTaskMatch {
                unit: unit.id,
                task: request.task.to_string(),
            });
        }
        let airfield = self.data.airfield(&unit.airfield)?.clone();
        let plane_id = self
            .rng
            .pick(&unit.planes)
            .cloned()
            .ok_or_else(|| SortieError::UnknownPlane(format!("{} has no planes", unit.id)))?;
        let plane = self.data.plane(&plane_id)?.clone();

        let count = request.planes.unwrap_or(unit.flight_size);
        let sizes = make_formation(count, &mut self.rng)?;

        let offmap = is_offmap(&self.map, airfield.position);
        let taxi = if offmap {
            None
        } else {
            self.rng.pick(&airfield.taxi).cloned()
        };
        let state = match request.state {
            FlightState::Ground(_) if offmap => FlightState::Air(0.0),
            other => other,
        };
        let virtual_flight = request.virtual_flight && !request.player;

        let (position, heading_deg) = match (&taxi, state) {
            (Some(t), FlightState::Ground(GroundState::Runway)) => {
                (t.runway_start, heading(t.runway_start, t.runway_end))
            }
            (Some(t), FlightState::Ground(_)) => {
                let next = t.points.get(1).copied().unwrap_or(t.runway_start);
                (t.parking(), heading(t.parking(), next))
            }
            _ => (airfield.position, 0.0),
        };

        let id = self.flights.len();
        let group = self.create(
            NodeKind::Group {
                name: format!("{} {} {}", unit.name, request.task, id),
            },
            self.root,
        );

        let states = element_states(sizes.len(), state, taxi.is_some());
        let mut elements = Vec::with_capacity(sizes.len());
        let mut number: u8 = 0;
        for (size, element_state) in sizes.iter().zip(states) {
            let start = match element_state {
                FlightState::Ground(GroundState::Runway) => PlaneStart::Runway,
                FlightState::Ground(_) => PlaneStart::Parking,
                FlightState::Air(_) => PlaneStart::Air,
            };
            let mut planes = Vec::with_capacity(*size);
            for _ in 0..*size {
                number += 1;
                let item = self.create(
                    NodeKind::Plane(PlaneItem {
                        plane: plane.id.clone(),
                        coalition: unit.coalition,
                        fuel: 1.0,
                        start,
                        callsign: unit.callsign.clone(),
                        number,
                        player: request.player && number == 1,
                    }),
                    group,
                );
                self.graph.get_mut(item)?.name = Some(format!("{} {}", unit.callsign, number));
                planes.push(Plane { item, number });
            }
            elements.push(Element {
                planes,
                shape: pick_shape(*size, &mut self.rng),
                state: element_state,
            });
        }

        let mut flight = Flight {
            id,
            unit: unit.id.clone(),
            task: request.task,
            coalition: unit.coalition,
            country: unit.country,
            plane: plane.id.clone(),
            callsign: unit.callsign.clone(),
            player: request.player,
            virtual_flight,
            elements,
            state,
            range: plane.range,
            speed: plane.speed,
            time: 0.0,
            plan: Plan::new(),
            group,
            airfield: airfield.id.clone(),
            home: airfield.position,
            taxi,
            position,
            heading: heading_deg,
            target: None,
            checkpoints: Vec::new(),
        };

        make_plan(&mut flight, self)?;
        fast_forward(&mut flight, self, state.fraction())?;
        pose_flight(&mut self.graph, &flight, flight.position, flight.heading)?;
        Ok(flight)
    }

    /// Emit actions (normal or virtual) and register the flight
    pub fn finish_flight(&mut self, mut flight: Flight) -> Result<usize> {
        if flight.virtual_flight {
            flight.checkpoints = make_virtual_flight(&mut flight, self)?;
        } else {
            make_actions(&mut flight, self)?;
        }

        info!(
            flight = flight.id,
            unit = %flight.unit,
            task = %flight.task,
            planes = flight.size(),
            time = flight.time,
            virtual_flight = flight.virtual_flight,
            "Flight generated"
        );

        let id = self.flights.len();
        flight.id = id;
        self.flights.push(flight);
        Ok(id)
    }

    pub fn summary(&self, id: usize) -> Option<FlightSummary> {
        self.flights.get(id).map(|f| FlightSummary::new(f, self))
    }
}

/// Flight telemetry handed to the briefing generator
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub id: usize,
    pub unit: String,
    pub task: TaskKind,
    pub plane: String,
    pub coalition: Coalition,
    pub player: bool,
    pub virtual_flight: bool,
    pub state: FlightState,
    pub target: Option<String>,
    /// Remaining activity time (seconds)
    pub time: f64,
    /// Plane range (km)
    pub range: f64,
    pub fuel: Vec<f64>,
    pub elements: Vec<usize>,
    pub activities: Vec<ActivityKind>,
    /// Flight leaves the map instead of landing
    pub ends_offmap: bool,
    pub position: [f64; 3],
    pub checkpoints: usize,
    /// Live nodes generated for the flight
    pub nodes: usize,
}

impl FlightSummary {
    pub fn new(flight: &Flight, mission: &Mission) -> Self {
        Self {
            id: flight.id,
            unit: flight.unit.clone(),
            task: flight.task,
            plane: flight.plane.clone(),
            coalition: flight.coalition,
            player: flight.player,
            virtual_flight: flight.virtual_flight,
            state: flight.state,
            target: flight.target.clone(),
            time: flight.time,
            range: flight.range,
            fuel: flight.fuel(&mission.graph),
            elements: flight.elements.iter().map(|e| e.size()).collect(),
            activities: flight.plan.kinds(),
            ends_offmap: flight.plan.end().is_some(),
            position: flight.position.to_array(),
            checkpoints: flight.checkpoints.len(),
            nodes: mission.graph.walk(flight.group).len(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_unit() {
        let mut mission = Mission::sample(1).unwrap();
        let result = mission.make_flight(FlightRequest::new("nope", TaskKind::Free));
        assert!(matches!(result, Err(SortieError::UnknownUnit(_))));
    }

    #[test]
    fn test_task_not_listed_by_unit() {
        let mut mission = Mission::sample(1).unwrap();
        let result = mission.make_flight(FlightRequest::new("jg52_rear", TaskKind::Free));
        assert!(matches!(result, Err(SortieError::NoTaskMatch { .. })));
    }

    #[test]
    fn test_no_formation_for_plane_count() {
        let mut mission = Mission::sample(1).unwrap();
        let result = mission.make_flight(FlightRequest::new("jg51", TaskKind::Free).with_planes(13));
        assert!(matches!(result, Err(SortieError::NoFormation { planes: 13 })));
    }

    #[test]
    fn test_same_seed_same_graph() {
        let build = || {
            let mut mission = Mission::sample(99).unwrap();
            mission
                .make_flight(FlightRequest::new("jg51", TaskKind::Patrol))
                .unwrap();
            mission
                .make_flight(FlightRequest::new("iap29", TaskKind::Sweep).with_virtual())
                .unwrap();
            let nodes: Vec<_> = mission
                .graph
                .walk(mission.root)
                .into_iter()
                .filter_map(|id| mission.graph.node(id).cloned())
                .collect();
            serde_json::to_string(&nodes).unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_summary_serializes() {
        let mut mission = Mission::sample(5).unwrap();
        let id = mission
            .make_flight(FlightRequest::new("iap29", TaskKind::Cover).with_player())
            .unwrap();
        let summary = mission.summary(id).unwrap();
        assert_eq!(summary.task, TaskKind::Cover);
        assert!(summary.player);
        assert!(summary.to_json().unwrap().contains("\"cover\""));
    }
}

//! Start activity - flight begin chain

use tracing::debug;

use super::{spend, ActivityKind, FlightActivity, PendingLink};
use crate::core::error::Result;
use crate::flight::Flight;
use crate::graph::{NodeId, NodeKind};
use crate::mission::Mission;

/// Entry point of every plan
///
/// Builds `MissionBegin -> [engine delay] -> onBegin -> onStart`. Virtual
/// flights get a short gate timer after onBegin instead of onStart; the
/// virtual engine arms its checkpoints from there.
#[derive(Debug, Clone, Default)]
pub struct Start {
    /// Remaining delay before the flight enters the map (seconds)
    time: Option<f64>,
    pub icon: Option<NodeId>,
    pub begin: Option<NodeId>,
    pub on_begin: Option<NodeId>,
    pub on_start: Option<NodeId>,
    pub gate: Option<NodeId>,
}

impl Start {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add delay time (offmap approach flown before entering the map)
    pub fn add_delay(&mut self, delay: f64) {
        if delay > 0.0 {
            self.time = Some(self.time.unwrap_or(0.0) + delay);
        }
    }

    pub fn delay(&self) -> f64 {
        self.time.unwrap_or(0.0)
    }

    fn make_begin(&mut self, flight: &Flight, mission: &mut Mission) -> Result<NodeId> {
        let group = flight.group;

        if flight.player || mission.debug {
            let icon = mission.create_at(
                NodeKind::Icon {
                    visible: flight.player,
                    coalitions: vec![flight.coalition],
                },
                group,
                flight.position,
            )?;
            self.icon = Some(icon);
        }

        let begin = mission.create_at(NodeKind::MissionBegin, group, flight.position)?;
        let on_begin = mission.create_at(NodeKind::timer(0.0), group, flight.position)?;

        if flight.state.ground().is_some() {
            let delay = mission.rng.real(
                mission.config.engine_start_delay_min,
                mission.config.engine_start_delay_max,
            );
            let timer = mission.create_at(NodeKind::timer(delay), group, flight.position)?;
            mission.graph.add_target(begin, timer)?;
            mission.graph.add_target(timer, on_begin)?;
        } else {
            mission.graph.add_target(begin, on_begin)?;
        }

        self.begin = Some(begin);
        self.on_begin = Some(on_begin);
        Ok(on_begin)
    }
}

impl FlightActivity for Start {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Start
    }

    fn time(&self) -> Option<f64> {
        self.time
    }

    fn make_action(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        _element: usize,
        _input: PendingLink,
    ) -> Result<PendingLink> {
        // Elements share one begin chain
        if let Some(next) = self.gate.or(self.on_start) {
            return Ok(PendingLink::Node(next));
        }

        let on_begin = self.make_begin(flight, mission)?;

        if flight.virtual_flight {
            let gate = mission.create_at(
                NodeKind::timer(mission.config.virtual_gate_delay),
                flight.group,
                flight.position,
            )?;
            mission.graph.add_target(on_begin, gate)?;
            self.gate = Some(gate);
            return Ok(PendingLink::Node(gate));
        }

        let on_start = mission.create_at(NodeKind::timer(self.delay()), flight.group, flight.position)?;
        mission.graph.add_target(on_begin, on_start)?;
        self.on_start = Some(on_start);

        debug!(flight = flight.id, delay = self.delay(), "Start chain built");
        Ok(PendingLink::Node(on_start))
    }

    fn make_state(&mut self, _flight: &mut Flight, _mission: &mut Mission, elapsed: f64) -> Result<()> {
        spend(&mut self.time, elapsed);
        Ok(())
    }
}

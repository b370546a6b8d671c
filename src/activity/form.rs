//! Form activity - element formations, cover and join gate

use super::{spend, ActivityKind, FlightActivity, PendingLink};
use crate::core::config::GeneratorConfig;
use crate::core::error::Result;
use crate::core::rng::MissionRng;
use crate::flight::{Flight, GroundState};
use crate::graph::{NodeId, NodeKind};
use crate::mission::Mission;

#[derive(Debug, Clone, Default)]
pub struct Form {
    time: Option<f64>,
    /// Join timer length, 0 when elements need no join
    join: f64,
    gate: Option<NodeId>,
}

/// Element that gets airborne last: lowest ground priority, later index on ties
fn last_to_start(flight: &Flight) -> Option<(usize, usize)> {
    let ground: Vec<(usize, GroundState)> = flight
        .elements
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.state.ground().map(|g| (i, g)))
        .collect();
    let last = ground
        .iter()
        .min_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|&(i, _)| i)?;
    Some((last, ground.len()))
}

impl Form {
    pub fn new(flight: &Flight, rng: &mut MissionRng, config: &GeneratorConfig) -> Self {
        let mut form = Self::default();
        if matches!(last_to_start(flight), Some((_, count)) if count > 1) {
            form.join = rng.real(config.join_delay_min, config.join_delay_max);
            form.time = Some(form.join);
        }
        form
    }

    pub fn gate(&self) -> Option<NodeId> {
        self.gate
    }
}

impl FlightActivity for Form {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Form
    }

    fn time(&self) -> Option<f64> {
        self.time
    }

    fn make_action(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        element: usize,
        input: PendingLink,
    ) -> Result<PendingLink> {
        if input.is_none() {
            return Ok(PendingLink::None);
        }
        let Some(data) = flight.elements.get(element) else {
            return Ok(PendingLink::None);
        };
        let Some(leader) = data.leader().map(|p| p.item) else {
            return Ok(input);
        };
        let group = flight.group;

        if element > 0 {
            if let Some(flight_leader) = flight.leader().map(|p| p.item) {
                let cover = mission.create_at(NodeKind::Cover, group, flight.position)?;
                mission.add_object(cover, leader)?;
                let target = mission.graph.ensure_entity(&mut mission.index, flight_leader)?;
                mission.graph.add_target(cover, target)?;
                mission.connect(input, cover)?;
            }
        }

        if data.size() > 1 {
            let formation = mission.create_at(
                NodeKind::Formation { shape: data.shape },
                group,
                flight.position,
            )?;
            mission.add_object(formation, leader)?;
            mission.connect(input, formation)?;
        }

        let gating = matches!(last_to_start(flight), Some((_, count)) if count > 1);
        if !gating || data.state.ground().is_none() {
            return Ok(input);
        }

        let gate = match self.gate {
            Some(gate) => gate,
            None => {
                let gate = mission.create_at(NodeKind::timer(self.join), group, flight.position)?;
                self.gate = Some(gate);
                gate
            }
        };
        if last_to_start(flight).map(|(last, _)| last) == Some(element) {
            mission.connect(input, gate)?;
        }
        Ok(PendingLink::Node(gate))
    }

    fn make_state(&mut self, _flight: &mut Flight, _mission: &mut Mission, elapsed: f64) -> Result<()> {
        spend(&mut self.time, elapsed);
        Ok(())
    }
}

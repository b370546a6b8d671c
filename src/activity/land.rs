//! Land activity - terminal landing command

use glam::DVec3;

use super::{ActivityKind, FlightActivity, PendingLink};
use crate::core::error::Result;
use crate::flight::Flight;
use crate::graph::NodeKind;
use crate::mission::Mission;

#[derive(Debug, Clone)]
pub struct Land {
    pub position: DVec3,
    /// Landing direction (degrees)
    pub heading: f64,
}

impl Land {
    pub fn new(position: DVec3, heading: f64) -> Self {
        Self { position, heading }
    }
}

impl FlightActivity for Land {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Land
    }

    fn time(&self) -> Option<f64> {
        None
    }

    /// One command for the whole flight, issued on the leader element
    fn make_action(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        element: usize,
        input: PendingLink,
    ) -> Result<PendingLink> {
        if element > 0 || input.is_none() {
            return Ok(PendingLink::None);
        }

        let land = mission.create_at(NodeKind::Land, flight.group, self.position)?;
        mission.graph.set_orientation(land, self.heading)?;
        for leader in flight.elements.iter().filter_map(|e| e.leader()) {
            mission.add_object(land, leader.item)?;
        }
        mission.connect(input, land)?;
        Ok(PendingLink::None)
    }
}

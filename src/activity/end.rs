//! End activity - flight leaves the map

use glam::DVec3;

use super::{ActivityKind, FlightActivity, PendingLink};
use crate::core::error::Result;
use crate::flight::Flight;
use crate::graph::NodeKind;
use crate::mission::Mission;

/// Removes the AI planes once they reach the border exit point
#[derive(Debug, Clone)]
pub struct End {
    pub position: DVec3,
}

impl End {
    pub fn new(position: DVec3) -> Self {
        Self { position }
    }
}

impl FlightActivity for End {
    fn kind(&self) -> ActivityKind {
        ActivityKind::End
    }

    fn time(&self) -> Option<f64> {
        None
    }

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

        let delete = mission.create_at(NodeKind::Delete, flight.group, self.position)?;
        for item in flight.items() {
            let player = mission
                .graph
                .get(item)?
                .kind
                .as_plane()
                .is_some_and(|p| p.player);
            if !player {
                mission.add_object(delete, item)?;
            }
        }
        mission.connect(input, delete)?;
        Ok(PendingLink::None)
    }
}

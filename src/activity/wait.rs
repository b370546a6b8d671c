//! Wait activity - free flight for a fixed time

use super::{spend, ActivityKind, FlightActivity, PendingLink};
use crate::core::error::Result;
use crate::flight::Flight;
use crate::graph::NodeKind;
use crate::mission::Mission;

#[derive(Debug, Clone)]
pub struct Wait {
    time: Option<f64>,
}

impl Wait {
    pub fn new(duration: f64) -> Self {
        Self {
            time: (duration > 0.0).then_some(duration),
        }
    }
}

impl FlightActivity for Wait {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Wait
    }

    fn time(&self) -> Option<f64> {
        self.time
    }

    /// Leader element only; the others follow by cover
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
        let Some(time) = self.time else {
            return Ok(input);
        };

        let timer = mission.create_at(NodeKind::timer(time), flight.group, flight.position)?;
        mission.connect(input, timer)?;
        Ok(PendingLink::Node(timer))
    }

    fn make_state(&mut self, flight: &mut Flight, mission: &mut Mission, elapsed: f64) -> Result<()> {
        let elapsed = elapsed.min(self.time.unwrap_or(0.0));
        let distance = elapsed * flight.speed_ms();
        flight.consume_distance(&mut mission.graph, distance, &mission.config)?;
        spend(&mut self.time, elapsed);
        Ok(())
    }

    fn removable_when_spent(&self) -> bool {
        true
    }
}

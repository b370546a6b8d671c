//! Takeoff activity

use glam::DVec3;

use super::{spend, ActivityKind, FlightActivity, PendingLink};
use crate::core::config::GeneratorConfig;
use crate::core::error::Result;
use crate::core::types::heading;
use crate::flight::{Flight, FlightState, GroundState};
use crate::graph::{EventType, NodeKind, ReportType};
use crate::mission::Mission;

#[derive(Debug, Clone, Default)]
pub struct Takeoff {
    time: Option<f64>,
    /// Runway start and end, when the airfield has a taxi route
    runway: Option<(DVec3, DVec3)>,
}

impl Takeoff {
    /// Time budget from the flight's ground phase; airborne flights get none
    pub fn new(flight: &Flight, config: &GeneratorConfig) -> Self {
        let runway = flight.taxi.as_ref().map(|t| (t.runway_start, t.runway_end));
        let taxi = flight.taxi.as_ref().map_or(0.0, |t| t.length()) / config.taxi_speed;

        let time = match flight.state {
            FlightState::Air(_) => None,
            FlightState::Ground(GroundState::Start) => Some(config.takeoff_time + taxi),
            FlightState::Ground(GroundState::Taxi) => Some(config.takeoff_time + taxi / 2.0),
            FlightState::Ground(GroundState::Runway) => Some(config.takeoff_time),
        };

        Self { time, runway }
    }
}

impl FlightActivity for Takeoff {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Takeoff
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
        let Some(element_data) = flight.elements.get(element) else {
            return Ok(PendingLink::None);
        };
        let Some(ground) = element_data.state.ground() else {
            return Ok(input);
        };
        let Some(leader) = element_data.leader().map(|p| p.item) else {
            return Ok(input);
        };

        let group = flight.group;
        let config = &mission.config;
        let post_delay = mission.rng.real(config.post_takeoff_min, config.post_takeoff_max);

        let Some((runway_start, runway_end)) = self.runway else {
            // Without a taxi route the plane takes off on its own
            let post = mission.create_at(NodeKind::timer(post_delay), group, flight.home)?;
            mission.add_event(leader, EventType::OnPlaneTookOff, post)?;
            return Ok(PendingLink::Node(post));
        };

        let mut link = input;
        if ground == GroundState::Runway {
            let (min, max) = if flight.player && element > 0 {
                (config.player_takeoff_wait_min, config.player_takeoff_wait_max)
            } else {
                (config.takeoff_wait_min, config.takeoff_wait_max)
            };
            let wait = mission.rng.real(min, max);
            let timer = mission.create_at(NodeKind::timer(wait), group, runway_start)?;
            mission.connect(link, timer)?;
            link = PendingLink::Node(timer);
        }

        let takeoff = mission.create_at(NodeKind::TakeOff, group, runway_start)?;
        mission.graph.set_orientation_to(takeoff, runway_end)?;
        mission.add_object(takeoff, leader)?;
        mission.connect(link, takeoff)?;

        let post = mission.create_at(NodeKind::timer(post_delay), group, runway_end)?;
        mission.add_report(leader, ReportType::OnTookOff, takeoff, post)?;
        Ok(PendingLink::Node(post))
    }

    fn make_state(&mut self, flight: &mut Flight, mission: &mut Mission, elapsed: f64) -> Result<()> {
        spend(&mut self.time, elapsed);
        if self.time.is_some() {
            return Ok(());
        }

        flight.set_airborne();
        let altitude = flight.home.y + mission.config.takeoff_altitude;
        match self.runway {
            Some((start, end)) => {
                flight.position = DVec3::new(end.x, altitude, end.z);
                flight.heading = heading(start, end);
            }
            None => {
                flight.position = DVec3::new(flight.home.x, altitude, flight.home.z);
            }
        }
        Ok(())
    }
}

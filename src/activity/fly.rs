//! Fly activity - waypoint routes with optional orbit loop

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::{spend, ActivityKind, FlightActivity, PendingLink, TIME_EPSILON};
use crate::core::config::GeneratorConfig;
use crate::core::error::Result;
use crate::core::types::{flat_distance, heading, KMH_TO_MS};
use crate::flight::Flight;
use crate::graph::{NodeId, NodeKind, WaypointPriority};
use crate::mission::Mission;

/// Waypoint trigger radius (meters)
pub const WAYPOINT_RADIUS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlyTask {
    /// Plain transit (return legs)
    Free,
    Patrol,
    Cover,
    Sweep,
}

impl FlyTask {
    fn priority(&self) -> WaypointPriority {
        match self {
            FlyTask::Patrol | FlyTask::Cover => WaypointPriority::Low,
            FlyTask::Free | FlyTask::Sweep => WaypointPriority::Medium,
        }
    }
}

/// Fly a route, then optionally loop an orbit for a fixed time
///
/// The orbit loop is entered at `orbit[0]` and flown as a closed cycle.
#[derive(Debug, Clone)]
pub struct Fly {
    pub task: FlyTask,
    /// Transit points still ahead, in order
    pub route: Vec<DVec3>,
    pub orbit: Vec<DVec3>,
    /// Time left in the orbit loop
    pub orbit_time: f64,
    /// Distance already flown around the orbit
    orbit_offset: f64,
    /// Cruise speed (km/h)
    pub speed: f64,
    time: Option<f64>,
}

fn path_length(from: DVec3, points: &[DVec3]) -> f64 {
    let mut last = from;
    let mut total = 0.0;
    for &p in points {
        total += flat_distance(last, p);
        last = p;
    }
    total
}

impl Fly {
    pub fn new(task: FlyTask, route: Vec<DVec3>, speed: f64) -> Self {
        Self {
            task,
            route,
            orbit: Vec::new(),
            orbit_time: 0.0,
            orbit_offset: 0.0,
            speed,
            time: None,
        }
    }

    /// Loop `orbit` for `time` seconds once the route is flown
    pub fn with_orbit(mut self, orbit: Vec<DVec3>, time: f64) -> Self {
        if let Some(&entry) = orbit.first() {
            if self.route.last() != Some(&entry) {
                self.route.push(entry);
            }
            self.orbit = orbit;
            self.orbit_time = time.max(0.0);
        }
        self
    }

    fn speed_ms(&self) -> f64 {
        self.speed * KMH_TO_MS
    }

    /// Recompute the remaining time for a leg flown from `from`
    pub fn update_time(&mut self, from: DVec3) {
        let speed = self.speed_ms();
        let transit = if speed > 0.0 {
            path_length(from, &self.route) / speed
        } else {
            0.0
        };
        let total = transit + self.orbit_time;
        self.time = (total > TIME_EPSILON).then_some(total);
    }

    /// Where the leg hands over to the next activity
    pub fn end_point(&self) -> Option<DVec3> {
        self.route.last().copied().or_else(|| self.orbit.first().copied())
    }

    /// Route length including one lap of the orbit per its loop time
    pub fn distance(&self, from: DVec3) -> f64 {
        path_length(from, &self.route) + self.orbit_time * self.speed_ms()
    }

    fn orbit_perimeter(&self) -> f64 {
        let n = self.orbit.len();
        (0..n)
            .map(|i| flat_distance(self.orbit[i], self.orbit[(i + 1) % n]))
            .sum()
    }

    /// Position on the orbit after flying `offset` meters from its entry
    fn orbit_position(&self, offset: f64) -> (DVec3, usize) {
        let n = self.orbit.len();
        let perimeter = self.orbit_perimeter();
        if n < 2 || perimeter <= 0.0 {
            return (self.orbit.first().copied().unwrap_or_default(), 0);
        }
        let mut left = offset.rem_euclid(perimeter);
        for i in 0..n {
            let (a, b) = (self.orbit[i], self.orbit[(i + 1) % n]);
            let d = flat_distance(a, b);
            if left < d {
                return (a.lerp(b, left / d), (i + 1) % n);
            }
            left -= d;
        }
        (self.orbit[0], 1 % n)
    }

    fn waypoint(&self, flight: &Flight, mission: &mut Mission, position: DVec3) -> Result<NodeId> {
        let wp = mission.create_at(
            NodeKind::Waypoint {
                speed: self.speed,
                radius: WAYPOINT_RADIUS,
                priority: self.task.priority(),
            },
            flight.group,
            position,
        )?;
        if let Some(leader) = flight.leader() {
            mission.add_object(wp, leader.item)?;
        }
        Ok(wp)
    }
}

impl FlightActivity for Fly {
    fn kind(&self) -> ActivityKind {
        ActivityKind::Fly
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

        let mut link = input;
        let mut last = flight.position;
        for &point in &self.route {
            let wp = self.waypoint(flight, mission, point)?;
            mission.graph.set_orientation(wp, heading(last, point))?;
            mission.connect(link, wp)?;
            link = PendingLink::Node(wp);
            last = point;
        }

        if self.orbit.is_empty() || self.orbit_time <= TIME_EPSILON {
            return Ok(link);
        }

        // Orbit waypoints as a closed cycle, starting at the next point ahead
        let n = self.orbit.len();
        let next = if self.route.is_empty() {
            self.orbit_position(self.orbit_offset).1
        } else {
            1 % n
        };
        let mut loop_nodes = Vec::with_capacity(n);
        for i in 0..n {
            let point = self.orbit[(next + i) % n];
            let wp = self.waypoint(flight, mission, point)?;
            mission.graph.set_orientation(wp, heading(last, point))?;
            last = point;
            loop_nodes.push(wp);
        }
        for pair in loop_nodes.windows(2) {
            mission.graph.add_target(pair[0], pair[1])?;
        }
        if let (Some(&first), Some(&tail)) = (loop_nodes.first(), loop_nodes.last()) {
            mission.graph.add_target(tail, first)?;
            mission.connect(link, first)?;
        }

        let timer = mission.create_at(NodeKind::timer(self.orbit_time), flight.group, last)?;
        mission.connect(link, timer)?;
        Ok(PendingLink::Node(timer))
    }

    fn make_state(&mut self, flight: &mut Flight, mission: &mut Mission, elapsed: f64) -> Result<()> {
        let elapsed = elapsed.min(self.time.unwrap_or(0.0));
        let speed = self.speed_ms();
        let mut left = elapsed * speed;
        flight.consume_distance(&mut mission.graph, left, &mission.config)?;

        let mut position = flight.position;
        while left > 0.0 && !self.route.is_empty() {
            let next = self.route[0];
            let d = flat_distance(position, next);
            if d > 0.0 {
                flight.heading = heading(position, next);
            }
            if d <= left {
                left -= d;
                position = next;
                self.route.remove(0);
            } else {
                position = position.lerp(next, left / d);
                left = 0.0;
            }
        }

        if left > 0.0 && !self.orbit.is_empty() && speed > 0.0 {
            let looped = (left / speed).min(self.orbit_time);
            self.orbit_time -= looped;
            self.orbit_offset += looped * speed;
            let (point, next) = self.orbit_position(self.orbit_offset);
            flight.heading = heading(point, self.orbit[next]);
            position = point;
        }

        spend(&mut self.time, elapsed);
        if self.time.is_none() {
            self.route.clear();
            self.orbit_time = 0.0;
        }
        flight.position = position;
        Ok(())
    }

    fn make_virtual_points(&self, config: &GeneratorConfig) -> usize {
        match self.time {
            Some(time) if config.virtual_point_interval > 0.0 => {
                (time / config.virtual_point_interval).floor() as usize
            }
            _ => 0,
        }
    }

    fn removable_when_spent(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<DVec3> {
        vec![
            DVec3::new(0.0, 2000.0, 0.0),
            DVec3::new(1000.0, 2000.0, 0.0),
            DVec3::new(1000.0, 2000.0, 1000.0),
            DVec3::new(0.0, 2000.0, 1000.0),
        ]
    }

    #[test]
    fn test_time_from_route_and_orbit() {
        // 360 km/h = 100 m/s
        let mut fly = Fly::new(FlyTask::Patrol, vec![DVec3::new(10_000.0, 2000.0, 0.0)], 360.0)
            .with_orbit(square(), 600.0);
        fly.update_time(DVec3::new(0.0, 2000.0, 0.0));
        // 10 km out, 10 km back to the orbit entry, 600 s loop
        assert!((fly.time().unwrap() - 800.0).abs() < 1e-9);
    }

    #[test]
    fn test_virtual_points() {
        let config = GeneratorConfig::default();
        let mut fly = Fly::new(FlyTask::Free, vec![DVec3::new(180_000.0, 2000.0, 0.0)], 360.0);
        fly.update_time(DVec3::ZERO);
        assert_eq!(fly.make_virtual_points(&config), 3);

        let mut short = Fly::new(FlyTask::Free, vec![DVec3::new(50_000.0, 2000.0, 0.0)], 360.0);
        short.update_time(DVec3::ZERO);
        assert_eq!(short.make_virtual_points(&config), 0);
    }

    #[test]
    fn test_orbit_position_wraps() {
        let fly = Fly::new(FlyTask::Patrol, vec![], 360.0).with_orbit(square(), 600.0);
        let (p, next) = fly.orbit_position(4500.0);
        assert!((p - DVec3::new(500.0, 2000.0, 0.0)).length() < 1e-9);
        assert_eq!(next, 1);
    }
}

//! Task plan shapes
//!
//! Every task opens with Start, Takeoff, Form and closes with a return
//! leg and Land (or End when the home airfield is offmap).

use std::fmt;

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::plan::Plan;
use super::shaping::shape_plan;
use crate::activity::{Activity, FlightActivity, Fly, FlyTask, Form, Land, Start, Takeoff, Wait};
use crate::core::error::Result;
use crate::core::types::{flat, heading, heading_vector, lift};
use crate::flight::Flight;
use crate::map::is_offmap;
use crate::mission::Mission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Free,
    Patrol,
    Cover,
    Sweep,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Free => "free",
            TaskKind::Patrol => "patrol",
            TaskKind::Cover => "cover",
            TaskKind::Sweep => "sweep",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(TaskKind::Free),
            "patrol" => Ok(TaskKind::Patrol),
            "cover" => Ok(TaskKind::Cover),
            "sweep" => Ok(TaskKind::Sweep),
            other => Err(format!("unknown task: {other}")),
        }
    }
}

/// Points around a center, evenly spaced, starting at `rotation` degrees
fn ring(center: DVec2, radius: f64, count: usize, rotation: f64, altitude: f64) -> Vec<DVec3> {
    (0..count)
        .map(|i| {
            let angle = rotation + 360.0 * i as f64 / count as f64;
            lift(center + heading_vector(angle) * radius, altitude)
        })
        .collect()
}

/// Task area at task distance from home, leaning toward the map center
fn task_area(flight: &Flight, mission: &mut Mission, margin: f64) -> DVec2 {
    let config = &mission.config;
    let home = flat(flight.home);
    let toward = heading(flight.home, lift(mission.map.center(), 0.0));
    let direction = toward + mission.rng.real(-60.0, 60.0);
    let distance = mission
        .rng
        .real(config.task_distance_min, config.task_distance_max);
    mission
        .map
        .clamp_inside(home + heading_vector(direction) * distance, margin)
}

/// Build the activity plan for a flight's task
///
/// Also sets initial fuel from the planned distance and applies offmap
/// clipping to the first and last legs.
pub fn make_plan(flight: &mut Flight, mission: &mut Mission) -> Result<()> {
    let config = mission.config.clone();
    let altitude = mission.rng.real(config.altitude_min, config.altitude_max);
    let home = flat(flight.home);
    let offmap_home = is_offmap(&mission.map, flight.home);

    if flight.state.is_air() {
        flight.position = lift(home, flight.home.y + altitude);
    }

    let mut plan = Plan::new();
    plan.push(Activity::Start(Start::new()));
    plan.push(Activity::Takeoff(Takeoff::new(flight, &config)));
    plan.push(Activity::Form(Form::new(flight, &mut mission.rng, &config)));

    let margin = config.patrol_leg_length.max(config.cover_orbit_radius) + config.min_border_distance;
    let area = task_area(flight, mission, margin);
    let rotation = mission.rng.real(0.0, 360.0);

    match flight.task {
        TaskKind::Free => {
            if offmap_home {
                plan.push(Activity::Fly(Fly::new(
                    FlyTask::Free,
                    vec![lift(area, altitude)],
                    flight.speed,
                )));
            }
            let wait = mission.rng.real(config.free_wait_min, config.free_wait_max);
            plan.push(Activity::Wait(Wait::new(wait)));
            flight.target = None;
        }
        TaskKind::Patrol => {
            let patrol_time = mission.rng.real(config.patrol_time_min, config.patrol_time_max);
            let radius = config.patrol_leg_length / std::f64::consts::SQRT_2;
            let orbit = ring(area, radius, 4, rotation, altitude);
            plan.push(Activity::Fly(
                Fly::new(FlyTask::Patrol, Vec::new(), flight.speed).with_orbit(orbit, patrol_time),
            ));
            flight.target = Some(format!(
                "patrol area {:.0}/{:.0} km",
                area.x / 1000.0,
                area.y / 1000.0
            ));
        }
        TaskKind::Cover => {
            let friendly: Vec<(String, DVec2)> = mission
                .data
                .airfields_of(flight.coalition)
                .into_iter()
                .filter(|a| a.id != flight.airfield && !is_offmap(&mission.map, a.position))
                .map(|a| (a.name.clone(), flat(a.position)))
                .collect();
            let (name, point) = match mission.rng.pick(&friendly) {
                Some((name, point)) => (name.clone(), *point),
                None => ("front sector".to_string(), area),
            };
            let patrol_time = mission.rng.real(config.patrol_time_min, config.patrol_time_max);
            let orbit = ring(point, config.cover_orbit_radius, 4, rotation, altitude);
            plan.push(Activity::Fly(
                Fly::new(FlyTask::Cover, Vec::new(), flight.speed).with_orbit(orbit, patrol_time),
            ));
            flight.target = Some(format!("cover {name}"));
        }
        TaskKind::Sweep => {
            let side = if mission.rng.bool(0.5) { 90.0 } else { -90.0 };
            let out = heading(flight.home, lift(area, 0.0));
            let through = mission.map.clamp_inside(
                area + heading_vector(out + side) * config.patrol_leg_length * 2.0,
                config.min_border_distance,
            );
            plan.push(Activity::Fly(Fly::new(
                FlyTask::Sweep,
                vec![lift(area, altitude), lift(through, altitude)],
                flight.speed,
            )));
            flight.target = Some(format!(
                "sweep {:.0}/{:.0} km",
                area.x / 1000.0,
                area.y / 1000.0
            ));
        }
    }

    if flight.task != TaskKind::Free || offmap_home {
        plan.push(Activity::Fly(Fly::new(
            FlyTask::Free,
            vec![lift(home, flight.home.y + altitude)],
            flight.speed,
        )));
    }

    let landing = flight
        .taxi
        .as_ref()
        .map_or(flight.heading, |t| heading(t.runway_start, t.runway_end));
    plan.push(Activity::Land(Land::new(flight.home, landing)));

    plan.update_times(flight.position);
    let distance = planned_distance(&plan, flight);
    let fuel = (distance / (flight.range * 1000.0).max(1.0) + config.fuel_reserve)
        .clamp(config.fuel_min, 1.0);
    flight.set_fuel(&mut mission.graph, fuel)?;

    flight.plan = plan;
    shape_plan(flight, mission)?;
    flight.time = flight.plan.total_time();

    debug!(
        flight = flight.id,
        task = %flight.task,
        activities = flight.plan.len(),
        time = flight.time,
        fuel,
        "Plan assembled"
    );
    Ok(())
}

/// Distance flown over the whole plan before clipping
fn planned_distance(plan: &Plan, flight: &Flight) -> f64 {
    let mut position = flight.position;
    let mut total = 0.0;
    for activity in plan.iter() {
        match activity {
            Activity::Fly(fly) => {
                total += fly.distance(position);
                if let Some(end) = fly.end_point() {
                    position = end;
                }
            }
            Activity::Wait(wait) => {
                total += wait.make_time() * flight.speed_ms();
            }
            _ => {}
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_parse_and_display() {
        assert_eq!("Patrol".parse::<TaskKind>(), Ok(TaskKind::Patrol));
        assert!("bomb".parse::<TaskKind>().is_err());
        assert_eq!(TaskKind::Sweep.to_string(), "sweep");
    }

    #[test]
    fn test_ring_points_on_radius() {
        let center = DVec2::new(50_000.0, 50_000.0);
        let points = ring(center, 4000.0, 4, 30.0, 2000.0);
        assert_eq!(points.len(), 4);
        for p in points {
            assert!((flat(p).distance(center) - 4000.0).abs() < 1e-6);
            assert_eq!(p.y, 2000.0);
        }
    }
}

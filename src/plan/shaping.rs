//! Offmap clipping of a plan's first and last legs
//!
//! A flight based offmap enters the map at the border crossing of its
//! outbound leg; the clipped approach turns into Start delay and fuel.
//! Its return leg is cut at the border and the plan ends with `End`.

use tracing::{debug, warn};

use crate::activity::Activity;
use crate::core::error::Result;
use crate::core::types::heading;
use crate::flight::Flight;
use crate::map::{clip_route, is_offmap, start_direction, BorderPush, RouteEnd};
use crate::mission::Mission;

fn fly_indices(flight: &Flight) -> Vec<usize> {
    flight
        .plan
        .iter()
        .enumerate()
        .filter(|(_, a)| matches!(a, Activity::Fly(_)))
        .map(|(i, _)| i)
        .collect()
}

/// Clip the outbound and return legs at the playable border
///
/// Running it again on a shaped plan changes nothing.
pub fn shape_plan(flight: &mut Flight, mission: &mut Mission) -> Result<()> {
    let flies = fly_indices(flight);
    if flies.is_empty() {
        return Ok(());
    }

    if is_offmap(&mission.map, flight.position) {
        clip_head(flight, mission, flies[0])?;
    }

    let last = flies[flies.len() - 1];
    let from = flies
        .iter()
        .rev()
        .skip(1)
        .find_map(|&i| match flight.plan.get(i) {
            Some(Activity::Fly(fly)) => fly.end_point(),
            _ => None,
        })
        .unwrap_or(flight.position);
    clip_tail(flight, mission, last, from)?;

    flight.plan.update_times(flight.position);
    Ok(())
}

fn clip_head(flight: &mut Flight, mission: &mut Mission, index: usize) -> Result<()> {
    let Some(Activity::Fly(fly)) = flight.plan.get(index) else {
        return Ok(());
    };
    let mut route = Vec::with_capacity(fly.route.len() + 1);
    route.push(flight.position);
    route.extend(fly.route.iter().copied());

    let push = if flight.player {
        let config = &mission.config;
        Some(BorderPush {
            distance: mission.rng.real(config.border_push_min, config.border_push_max),
            min_border_distance: config.min_border_distance,
        })
    } else {
        None
    };

    let result = clip_route(&mut route, &mission.map, RouteEnd::Start, push);
    if result.discarded {
        warn!(flight = flight.id, "Outbound leg is entirely offmap");
        return Ok(());
    }
    let Some(entry) = result.point else {
        return Ok(());
    };

    if let Some(direction) = start_direction(&route) {
        flight.heading = direction.y.atan2(direction.x).to_degrees().rem_euclid(360.0);
    } else if let Some(&next) = route.get(1) {
        flight.heading = heading(entry, next);
    }
    flight.position = entry;
    if let Some(Activity::Fly(fly)) = flight.plan.get_mut(index) {
        fly.route = route[1..].to_vec();
    }

    let delay = flight.flight_time(result.distance);
    if let Some(start) = flight.plan.start_mut() {
        start.add_delay(delay);
    }
    flight.consume_distance(&mut mission.graph, result.distance, &mission.config)?;

    debug!(
        flight = flight.id,
        distance = result.distance,
        delay,
        plane = ?result.plane,
        "Clipped offmap start"
    );
    Ok(())
}

fn clip_tail(
    flight: &mut Flight,
    mission: &mut Mission,
    index: usize,
    from: glam::DVec3,
) -> Result<()> {
    let Some(Activity::Fly(fly)) = flight.plan.get(index) else {
        return Ok(());
    };
    let mut route = Vec::with_capacity(fly.route.len() + 1);
    route.push(from);
    route.extend(fly.route.iter().copied());

    let result = clip_route(&mut route, &mission.map, RouteEnd::End, None);
    let Some(exit) = result.point else {
        return Ok(());
    };

    if let Some(Activity::Fly(fly)) = flight.plan.get_mut(index) {
        fly.route = route[1..].to_vec();
        if fly.route.is_empty() {
            fly.route.push(exit);
        }
    }
    flight.plan.end_at(index, exit);

    debug!(
        flight = flight.id,
        distance = result.distance,
        plane = ?result.plane,
        "Clipped offmap return"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityKind;
    use crate::flight::FlightState;
    use crate::mission::{FlightRequest, Mission};
    use crate::plan::TaskKind;

    #[test]
    fn test_offmap_patrol_is_clipped_both_ends() {
        let mut mission = Mission::sample(42).unwrap();
        let id = mission
            .make_flight(FlightRequest::new("jg52_rear", TaskKind::Patrol))
            .unwrap();
        let flight = &mission.flights[id];

        assert_eq!(flight.state, FlightState::Air(0.0));
        assert!(!is_offmap(&mission.map, flight.position));
        assert!(flight.plan.start().unwrap().delay() > 0.0);
        assert_eq!(flight.plan.kinds().last(), Some(&ActivityKind::End));
        assert!(flight.plan.land().is_none());
    }

    #[test]
    fn test_shaping_twice_is_noop() {
        let mut mission = Mission::sample(7).unwrap();
        let id = mission
            .make_flight(FlightRequest::new("jg52_rear", TaskKind::Sweep))
            .unwrap();
        let mut flight = mission.flights[id].clone();
        let (position, kinds, time) = (flight.position, flight.plan.kinds(), flight.plan.total_time());
        let delay = flight.plan.start().unwrap().delay();

        shape_plan(&mut flight, &mut mission).unwrap();
        assert_eq!(flight.position, position);
        assert_eq!(flight.plan.kinds(), kinds);
        assert_eq!(flight.plan.start().unwrap().delay(), delay);
        assert!((flight.plan.total_time() - time).abs() < 1e-6);
    }
}

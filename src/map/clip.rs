//! Offmap route clipping
//!
//! Walks a route from one end, drops points outside the playable area and
//! replaces them with the exact border crossing. Clipping an already
//! clipped route is a no-op.

use glam::{DVec2, DVec3};

use super::bounds::{intersect, is_offmap, BorderPlane, MapBounds};
use crate::core::types::{flat, lift, round_position};

/// Which end of the route is clipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEnd {
    Start,
    End,
}

/// Inward push applied to a clipped player start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderPush {
    /// Distance moved along the route direction
    pub distance: f64,
    /// Minimum distance the result must keep from the crossed border
    pub min_border_distance: f64,
}

/// Outcome of clipping one end of a route
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipResult {
    /// Route length removed (meters)
    pub distance: f64,
    /// New end point, when the route was clipped
    pub point: Option<DVec3>,
    pub plane: Option<BorderPlane>,
    /// Every point was offmap and the route is now empty
    pub discarded: bool,
}

impl ClipResult {
    pub fn is_clipped(&self) -> bool {
        self.point.is_some() || self.discarded
    }
}

fn route_length(points: &[DVec3]) -> f64 {
    points
        .windows(2)
        .map(|w| flat(w[0]).distance(flat(w[1])))
        .sum()
}

/// Clip one end of a route at the playable border
///
/// `push` only applies to `RouteEnd::Start` (player flights).
pub fn clip_route(
    route: &mut Vec<DVec3>,
    map: &MapBounds,
    end: RouteEnd,
    push: Option<BorderPush>,
) -> ClipResult {
    match end {
        RouteEnd::Start => clip_start(route, map, push),
        RouteEnd::End => {
            route.reverse();
            let result = clip_start(route, map, None);
            route.reverse();
            result
        }
    }
}

fn clip_start(route: &mut Vec<DVec3>, map: &MapBounds, push: Option<BorderPush>) -> ClipResult {
    let Some(&first) = route.first() else {
        return ClipResult::default();
    };
    if !is_offmap(map, first) {
        return ClipResult::default();
    }

    let Some(inside) = route.iter().position(|&p| !is_offmap(map, p)) else {
        let distance = route_length(route);
        route.clear();
        return ClipResult {
            distance,
            discarded: true,
            ..ClipResult::default()
        };
    };

    let outside = route[inside - 1];
    let target = route[inside];
    let (from, to) = (flat(target), flat(outside));

    // Degenerate crossing: fall back to the first on-map point
    let Some(hit) = intersect(map, from, to) else {
        let distance = route_length(&route[..=inside]);
        route.drain(..inside);
        return ClipResult {
            distance,
            point: Some(target),
            plane: None,
            discarded: false,
        };
    };

    let segment = from.distance(to);
    let t = if segment > 0.0 {
        hit.point.distance(to) / segment
    } else {
        0.0
    };
    let altitude = outside.y + (target.y - outside.y) * t;
    let mut distance = route_length(&route[..inside]) + hit.point.distance(to);
    let mut point = hit.point;

    if let Some(push) = push {
        let remaining = hit.point.distance(from);
        let step = push.distance.min((remaining - 1.0).max(0.0));
        if remaining > 0.0 {
            point += (from - hit.point) / remaining * step;
            distance += step;
        }

        let border_distance = map.plane_distance(hit.plane, point);
        if border_distance < push.min_border_distance {
            point += hit.plane.inward_normal() * (push.min_border_distance - border_distance);
        }
    }

    let point = round_position(lift(point, altitude));
    route.drain(..inside);
    route.insert(0, point);

    ClipResult {
        distance,
        point: Some(point),
        plane: Some(hit.plane),
        discarded: false,
    }
}

/// Direction of travel at the start of a route (map plane, normalized)
pub fn start_direction(route: &[DVec3]) -> Option<DVec2> {
    let a = flat(*route.first()?);
    route
        .iter()
        .skip(1)
        .map(|&p| flat(p) - a)
        .find(|d| d.length_squared() > 1.0)
        .map(|d| d.normalize())
}

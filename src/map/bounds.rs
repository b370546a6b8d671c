//! Playable map rectangle and border intersection
//!
//! The map spans x in [0, height] (north) and z in [0, width] (east). The
//! playable area is that rectangle shrunk by the restricted border margin.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Coord, Line};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::core::types::flat;

/// Points this close outside the playable area still count as on-map
///
/// Clipped points are rounded to whole meters and may land a fraction
/// of a meter past a non-integer border.
pub const BORDER_TOLERANCE: f64 = 1.0;

/// One side of the playable rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderPlane {
    South,
    North,
    West,
    East,
}

impl BorderPlane {
    pub const ALL: [BorderPlane; 4] = [
        BorderPlane::South,
        BorderPlane::North,
        BorderPlane::West,
        BorderPlane::East,
    ];

    /// Unit normal pointing into the playable area
    pub fn inward_normal(&self) -> DVec2 {
        match self {
            BorderPlane::South => DVec2::new(1.0, 0.0),
            BorderPlane::North => DVec2::new(-1.0, 0.0),
            BorderPlane::West => DVec2::new(0.0, 1.0),
            BorderPlane::East => DVec2::new(0.0, -1.0),
        }
    }
}

/// Where a segment crosses the playable border
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapIntersection {
    pub point: DVec2,
    pub plane: BorderPlane,
}

/// Map dimensions plus the restricted border margin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Extent along x (north), meters
    pub height: f64,
    /// Extent along z (east), meters
    pub width: f64,
    pub restricted_border: f64,
}

impl MapBounds {
    pub fn new(height: f64, width: f64, restricted_border: f64) -> Self {
        Self {
            height,
            width,
            restricted_border,
        }
    }

    pub fn min(&self) -> DVec2 {
        DVec2::splat(self.restricted_border)
    }

    pub fn max(&self) -> DVec2 {
        DVec2::new(
            self.height - self.restricted_border,
            self.width - self.restricted_border,
        )
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.height / 2.0, self.width / 2.0)
    }

    /// Signed inward distance from a border plane (negative = outside)
    pub fn plane_distance(&self, plane: BorderPlane, point: DVec2) -> f64 {
        let (min, max) = (self.min(), self.max());
        match plane {
            BorderPlane::South => point.x - min.x,
            BorderPlane::North => max.x - point.x,
            BorderPlane::West => point.y - min.y,
            BorderPlane::East => max.y - point.y,
        }
    }

    /// Closest border plane to a point and the inward distance to it
    pub fn nearest_plane(&self, point: DVec2) -> (BorderPlane, f64) {
        BorderPlane::ALL
            .iter()
            .map(|&plane| (plane, self.plane_distance(plane, point)))
            .fold((BorderPlane::South, f64::INFINITY), |best, cur| {
                if cur.1 < best.1 {
                    cur
                } else {
                    best
                }
            })
    }

    fn edge(&self, plane: BorderPlane) -> Line<f64> {
        let (min, max) = (self.min(), self.max());
        let (a, b) = match plane {
            BorderPlane::South => ((min.x, min.y), (min.x, max.y)),
            BorderPlane::North => ((max.x, min.y), (max.x, max.y)),
            BorderPlane::West => ((min.x, min.y), (max.x, min.y)),
            BorderPlane::East => ((min.x, max.y), (max.x, max.y)),
        };
        Line::new(Coord { x: a.0, y: a.1 }, Coord { x: b.0, y: b.1 })
    }

    /// Clamp a map-plane point into the playable area, keeping a margin
    pub fn clamp_inside(&self, point: DVec2, margin: f64) -> DVec2 {
        let min = self.min() + DVec2::splat(margin);
        let max = (self.max() - DVec2::splat(margin)).max(min);
        point.clamp(min, max)
    }
}

/// True when a point lies outside the playable area
pub fn is_offmap(map: &MapBounds, point: DVec3) -> bool {
    let p = flat(point);
    BorderPlane::ALL
        .iter()
        .any(|&plane| map.plane_distance(plane, p) < -BORDER_TOLERANCE)
}

/// Border crossing of the segment `from -> to` closest to `from`
///
/// Returns `None` when the segment does not touch the border.
pub fn intersect(map: &MapBounds, from: DVec2, to: DVec2) -> Option<MapIntersection> {
    let segment = Line::new(Coord { x: from.x, y: from.y }, Coord { x: to.x, y: to.y });

    BorderPlane::ALL
        .iter()
        .filter_map(|&plane| {
            let point = match line_intersection(segment, map.edge(plane))? {
                LineIntersection::SinglePoint { intersection, .. } => {
                    DVec2::new(intersection.x, intersection.y)
                }
                // Segment runs along the border: take the end nearest `from`
                LineIntersection::Collinear { intersection } => {
                    let a = DVec2::new(intersection.start.x, intersection.start.y);
                    let b = DVec2::new(intersection.end.x, intersection.end.y);
                    if a.distance_squared(from) <= b.distance_squared(from) {
                        a
                    } else {
                        b
                    }
                }
            };
            Some(MapIntersection { point, plane })
        })
        .min_by(|a, b| {
            a.point
                .distance_squared(from)
                .total_cmp(&b.point.distance_squared(from))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> MapBounds {
        MapBounds::new(100_000.0, 200_000.0, 5_000.0)
    }

    #[test]
    fn test_offmap_respects_restricted_border() {
        let map = map();
        assert!(!is_offmap(&map, DVec3::new(50_000.0, 0.0, 50_000.0)));
        assert!(is_offmap(&map, DVec3::new(2_000.0, 0.0, 50_000.0)));
        assert!(is_offmap(&map, DVec3::new(50_000.0, 0.0, 199_000.0)));
        // On the border itself is on-map
        assert!(!is_offmap(&map, DVec3::new(5_000.0, 0.0, 50_000.0)));
    }

    #[test]
    fn test_intersect_south_border() {
        let map = map();
        let hit = intersect(&map, DVec2::new(20_000.0, 50_000.0), DVec2::new(-10_000.0, 50_000.0))
            .unwrap();
        assert_eq!(hit.plane, BorderPlane::South);
        assert!((hit.point.x - 5_000.0).abs() < 1e-6);
        assert!((hit.point.y - 50_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_intersect_diagonal_east() {
        let map = map();
        let hit = intersect(&map, DVec2::new(50_000.0, 185_000.0), DVec2::new(60_000.0, 205_000.0))
            .unwrap();
        assert_eq!(hit.plane, BorderPlane::East);
        assert!((hit.point.y - 195_000.0).abs() < 1e-6);
        assert!((hit.point.x - 55_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_intersection_inside() {
        let map = map();
        assert!(intersect(&map, DVec2::new(20_000.0, 20_000.0), DVec2::new(30_000.0, 30_000.0))
            .is_none());
    }

    #[test]
    fn test_nearest_plane() {
        let map = map();
        let (plane, distance) = map.nearest_plane(DVec2::new(90_000.0, 100_000.0));
        assert_eq!(plane, BorderPlane::North);
        assert!((distance - 5_000.0).abs() < 1e-9);
    }
}

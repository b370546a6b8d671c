//! Core type definitions used throughout the codebase

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Mission time in seconds
pub type Seconds = f64;

/// World position: x = north, y = altitude, z = east (meters)
pub type Position = DVec3;

/// km/h to m/s
pub const KMH_TO_MS: f64 = 1.0 / 3.6;

/// Side a unit fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coalition {
    Neutral,
    Allies,
    Axis,
}

impl Coalition {
    /// Coalitions hostile to this one
    pub fn enemies(&self) -> Vec<Coalition> {
        match self {
            Coalition::Neutral => vec![],
            Coalition::Allies => vec![Coalition::Axis],
            Coalition::Axis => vec![Coalition::Allies],
        }
    }
}

/// Formation geometry of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationShape {
    #[default]
    Line,
    V,
    Echelon,
}

impl FormationShape {
    /// Slot offset (back, right) in meters for a wingman position
    pub fn slot_offset(&self, slot: usize, spacing: f64) -> (f64, f64) {
        if slot == 0 {
            return (0.0, 0.0);
        }
        let rank = slot.div_ceil(2) as f64;
        let side = if slot % 2 == 1 { 1.0 } else { -1.0 };
        match self {
            FormationShape::Line => (0.0, side * rank * spacing),
            FormationShape::V => (rank * spacing, side * rank * spacing),
            FormationShape::Echelon => (slot as f64 * spacing, slot as f64 * spacing),
        }
    }
}

/// Map-plane projection (x, z) of a world position
pub fn flat(position: Position) -> DVec2 {
    DVec2::new(position.x, position.z)
}

/// Lift a map-plane point back to a world position at an altitude
pub fn lift(point: DVec2, altitude: f64) -> Position {
    DVec3::new(point.x, altitude, point.y)
}

/// Horizontal distance between two world positions
pub fn flat_distance(a: Position, b: Position) -> f64 {
    flat(a).distance(flat(b))
}

/// Compass heading in degrees from one point to another (0 = north, 90 = east)
pub fn heading(from: Position, to: Position) -> f64 {
    let d = flat(to) - flat(from);
    if d.length_squared() < f64::EPSILON {
        return 0.0;
    }
    d.y.atan2(d.x).to_degrees().rem_euclid(360.0)
}

/// Unit vector on the map plane for a compass heading
pub fn heading_vector(degrees: f64) -> DVec2 {
    let rad = degrees.to_radians();
    DVec2::new(rad.cos(), rad.sin())
}

/// Round a position to whole meters
pub fn round_position(position: Position) -> Position {
    position.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_cardinal_directions() {
        let origin = DVec3::ZERO;
        assert!((heading(origin, DVec3::new(100.0, 0.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((heading(origin, DVec3::new(0.0, 0.0, 100.0)) - 90.0).abs() < 1e-9);
        assert!((heading(origin, DVec3::new(-100.0, 0.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((heading(origin, DVec3::new(0.0, 0.0, -100.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_vector_matches_heading() {
        let v = heading_vector(90.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_flat_distance_ignores_altitude() {
        let a = DVec3::new(0.0, 0.0, 0.0);
        let b = DVec3::new(3.0, 5000.0, 4.0);
        assert_eq!(flat_distance(a, b), 5.0);
    }

    #[test]
    fn test_enemies() {
        assert_eq!(Coalition::Allies.enemies(), vec![Coalition::Axis]);
        assert!(Coalition::Neutral.enemies().is_empty());
    }
}

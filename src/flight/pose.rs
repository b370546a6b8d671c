//! Place the planes of a flight around a reference point

use glam::{DVec2, DVec3};

use crate::core::error::Result;
use crate::core::types::heading_vector;
use crate::graph::TriggerGraph;

use super::flight::Flight;

/// Distance between wingmen in an element (meters)
pub const PLANE_SPACING: f64 = 60.0;

/// Distance between element leaders (meters)
pub const ELEMENT_SPACING: f64 = 300.0;

/// Map-plane offset for a (back, right) slot at a heading
fn slot_vector(heading: f64, back: f64, right: f64) -> DVec2 {
    let forward = heading_vector(heading);
    let side = heading_vector(heading + 90.0);
    side * right - forward * back
}

/// Position and orient every plane item of a flight
///
/// The flight leader sits on `position`; elements trail behind and to the
/// right, wingmen follow their element's formation shape.
pub fn pose_flight(
    graph: &mut TriggerGraph,
    flight: &Flight,
    position: DVec3,
    heading: f64,
) -> Result<()> {
    for (e, element) in flight.elements.iter().enumerate() {
        let lead = slot_vector(
            heading,
            e as f64 * ELEMENT_SPACING,
            e as f64 * ELEMENT_SPACING / 2.0,
        );
        for (slot, plane) in element.planes.iter().enumerate() {
            let (back, right) = element.shape.slot_offset(slot, PLANE_SPACING);
            let offset = lead + slot_vector(heading, back, right);
            graph.set_position(plane.item, position + DVec3::new(offset.x, 0.0, offset.y))?;
            graph.set_orientation(plane.item, heading)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_vector_heading_north() {
        // Behind a north-bound leader is south (negative x)
        let v = slot_vector(0.0, 100.0, 0.0);
        assert!((v.x + 100.0).abs() < 1e-9);
        assert!(v.y.abs() < 1e-9);

        // Right of a north-bound leader is east (positive z)
        let v = slot_vector(0.0, 0.0, 50.0);
        assert!(v.x.abs() < 1e-9);
        assert!((v.y - 50.0).abs() < 1e-9);
    }
}

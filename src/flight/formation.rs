//! Formation assembly - split a flight into elements
//!
//! A pattern lists element sizes. Every pattern matching the plane count is
//! a candidate; the RNG picks one.

use crate::core::error::{Result, SortieError};
use crate::core::rng::MissionRng;
use crate::core::types::FormationShape;

use super::flight::{FlightState, GroundState};

/// Element size patterns, leader element first
const PATTERNS: &[&[usize]] = &[
    &[1],
    &[2],
    &[3],
    &[2, 1],
    &[4],
    &[2, 2],
    &[3, 2],
    &[2, 2, 2],
    &[3, 3],
    &[4, 3],
    &[4, 4],
    &[2, 2, 2, 2],
];

/// Pick element sizes for a flight of `planes` planes
///
/// The returned sizes always sum to `planes`.
pub fn make_formation(planes: usize, rng: &mut MissionRng) -> Result<Vec<usize>> {
    let candidates: Vec<&[usize]> = PATTERNS
        .iter()
        .copied()
        .filter(|p| p.iter().sum::<usize>() == planes)
        .collect();

    rng.pick(&candidates)
        .map(|p| p.to_vec())
        .ok_or(SortieError::NoFormation { planes })
}

/// Geometry tag for an element of the given size
pub fn pick_shape(size: usize, rng: &mut MissionRng) -> FormationShape {
    match size {
        0 | 1 => FormationShape::Line,
        2 => *rng
            .pick(&[FormationShape::Line, FormationShape::Echelon])
            .unwrap_or(&FormationShape::Line),
        3 => FormationShape::V,
        _ => *rng
            .pick(&[FormationShape::Line, FormationShape::Echelon, FormationShape::V])
            .unwrap_or(&FormationShape::Line),
    }
}

/// Initial state of every element
///
/// On the ground only the lead element can hold the requested phase when
/// the taxi route is shared; the ones behind it queue one phase earlier.
pub fn element_states(elements: usize, state: FlightState, shared_taxi: bool) -> Vec<FlightState> {
    (0..elements)
        .map(|e| match state {
            FlightState::Ground(ground) if shared_taxi && e > 0 => {
                let queued = match (ground, e) {
                    (GroundState::Runway, 1) => GroundState::Taxi,
                    _ => GroundState::Start,
                };
                FlightState::Ground(queued.min(ground))
            }
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formation_sums_to_plane_count() {
        let mut rng = MissionRng::new(42);
        for planes in 1..=8 {
            for _ in 0..10 {
                let sizes = make_formation(planes, &mut rng).unwrap();
                assert_eq!(sizes.iter().sum::<usize>(), planes);
                assert!(sizes.iter().all(|&s| s > 0));
            }
        }
    }

    #[test]
    fn test_no_pattern_is_an_error() {
        let mut rng = MissionRng::new(42);
        assert!(matches!(
            make_formation(0, &mut rng),
            Err(SortieError::NoFormation { planes: 0 })
        ));
        assert!(matches!(
            make_formation(13, &mut rng),
            Err(SortieError::NoFormation { planes: 13 })
        ));
    }

    #[test]
    fn test_trailing_elements_queue_behind_lead() {
        let states = element_states(3, FlightState::Ground(GroundState::Runway), true);
        assert_eq!(
            states,
            vec![
                FlightState::Ground(GroundState::Runway),
                FlightState::Ground(GroundState::Taxi),
                FlightState::Ground(GroundState::Start),
            ]
        );

        let air = element_states(2, FlightState::Air(0.5), true);
        assert_eq!(air, vec![FlightState::Air(0.5); 2]);
    }

    #[test]
    fn test_separate_taxi_keeps_requested_phase() {
        let states = element_states(2, FlightState::Ground(GroundState::Taxi), false);
        assert_eq!(states, vec![FlightState::Ground(GroundState::Taxi); 2]);
    }
}

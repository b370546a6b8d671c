//! Flight data model: flights, elements, planes
//!
//! A flight is split into elements; each element flies one formation and
//! has its own ground/air state. Plane items live in the trigger graph and
//! are referenced by index.

#[allow(clippy::module_inception)]
pub mod flight;
pub mod formation;
pub mod pose;

pub use flight::{Element, Flight, FlightState, GroundState, Plane};
pub use formation::{element_states, make_formation, pick_shape};
pub use pose::{pose_flight, ELEMENT_SPACING, PLANE_SPACING};

//! Virtual flight level of detail
//!
//! Distant flights are replaced by plane generations placed at sampled
//! checkpoints. Each generation stays dormant until a friendly plane
//! enters its check zone. A generation nobody stays near is dropped and
//! the next checkpoint takes over; one that is kept removes the others.

pub mod engine;
pub mod zone;

pub use engine::{count_checkpoints, make_virtual_flight, Checkpoint};
pub use zone::{make_virtual_flight_zone, EarlierZone, NextHooks, ProximityWatch, VirtualZone, ZoneRequest};

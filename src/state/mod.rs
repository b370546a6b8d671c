//! Flight state advancement

pub mod fast_forward;

pub use fast_forward::{fast_forward, fast_forward_time};

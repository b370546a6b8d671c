//! Path shaper: playable border geometry and offmap route clipping

pub mod bounds;
pub mod clip;

pub use bounds::{intersect, is_offmap, BorderPlane, MapBounds, MapIntersection};
pub use clip::{clip_route, start_direction, BorderPush, ClipResult, RouteEnd};

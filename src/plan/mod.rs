//! Flight plans: ordered activities per task, with offmap shaping

#[allow(clippy::module_inception)]
pub mod plan;
pub mod shaping;
pub mod task;

pub use plan::{make_actions, Plan};
pub use shaping::shape_plan;
pub use task::{make_plan, TaskKind};

//! Flight activities
//!
//! A plan is an ordered list of activities. Each activity knows how to
//! emit its trigger-graph nodes for one element (`make_action`), how to
//! advance the flight when time is skipped (`make_state`), and how many
//! virtual checkpoints it contributes.
//!
//! Actions are chained through a `PendingLink`: the node the next
//! activity's entry must be triggered by. Most activities return
//! `PendingLink::None` when given `None`, which ends the chain.

pub mod end;
pub mod fly;
pub mod form;
pub mod land;
pub mod start;
pub mod takeoff;
pub mod wait;

pub use end::End;
pub use fly::{Fly, FlyTask};
pub use form::Form;
pub use land::Land;
pub use start::Start;
pub use takeoff::Takeoff;
pub use wait::Wait;

use serde::{Deserialize, Serialize};

use crate::core::config::GeneratorConfig;
use crate::core::error::Result;
use crate::flight::Flight;
use crate::graph::{NodeId, TriggerGraph};
use crate::mission::Mission;

/// Remaining time at or below this is spent
pub const TIME_EPSILON: f64 = 1e-6;

/// Node the next activity hooks its entry to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingLink {
    #[default]
    None,
    Node(NodeId),
}

impl PendingLink {
    pub fn is_none(&self) -> bool {
        matches!(self, PendingLink::None)
    }

    pub fn node(&self) -> Option<NodeId> {
        match self {
            PendingLink::None => None,
            PendingLink::Node(id) => Some(*id),
        }
    }

    /// Target `to` from the pending node, if any
    pub fn connect(&self, graph: &mut TriggerGraph, to: NodeId) -> Result<()> {
        if let PendingLink::Node(from) = self {
            graph.add_target(*from, to)?;
        }
        Ok(())
    }
}

impl From<NodeId> for PendingLink {
    fn from(id: NodeId) -> Self {
        PendingLink::Node(id)
    }
}

/// Activity discriminant, used for summaries and plan queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Start,
    Takeoff,
    Form,
    Wait,
    Fly,
    Land,
    End,
}

/// Behavior shared by every activity
pub trait FlightActivity {
    fn kind(&self) -> ActivityKind;

    /// Remaining time, `None` when not time-bearing or spent
    fn time(&self) -> Option<f64>;

    /// Emit graph nodes for one element
    fn make_action(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        element: usize,
        input: PendingLink,
    ) -> Result<PendingLink>;

    /// Advance the flight by `elapsed` seconds of this activity
    fn make_state(&mut self, _flight: &mut Flight, _mission: &mut Mission, _elapsed: f64) -> Result<()> {
        Ok(())
    }

    /// Time this activity contributes to the flight total
    fn make_time(&self) -> f64 {
        self.time().unwrap_or(0.0)
    }

    /// Number of intermediate virtual checkpoints this activity yields
    fn make_virtual_points(&self, _config: &GeneratorConfig) -> usize {
        0
    }

    /// Spent activities of this kind are dropped from the plan
    fn removable_when_spent(&self) -> bool {
        false
    }
}

/// Reduce a remaining time, clearing it once spent
pub(crate) fn spend(time: &mut Option<f64>, elapsed: f64) {
    if let Some(t) = time {
        let left = *t - elapsed.max(0.0);
        *time = if left <= TIME_EPSILON { None } else { Some(left) };
    }
}

/// One step of a flight plan
#[derive(Debug, Clone)]
pub enum Activity {
    Start(Start),
    Takeoff(Takeoff),
    Form(Form),
    Wait(Wait),
    Fly(Fly),
    Land(Land),
    End(End),
}

impl Activity {
    fn inner(&self) -> &dyn FlightActivity {
        match self {
            Activity::Start(a) => a,
            Activity::Takeoff(a) => a,
            Activity::Form(a) => a,
            Activity::Wait(a) => a,
            Activity::Fly(a) => a,
            Activity::Land(a) => a,
            Activity::End(a) => a,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FlightActivity {
        match self {
            Activity::Start(a) => a,
            Activity::Takeoff(a) => a,
            Activity::Form(a) => a,
            Activity::Wait(a) => a,
            Activity::Fly(a) => a,
            Activity::Land(a) => a,
            Activity::End(a) => a,
        }
    }

    pub fn kind(&self) -> ActivityKind {
        self.inner().kind()
    }

    pub fn time(&self) -> Option<f64> {
        self.inner().time()
    }

    pub fn make_action(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        element: usize,
        input: PendingLink,
    ) -> Result<PendingLink> {
        self.inner_mut().make_action(flight, mission, element, input)
    }

    pub fn make_state(&mut self, flight: &mut Flight, mission: &mut Mission, elapsed: f64) -> Result<()> {
        self.inner_mut().make_state(flight, mission, elapsed)
    }

    pub fn make_time(&self) -> f64 {
        self.inner().make_time()
    }

    pub fn make_virtual_points(&self, config: &GeneratorConfig) -> usize {
        self.inner().make_virtual_points(config)
    }

    /// Time-bearing activity with no time left that may leave the plan
    pub fn is_spent(&self) -> bool {
        self.inner().removable_when_spent() && self.time().is_none()
    }

    /// Land and End close a plan
    pub fn is_terminal(&self) -> bool {
        matches!(self, Activity::Land(_) | Activity::End(_))
    }
}

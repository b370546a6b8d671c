//! Ordered activity list of one flight

use glam::DVec3;

use crate::activity::{Activity, ActivityKind, End, Land, PendingLink, Start};
use crate::core::error::Result;
use crate::flight::Flight;
use crate::mission::Mission;

/// Activities in flight order
///
/// A complete plan opens with `Start` and closes with `Land` or `End`.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    activities: Vec<Activity>,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Activity> {
        self.activities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Activity> {
        self.activities.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&Activity> {
        self.activities.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Activity> {
        self.activities.get_mut(index)
    }

    pub fn kinds(&self) -> Vec<ActivityKind> {
        self.activities.iter().map(|a| a.kind()).collect()
    }

    pub fn start(&self) -> Option<&Start> {
        self.activities.iter().find_map(|a| match a {
            Activity::Start(s) => Some(s),
            _ => None,
        })
    }

    pub fn start_mut(&mut self) -> Option<&mut Start> {
        self.activities.iter_mut().find_map(|a| match a {
            Activity::Start(s) => Some(s),
            _ => None,
        })
    }

    pub fn land(&self) -> Option<&Land> {
        self.activities.iter().find_map(|a| match a {
            Activity::Land(l) => Some(l),
            _ => None,
        })
    }

    pub fn end(&self) -> Option<&End> {
        self.activities.iter().find_map(|a| match a {
            Activity::End(e) => Some(e),
            _ => None,
        })
    }

    pub fn is_terminated(&self) -> bool {
        self.activities.last().is_some_and(|a| a.is_terminal())
    }

    /// Summed time of the time-bearing activities
    pub fn total_time(&self) -> f64 {
        self.activities.iter().map(|a| a.make_time()).sum()
    }

    /// Drop spent Wait/Fly activities; returns how many were removed
    pub fn prune_spent(&mut self) -> usize {
        let before = self.activities.len();
        self.activities.retain(|a| !a.is_spent());
        before - self.activities.len()
    }

    /// Replace the terminal activity with `End` and drop what follows `after`
    pub fn end_at(&mut self, after: usize, position: DVec3) {
        self.activities.truncate(after + 1);
        self.activities.push(Activity::End(End::new(position)));
    }

    /// Recompute Fly times along the route starting at `from`
    pub fn update_times(&mut self, from: DVec3) {
        let mut position = from;
        for activity in &mut self.activities {
            if let Activity::Fly(fly) = activity {
                fly.update_time(position);
                if let Some(end) = fly.end_point() {
                    position = end;
                }
            }
        }
    }

    /// Run `make_action` for every element over `activities[from..]`
    ///
    /// Each element's chain starts at `entry` and threads the pending link
    /// through the activities in order.
    pub fn make_actions(
        &mut self,
        flight: &Flight,
        mission: &mut Mission,
        from: usize,
        entry: PendingLink,
    ) -> Result<()> {
        for element in 0..flight.elements.len() {
            let mut link = entry;
            for activity in self.activities.iter_mut().skip(from) {
                link = activity.make_action(flight, mission, element, link)?;
            }
        }
        Ok(())
    }
}

/// Emit the complete action chain of a (non-virtual) flight
pub fn make_actions(flight: &mut Flight, mission: &mut Mission) -> Result<()> {
    let mut plan = std::mem::take(&mut flight.plan);
    let result = plan.make_actions(flight, mission, 0, PendingLink::None);
    flight.plan = plan;
    result
}

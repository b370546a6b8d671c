//! State fast-forward
//!
//! Skips part of a flight's plan before actions are emitted. Pending time
//! is consumed from the time-bearing activities in plan order; each one
//! advances the flight (position, heading, fuel) in `make_state`.

use tracing::debug;

use crate::activity::TIME_EPSILON;
use crate::core::error::Result;
use crate::flight::Flight;
use crate::mission::Mission;
use crate::plan::Plan;

/// Fast-forward by a fraction (0..=1) of the plan's total time
///
/// Returns the seconds actually consumed.
pub fn fast_forward(flight: &mut Flight, mission: &mut Mission, fraction: f64) -> Result<f64> {
    let fraction = fraction.clamp(0.0, 1.0);
    let total = flight.plan.total_time();
    if fraction <= 0.0 || total <= 0.0 {
        return Ok(0.0);
    }
    // Full skip consumes exactly the total to avoid float residue
    let pending = if fraction >= 1.0 { f64::INFINITY } else { total * fraction };
    let consumed = fast_forward_time(flight, mission, pending)?;

    debug!(
        flight = flight.id,
        fraction,
        consumed,
        remaining = flight.time,
        "Fast-forwarded flight"
    );
    Ok(consumed)
}

/// Fast-forward by a number of seconds
///
/// Spent Wait/Fly activities leave the plan; Land and End always stay.
/// `flight.time` is recomputed afterwards.
pub fn fast_forward_time(flight: &mut Flight, mission: &mut Mission, seconds: f64) -> Result<f64> {
    let mut plan = std::mem::take(&mut flight.plan);
    let result = consume(&mut plan, flight, mission, seconds.max(0.0));

    plan.prune_spent();
    flight.plan = plan;
    flight.time = flight.plan.total_time();
    result
}

fn consume(plan: &mut Plan, flight: &mut Flight, mission: &mut Mission, mut pending: f64) -> Result<f64> {
    let mut consumed = 0.0;
    for activity in plan.iter_mut() {
        if pending <= TIME_EPSILON {
            break;
        }
        let Some(time) = activity.time() else {
            continue;
        };
        let step = pending.min(time);
        activity.make_state(flight, mission, step)?;
        pending -= step;
        consumed += step;
    }
    Ok(consumed)
}

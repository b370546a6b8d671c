//! Virtual flight generation
//!
//! A virtual flight is not simulated from mission begin. Its plan is
//! sampled at checkpoints: every time-bearing activity with `n` virtual
//! points is split into `n + 1` equal steps and a checkpoint with a cloned
//! plane generation is placed at the end of each of the first `n` steps.
//! Activities without points are fast-forwarded and their time is carried
//! as idle delay to the next checkpoint.
//!
//! Once the last activity with points is flown, one final checkpoint
//! reuses the real planes and continues the plan like a normal flight.

use glam::DVec3;
use tracing::{debug, info};

use super::zone::{make_virtual_flight_zone, EarlierZone, VirtualZone, ZoneRequest};
use crate::activity::PendingLink;
use crate::core::error::{Result, SortieError};
use crate::flight::{pose_flight, Flight};
use crate::graph::NodeId;
use crate::mission::Mission;
use crate::plan::make_actions;
use crate::state::fast_forward_time;

/// One sampled point of a virtual flight
#[derive(Debug, Clone)]
pub struct Checkpoint {
    pub index: usize,
    /// Seconds after the virtual gate
    pub time: f64,
    pub position: DVec3,
    pub heading: f64,
    /// Plane items materialized at this checkpoint
    pub planes: Vec<NodeId>,
    /// Real planes of the final continuation
    pub live: bool,
    pub zone: VirtualZone,
}

/// Total checkpoints a plan yields: every virtual point plus the live one
///
/// Zero when no activity has virtual points.
pub fn count_checkpoints(flight: &Flight, mission: &Mission) -> usize {
    let points: usize = flight
        .plan
        .iter()
        .map(|a| a.make_virtual_points(&mission.config))
        .sum();
    if points == 0 {
        0
    } else {
        points + 1
    }
}

/// Emit a virtual flight's checkpoints and their action chains
///
/// Falls back to normal actions when no activity has virtual points.
pub fn make_virtual_flight(flight: &mut Flight, mission: &mut Mission) -> Result<Vec<Checkpoint>> {
    let total = count_checkpoints(flight, mission);
    if total == 0 {
        debug!(flight = flight.id, "No virtual points, generating a normal flight");
        flight.virtual_flight = false;
        make_actions(flight, mission)?;
        return Ok(Vec::new());
    }

    let gate = make_gate(flight, mission)?;
    for item in flight.items() {
        let entity = mission.graph.ensure_entity(&mut mission.index, item)?;
        mission.graph.set_entity_enabled(entity, false)?;
    }

    let mut checkpoints: Vec<Checkpoint> = Vec::with_capacity(total);
    let mut clock = 0.0;

    while checkpoints.len() + 1 < total {
        let Some(activity) = flight.plan.iter().find(|a| a.time().is_some()) else {
            break;
        };
        let time = activity.time().unwrap_or(0.0);
        let points = activity.make_virtual_points(&mission.config);

        if points == 0 {
            let spent = fast_forward_time(flight, mission, time)?;
            if spent <= 0.0 {
                break;
            }
            clock += spent;
            continue;
        }

        let step = time / (points + 1) as f64;
        for _ in 0..points {
            clock += fast_forward_time(flight, mission, step)?;
            let checkpoint = make_checkpoint(flight, mission, gate, clock, false, &mut checkpoints)?;
            checkpoints.push(checkpoint);
        }
        clock += fast_forward_time(flight, mission, step)?;
    }

    let live = make_checkpoint(flight, mission, gate, clock, true, &mut checkpoints)?;
    checkpoints.push(live);

    info!(
        flight = flight.id,
        unit = %flight.unit,
        checkpoints = checkpoints.len(),
        "Virtual flight generated"
    );
    Ok(checkpoints)
}

/// Run the Start activity to get the virtual gate timer
fn make_gate(flight: &mut Flight, mission: &mut Mission) -> Result<NodeId> {
    let mut plan = std::mem::take(&mut flight.plan);
    let result = match plan.get_mut(0) {
        Some(start) => start.make_action(flight, mission, 0, PendingLink::None),
        None => Ok(PendingLink::None),
    };
    flight.plan = plan;

    let group = flight.group;
    result?
        .node()
        .ok_or(SortieError::NodeNotFound(group))
}

/// Swap every plane item of the flight for its counterpart
fn swap_items(flight: &mut Flight, items: &[NodeId]) {
    for (plane, &item) in flight
        .elements
        .iter_mut()
        .flat_map(|e| e.planes.iter_mut())
        .zip(items)
    {
        plane.item = item;
    }
}

fn make_checkpoint(
    flight: &mut Flight,
    mission: &mut Mission,
    gate: NodeId,
    clock: f64,
    live: bool,
    checkpoints: &mut [Checkpoint],
) -> Result<Checkpoint> {
    let originals = flight.items();
    let planes = if live {
        originals.clone()
    } else {
        let mut clones = Vec::with_capacity(originals.len());
        for &item in &originals {
            clones.push(mission.graph.clone_node(&mut mission.index, item, Some(flight.group))?);
        }
        clones
    };

    let request = ZoneRequest {
        group: flight.group,
        gate,
        center: flight.position,
        delay: clock,
        first: checkpoints.is_empty(),
        planes: &planes,
        live,
        coalition: flight.coalition,
    };
    let mut earlier: Vec<EarlierZone<'_>> = checkpoints
        .iter_mut()
        .map(|c| EarlierZone {
            planes: &c.planes,
            zone: &mut c.zone,
        })
        .collect();
    let zone = make_virtual_flight_zone(mission, &request, &mut earlier)?;

    swap_items(flight, &planes);
    let result = regenerate(flight, mission, zone.activate);
    swap_items(flight, &originals);
    result?;

    debug!(
        flight = flight.id,
        checkpoint = checkpoints.len(),
        time = clock,
        live,
        "Virtual checkpoint"
    );

    Ok(Checkpoint {
        index: checkpoints.len(),
        time: clock,
        position: flight.position,
        heading: flight.heading,
        planes,
        live,
        zone,
    })
}

/// Pose the current plane generation and wire the rest of the plan to it
fn regenerate(flight: &mut Flight, mission: &mut Mission, activate: NodeId) -> Result<()> {
    pose_flight(&mut mission.graph, flight, flight.position, flight.heading)?;
    let mut plan = std::mem::take(&mut flight.plan);
    let result = plan.make_actions(flight, mission, 1, PendingLink::Node(activate));
    flight.plan = plan;
    result
}

//! Activation zone of one virtual checkpoint
//!
//! Wiring per checkpoint:
//!
//! ```text
//! gate -> arm(delay) -> check(10000) -> activate, disarm
//!                    \-> arm delay(2s) -> check          (not first, or delayed)
//!                    \-> inner(9500) -> cancel arm delay, outer
//!                        outer(10500) -> arm delay, inner
//!                    \-> retire earlier zones
//! check -> delete earlier generations
//! activate -> proximity check(10s) -> player/enemy(11000) -> cancel grace, keep
//!                                  \-> grace(5s) -> delete own planes, next entry
//! keep -> delete later generations, retire later zones
//! ```
//!
//! Check zones only react to friendly planes. The proximity pair watches
//! the player and the enemy coalitions.

use glam::DVec3;

use crate::core::error::Result;
use crate::core::types::Coalition;
use crate::graph::{NodeId, NodeKind};
use crate::mission::Mission;

/// Hooks fired once a materialized generation is kept, removing every later one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHooks {
    /// Deletes the planes of later checkpoints
    pub delete: NodeId,
    /// Deactivates the arm timers and zones of later checkpoints
    pub deactivate: NodeId,
}

/// Keeps a materialized clone generation alive while anyone is near
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityWatch {
    pub check: NodeId,
    pub player: NodeId,
    pub enemy: NodeId,
    pub grace: NodeId,
    pub cancel: NodeId,
    pub delete: NodeId,
    /// Entry of the next checkpoint, enabled when this generation is dropped
    pub handover: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualZone {
    /// Bubble center and radius
    pub center: DVec3,
    pub radius: f64,
    pub arm: NodeId,
    pub arm_delay: Option<NodeId>,
    pub inner: Option<NodeId>,
    pub outer: Option<NodeId>,
    pub check: NodeId,
    pub activate: NodeId,
    pub disarm: NodeId,
    /// Delete of strictly earlier checkpoints' planes, fired on activation
    pub delete_earlier: Option<NodeId>,
    /// Deactivates earlier zones, fired on arm
    pub retire_earlier: Option<NodeId>,
    /// Created on first use, when a later checkpoint is added
    pub next: Option<NextHooks>,
    pub watch: Option<ProximityWatch>,
}

impl VirtualZone {
    /// Node that enables the primary check zone
    pub fn entry(&self) -> NodeId {
        self.arm_delay.unwrap_or(self.check)
    }
}

/// Inputs for one zone
#[derive(Debug, Clone)]
pub struct ZoneRequest<'a> {
    pub group: NodeId,
    /// Virtual gate timer of the flight
    pub gate: NodeId,
    pub center: DVec3,
    /// Seconds from the gate until this checkpoint is reached
    pub delay: f64,
    pub first: bool,
    /// Planes materialized by this zone
    pub planes: &'a [NodeId],
    /// Final real continuation (no proximity watch)
    pub live: bool,
    pub coalition: Coalition,
}

/// An earlier checkpoint as seen by a new zone
pub struct EarlierZone<'a> {
    pub planes: &'a [NodeId],
    pub zone: &'a mut VirtualZone,
}

/// Build the activation sub-graph for a checkpoint
///
/// Every earlier checkpoint gets the new planes added to its delete-next
/// hook. The new zone retires earlier zones when it arms and deletes the
/// earlier generations when it activates. The previous checkpoint hands
/// over to this one when its generation is dropped.
pub fn make_virtual_flight_zone(
    mission: &mut Mission,
    request: &ZoneRequest<'_>,
    earlier: &mut [EarlierZone<'_>],
) -> Result<VirtualZone> {
    let config = mission.config.clone();
    let friendly = vec![request.coalition];
    let (group, center) = (request.group, request.center);

    let arm = mission.create_at(NodeKind::timer(request.delay), group, center)?;
    mission.graph.add_target(request.gate, arm)?;

    let check = mission.create_at(
        NodeKind::CheckZone {
            radius: config.zone_radius,
            closer: true,
            plane_coalitions: friendly.clone(),
        },
        group,
        center,
    )?;
    let activate = mission.create_at(NodeKind::Activate, group, center)?;
    for &plane in request.planes {
        mission.add_object(activate, plane)?;
    }
    let disarm = mission.create_at(NodeKind::Deactivate, group, center)?;
    mission.graph.add_target(check, activate)?;
    mission.graph.add_target(check, disarm)?;
    mission.graph.add_target(disarm, check)?;

    let mut zone = VirtualZone {
        center,
        radius: config.zone_radius,
        arm,
        arm_delay: None,
        inner: None,
        outer: None,
        check,
        activate,
        disarm,
        delete_earlier: None,
        retire_earlier: None,
        next: None,
        watch: None,
    };

    if request.first && request.delay <= 0.0 {
        mission.graph.add_target(arm, check)?;
    } else {
        let arm_delay = mission.create_at(NodeKind::timer(config.zone_arm_delay), group, center)?;
        let inner = mission.create_at(
            NodeKind::CheckZone {
                radius: config.zone_inner_radius,
                closer: true,
                plane_coalitions: friendly.clone(),
            },
            group,
            center,
        )?;
        let outer = mission.create_at(
            NodeKind::CheckZone {
                radius: config.zone_outer_radius,
                closer: false,
                plane_coalitions: friendly.clone(),
            },
            group,
            center,
        )?;
        let cancel = mission.create_at(NodeKind::Deactivate, group, center)?;

        mission.graph.add_target(arm, arm_delay)?;
        mission.graph.add_target(arm, inner)?;
        mission.graph.add_target(arm_delay, check)?;
        // Someone already inside: hold the arm delay until they leave
        mission.graph.add_target(inner, cancel)?;
        mission.graph.add_target(cancel, arm_delay)?;
        mission.graph.add_target(inner, outer)?;
        mission.graph.add_target(outer, arm_delay)?;
        mission.graph.add_target(outer, inner)?;

        for node in [arm_delay, inner, outer] {
            mission.graph.add_target(disarm, node)?;
        }

        zone.arm_delay = Some(arm_delay);
        zone.inner = Some(inner);
        zone.outer = Some(outer);
    }

    if !earlier.is_empty() {
        let delete = mission.create_at(NodeKind::Delete, group, center)?;
        let retire = mission.create_at(NodeKind::Deactivate, group, center)?;
        for previous in earlier.iter() {
            for &plane in previous.planes {
                mission.add_object(delete, plane)?;
            }
            mission.graph.add_target(retire, previous.zone.check)?;
            mission.graph.add_target(retire, previous.zone.entry())?;
        }
        mission.graph.add_target(check, delete)?;
        mission.graph.add_target(arm, retire)?;
        zone.delete_earlier = Some(delete);
        zone.retire_earlier = Some(retire);

        for previous in earlier.iter_mut() {
            let hooks = next_hooks(mission, &mut *previous.zone, group)?;
            for &plane in request.planes {
                mission.add_object(hooks.delete, plane)?;
            }
            for node in [arm, check, zone.entry()] {
                mission.graph.add_target(hooks.deactivate, node)?;
            }
        }

        if let Some(watch) = earlier.last_mut().and_then(|p| p.zone.watch.as_mut()) {
            mission.graph.add_target(watch.grace, zone.entry())?;
            watch.handover = Some(zone.entry());
        }
    }

    if !request.live {
        zone.watch = Some(make_proximity_watch(mission, request, activate)?);
    }

    Ok(zone)
}

/// Get or create the delete-next hooks of a zone
///
/// The hooks fire from the proximity pair, so later generations survive
/// until the materialized one is known to be kept. A zone without a watch
/// fires them on activation.
fn next_hooks(mission: &mut Mission, zone: &mut VirtualZone, group: NodeId) -> Result<NextHooks> {
    if let Some(hooks) = zone.next {
        return Ok(hooks);
    }
    let delete = mission.create_at(NodeKind::Delete, group, zone.center)?;
    let deactivate = mission.create_at(NodeKind::Deactivate, group, zone.center)?;
    let sources = match zone.watch {
        Some(watch) => vec![watch.player, watch.enemy],
        None => vec![zone.check],
    };
    for source in sources {
        mission.graph.add_target(source, delete)?;
        mission.graph.add_target(source, deactivate)?;
    }
    let hooks = NextHooks { delete, deactivate };
    zone.next = Some(hooks);
    Ok(hooks)
}

fn make_proximity_watch(
    mission: &mut Mission,
    request: &ZoneRequest<'_>,
    activate: NodeId,
) -> Result<ProximityWatch> {
    let config = mission.config.clone();
    let (group, center) = (request.group, request.center);

    let check = mission.create_at(NodeKind::timer(config.proximity_check), group, center)?;
    let grace = mission.create_at(NodeKind::timer(config.proximity_grace), group, center)?;
    let player = mission.create_at(
        NodeKind::Proximity {
            distance: config.proximity_distance,
            closer: true,
            player: true,
            plane_coalitions: Vec::new(),
        },
        group,
        center,
    )?;
    let enemy = mission.create_at(
        NodeKind::Proximity {
            distance: config.proximity_distance,
            closer: true,
            player: false,
            plane_coalitions: request.coalition.enemies(),
        },
        group,
        center,
    )?;
    let cancel = mission.create_at(NodeKind::Deactivate, group, center)?;
    let delete = mission.create_at(NodeKind::Delete, group, center)?;

    if let Some(&leader) = request.planes.first() {
        mission.add_object(player, leader)?;
        mission.add_object(enemy, leader)?;
    }
    for &plane in request.planes {
        mission.add_object(delete, plane)?;
    }

    mission.graph.add_target(activate, check)?;
    for node in [player, enemy, grace] {
        mission.graph.add_target(check, node)?;
    }
    for proximity in [player, enemy] {
        mission.graph.add_target(proximity, cancel)?;
        mission.graph.add_target(proximity, check)?;
    }
    mission.graph.add_target(cancel, grace)?;
    mission.graph.add_target(grace, delete)?;

    Ok(ProximityWatch {
        check,
        player,
        enemy,
        grace,
        cancel,
        delete,
        handover: None,
    })
}

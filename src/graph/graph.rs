//! Trigger-graph arena and wiring primitives

use ahash::AHashMap;
use glam::{DVec2, DVec3};

use super::events::{EventLink, EventType, ReportLink, ReportType};
use super::index::{IndexAllocator, NodeId};
use super::node::{Node, NodeKind};
use crate::core::error::{Result, SortieError};
use crate::core::types::heading;

/// Arena of trigger-graph nodes addressed by `NodeId`
#[derive(Debug, Clone, Default)]
pub struct TriggerGraph {
    nodes: Vec<Node>,
    slots: AHashMap<NodeId, usize>,
}

impl TriggerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node with a fresh index under `parent`
    pub fn create(
        &mut self,
        index: &mut IndexAllocator,
        kind: NodeKind,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = index.next();
        self.slots.insert(id, self.nodes.len());
        self.nodes.push(Node::new(id, kind, parent));

        if let Some(parent) = parent {
            if let Some(&slot) = self.slots.get(&parent) {
                self.nodes[slot].children.push(id);
            }
        }

        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(SortieError::NodeNotFound(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        match self.slots.get(&id) {
            Some(&slot) => Ok(&mut self.nodes[slot]),
            None => Err(SortieError::NodeNotFound(id)),
        }
    }

    /// Live (not removed) node lookup used by the wiring primitives
    fn live(&self, id: NodeId) -> Result<&Node> {
        match self.node(id) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(SortieError::NodeNotInMission(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn set_position(&mut self, id: NodeId, position: DVec3) -> Result<()> {
        self.get_mut(id)?.position = position;
        Ok(())
    }

    pub fn set_orientation(&mut self, id: NodeId, yaw: f64) -> Result<()> {
        self.get_mut(id)?.orientation = yaw.rem_euclid(360.0);
        Ok(())
    }

    /// Orient a node to face a point
    pub fn set_orientation_to(&mut self, id: NodeId, point: DVec3) -> Result<()> {
        let from = self.get(id)?.position;
        self.set_orientation(id, heading(from, point))
    }

    /// Place a node next to another one (map-plane offset, same altitude)
    pub fn set_position_near(&mut self, id: NodeId, other: NodeId, offset: DVec2) -> Result<()> {
        let base = self.get(other)?.position;
        self.set_position(id, base + DVec3::new(offset.x, 0.0, offset.y))
    }

    /// Chain `to` as a target of `from` (idempotent)
    pub fn add_target(&mut self, from: NodeId, to: NodeId) -> Result<()> {
        self.live(to)?;
        self.live(from)?;
        let node = self.get_mut(from)?;
        if !node.targets.contains(&to) {
            node.targets.push(to);
        }
        Ok(())
    }

    /// Entity backing a node, if any (an entity resolves to itself)
    pub fn entity_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        match node.kind {
            NodeKind::Entity { .. } => Some(id),
            _ => node.entity,
        }
    }

    /// Get or create the entity linked to `id`
    pub fn ensure_entity(&mut self, index: &mut IndexAllocator, id: NodeId) -> Result<NodeId> {
        let node = self.live(id)?;
        if let NodeKind::Entity { .. } = node.kind {
            return Ok(id);
        }
        if let Some(entity) = node.entity {
            return Ok(entity);
        }
        if !node.kind.has_entity() {
            return Err(SortieError::NotAnEntity(id));
        }

        let (parent, position, orientation) = (node.parent, node.position, node.orientation);
        let entity = self.create(index, NodeKind::Entity { enabled: true }, parent);
        {
            let e = self.get_mut(entity)?;
            e.position = position;
            e.orientation = orientation;
            e.link = Some(id);
        }
        self.get_mut(id)?.entity = Some(entity);
        Ok(entity)
    }

    /// Make `to` (resolved to its entity) an object acted upon by `from`
    pub fn add_object(&mut self, index: &mut IndexAllocator, from: NodeId, to: NodeId) -> Result<()> {
        self.live(from)?;
        let entity = self.ensure_entity(index, to)?;
        let node = self.get_mut(from)?;
        if !node.objects.contains(&entity) {
            node.objects.push(entity);
        }
        Ok(())
    }

    /// Owner node kind of an entity (the entity itself when unlinked)
    fn owner_kind(&self, entity: NodeId) -> Result<&NodeKind> {
        let node = self.get(entity)?;
        match node.link {
            Some(owner) => Ok(&self.get(owner)?.kind),
            None => Ok(&node.kind),
        }
    }

    /// Fire `target` when the entity behind `from` raises `event`
    pub fn add_event(
        &mut self,
        index: &mut IndexAllocator,
        from: NodeId,
        event: EventType,
        target: NodeId,
    ) -> Result<()> {
        self.live(target)?;
        let entity = self.ensure_entity(index, from)?;
        let kind = self.owner_kind(entity)?;
        if !kind.accepts_event(event) {
            return Err(SortieError::InvalidEvent {
                kind: kind.name(),
                event,
            });
        }

        let link = EventLink { event, target };
        let events = self.get_mut(entity)?.events_mut();
        if !events.contains(&link) {
            events.push(link);
        }
        Ok(())
    }

    /// Fire `target` when the entity behind `from` completes `command`
    pub fn add_report(
        &mut self,
        index: &mut IndexAllocator,
        from: NodeId,
        report: ReportType,
        command: NodeId,
        target: NodeId,
    ) -> Result<()> {
        self.live(target)?;
        let command_kind = &self.live(command)?.kind;
        if !command_kind.accepts_report(report) {
            return Err(SortieError::InvalidReport {
                kind: command_kind.name(),
                report,
            });
        }

        let entity = self.ensure_entity(index, from)?;
        let link = ReportLink {
            report,
            command,
            target,
        };
        let reports = self.get_mut(entity)?.reports_mut();
        if !reports.contains(&link) {
            reports.push(link);
        }
        Ok(())
    }

    /// Copy a node's properties under a fresh index
    ///
    /// Edges are not copied. A source backed by an entity gets a new,
    /// disabled entity.
    pub fn clone_node(
        &mut self,
        index: &mut IndexAllocator,
        id: NodeId,
        parent: Option<NodeId>,
    ) -> Result<NodeId> {
        let source = self.live(id)?;
        let (kind, name, position, orientation, had_entity) = (
            source.kind.clone(),
            source.name.clone(),
            source.position,
            source.orientation,
            source.entity.is_some(),
        );

        let clone = self.create(index, kind, parent);
        {
            let node = self.get_mut(clone)?;
            node.name = name;
            node.position = position;
            node.orientation = orientation;
        }

        if had_entity {
            let entity = self.ensure_entity(index, clone)?;
            self.set_entity_enabled(entity, false)?;
        }

        Ok(clone)
    }

    pub fn set_entity_enabled(&mut self, id: NodeId, enabled: bool) -> Result<()> {
        let entity = self.entity_of(id).ok_or(SortieError::NotAnEntity(id))?;
        if let NodeKind::Entity { enabled: e } = &mut self.get_mut(entity)?.kind {
            *e = enabled;
        }
        Ok(())
    }

    /// Remove a node and its subtree; edges pointing at it stay weak
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let parent = self.live(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.get_mut(current)?;
            node.removed = true;
            stack.extend(node.children.iter().copied());
            if let Some(entity) = node.entity {
                stack.push(entity);
            }
        }
        Ok(())
    }

    /// Live nodes of a subtree in depth-first order (entity walker)
    pub fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            if node.removed {
                continue;
            }
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Live nodes of a subtree with the given kind name
    pub fn count_kind(&self, root: NodeId, kind: &str) -> usize {
        self.walk(root)
            .into_iter()
            .filter_map(|id| self.node(id))
            .filter(|n| n.kind.name() == kind)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Coalition;
    use crate::graph::node::{PlaneItem, PlaneStart};

    fn plane_kind() -> NodeKind {
        NodeKind::Plane(PlaneItem {
            plane: "bf109f4".into(),
            coalition: Coalition::Axis,
            fuel: 1.0,
            start: PlaneStart::Air,
            callsign: "Rabe".into(),
            number: 1,
            player: false,
        })
    }

    #[test]
    fn test_add_target_is_idempotent() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let a = graph.create(&mut index, NodeKind::timer(1.0), None);
        let b = graph.create(&mut index, NodeKind::timer(2.0), None);

        graph.add_target(a, b).unwrap();
        graph.add_target(a, b).unwrap();
        assert_eq!(graph.get(a).unwrap().targets, vec![b]);
    }

    #[test]
    fn test_self_cycle_is_legal() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let timer = graph.create(&mut index, NodeKind::timer(10.0), None);
        graph.add_target(timer, timer).unwrap();
        assert_eq!(graph.get(timer).unwrap().targets, vec![timer]);
    }

    #[test]
    fn test_add_object_creates_entity_once() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let group = graph.create(&mut index, NodeKind::Group { name: "flight".into() }, None);
        let plane = graph.create(&mut index, plane_kind(), Some(group));
        let cmd = graph.create(&mut index, NodeKind::TakeOff, Some(group));

        graph.add_object(&mut index, cmd, plane).unwrap();
        graph.add_object(&mut index, cmd, plane).unwrap();

        let entity = graph.entity_of(plane).unwrap();
        assert_eq!(graph.get(cmd).unwrap().objects, vec![entity]);
        assert_eq!(graph.get(entity).unwrap().link, Some(plane));
        assert_eq!(graph.count_kind(group, "Entity"), 1);
    }

    #[test]
    fn test_add_object_rejects_plain_trigger() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let cmd = graph.create(&mut index, NodeKind::Delete, None);
        let timer = graph.create(&mut index, NodeKind::timer(1.0), None);
        assert!(matches!(
            graph.add_object(&mut index, cmd, timer),
            Err(SortieError::NotAnEntity(_))
        ));
    }

    #[test]
    fn test_report_whitelist() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let plane = graph.create(&mut index, plane_kind(), None);
        let takeoff = graph.create(&mut index, NodeKind::TakeOff, None);
        let timer = graph.create(&mut index, NodeKind::timer(15.0), None);

        graph
            .add_report(&mut index, plane, ReportType::OnTookOff, takeoff, timer)
            .unwrap();
        let result = graph.add_report(&mut index, plane, ReportType::OnLanded, takeoff, timer);
        assert!(matches!(result, Err(SortieError::InvalidReport { .. })));

        let entity = graph.entity_of(plane).unwrap();
        assert_eq!(graph.get(entity).unwrap().reports.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_event_whitelist() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let plane = graph.create(&mut index, plane_kind(), None);
        let timer = graph.create(&mut index, NodeKind::timer(15.0), None);

        graph
            .add_event(&mut index, plane, EventType::OnPlaneTookOff, timer)
            .unwrap();
        assert!(matches!(
            graph.add_event(&mut index, timer, EventType::OnPlaneTookOff, plane),
            Err(SortieError::NotAnEntity(_))
        ));
    }

    #[test]
    fn test_clone_gets_fresh_index_and_disabled_entity() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let plane = graph.create(&mut index, plane_kind(), None);
        graph.set_position(plane, DVec3::new(1000.0, 2000.0, 3000.0)).unwrap();
        graph.ensure_entity(&mut index, plane).unwrap();

        let clone = graph.clone_node(&mut index, plane, None).unwrap();
        assert_ne!(clone, plane);
        assert_eq!(graph.get(clone).unwrap().kind, graph.get(plane).unwrap().kind);
        assert_eq!(graph.get(clone).unwrap().position, DVec3::new(1000.0, 2000.0, 3000.0));

        let entity = graph.entity_of(clone).unwrap();
        assert_eq!(
            graph.get(entity).unwrap().kind,
            NodeKind::Entity { enabled: false }
        );
    }

    #[test]
    fn test_removed_nodes_are_skipped_and_unlinkable() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let group = graph.create(&mut index, NodeKind::Group { name: "g".into() }, None);
        let a = graph.create(&mut index, NodeKind::timer(1.0), Some(group));
        let b = graph.create(&mut index, NodeKind::timer(1.0), Some(group));

        graph.remove(b).unwrap();
        assert_eq!(graph.walk(group), vec![group, a]);
        assert!(matches!(
            graph.add_target(a, b),
            Err(SortieError::NodeNotInMission(_))
        ));
    }

    #[test]
    fn test_orientation_to_point() {
        let mut index = IndexAllocator::new();
        let mut graph = TriggerGraph::new();
        let a = graph.create(&mut index, NodeKind::TakeOff, None);
        graph.set_orientation_to(a, DVec3::new(0.0, 0.0, 500.0)).unwrap();
        assert!((graph.get(a).unwrap().orientation - 90.0).abs() < 1e-9);
    }
}

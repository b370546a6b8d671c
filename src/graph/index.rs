//! Node index allocation scoped to one mission build

use serde::{Deserialize, Serialize};

/// Integer handle of a trigger-graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Monotonic index counter owned by the mission build
///
/// Indices start at 1 and are never reused, even after a node is removed.
#[derive(Debug, Clone, Default)]
pub struct IndexAllocator {
    last: u32,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> NodeId {
        self.last += 1;
        NodeId(self.last)
    }

    /// Last index handed out (0 when nothing was allocated)
    pub fn last(&self) -> u32 {
        self.last
    }
}

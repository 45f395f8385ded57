//! Per-tick value types: the agent, collectible targets and hostiles

use serde::{Deserialize, Serialize};

use crate::spatial::Point;

/// Identifier of a target or hostile, unique within its own kind
pub type EntityId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub pos: Point,
}

/// Collectible the hostiles are trying to reach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub id: EntityId,
    pub pos: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hostile {
    pub id: EntityId,
    pub health: i32,
    pub pos: Point,
}

/// Complete observable state of one tick
///
/// Sequence order carries no simulation meaning but is preserved so that
/// diagnostics and comparisons are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub agent: Agent,
    pub targets: Vec<Target>,
    pub hostiles: Vec<Hostile>,
}

impl World {
    pub fn new(agent: Point, targets: Vec<Target>, hostiles: Vec<Hostile>) -> Self {
        Self {
            agent: Agent { pos: agent },
            targets,
            hostiles,
        }
    }

    /// No targets or no hostiles left: nothing further can change the outcome
    pub fn is_terminal(&self) -> bool {
        self.targets.is_empty() || self.hostiles.is_empty()
    }

    pub fn total_health(&self) -> i64 {
        self.hostiles.iter().map(|h| h.health as i64).sum()
    }

    pub fn hostile(&self, id: EntityId) -> Option<&Hostile> {
        self.hostiles.iter().find(|h| h.id == id)
    }

    pub fn target(&self, id: EntityId) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Largest hostile id, 0 when there are none
    pub fn max_hostile_id(&self) -> EntityId {
        self.hostiles.iter().map(|h| h.id).max().unwrap_or(0)
    }

    /// Largest target id, 0 when there are none
    pub fn max_target_id(&self) -> EntityId {
        self.targets.iter().map(|t| t.id).max().unwrap_or(0)
    }
}

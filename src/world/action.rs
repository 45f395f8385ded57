//! The single command emitted each tick

use std::fmt;

use crate::spatial::Point;
use crate::world::model::EntityId;

/// Move toward a point or attack a hostile
///
/// Every action carries a short label naming the heuristic that proposed
/// it; labels are diagnostics only and never affect simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move { to: Point, label: &'static str },
    Attack { hostile: EntityId, label: &'static str },
}

impl Action {
    pub fn move_to(to: Point, label: &'static str) -> Self {
        Action::Move { to, label }
    }

    pub fn attack(hostile: EntityId, label: &'static str) -> Self {
        Action::Attack { hostile, label }
    }

    /// Stay where the agent is
    pub fn hold(at: Point) -> Self {
        Action::Move {
            to: at,
            label: "hold position",
        }
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Action::Move { .. })
    }

    pub fn is_attack(&self) -> bool {
        matches!(self, Action::Attack { .. })
    }

    /// Destination of a Move
    ///
    /// # Panics
    /// On an Attack action; callers must check the variant first.
    pub fn move_point(&self) -> Point {
        match self {
            Action::Move { to, .. } => *to,
            Action::Attack { .. } => panic!("accessing destination of an attack action"),
        }
    }

    /// Hostile targeted by an Attack
    ///
    /// # Panics
    /// On a Move action; callers must check the variant first.
    pub fn attack_id(&self) -> EntityId {
        match self {
            Action::Attack { hostile, .. } => *hostile,
            Action::Move { .. } => panic!("accessing hostile id of a move action"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Move { label, .. } | Action::Attack { label, .. } => label,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move { to, label } => write!(f, "move to {} [{}]", to, label),
            Action::Attack { hostile, label } => write!(f, "attack hostile {} [{}]", hostile, label),
        }
    }
}

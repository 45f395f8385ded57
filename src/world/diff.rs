//! Field-by-field comparison of a predicted world against the observed one
//!
//! Used only to explain why the optimizer discarded its tree.

use std::fmt;

use crate::world::model::World;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discrepancy {
    AgentPosition {
        predicted: String,
        actual: String,
    },
    HostileCount {
        predicted: usize,
        actual: usize,
    },
    Hostile {
        slot: usize,
        predicted: String,
        actual: String,
    },
    TargetCount {
        predicted: usize,
        actual: usize,
    },
    Target {
        slot: usize,
        predicted: String,
        actual: String,
    },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::AgentPosition { predicted, actual } => {
                write!(f, "agent position: pred={} actual={}", predicted, actual)
            }
            Discrepancy::HostileCount { predicted, actual } => {
                write!(f, "hostile count: pred={} actual={}", predicted, actual)
            }
            Discrepancy::Hostile { slot, predicted, actual } => {
                write!(f, "hostile #{}: pred={} actual={}", slot, predicted, actual)
            }
            Discrepancy::TargetCount { predicted, actual } => {
                write!(f, "target count: pred={} actual={}", predicted, actual)
            }
            Discrepancy::Target { slot, predicted, actual } => {
                write!(f, "target #{}: pred={} actual={}", slot, predicted, actual)
            }
        }
    }
}

/// List every difference between `predicted` and `actual`
///
/// Element-wise comparison only happens when the counts agree.
pub fn compare_worlds(predicted: &World, actual: &World) -> Vec<Discrepancy> {
    let mut out = Vec::new();

    if predicted.agent != actual.agent {
        out.push(Discrepancy::AgentPosition {
            predicted: predicted.agent.pos.to_string(),
            actual: actual.agent.pos.to_string(),
        });
    }

    if predicted.hostiles.len() != actual.hostiles.len() {
        out.push(Discrepancy::HostileCount {
            predicted: predicted.hostiles.len(),
            actual: actual.hostiles.len(),
        });
    } else {
        for (slot, (p, a)) in predicted.hostiles.iter().zip(&actual.hostiles).enumerate() {
            if p != a {
                out.push(Discrepancy::Hostile {
                    slot,
                    predicted: format!("{{id={},health={},pos={}}}", p.id, p.health, p.pos),
                    actual: format!("{{id={},health={},pos={}}}", a.id, a.health, a.pos),
                });
            }
        }
    }

    if predicted.targets.len() != actual.targets.len() {
        out.push(Discrepancy::TargetCount {
            predicted: predicted.targets.len(),
            actual: actual.targets.len(),
        });
    } else {
        for (slot, (p, a)) in predicted.targets.iter().zip(&actual.targets).enumerate() {
            if p != a {
                out.push(Discrepancy::Target {
                    slot,
                    predicted: format!("{{id={},pos={}}}", p.id, p.pos),
                    actual: format!("{{id={},pos={}}}", a.id, a.pos),
                });
            }
        }
    }

    out
}

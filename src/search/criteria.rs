//! Outcome ranking for simulated futures

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::simulation::WorldSimulator;

/// Counters accumulated along a search path, starting from the tree root
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub shots_fired: u32,
    pub total_damage: i64,
}

/// Four-key ranking tuple; a greater value is a better outcome
///
/// Keys, most significant first:
/// - more surviving targets
/// - fewer surviving hostiles
/// - fewer shots fired
/// - more damage dealt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Criteria {
    pub shots_fired: u32,
    pub targets_alive: usize,
    pub hostiles_alive: usize,
    pub total_damage: i64,
}

impl Criteria {
    pub fn of(sim: &WorldSimulator, tally: &Tally) -> Self {
        let world = sim.world();
        Self {
            shots_fired: tally.shots_fired,
            targets_alive: world.targets.len(),
            hostiles_alive: world.hostiles.len(),
            total_damage: tally.total_damage,
        }
    }

    /// Branch-and-bound test against the best terminal outcome
    ///
    /// Targets can only be lost, never regained, so a node already holding
    /// fewer targets than a finished line can never beat it.
    pub fn cannot_reach(&self, best_terminal: &Criteria) -> bool {
        self.targets_alive < best_terminal.targets_alive
    }
}

impl Ord for Criteria {
    fn cmp(&self, other: &Self) -> Ordering {
        self.targets_alive
            .cmp(&other.targets_alive)
            .then_with(|| other.hostiles_alive.cmp(&self.hostiles_alive))
            .then_with(|| other.shots_fired.cmp(&self.shots_fired))
            .then_with(|| self.total_damage.cmp(&other.total_damage))
    }
}

impl PartialOrd for Criteria {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{shots={},targets={},hostiles={},damage={}}}",
            self.shots_fired, self.targets_alive, self.hostiles_alive, self.total_damage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(shots: u32, targets: usize, hostiles: usize, damage: i64) -> Criteria {
        Criteria {
            shots_fired: shots,
            targets_alive: targets,
            hostiles_alive: hostiles,
            total_damage: damage,
        }
    }

    #[test]
    fn test_targets_dominate() {
        assert!(c(99, 3, 9, 0) > c(0, 2, 0, 1000));
    }

    #[test]
    fn test_fewer_hostiles_is_better() {
        assert!(c(5, 3, 1, 0) > c(0, 3, 2, 500));
    }

    #[test]
    fn test_fewer_shots_is_better() {
        assert!(c(2, 3, 1, 0) > c(3, 3, 1, 500));
    }

    #[test]
    fn test_more_damage_breaks_final_tie() {
        assert!(c(2, 3, 1, 40) > c(2, 3, 1, 39));
        assert_eq!(c(2, 3, 1, 40).cmp(&c(2, 3, 1, 40)), Ordering::Equal);
    }

    #[test]
    fn test_pruning_uses_targets_only() {
        let best = c(10, 2, 0, 300);
        assert!(c(0, 1, 0, 999).cannot_reach(&best));
        assert!(!c(50, 2, 5, 0).cannot_reach(&best));
    }

    #[test]
    fn test_display() {
        assert_eq!(c(1, 2, 3, 4).to_string(), "{shots=1,targets=2,hostiles=3,damage=4}");
    }
}

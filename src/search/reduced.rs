//! Lossy fingerprints used to collapse equivalent search states
//!
//! Two futures are treated as the same state when the agent sits in the same
//! position bucket, the same shots and damage have been spent, and exactly the
//! same targets and hostiles are still alive. Hostile positions and health are
//! not part of the key.

use crate::search::criteria::Tally;
use crate::simulation::WorldSimulator;
use crate::spatial::Point;
use crate::world::EntityId;

/// Fixed-size presence set over ids `0..=max_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PresenceBits {
    words: Vec<u64>,
}

impl PresenceBits {
    pub fn with_max_id(max_id: EntityId) -> Self {
        let bits = max_id as usize + 1;
        Self {
            words: vec![0; bits.div_ceil(64)],
        }
    }

    pub fn from_ids<I>(max_id: EntityId, ids: I) -> Self
    where
        I: IntoIterator<Item = EntityId>,
    {
        let mut bits = Self::with_max_id(max_id);
        for id in ids {
            bits.insert(id);
        }
        bits
    }

    /// # Panics
    /// If `id` exceeds the capacity chosen at construction.
    pub fn insert(&mut self, id: EntityId) {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        assert!(word < self.words.len(), "id {} outside presence set", id);
        self.words[word] |= 1u64 << bit;
    }

    pub fn contains(&self, id: EntityId) -> bool {
        let (word, bit) = (id as usize / 64, id as usize % 64);
        self.words.get(word).is_some_and(|w| w & (1u64 << bit) != 0)
    }

    pub fn count(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReducedStateKey {
    agent_cell: Point,
    shots_fired: u32,
    total_damage: i64,
    hostiles: PresenceBits,
    targets: PresenceBits,
}

impl ReducedStateKey {
    /// Fingerprint `sim` with the agent quantized to `bucket`-sized cells
    pub fn new(sim: &WorldSimulator, tally: &Tally, bucket: i32) -> Self {
        let world = sim.world();
        let pos = world.agent.pos;
        Self {
            agent_cell: Point::new(pos.x / bucket, pos.y / bucket),
            shots_fired: tally.shots_fired,
            total_damage: tally.total_damage,
            hostiles: PresenceBits::from_ids(
                sim.max_hostile_id(),
                world.hostiles.iter().map(|h| h.id),
            ),
            targets: PresenceBits::from_ids(
                sim.max_target_id(),
                world.targets.iter().map(|t| t.id),
            ),
        }
    }

    pub fn agent_cell(&self) -> Point {
        self.agent_cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Hostile, Target, World};

    fn sim(agent: Point, health: i32) -> WorldSimulator {
        WorldSimulator::new(World::new(
            agent,
            vec![
                Target { id: 0, pos: Point::new(100, 100) },
                Target { id: 70, pos: Point::new(200, 100) },
            ],
            vec![Hostile { id: 3, health, pos: Point::new(9000, 9000) }],
        ))
    }

    #[test]
    fn test_presence_bits() {
        let bits = PresenceBits::from_ids(130, [0, 64, 130]);
        assert!(bits.contains(0));
        assert!(bits.contains(64));
        assert!(bits.contains(130));
        assert!(!bits.contains(1));
        assert!(!bits.contains(500));
        assert_eq!(bits.count(), 3);
    }

    #[test]
    fn test_nearby_positions_share_a_key() {
        let tally = Tally::default();
        let a = ReducedStateKey::new(&sim(Point::new(1010, 2020), 10), &tally, 500);
        let b = ReducedStateKey::new(&sim(Point::new(1490, 2499), 10), &tally, 500);
        assert_eq!(a, b);
        assert_eq!(a.agent_cell(), Point::new(2, 4));
    }

    #[test]
    fn test_health_is_ignored() {
        let tally = Tally::default();
        let a = ReducedStateKey::new(&sim(Point::new(0, 0), 10), &tally, 500);
        let b = ReducedStateKey::new(&sim(Point::new(0, 0), 3), &tally, 500);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tally_and_cell_distinguish_keys() {
        let s = sim(Point::new(0, 0), 10);
        let a = ReducedStateKey::new(&s, &Tally::default(), 500);
        let shot = Tally { shots_fired: 1, total_damage: 0 };
        assert_ne!(a, ReducedStateKey::new(&s, &shot, 500));
        let moved = sim(Point::new(500, 0), 10);
        assert_ne!(a, ReducedStateKey::new(&moved, &Tally::default(), 500));
    }
}

//! One-tick world simulator
//!
//! Applies a single action to a world in the fixed order the game resolves
//! a turn:
//! 1. hostiles advance toward their assigned nearest target
//! 2. the agent moves (Move actions only) and is clamped into the zone
//! 3. death check: any hostile within death distance ends the tick
//! 4. the attack resolves (Attack actions only)
//! 5. targets reached by a surviving hostile are removed
//!
//! The simulator keeps id -> slot indices and a per-hostile nearest-target
//! cache alive between ticks so that repeated stepping (as done by the search
//! tree) avoids rescanning every target for every hostile.

use crate::core::config::Rules;
use crate::simulation::index::IdIndex;
use crate::spatial::Point;
use crate::world::{Action, EntityId, Hostile, Target, World};

#[derive(Debug, Clone)]
pub struct WorldSimulator {
    world: World,
    hostile_slots: IdIndex,
    target_slots: IdIndex,
    /// Nearest-target assignment per hostile id; `None` for dead hostiles
    /// or when no targets remain
    assigned: Vec<Option<EntityId>>,
    total_health: i64,
}

impl WorldSimulator {
    pub fn new(world: World) -> Self {
        let mut hostile_slots = IdIndex::with_max_id(world.max_hostile_id());
        let mut target_slots = IdIndex::with_max_id(world.max_target_id());
        hostile_slots.rebuild(world.hostiles.iter().map(|h| h.id));
        target_slots.rebuild(world.targets.iter().map(|t| t.id));

        let mut assigned = vec![None; hostile_slots.max_id() as usize + 1];
        for h in &world.hostiles {
            assigned[h.id as usize] = nearest_target(h.pos, &world.targets);
        }
        let total_health = world.total_health();

        Self {
            world,
            hostile_slots,
            target_slots,
            assigned,
            total_health,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// Sum of the health of every live hostile
    pub fn total_health(&self) -> i64 {
        self.total_health
    }

    pub fn max_hostile_id(&self) -> EntityId {
        self.hostile_slots.max_id()
    }

    pub fn max_target_id(&self) -> EntityId {
        self.target_slots.max_id()
    }

    /// Slot of a live hostile in `world().hostiles`
    pub fn hostile_slot(&self, id: EntityId) -> Option<usize> {
        self.hostile_slots.get(id)
    }

    /// Slot of a live target in `world().targets`
    pub fn target_slot(&self, id: EntityId) -> Option<usize> {
        self.target_slots.get(id)
    }

    pub fn hostile(&self, id: EntityId) -> Option<&Hostile> {
        self.hostile_slot(id).map(|slot| &self.world.hostiles[slot])
    }

    pub fn target(&self, id: EntityId) -> Option<&Target> {
        self.target_slot(id).map(|slot| &self.world.targets[slot])
    }

    /// Target the hostile is currently heading for
    pub fn assigned_target(&self, hostile_id: EntityId) -> Option<&Target> {
        let target_id = (*self.assigned.get(hostile_id as usize)?)?;
        self.target(target_id)
    }

    /// Advance the world by one tick
    ///
    /// Returns `false` when the agent ends the tick within death distance of a
    /// hostile. The world is then left partially updated and must not be
    /// stepped again.
    ///
    /// # Panics
    /// When attacking an id that is not a live hostile.
    pub fn step(&mut self, action: &Action, rules: &Rules) -> bool {
        let arrivals = self.advance_hostiles(rules);

        if let Action::Move { to, .. } = action {
            let agent = &mut self.world.agent;
            agent.pos = agent
                .pos
                .step_toward(to, rules.agent_step as f64)
                .clamp_to(rules.zone());
        }

        let agent_pos = self.world.agent.pos;
        let death_distance = rules.death_distance as f64;
        if self
            .world
            .hostiles
            .iter()
            .any(|h| agent_pos.distance(&h.pos) <= death_distance)
        {
            return false;
        }

        let killed = match action {
            Action::Attack { hostile, .. } => self.resolve_attack(*hostile, rules),
            Action::Move { .. } => None,
        };

        self.remove_reached_targets(&arrivals, killed);
        true
    }

    /// Move every hostile toward its assigned target
    ///
    /// Returns `(target id, hostile id)` for each hostile that reached its
    /// target this tick.
    fn advance_hostiles(&mut self, rules: &Rules) -> Vec<(EntityId, EntityId)> {
        let mut arrivals = Vec::new();
        if self.world.targets.is_empty() {
            return arrivals;
        }

        let step = rules.hostile_step;
        for slot in 0..self.world.hostiles.len() {
            let hostile = self.world.hostiles[slot];
            let target_id = self.assigned[hostile.id as usize]
                .unwrap_or_else(|| panic!("hostile {} has no assigned target", hostile.id));
            let target_pos = self
                .target(target_id)
                .unwrap_or_else(|| panic!("hostile {} assigned to dead target {}", hostile.id, target_id))
                .pos;

            let next = if (hostile.pos.distance(&target_pos) as i64) <= step as i64 {
                arrivals.push((target_id, hostile.id));
                target_pos
            } else {
                hostile
                    .pos
                    .offset(hostile.pos.direction_to(&target_pos) * step as f64)
            };
            self.world.hostiles[slot].pos = next;
        }
        arrivals
    }

    /// Apply a shot; returns the id of the hostile if it died
    fn resolve_attack(&mut self, hostile_id: EntityId, rules: &Rules) -> Option<EntityId> {
        let slot = self
            .hostile_slots
            .get(hostile_id)
            .unwrap_or_else(|| panic!("attacking unknown hostile {}", hostile_id));
        let agent_pos = self.world.agent.pos;
        let hostile = &mut self.world.hostiles[slot];
        let damage = rules.damage_at(agent_pos.distance(&hostile.pos));

        if hostile.health > damage {
            hostile.health -= damage;
            self.total_health -= damage as i64;
            debug_assert!(self.total_health >= 0);
            return None;
        }

        // Only the health actually removed counts toward the total
        self.total_health -= hostile.health as i64;
        self.world.hostiles.remove(slot);
        self.assigned[hostile_id as usize] = None;
        self.hostile_slots
            .rebuild(self.world.hostiles.iter().map(|h| h.id));
        Some(hostile_id)
    }

    /// Drop every target reached by at least one hostile that is still alive
    fn remove_reached_targets(
        &mut self,
        arrivals: &[(EntityId, EntityId)],
        killed: Option<EntityId>,
    ) {
        if arrivals.is_empty() {
            return;
        }

        let lost = |target_id: EntityId| {
            arrivals
                .iter()
                .any(|&(t, h)| t == target_id && Some(h) != killed)
        };
        let before = self.world.targets.len();
        self.world.targets.retain(|t| !lost(t.id));
        if self.world.targets.len() == before {
            return;
        }

        self.target_slots
            .rebuild(self.world.targets.iter().map(|t| t.id));
        self.reassign_orphaned_hostiles();
    }

    /// Recompute the nearest target only for hostiles whose target vanished
    fn reassign_orphaned_hostiles(&mut self) {
        if self.world.targets.is_empty() {
            self.assigned.iter_mut().for_each(|a| *a = None);
            return;
        }

        for h in &self.world.hostiles {
            let current = self.assigned[h.id as usize];
            let still_live = current.is_some_and(|t| self.target_slots.contains(t));
            if !still_live {
                self.assigned[h.id as usize] = nearest_target(h.pos, &self.world.targets);
            }
        }
    }
}

/// Closest target to `pos`; ties go to the smaller id
pub fn nearest_target(pos: Point, targets: &[Target]) -> Option<EntityId> {
    targets
        .iter()
        .min_by(|a, b| {
            pos.distance(&a.pos)
                .total_cmp(&pos.distance(&b.pos))
                .then(a.id.cmp(&b.id))
        })
        .map(|t| t.id)
}

/// Pure single-tick transition
///
/// Returns the successor world and whether the agent survived the tick.
pub fn transition(world: &World, action: &Action, rules: &Rules) -> (World, bool) {
    let mut sim = WorldSimulator::new(world.clone());
    let alive = sim.step(action, rules);
    (sim.into_world(), alive)
}

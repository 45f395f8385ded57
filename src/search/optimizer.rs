//! Anytime breadth-first optimizer over simulated futures
//!
//! Each call to [`Optimizer::decide`] grows a tree of hypothetical futures
//! rooted at the observed world, level by level, until the time budget runs
//! out or the tree is exhausted. The best leaf found so far is traced back to
//! its first action, and that branch becomes the predicted root for the next
//! call. When the next observed world matches the prediction, the explored
//! subtree is kept and the search resumes where it stopped; otherwise the
//! tree is rebuilt from scratch.
//!
//! Per node, in order:
//! - prune when it can no longer reach the best finished line
//! - skip moves whose destination lies outside the zone
//! - simulate the node's action
//! - drop dead ends and states already seen in this tree's lifetime
//! - record terminal outcomes, otherwise queue one child per candidate action

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ahash::AHashSet;

use crate::core::config::{GameConfig, Rules};
use crate::policy::{boxed_strategies, CandidateProducer};
use crate::search::criteria::{Criteria, Tally};
use crate::search::reduced::ReducedStateKey;
use crate::search::tree::{NodeId, NodeStatus, SearchNode, SearchTree};
use crate::simulation::WorldSimulator;
use crate::world::{compare_worlds, Action, World};

/// How the tree carried over from the previous call was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuity {
    /// No usable prediction: first call, or the last call found nothing
    Fresh,
    /// The observed world matched the prediction; the subtree was kept
    Continued,
    /// The observed world differed from the prediction; the tree was rebuilt
    Diverged,
}

/// Diagnostics for one `decide` call
#[derive(Debug, Clone)]
pub struct SearchStats {
    pub continuity: Continuity,
    /// Depth of the current frontier below the root
    pub depth: usize,
    /// Simulator steps run during this call
    pub evaluations: usize,
    pub elapsed: Duration,
    /// Size of the dedup set; it only grows until the tree is rebuilt
    pub seen_states: usize,
    pub live_nodes: usize,
    /// No pending nodes remain: every reachable future was explored
    pub exhausted: bool,
    pub best: Option<Criteria>,
}

#[derive(Debug, Clone)]
pub struct Decision {
    pub action: Action,
    /// `false` when no viable future was found and `action` is a fallback
    pub found: bool,
    pub stats: SearchStats,
}

pub struct Optimizer {
    rules: Rules,
    producers: Vec<Box<dyn CandidateProducer>>,
    tree: SearchTree,
    /// Child of the root chosen last call; expected to match the next world
    next_root: Option<NodeId>,
    /// Nodes of the current level still to expand
    frontier: VecDeque<NodeId>,
    /// Children queued for the level below
    next_level: VecDeque<NodeId>,
    /// Best terminal outcome found during this tree's lifetime
    best_terminal: Option<NodeId>,
    /// Best result as of the last completed level
    best_completed: Option<NodeId>,
    /// Best viable node of the level being expanded
    best_in_level: Option<NodeId>,
    last_best: Option<Criteria>,
    depth: usize,
    seen: AHashSet<ReducedStateKey>,
}

impl Optimizer {
    pub fn new(rules: Rules, producers: Vec<Box<dyn CandidateProducer>>) -> Self {
        Self {
            rules,
            producers,
            tree: SearchTree::new(),
            next_root: None,
            frontier: VecDeque::new(),
            next_level: VecDeque::new(),
            best_terminal: None,
            best_completed: None,
            best_in_level: None,
            last_best: None,
            depth: 0,
            seen: AHashSet::new(),
        }
    }

    /// Optimizer using the configured rules and strategy order
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.rules, boxed_strategies(&config.strategies))
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Criteria of the leaf picked by the last successful call
    pub fn best_criteria(&self) -> Option<Criteria> {
        self.last_best
    }

    /// World this optimizer expects to observe next, if it made a prediction
    pub fn predicted_world(&self) -> Option<&World> {
        let id = self.next_root?;
        self.tree.try_get(id).map(|n| n.sim.world())
    }

    /// Pick the action to play now, searching for at most `budget`
    ///
    /// `world` must be the world actually observed this turn; calls are
    /// expected once per turn, in order.
    pub fn decide(&mut self, world: &World, budget: Duration) -> Decision {
        let started = Instant::now();
        let continuity = self.sync_root(world);

        let mut evaluations = 0;
        // After a root advance the frontier may be empty while children of
        // the kept subtree are still queued for the next level
        while !self.frontier.is_empty() || !self.next_level.is_empty() {
            let mut timed_out = false;
            while let Some(&id) = self.frontier.front() {
                if started.elapsed() >= budget {
                    timed_out = true;
                    break;
                }
                self.frontier.pop_front();
                if !self.tree.contains(id) {
                    continue;
                }
                if self.expand(id) {
                    evaluations += 1;
                }
                // The in-flight node is finished; stop before starting another
                if !self.frontier.is_empty() && started.elapsed() >= budget {
                    timed_out = true;
                    break;
                }
            }
            if timed_out {
                break;
            }

            self.depth += 1;
            self.frontier = std::mem::take(&mut self.next_level);
            // A level with no viable node keeps the previous level's best
            let level_best = self.best_in_level.or(self.best_completed);
            self.best_completed = self.better(self.best_terminal, level_best);
            self.best_in_level = None;
            tracing::debug!(depth = self.depth, queued = self.frontier.len(), "level complete");
            if self.frontier.is_empty() {
                tracing::info!("search tree fully explored");
            }
        }

        let leading = self.better(self.best_completed, self.best_in_level);
        let winner = self.better(leading, self.best_terminal);
        let first_step = winner.and_then(|leaf| self.tree.first_step_toward(leaf));

        let (action, found) = match (winner, first_step) {
            (Some(leaf), Some(step)) => {
                self.last_best = Some(self.tree.get(leaf).criteria());
                self.next_root = Some(step);
                (self.tree.get(step).action, true)
            }
            _ => {
                self.next_root = None;
                (Action::hold(world.agent.pos), false)
            }
        };

        let stats = SearchStats {
            continuity,
            depth: self.depth,
            evaluations,
            elapsed: started.elapsed(),
            seen_states: self.seen.len(),
            live_nodes: self.tree.len(),
            exhausted: self.frontier.is_empty() && self.next_level.is_empty(),
            best: if found { self.last_best } else { None },
        };
        tracing::info!(
            depth = stats.depth,
            time_ms = stats.elapsed.as_millis() as u64,
            evals = stats.evaluations,
            seen = stats.seen_states,
            nodes = stats.live_nodes,
            "optimizer stats"
        );
        match stats.best {
            Some(best) => {
                tracing::info!("optimized result: {}", best);
                tracing::debug!("chosen action: {}", action);
            }
            None => tracing::warn!("no optimized result"),
        }

        Decision {
            action,
            found,
            stats,
        }
    }

    /// Adopt the predicted root if `world` matches it, otherwise rebuild
    fn sync_root(&mut self, world: &World) -> Continuity {
        let Some(next) = self.next_root.filter(|id| self.tree.contains(*id)) else {
            tracing::info!("no prediction to continue from, starting fresh search tree");
            self.reset(world);
            return Continuity::Fresh;
        };

        let predicted = self.tree.get(next).sim.world();
        if predicted != world {
            for d in compare_worlds(predicted, world) {
                tracing::debug!("prediction error: {}", d);
            }
            tracing::info!("predicted world mismatch, resetting search tree");
            self.reset(world);
            return Continuity::Diverged;
        }

        let released = self.tree.advance_root(next);
        self.depth = self.depth.saturating_sub(1);
        self.forget_released();
        tracing::debug!(released, kept = self.tree.len(), "advanced search root");
        Continuity::Continued
    }

    /// Drop references to nodes no longer below the root
    fn forget_released(&mut self) {
        let tree = &self.tree;
        let root = tree.root();
        self.frontier.retain(|id| tree.contains(*id));
        self.next_level.retain(|id| tree.contains(*id));
        // The root is "now" and cannot be a future worth picking
        for slot in [
            &mut self.best_terminal,
            &mut self.best_completed,
            &mut self.best_in_level,
        ] {
            if slot.is_some_and(|id| !tree.contains(id) || Some(id) == root) {
                *slot = None;
            }
        }
    }

    /// Start a new tree rooted at `world`
    fn reset(&mut self, world: &World) {
        let sim = WorldSimulator::new(world.clone());
        let tally = Tally::default();
        let mut root = SearchNode::new(Action::hold(world.agent.pos), sim.clone(), tally);
        root.status = NodeStatus::Expanded;
        let root = self.tree.reset(root);

        self.next_root = None;
        self.frontier.clear();
        self.next_level.clear();
        self.best_terminal = None;
        self.best_completed = None;
        self.best_in_level = None;
        self.depth = 0;
        self.seen.clear();

        for action in self.candidates(&sim) {
            let child = self
                .tree
                .add_child(root, SearchNode::new(action, sim.clone(), tally));
            self.frontier.push_back(child);
        }
    }

    fn candidates(&self, sim: &WorldSimulator) -> Vec<Action> {
        self.producers
            .iter()
            .flat_map(|p| p.produce(sim, &self.rules))
            .collect()
    }

    /// Process one frontier node; returns whether the simulator ran
    fn expand(&mut self, id: NodeId) -> bool {
        let rules = self.rules;

        if let Some(best) = self.best_terminal {
            let best = self.tree.get(best).criteria();
            if self.tree.get(id).criteria().cannot_reach(&best) {
                self.tree.get_mut(id).status = NodeStatus::Pruned;
                return false;
            }
        }

        let node = self.tree.get_mut(id);
        if let Action::Move { to, .. } = node.action {
            if !rules.inside_zone(to) {
                node.status = NodeStatus::OutOfZone;
                return false;
            }
        }

        let health_before = node.sim.total_health();
        let action = node.action;
        let alive = node.sim.step(&action, &rules);
        if action.is_attack() {
            node.tally.shots_fired += 1;
            node.tally.total_damage += health_before - node.sim.total_health();
        }
        if !alive {
            node.status = NodeStatus::Dead;
            return true;
        }

        let key = ReducedStateKey::new(&node.sim, &node.tally, rules.hostile_step);
        if !self.seen.insert(key) {
            self.tree.get_mut(id).status = NodeStatus::Duplicate;
            return true;
        }

        self.best_in_level = self.better(self.best_in_level, Some(id));

        let node = self.tree.get_mut(id);
        if node.sim.world().is_terminal() {
            node.status = NodeStatus::Terminal;
            self.best_terminal = self.better(self.best_terminal, Some(id));
            return true;
        }

        node.status = NodeStatus::Expanded;
        let sim = node.sim.clone();
        let tally = node.tally;
        for action in self.candidates(&sim) {
            let child = self
                .tree
                .add_child(id, SearchNode::new(action, sim.clone(), tally));
            self.next_level.push_back(child);
        }
        true
    }

    /// The better-ranked of two optional nodes; `left` wins ties
    fn better(&self, left: Option<NodeId>, right: Option<NodeId>) -> Option<NodeId> {
        match (left, right) {
            (Some(l), Some(r)) => {
                if self.tree.get(l).criteria() < self.tree.get(r).criteria() {
                    Some(r)
                } else {
                    Some(l)
                }
            }
            (l, r) => l.or(r),
        }
    }

    #[cfg(test)]
    pub(crate) fn tree(&self) -> &SearchTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Strategy;
    use crate::spatial::Point;
    use crate::world::{Hostile, Target};

    const LONG: Duration = Duration::from_secs(30);
    const SHORT: Duration = Duration::from_millis(50);

    fn optimizer() -> Optimizer {
        Optimizer::from_config(&GameConfig::default())
    }

    fn single_hostile_world() -> World {
        World::new(
            Point::new(0, 0),
            vec![Target { id: 0, pos: Point::new(100, 100) }],
            vec![Hostile { id: 0, health: 100, pos: Point::new(5000, 5000) }],
        )
    }

    #[test]
    fn test_zero_budget_finds_nothing() {
        let mut opt = optimizer();
        let world = single_hostile_world();
        let decision = opt.decide(&world, Duration::ZERO);
        assert!(!decision.found);
        assert_eq!(decision.action, Action::hold(world.agent.pos));
        assert_eq!(decision.stats.evaluations, 0);
        assert_eq!(decision.stats.continuity, Continuity::Fresh);
    }

    #[test]
    fn test_first_action_is_a_root_candidate() {
        let mut opt = optimizer();
        let world = single_hostile_world();
        let decision = opt.decide(&world, SHORT);
        assert!(decision.found);

        let sim = WorldSimulator::new(world.clone());
        let rules = Rules::default();
        let candidates: Vec<Action> = [Strategy::Centroid, Strategy::Intercept, Strategy::Flee]
            .iter()
            .flat_map(|s| s.produce(&sim, &rules))
            .collect();
        assert!(candidates.contains(&decision.action));
        if decision.action.is_attack() {
            assert!(world.hostile(decision.action.attack_id()).is_some());
        }
    }

    #[test]
    fn test_prediction_match_continues_tree() {
        let mut opt = optimizer();
        let world = single_hostile_world();
        let first = opt.decide(&world, SHORT);
        assert!(first.found);

        let predicted = opt.predicted_world().cloned().unwrap();
        let second = opt.decide(&predicted, SHORT);
        assert_eq!(second.stats.continuity, Continuity::Continued);
    }

    #[test]
    fn test_prediction_mismatch_rebuilds_tree() {
        let mut opt = optimizer();
        let world = single_hostile_world();
        opt.decide(&world, SHORT);

        let mut surprise = opt.predicted_world().cloned().unwrap();
        surprise.hostiles[0].health -= 1;
        let decision = opt.decide(&surprise, SHORT);
        assert_eq!(decision.stats.continuity, Continuity::Diverged);
    }

    #[test]
    fn test_no_candidates_means_not_found() {
        let silent = |_: &WorldSimulator, _: &Rules| -> Vec<Action> { Vec::new() };
        let mut opt = Optimizer::new(Rules::default(), vec![Box::new(silent)]);
        let decision = opt.decide(&single_hostile_world(), LONG);
        assert!(!decision.found);
        assert!(decision.stats.exhausted);
        // No prediction: the next call starts fresh
        let again = opt.decide(&single_hostile_world(), LONG);
        assert_eq!(again.stats.continuity, Continuity::Fresh);
    }

    #[test]
    fn test_out_of_zone_moves_are_never_chosen() {
        let outside = |sim: &WorldSimulator, _: &Rules| {
            let p = sim.world().agent.pos;
            vec![Action::move_to(Point::new(p.x - 10_000, p.y), "off the map")]
        };
        let mut opt = Optimizer::new(Rules::default(), vec![Box::new(outside)]);
        let decision = opt.decide(&single_hostile_world(), LONG);
        assert!(!decision.found);
        let root = opt.tree().root().unwrap();
        let child = opt.tree().get(root).children[0];
        assert_eq!(opt.tree().get(child).status, NodeStatus::OutOfZone);
    }

    #[test]
    fn test_terminal_win_is_preferred() {
        // A weak hostile within easy range: one shot ends the game with the
        // target intact, which beats any line that keeps the hostile alive
        let world = World::new(
            Point::new(4000, 4000),
            vec![Target { id: 0, pos: Point::new(15000, 8000) }],
            vec![Hostile { id: 7, health: 1, pos: Point::new(7000, 4000) }],
        );
        let mut opt = optimizer();
        let decision = opt.decide(&world, LONG);
        assert!(decision.found);
        assert_eq!(decision.action.attack_id(), 7);
        let best = opt.best_criteria().unwrap();
        assert_eq!(best.hostiles_alive, 0);
        assert_eq!(best.targets_alive, 1);
        assert_eq!(best.shots_fired, 1);
    }

    #[test]
    fn test_dead_ends_are_not_expanded() {
        // Every candidate walks into the hostile
        let suicidal = |sim: &WorldSimulator, _: &Rules| {
            vec![Action::move_to(sim.world().hostiles[0].pos, "charge")]
        };
        let world = World::new(
            Point::new(5000, 5000),
            vec![Target { id: 0, pos: Point::new(15000, 8000) }],
            vec![Hostile { id: 0, health: 50, pos: Point::new(7500, 5000) }],
        );
        let mut opt = Optimizer::new(Rules::default(), vec![Box::new(suicidal)]);
        let decision = opt.decide(&world, LONG);
        assert!(!decision.found);
        let root = opt.tree().root().unwrap();
        let child = opt.tree().get(root).children[0];
        assert_eq!(opt.tree().get(child).status, NodeStatus::Dead);
        assert!(opt.tree().get(child).children.is_empty());
    }

    #[test]
    fn test_no_two_expanded_nodes_share_a_key() {
        let mut opt = optimizer();
        let world = single_hostile_world();
        opt.decide(&world, Duration::from_millis(200));

        let tree = opt.tree();
        let mut explored = AHashSet::new();
        let mut duplicates = Vec::new();
        let mut stack = vec![tree.root().unwrap()];
        while let Some(id) = stack.pop() {
            let node = tree.get(id);
            stack.extend(node.children.iter().copied());
            if id == tree.root().unwrap() {
                continue;
            }
            let key = ReducedStateKey::new(&node.sim, &node.tally, opt.rules().hostile_step);
            if node.is_viable() {
                assert!(explored.insert(key), "state expanded twice");
            } else if node.status == NodeStatus::Duplicate {
                duplicates.push(key);
            }
        }
        assert!(!explored.is_empty());
        for key in &duplicates {
            assert!(explored.contains(key));
        }
    }

    /// Hostile 0 reaches target 0 on the first tick unless shot; hostile 1
    /// is far from everything. Shooting twice ends the game with both
    /// targets alive, while drifting first gives up target 0.
    fn two_target_world() -> World {
        World::new(
            Point::new(5000, 4500),
            vec![
                Target { id: 0, pos: Point::new(1000, 1000) },
                Target { id: 1, pos: Point::new(15000, 8000) },
            ],
            vec![
                Hostile { id: 0, health: 1, pos: Point::new(1300, 1000) },
                Hostile { id: 1, health: 1, pos: Point::new(8000, 8000) },
            ],
        )
    }

    /// Shoot the first hostile, or drift one cell east so every line stays
    /// a distinct state
    fn shoot_or_drift(sim: &WorldSimulator, rules: &Rules) -> Vec<Action> {
        let w = sim.world();
        let mut actions = Vec::new();
        if let Some(first) = w.hostiles.first() {
            actions.push(Action::attack(first.id, "shoot"));
        }
        let p = w.agent.pos;
        actions.push(Action::move_to(Point::new(p.x + rules.hostile_step, p.y), "drift"));
        actions
    }

    #[test]
    fn test_lines_that_lost_a_target_are_pruned() {
        let world = two_target_world();
        let mut opt = Optimizer::new(Rules::default(), vec![Box::new(shoot_or_drift)]);
        let decision = opt.decide(&world, LONG);

        assert!(decision.found);
        assert_eq!(decision.action, Action::attack(0, "shoot"));
        let best = opt.best_criteria().unwrap();
        assert_eq!((best.targets_alive, best.hostiles_alive), (2, 0));

        let tree = opt.tree();
        let root = tree.get(tree.root().unwrap());
        let (shot, drifted) = (root.children[0], root.children[1]);
        assert_eq!(tree.get(drifted).sim.world().targets.len(), 1);

        // The losing line was expanded before the win was known; its
        // children were dropped without being simulated
        let lost = tree.get(drifted);
        assert_eq!(lost.status, NodeStatus::Expanded);
        assert_eq!(lost.children.len(), 2);
        for &child in &lost.children {
            let node = tree.get(child);
            assert_eq!(node.status, NodeStatus::Pruned);
            assert_eq!(node.sim.world(), lost.sim.world());
            assert_eq!(node.tally, lost.tally);
        }

        // Same target count as the win but a hostile still alive: kept
        let shot_node = tree.get(shot);
        let (finish, wait) = (shot_node.children[0], shot_node.children[1]);
        assert_eq!(tree.get(finish).status, NodeStatus::Terminal);
        let wait_node = tree.get(wait);
        assert_eq!(wait_node.status, NodeStatus::Expanded);
        let best_terminal = tree.get(finish).criteria();
        assert!(wait_node.criteria() < best_terminal);
        assert!(!wait_node.criteria().cannot_reach(&best_terminal));
        for &child in &wait_node.children {
            let status = tree.get(child).status;
            assert_ne!(status, NodeStatus::Pruned);
            assert_ne!(status, NodeStatus::Pending);
        }
        assert!(!wait_node.children.is_empty());
    }

    #[test]
    fn test_root_advance_forgets_bests_in_dropped_branches() {
        let world = two_target_world();
        let mut opt = Optimizer::new(Rules::default(), vec![Box::new(shoot_or_drift)]);
        opt.decide(&world, LONG);

        let root = opt.tree().root().unwrap();
        let (shot, drifted) = {
            let children = &opt.tree().get(root).children;
            (children[0], children[1])
        };
        let (finish, wait) = {
            let children = &opt.tree().get(shot).children;
            (children[0], children[1])
        };
        assert_eq!(opt.next_root, Some(shot));
        assert_eq!(opt.best_terminal, Some(finish));

        // Pretend the level in progress had ranked the dropped branch first
        opt.best_in_level = Some(drifted);
        opt.best_completed = Some(wait);

        let predicted = opt.predicted_world().cloned().unwrap();
        assert_eq!(opt.sync_root(&predicted), Continuity::Continued);

        assert!(!opt.tree().contains(drifted));
        assert_eq!(opt.best_in_level, None);
        // Bests inside the kept subtree survive the advance
        assert_eq!(opt.best_completed, Some(wait));
        assert_eq!(opt.best_terminal, Some(finish));
        assert_eq!(opt.tree().root(), Some(shot));
    }
}

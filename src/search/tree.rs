//! Arena-backed search tree
//!
//! Nodes live in a slab addressed by generational [`NodeId`]s. A node owns its
//! children through the `children` list; the `parent` link is a plain id used
//! only to walk upward and never keeps anything alive. When the root advances,
//! every node outside the new root's subtree is released and its slot reused.
//! Ids of released nodes stop resolving because the slot generation moves on.

use crate::search::criteria::{Criteria, Tally};
use crate::simulation::WorldSimulator;
use crate::world::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// How far a node got through expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Waiting in a frontier; the action has not been simulated yet
    Pending,
    /// Simulated, alive, children queued
    Expanded,
    /// Simulated, no targets or no hostiles left
    Terminal,
    /// Simulated, the agent died
    Dead,
    /// Simulated, but an equivalent state was already explored
    Duplicate,
    /// Skipped: cannot beat the best terminal outcome
    Pruned,
    /// Skipped: move destination outside the game zone
    OutOfZone,
}

#[derive(Debug, Clone)]
pub struct SearchNode {
    /// Action that leads from the parent's world to this node's world
    pub action: Action,
    /// Parent's world until simulated, this node's world afterwards
    pub sim: WorldSimulator,
    pub tally: Tally,
    pub status: NodeStatus,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl SearchNode {
    pub fn new(action: Action, sim: WorldSimulator, tally: Tally) -> Self {
        Self {
            action,
            sim,
            tally,
            status: NodeStatus::Pending,
            children: Vec::new(),
            parent: None,
        }
    }

    pub fn criteria(&self) -> Criteria {
        Criteria::of(&self.sim, &self.tally)
    }

    /// Simulated and eligible to be picked as a result
    pub fn is_viable(&self) -> bool {
        matches!(self.status, NodeStatus::Expanded | NodeStatus::Terminal)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<SearchNode>,
}

#[derive(Debug, Default)]
pub struct SearchTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    root: Option<NodeId>,
}

impl SearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every node and start over from `root`
    pub fn reset(&mut self, mut root: SearchNode) -> NodeId {
        self.slots.iter_mut().for_each(|s| {
            if s.node.take().is_some() {
                s.generation = s.generation.wrapping_add(1);
            }
        });
        self.free = (0..self.slots.len() as u32).rev().collect();
        self.live = 0;

        root.parent = None;
        let id = self.allocate(root);
        self.root = Some(id);
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes currently held
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|s| s.generation == id.generation && s.node.is_some())
    }

    /// # Panics
    /// If `id` refers to a released node.
    pub fn get(&self, id: NodeId) -> &SearchNode {
        self.try_get(id)
            .unwrap_or_else(|| panic!("stale search node id {:?}", id))
    }

    /// # Panics
    /// If `id` refers to a released node.
    pub fn get_mut(&mut self, id: NodeId) -> &mut SearchNode {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("stale search node id {:?}", id),
        }
    }

    pub fn try_get(&self, id: NodeId) -> Option<&SearchNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// Attach a new pending child under `parent`
    pub fn add_child(&mut self, parent: NodeId, mut child: SearchNode) -> NodeId {
        assert!(self.contains(parent), "adding child to stale node {:?}", parent);
        child.parent = Some(parent);
        let id = self.allocate(child);
        self.get_mut(parent).children.push(id);
        id
    }

    /// Child of the root on the path from the root down to `leaf`
    ///
    /// `None` when `leaf` is the root itself or not under it.
    pub fn first_step_toward(&self, leaf: NodeId) -> Option<NodeId> {
        let root = self.root?;
        let mut cur = leaf;
        loop {
            let parent = self.try_get(cur)?.parent?;
            if parent == root {
                return Some(cur);
            }
            cur = parent;
        }
    }

    /// Make `new_root` the root, releasing everything outside its subtree
    ///
    /// Returns the number of released nodes.
    ///
    /// # Panics
    /// If `new_root` is not a live node.
    pub fn advance_root(&mut self, new_root: NodeId) -> usize {
        assert!(self.contains(new_root), "advancing to stale node {:?}", new_root);

        // Detach the new root from its ancestors, then release from the top.
        let mut top = new_root;
        while let Some(parent) = self.get(top).parent {
            top = parent;
        }
        let old_parent = self.get_mut(new_root).parent.take();
        if let Some(parent) = old_parent {
            self.get_mut(parent).children.retain(|c| *c != new_root);
        }

        let released = if top == new_root {
            0
        } else {
            self.release_subtree(top)
        };
        self.root = Some(new_root);
        released
    }

    fn release_subtree(&mut self, top: NodeId) -> usize {
        let mut stack = vec![top];
        let mut released = 0;
        while let Some(id) = stack.pop() {
            let slot = &mut self.slots[id.index as usize];
            if slot.generation != id.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                self.live -= 1;
                released += 1;
                stack.extend(node.children);
            }
        }
        released
    }

    fn allocate(&mut self, node: SearchNode) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Point;
    use crate::world::{Hostile, Target, World};

    fn node(label: &'static str) -> SearchNode {
        let world = World::new(
            Point::new(0, 0),
            vec![Target { id: 0, pos: Point::new(10, 10) }],
            vec![Hostile { id: 0, health: 5, pos: Point::new(5000, 5000) }],
        );
        SearchNode::new(
            Action::move_to(Point::new(0, 0), label),
            WorldSimulator::new(world),
            Tally::default(),
        )
    }

    #[test]
    fn test_first_step_toward_walks_to_root_child() {
        let mut tree = SearchTree::new();
        let root = tree.reset(node("root"));
        let a = tree.add_child(root, node("a"));
        let b = tree.add_child(a, node("b"));
        let c = tree.add_child(b, node("c"));

        assert_eq!(tree.first_step_toward(c), Some(a));
        assert_eq!(tree.first_step_toward(a), Some(a));
        assert_eq!(tree.first_step_toward(root), None);
        assert_eq!(tree.get(c).parent, Some(b));
    }

    #[test]
    fn test_advance_root_releases_siblings() {
        let mut tree = SearchTree::new();
        let root = tree.reset(node("root"));
        let keep = tree.add_child(root, node("keep"));
        let drop = tree.add_child(root, node("drop"));
        let drop_child = tree.add_child(drop, node("drop child"));
        let keep_child = tree.add_child(keep, node("keep child"));
        assert_eq!(tree.len(), 5);

        let released = tree.advance_root(keep);
        assert_eq!(released, 3);
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains(root));
        assert!(!tree.contains(drop));
        assert!(!tree.contains(drop_child));
        assert!(tree.contains(keep_child));
        assert_eq!(tree.root(), Some(keep));
        assert_eq!(tree.get(keep).parent, None);
        assert_eq!(tree.first_step_toward(keep_child), Some(keep_child));
    }

    #[test]
    fn test_released_ids_stay_stale_after_slot_reuse() {
        let mut tree = SearchTree::new();
        let root = tree.reset(node("root"));
        let keep = tree.add_child(root, node("keep"));
        let drop = tree.add_child(root, node("drop"));
        tree.advance_root(keep);

        let fresh = tree.add_child(keep, node("fresh"));
        assert!(tree.contains(fresh));
        assert!(!tree.contains(drop));
        assert!(!tree.contains(root));
        assert!(tree.try_get(drop).is_none());
    }

    #[test]
    fn test_reset_invalidates_everything() {
        let mut tree = SearchTree::new();
        let root = tree.reset(node("root"));
        let a = tree.add_child(root, node("a"));
        let new_root = tree.reset(node("new root"));
        assert!(!tree.contains(a));
        assert!(!tree.contains(root));
        assert!(tree.contains(new_root));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    #[should_panic(expected = "stale search node")]
    fn test_get_stale_panics() {
        let mut tree = SearchTree::new();
        let root = tree.reset(node("root"));
        let a = tree.add_child(root, node("a"));
        tree.reset(node("again"));
        tree.get(a);
    }
}

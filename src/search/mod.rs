//! Anytime search over simulated futures
//!
//! - `criteria` ranks outcomes
//! - `reduced` fingerprints states for deduplication
//! - `tree` holds the arena of explored futures
//! - `optimizer` drives the time-bounded breadth-first search across turns

pub mod criteria;
pub mod optimizer;
pub mod reduced;
pub mod tree;

pub use criteria::{Criteria, Tally};
pub use optimizer::{Continuity, Decision, Optimizer, SearchStats};
pub use reduced::{PresenceBits, ReducedStateKey};
pub use tree::{NodeId, NodeStatus, SearchNode, SearchTree};

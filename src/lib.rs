//! Vigil - Time-Bounded Decision Engine for a Lone Defender
//!
//! An agent protects stationary targets from hostiles that walk toward them.
//! Each turn the engine simulates possible futures one tick at a time and
//! picks the action whose best reachable outcome keeps the most targets
//! alive.

pub mod core;
pub mod policy;
pub mod protocol;
pub mod search;
pub mod simulation;
pub mod spatial;
pub mod world;

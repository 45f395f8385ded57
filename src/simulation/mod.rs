//! Deterministic one-tick world simulation

pub mod index;
pub mod simulator;

pub use index::IdIndex;
pub use simulator::{nearest_target, transition, WorldSimulator};

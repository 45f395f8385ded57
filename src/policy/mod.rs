//! Decision policy: candidate producers and the turn controller

pub mod controller;
pub mod heuristics;
pub mod producer;

pub use controller::TurnController;
pub use producer::{boxed_strategies, CandidateProducer, Strategy};

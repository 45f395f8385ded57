//! World model: what one observed or simulated tick looks like

pub mod action;
pub mod diff;
pub mod model;

pub use action::Action;
pub use diff::{compare_worlds, Discrepancy};
pub use model::{Agent, EntityId, Hostile, Target, World};

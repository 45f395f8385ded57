//! Line protocol spoken with the game referee

pub mod reader;
pub mod writer;

pub use reader::TurnReader;
pub use writer::{format_action, write_action};

pub mod config;
pub mod error;

pub use config::{GameConfig, Rules, SearchConfig};
pub use error::{Result, VigilError};

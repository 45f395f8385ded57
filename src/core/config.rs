//! Game rules and search configuration
//!
//! All tunable constants live here. The defaults reproduce the rules of the
//! live game; a TOML file may override any subset of them.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, VigilError};
use crate::policy::Strategy;
use crate::spatial::Point;

/// Physical rules of one simulated tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Maximum distance the agent covers per tick
    pub agent_step: i32,

    /// Distance every hostile covers per tick toward its target
    ///
    /// Also the bucket size used to quantize agent positions when
    /// deduplicating search states.
    pub hostile_step: i32,

    /// A hostile at this distance or closer kills the agent (inclusive)
    pub death_distance: i32,

    /// Damage = round(damage_constant / distance^damage_exponent)
    pub damage_constant: f64,
    pub damage_exponent: f64,

    /// Playable zone is [0, zone_width] x [0, zone_height]
    pub zone_width: i32,
    pub zone_height: i32,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            agent_step: 1000,
            hostile_step: 500,
            death_distance: 2000,
            damage_constant: 125_000.0,
            damage_exponent: 1.2,
            zone_width: 16_000,
            zone_height: 9_000,
        }
    }
}

impl Rules {
    /// Far corner of the game zone
    pub fn zone(&self) -> Point {
        Point::new(self.zone_width, self.zone_height)
    }

    pub fn inside_zone(&self, p: Point) -> bool {
        p.x >= 0 && p.x <= self.zone_width && p.y >= 0 && p.y <= self.zone_height
    }

    /// Damage dealt by a shot fired from `distance` away
    pub fn damage_at(&self, distance: f64) -> i32 {
        (self.damage_constant / distance.powf(self.damage_exponent)).round() as i32
    }
}

/// Time budgeting for the per-turn decision
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Wall-clock limit of one game turn
    pub turn_time_limit_ms: u64,

    /// Share of the turn handed to the optimizer; the rest is I/O headroom
    pub search_budget_fraction: f64,

    /// Append the action's diagnostic label to the output line
    pub emit_labels: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            turn_time_limit_ms: 100,
            search_budget_fraction: 0.95,
            emit_labels: true,
        }
    }
}

impl SearchConfig {
    pub fn turn_time_limit(&self) -> Duration {
        Duration::from_millis(self.turn_time_limit_ms)
    }

    /// Portion of the turn the optimizer may spend searching
    pub fn search_budget(&self) -> Duration {
        self.turn_time_limit().mul_f64(self.search_budget_fraction)
    }
}

fn default_strategies() -> Vec<Strategy> {
    vec![Strategy::Centroid, Strategy::Intercept, Strategy::Flee]
}

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub rules: Rules,

    #[serde(default)]
    pub search: SearchConfig,

    /// Candidate producers in the order the optimizer tries them
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rules: Rules::default(),
            search: SearchConfig::default(),
            strategies: default_strategies(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a config from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: GameConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let r = &self.rules;
        if r.agent_step <= 0 || r.hostile_step <= 0 || r.death_distance <= 0 {
            return Err(VigilError::InvalidConfig(format!(
                "step and death distances must be positive \
                 (agent_step={}, hostile_step={}, death_distance={})",
                r.agent_step, r.hostile_step, r.death_distance
            )));
        }
        if r.zone_width <= 0 || r.zone_height <= 0 {
            return Err(VigilError::InvalidConfig(format!(
                "zone must be non-empty ({}x{})",
                r.zone_width, r.zone_height
            )));
        }
        if !(r.damage_constant > 0.0) || !(r.damage_exponent > 0.0) {
            return Err(VigilError::InvalidConfig(
                "damage constant and exponent must be positive".into(),
            ));
        }

        let fraction = self.search.search_budget_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(VigilError::InvalidConfig(format!(
                "search_budget_fraction ({}) must be in (0, 1]",
                fraction
            )));
        }

        if self.strategies.is_empty() {
            return Err(VigilError::InvalidConfig(
                "at least one strategy is required".into(),
            ));
        }
        for (i, s) in self.strategies.iter().enumerate() {
            if self.strategies[..i].contains(s) {
                return Err(VigilError::InvalidConfig(format!(
                    "strategy {:?} listed twice",
                    s
                )));
            }
        }

        Ok(())
    }
}

//! Candidate-action producers plugged into the optimizer
//!
//! A producer looks at a simulated world and proposes actions worth
//! exploring. Producers must be deterministic and side-effect free; the
//! optimizer calls them in configuration order and never inspects how they
//! decide.

use serde::{Deserialize, Serialize};

use crate::core::config::Rules;
use crate::policy::heuristics;
use crate::simulation::WorldSimulator;
use crate::world::Action;

pub trait CandidateProducer {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Actions to explore from `sim`'s current world (possibly none)
    fn produce(&self, sim: &WorldSimulator, rules: &Rules) -> Vec<Action>;
}

/// Closures are producers too, which keeps ad-hoc policies cheap to try
impl<F> CandidateProducer for F
where
    F: Fn(&WorldSimulator, &Rules) -> Vec<Action>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn produce(&self, sim: &WorldSimulator, rules: &Rules) -> Vec<Action> {
        self(sim, rules)
    }
}

/// Built-in heuristics, selectable by name from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Move to the centroid of all hostiles
    Centroid,
    /// Shoot the hostile closest to collecting a target, and close in on it
    Intercept,
    /// Step away from every nearby lethal threat
    Flee,
}

impl CandidateProducer for Strategy {
    fn name(&self) -> &str {
        match self {
            Strategy::Centroid => "centroid",
            Strategy::Intercept => "intercept",
            Strategy::Flee => "flee",
        }
    }

    fn produce(&self, sim: &WorldSimulator, rules: &Rules) -> Vec<Action> {
        match self {
            Strategy::Centroid => heuristics::hold_at_centroid(sim.world()),
            Strategy::Intercept => heuristics::intercept(sim, rules),
            Strategy::Flee => heuristics::flee(sim.world(), rules),
        }
    }
}

/// Box the configured strategies in order
pub fn boxed_strategies(strategies: &[Strategy]) -> Vec<Box<dyn CandidateProducer>> {
    strategies
        .iter()
        .map(|s| Box::new(*s) as Box<dyn CandidateProducer>)
        .collect()
}

//! Per-turn driver around the optimizer

use std::time::Duration;

use crate::core::config::GameConfig;
use crate::search::{Criteria, Decision, Optimizer};
use crate::world::{Action, World};

/// Owns one optimizer for the whole game and spends a fixed share of each
/// turn searching
pub struct TurnController {
    optimizer: Optimizer,
    budget: Duration,
}

impl TurnController {
    pub fn new(config: &GameConfig) -> Self {
        Self::with_optimizer(Optimizer::from_config(config), config.search.search_budget())
    }

    pub fn with_optimizer(optimizer: Optimizer, budget: Duration) -> Self {
        Self { optimizer, budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Action to play for the observed `world`
    pub fn step(&mut self, world: &World) -> Action {
        self.decide(world).action
    }

    /// Like [`step`](Self::step) but keeps the search diagnostics
    pub fn decide(&mut self, world: &World) -> Decision {
        let mut decision = self.optimizer.decide(world, self.budget);
        if !decision.found {
            tracing::warn!("no solution found, giving up this turn");
            decision.action = Action::move_to(world.agent.pos, "give up");
        }
        decision
    }

    pub fn best_criteria(&self) -> Option<Criteria> {
        self.optimizer.best_criteria()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Rules;
    use crate::simulation::WorldSimulator;
    use crate::spatial::Point;
    use crate::world::{Hostile, Target};

    fn world() -> World {
        World::new(
            Point::new(8000, 4500),
            vec![Target { id: 0, pos: Point::new(1000, 1000) }],
            vec![Hostile { id: 0, health: 40, pos: Point::new(14000, 8000) }],
        )
    }

    #[test]
    fn test_budget_comes_from_config() {
        let config = GameConfig::default();
        let controller = TurnController::new(&config);
        assert_eq!(controller.budget(), config.search.search_budget());
    }

    #[test]
    fn test_gives_up_in_place_without_a_solution() {
        let silent = |_: &WorldSimulator, _: &Rules| -> Vec<Action> { Vec::new() };
        let optimizer = Optimizer::new(Rules::default(), vec![Box::new(silent)]);
        let mut controller = TurnController::with_optimizer(optimizer, Duration::from_millis(20));

        let action = controller.step(&world());
        assert_eq!(action, Action::move_to(Point::new(8000, 4500), "give up"));
        assert!(controller.best_criteria().is_none());
    }

    #[test]
    fn test_step_reports_winning_criteria() {
        let mut controller = TurnController::new(&GameConfig::default());
        let decision = controller.decide(&world());
        assert!(decision.found);
        assert_eq!(controller.best_criteria(), decision.stats.best);
    }
}

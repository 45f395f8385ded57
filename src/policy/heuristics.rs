//! Built-in candidate heuristics
//!
//! Each function proposes a handful of plausible actions; the search decides
//! which of them actually pay off.

use crate::core::config::Rules;
use crate::simulation::{nearest_target, WorldSimulator};
use crate::spatial::{Point, Vect};
use crate::world::{Action, Hostile, World};

/// Margin kept between the approach step and the death radius
const APPROACH_SAFETY_MARGIN: f64 = 5.0;

/// Flee vectors summing to less than this per axis are treated as balanced
const BALANCED_EPS: f64 = 0.01;

/// Move to the mean hostile position, or stay put when there are none
pub fn hold_at_centroid(world: &World) -> Vec<Action> {
    vec![Action::move_to(
        hostile_centroid(world),
        "hold at hostile centroid",
    )]
}

/// Mean hostile position (truncating division); the agent's own position
/// when no hostiles remain
pub fn hostile_centroid(world: &World) -> Point {
    let hostiles = &world.hostiles;
    if hostiles.is_empty() {
        return world.agent.pos;
    }
    let n = hostiles.len() as i64;
    let sx: i64 = hostiles.iter().map(|h| h.pos.x as i64).sum();
    let sy: i64 = hostiles.iter().map(|h| h.pos.y as i64).sum();
    Point::new((sx / n) as i32, (sy / n) as i32)
}

/// Where `hostile` will stand after one more tick
pub fn predicted_position(hostile: &Hostile, world: &World, rules: &Rules) -> Point {
    let Some(target_id) = nearest_target(hostile.pos, &world.targets) else {
        return hostile.pos;
    };
    let Some(target) = world.target(target_id) else {
        return hostile.pos;
    };
    hostile
        .pos
        .offset(hostile.pos.direction_to(&target.pos) * rules.hostile_step as f64)
}

/// Slot of the hostile closest to finishing its run on a target
///
/// Hostiles without an assigned target are ignored; defaults to slot 0.
pub fn most_urgent_hostile(sim: &WorldSimulator) -> usize {
    let mut best = 0;
    let mut best_dist = f64::MAX;
    for (slot, h) in sim.world().hostiles.iter().enumerate() {
        if let Some(target) = sim.assigned_target(h.id) {
            let d = h.pos.distance(&target.pos);
            if d < best_dist {
                best_dist = d;
                best = slot;
            }
        }
    }
    best
}

/// Slot of the hostile closest to the agent (first wins ties)
pub fn nearest_hostile(world: &World) -> Option<usize> {
    let agent = world.agent.pos;
    let mut best: Option<(usize, f64)> = None;
    for (slot, h) in world.hostiles.iter().enumerate() {
        let d = agent.distance(&h.pos);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((slot, d));
        }
    }
    best.map(|(slot, _)| slot)
}

/// Shoot the most urgent hostile and close in on it; do the same for the
/// hostile nearest the agent when that is a different one
pub fn intercept(sim: &WorldSimulator, rules: &Rules) -> Vec<Action> {
    let world = sim.world();
    let Some(nearest) = nearest_hostile(world) else {
        return Vec::new();
    };
    let urgent = most_urgent_hostile(sim);
    let agent = world.agent.pos;

    let nearest_next = predicted_position(&world.hostiles[nearest], world, rules);
    let nearest_dist = agent.distance(&nearest_next);
    let death = rules.death_distance as f64;
    let mut step = rules.agent_step as f64;
    if step + death >= nearest_dist {
        step = nearest_dist - death - APPROACH_SAFETY_MARGIN;
    }

    let approach = |slot: usize| {
        let next = predicted_position(&world.hostiles[slot], world, rules);
        agent.offset(agent.direction_to(&next) * step)
    };

    let mut actions = vec![
        Action::attack(world.hostiles[urgent].id, "attack most urgent hostile"),
        Action::move_to(approach(urgent), "approach most urgent hostile"),
    ];
    if urgent != nearest {
        actions.push(Action::attack(
            world.hostiles[nearest].id,
            "attack nearest hostile",
        ));
        actions.push(Action::move_to(approach(nearest), "approach nearest hostile"));
    }
    actions
}

/// Step away from every hostile within twice the death distance
///
/// Nearby zone walls count as threats too, so the agent does not flee into a
/// corner. When the threats cancel out, the agent escapes through the widest
/// angular gap between two of them.
pub fn flee(world: &World, rules: &Rules) -> Vec<Action> {
    let agent = world.agent.pos;
    let danger = 2.0 * rules.death_distance as f64;

    let mut threats: Vec<Point> = world
        .hostiles
        .iter()
        .map(|h| h.pos)
        .filter(|p| p.distance(&agent) < danger)
        .collect();
    if threats.is_empty() {
        return Vec::new();
    }

    let wall_margin = rules.death_distance + rules.agent_step;
    if agent.x <= wall_margin {
        threats.push(Point::new(0, agent.y));
    }
    if rules.zone_width - agent.x <= wall_margin {
        threats.push(Point::new(rules.zone_width, agent.y));
    }
    if agent.y <= wall_margin {
        threats.push(Point::new(agent.x, 0));
    }
    if rules.zone_height - agent.y <= wall_margin {
        threats.push(Point::new(agent.x, rules.zone_height));
    }

    let away: Vec<Vect> = threats.iter().map(|t| t.direction_to(&agent)).collect();
    let mut sum = Vect::ZERO;
    for v in &away {
        sum += *v;
    }

    let dir = if sum.is_near_zero(BALANCED_EPS) {
        widest_gap_direction(&away)
    } else {
        sum.normalize()
    };

    vec![Action::move_to(
        agent.offset(dir * rules.agent_step as f64),
        "flee from threats",
    )]
}

/// Bisector of the pair of unit vectors with the largest angle between them
fn widest_gap_direction(away: &[Vect]) -> Vect {
    let Some(first) = away.first() else {
        return Vect::ZERO;
    };

    let mut best: Option<(f64, usize, usize)> = None;
    for i in 0..away.len() {
        for j in (i + 1)..away.len() {
            let cos = away[i].dot(&away[j]).clamp(-1.0, 1.0);
            let sin_half = ((1.0 - cos) / 2.0).sqrt();
            if best.map_or(true, |(b, _, _)| sin_half > b) {
                best = Some((sin_half, i, j));
            }
        }
    }

    match best {
        Some((_, i, j)) => {
            let dir = away[i] + away[j];
            if dir.is_near_zero(BALANCED_EPS) {
                first.orthogonal()
            } else {
                dir.normalize()
            }
        }
        None => first.orthogonal(),
    }
}

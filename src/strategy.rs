//! Decision strategies: turn what an agent sees into one action per tick.

use crate::genetics::{GeneticId, SpeciesKind};
use crate::grid::Location;
use crate::perception::{OccupantView, Surroundings};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What an agent does this tick
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Step as close as possible to the location, within range
    MoveToward(Location),
    /// Graze the tile (prey) or kill its occupant (predator)
    Eat(Location),
    /// Breed with the occupant of the tile
    Reproduce(Location),
    Idle,
}

/// The deciding agent's own state, as far as decisions care
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drives {
    pub location: Location,
    pub genetic_id: GeneticId,
    pub ready_to_breed: bool,
    /// Lowest tile energy worth grazing
    pub graze_threshold: i32,
}

pub trait DecisionStrategy {
    fn decide<R: Rng + ?Sized>(&self, drives: &Drives, view: &Surroundings, rng: &mut R) -> Action;
}

/// Grazers: flee, feed, breed, wander
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreyStrategy;

/// Hunters: hunt, breed, rest
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PredatorStrategy;

/// Strategy chosen by species kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Prey(PreyStrategy),
    Predator(PredatorStrategy),
}

impl Strategy {
    pub fn for_kind(kind: SpeciesKind) -> Self {
        match kind {
            SpeciesKind::Prey => Strategy::Prey(PreyStrategy),
            SpeciesKind::Predator => Strategy::Predator(PredatorStrategy),
        }
    }
}

impl DecisionStrategy for Strategy {
    fn decide<R: Rng + ?Sized>(&self, drives: &Drives, view: &Surroundings, rng: &mut R) -> Action {
        match self {
            Strategy::Prey(s) => s.decide(drives, view, rng),
            Strategy::Predator(s) => s.decide(drives, view, rng),
        }
    }
}

impl DecisionStrategy for PreyStrategy {
    fn decide<R: Rng + ?Sized>(&self, drives: &Drives, view: &Surroundings, rng: &mut R) -> Action {
        let threats: Vec<Location> = view
            .others()
            .filter(|o| o.kind == SpeciesKind::Predator && o.genetic_id != drives.genetic_id)
            .map(|o| o.location)
            .collect();

        if !threats.is_empty() {
            if let Some(refuge) = flee(drives.location, &threats, view, rng) {
                return Action::MoveToward(refuge);
            }
        }

        let pasture = view.tiles().iter().filter(|t| {
            t.energy >= drives.graze_threshold && (t.location == drives.location || !t.occupied)
        });
        if let Some(tile) = nearest(drives.location, pasture, |t| t.location, rng) {
            return Action::Eat(tile.location);
        }

        if drives.ready_to_breed {
            if let Some(action) = court(drives, view, rng) {
                return action;
            }
        }

        view.free_within(1)
            .choose(rng)
            .map(|&loc| Action::MoveToward(loc))
            .unwrap_or(Action::Idle)
    }
}

impl DecisionStrategy for PredatorStrategy {
    fn decide<R: Rng + ?Sized>(&self, drives: &Drives, view: &Surroundings, rng: &mut R) -> Action {
        let quarry = view
            .others()
            .filter(|o| o.kind == SpeciesKind::Prey && o.genetic_id != drives.genetic_id);
        if let Some(prey) = nearest(drives.location, quarry, |o| o.location, rng) {
            return if prey.location.is_adjacent(&drives.location) {
                Action::Eat(prey.location)
            } else {
                Action::MoveToward(prey.location)
            };
        }

        if drives.ready_to_breed {
            if let Some(action) = court(drives, view, rng) {
                return action;
            }
        }

        Action::Idle
    }
}

/// Head for the nearest mature same-species agent, or breed with it when adjacent
fn court<R: Rng + ?Sized>(drives: &Drives, view: &Surroundings, rng: &mut R) -> Option<Action> {
    let partners = view
        .others()
        .filter(|o: &&OccupantView| o.genetic_id == drives.genetic_id && o.mature);
    let partner = nearest(drives.location, partners, |o| o.location, rng)?;

    Some(if partner.location.is_adjacent(&drives.location) {
        Action::Reproduce(partner.location)
    } else {
        Action::MoveToward(partner.location)
    })
}

/// Best free adjacent tile measured by distance to the closest threat.
/// None when no tile beats staying put.
fn flee<R: Rng + ?Sized>(
    origin: Location,
    threats: &[Location],
    view: &Surroundings,
    rng: &mut R,
) -> Option<Location> {
    let safety = |loc: Location| threats.iter().map(|t| t.distance(&loc)).min().unwrap_or(i32::MAX);

    let here = safety(origin);
    let candidates = view.free_within(1);
    let best = candidates.iter().map(|&loc| safety(loc)).max()?;
    if best <= here {
        return None;
    }

    let refuges: Vec<Location> = candidates.into_iter().filter(|&loc| safety(loc) == best).collect();
    refuges.choose(rng).copied()
}

/// Closest item to `origin`, ties broken at random
fn nearest<'a, T, I, F, R>(origin: Location, items: I, locate: F, rng: &mut R) -> Option<&'a T>
where
    I: Iterator<Item = &'a T>,
    F: Fn(&T) -> Location,
    R: Rng + ?Sized,
{
    let mut best: Vec<&'a T> = Vec::new();
    let mut best_distance = i32::MAX;

    for item in items {
        let d = locate(item).distance(&origin);
        if d < best_distance {
            best_distance = d;
            best.clear();
            best.push(item);
        } else if d == best_distance {
            best.push(item);
        }
    }

    best.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{AgentId, Environment, FoodSettings};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    struct Scene {
        env: Environment,
        agents: HashMap<AgentId, OccupantView>,
    }

    impl Scene {
        fn new() -> Self {
            let food = FoodSettings {
                min_food: 0,
                max_food: 8,
                regen_amount: 1,
                regen_chance: 0.0,
            };
            Self {
                env: Environment::new(12, 12, food).unwrap(),
                agents: HashMap::new(),
            }
        }

        fn put(&mut self, id: AgentId, loc: Location, kind: SpeciesKind, genetic_id: GeneticId) {
            self.env.place(loc, id).unwrap();
            self.agents.insert(
                id,
                OccupantView {
                    id,
                    location: loc,
                    kind,
                    genetic_id,
                    size: 20,
                    hunger: 100,
                    mature: true,
                },
            );
        }

        fn look(&self, origin: Location, radius: i32) -> Surroundings {
            Surroundings::scan(&self.env, origin, radius, |id| self.agents.get(&id).copied())
        }
    }

    fn drives(location: Location, ready_to_breed: bool) -> Drives {
        Drives {
            location,
            genetic_id: 1,
            ready_to_breed,
            graze_threshold: 1,
        }
    }

    #[test]
    fn test_prey_flees_predator() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(6, 5), SpeciesKind::Predator, 9);
        let view = scene.look(me, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for _ in 0..10 {
            match PreyStrategy.decide(&drives(me, true), &view, &mut rng) {
                Action::MoveToward(loc) => assert_eq!(loc.x, 4),
                other => panic!("expected flight, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_prey_ignores_own_species_predator() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(6, 5), SpeciesKind::Predator, 1);
        scene.env.set_energy(Location::new(5, 6), 8).unwrap();
        let view = scene.look(me, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PreyStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::Eat(Location::new(5, 6)));
    }

    #[test]
    fn test_cornered_prey_does_not_flee() {
        let mut scene = Scene::new();
        let me = Location::new(0, 0);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(1, 1), SpeciesKind::Predator, 9);
        scene.put(3, Location::new(1, 0), SpeciesKind::Prey, 4);
        scene.put(4, Location::new(0, 1), SpeciesKind::Prey, 4);
        let view = scene.look(me, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PreyStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::Idle);
    }

    #[test]
    fn test_prey_eats_nearest_food() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.env.set_energy(Location::new(8, 8), 8).unwrap();
        scene.env.set_energy(Location::new(6, 5), 2).unwrap();
        let view = scene.look(me, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PreyStrategy.decide(&drives(me, true), &view, &mut rng);
        assert_eq!(action, Action::Eat(Location::new(6, 5)));
    }

    #[test]
    fn test_prey_skips_occupied_food() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(6, 5), SpeciesKind::Prey, 4);
        scene.env.set_energy(Location::new(6, 5), 8).unwrap();
        scene.env.set_energy(Location::new(7, 7), 3).unwrap();
        let view = scene.look(me, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PreyStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::Eat(Location::new(7, 7)));
    }

    #[test]
    fn test_prey_courts_partner() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(8, 5), SpeciesKind::Prey, 1);
        let view = scene.look(me, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PreyStrategy.decide(&drives(me, true), &view, &mut rng);
        assert_eq!(action, Action::MoveToward(Location::new(8, 5)));

        let mut scene = Scene::new();
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.put(2, Location::new(5, 4), SpeciesKind::Prey, 1);
        let view = scene.look(me, 3);
        let action = PreyStrategy.decide(&drives(me, true), &view, &mut rng);
        assert_eq!(action, Action::Reproduce(Location::new(5, 4)));
    }

    #[test]
    fn test_prey_wanders_without_food() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        let view = scene.look(me, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        match PreyStrategy.decide(&drives(me, false), &view, &mut rng) {
            Action::MoveToward(loc) => assert!(loc.is_adjacent(&me)),
            other => panic!("expected wandering, got {:?}", other),
        }
    }

    #[test]
    fn test_predator_hunts() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Predator, 1);
        scene.put(2, Location::new(8, 8), SpeciesKind::Prey, 4);
        scene.put(3, Location::new(5, 1), SpeciesKind::Prey, 1);
        let view = scene.look(me, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // same genetic id is never prey
        let action = PredatorStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::MoveToward(Location::new(8, 8)));

        scene.put(4, Location::new(4, 4), SpeciesKind::Prey, 4);
        let view = scene.look(me, 4);
        let action = PredatorStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::Eat(Location::new(4, 4)));
    }

    #[test]
    fn test_predator_hunts_before_courting() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Predator, 1);
        scene.put(2, Location::new(5, 6), SpeciesKind::Predator, 1);
        scene.put(3, Location::new(7, 7), SpeciesKind::Prey, 4);
        let view = scene.look(me, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PredatorStrategy.decide(&drives(me, true), &view, &mut rng);
        assert_eq!(action, Action::MoveToward(Location::new(7, 7)));
    }

    #[test]
    fn test_predator_idles_without_prey() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Predator, 1);
        scene.put(2, Location::new(6, 6), SpeciesKind::Predator, 1);
        scene.put(3, Location::new(4, 4), SpeciesKind::Prey, 1);
        let view = scene.look(me, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let action = PredatorStrategy.decide(&drives(me, false), &view, &mut rng);
        assert_eq!(action, Action::Idle);
    }

    #[test]
    fn test_ties_broken_by_rng() {
        let mut scene = Scene::new();
        let me = Location::new(5, 5);
        scene.put(1, me, SpeciesKind::Prey, 1);
        scene.env.set_energy(Location::new(4, 5), 5).unwrap();
        scene.env.set_energy(Location::new(6, 5), 5).unwrap();
        let view = scene.look(me, 2);

        let pick = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            PreyStrategy.decide(&drives(me, false), &view, &mut rng)
        };
        let picks: Vec<Action> = (0..32).map(pick).collect();

        assert!(picks.contains(&Action::Eat(Location::new(4, 5))));
        assert!(picks.contains(&Action::Eat(Location::new(6, 5))));
        // same seed, same choice
        assert_eq!(pick(7), pick(7));
    }
}

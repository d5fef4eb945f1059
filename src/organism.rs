//! Agents: vital stats, lifecycle, and the single-agent halves of every action.

use crate::config::{Config, OrganismConfig, PredationConfig};
use crate::error::{Result, SimError};
use crate::genetics::{GeneticId, SpeciesKind, TraitSet};
use crate::grid::{AgentId, Environment, Location};
use crate::perception::{OccupantView, Surroundings};
use crate::population::PopulationRegistry;
use crate::strategy::{Action, DecisionStrategy, Drives, Strategy};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Cause of death tracking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Starvation,
    Predation,
    OldAge,
}

/// Hunger, health, age and breeding cooldown, each kept inside its bounds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalStats {
    hunger: i32,
    health: i32,
    age: i32,
    cooldown: i32,
    max_hunger: i32,
    max_health: i32,
    lifespan: i32,
}

impl VitalStats {
    pub fn new(max_hunger: i32, max_health: i32, lifespan: i32, hunger: i32) -> Self {
        let max_hunger = max_hunger.max(0);
        let max_health = max_health.max(1);
        Self {
            hunger: hunger.clamp(0, max_hunger),
            health: max_health,
            age: 0,
            cooldown: 0,
            max_hunger,
            max_health,
            lifespan: lifespan.max(1),
        }
    }

    #[inline]
    pub fn hunger(&self) -> i32 {
        self.hunger
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn age(&self) -> i32 {
        self.age
    }

    #[inline]
    pub fn cooldown(&self) -> i32 {
        self.cooldown
    }

    #[inline]
    pub fn max_hunger(&self) -> i32 {
        self.max_hunger
    }

    #[inline]
    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    #[inline]
    pub fn lifespan(&self) -> i32 {
        self.lifespan
    }

    /// Add (or with a negative delta, remove) hunger
    pub fn add_hunger(&mut self, delta: i32) {
        self.hunger = self.hunger.saturating_add(delta).clamp(0, self.max_hunger);
    }

    pub fn set_hunger(&mut self, hunger: i32) {
        self.hunger = hunger.clamp(0, self.max_hunger);
    }

    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    pub fn set_age(&mut self, age: i32) {
        self.age = age.clamp(0, self.lifespan);
    }

    pub fn start_cooldown(&mut self, ticks: i32) {
        self.cooldown = ticks.max(0);
    }

    /// One tick of metabolism for an agent of the given size
    pub fn live_day(&mut self, size: i32) {
        self.add_hunger(-(size / 3));
        self.age = (self.age + 1).min(self.lifespan);
        self.cooldown = (self.cooldown - 1).max(0);

        if self.hunger >= self.max_hunger / 2 {
            self.set_health(self.health + self.max_health / 2);
        } else {
            self.set_health(self.health - self.max_health / 5);
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0 || self.age >= self.lifespan
    }
}

/// The per-tick lifecycle every agent goes through
pub trait Lifecycle {
    fn perceive(&self, env: &Environment, population: &PopulationRegistry) -> Surroundings;
    fn decide<R: Rng + ?Sized>(&self, view: &Surroundings, drives: &Drives, rng: &mut R) -> Action;
    fn live_day(&mut self);
    fn is_dead(&self) -> bool;
}

/// A simulated creature
#[derive(Clone, Debug)]
pub struct Agent {
    pub id: AgentId,
    pub traits: TraitSet,
    pub vitals: VitalStats,
    location: Location,
    strategy: Strategy,
    pub generation: u32,
    pub parents: Option<(AgentId, AgentId)>,
    pub offspring_count: u32,
    pub kills: u32,
    pub cause_of_death: Option<DeathCause>,
}

impl Agent {
    /// A founding agent: full hunger and health
    pub fn new(id: AgentId, traits: TraitSet, location: Location, max_health: i32) -> Self {
        let hunger = traits.capabilities().energy_capacity;
        Self::with_hunger(id, traits, location, max_health, hunger)
    }

    pub fn with_hunger(
        id: AgentId,
        traits: TraitSet,
        location: Location,
        max_health: i32,
        hunger: i32,
    ) -> Self {
        let caps = *traits.capabilities();
        Self {
            id,
            vitals: VitalStats::new(caps.energy_capacity, max_health, caps.lifespan, hunger),
            strategy: Strategy::for_kind(traits.kind),
            traits,
            location,
            generation: 0,
            parents: None,
            offspring_count: 0,
            kills: 0,
            cause_of_death: None,
        }
    }

    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    #[inline]
    pub fn kind(&self) -> SpeciesKind {
        self.traits.kind
    }

    #[inline]
    pub fn genetic_id(&self) -> GeneticId {
        self.traits.genetic_id
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// What neighbours see of this agent
    pub fn view(&self) -> OccupantView {
        OccupantView {
            id: self.id,
            location: self.location,
            kind: self.traits.kind,
            genetic_id: self.traits.genetic_id,
            size: self.traits.size(),
            hunger: self.vitals.hunger(),
            mature: self.is_mature(),
        }
    }

    #[inline]
    pub fn is_mature(&self) -> bool {
        self.vitals.age() >= self.traits.capabilities().min_breeding_age
    }

    /// Mature, off cooldown, and able to pay for at least one child
    pub fn ready_to_breed(&self) -> bool {
        self.is_mature()
            && self.vitals.cooldown() == 0
            && self.vitals.hunger() > self.traits.capabilities().reproduction_cost
    }

    pub fn drives(&self, organisms: &OrganismConfig, min_food: i32) -> Drives {
        Drives {
            location: self.location,
            genetic_id: self.traits.genetic_id,
            ready_to_breed: self.ready_to_breed(),
            // tiles at min_food have nothing left to give
            graze_threshold: min_food + organisms.graze_threshold.max(1),
        }
    }

    /// Step to the free tile within range that is closest to `target`,
    /// preferring shorter moves. Stays put unless that tile is closer than
    /// the current one. Returns the number of tiles travelled.
    pub fn move_toward<R: Rng + ?Sized>(
        &mut self,
        target: Location,
        env: &mut Environment,
        rng: &mut R,
    ) -> Result<i32> {
        if !env.contains(target) {
            return Err(SimError::Bounds {
                x: target.x,
                y: target.y,
                width: env.width(),
                height: env.height(),
            });
        }

        let here = self.location;
        let mut best: Vec<Location> = Vec::new();
        let mut best_key = (here.distance(&target), 0);

        for loc in env.locations_within(here, self.traits.range()) {
            if loc == here || !env.is_empty(loc) {
                continue;
            }
            let key = (loc.distance(&target), loc.distance(&here));
            if key < best_key {
                best_key = key;
                best.clear();
                best.push(loc);
            } else if key == best_key {
                best.push(loc);
            }
        }

        match best.choose(rng) {
            Some(&dest) => self.relocate(dest, env),
            None => Ok(0),
        }
    }

    /// Move onto `target` if needed and eat from it. Returns the energy taken.
    pub fn graze<R: Rng + ?Sized>(
        &mut self,
        target: Location,
        env: &mut Environment,
        food_value: i32,
        rng: &mut R,
    ) -> Result<i32> {
        if target != self.location {
            if self.location.distance(&target) > self.traits.range() {
                self.move_toward(target, env, rng)?;
                return Ok(0);
            }
            self.relocate(target, env)?;
        }

        let eaten = env.consume(target, self.traits.capabilities().eat_amount)?;
        self.vitals.add_hunger(eaten.saturating_mul(food_value));
        Ok(eaten)
    }

    /// Gain from a kill. Returns the hunger gained.
    pub fn feed_on(&mut self, prey: &OccupantView, config: &PredationConfig) -> i32 {
        let stored = (prey.hunger as f64 * config.stored_energy_fraction).round() as i32;
        let gain = stored.max(0) + prey.size * config.size_energy_multiplier;
        self.vitals.add_hunger(gain);
        self.kills += 1;
        gain
    }

    /// Breed with `partner`. Children are placed on shuffled free tiles next to
    /// this agent, as many as `creation_size`, free space and hunger allow.
    /// They are returned for the caller to register.
    pub fn reproduce<R: Rng + ?Sized>(
        &mut self,
        partner: &Agent,
        env: &mut Environment,
        next_id: &mut AgentId,
        config: &Config,
        rng: &mut R,
    ) -> Result<Vec<Agent>> {
        let caps = *self.traits.capabilities();
        let free = env.empty_adjacent(self.location, 1, rng);

        let affordable = if caps.reproduction_cost > 0 {
            ((self.vitals.hunger() - 1) / caps.reproduction_cost).max(0) as usize
        } else {
            usize::MAX
        };
        let litter = (self.traits.genes().creation_size() as usize)
            .min(free.len())
            .min(affordable);

        let mut children = Vec::with_capacity(litter);
        for &loc in free.iter().take(litter) {
            let mut traits = TraitSet::combine(&self.traits, &partner.traits, rng);
            traits.maybe_mutate(&config.genetics, rng);

            let id = *next_id;
            env.place(loc, id)?;
            *next_id += 1;

            let mut child = Agent::with_hunger(
                id,
                traits,
                loc,
                config.organisms.max_health,
                caps.reproduction_cost,
            );
            child.generation = self.generation.max(partner.generation) + 1;
            child.parents = Some((self.id, partner.id));
            children.push(child);
        }

        if !children.is_empty() {
            self.vitals
                .add_hunger(-caps.reproduction_cost.saturating_mul(children.len() as i32));
            self.vitals.start_cooldown(caps.reproduction_cooldown);
            self.offspring_count += children.len() as u32;
        }

        Ok(children)
    }

    fn relocate(&mut self, dest: Location, env: &mut Environment) -> Result<i32> {
        env.relocate(self.location, dest, self.id)?;
        let travelled = self.location.distance(&dest);
        self.location = dest;
        self.vitals
            .add_hunger(-travelled.saturating_mul(self.traits.capabilities().energy_lost_per_tile));
        Ok(travelled)
    }
}

impl Lifecycle for Agent {
    fn perceive(&self, env: &Environment, population: &PopulationRegistry) -> Surroundings {
        Surroundings::scan(env, self.location, self.traits.range(), |id| {
            population
                .get(id)
                .filter(|other| !population.is_marked_dead(other.id))
                .map(Agent::view)
        })
    }

    fn decide<R: Rng + ?Sized>(&self, view: &Surroundings, drives: &Drives, rng: &mut R) -> Action {
        self.strategy.decide(drives, view, rng)
    }

    fn live_day(&mut self) {
        self.vitals.live_day(self.traits.size());
        if self.cause_of_death.is_none() {
            if self.vitals.health() <= 0 {
                self.cause_of_death = Some(DeathCause::Starvation);
            } else if self.vitals.age() >= self.vitals.lifespan() {
                self.cause_of_death = Some(DeathCause::OldAge);
            }
        }
    }

    fn is_dead(&self) -> bool {
        self.cause_of_death.is_some() || self.vitals.is_dead()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{ColorModel, Rgb, SpeciesSeed};
    use crate::grid::FoodSettings;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn traits(kind: SpeciesKind, size: i32, range: i32, creation_size: i32) -> TraitSet {
        TraitSet::from_seed(&SpeciesSeed {
            name: "test".to_string(),
            kind,
            genetic_id: 1,
            spawning_weight: 1.0,
            mutation_chance: 0,
            seed_color: Rgb::new(10, 10, 10),
            color_model: ColorModel::Static,
            random_color_magnitude: 5,
            size,
            range,
            creation_size,
        })
    }

    fn env() -> Environment {
        Environment::new(
            10,
            10,
            FoodSettings {
                min_food: 0,
                max_food: 8,
                regen_amount: 1,
                regen_chance: 0.0,
            },
        )
        .unwrap()
    }

    fn placed(env: &mut Environment, id: AgentId, loc: Location, t: TraitSet) -> Agent {
        env.place(loc, id).unwrap();
        Agent::new(id, t, loc, 100)
    }

    #[test]
    fn test_vitals_clamped() {
        let mut v = VitalStats::new(100, 50, 30, 500);
        assert_eq!(v.hunger(), 100);
        v.add_hunger(-250);
        assert_eq!(v.hunger(), 0);
        v.set_health(-3);
        assert_eq!(v.health(), 0);
        assert!(v.is_dead());
    }

    #[test]
    fn test_live_day_well_fed() {
        let mut v = VitalStats::new(100, 100, 30, 90);
        v.set_health(40);
        v.start_cooldown(2);
        v.live_day(12);

        assert_eq!(v.hunger(), 86);
        assert_eq!(v.age(), 1);
        assert_eq!(v.cooldown(), 1);
        assert_eq!(v.health(), 90);

        v.live_day(12);
        v.live_day(12);
        assert_eq!(v.cooldown(), 0);
        assert_eq!(v.health(), 100);
    }

    #[test]
    fn test_live_day_starving() {
        let mut v = VitalStats::new(100, 100, 30, 10);
        for _ in 0..5 {
            assert!(!v.is_dead());
            v.live_day(30);
        }
        assert_eq!(v.hunger(), 0);
        assert_eq!(v.health(), 0);
        assert!(v.is_dead());
    }

    #[test]
    fn test_old_age() {
        let mut v = VitalStats::new(100, 100, 3, 100);
        v.live_day(1);
        v.live_day(1);
        assert!(!v.is_dead());
        v.live_day(1);
        assert!(v.is_dead());
    }

    #[test]
    fn test_agent_death_cause() {
        let t = traits(SpeciesKind::Prey, 10, 2, 2);
        let mut agent = Agent::with_hunger(1, t, Location::new(0, 0), 100, 0);
        for _ in 0..5 {
            agent.live_day();
        }
        assert!(agent.is_dead());
        assert_eq!(agent.cause_of_death, Some(DeathCause::Starvation));
    }

    #[test]
    fn test_breeding_readiness() {
        let t = traits(SpeciesKind::Prey, 50, 3, 4);
        let caps = *t.capabilities();
        let mut agent = Agent::new(1, t, Location::new(0, 0), 100);
        assert!(!agent.is_mature());
        assert!(!agent.ready_to_breed());

        agent.vitals.set_age(caps.min_breeding_age);
        assert!(agent.ready_to_breed());

        agent.vitals.start_cooldown(1);
        assert!(!agent.ready_to_breed());
        agent.vitals.start_cooldown(0);

        agent.vitals.set_hunger(caps.reproduction_cost);
        assert!(!agent.ready_to_breed());
    }

    #[test]
    fn test_move_toward_prefers_closest_then_shortest() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = traits(SpeciesKind::Prey, 50, 3, 4);
        let mut agent = placed(&mut env, 1, Location::new(2, 2), t);
        let start = agent.vitals.hunger();

        let travelled = agent.move_toward(Location::new(4, 2), &mut env, &mut rng).unwrap();
        assert_eq!(travelled, 2);
        assert_eq!(agent.location(), Location::new(4, 2));
        assert_eq!(env.occupant(Location::new(4, 2)).unwrap(), Some(1));
        assert_eq!(env.occupant(Location::new(2, 2)).unwrap(), None);
        assert_eq!(agent.vitals.hunger(), start - 2 * 15);
    }

    #[test]
    fn test_move_toward_occupied_target_stops_adjacent() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = traits(SpeciesKind::Predator, 20, 4, 1);
        let mut hunter = placed(&mut env, 1, Location::new(0, 0), t.clone());
        env.place(Location::new(3, 0), 2).unwrap();

        hunter.move_toward(Location::new(3, 0), &mut env, &mut rng).unwrap();
        assert!(hunter.location().is_adjacent(&Location::new(3, 0)));
        // minimum travel among the tiles next to the target
        assert_eq!(hunter.location().x, 2);
    }

    #[test]
    fn test_move_toward_no_improvement_stays() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = traits(SpeciesKind::Prey, 20, 2, 1);
        let mut agent = placed(&mut env, 1, Location::new(5, 5), t);
        let hunger = agent.vitals.hunger();

        assert_eq!(agent.move_toward(Location::new(5, 5), &mut env, &mut rng).unwrap(), 0);
        assert_eq!(agent.location(), Location::new(5, 5));
        assert_eq!(agent.vitals.hunger(), hunger);
        assert!(agent.move_toward(Location::new(50, 5), &mut env, &mut rng).is_err());
    }

    #[test]
    fn test_graze_moves_and_eats() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = traits(SpeciesKind::Prey, 50, 3, 4);
        let mut agent = placed(&mut env, 1, Location::new(5, 5), t);
        agent.vitals.set_hunger(100);
        env.set_energy(Location::new(6, 5), 8).unwrap();

        let eaten = agent.graze(Location::new(6, 5), &mut env, 4, &mut rng).unwrap();
        assert_eq!(eaten, 8);
        assert_eq!(agent.location(), Location::new(6, 5));
        assert_eq!(env.tile(Location::new(6, 5)).unwrap().energy, 0);
        assert_eq!(agent.vitals.hunger(), 100 - 15 + 32);
    }

    #[test]
    fn test_graze_onto_occupied_tile_fails() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let t = traits(SpeciesKind::Prey, 20, 2, 1);
        let mut agent = placed(&mut env, 1, Location::new(5, 5), t);
        env.place(Location::new(6, 5), 2).unwrap();

        let err = agent.graze(Location::new(6, 5), &mut env, 4, &mut rng);
        assert_eq!(err, Err(SimError::TileOccupied { x: 6, y: 5 }));
        assert_eq!(agent.location(), Location::new(5, 5));
    }

    #[test]
    fn test_feed_on() {
        let t = traits(SpeciesKind::Predator, 40, 3, 1);
        let mut hunter = Agent::with_hunger(1, t, Location::new(0, 0), 100, 10);
        let prey = Agent::with_hunger(2, traits(SpeciesKind::Prey, 10, 2, 2), Location::new(1, 0), 100, 60);

        let gain = hunter.feed_on(&prey.view(), &PredationConfig::default());
        assert_eq!(gain, 30 + 20);
        assert_eq!(hunter.vitals.hunger(), 60);
        assert_eq!(hunter.kills, 1);
    }

    #[test]
    fn test_reproduce_litter() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = Config::default();
        let t = traits(SpeciesKind::Prey, 50, 3, 4);
        let cost = t.capabilities().reproduction_cost;

        let mut parent = placed(&mut env, 1, Location::new(5, 5), t.clone());
        let partner = placed(&mut env, 2, Location::new(5, 4), t);
        let mut next_id = 10;

        let before = parent.vitals.hunger();
        let children = parent
            .reproduce(&partner, &mut env, &mut next_id, &config, &mut rng)
            .unwrap();

        assert_eq!(children.len(), 4);
        assert_eq!(next_id, 14);
        assert_eq!(parent.vitals.hunger(), before - 4 * cost);
        assert_eq!(parent.vitals.cooldown(), parent.traits.capabilities().reproduction_cooldown);
        for child in &children {
            assert!(child.location().is_adjacent(&Location::new(5, 5)));
            assert_eq!(env.occupant(child.location()).unwrap(), Some(child.id));
            assert_eq!(child.vitals.hunger(), cost);
            assert_eq!(child.vitals.health(), 100);
            assert_eq!(child.vitals.age(), 0);
            assert_eq!(child.generation, 1);
            assert_eq!(child.parents, Some((1, 2)));
        }
    }

    #[test]
    fn test_reproduce_limited_by_hunger_and_space() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = Config::default();
        let t = traits(SpeciesKind::Prey, 50, 3, 4);
        let cost = t.capabilities().reproduction_cost;

        let mut parent = placed(&mut env, 1, Location::new(0, 0), t.clone());
        let partner = placed(&mut env, 2, Location::new(1, 0), t);
        parent.vitals.set_hunger(cost * 2);
        let mut next_id = 10;

        // two free corner tiles, hunger for one child with hunger to spare
        let children = parent
            .reproduce(&partner, &mut env, &mut next_id, &config, &mut rng)
            .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(parent.vitals.hunger(), cost);
    }

    #[test]
    fn test_reproduce_without_space_is_noop() {
        let mut env = env();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let config = Config::default();
        let t = traits(SpeciesKind::Prey, 50, 3, 4);

        let mut parent = placed(&mut env, 1, Location::new(0, 0), t.clone());
        let partner = placed(&mut env, 2, Location::new(1, 0), t);
        env.place(Location::new(0, 1), 3).unwrap();
        env.place(Location::new(1, 1), 4).unwrap();
        let hunger = parent.vitals.hunger();
        let mut next_id = 10;

        let children = parent
            .reproduce(&partner, &mut env, &mut next_id, &config, &mut rng)
            .unwrap();
        assert!(children.is_empty());
        assert_eq!(parent.vitals.hunger(), hunger);
        assert_eq!(parent.vitals.cooldown(), 0);
        assert_eq!(next_id, 10);
    }
}

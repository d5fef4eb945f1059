//! World simulation engine - main simulation loop.

use crate::config::Config;
use crate::error::{Result, SimError};
use crate::genetics::{GeneticId, SpeciesKind, TraitSet};
use crate::grid::{AgentId, Environment, Location};
use crate::organism::{Agent, DeathCause, Lifecycle};
use crate::population::PopulationRegistry;
use crate::stats::{SpeciesStats, Stats, StatsHistory, StepTally};
use crate::strategy::Action;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// The simulation world
pub struct World {
    // Environment
    environment: Environment,

    // Population
    population: PopulationRegistry,

    // State
    pub time: u64,

    // Configuration
    pub config: Config,

    // Statistics
    stats: Stats,
    pub stats_history: StatsHistory,
    tally: StepTally,

    // ID generation
    next_agent_id: AgentId,

    // Random number generator (seeded for reproducibility)
    rng: ChaCha8Rng,
    seed: u64,
}

impl World {
    /// Create a new world with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a new world with a specific seed for reproducibility.
    /// Tiles start with random energy; the world is empty until `populate`.
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut environment = Environment::from_config(&config.world)?;
        environment.seed_energy(&mut rng);

        let mut world = Self {
            environment,
            population: PopulationRegistry::new(),
            time: 0,
            stats: Stats::new(),
            stats_history: StatsHistory::new(config.logging.stats_interval),
            tally: StepTally::default(),
            config,
            next_agent_id: 0,
            rng,
            seed,
        };
        world.update_stats();

        Ok(world)
    }

    /// Clear the grid of agents and place `world.population` new ones on
    /// distinct random tiles, choosing each one's species by spawning weight.
    pub fn populate(&mut self) -> Result<usize> {
        for agent in self.population.iter() {
            self.environment.vacate(agent.location())?;
        }
        self.population.clear();

        let count = self.config.world.population;
        if count == 0 {
            self.update_stats();
            return Ok(0);
        }

        let seeds = &self.config.species;
        let weights = WeightedIndex::new(seeds.iter().map(|s| s.spawning_weight))
            .map_err(|e| SimError::Configuration(format!("spawning weights: {}", e)))?;
        let palette: Vec<TraitSet> = seeds
            .iter()
            .map(|s| TraitSet::from_seed_with(s, self.config.genetics.color_constant))
            .collect();

        let mut free = self.environment.empty_locations();
        if free.len() < count {
            return Err(SimError::Configuration(format!(
                "cannot place {} agents on {} free tiles",
                count,
                free.len()
            )));
        }
        free.shuffle(&mut self.rng);

        for &loc in free.iter().take(count) {
            let traits = palette[weights.sample(&mut self.rng)].clone();
            let id = self.allocate_id();
            self.environment.place(loc, id)?;
            self.population
                .insert(Agent::new(id, traits, loc, self.config.organisms.max_health));
        }

        self.update_stats();
        log::info!("Populated world with {} agents", count);
        for species in &self.stats.species {
            log::info!("  {} ({:?}): {}", species.name, species.kind, species.population);
        }

        Ok(count)
    }

    /// Add one founding agent on an empty tile
    pub fn spawn(&mut self, traits: TraitSet, location: Location) -> Result<AgentId> {
        let id = self.next_agent_id;
        self.environment.place(location, id)?;
        self.next_agent_id += 1;
        self.population
            .insert(Agent::new(id, traits, location, self.config.organisms.max_health));
        Ok(id)
    }

    /// Main simulation step
    pub fn step(&mut self) {
        self.tally.clear();

        // Phase 1: every agent alive at the start of the tick takes a turn
        for id in self.population.ids() {
            if self.population.is_alive(id) {
                self.take_turn(id);
            }
        }

        // Phase 2: remove the dead, commit newborns
        self.settle();

        // Phase 3: environment
        self.environment.regenerate(&mut self.rng);

        self.time += 1;

        // Phase 4: statistics
        self.update_stats();
        log::debug!("{}", self.stats.summary());
    }

    /// Perceive, decide, act, then metabolise
    fn take_turn(&mut self, id: AgentId) {
        let action = match self.population.get(id) {
            Some(agent) => {
                let view = agent.perceive(&self.environment, &self.population);
                let drives = agent.drives(&self.config.organisms, self.environment.food().min_food);
                agent.decide(&view, &drives, &mut self.rng)
            }
            None => return,
        };

        if let Err(e) = self.execute(id, action) {
            log::trace!("agent {} failed {:?}: {}", id, action, e);
        }

        if let Some(agent) = self.population.get_mut(id) {
            agent.live_day();
            if agent.is_dead() {
                self.population.mark_dead(id);
            }
        }
    }

    fn execute(&mut self, id: AgentId, action: Action) -> Result<()> {
        match action {
            Action::Idle => Ok(()),
            Action::MoveToward(target) => {
                if let Some(agent) = self.population.get_mut(id) {
                    agent.move_toward(target, &mut self.environment, &mut self.rng)?;
                }
                Ok(())
            }
            Action::Eat(target) => match self.population.get(id).map(Agent::kind) {
                Some(SpeciesKind::Prey) => {
                    if let Some(agent) = self.population.get_mut(id) {
                        agent.graze(
                            target,
                            &mut self.environment,
                            self.config.organisms.food_value,
                            &mut self.rng,
                        )?;
                    }
                    Ok(())
                }
                Some(SpeciesKind::Predator) => self.hunt(id, target),
                None => Ok(()),
            },
            Action::Reproduce(target) => self.breed(id, target),
        }
    }

    /// Kill the prey on `target` and feed on it
    fn hunt(&mut self, id: AgentId, target: Location) -> Result<()> {
        let (here, genetic_id) = match self.population.get(id) {
            Some(hunter) => (hunter.location(), hunter.genetic_id()),
            None => return Ok(()),
        };
        let prey_id = match self.environment.occupant(target)? {
            Some(prey_id) if prey_id != id => prey_id,
            _ => return Ok(()),
        };
        if !here.is_adjacent(&target) || !self.population.is_alive(prey_id) {
            return Ok(());
        }

        let prey = match self.population.get_mut(prey_id) {
            Some(prey) if prey.kind() == SpeciesKind::Prey && prey.genetic_id() != genetic_id => {
                prey.cause_of_death = Some(DeathCause::Predation);
                prey.view()
            }
            _ => {
                log::trace!("agent {} cannot eat agent {}", id, prey_id);
                return Ok(());
            }
        };

        self.population.mark_dead(prey_id);
        self.tally.kills += 1;
        if let Some(hunter) = self.population.get_mut(id) {
            hunter.feed_on(&prey, &self.config.predation);
        }
        Ok(())
    }

    /// Breed with the agent on `target`; children join at tick end
    fn breed(&mut self, id: AgentId, target: Location) -> Result<()> {
        let partner_id = match self.environment.occupant(target)? {
            Some(partner_id) if partner_id != id && self.population.is_alive(partner_id) => partner_id,
            _ => return Ok(()),
        };
        let partner = match self.population.get(partner_id) {
            Some(partner) => partner.clone(),
            None => return Ok(()),
        };

        let children = match self.population.get_mut(id) {
            Some(parent)
                if parent.ready_to_breed()
                    && partner.is_mature()
                    && partner.genetic_id() == parent.genetic_id()
                    && partner.location().is_adjacent(&parent.location()) =>
            {
                parent.reproduce(
                    &partner,
                    &mut self.environment,
                    &mut self.next_agent_id,
                    &self.config,
                    &mut self.rng,
                )?
            }
            _ => {
                log::trace!("agent {} cannot breed with agent {}", id, partner_id);
                return Ok(());
            }
        };

        for child in children {
            self.tally.birth(child.genetic_id());
            self.population.defer_birth(child);
        }
        Ok(())
    }

    fn settle(&mut self) {
        let settlement = self.population.settle();
        for dead in &settlement.died {
            let loc = dead.location();
            if self.environment.occupant(loc) == Ok(Some(dead.id)) {
                if let Err(e) = self.environment.vacate(loc) {
                    log::trace!("could not clear tile of agent {}: {}", dead.id, e);
                }
            }
            self.tally.death(dead.genetic_id());
            log::trace!(
                "agent {} ({}) died of {:?} at age {}",
                dead.id,
                dead.traits.name,
                dead.cause_of_death,
                dead.vitals.age()
            );
        }
    }

    /// Update statistics
    fn update_stats(&mut self) {
        let before: Vec<(GeneticId, usize)> = self
            .stats
            .species
            .iter()
            .map(|s| (s.genetic_id, s.population))
            .collect();

        self.stats.time = self.time;
        self.stats.update(
            self.population.iter(),
            &self.environment,
            &self.tally,
            &self.config.species,
        );

        for (genetic_id, previous) in before {
            if previous == 0 {
                continue;
            }
            if let Some(now) = self.stats.species(genetic_id) {
                if now.population == 0 {
                    log::info!("step {}: {} has gone extinct", self.time, now.name);
                }
            }
        }

        // Record history
        self.stats_history.maybe_record(&self.stats);
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id += 1;
        id
    }

    /// Run simulation for specified number of steps
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Run simulation with callback for progress updates
    pub fn run_with_callback<F>(&mut self, steps: u64, mut callback: F)
    where
        F: FnMut(&mut World, u64),
    {
        for i in 0..steps {
            self.step();
            callback(self, i);
        }
    }

    pub fn set_food_regen_amount(&mut self, amount: i32) {
        self.environment.set_regen_amount(amount);
    }

    /// Per-tile regrowth probability, clamped into [0, 1]
    pub fn set_food_regen_chance(&mut self, chance: f64) {
        self.environment.set_regen_chance(chance);
    }

    pub fn set_food_bounds(&mut self, min_food: i32, max_food: i32) -> Result<()> {
        self.environment.set_food_bounds(min_food, max_food)
    }

    /// Get current population count
    pub fn population(&self) -> usize {
        self.population.len()
    }

    /// Check if population is extinct
    pub fn is_extinct(&self) -> bool {
        self.population.is_empty()
    }

    /// Statistics as of the last step
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn species_stats(&self, genetic_id: GeneticId) -> Option<&SpeciesStats> {
        self.stats.species(genetic_id)
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Direct grid access for setting up scenarios. Occupancy must stay in
    /// step with the registry.
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Live agents in id order
    pub fn agents(&self) -> impl Iterator<Item = &Agent> + '_ {
        self.population.iter()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.population.get(id)
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.population.get_mut(id)
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

//! Statistics tracking for the simulation.

use crate::genetics::{GeneticId, SpeciesKind, SpeciesSeed};
use crate::grid::Environment;
use crate::organism::Agent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Births, deaths and kills counted during one step
#[derive(Clone, Debug, Default)]
pub struct StepTally {
    pub births: BTreeMap<GeneticId, usize>,
    pub deaths: BTreeMap<GeneticId, usize>,
    pub kills: usize,
}

impl StepTally {
    pub fn birth(&mut self, genetic_id: GeneticId) {
        *self.births.entry(genetic_id).or_insert(0) += 1;
    }

    pub fn death(&mut self, genetic_id: GeneticId) {
        *self.deaths.entry(genetic_id).or_insert(0) += 1;
    }

    pub fn clear(&mut self) {
        self.births.clear();
        self.deaths.clear();
        self.kills = 0;
    }
}

/// Per-species snapshot
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesStats {
    pub genetic_id: GeneticId,
    pub name: String,
    pub kind: SpeciesKind,
    pub population: usize,
    pub hunger_mean: f32,
    pub health_mean: f32,
    pub age_mean: f32,
    pub generation_max: u32,
    /// Births during the last step
    pub births: usize,
    /// Deaths during the last step
    pub deaths: usize,
}

impl SpeciesStats {
    fn empty(genetic_id: GeneticId, name: &str, kind: SpeciesKind) -> Self {
        Self {
            genetic_id,
            name: name.to_string(),
            kind,
            population: 0,
            hunger_mean: 0.0,
            health_mean: 0.0,
            age_mean: 0.0,
            generation_max: 0,
            births: 0,
            deaths: 0,
        }
    }
}

/// Food held by the grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentStats {
    pub max_energy: i64,
    pub current_energy: i64,
    pub percent: f64,
}

impl EnvironmentStats {
    pub fn measure(env: &Environment) -> Self {
        Self {
            max_energy: env.max_energy(),
            current_energy: env.total_energy(),
            percent: env.energy_percent(),
        }
    }
}

/// Statistics snapshot for a simulation step
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Current simulation time
    pub time: u64,
    /// Total population count
    pub population: usize,
    /// Maximum generation reached
    pub generation_max: u32,
    /// Mean hunger across agents
    pub hunger_mean: f32,
    /// Mean health across agents
    pub health_mean: f32,
    /// Mean age across agents
    pub age_mean: f32,
    /// Births this step
    pub births: usize,
    /// Deaths this step
    pub deaths: usize,
    /// Agents killed by predators this step
    pub kills: usize,
    /// One entry per species, by genetic id
    pub species: Vec<SpeciesStats>,
    pub environment: EnvironmentStats,
}

impl Stats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute from the live population. Every configured species gets an
    /// entry, extinct or not.
    pub fn update<'a, I>(&mut self, agents: I, env: &Environment, tally: &StepTally, seeds: &[SpeciesSeed])
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        let mut by_species: BTreeMap<GeneticId, SpeciesStats> = seeds
            .iter()
            .map(|s| (s.genetic_id, SpeciesStats::empty(s.genetic_id, &s.name, s.kind)))
            .collect();

        let (mut hunger, mut health, mut age) = (0i64, 0i64, 0i64);
        self.population = 0;
        self.generation_max = 0;

        for agent in agents {
            let entry = by_species.entry(agent.genetic_id()).or_insert_with(|| {
                SpeciesStats::empty(agent.genetic_id(), &agent.traits.name, agent.kind())
            });
            entry.population += 1;
            // running sums, divided below
            entry.hunger_mean += agent.vitals.hunger() as f32;
            entry.health_mean += agent.vitals.health() as f32;
            entry.age_mean += agent.vitals.age() as f32;
            entry.generation_max = entry.generation_max.max(agent.generation);

            self.population += 1;
            self.generation_max = self.generation_max.max(agent.generation);
            hunger += agent.vitals.hunger() as i64;
            health += agent.vitals.health() as i64;
            age += agent.vitals.age() as i64;
        }

        for (id, entry) in by_species.iter_mut() {
            if entry.population > 0 {
                let n = entry.population as f32;
                entry.hunger_mean /= n;
                entry.health_mean /= n;
                entry.age_mean /= n;
            }
            entry.births = tally.births.get(id).copied().unwrap_or(0);
            entry.deaths = tally.deaths.get(id).copied().unwrap_or(0);
        }

        if self.population > 0 {
            let n = self.population as f32;
            self.hunger_mean = hunger as f32 / n;
            self.health_mean = health as f32 / n;
            self.age_mean = age as f32 / n;
        } else {
            self.hunger_mean = 0.0;
            self.health_mean = 0.0;
            self.age_mean = 0.0;
        }

        self.births = tally.births.values().sum();
        self.deaths = tally.deaths.values().sum();
        self.kills = tally.kills;
        self.species = by_species.into_values().collect();
        self.environment = EnvironmentStats::measure(env);
    }

    pub fn species(&self, genetic_id: GeneticId) -> Option<&SpeciesStats> {
        self.species.iter().find(|s| s.genetic_id == genetic_id)
    }

    /// Save stats to JSON file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load stats from JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        let species: Vec<String> = self
            .species
            .iter()
            .map(|s| format!("{}:{}", s.name, s.population))
            .collect();

        format!(
            "T:{:6} | Pop:{:5} | Gen:{:3} | Hunger:{:.0} | Food:{:.1}% | B/D/K:{}/{}/{} | {}",
            self.time,
            self.population,
            self.generation_max,
            self.hunger_mean,
            self.environment.percent,
            self.births,
            self.deaths,
            self.kills,
            species.join(" ")
        )
    }
}

/// Historical statistics for analysis
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    /// All recorded stats snapshots
    pub snapshots: Vec<Stats>,
    /// Recording interval
    pub interval: u64,
}

impl StatsHistory {
    /// Create new history with recording interval
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval: interval.max(1),
        }
    }

    /// Record a snapshot if `stats.time` falls on the interval. A second
    /// snapshot for the same time replaces the first.
    pub fn maybe_record(&mut self, stats: &Stats) {
        if stats.time % self.interval != 0 {
            return;
        }
        match self.snapshots.last_mut() {
            Some(last) if last.time == stats.time => *last = stats.clone(),
            _ => self.record(stats.clone()),
        }
    }

    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Get population over time
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.time, s.population)).collect()
    }

    /// Population of one species over time
    pub fn species_series(&self, genetic_id: GeneticId) -> Vec<(u64, usize)> {
        self.snapshots
            .iter()
            .map(|s| (s.time, s.species(genetic_id).map_or(0, |sp| sp.population)))
            .collect()
    }

    /// Grid energy percentage over time
    pub fn energy_series(&self) -> Vec<(u64, f64)> {
        self.snapshots.iter().map(|s| (s.time, s.environment.percent)).collect()
    }

    /// Save history to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{ColorModel, Rgb, TraitSet};
    use crate::grid::{FoodSettings, Location};

    fn seed(name: &str, genetic_id: GeneticId, kind: SpeciesKind) -> SpeciesSeed {
        SpeciesSeed {
            name: name.to_string(),
            kind,
            genetic_id,
            spawning_weight: 1.0,
            mutation_chance: 0,
            seed_color: Rgb::new(0, 0, 0),
            color_model: ColorModel::Static,
            random_color_magnitude: 5,
            size: 30,
            range: 2,
            creation_size: 2,
        }
    }

    fn env() -> Environment {
        let mut env = Environment::new(
            4,
            4,
            FoodSettings {
                min_food: 0,
                max_food: 10,
                regen_amount: 1,
                regen_chance: 0.0,
            },
        )
        .unwrap();
        env.set_energy(Location::new(0, 0), 10).unwrap();
        env.set_energy(Location::new(1, 0), 6).unwrap();
        env
    }

    #[test]
    fn test_stats_update() {
        let seeds = vec![seed("grazer", 1, SpeciesKind::Prey), seed("hunter", 2, SpeciesKind::Predator)];
        let grazer = TraitSet::from_seed(&seeds[0]);

        let mut a = Agent::with_hunger(1, grazer.clone(), Location::new(0, 0), 100, 100);
        a.generation = 3;
        let b = Agent::with_hunger(2, grazer, Location::new(1, 0), 100, 200);

        let mut tally = StepTally::default();
        tally.birth(1);
        tally.death(2);
        tally.death(2);
        tally.kills = 2;

        let mut stats = Stats::new();
        stats.update([&a, &b], &env(), &tally, &seeds);

        assert_eq!(stats.population, 2);
        assert_eq!(stats.generation_max, 3);
        assert_eq!(stats.hunger_mean, 150.0);
        assert_eq!(stats.births, 1);
        assert_eq!(stats.deaths, 2);
        assert_eq!(stats.kills, 2);

        let grazers = stats.species(1).unwrap();
        assert_eq!(grazers.population, 2);
        assert_eq!(grazers.births, 1);
        let hunters = stats.species(2).unwrap();
        assert_eq!(hunters.population, 0);
        assert_eq!(hunters.deaths, 2);
        assert_eq!(hunters.hunger_mean, 0.0);

        assert_eq!(stats.environment.max_energy, 160);
        assert_eq!(stats.environment.current_energy, 16);
        assert!((stats.environment.percent - 10.0).abs() < 1e-9);
        assert!(stats.summary().contains("grazer:2"));
    }

    #[test]
    fn test_unconfigured_species_reported() {
        let traits = TraitSet::from_seed(&seed("stray", 9, SpeciesKind::Prey));
        let a = Agent::new(1, traits, Location::new(0, 0), 100);

        let mut stats = Stats::new();
        stats.update([&a], &env(), &StepTally::default(), &[]);
        assert_eq!(stats.species(9).unwrap().name, "stray");
    }

    #[test]
    fn test_stats_history() {
        let mut history = StatsHistory::new(10);

        for i in 0..5 {
            let mut stats = Stats::new();
            stats.time = i * 10;
            stats.population = (i + 1) as usize * 100;
            history.record(stats);
        }

        let series = history.population_series();
        assert_eq!(series.len(), 5);
        assert_eq!(series[0], (0, 100));
        assert_eq!(series[4], (40, 500));
    }

    #[test]
    fn test_history_interval() {
        let mut history = StatsHistory::new(5);
        for t in 0..12 {
            let stats = Stats {
                time: t,
                ..Stats::default()
            };
            history.maybe_record(&stats);
        }
        assert_eq!(history.snapshots.len(), 3);
    }

    #[test]
    fn test_history_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let mut history = StatsHistory::new(1);
        let mut stats = Stats::new();
        stats.time = 7;
        stats.population = 42;
        history.record(stats);
        history.save(&path).unwrap();

        let loaded = StatsHistory::load(&path).unwrap();
        assert_eq!(loaded.population_series(), vec![(7, 42)]);
    }
}

//! Configuration system for the simulation.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::error::{ConfigError, SimError};
use crate::genetics::{ColorModel, MutationConfig, Rgb, SpeciesKind, SpeciesSeed};
use crate::seasons::SeasonsConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub organisms: OrganismConfig,
    #[serde(default)]
    pub predation: PredationConfig,
    #[serde(default)]
    pub genetics: MutationConfig,
    pub species: Vec<SpeciesSeed>,
    #[serde(default)]
    pub seasons: SeasonsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// World/environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Number of agents placed by `populate`
    pub population: usize,
    /// Lower bound of tile energy
    pub min_food: i32,
    /// Upper bound of tile energy
    pub max_food: i32,
    /// Energy added to a tile when it regrows
    pub food_regen_amount: i32,
    /// Per-tile, per-tick regrowth probability (0.0 - 1.0)
    pub food_regen_chance: f64,
}

/// Vital stats and feeding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganismConfig {
    /// Health of a newborn or freshly spawned agent
    pub max_health: i32,
    /// Hunger gained per unit of tile energy eaten
    pub food_value: i32,
    /// Minimum tile energy worth walking to
    pub graze_threshold: i32,
}

/// Predation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredationConfig {
    /// Fraction of the victim's stored hunger gained
    pub stored_energy_fraction: f64,
    /// Hunger gained per unit of victim size
    pub size_energy_multiplier: i32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Steps between stats logging
    pub stats_interval: u64,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            organisms: OrganismConfig::default(),
            predation: PredationConfig::default(),
            genetics: MutationConfig::default(),
            species: default_species(),
            seasons: SeasonsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            population: 600,
            min_food: 0,
            max_food: 8,
            food_regen_amount: 8,
            food_regen_chance: 0.3,
        }
    }
}

impl Default for OrganismConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            food_value: 4,
            graze_threshold: 1,
        }
    }
}

impl Default for PredationConfig {
    fn default() -> Self {
        Self {
            stored_energy_fraction: 0.5,
            size_energy_multiplier: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stats_interval: 50,
            log_level: "info".to_string(),
        }
    }
}

/// Two grazing prey species and one hunter
fn default_species() -> Vec<SpeciesSeed> {
    vec![
        SpeciesSeed {
            name: "grazer".to_string(),
            kind: SpeciesKind::Prey,
            genetic_id: 1,
            spawning_weight: 0.45,
            mutation_chance: 10,
            seed_color: Rgb::new(40, 160, 60),
            color_model: ColorModel::Attributes,
            random_color_magnitude: 5,
            size: 12,
            range: 2,
            creation_size: 3,
        },
        SpeciesSeed {
            name: "forager".to_string(),
            kind: SpeciesKind::Prey,
            genetic_id: 2,
            spawning_weight: 0.40,
            mutation_chance: 10,
            seed_color: Rgb::new(60, 90, 200),
            color_model: ColorModel::Random,
            random_color_magnitude: 5,
            size: 20,
            range: 3,
            creation_size: 2,
        },
        SpeciesSeed {
            name: "hunter".to_string(),
            kind: SpeciesKind::Predator,
            genetic_id: 3,
            spawning_weight: 0.15,
            mutation_chance: 5,
            seed_color: Rgb::new(200, 40, 40),
            color_model: ColorModel::Static,
            random_color_magnitude: 5,
            size: 30,
            range: 4,
            creation_size: 1,
        },
    ]
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), SimError> {
        let invalid = |msg: String| -> Result<(), SimError> { Err(SimError::Configuration(msg)) };

        if self.world.width == 0 || self.world.height == 0 {
            return invalid("grid width and height must be > 0".to_string());
        }
        if self.world.min_food < 0 || self.world.min_food > self.world.max_food {
            return invalid("food bounds must satisfy 0 <= min_food <= max_food".to_string());
        }
        let tiles = match self.world.width.checked_mul(self.world.height) {
            Some(tiles) => tiles,
            None => {
                return invalid(format!(
                    "grid {}x{} is too large",
                    self.world.width, self.world.height
                ))
            }
        };
        if self.world.population > tiles {
            return invalid(format!(
                "population {} does not fit on a {}x{} grid",
                self.world.population, self.world.width, self.world.height
            ));
        }
        if self.organisms.max_health <= 0 {
            return invalid("max_health must be > 0".to_string());
        }
        if self.world.population > 0 && self.species.is_empty() {
            return invalid("at least one species is required to populate".to_string());
        }

        let mut ids = HashSet::new();
        for seed in &self.species {
            if !ids.insert(seed.genetic_id) {
                return invalid(format!("duplicate genetic id {}", seed.genetic_id));
            }
            if !seed.spawning_weight.is_finite() || seed.spawning_weight < 0.0 {
                return invalid(format!("species '{}' has an invalid spawning weight", seed.name));
            }
        }
        if self.world.population > 0 && self.species.iter().all(|s| s.spawning_weight == 0.0) {
            return invalid("at least one species needs a positive spawning weight".to_string());
        }

        Ok(())
    }
}

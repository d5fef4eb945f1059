//! # TILELIFE
//!
//! Grid-based predator/prey artificial-life simulator.
//!
//! ## Features
//!
//! - **Ecological**: grazing prey, hunting predators, regrowing food
//! - **Heritable**: size, range and litter size pass to offspring and mutate
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: one seeded random stream drives every decision
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tilelife::{World, Config};
//!
//! // Create world with default config
//! let mut world = World::new(Config::default()).unwrap();
//! world.populate().unwrap();
//!
//! // Run simulation
//! world.run(1000);
//!
//! // Check results
//! println!("Population: {}", world.population());
//! println!("{}", world.stats().summary());
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use tilelife::Config;
//!
//! let mut config = Config::default();
//! config.world.population = 200;
//! config.world.food_regen_chance = 0.1;
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Seasons
//!
//! ```rust,no_run
//! use tilelife::{Config, World};
//! use tilelife::seasons::{SeasonalSchedule, SeasonsConfig};
//!
//! let mut world = World::new_with_seed(Config::default(), 7).unwrap();
//! world.populate().unwrap();
//!
//! let seasons = SeasonsConfig { enabled: true, ..SeasonsConfig::default() };
//! let mut schedule = SeasonalSchedule::for_world(seasons, &world);
//! schedule.apply(&mut world);
//! for _ in 0..1000 {
//!     world.step();
//!     schedule.advance(&mut world);
//! }
//! ```

pub mod config;
pub mod error;
pub mod genetics;
pub mod grid;
pub mod organism;
pub mod perception;
pub mod population;
pub mod seasons;
pub mod stats;
pub mod strategy;
pub mod world;

// Re-export main types
pub use config::Config;
pub use error::{ConfigError, SimError};
pub use genetics::{SpeciesKind, TraitSet};
pub use grid::{AgentId, Environment, Location};
pub use organism::{Agent, Lifecycle};
pub use strategy::Action;
pub use world::World;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(steps: u64, population: usize) -> error::Result<BenchmarkResult> {
    use std::time::Instant;

    let mut config = Config::default();
    config.world.population = population;

    let mut world = World::new(config)?;
    world.populate()?;

    let start = Instant::now();
    world.run(steps);
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        steps,
        initial_population: population,
        final_population: world.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        steps_per_second: steps as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        max_generation: world.stats().generation_max,
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub steps: u64,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub steps_per_second: f64,
    pub max_generation: u32,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Steps: {}", self.steps)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} steps/s", self.steps_per_second)?;
        writeln!(f, "Max generation: {}", self.max_generation)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut config = Config::default();
        config.world.width = 40;
        config.world.height = 40;
        config.world.population = 100;
        let mut world = World::new(config).unwrap();
        world.populate().unwrap();

        world.run(100);

        assert_eq!(world.time, 100);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(20, 50).unwrap();

        assert_eq!(result.steps, 20);
        assert!(result.steps_per_second > 0.0);
        assert!(result.to_string().contains("Benchmark"));
    }
}

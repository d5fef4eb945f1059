//! Seasonal food schedule.
//!
//! Seasons live outside the core: a [`SeasonalSchedule`] is advanced by the
//! driver after every step and only touches the world through its public
//! regeneration setters.

use crate::world::World;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The four seasons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Position within the year, starting at 0 for spring
    pub fn index(&self) -> u32 {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    pub fn next(&self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

/// Seasons configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonsConfig {
    pub enabled: bool,
    /// Minimum ticks per season
    pub season_length: u64,
    /// Up to this many extra ticks are added to each season at random
    pub length_jitter: u64,
    /// Extra ticks per season index, so winter runs longest
    pub season_growth: u64,
    /// Regen amount at the start of every year
    pub base_regen_amount: i32,
    /// Regen amount lost at the end of each season
    pub regen_amount_step: i32,
    /// Yearly probability that regen chance drops
    pub drought_probability: f64,
    pub drought_drop: f64,
    pub recovery_rise: f64,
}

impl Default for SeasonsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            season_length: 71,
            length_jitter: 100,
            season_growth: 10,
            base_regen_amount: 8,
            regen_amount_step: 1,
            drought_probability: 0.2,
            drought_drop: 0.11,
            recovery_rise: 0.02,
        }
    }
}

/// Emitted when a season ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeasonChange {
    pub year: u64,
    pub season: Season,
    pub regen_amount: i32,
    pub regen_chance: f64,
}

/// Drives regen amount and chance through the year
#[derive(Clone, Debug)]
pub struct SeasonalSchedule {
    config: SeasonsConfig,
    season: Season,
    year: u64,
    remaining: u64,
    regen_amount: i32,
    regen_chance: f64,
    rng: ChaCha8Rng,
}

impl SeasonalSchedule {
    pub fn new(config: SeasonsConfig, initial_chance: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let remaining = season_ticks(&config, Season::Spring, &mut rng);
        Self {
            regen_amount: config.base_regen_amount,
            regen_chance: initial_chance.clamp(0.0, 1.0),
            config,
            season: Season::Spring,
            year: 0,
            remaining,
            rng,
        }
    }

    /// Schedule matching a world's current regeneration settings
    pub fn for_world(config: SeasonsConfig, world: &World) -> Self {
        let chance = world.environment().food().regen_chance;
        // separate stream so the schedule never perturbs the world's rng
        Self::new(config, chance, world.seed().wrapping_add(1))
    }

    #[inline]
    pub fn season(&self) -> Season {
        self.season
    }

    #[inline]
    pub fn year(&self) -> u64 {
        self.year
    }

    #[inline]
    pub fn regen_amount(&self) -> i32 {
        self.regen_amount
    }

    #[inline]
    pub fn regen_chance(&self) -> f64 {
        self.regen_chance
    }

    /// Apply the starting values to the world
    pub fn apply(&self, world: &mut World) {
        if self.config.enabled {
            world.set_food_regen_amount(self.regen_amount);
            world.set_food_regen_chance(self.regen_chance);
        }
    }

    /// Count one finished step. Returns the change when a season ends.
    pub fn advance(&mut self, world: &mut World) -> Option<SeasonChange> {
        if !self.config.enabled {
            return None;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }

        self.regen_amount -= self.config.regen_amount_step;
        self.season = self.season.next();

        if self.season == Season::Spring {
            self.year += 1;
            self.regen_amount = self.config.base_regen_amount;
            let drought = self.rng.gen_bool(self.config.drought_probability.clamp(0.0, 1.0));
            let delta = if drought {
                -self.config.drought_drop
            } else {
                self.config.recovery_rise
            };
            self.regen_chance = (self.regen_chance + delta).clamp(0.0, 1.0);
        }

        self.apply(world);
        self.remaining = season_ticks(&self.config, self.season, &mut self.rng);

        log::info!(
            "Year {} {}: regen amount {}, regen chance {:.2}",
            self.year,
            self.season.name(),
            self.regen_amount,
            self.regen_chance
        );

        Some(SeasonChange {
            year: self.year,
            season: self.season,
            regen_amount: self.regen_amount,
            regen_chance: self.regen_chance,
        })
    }
}

fn season_ticks<R: Rng + ?Sized>(config: &SeasonsConfig, season: Season, rng: &mut R) -> u64 {
    let jitter = if config.length_jitter > 0 {
        rng.gen_range(0..config.length_jitter)
    } else {
        0
    };
    (config.season_length + jitter + config.season_growth * season.index() as u64).max(1)
}

//! Trait sets: base genes, derived capabilities, combination and mutation.

use crate::genetics::color::{ColorModel, Rgb};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Genetic identifier. Agents sharing one breed together and never prey on each other.
pub type GeneticId = u32;

pub const SIZE_MIN: i32 = 1;
pub const SIZE_MAX: i32 = 101;
pub const RANGE_MIN: i32 = 1;
pub const RANGE_MAX: i32 = 6;
pub const CREATION_SIZE_MIN: i32 = 1;
pub const CREATION_SIZE_MAX: i32 = 9;

/// Scale applied to gene closeness when tinting the seed colour
pub const DEFAULT_COLOR_CONSTANT: i32 = 125;

/// Species tag; selects the decision strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesKind {
    Prey,
    Predator,
}

/// The three heritable base genes. Always clamped on write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genes {
    size: i32,
    range: i32,
    creation_size: i32,
}

impl Genes {
    pub fn new(size: i32, range: i32, creation_size: i32) -> Self {
        Self {
            size: size.clamp(SIZE_MIN, SIZE_MAX),
            range: range.clamp(RANGE_MIN, RANGE_MAX),
            creation_size: creation_size.clamp(CREATION_SIZE_MIN, CREATION_SIZE_MAX),
        }
    }

    #[inline]
    pub fn size(&self) -> i32 {
        self.size
    }

    #[inline]
    pub fn range(&self) -> i32 {
        self.range
    }

    #[inline]
    pub fn creation_size(&self) -> i32 {
        self.creation_size
    }

    pub fn set_size(&mut self, size: i32) {
        self.size = size.clamp(SIZE_MIN, SIZE_MAX);
    }

    pub fn set_range(&mut self, range: i32) {
        self.range = range.clamp(RANGE_MIN, RANGE_MAX);
    }

    pub fn set_creation_size(&mut self, creation_size: i32) {
        self.creation_size = creation_size.clamp(CREATION_SIZE_MIN, CREATION_SIZE_MAX);
    }

    /// Closeness of each gene to its maximum, as (size, creation_size, range)
    pub fn closeness(&self) -> (f64, f64, f64) {
        (
            self.size as f64 / (SIZE_MAX - SIZE_MIN) as f64,
            self.creation_size as f64 / (CREATION_SIZE_MAX - CREATION_SIZE_MIN) as f64,
            self.range as f64 / (RANGE_MAX - RANGE_MIN) as f64,
        )
    }
}

/// Capabilities computed from `size` and `creation_size`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Maximum hunger the agent can store
    pub energy_capacity: i32,
    /// Hunger spent per tile moved
    pub energy_lost_per_tile: i32,
    /// Most tile energy taken in one meal
    pub eat_amount: i32,
    pub lifespan: i32,
    pub min_breeding_age: i32,
    /// Hunger paid per child, and each child's starting hunger
    pub reproduction_cost: i32,
    /// Ticks between reproductions
    pub reproduction_cooldown: i32,
}

impl Capabilities {
    pub fn derive(genes: &Genes) -> Self {
        let s = genes.size() as f64;
        let energy_capacity = genes.size() * 10;
        let lifespan = 25 + s.powf(1.1).round() as i32;

        Self {
            energy_capacity,
            energy_lost_per_tile: s.powf(0.70).round() as i32,
            eat_amount: s.powf(0.5).round() as i32 * 2,
            lifespan,
            min_breeding_age: lifespan / 5,
            reproduction_cost: (energy_capacity / 2) / genes.creation_size(),
            reproduction_cooldown: s.powf(0.5).round() as i32,
        }
    }
}

/// Seed parameters for one species
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeciesSeed {
    pub name: String,
    pub kind: SpeciesKind,
    pub genetic_id: GeneticId,
    /// Relative share of the initial population
    pub spawning_weight: f64,
    /// Percent chance (0-100) that a newborn's genes mutate
    pub mutation_chance: u8,
    pub seed_color: Rgb,
    #[serde(default)]
    pub color_model: ColorModel,
    #[serde(default = "default_color_magnitude")]
    pub random_color_magnitude: u8,
    pub size: i32,
    pub range: i32,
    pub creation_size: i32,
}

fn default_color_magnitude() -> u8 {
    5
}

/// Mutation step sizes applied to a newborn's genes
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct MutationConfig {
    pub size_step: i32,
    pub range_step: i32,
    pub creation_size_step: i32,
    pub color_constant: i32,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            size_step: 5,
            range_step: 1,
            creation_size_step: 1,
            color_constant: DEFAULT_COLOR_CONSTANT,
        }
    }
}

/// An agent's full genetic configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TraitSet {
    pub kind: SpeciesKind,
    pub name: String,
    pub genetic_id: GeneticId,
    pub spawning_weight: f64,
    pub mutation_chance: u8,
    pub color_model: ColorModel,
    pub random_color_magnitude: u8,
    pub seed_color: Rgb,
    pub mutating_color: Rgb,
    genes: Genes,
    capabilities: Capabilities,
}

impl TraitSet {
    /// Build the trait set of an initial-population agent
    pub fn from_seed(seed: &SpeciesSeed) -> Self {
        Self::from_seed_with(seed, DEFAULT_COLOR_CONSTANT)
    }

    pub fn from_seed_with(seed: &SpeciesSeed, color_constant: i32) -> Self {
        let genes = Genes::new(seed.size, seed.range, seed.creation_size);
        let mut traits = Self {
            kind: seed.kind,
            name: seed.name.clone(),
            genetic_id: seed.genetic_id,
            spawning_weight: seed.spawning_weight,
            mutation_chance: seed.mutation_chance.min(100),
            color_model: seed.color_model,
            random_color_magnitude: seed.random_color_magnitude,
            seed_color: seed.seed_color,
            mutating_color: Rgb::WHITE,
            capabilities: Capabilities::derive(&genes),
            genes,
        };
        traits.retint(color_constant);
        traits
    }

    /// Combine two parents. Identity fields come from `a`; colours and genes are
    /// each taken whole from `a` or `b` on a fair coin, never blended.
    pub fn combine<R: Rng + ?Sized>(a: &TraitSet, b: &TraitSet, rng: &mut R) -> Self {
        let genes = Genes::new(
            pick(a.genes.size, b.genes.size, rng),
            pick(a.genes.range, b.genes.range, rng),
            pick(a.genes.creation_size, b.genes.creation_size, rng),
        );

        let mut child = Self {
            kind: a.kind,
            name: a.name.clone(),
            genetic_id: a.genetic_id,
            spawning_weight: a.spawning_weight,
            mutation_chance: a.mutation_chance,
            color_model: a.color_model,
            random_color_magnitude: a.random_color_magnitude,
            seed_color: pick(a.seed_color, b.seed_color, rng),
            mutating_color: pick(a.mutating_color, b.mutating_color, rng),
            capabilities: Capabilities::derive(&genes),
            genes,
        };

        if child.color_model == ColorModel::Random {
            child.seed_color = child.seed_color.drift(child.random_color_magnitude, rng);
        }

        child
    }

    /// Roll `mutation_chance` and, on success, nudge each gene. Returns whether it mutated.
    pub fn maybe_mutate<R: Rng + ?Sized>(&mut self, config: &MutationConfig, rng: &mut R) -> bool {
        if self.mutation_chance == 0 || rng.gen_range(0..100) >= self.mutation_chance as u32 {
            return false;
        }

        let mut genes = self.genes;
        genes.set_size(genes.size() + step(config.size_step, rng));
        genes.set_range(genes.range() + step(config.range_step, rng));
        genes.set_creation_size(genes.creation_size() + step(config.creation_size_step, rng));
        self.set_genes(genes);
        self.retint(config.color_constant);
        true
    }

    /// Replace the genes and recompute everything derived from them
    pub fn set_genes(&mut self, genes: Genes) {
        self.genes = genes;
        self.capabilities = Capabilities::derive(&genes);
    }

    /// Recompute the mutating colour from the seed colour and the genes.
    /// Red follows size, green creation size, blue range.
    pub fn retint(&mut self, color_constant: i32) {
        let (size, creation, range) = self.genes.closeness();
        let c = color_constant as f64;
        self.mutating_color = self.seed_color.wrapped_offset(
            (size * c) as i32,
            (creation * c) as i32,
            (range * c) as i32,
        );
    }

    /// Colour an observer should draw this agent with
    pub fn display_color(&self) -> Rgb {
        match self.color_model {
            ColorModel::Attributes if self.mutation_chance > 0 => self.mutating_color,
            _ => self.seed_color,
        }
    }

    #[inline]
    pub fn genes(&self) -> &Genes {
        &self.genes
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    #[inline]
    pub fn size(&self) -> i32 {
        self.genes.size()
    }

    #[inline]
    pub fn range(&self) -> i32 {
        self.genes.range()
    }
}

#[inline]
fn pick<T, R: Rng + ?Sized>(a: T, b: T, rng: &mut R) -> T {
    if rng.gen_bool(0.5) {
        a
    } else {
        b
    }
}

#[inline]
fn step<R: Rng + ?Sized>(magnitude: i32, rng: &mut R) -> i32 {
    if magnitude <= 0 {
        0
    } else {
        rng.gen_range(-magnitude..=magnitude)
    }
}

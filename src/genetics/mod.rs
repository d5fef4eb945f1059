//! Genetics module - trait inheritance, mutation, and colour genetics.

pub mod color;
pub mod traits;

pub use color::{overflow255, ColorModel, Rgb};
pub use traits::{
    Capabilities, Genes, GeneticId, MutationConfig, SpeciesKind, SpeciesSeed, TraitSet,
};

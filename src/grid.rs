//! Tile grid: occupancy, regenerating energy, and neighbour queries.

use crate::config::WorldConfig;
use crate::error::{Result, SimError};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique agent identifier
pub type AgentId = u64;

/// A grid coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, the metric used for vision and movement
    #[inline]
    pub fn distance(&self, other: &Location) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    #[inline]
    pub fn is_adjacent(&self, other: &Location) -> bool {
        self.distance(other) == 1
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One grid cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub energy: i32,
    pub occupant: Option<AgentId>,
}

impl Tile {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }
}

/// Food bounds and regeneration parameters
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodSettings {
    pub min_food: i32,
    pub max_food: i32,
    pub regen_amount: i32,
    /// Per-tile, per-tick probability in [0, 1]
    pub regen_chance: f64,
}

/// The world grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Environment {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    food: FoodSettings,
}

impl Environment {
    /// Create an environment with every tile at `min_food`
    pub fn new(width: usize, height: usize, food: FoodSettings) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::Configuration(format!(
                "grid must be at least 1x1, got {}x{}",
                width, height
            )));
        }
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(SimError::Configuration("grid dimensions too large".to_string()));
        }
        validate_food_bounds(food.min_food, food.max_food)?;
        let tile_count = width.checked_mul(height).ok_or_else(|| {
            SimError::Configuration(format!("grid {}x{} is too large", width, height))
        })?;

        let food = FoodSettings {
            regen_chance: sanitize_chance(food.regen_chance),
            ..food
        };

        Ok(Self {
            width,
            height,
            tiles: vec![
                Tile {
                    energy: food.min_food,
                    occupant: None
                };
                tile_count
            ],
            food,
        })
    }

    pub fn from_config(config: &WorldConfig) -> Result<Self> {
        Self::new(
            config.width,
            config.height,
            FoodSettings {
                min_food: config.min_food,
                max_food: config.max_food,
                regen_amount: config.food_regen_amount,
                regen_chance: config.food_regen_chance,
            },
        )
    }

    /// Fill every tile with a uniform random energy in [min_food, max_food]
    pub fn seed_energy<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (lo, hi) = (self.food.min_food, self.food.max_food);
        for tile in &mut self.tiles {
            tile.energy = rng.gen_range(lo..=hi);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn food(&self) -> &FoodSettings {
        &self.food
    }

    #[inline]
    pub fn contains(&self, loc: Location) -> bool {
        loc.x >= 0 && loc.y >= 0 && (loc.x as usize) < self.width && (loc.y as usize) < self.height
    }

    #[inline]
    fn index(&self, loc: Location) -> Result<usize> {
        if self.contains(loc) {
            Ok(loc.y as usize * self.width + loc.x as usize)
        } else {
            Err(SimError::Bounds {
                x: loc.x,
                y: loc.y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn tile(&self, loc: Location) -> Result<&Tile> {
        let idx = self.index(loc)?;
        Ok(&self.tiles[idx])
    }

    #[inline]
    pub fn occupant(&self, loc: Location) -> Result<Option<AgentId>> {
        Ok(self.tile(loc)?.occupant)
    }

    #[inline]
    pub fn is_empty(&self, loc: Location) -> bool {
        self.tile(loc).map(Tile::is_empty).unwrap_or(false)
    }

    /// Overwrite a tile's occupant without any occupancy check
    pub fn set_occupant(&mut self, loc: Location, occupant: Option<AgentId>) -> Result<()> {
        let idx = self.index(loc)?;
        self.tiles[idx].occupant = occupant;
        Ok(())
    }

    /// Put an agent on an empty tile
    pub fn place(&mut self, loc: Location, id: AgentId) -> Result<()> {
        let idx = self.index(loc)?;
        if self.tiles[idx].occupant.is_some() {
            return Err(SimError::TileOccupied { x: loc.x, y: loc.y });
        }
        self.tiles[idx].occupant = Some(id);
        Ok(())
    }

    /// Move an agent between tiles. Both tiles are validated before either is written.
    pub fn relocate(&mut self, from: Location, to: Location, id: AgentId) -> Result<()> {
        let src = self.index(from)?;
        let dst = self.index(to)?;
        if src == dst {
            return Ok(());
        }
        if self.tiles[dst].occupant.is_some() {
            return Err(SimError::TileOccupied { x: to.x, y: to.y });
        }
        self.tiles[dst].occupant = Some(id);
        self.tiles[src].occupant = None;
        Ok(())
    }

    /// Clear a tile's occupant
    pub fn vacate(&mut self, loc: Location) -> Result<()> {
        self.set_occupant(loc, None)
    }

    /// Take up to `max_amount` energy from a tile, never dropping below `min_food`.
    /// Returns the amount taken.
    pub fn consume(&mut self, loc: Location, max_amount: i32) -> Result<i32> {
        let idx = self.index(loc)?;
        let min_food = self.food.min_food;
        let tile = &mut self.tiles[idx];
        let available = (tile.energy - min_food).max(0);
        let taken = available.min(max_amount.max(0));
        tile.energy -= taken;
        Ok(taken)
    }

    /// Set a tile's energy, clamped to the food bounds
    pub fn set_energy(&mut self, loc: Location, energy: i32) -> Result<()> {
        let idx = self.index(loc)?;
        self.tiles[idx].energy = energy.clamp(self.food.min_food, self.food.max_food);
        Ok(())
    }

    /// In-bounds locations within a Chebyshev radius, centre included, row by row
    pub fn locations_within(&self, center: Location, radius: i32) -> impl Iterator<Item = Location> + '_ {
        let radius = radius.max(0);
        let x_min = (center.x - radius).max(0);
        let x_max = (center.x + radius).min(self.width as i32 - 1);
        let y_min = (center.y - radius).max(0);
        let y_max = (center.y + radius).min(self.height as i32 - 1);

        (y_min..=y_max).flat_map(move |y| (x_min..=x_max).map(move |x| Location::new(x, y)))
    }

    /// Unoccupied tiles within `radius` of `center` (centre excluded), shuffled
    pub fn empty_adjacent<R: Rng + ?Sized>(
        &self,
        center: Location,
        radius: i32,
        rng: &mut R,
    ) -> Vec<Location> {
        let mut empties: Vec<Location> = self
            .locations_within(center, radius)
            .filter(|&loc| loc != center && self.is_empty(loc))
            .collect();
        empties.shuffle(rng);
        empties
    }

    /// Every empty tile on the grid, in row order
    pub fn empty_locations(&self) -> Vec<Location> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_empty())
            .map(|(i, _)| Location::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    /// Stochastic regrowth: each tile independently gains `regen_amount`
    /// with probability `regen_chance`
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let FoodSettings {
            min_food,
            max_food,
            regen_amount,
            regen_chance,
        } = self.food;

        if regen_chance <= 0.0 {
            return;
        }

        for tile in &mut self.tiles {
            if rng.gen_bool(regen_chance) {
                tile.energy = tile.energy.saturating_add(regen_amount).clamp(min_food, max_food);
            }
        }
    }

    pub fn set_regen_amount(&mut self, amount: i32) {
        self.food.regen_amount = amount;
    }

    /// Set the per-tile regrowth probability, clamped into [0, 1]
    pub fn set_regen_chance(&mut self, chance: f64) {
        self.food.regen_chance = sanitize_chance(chance);
    }

    /// Change the food bounds and pull every tile back inside them
    pub fn set_food_bounds(&mut self, min_food: i32, max_food: i32) -> Result<()> {
        validate_food_bounds(min_food, max_food)?;
        self.food.min_food = min_food;
        self.food.max_food = max_food;
        for tile in &mut self.tiles {
            tile.energy = tile.energy.clamp(min_food, max_food);
        }
        Ok(())
    }

    /// Sum of energy over all tiles
    pub fn total_energy(&self) -> i64 {
        self.tiles.iter().map(|t| t.energy as i64).sum()
    }

    /// Energy held if every tile were full
    pub fn max_energy(&self) -> i64 {
        self.food.max_food as i64 * self.tiles.len() as i64
    }

    /// Current energy as a percentage of the maximum
    pub fn energy_percent(&self) -> f64 {
        let max = self.max_energy();
        if max <= 0 {
            0.0
        } else {
            100.0 * self.total_energy() as f64 / max as f64
        }
    }

    /// Number of occupied tiles
    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_empty()).count()
    }
}

#[inline]
fn sanitize_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn validate_food_bounds(min_food: i32, max_food: i32) -> Result<()> {
    if min_food < 0 || min_food > max_food {
        return Err(SimError::Configuration(format!(
            "food bounds must satisfy 0 <= min <= max, got [{}, {}]",
            min_food, max_food
        )));
    }
    Ok(())
}

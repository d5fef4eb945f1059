//! What an agent can see: tiles and occupants within its vision radius.
//!
//! Vision uses the Chebyshev metric, the same one used for movement and
//! adjacency, so anything an agent can see it can also reach in one move.

use crate::genetics::{GeneticId, SpeciesKind};
use crate::grid::{AgentId, Environment, Location};

/// The parts of another agent that a neighbour can observe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OccupantView {
    pub id: AgentId,
    pub location: Location,
    pub kind: SpeciesKind,
    pub genetic_id: GeneticId,
    pub size: i32,
    pub hunger: i32,
    /// Old enough to breed
    pub mature: bool,
}

/// One visible tile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerceivedTile {
    pub location: Location,
    pub energy: i32,
    /// Something stands here, even if it is no longer a valid target
    pub occupied: bool,
    pub occupant: Option<OccupantView>,
}

/// Everything visible from one location
#[derive(Clone, Debug)]
pub struct Surroundings {
    origin: Location,
    radius: i32,
    tiles: Vec<PerceivedTile>,
}

impl Surroundings {
    /// Scan the grid around `origin`. `lookup` resolves occupant ids; agents it
    /// does not resolve (for example ones already killed this tick) still block
    /// their tile but are not reported.
    pub fn scan<F>(env: &Environment, origin: Location, radius: i32, lookup: F) -> Self
    where
        F: Fn(AgentId) -> Option<OccupantView>,
    {
        let tiles = env
            .locations_within(origin, radius)
            .filter_map(|loc| {
                let tile = env.tile(loc).ok()?;
                Some(PerceivedTile {
                    location: loc,
                    energy: tile.energy,
                    occupied: tile.occupant.is_some(),
                    occupant: tile.occupant.and_then(&lookup),
                })
            })
            .collect();

        Self {
            origin,
            radius,
            tiles,
        }
    }

    #[inline]
    pub fn origin(&self) -> Location {
        self.origin
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn tiles(&self) -> &[PerceivedTile] {
        &self.tiles
    }

    pub fn at(&self, loc: Location) -> Option<&PerceivedTile> {
        self.tiles.iter().find(|t| t.location == loc)
    }

    /// Visible agents other than the observer
    pub fn others(&self) -> impl Iterator<Item = &OccupantView> + '_ {
        self.tiles
            .iter()
            .filter(move |t| t.location != self.origin)
            .filter_map(|t| t.occupant.as_ref())
    }

    /// Visible unoccupied tiles within `radius` of the observer
    pub fn free_within(&self, radius: i32) -> Vec<Location> {
        self.tiles
            .iter()
            .filter(|t| !t.occupied && t.location.distance(&self.origin) <= radius)
            .map(|t| t.location)
            .collect()
    }
}

//! Error types for grid access and configuration.

use thiserror::Error;

/// Errors raised by tile operations and world construction.
///
/// None of these halt a tick: a failed agent action degrades to idling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Tile access outside the grid
    #[error("location ({x}, {y}) is outside the {width}x{height} grid")]
    Bounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// Attempted move or spawn onto an occupied tile
    #[error("tile ({x}, {y}) is already occupied")]
    TileOccupied { x: i32, y: i32 },

    /// Invalid grid dimensions, food bounds or species setup
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Errors that can occur while loading or saving a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

pub type Result<T> = std::result::Result<T, SimError>;

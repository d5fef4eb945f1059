//! Colour genetics: wraparound channel arithmetic and gene-driven tinting.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Adds two channel values and wraps the result back into 0-255.
///
/// Sums above 255 lose 255, sums below zero gain 255.
#[inline]
pub fn overflow255(a: i32, b: i32) -> i32 {
    let sum = a + b;
    if sum > 255 {
        sum - 255
    } else if sum < 0 {
        255 + sum
    } else {
        sum
    }
}

/// An RGB colour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Offset every channel, wrapping each one independently
    pub fn wrapped_offset(self, dr: i32, dg: i32, db: i32) -> Self {
        Self {
            r: wrap_channel(self.r, dr),
            g: wrap_channel(self.g, dg),
            b: wrap_channel(self.b, db),
        }
    }

    /// Random drift of up to `magnitude - 1` per channel
    pub fn drift<R: Rng + ?Sized>(self, magnitude: u8, rng: &mut R) -> Self {
        if magnitude == 0 {
            return self;
        }
        let m = magnitude as i32;
        self.wrapped_offset(rng.gen_range(0..m), rng.gen_range(0..m), rng.gen_range(0..m))
    }

    /// Hex string such as `#1f8a3c`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

#[inline]
fn wrap_channel(channel: u8, delta: i32) -> u8 {
    // deltas beyond +/-255 need a second fold
    overflow255(channel as i32, delta).rem_euclid(256) as u8
}

/// How an agent's display colour is chosen
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorModel {
    /// Always show the seed colour
    Static,
    /// Seed colour tinted by how close each gene is to its maximum
    #[default]
    Attributes,
    /// Seed colour drifts a little with every birth
    Random,
}

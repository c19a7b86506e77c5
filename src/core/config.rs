//! Simulation configuration
//!
//! World geometry, deployment counts and the few combat tunables that are
//! scenario knobs rather than battle constants.

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, SimError};

/// Configuration for one simulation run
///
/// All fields have defaults, so a partial TOML file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Battlefield width in pixels
    pub world_width: f32,

    /// Battlefield height in pixels
    pub world_height: f32,

    /// Edge length of one grid tile in pixels
    ///
    /// The tile is the unit of occupancy (one regiment per tile) and of
    /// perception windowing; it should comfortably hold one formed regiment.
    pub tile_size: f32,

    /// Master seed; every per-agent and per-formation generator derives
    /// from it, so a run is reproducible end to end.
    pub seed: u64,

    /// Regiments deployed per faction by the default runner
    pub roman_regiments: u32,
    pub barbarian_regiments: u32,

    /// Forest copses scattered by the default runner
    pub copse_count: u32,

    /// Chance that an attack is fumbled outright, multiplied into the kill
    /// roll as `(1 - fumble)`. Kept at 0.0 unless a scenario wants sloppier
    /// fighting.
    pub attack_fumble_chance: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 6400.0,
            world_height: 6400.0,
            tile_size: 128.0,
            seed: 0,
            roman_regiments: 15,
            barbarian_regiments: 20,
            copse_count: 60,
            attack_fumble_chance: 0.0,
        }
    }
}

impl SimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a TOML config
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.tile_size <= 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "tile_size ({}) must be positive",
                self.tile_size
            )));
        }
        if self.world_width < self.tile_size || self.world_height < self.tile_size {
            return Err(SimError::InvalidConfig(format!(
                "world ({} x {}) must hold at least one {}px tile",
                self.world_width, self.world_height, self.tile_size
            )));
        }
        if !(0.0..=1.0).contains(&self.attack_fumble_chance) {
            return Err(SimError::InvalidConfig(format!(
                "attack_fumble_chance ({}) must be in [0, 1]",
                self.attack_fumble_chance
            )));
        }
        Ok(())
    }
}

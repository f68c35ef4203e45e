//! Simulation configuration and error types.
//!
//! The configuration surface is consumed once at construction and treated as
//! immutable for the simulation's lifetime.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which tessellation the grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GridKind {
    Square,
    Hex,
}

/// Immutable simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid_kind: GridKind,
    /// Grid dimension; the board is `grid_size × grid_size` cells.
    pub grid_size: i32,
    /// World-space tile size (square edge length, or hex outer radius).
    pub tile_size: f32,
    /// RNG seed; identical seed + config reproduces the whole run.
    pub seed: u64,
    /// Agents spawned per team (placement permitting).
    pub agents_per_team: u32,
    /// Logical seconds one tick advances the simulation clock.
    pub step_interval: f32,
    /// World-space position of cell (0, 0).
    pub grid_origin: (f32, f32),
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_kind: GridKind::Square,
            grid_size: 10,
            tile_size: 100.0,
            seed: 0,
            agents_per_team: 5,
            step_interval: 0.1,
            grid_origin: (0.0, 0.0),
        }
    }
}

impl SimConfig {
    /// Reject configurations the simulation cannot start with.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.grid_size <= 0 {
            return Err(SimError::InvalidGridSize(self.grid_size));
        }
        if !(self.tile_size > 0.0) {
            return Err(SimError::InvalidTileSize(self.tile_size));
        }
        if !(self.step_interval > 0.0) {
            return Err(SimError::InvalidStepInterval(self.step_interval));
        }
        Ok(())
    }
}

/// Errors that prevent a simulation from starting. Nothing during normal
/// stepping produces an error; failure paths there degrade to "skip this
/// unit of work and continue".
#[derive(Debug, Error)]
pub enum SimError {
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(i32),
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(f32),
    #[error("step interval must be positive, got {0}")]
    InvalidStepInterval(f32),
}

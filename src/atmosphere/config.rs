//! Configuration for the atmosphere simulation.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::column::{layer_geometry, LayerGeometry};
use crate::terrain::PlanetConstants;

/// Errors raised when building or running a [`Windsim`](super::Windsim).
#[derive(Error, Debug)]
pub enum WindsimError {
    #[error("Invalid atmosphere parameter '{name}': {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Invalid grid size {x}x{y}x{z}: every dimension must be at least 1")]
    InvalidSize { x: usize, y: usize, z: usize },
    #[error("Failed to allocate {cells} atmosphere cells")]
    Allocation { cells: usize },
    #[error("Snapshot observer failed: {0}")]
    Observer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Number of cells along each axis: `x × y` surface columns of `z` layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridSize {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Number of surface columns.
    pub fn columns(&self) -> Option<usize> {
        self.x.checked_mul(self.y)
    }

    /// Total number of cells, or `None` if it does not fit in `usize`.
    pub fn cells(&self) -> Option<usize> {
        self.columns()?.checked_mul(self.z)
    }

    pub fn validate(&self) -> Result<(), WindsimError> {
        if self.x == 0 || self.y == 0 || self.z == 0 {
            return Err(WindsimError::InvalidSize { x: self.x, y: self.y, z: self.z });
        }
        Ok(())
    }
}

/// Parameters of an atmosphere run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindsimConfig {
    pub size: GridSize,
    /// Height of the simulated atmosphere in metres.
    pub height: f64,
    /// Fixed number of iterations; there is no convergence test.
    pub iterations: usize,
    /// Take a profile snapshot every this many iterations (0 disables).
    pub snapshot_interval: usize,
    /// Report progress every this many iterations (0 disables).
    pub progress_interval: usize,
    /// Initial air mass per cubic metre of cell volume.
    pub initial_density: f64,
    /// Initial temperature of every cell in kelvin.
    pub initial_temperature: f64,
    /// Specific gas constant of dry air in J/(kg·K).
    pub gas_constant: f64,
    /// Run the column loop on the rayon thread pool.
    pub parallel: bool,
}

impl Default for WindsimConfig {
    fn default() -> Self {
        Self::earth_like()
    }
}

impl WindsimConfig {
    pub fn earth_like() -> Self {
        Self {
            size: GridSize::new(4, 4, 24),
            height: 100_000.0,
            iterations: 10_001,
            snapshot_interval: 250,
            progress_interval: 100,
            initial_density: 0.15,
            initial_temperature: 273.15,
            gas_constant: 287.0,
            parallel: true,
        }
    }

    /// Checks every parameter the simulation consumes, naming the first
    /// offending one.
    pub fn validate(&self, planet: &PlanetConstants, map: DVec2) -> Result<(), WindsimError> {
        self.size.validate()?;

        let positive = [
            ("height", self.height),
            ("radius", planet.radius),
            ("gravity", planet.gravity),
            ("map_width", map.x),
            ("map_height", map.y),
            ("initial_temperature", self.initial_temperature),
            ("gas_constant", self.gas_constant),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(WindsimError::InvalidParameter { name, value });
            }
        }

        if !(self.initial_density >= 0.0 && self.initial_density.is_finite()) {
            return Err(WindsimError::InvalidParameter {
                name: "initial_density",
                value: self.initial_density,
            });
        }

        Ok(())
    }

    /// Surface extent of one column for a map of `map` metres.
    pub fn column_surface(&self, map: DVec2) -> DVec2 {
        DVec2::new(map.x / self.size.x as f64, map.y / self.size.y as f64)
    }

    /// Validates the configuration and returns the geometry every column
    /// would get, floor first.
    pub fn layer_geometry(
        &self,
        planet: &PlanetConstants,
        map: DVec2,
    ) -> Result<Vec<LayerGeometry>, WindsimError> {
        self.validate(planet, map)?;
        Ok(layer_geometry(planet.radius, self.height, self.size.z, self.column_surface(map)))
    }
}

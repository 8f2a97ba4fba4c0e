//! Vertical profile snapshots of a single column.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use super::cell::Windcell;
use super::config::WindsimError;

/// State of one layer at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileCell {
    /// Width, height and depth in metres.
    pub size: DVec3,
    /// kg/m³
    pub density: f64,
    /// N/m²
    pub pressure: f64,
    /// m
    pub altitude: f64,
    /// Vertical velocity in m/s, positive toward the floor.
    pub velocity: f64,
}

/// Planetary constants handed to exporters alongside each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileContext {
    pub radius: f64,
    pub gravity: f64,
    /// Height of the simulated atmosphere in metres.
    pub height: f64,
}

/// One snapshot of every layer of column `(0, 0)`, floor first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub iteration: usize,
    pub label: String,
    pub cells: Vec<ProfileCell>,
}

impl Profile {
    /// An empty profile with room for `layers` cells, so recording never
    /// reallocates.
    pub fn with_layers(layers: usize) -> Result<Self, WindsimError> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(layers)
            .map_err(|_| WindsimError::Allocation { cells: layers })?;
        Ok(Self { iteration: 0, label: String::new(), cells })
    }

    /// Overwrites this profile with the state of `column` after `iteration`
    /// of a run of `iterations`.
    pub fn record(&mut self, column: &[Windcell], gas_constant: f64, iteration: usize, iterations: usize) {
        self.iteration = iteration;
        self.label = format!("iteration {}/{}", iteration, iterations.saturating_sub(1));
        self.cells.clear();
        self.cells.extend(column.iter().map(|cell| ProfileCell {
            size: cell.dimension,
            density: cell.density(),
            pressure: cell.pressure(gas_constant),
            altitude: cell.altitude,
            velocity: cell.velocity.z,
        }));
    }

    pub fn layers(&self) -> usize {
        self.cells.len()
    }

    pub fn bottom(&self) -> Option<&ProfileCell> {
        self.cells.first()
    }

    pub fn top(&self) -> Option<&ProfileCell> {
        self.cells.last()
    }
}

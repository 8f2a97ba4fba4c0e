//! Layer geometry and initial state of a column of atmosphere.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use super::cell::Windcell;
use super::config::WindsimConfig;
use crate::geometry::{layer_depths, layer_midpoints, triangle_extended_opposite};

/// Geometry of one altitude layer, shared by every column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerGeometry {
    /// Midpoint altitude in metres.
    pub altitude: f64,
    /// Width, height and depth in metres.
    pub dimension: DVec3,
}

impl LayerGeometry {
    pub fn volume(&self) -> f64 {
        self.dimension.x * self.dimension.y * self.dimension.z
    }
}

/// Computes the geometry of `layers` layers spanning `height` metres above a
/// surface cell of `surface` metres on a planet of `radius` metres.
///
/// Layers thicken linearly with altitude, so resolution is finest near the
/// ground, and widen with the curvature of the planet.
pub fn layer_geometry(radius: f64, height: f64, layers: usize, surface: DVec2) -> Vec<LayerGeometry> {
    let depths = layer_depths(height, layers);
    let altitudes = layer_midpoints(&depths);

    depths
        .iter()
        .zip(altitudes)
        .map(|(&depth, altitude)| LayerGeometry {
            altitude,
            dimension: DVec3::new(
                triangle_extended_opposite(radius, surface.x, altitude),
                triangle_extended_opposite(radius, surface.y, altitude),
                depth,
            ),
        })
        .collect()
}

/// Seeds `column` with still air at the configured density and temperature.
pub fn initialize_column(column: &mut [Windcell], layers: &[LayerGeometry], config: &WindsimConfig) {
    debug_assert_eq!(column.len(), layers.len());

    for (cell, layer) in column.iter_mut().zip(layers) {
        *cell = Windcell::new(
            config.initial_density * layer.volume(),
            config.initial_temperature,
            0.0,
            layer.altitude,
            layer.dimension,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn layers_widen_and_thicken_with_altitude() {
        let layers = layer_geometry(6_371_000.0, 100_000.0, 4, DVec2::splat(1000.0));
        assert_eq!(layers.len(), 4);
        for pair in layers.windows(2) {
            assert!(pair[1].altitude > pair[0].altitude);
            assert!(pair[1].dimension.x > pair[0].dimension.x);
            assert!(pair[1].dimension.z > pair[0].dimension.z);
        }
        // n = 5, x = 2H / 20 = 10 km
        assert_relative_eq!(layers[0].dimension.z, 10_000.0, max_relative = 1e-12);
        assert_relative_eq!(layers[0].altitude, 5_000.0, max_relative = 1e-12);
    }

    #[test]
    fn initial_mass_follows_density_factor() {
        let layers = layer_geometry(6_371_000.0, 10_000.0, 3, DVec2::new(500.0, 800.0));
        let config = WindsimConfig::default();
        let mut column = vec![Windcell::default(); 3];
        initialize_column(&mut column, &layers, &config);

        for (cell, layer) in column.iter().zip(&layers) {
            assert_relative_eq!(cell.mass, 0.15 * layer.volume(), max_relative = 1e-12);
            assert_relative_eq!(cell.density(), 0.15, max_relative = 1e-12);
            assert_eq!(cell.temperature, 273.15);
            assert_eq!(cell.velocity, DVec3::ZERO);
        }
    }
}

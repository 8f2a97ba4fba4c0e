//! A single cell of atmosphere.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// One discretised volume of air at a fixed column and altitude layer.
///
/// Geometry is fixed at initialisation. Only `mass`, `velocity` and the
/// force fields change while the simulation runs. A positive `velocity.z`
/// carries mass toward the floor (`z - 1`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Windcell {
    /// kg, never negative.
    pub mass: f64,
    /// K
    pub temperature: f64,
    /// kg
    pub moisture: f64,
    /// Midpoint altitude of the layer in metres.
    pub altitude: f64,
    /// Width, height and depth in metres.
    pub dimension: DVec3,
    pub dimension_reciprocal: DVec3,
    pub volume: f64,
    pub volume_reciprocal: f64,
    /// m/s
    pub velocity: DVec3,
    /// Recomputed every force pass, in newtons.
    pub weight: f64,
    pub force_up: f64,
    pub force_down: f64,
}

impl Windcell {
    pub fn new(mass: f64, temperature: f64, moisture: f64, altitude: f64, dimension: DVec3) -> Self {
        debug_assert!(mass >= 0.0, "mass must not be negative");
        debug_assert!(temperature > 0.0, "temperature must be positive");
        debug_assert!(dimension.cmpgt(DVec3::ZERO).all(), "dimension must be positive");

        let volume = dimension.x * dimension.y * dimension.z;
        Self {
            mass,
            temperature,
            moisture,
            altitude,
            dimension,
            dimension_reciprocal: dimension.recip(),
            volume,
            volume_reciprocal: 1.0 / volume,
            velocity: DVec3::ZERO,
            weight: 0.0,
            force_up: 0.0,
            force_down: 0.0,
        }
    }

    /// kg/m³
    #[inline]
    pub fn density(&self) -> f64 {
        self.mass * self.volume_reciprocal
    }

    /// Ideal gas pressure in N/m² for the given specific gas constant.
    #[inline]
    pub fn pressure(&self, gas_constant: f64) -> f64 {
        self.density() * self.temperature * gas_constant
    }

    /// Adds `delta` kg, clamping the result at zero.
    #[inline]
    pub fn change_mass(&mut self, delta: f64) {
        self.mass = (self.mass + delta).max(0.0);
    }

    /// Area of the horizontal faces in m².
    #[inline]
    pub fn face_area(&self) -> f64 {
        self.dimension.x * self.dimension.y
    }

    pub fn is_finite(&self) -> bool {
        self.mass.is_finite()
            && self.velocity.is_finite()
            && self.force_up.is_finite()
            && self.force_down.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cell() -> Windcell {
        Windcell::new(300.0, 273.15, 0.0, 500.0, DVec3::new(10.0, 10.0, 2.0))
    }

    #[test]
    fn derived_geometry() {
        let c = cell();
        assert_eq!(c.volume, 200.0);
        assert_eq!(c.dimension_reciprocal.z, 0.5);
        assert_relative_eq!(c.volume * c.volume_reciprocal, 1.0);
        assert_eq!(c.face_area(), 100.0);
    }

    #[test]
    fn density_and_pressure() {
        let c = cell();
        assert_relative_eq!(c.density(), 1.5);
        assert_relative_eq!(c.pressure(287.0), 1.5 * 273.15 * 287.0);
    }

    #[test]
    fn mass_is_clamped_at_zero() {
        let mut c = cell();
        c.change_mass(-1000.0);
        assert_eq!(c.mass, 0.0);
        c.change_mass(5.0);
        assert_eq!(c.mass, 5.0);
    }
}

//! Gravity and pressure forces on each cell.

use serde::{Deserialize, Serialize};

use super::cell::Windcell;

/// Physical constants the per-column phases read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Planet radius in metres.
    pub radius: f64,
    /// Surface gravity in m/s².
    pub gravity: f64,
    /// Specific gas constant in J/(kg·K).
    pub gas_constant: f64,
}

/// Gravity at `altitude` metres above a planet of `radius` metres.
#[inline]
pub fn gravity_at_altitude(surface_gravity: f64, radius: f64, altitude: f64) -> f64 {
    let ratio = radius / (radius + altitude);
    surface_gravity * ratio * ratio
}

/// Recomputes weight, pressure and the vertical forces of every cell.
///
/// Pressure pushes equally on the top and bottom faces, so `force_up` is the
/// pressure over the face area and `force_down` adds the cell's weight.
pub fn evaluate_forces(column: &mut [Windcell], constants: &PhysicalConstants) {
    for cell in column.iter_mut() {
        let gravity = gravity_at_altitude(constants.gravity, constants.radius, cell.altitude);
        cell.weight = cell.mass * gravity;

        let area_force = cell.pressure(constants.gas_constant) * cell.face_area();
        cell.force_up = area_force;
        cell.force_down = area_force + cell.weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    const EARTH: PhysicalConstants = PhysicalConstants {
        radius: 6_371_000.0,
        gravity: 9.81,
        gas_constant: 287.0,
    };

    #[test]
    fn gravity_weakens_with_altitude() {
        assert_eq!(gravity_at_altitude(9.81, 6_371_000.0, 0.0), 9.81);
        let high = gravity_at_altitude(9.81, 6_371_000.0, 6_371_000.0);
        assert_relative_eq!(high, 9.81 / 4.0, max_relative = 1e-12);
    }

    #[test]
    fn down_force_exceeds_up_force_by_weight() {
        let mut column = vec![
            Windcell::new(1500.0, 273.15, 0.0, 5.0, DVec3::new(10.0, 10.0, 10.0)),
            Windcell::new(0.0, 273.15, 0.0, 15.0, DVec3::new(10.0, 10.0, 10.0)),
        ];
        evaluate_forces(&mut column, &EARTH);

        let pressure = 1.5 * 273.15 * 287.0;
        assert_relative_eq!(column[0].force_up, pressure * 100.0, max_relative = 1e-12);
        assert!(column[0].force_down > column[0].force_up);
        assert_relative_eq!(
            column[0].force_down - column[0].force_up,
            column[0].weight,
            max_relative = 1e-9
        );
        assert_eq!(column[1].force_up, 0.0);
        assert_eq!(column[1].force_down, 0.0);
    }
}

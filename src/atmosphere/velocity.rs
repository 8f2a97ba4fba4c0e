//! Vertical velocity from the force imbalance between neighbouring layers.

use super::cell::Windcell;
use super::grid::pair_mut;

/// Updates `velocity.z` of every cell from the net force across each layer
/// boundary.
///
/// The floor may not move toward the ground, so a positive floor velocity is
/// reset to zero first. Then for each `z ≥ 1`, `net = above.force_down -
/// below.force_up`; the cell pushing harder is the source, and both cells of
/// the pair receive the same signed `net / mass`. Cells without mass are left
/// untouched.
pub fn integrate_velocity(column: &mut [Windcell]) {
    let Some(floor) = column.first_mut() else {
        return;
    };
    if floor.velocity.z > 0.0 {
        floor.velocity.z = 0.0;
    }

    for z in 1..column.len() {
        let net = column[z].force_down - column[z - 1].force_up;

        let (from, to) = if net > 0.0 {
            pair_mut(column, z, z - 1)
        } else {
            pair_mut(column, z - 1, z)
        };

        accelerate(from, net);
        accelerate(to, net);
    }
}

#[inline]
fn accelerate(cell: &mut Windcell, net: f64) {
    if cell.mass > 0.0 {
        cell.velocity.z += net / cell.mass;
    }
}

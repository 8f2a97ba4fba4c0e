//! Transfer of mass and momentum between neighbouring layers.

use tracing::warn;

use super::cell::Windcell;
use super::grid::pair_mut;

/// Moves a velocity-proportional share of each cell's mass to its neighbour
/// in the direction of flow, floor to ceiling.
///
/// `transfer = mass * velocity.z / depth`; positive moves toward `z - 1`.
/// Nothing crosses the floor or the ceiling. The destination always receives
/// the full `|transfer|` together with the momentum it carries. A donor asked
/// for more than it holds is clamped at zero mass, so column mass is only
/// conserved while every transfer stays within its donor's mass.
pub fn transport_mass(column: &mut [Windcell]) {
    let top = column.len().saturating_sub(1);

    for z in 0..column.len() {
        let cell = &column[z];
        let transfer = cell.mass * cell.velocity.z * cell.dimension_reciprocal.z;

        if transfer == 0.0 {
            continue;
        }
        if !transfer.is_finite() {
            warn!(
                "Layer {}: skipping non-finite mass transfer (mass {}, velocity {})",
                z, cell.mass, cell.velocity.z
            );
            continue;
        }
        if (transfer > 0.0 && z == 0) || (transfer < 0.0 && z == top) {
            continue;
        }
        if transfer.abs() > cell.mass {
            warn!(
                "Layer {}: transfer of {:.3e} kg exceeds the {:.3e} kg held; clamping at zero",
                z,
                transfer.abs(),
                cell.mass
            );
        }

        let to = if transfer > 0.0 { z - 1 } else { z + 1 };
        let (from, to) = pair_mut(column, z, to);
        exchange(from, to, transfer.abs());
    }
}

/// `transfer` is the absolute amount of mass leaving `from`.
fn exchange(from: &mut Windcell, to: &mut Windcell, transfer: f64) {
    let carried = transfer * from.velocity.z;

    if to.mass > 0.0 {
        to.velocity.z += (carried + to.mass * to.velocity.z) / to.mass;
    } else {
        to.velocity.z = from.velocity.z;
    }
    from.velocity.z -= (carried + from.mass * from.velocity.z) / from.mass;

    from.change_mass(-transfer);
    to.change_mass(transfer);
}

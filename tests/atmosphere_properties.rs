//! Property-based tests for the atmosphere layer geometry and mass transport.
//!
//! - Layer depths add up to the atmosphere height and grow with altitude
//! - Cells widen (never shrink) with altitude
//! - Mass never goes negative and is conserved per column while layers are
//!   thick enough that no transfer exceeds its donor's mass

use glam::DVec2;
use planetsim::atmosphere::{GridSize, Windsim, WindsimConfig};
use planetsim::geometry::{layer_depths, triangle_extended_opposite};
use planetsim::terrain::PlanetConstants;
use proptest::prelude::*;

const RADIUS: f64 = 6_371_000.0;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the layers exactly fill the atmosphere
    #[test]
    fn depths_sum_to_height(height in 1.0f64..1.0e6, layers in 1usize..200) {
        let depths = layer_depths(height, layers);
        prop_assert_eq!(depths.len(), layers);

        let total: f64 = depths.iter().sum();
        prop_assert!(
            (total - height).abs() <= height * 1e-9,
            "Depths sum to {} for height {} over {} layers", total, height, layers
        );
    }

    /// Property: every layer is thicker than the one below it
    #[test]
    fn depths_grow_with_altitude(height in 1.0f64..1.0e6, layers in 2usize..200) {
        let depths = layer_depths(height, layers);
        for (z, pair) in depths.windows(2).enumerate() {
            prop_assert!(
                pair[1] > pair[0],
                "Layer {} depth {} not above layer {} depth {}", z + 1, pair[1], z, pair[0]
            );
        }
    }

    /// Property: cells never get narrower with altitude
    #[test]
    fn width_is_non_decreasing_in_altitude(
        opposite in 1.0f64..1.0e6,
        low in 0.0f64..1.0e5,
        rise in 0.0f64..1.0e5,
    ) {
        let lower = triangle_extended_opposite(RADIUS, opposite, low);
        let upper = triangle_extended_opposite(RADIUS, opposite, low + rise);
        prop_assert!(lower.is_finite() && upper.is_finite());
        prop_assert!(upper >= lower, "Width shrank from {} to {}", lower, upper);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: over an atmosphere at least 50 km deep no donor is
    /// overdrawn, so transport conserves mass and leaves no cell negative
    #[test]
    fn mass_is_conserved_and_non_negative(
        layers in 1usize..=16,
        iterations in 1usize..=200,
        density in 0.05f64..0.5,
        height in 5.0e4f64..2.0e5,
        surface in 100.0f64..1.0e5,
    ) {
        let config = WindsimConfig {
            size: GridSize::new(1, 1, layers),
            height,
            iterations,
            initial_density: density,
            snapshot_interval: 0,
            progress_interval: 0,
            parallel: false,
            ..WindsimConfig::default()
        };
        let mut sim = Windsim::new(config, &PlanetConstants::earth_like(), DVec2::splat(surface))
            .expect("valid configuration");
        let initial = sim.grid().total_mass();

        while sim.step().is_some() {
            for cell in sim.grid().cells() {
                prop_assert!(cell.mass >= 0.0, "Negative mass {}", cell.mass);
                prop_assert!(cell.is_finite(), "Non-finite cell {:?}", cell);
            }
        }

        let total = sim.grid().total_mass();
        prop_assert!(
            (total - initial).abs() <= initial * 1e-9,
            "Mass drifted from {} to {}", initial, total
        );
    }
}

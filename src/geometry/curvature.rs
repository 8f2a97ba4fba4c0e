//! Layer geometry for a stack of cells above a curved surface.

/// Extends an isosceles triangle rooted at the planet centre.
///
/// A surface span of length `opposite` is treated as the base of a triangle
/// whose other two sides are both `radius`. The apex angle `A` follows from
/// the cosine rule, `a² = b² + c² − 2bc·cos A`. Both sides are then extended
/// by `extend` and the base is recomputed at the same angle, giving the width
/// of a cell `extend` metres above the surface.
///
/// With `b = c` the cosine rule reduces to `a² = 2b²(1 − cos A)`, so
/// `1 − cos A` is kept directly instead of `cos A` to avoid cancellation for
/// spans that are tiny compared to the radius.
pub fn triangle_extended_opposite(radius: f64, opposite: f64, extend: f64) -> f64 {
    debug_assert!(radius > 0.0, "radius must be positive");

    // 1 - cos A, where cos A = (a² - b² - c²) / (-2bc) with b = c = radius
    let versine = (opposite * opposite) / (2.0 * radius * radius);

    let side = radius + extend;
    side * (2.0 * versine).sqrt()
}

/// Returns the depth of every layer in a stack of `layers` cells spanning
/// `height` metres.
///
/// Depths grow linearly with the layer index, `1x, 2x, … Zx`, with
/// `x = 2h / (n(n − 1))` and `n = Z + 1` so that the depths add up to `height`.
pub fn layer_depths(height: f64, layers: usize) -> Vec<f64> {
    let n = layers as f64 + 1.0;
    let unit = 2.0 * height / (n * (n - 1.0));

    (0..layers).map(|z| unit * (z as f64 + 1.0)).collect()
}

/// Returns the midpoint altitude of every layer for the given depths.
pub fn layer_midpoints(depths: &[f64]) -> Vec<f64> {
    let mut altitude = 0.0;
    depths
        .iter()
        .map(|&depth| {
            altitude += depth * 0.5;
            let midpoint = altitude;
            altitude += depth * 0.5;
            midpoint
        })
        .collect()
}

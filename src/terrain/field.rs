//! Dense 2D scalar fields over the map.

use serde::{Deserialize, Serialize};

/// A row-major grid of `f64` values covering the map.
///
/// `minimum`/`maximum` record the range seen by the last normalisation so a
/// field can be denormalised later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field2D {
    width: usize,
    height: usize,
    values: Vec<f64>,
    pub minimum: f64,
    pub maximum: f64,
}

impl Field2D {
    /// Creates a zero-filled field.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            values: vec![0.0; width * height],
            minimum: 0.0,
            maximum: 0.0,
        }
    }

    /// Wraps existing row-major values. Returns `None` on a length mismatch.
    pub fn from_values(width: usize, height: usize, values: Vec<f64>) -> Option<Self> {
        if values.len() != width * height {
            return None;
        }
        Some(Self { width, height, values, minimum: 0.0, maximum: 0.0 })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Returns the rows as slices, top to bottom.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.width.max(1))
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        debug_assert!(x < self.width && y < self.height);
        self.values[y * self.width + x] = value;
    }

    /// Sets every value to zero.
    pub fn zero_fill(&mut self) {
        self.values.fill(0.0);
    }

    /// Returns `(min, max)` of the current values.
    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Rescales all values to `[0, 1]`.
    ///
    /// A flat field has no range to stretch and becomes all zeros.
    pub fn normalise(&mut self) {
        let (min, max) = self.range();
        let diff = max - min;

        if diff > 0.0 {
            for v in &mut self.values {
                *v = (*v - min) / diff;
            }
        } else {
            self.zero_fill();
        }

        self.minimum = min;
        self.maximum = max;
    }

    /// Clamps negatives to zero then divides by the maximum, keeping zero as
    /// the floor rather than stretching the minimum down to it.
    pub fn normalise_maximum(&mut self) {
        for v in &mut self.values {
            if *v < 0.0 {
                *v = 0.0;
            }
        }

        let (min, max) = self.range();
        if max > 0.0 {
            for v in &mut self.values {
                *v /= max;
            }
        }

        self.minimum = min;
        self.maximum = max;
    }

    /// Replaces every value below `min` with `to`.
    pub fn clamp_floor_to(&mut self, min: f64, to: f64) {
        for v in &mut self.values {
            if *v < min {
                *v = to;
            }
        }
    }

    /// Replaces every value above `max` with `to`.
    pub fn clamp_ceiling_to(&mut self, max: f64, to: f64) {
        for v in &mut self.values {
            if *v > max {
                *v = to;
            }
        }
    }

    pub fn square(&mut self) {
        for v in &mut self.values {
            *v *= *v;
        }
    }

    /// Box-averages this field down to `width × height`.
    ///
    /// Each destination cell averages the source cells whose centres fall
    /// inside it; a destination cell that covers no source centre takes the
    /// nearest source value.
    pub fn downsample(&self, width: usize, height: usize) -> Field2D {
        let mut out = Field2D::new(width, height);
        if self.is_empty() || width == 0 || height == 0 {
            return out;
        }

        let sx = self.width as f64 / width as f64;
        let sy = self.height as f64 / height as f64;

        for y in 0..height {
            let y0 = (y as f64 * sy).floor() as usize;
            let y1 = (((y + 1) as f64 * sy).ceil() as usize).clamp(y0 + 1, self.height);
            for x in 0..width {
                let x0 = (x as f64 * sx).floor() as usize;
                let x1 = (((x + 1) as f64 * sx).ceil() as usize).clamp(x0 + 1, self.width);

                let mut sum = 0.0;
                let mut count = 0usize;
                for yy in y0.min(self.height - 1)..y1 {
                    for xx in x0.min(self.width - 1)..x1 {
                        sum += self.get(xx, yy);
                        count += 1;
                    }
                }
                out.set(x, y, sum / count.max(1) as f64);
            }
        }

        out.minimum = self.minimum;
        out.maximum = self.maximum;
        out
    }

    /// Fraction of values at or above `level`.
    pub fn proportion_at_or_above(&self, level: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let count = self.values.iter().filter(|&&v| v >= level).count();
        count as f64 / self.values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Field2D {
        let values = (0..width * height).map(|i| i as f64 * 2.0 - 3.0).collect();
        Field2D::from_values(width, height, values).unwrap()
    }

    #[test]
    fn normalise_maps_range_to_unit_interval() {
        let mut f = ramp(4, 4);
        f.normalise();
        let (min, max) = f.range();
        assert_eq!(min, 0.0);
        assert_eq!(max, 1.0);
        assert_eq!(f.minimum, -3.0);
        assert_eq!(f.maximum, 27.0);
    }

    #[test]
    fn normalise_flat_field_is_zero() {
        let mut f = Field2D::from_values(2, 2, vec![5.0; 4]).unwrap();
        f.normalise();
        assert!(f.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn normalise_maximum_keeps_zero_floor() {
        let mut f = Field2D::from_values(3, 1, vec![-1.0, 2.0, 4.0]).unwrap();
        f.normalise_maximum();
        assert_eq!(f.values(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn clamps_replace_out_of_range_values() {
        let mut f = Field2D::from_values(4, 1, vec![0.1, 0.5, 0.7, 0.9]).unwrap();
        f.clamp_floor_to(0.6, 0.6);
        assert_eq!(f.values(), &[0.6, 0.6, 0.7, 0.9]);
        f.clamp_ceiling_to(0.8, 0.0);
        assert_eq!(f.values(), &[0.6, 0.6, 0.7, 0.0]);
    }

    #[test]
    fn downsample_averages_blocks() {
        let f = Field2D::from_values(4, 2, vec![1.0, 3.0, 5.0, 7.0, 1.0, 3.0, 5.0, 7.0]).unwrap();
        let d = f.downsample(2, 1);
        assert_eq!(d.values(), &[2.0, 6.0]);
    }

    #[test]
    fn from_values_rejects_wrong_length() {
        assert!(Field2D::from_values(3, 3, vec![0.0; 8]).is_none());
    }

    #[test]
    fn proportion_counts_inclusive_level() {
        let f = Field2D::from_values(4, 1, vec![0.0, 0.15, 0.2, 0.1]).unwrap();
        assert_eq!(f.proportion_at_or_above(0.15), 0.5);
    }
}

//! Flat storage for the 3D grid of cells.

use rayon::prelude::*;

use super::cell::Windcell;
use super::config::{GridSize, WindsimError};

/// A fixed-size grid of [`Windcell`]s.
///
/// Cells are stored column by column: the `z` layers of one surface column
/// are contiguous, at `(y * X + x) * Z + z`. Every column is therefore a
/// slice that can be handed to a worker on its own.
#[derive(Debug, Clone)]
pub struct WindGrid {
    size: GridSize,
    cells: Vec<Windcell>,
}

impl WindGrid {
    /// Allocates a default-filled grid, reporting allocation failure instead
    /// of aborting.
    pub fn try_new(size: GridSize) -> Result<Self, WindsimError> {
        size.validate()?;
        let count = size.cells().ok_or(WindsimError::Allocation { cells: usize::MAX })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(count)
            .map_err(|_| WindsimError::Allocation { cells: count })?;
        cells.resize(count, Windcell::default());

        Ok(Self { size, cells })
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size.x + x) * self.size.z + z
    }

    fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.size.x && y < self.size.y && z < self.size.z
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&Windcell> {
        if !self.contains(x, y, z) {
            return None;
        }
        self.cells.get(self.index(x, y, z))
    }

    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut Windcell> {
        if !self.contains(x, y, z) {
            return None;
        }
        let i = self.index(x, y, z);
        self.cells.get_mut(i)
    }

    /// The cells of column `(x, y)`, floor first.
    pub fn column(&self, x: usize, y: usize) -> Option<&[Windcell]> {
        if !self.contains(x, y, 0) {
            return None;
        }
        let start = self.index(x, y, 0);
        self.cells.get(start..start + self.size.z)
    }

    pub fn column_mut(&mut self, x: usize, y: usize) -> Option<&mut [Windcell]> {
        if !self.contains(x, y, 0) {
            return None;
        }
        let start = self.index(x, y, 0);
        let end = start + self.size.z;
        self.cells.get_mut(start..end)
    }

    pub fn cells(&self) -> &[Windcell] {
        &self.cells
    }

    /// Iterates the columns in `(x, y)` row-major order.
    pub fn columns(&self) -> std::slice::ChunksExact<'_, Windcell> {
        self.cells.chunks_exact(self.size.z)
    }

    pub fn columns_mut(&mut self) -> std::slice::ChunksExactMut<'_, Windcell> {
        self.cells.chunks_exact_mut(self.size.z)
    }

    /// Parallel iterator over the columns; each worker owns whole columns.
    pub fn par_columns_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, Windcell> {
        self.cells.par_chunks_exact_mut(self.size.z)
    }

    /// Total air mass in kg.
    pub fn total_mass(&self) -> f64 {
        self.cells.iter().map(|c| c.mass).sum()
    }

    /// Largest `|velocity.z|` in m/s.
    pub fn peak_vertical_speed(&self) -> f64 {
        self.cells.iter().map(|c| c.velocity.z.abs()).fold(0.0, f64::max)
    }
}

/// Mutable references to two distinct cells of one column.
pub(crate) fn pair_mut(column: &mut [Windcell], a: usize, b: usize) -> (&mut Windcell, &mut Windcell) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = column.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = column.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

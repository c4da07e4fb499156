//! Generic square grid engine shared by binary and scalar masks
//!
//! Owns the cell storage, the per-instance random source and the symmetry
//! settings. Kind-specific operators live in `binary` and `scalar` as
//! inherent impls on `Grid<bool>` and `Grid<f32>`.

use std::fmt;

use ndarray::Array2;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::io::error::{Result, ensure_same_size, invalid_parameter};
use crate::symmetry::{Symmetry, SymmetrySettings, region};

/// Value stored in a grid cell
pub trait CellValue: Copy + Default + PartialEq + Send + Sync + fmt::Debug + 'static {
    /// Human readable name of the cell kind
    const KIND: &'static str;
}

impl CellValue for bool {
    const KIND: &'static str = "binary";
}

impl CellValue for f32 {
    const KIND: &'static str = "scalar";
}

/// Square grid of cells with its own seeded randomness and symmetry settings
///
/// Cells are addressed `(x, y)` with `x` as the outer (row) index. The side
/// length only changes through the explicit resize operators, which swap in
/// new storage in one step.
#[derive(Clone, Debug)]
pub struct Grid<T> {
    cells: Array2<T>,
    random: StdRng,
    symmetry: SymmetrySettings,
}

impl<T: CellValue> Grid<T> {
    /// Create a grid with every cell at the kind's default value
    pub fn new(size: usize, seed: u64, symmetry: SymmetrySettings) -> Self {
        Self {
            cells: Array2::from_elem((size, size), T::default()),
            random: StdRng::seed_from_u64(seed),
            symmetry,
        }
    }

    /// Wrap existing square storage
    ///
    /// # Errors
    ///
    /// Returns an error if `cells` is not square
    pub fn from_cells(cells: Array2<T>, seed: u64, symmetry: SymmetrySettings) -> Result<Self> {
        let (rows, cols) = cells.dim();
        if rows != cols {
            return Err(invalid_parameter(
                "cells",
                &format!("{rows}x{cols}"),
                &"mask storage must be square",
            ));
        }
        Ok(Self::with_cells(cells, seed, symmetry))
    }

    // Internal constructor for storage that is square by construction
    pub(crate) fn with_cells(cells: Array2<T>, seed: u64, symmetry: SymmetrySettings) -> Self {
        Self {
            cells,
            random: StdRng::seed_from_u64(seed),
            symmetry,
        }
    }

    /// Side length of the grid
    pub fn size(&self) -> usize {
        self.cells.nrows()
    }

    /// Read-only view of the cell storage
    pub const fn cells(&self) -> &Array2<T> {
        &self.cells
    }

    /// Symmetry settings this grid maintains
    pub const fn symmetry_settings(&self) -> SymmetrySettings {
        self.symmetry
    }

    /// Read a cell
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid; callers check `in_bounds` first
    // Out-of-bounds access is a caller contract violation and fails loudly
    #[allow(clippy::indexing_slicing)]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.cells[[x, y]]
    }

    /// Write a cell, ignoring symmetry
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid; callers check `in_bounds` first
    #[allow(clippy::indexing_slicing)]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        self.cells[[x, y]] = value;
    }

    /// Read a cell at signed coordinates, `None` when outside the grid
    pub fn try_get(&self, x: i64, y: i64) -> Option<T> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.cells.get([x, y]).copied()
    }

    /// Check whether signed coordinates fall inside the grid
    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        let size = self.size() as i64;
        x >= 0 && y >= 0 && x < size && y < size
    }

    /// Draw a fresh seed from this grid's randomness
    pub fn next_seed(&mut self) -> u64 {
        self.random.random::<u64>()
    }

    /// Replace the random source with one seeded from `seed`
    pub fn reseed(&mut self, seed: u64) {
        self.random = StdRng::seed_from_u64(seed);
    }

    /// Mutable access to the random source
    pub const fn random_mut(&mut self) -> &mut StdRng {
        &mut self.random
    }

    /// Independent copy whose seed is drawn from this grid's randomness
    #[must_use]
    pub fn copy(&mut self) -> Self {
        let seed = self.next_seed();
        self.copy_with_seed(seed)
    }

    /// Independent copy with an explicit seed
    #[must_use]
    pub fn copy_with_seed(&self, seed: u64) -> Self {
        Self {
            cells: self.cells.clone(),
            random: StdRng::seed_from_u64(seed),
            symmetry: self.symmetry,
        }
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) -> &mut Self {
        self.cells.fill(value);
        self
    }

    /// Number of cells equal to `value`
    pub fn count_matching(&self, value: T) -> usize {
        self.cells.iter().filter(|&&cell| cell == value).count()
    }

    /// Mutable access to the cell storage for whole-grid operators
    pub(crate) const fn cells_mut(&mut self) -> &mut Array2<T> {
        &mut self.cells
    }

    /// Swap in new storage of the same size in one step
    pub(crate) fn replace_cells(&mut self, cells: Array2<T>) {
        self.cells = cells;
    }

    /// Summed-area table of per-cell integer weights
    ///
    /// Entry `(x, y)` holds the total weight of every cell `(i, j)` with
    /// `i <= x` and `j <= y`.
    // Every index read is either the current cell or an already written predecessor
    #[allow(clippy::indexing_slicing)]
    pub fn inner_count<F: Fn(T) -> i64>(&self, weight: F) -> Array2<i64> {
        let size = self.size();
        let mut table = Array2::<i64>::zeros((size, size));
        for x in 0..size {
            for y in 0..size {
                let mut total = weight(self.cells[[x, y]]);
                if x > 0 {
                    total += table[[x - 1, y]];
                }
                if y > 0 {
                    total += table[[x, y - 1]];
                }
                if x > 0 && y > 0 {
                    total -= table[[x - 1, y - 1]];
                }
                table[[x, y]] = total;
            }
        }
        table
    }

    /// Combine with another grid cell by cell
    ///
    /// Sizes are validated before any cell is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the grids differ in size
    pub fn zip_with<U, F>(&mut self, other: &Grid<U>, operation: &'static str, mut f: F) -> Result<&mut Self>
    where
        U: CellValue,
        F: FnMut(T, U) -> T,
    {
        ensure_same_size(operation, self.size(), other.size())?;
        self.cells.zip_mut_with(&other.cells, |cell, &rhs| *cell = f(*cell, rhs));
        Ok(self)
    }

    /// First canonical row for the terrain symmetry
    pub const fn min_x_bound(&self) -> usize {
        self.min_x_bound_for(self.symmetry.terrain)
    }

    /// One past the last canonical row for the terrain symmetry
    pub fn max_x_bound(&self) -> usize {
        self.max_x_bound_for(self.symmetry.terrain)
    }

    /// First canonical column of row `x` for the terrain symmetry
    pub fn min_y_bound(&self, x: usize) -> usize {
        self.min_y_bound_for(self.symmetry.terrain, x)
    }

    /// One past the last canonical column of row `x` for the terrain symmetry
    pub fn max_y_bound(&self, x: usize) -> usize {
        self.max_y_bound_for(self.symmetry.terrain, x)
    }

    /// First canonical row for `mode`
    pub const fn min_x_bound_for(&self, mode: Symmetry) -> usize {
        region::min_x_bound(mode, 0)
    }

    /// One past the last canonical row for `mode`
    pub fn max_x_bound_for(&self, mode: Symmetry) -> usize {
        region::max_x_bound(mode, self.size())
    }

    /// First canonical column of row `x` for `mode`
    pub fn min_y_bound_for(&self, mode: Symmetry, x: usize) -> usize {
        region::min_y_bound(mode, self.size(), x)
    }

    /// One past the last canonical column of row `x` for `mode`
    pub fn max_y_bound_for(&self, mode: Symmetry, x: usize) -> usize {
        region::max_y_bound(mode, self.size(), x)
    }

    /// Canonical cells of `mode` in scan order
    pub fn canonical_points(&self, mode: Symmetry) -> Vec<[usize; 2]> {
        region::canonical_points(mode, self.size()).collect()
    }

    /// Images of `(x, y)` under the terrain symmetry
    pub fn mirrored_points(&self, x: usize, y: usize) -> Vec<[usize; 2]> {
        region::mirrored_points(self.symmetry.terrain, self.size(), x, y)
    }

    /// Images of `(x, y)` under `mode`
    pub fn mirrored_points_for(&self, mode: Symmetry, x: usize, y: usize) -> Vec<[usize; 2]> {
        region::mirrored_points(mode, self.size(), x, y)
    }

    /// Copy every canonical cell of the terrain symmetry to its images
    pub fn apply_symmetry(&mut self) -> &mut Self {
        self.apply_symmetry_with(self.symmetry.terrain)
    }

    /// Copy every canonical cell of `mode` to its images
    pub fn apply_symmetry_with(&mut self, mode: Symmetry) -> &mut Self {
        if mode == Symmetry::None {
            return self;
        }
        let size = self.size();
        for [x, y] in region::canonical_points(mode, size) {
            let value = self.get(x, y);
            for [mx, my] in region::mirrored_points(mode, size, x, y) {
                self.set(mx, my, value);
            }
        }
        self
    }

    /// Resample to a new side length and restore terrain symmetry
    pub fn resize(&mut self, size: usize) -> &mut Self {
        self.resize_with(size, self.symmetry.terrain)
    }

    /// Resample to a new side length and restore `mode`
    ///
    /// Uses nearest-cell sampling with a real-valued scale factor, so both
    /// enlarging and shrinking map every new cell onto an existing one.
    pub fn resize_with(&mut self, size: usize, mode: Symmetry) -> &mut Self {
        let old_size = self.size();
        if size == old_size {
            return self;
        }
        let resized = if old_size == 0 {
            Array2::from_elem((size, size), T::default())
        } else {
            Array2::from_shape_fn((size, size), |(x, y)| {
                self.get(x * old_size / size, y * old_size / size)
            })
        };
        self.cells = resized;
        self.apply_symmetry_with(mode)
    }
}

/// Total weight and cell count of the square window of `radius` around `(x, y)`
///
/// The window is clipped to the grid, so edge cells average over fewer cells.
pub fn window_total(table: &Array2<i64>, x: usize, y: usize, radius: usize) -> (i64, usize) {
    let last = table.nrows().saturating_sub(1);
    let left = x.saturating_sub(radius);
    let right = x.saturating_add(radius).min(last);
    let up = y.saturating_sub(radius);
    let down = y.saturating_add(radius).min(last);
    let at = |x: usize, y: usize| table.get([x, y]).copied().unwrap_or(0);

    let corner = if left > 0 && up > 0 { at(left - 1, up - 1) } else { 0 };
    let above = if up > 0 { at(right, up - 1) } else { 0 };
    let beside = if left > 0 { at(left - 1, down) } else { 0 };
    let total = at(right, down) + corner - above - beside;
    let area = (right - left + 1) * (down - up + 1);
    (total, area)
}

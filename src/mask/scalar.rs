//! Scalar mask operators
//!
//! Elementwise arithmetic, offset stamping, integer-backed smoothing, range
//! filtering and slope estimation on `Grid<f32>`. Pairwise operators validate
//! sizes before touching any cell.

use ndarray::Array2;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::distance::maxima;
use crate::io::configuration::INNER_COUNT_SCALE;
use crate::io::error::{Result, ensure_same_size};
use crate::mask::grid::{Grid, window_total};
use crate::mask::{BinaryMask, ScalarMask};

impl Grid<f32> {
    /// Scalar mask holding `high` where `mask` is true and `low` elsewhere
    pub fn from_binary(mask: &mut BinaryMask, low: f32, high: f32) -> Self {
        let seed = mask.next_seed();
        let cells = mask.cells().mapv(|cell| if cell { high } else { low });
        Self::with_cells(cells, seed, mask.symmetry_settings())
    }

    /// Overwrite every cell with `high` where `mask` is true and `low` elsewhere
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn init(&mut self, mask: &BinaryMask, low: f32, high: f32) -> Result<&mut Self> {
        self.zip_with(mask, "init", |_, cell| if cell { high } else { low })
    }

    /// Set every cell to zero
    pub fn clear(&mut self) -> &mut Self {
        self.fill(0.0)
    }

    /// Smallest cell value, 0 for an empty mask
    pub fn min(&self) -> f32 {
        self.cells()
            .iter()
            .copied()
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Largest cell value, 0 for an empty mask
    pub fn max(&self) -> f32 {
        self.cells()
            .iter()
            .copied()
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Sum of all cells
    pub fn sum(&self) -> f32 {
        self.cells().sum()
    }

    /// Mean cell value, 0 for an empty mask
    pub fn avg(&self) -> f32 {
        let count = self.size() * self.size();
        if count == 0 {
            return 0.0;
        }
        self.sum() / count as f32
    }

    /// Cell-wise sum
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn add(&mut self, other: &ScalarMask) -> Result<&mut Self> {
        self.zip_with(other, "add", |a, b| a + b)
    }

    /// Cell-wise difference
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn subtract(&mut self, other: &ScalarMask) -> Result<&mut Self> {
        self.zip_with(other, "subtract", |a, b| a - b)
    }

    /// Cell-wise product
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn multiply(&mut self, other: &ScalarMask) -> Result<&mut Self> {
        self.zip_with(other, "multiply", |a, b| a * b)
    }

    /// Add a constant to every cell
    pub fn add_scalar(&mut self, value: f32) -> &mut Self {
        self.cells_mut().mapv_inplace(|cell| cell + value);
        self
    }

    /// Subtract a constant from every cell
    pub fn subtract_scalar(&mut self, value: f32) -> &mut Self {
        self.add_scalar(-value)
    }

    /// Multiply every cell by a constant
    pub fn multiply_scalar(&mut self, value: f32) -> &mut Self {
        self.cells_mut().mapv_inplace(|cell| cell * value);
        self
    }

    /// Add `value` wherever `mask` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn add_binary(&mut self, mask: &BinaryMask, value: f32) -> Result<&mut Self> {
        self.zip_with(mask, "add_binary", |a, cell| if cell { a + value } else { a })
    }

    /// Subtract `value` wherever `mask` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn subtract_binary(&mut self, mask: &BinaryMask, value: f32) -> Result<&mut Self> {
        self.zip_with(mask, "subtract_binary", |a, cell| if cell { a - value } else { a })
    }

    /// Add `other` stamped at `(x, y)`
    ///
    /// See [`Grid::multiply_at_offset`] for the alignment rules.
    pub fn add_at_offset(&mut self, other: &ScalarMask, x: i64, y: i64, center: bool) -> &mut Self {
        self.combine_at_offset(other, x, y, center, |a, b| a + b)
    }

    /// Subtract `other` stamped at `(x, y)`
    pub fn subtract_at_offset(
        &mut self,
        other: &ScalarMask,
        x: i64,
        y: i64,
        center: bool,
    ) -> &mut Self {
        self.combine_at_offset(other, x, y, center, |a, b| a - b)
    }

    /// Multiply by `other` stamped at `(x, y)`
    ///
    /// The window is the smaller of the two side lengths `s`, shifted left and
    /// up by `s / 2` when `center` is set. When this mask is the larger one,
    /// each window cell of `other` is combined into the shifted cell and into
    /// every terrain-symmetry image of it, so symmetric masks stay symmetric.
    /// Otherwise each cell of this mask is combined with the cell of `other`
    /// found through the shifted window, skipping cells that fall outside it,
    /// and symmetry is re-applied.
    pub fn multiply_at_offset(
        &mut self,
        other: &ScalarMask,
        x: i64,
        y: i64,
        center: bool,
    ) -> &mut Self {
        self.combine_at_offset(other, x, y, center, |a, b| a * b)
    }

    fn combine_at_offset<F>(
        &mut self,
        other: &ScalarMask,
        x: i64,
        y: i64,
        center: bool,
        op: F,
    ) -> &mut Self
    where
        F: Fn(f32, f32) -> f32,
    {
        let window = self.size().min(other.size());
        let shift = if center { (window / 2) as i64 } else { 0 };
        let (offset_x, offset_y) = (x - shift, y - shift);

        if self.size() == window {
            for cx in 0..window {
                for cy in 0..window {
                    let sample = other.try_get(cx as i64 + offset_x, cy as i64 + offset_y);
                    if let Some(value) = sample {
                        self.set(cx, cy, op(self.get(cx, cy), value));
                    }
                }
            }
            return self.apply_symmetry();
        }

        for bx in 0..window {
            for by in 0..window {
                let (tx, ty) = (bx as i64 + offset_x, by as i64 + offset_y);
                if !self.in_bounds(tx, ty) {
                    continue;
                }
                let value = other.get(bx, by);
                let (tx, ty) = (tx as usize, ty as usize);
                self.set(tx, ty, op(self.get(tx, ty), value));
                for [mx, my] in self.mirrored_points(tx, ty) {
                    self.set(mx, my, op(self.get(mx, my), value));
                }
            }
        }
        self
    }

    /// Multiply by `other` stamped, centred, at every cell
    pub fn convolve(&mut self, other: &ScalarMask) -> &mut Self {
        let size = self.size();
        for x in 0..size {
            for y in 0..size {
                self.multiply_at_offset(other, x as i64, y as i64, true);
            }
        }
        self.apply_symmetry()
    }

    /// Add normally distributed noise scaled by `scale`
    pub fn add_gaussian_noise(&mut self, scale: f32) -> &mut Self {
        let size = self.size();
        for x in 0..size {
            for y in 0..size {
                let noise: f32 = self.random_mut().sample(StandardNormal);
                self.set(x, y, noise.mul_add(scale, self.get(x, y)));
            }
        }
        self.apply_symmetry()
    }

    /// Add uniform noise in `[0, scale)`
    pub fn add_white_noise(&mut self, scale: f32) -> &mut Self {
        let size = self.size();
        for x in 0..size {
            for y in 0..size {
                let noise = self.random_mut().random::<f32>();
                self.set(x, y, noise.mul_add(scale, self.get(x, y)));
            }
        }
        self.apply_symmetry()
    }

    /// Square root of every cell
    pub fn sqrt(&mut self) -> &mut Self {
        self.cells_mut().mapv_inplace(f32::sqrt);
        self
    }

    /// Cell-wise minimum
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn min_with(&mut self, other: &ScalarMask) -> Result<&mut Self> {
        self.zip_with(other, "min_with", f32::min)
    }

    /// Cell-wise maximum
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn max_with(&mut self, other: &ScalarMask) -> Result<&mut Self> {
        self.zip_with(other, "max_with", f32::max)
    }

    /// Raise every cell to at least `value`
    pub fn clamp_min(&mut self, value: f32) -> &mut Self {
        self.cells_mut().mapv_inplace(|cell| cell.max(value));
        self
    }

    /// Lower every cell to at most `value`
    pub fn clamp_max(&mut self, value: f32) -> &mut Self {
        self.cells_mut().mapv_inplace(|cell| cell.min(value));
        self
    }

    /// Zero every cell below `value`
    pub fn threshold(&mut self, value: f32) -> &mut Self {
        self.cells_mut()
            .mapv_inplace(|cell| if cell < value { 0.0 } else { cell });
        self
    }

    /// Nearest-cell upsampling to `size`
    pub fn enlarge(&mut self, size: usize) -> &mut Self {
        self.resize(size)
    }

    /// Box-average downsampling to `size`
    ///
    /// Each new cell averages the block of old cells mapping onto it. Sizes
    /// at or above the current one fall back to nearest-cell resampling.
    pub fn shrink(&mut self, size: usize) -> &mut Self {
        let old_size = self.size();
        if size == 0 || size >= old_size {
            return self.resize(size);
        }
        let cells = Array2::from_shape_fn((size, size), |(x, y)| {
            let (x_start, x_end) = (x * old_size / size, (x + 1) * old_size / size);
            let (y_start, y_end) = (y * old_size / size, (y + 1) * old_size / size);
            let mut total = 0.0;
            for ox in x_start..x_end {
                for oy in y_start..y_end {
                    total += self.get(ox, oy);
                }
            }
            total / ((x_end - x_start) * (y_end - y_start)) as f32
        });
        self.replace_cells(cells);
        self.apply_symmetry()
    }

    /// Zero every cell where `mask` is false
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn remove_values_outside_of(&mut self, mask: &BinaryMask) -> Result<&mut Self> {
        self.zip_with(mask, "remove_values_outside_of", |a, cell| if cell { a } else { 0.0 })
    }

    /// Zero every cell where `mask` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn remove_values_inside_of(&mut self, mask: &BinaryMask) -> Result<&mut Self> {
        self.zip_with(mask, "remove_values_inside_of", |a, cell| if cell { 0.0 } else { a })
    }

    /// Zero every cell outside `[min, max]`
    pub fn remove_values_outside_of_range(&mut self, min: f32, max: f32) -> &mut Self {
        self.cells_mut()
            .mapv_inplace(|cell| if cell < min || cell > max { 0.0 } else { cell });
        self
    }

    /// Zero every cell inside `[min, max]`
    pub fn remove_values_in_range(&mut self, min: f32, max: f32) -> &mut Self {
        self.cells_mut()
            .mapv_inplace(|cell| if cell < min || cell > max { cell } else { 0.0 });
        self
    }

    /// Replace the cells selected by `range` with those of `replacement`
    ///
    /// # Errors
    ///
    /// Returns an error if any operand differs in size
    pub fn replace_values_in_range_with(
        &mut self,
        range: &BinaryMask,
        replacement: &ScalarMask,
    ) -> Result<&mut Self> {
        ensure_same_size("replace_values_in_range_with", self.size(), range.size())?;
        ensure_same_size("replace_values_in_range_with", self.size(), replacement.size())?;
        self.zip_with(range, "replace_values_in_range_with", |a, cell| if cell { 0.0 } else { a })?;
        let mut inside = replacement.copy_with_seed(self.next_seed());
        inside.remove_values_outside_of(range)?;
        self.add(&inside)
    }

    /// Copy keeping only the cells where `mask` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn copy_within_range(&mut self, mask: &BinaryMask) -> Result<ScalarMask> {
        ensure_same_size("copy_within_range", self.size(), mask.size())?;
        let mut result = self.copy();
        result.remove_values_outside_of(mask)?;
        Ok(result)
    }

    /// Copy keeping only the cells where `mask` is false
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn copy_outside_range(&mut self, mask: &BinaryMask) -> Result<ScalarMask> {
        ensure_same_size("copy_outside_range", self.size(), mask.size())?;
        let mut result = self.copy();
        result.remove_values_inside_of(mask)?;
        Ok(result)
    }

    /// Blend the bands around the edges of `mask` with a lightly smoothed copy
    ///
    /// Bands of growing width up to `distance` are replaced in turn, so cells
    /// nearest an edge are smoothed the most.
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn smooth_within_distance_of_edges_of(
        &mut self,
        mask: &mut BinaryMask,
        distance: usize,
    ) -> Result<&mut Self> {
        ensure_same_size("smooth_within_distance_of_edges_of", self.size(), mask.size())?;
        for width in (0..distance).step_by(2) {
            let band = mask.areas_within_distance_of_edges((width + 1) as f32);
            let mut smoothed = self.copy();
            smoothed.smooth(1);
            self.replace_values_in_range_with(&band, &smoothed)?;
        }
        Ok(self)
    }

    /// Boolean mask of the cells inside `[min, max]`
    ///
    /// Cells outside the range are zeroed before thresholding at `min`, so with
    /// `min <= 0` they count as inside as well.
    pub fn convert_to_binary_mask(&mut self, min: f32, max: f32) -> BinaryMask {
        let mut filtered = self.copy();
        filtered.remove_values_outside_of_range(min, max);
        BinaryMask::from_scalar(&mut filtered, min)
    }

    /// Distance field of the cells inside `[min, max]`
    pub fn distance_field_for_range(&mut self, min: f32, max: f32) -> ScalarMask {
        self.convert_to_binary_mask(min, max).distance_field()
    }

    /// Zero intensity regions in `[min_intensity, max_intensity]` whose size lies outside `[min_size, max_size]`
    ///
    /// Values are expected in `[0, 1]`; rejected cells are pulled down by one and clamped at zero.
    pub fn remove_areas_outside_of_specified_intensity_and_size(
        &mut self,
        min_size: usize,
        max_size: usize,
        min_intensity: f32,
        max_intensity: f32,
    ) -> &mut Self {
        let mut kept = self.convert_to_binary_mask(min_intensity, max_intensity);
        kept.remove_areas_outside_of_specified_size(min_size, max_size)
            .invert();
        let rejected = Self::from_binary(&mut kept, 0.0, 1.0);
        self.cells_mut()
            .zip_mut_with(rejected.cells(), |cell, &drop| *cell = (*cell - drop).max(0.0));
        self
    }

    /// Remove what `remove_areas_outside_of_specified_intensity_and_size` would keep
    pub fn remove_areas_of_specified_intensity_and_size(
        &mut self,
        min_size: usize,
        max_size: usize,
        min_intensity: f32,
        max_intensity: f32,
    ) -> &mut Self {
        let mut kept = self.copy();
        kept.remove_areas_outside_of_specified_intensity_and_size(
            min_size,
            max_size,
            min_intensity,
            max_intensity,
        );
        self.cells_mut()
            .zip_mut_with(kept.cells(), |cell, &keep| *cell -= keep);
        self
    }

    /// Peel sized intensity regions from the top down in `precision` bands
    pub fn remove_areas_of_specified_size_with_local_maximums(
        &mut self,
        min_size: usize,
        max_size: usize,
        precision: usize,
        value_max: f32,
    ) -> &mut Self {
        for level in 0..precision {
            let floor = (1.0 - level as f32 / precision as f32) * value_max;
            self.remove_areas_of_specified_intensity_and_size(min_size, max_size, floor, value_max);
        }
        self.remove_areas_of_specified_intensity_and_size(min_size, max_size, f32::EPSILON, value_max)
    }

    /// Lower heights away from the land of `mask` by `slope` per cell of distance
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn mask_to_ocean_heights(&mut self, slope: f32, mask: &BinaryMask) -> Result<&mut Self> {
        ensure_same_size("mask_to_ocean_heights", self.size(), mask.size())?;
        let mut land = mask.copy_with_seed(self.next_seed());
        let mut depth = land.distance_field();
        depth.multiply_scalar(-slope);
        self.add(&depth)
    }

    // Scalar inner counts are integer sums of values scaled by INNER_COUNT_SCALE
    fn scaled_inner_count(&self) -> Array2<i64> {
        self.inner_count(|value| (value * INNER_COUNT_SCALE).round() as i64)
    }

    fn window_mean(table: &Array2<i64>, x: usize, y: usize, radius: usize) -> f32 {
        let (total, area) = window_total(table, x, y, radius);
        total as f32 / INNER_COUNT_SCALE / area as f32
    }

    /// Box blur with a square window of `radius`
    pub fn smooth(&mut self, radius: usize) -> &mut Self {
        let table = self.scaled_inner_count();
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            Self::window_mean(&table, x, y, radius)
        });
        self.replace_cells(cells);
        self
    }

    /// Box blur restricted to the cells where `limiter` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn smooth_limited(&mut self, radius: usize, limiter: &BinaryMask) -> Result<&mut Self> {
        ensure_same_size("smooth_limited", self.size(), limiter.size())?;
        let table = self.scaled_inner_count();
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            if limiter.get(x, y) {
                Self::window_mean(&table, x, y, radius)
            } else {
                self.get(x, y)
            }
        });
        self.replace_cells(cells);
        Ok(self)
    }

    /// Squared box blur, which sharpens peaks
    pub fn spike(&mut self, radius: usize) -> &mut Self {
        let table = self.scaled_inner_count();
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            let mean = Self::window_mean(&table, x, y, radius);
            mean * mean
        });
        self.replace_cells(cells);
        self
    }

    /// Squared box blur restricted to the cells where `limiter` is true
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn spike_limited(&mut self, radius: usize, limiter: &BinaryMask) -> Result<&mut Self> {
        ensure_same_size("spike_limited", self.size(), limiter.size())?;
        let table = self.scaled_inner_count();
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            if limiter.get(x, y) {
                let mean = Self::window_mean(&table, x, y, radius);
                mean * mean
            } else {
                self.get(x, y)
            }
        });
        self.replace_cells(cells);
        Ok(self)
    }

    /// Slope magnitude from central differences, clamped at the border
    pub fn gradient(&mut self) -> &mut Self {
        let last = self.size().saturating_sub(1);
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            let x_slope = self.get((x + 1).min(last), y) - self.get(x.saturating_sub(1), y);
            let y_slope = self.get(x, (y + 1).min(last)) - self.get(x, y.saturating_sub(1));
            x_slope.hypot(y_slope)
        });
        self.replace_cells(cells);
        self
    }

    /// Largest forward difference along `x`, `y` and the diagonal
    ///
    /// Matches the slope convention used by the engine's terrain lighting.
    /// Differences only look toward higher coordinates, so the result is not
    /// mirrored and a symmetric input can give an asymmetric gradient.
    pub fn supcom_gradient(&mut self) -> &mut Self {
        let last = self.size().saturating_sub(1);
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            let value = self.get(x, y);
            let (next_x, next_y) = ((x + 1).min(last), (y + 1).min(last));
            let x_slope = (value - self.get(next_x, y)).abs();
            let y_slope = (value - self.get(x, next_y)).abs();
            let diagonal = (value - self.get(next_x, next_y)).abs();
            x_slope.max(y_slope).max(diagonal)
        });
        self.replace_cells(cells);
        self
    }

    /// Check whether `(x, y)` is an interior 8-neighbour maximum
    pub fn is_local_max(&self, x: usize, y: usize) -> bool {
        maxima::is_local_max(self, x, y)
    }

    /// Check whether `(x, y)` peaks along either axis
    pub fn is_local_1d_max(&self, x: usize, y: usize) -> bool {
        maxima::is_local_1d_max(self, x, y)
    }

    /// Local maxima with values strictly between `min` and `max`
    pub fn local_maxima(&mut self, min: f32, max: f32) -> BinaryMask {
        maxima::local_maxima(self, min, max)
    }

    /// Axis-wise local maxima with values strictly between `min` and `max`
    pub fn local_1d_maxima(&mut self, min: f32, max: f32) -> BinaryMask {
        maxima::local_1d_maxima(self, min, max)
    }
}

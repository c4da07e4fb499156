//! Boolean mask operators
//!
//! Set algebra, morphology, probabilistic growth and the drawing primitives.
//! Operators that visit only the canonical region copy their result to the
//! mirrored cells before returning. Drawing primitives (`fill_*`,
//! `fill_coordinates`, `limit_to_spawn_region`) write exactly the cells they
//! name and leave symmetry to the caller.

use bitvec::{bitvec, vec::BitVec};
use ndarray::Array2;
use rand::Rng;

use crate::distance::{sampling, transform};
use crate::io::configuration::DEFAULT_SMOOTH_DENSITY;
use crate::io::error::Result;
use crate::mask::grid::{Grid, window_total};
use crate::mask::{BinaryMask, ScalarMask};
use crate::symmetry::Symmetry;

// 4-neighbourhood offsets
const STEPS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

impl Grid<bool> {
    /// Threshold a scalar mask: cells at or above `threshold` become true
    pub fn from_scalar(mask: &mut ScalarMask, threshold: f32) -> Self {
        let seed = mask.next_seed();
        let cells = mask.cells().mapv(|value| value >= threshold);
        Self::with_cells(cells, seed, mask.symmetry_settings())
    }

    /// Set every cell to false
    pub fn clear(&mut self) -> &mut Self {
        self.fill(false)
    }

    /// Set every canonical cell to true with probability `density`
    pub fn randomize(&mut self, density: f32) -> &mut Self {
        for [x, y] in self.canonical_points(self.symmetry_settings().terrain) {
            let value = self.random_mut().random::<f32>() < density;
            self.set(x, y, value);
        }
        self.apply_symmetry()
    }

    /// Keep each true cell of the spawn region with probability `density`
    pub fn flip_values(&mut self, density: f32) -> &mut Self {
        self.flip_values_with(density, self.symmetry_settings().spawn)
    }

    /// Keep each true canonical cell of `mode` with probability `density`
    pub fn flip_values_with(&mut self, density: f32, mode: Symmetry) -> &mut Self {
        for [x, y] in self.canonical_points(mode) {
            if self.get(x, y) {
                let value = self.random_mut().random::<f32>() < density;
                self.set(x, y, value);
            }
        }
        self.apply_symmetry_with(mode)
    }

    /// Mark the paths of `walkers` unconstrained random walks
    pub fn random_walk(&mut self, walkers: usize, steps: usize) -> &mut Self {
        for _ in 0..walkers {
            let Some((mut x, mut y)) = self.random_start() else {
                break;
            };
            for _ in 0..steps {
                self.mark(x, y);
                let pick = self.random_mut().random_range(0..STEPS.len());
                if let Some(&(dx, dy)) = STEPS.get(pick) {
                    x += dx;
                    y += dy;
                }
            }
        }
        self.apply_symmetry()
    }

    /// Mark random walks that never step in one randomly banned direction
    pub fn progressive_walk(&mut self, walkers: usize, steps: usize) -> &mut Self {
        for _ in 0..walkers {
            let Some((mut x, mut y)) = self.random_start() else {
                break;
            };
            let mut directions = STEPS.to_vec();
            let banned = self.random_mut().random_range(0..directions.len());
            directions.remove(banned);
            for _ in 0..steps {
                self.mark(x, y);
                let pick = self.random_mut().random_range(0..directions.len());
                if let Some(&(dx, dy)) = directions.get(pick) {
                    x += dx;
                    y += dy;
                }
            }
        }
        self.apply_symmetry()
    }

    // Walk starts are drawn from the canonical region; the column may land one past its end
    fn random_start(&mut self) -> Option<(i64, i64)> {
        let min_x = self.min_x_bound();
        let max_x = self.max_x_bound();
        if min_x >= max_x {
            return None;
        }
        let x = self.random_mut().random_range(min_x..max_x);
        let min_y = self.min_y_bound(x);
        let max_y = self.max_y_bound(x).max(min_y);
        let y = self.random_mut().random_range(min_y..=max_y);
        Some((x as i64, y as i64))
    }

    fn mark(&mut self, x: i64, y: i64) {
        if self.in_bounds(x, y) {
            self.set(x as usize, y as usize, true);
        }
    }

    /// Negate every cell
    pub fn invert(&mut self) -> &mut Self {
        self.cells_mut().mapv_inplace(|cell| !cell);
        self
    }

    /// Check whether any 4-neighbour of `(x, y)` holds a different value
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        let value = self.get(x, y);
        STEPS.iter().any(|&(dx, dy)| {
            self.try_get(x as i64 + dx, y as i64 + dy)
                .is_some_and(|neighbour| neighbour != value)
        })
    }

    /// Grow true regions by a disc of `radius` around every true edge cell
    pub fn inflate(&mut self, radius: f32) -> &mut Self {
        let marked = self.discs_around_edges(radius, true);
        let size = self.size();
        for index in marked.iter_ones() {
            self.set(index / size, index % size, true);
        }
        self
    }

    /// Shrink true regions by a disc of `radius` around every false edge cell
    pub fn deflate(&mut self, radius: f32) -> &mut Self {
        let marked = self.discs_around_edges(radius, false);
        let size = self.size();
        for index in marked.iter_ones() {
            self.set(index / size, index % size, false);
        }
        self
    }

    // Cells within (radius + 0.5)^2 of an edge cell holding `value`, row-major
    fn discs_around_edges(&self, radius: f32, value: bool) -> BitVec {
        let size = self.size();
        let mut marked = bitvec![0; size * size];
        let reach = (radius + 0.5) * (radius + 0.5);
        let span = (radius + 0.5).max(0.0) as i64;

        for x in 0..size {
            for y in 0..size {
                if self.get(x, y) != value || !self.is_edge(x, y) {
                    continue;
                }
                for dx in -span..=span {
                    for dy in -span..=span {
                        let (x2, y2) = (x as i64 + dx, y as i64 + dy);
                        if self.in_bounds(x2, y2) && ((dx * dx + dy * dy) as f32) <= reach {
                            marked.set(x2 as usize * size + y2 as usize, true);
                        }
                    }
                }
            }
        }
        marked
    }

    /// Clear true cells with more than one false 4-neighbour
    pub fn cut_corners(&mut self) -> &mut Self {
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            let open = STEPS
                .iter()
                .filter(|&&(dx, dy)| self.try_get(x as i64 + dx, y as i64 + dy) == Some(false))
                .count();
            open <= 1 && self.get(x, y)
        });
        self.replace_cells(cells);
        self
    }

    /// Eat inflated random holes of `size` out of the mask
    pub fn acid(&mut self, strength: f32, size: f32) -> &mut Self {
        let seed = self.next_seed();
        let mut holes = Self::new(self.size(), seed, self.symmetry_settings());
        holes.randomize(strength).inflate(size);
        self.cells_mut()
            .zip_mut_with(holes.cells(), |cell, &hole| *cell = *cell && !hole);
        self
    }

    /// Turn edge cells true with probability `strength`, `count` times
    pub fn grow(&mut self, strength: f32, count: usize) -> &mut Self {
        self.grow_with(strength, self.symmetry_settings().terrain, count)
    }

    /// Turn edge cells true with probability `strength` under `mode`
    pub fn grow_with(&mut self, strength: f32, mode: Symmetry, count: usize) -> &mut Self {
        for _ in 0..count {
            let mut next = Array2::from_elem((self.size(), self.size()), false);
            for [x, y] in self.canonical_points(mode) {
                let value = self.get(x, y);
                let grown = self.is_edge(x, y) && self.random_mut().random::<f32>() < strength;
                if let Some(cell) = next.get_mut([x, y]) {
                    *cell = value || grown;
                }
            }
            self.replace_cells(next);
            self.apply_symmetry_with(mode);
        }
        self
    }

    /// Turn edge cells false with probability `strength`, `count` times
    pub fn erode(&mut self, strength: f32, count: usize) -> &mut Self {
        self.erode_with(strength, self.symmetry_settings().terrain, count)
    }

    /// Turn edge cells false with probability `strength` under `mode`
    pub fn erode_with(&mut self, strength: f32, mode: Symmetry, count: usize) -> &mut Self {
        for _ in 0..count {
            let mut next = Array2::from_elem((self.size(), self.size()), false);
            for [x, y] in self.canonical_points(mode) {
                let value = self.get(x, y);
                let eroded = self.is_edge(x, y) && self.random_mut().random::<f32>() < strength;
                if let Some(cell) = next.get_mut([x, y]) {
                    *cell = value && !eroded;
                }
            }
            self.replace_cells(next);
            self.apply_symmetry_with(mode);
        }
        self
    }

    /// Replace the mask with its edge cells
    pub fn outline(&mut self) -> &mut Self {
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| self.is_edge(x, y));
        self.replace_cells(cells);
        self
    }

    /// Majority filter with the default density
    pub fn smooth(&mut self, radius: usize) -> &mut Self {
        self.smooth_with_density(radius, DEFAULT_SMOOTH_DENSITY)
    }

    /// Set each cell true when at least `density` of its window is true
    pub fn smooth_with_density(&mut self, radius: usize, density: f32) -> &mut Self {
        let table = self.inner_count(i64::from);
        let cells = Array2::from_shape_fn((self.size(), self.size()), |(x, y)| {
            let (count, area) = window_total(&table, x, y, radius);
            count as f32 >= area as f32 * density
        });
        self.replace_cells(cells);
        self
    }

    /// Cell-wise OR
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn union(&mut self, other: &BinaryMask) -> Result<&mut Self> {
        self.zip_with(other, "union", |a, b| a || b)
    }

    /// Cell-wise AND
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn intersect(&mut self, other: &BinaryMask) -> Result<&mut Self> {
        self.zip_with(other, "intersect", |a, b| a && b)
    }

    /// Cell-wise AND NOT
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size
    pub fn difference(&mut self, other: &BinaryMask) -> Result<&mut Self> {
        self.zip_with(other, "difference", |a, b| a && !b)
    }

    /// Fill the map sides facing each other under spawn symmetry
    pub fn fill_sides(&mut self, extent: i64, value: bool) -> &mut Self {
        self.fill_sides_with(extent, value, self.symmetry_settings().spawn)
    }

    /// Fill the map sides facing each other under `mode`
    ///
    /// Modes without a pair of opposing sides leave the mask untouched.
    pub fn fill_sides_with(&mut self, extent: i64, value: bool, mode: Symmetry) -> &mut Self {
        let size = self.size() as i64;
        let half = extent / 2;
        let slanted = extent * 3 / 4;
        match mode {
            Symmetry::Z => {
                self.fill_rect(0, 0, half, size, value);
                self.fill_rect(size - half, 0, size - half, size, value)
            }
            Symmetry::X => {
                self.fill_rect(0, 0, size, half, value);
                self.fill_rect(0, size - half, size, half, value)
            }
            Symmetry::XZ => {
                self.fill_parallelogram(0, 0, size, slanted, 0, -1, value);
                self.fill_parallelogram(size - slanted, size, size, slanted, 0, -1, value)
            }
            Symmetry::ZX => {
                self.fill_parallelogram(size - slanted, 0, slanted, slanted, 1, 0, value);
                self.fill_parallelogram(-slanted, size - slanted, slanted, slanted, 1, 0, value)
            }
            _ => self,
        }
    }

    /// Fill the band between spawn positions under spawn symmetry
    pub fn fill_center(&mut self, extent: i64, value: bool) -> &mut Self {
        self.fill_center_with(extent, value, self.symmetry_settings().spawn)
    }

    /// Fill the band between spawn positions under `mode`
    ///
    /// Compound modes fill the bands of their components, narrowed when the
    /// team symmetry differs from the mode itself.
    pub fn fill_center_with(&mut self, extent: i64, value: bool, mode: Symmetry) -> &mut Self {
        let size = self.size() as i64;
        let middle = size as f32 / 2.0;
        let team = self.symmetry_settings().team;
        match mode {
            Symmetry::Point2 => self.fill_circle(middle, middle, extent as f32 * 3.0 / 4.0, value),
            Symmetry::Point4 => {
                self.fill_circle(middle, middle, extent as f32 * 3.0 / 4.0, value);
                match team {
                    Symmetry::X | Symmetry::Z => {
                        self.fill_center_with(extent / 2, value, Symmetry::X);
                        self.fill_center_with(extent / 2, value, Symmetry::Z)
                    }
                    Symmetry::XZ | Symmetry::ZX => {
                        self.fill_center_with(extent / 2, value, Symmetry::XZ);
                        self.fill_center_with(extent / 2, value, Symmetry::ZX)
                    }
                    _ => self,
                }
            }
            Symmetry::Z => self.fill_rect(0, size / 2 - extent / 2, size, extent, value),
            Symmetry::X => self.fill_rect(size / 2 - extent / 2, 0, extent, size, value),
            Symmetry::XZ => self.fill_diagonal(extent * 3 / 4, false, value),
            Symmetry::ZX => self.fill_diagonal(extent * 3 / 4, true, value),
            Symmetry::Diag | Symmetry::Quad => {
                let Some((first, second)) = mode.components() else {
                    return self;
                };
                if team == mode {
                    self.fill_center_with(extent / 2, value, first);
                    self.fill_center_with(extent / 2, value, second)
                } else {
                    self.fill_center_with(extent / 4, value, first);
                    self.fill_center_with(extent / 4, value, second);
                    self.fill_center_with(extent, value, team)
                }
            }
            Symmetry::None => self,
        }
    }

    /// Clear every cell outside the spawn symmetry's canonical region
    pub fn limit_to_spawn_region(&mut self) -> &mut Self {
        let mode = self.symmetry_settings().spawn;
        let size = self.size();
        for x in 0..size {
            let min_y = self.min_y_bound_for(mode, x);
            let max_y = self.max_y_bound_for(mode, x);
            let row_inside = x >= self.min_x_bound_for(mode) && x < self.max_x_bound_for(mode);
            for y in 0..size {
                if !row_inside || y < min_y || y >= max_y {
                    self.set(x, y, false);
                }
            }
        }
        self
    }

    /// Fill the team symmetry's canonical region
    pub fn fill_half(&mut self, value: bool) -> &mut Self {
        self.fill_half_with(value, self.symmetry_settings().team)
    }

    /// Fill the canonical region of `mode`
    pub fn fill_half_with(&mut self, value: bool, mode: Symmetry) -> &mut Self {
        for [x, y] in self.canonical_points(mode) {
            self.set(x, y, value);
        }
        self
    }

    /// Fill every cell within `radius` of the real-valued centre `(x, y)`
    pub fn fill_circle(&mut self, x: f32, y: f32, radius: f32, value: bool) -> &mut Self {
        let size = self.size() as f32;
        let end_x = size.min(x + radius + 1.0) as i64;
        let end_y = size.min(y + radius + 1.0) as i64;
        let start_x = (x - radius).max(0.0) as i64;
        let start_y = (y - radius).max(0.0) as i64;
        let reach = radius * radius;
        for cx in start_x..end_x {
            for cy in start_y..end_y {
                let dx = x - cx as f32;
                let dy = y - cy as f32;
                if dx.mul_add(dx, dy * dy) <= reach {
                    self.set(cx as usize, cy as usize, value);
                }
            }
        }
        self
    }

    /// Fill an `extent` square with its corner at `(x, y)`
    pub fn fill_square(&mut self, x: i64, y: i64, extent: i64, value: bool) -> &mut Self {
        self.fill_rect(x, y, extent, extent, value)
    }

    /// Fill a `width` by `height` rectangle with its corner at `(x, y)`
    pub fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, value: bool) -> &mut Self {
        self.fill_parallelogram(x, y, width, height, 0, 0, value)
    }

    /// Fill the rectangle spanned by two opposite corners
    pub fn fill_rectangle_from_points(
        &mut self,
        x1: i64,
        x2: i64,
        y1: i64,
        y2: i64,
        value: bool,
    ) -> &mut Self {
        let (low_x, high_x) = (x1.min(x2), x1.max(x2));
        let (low_y, high_y) = (y1.min(y2), y1.max(y2));
        self.fill_rect(low_x, low_y, high_x - low_x, high_y - low_y, value)
    }

    /// Fill a sheared rectangle, clipped to the grid
    ///
    /// Cell `(px, py)` of the `width` by `height` shape lands on
    /// `(x + px + py * x_slope, y + py + px * y_slope)`.
    pub fn fill_parallelogram(
        &mut self,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        x_slope: i64,
        y_slope: i64,
        value: bool,
    ) -> &mut Self {
        for px in 0..width {
            for py in 0..height {
                let target_x = x + px + py * x_slope;
                let target_y = y + py + px * y_slope;
                if self.in_bounds(target_x, target_y) {
                    self.set(target_x as usize, target_y as usize, value);
                }
            }
        }
        self
    }

    /// Fill a band of half-width `extent` along the main or anti diagonal
    pub fn fill_diagonal(&mut self, extent: i64, inverted: bool, value: bool) -> &mut Self {
        let size = self.size() as i64;
        for cx in -extent..extent {
            for y in 0..size {
                let x = if inverted { size - (cx + y) } else { cx + y };
                if self.in_bounds(x, y) {
                    self.set(x as usize, y as usize, value);
                }
            }
        }
        self
    }

    /// Fill a rim of `rim_width` cells around the map border
    pub fn fill_edge(&mut self, rim_width: usize, value: bool) -> &mut Self {
        let size = self.size();
        let rim = rim_width.min(size);
        let last = size.saturating_sub(1);
        for a in 0..rim {
            for b in 0..size - rim {
                self.set(a, b, value);
                self.set(last - a, last - b, value);
                self.set(b, last - a, value);
                self.set(last - b, a, value);
            }
        }
        self
    }

    /// Set every listed cell, skipping cells outside the grid
    pub fn fill_coordinates(&mut self, coordinates: &[[usize; 2]], value: bool) -> &mut Self {
        let size = self.size();
        for &[x, y] in coordinates {
            if x < size && y < size {
                self.set(x, y, value);
            }
        }
        self
    }

    /// Euclidean distance from every cell to the nearest true cell
    pub fn distance_field(&mut self) -> ScalarMask {
        let seed = self.next_seed();
        transform::distance_field(self, seed)
    }

    /// Number of true cells
    pub fn count(&self) -> usize {
        self.count_matching(true)
    }

    /// Every cell on a lattice of `spacing`
    pub fn all_coordinates(&self, spacing: usize) -> Vec<[usize; 2]> {
        sampling::all_coordinates(self, spacing)
    }

    /// Every lattice cell holding `value`
    pub fn all_coordinates_equal_to(&self, value: bool, spacing: usize) -> Vec<[usize; 2]> {
        sampling::all_coordinates_equal_to(self, value, spacing)
    }

    /// Greedy scan-order subset of the lattice with pairwise spacing of at least `radius`
    pub fn spaced_coordinates(&self, radius: f32, spacing: usize) -> Vec<[usize; 2]> {
        sampling::spaced_coordinates(&self.all_coordinates(spacing), radius)
    }

    /// Greedy spaced subset of the lattice cells holding `value`
    pub fn spaced_coordinates_equal_to(
        &self,
        value: bool,
        radius: f32,
        spacing: usize,
    ) -> Vec<[usize; 2]> {
        sampling::spaced_coordinates(&self.all_coordinates_equal_to(value, spacing), radius)
    }

    /// Random subset of true cells whose members and mirror images keep `min_spacing` apart
    pub fn random_coordinates(&mut self, min_spacing: f32) -> Vec<[usize; 2]> {
        sampling::random_coordinates(self, min_spacing)
    }

    /// A uniformly chosen true cell, `None` when the mask is empty
    pub fn random_position(&mut self) -> Option<[usize; 2]> {
        sampling::random_position(self)
    }
}

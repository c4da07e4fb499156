//! Connected components and area filtering on boolean masks
//!
//! Regions are 4-connected runs of equal-valued cells. Area filters seed their
//! flood fills from local maxima of a distance field, so each region is
//! visited from a cell near its middle.

use std::collections::VecDeque;

use bitvec::{bitvec, vec::BitVec};

use crate::distance::maxima::is_local_max;
use crate::io::configuration::{GAP_SMOOTH_DENSITY, GAP_SMOOTH_RADIUS};
use crate::mask::grid::Grid;
use crate::mask::{BinaryMask, ScalarMask};

// Neighbour visiting order of the flood fill
const NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (-1, 0), (0, -1), (1, 0)];

impl Grid<bool> {
    /// Cells of the 4-connected region containing `(x, y)`, in discovery order
    ///
    /// The search stops once more than `max_size` cells are collected, so a
    /// capped result holds `max_size + 1` cells.
    pub fn shape_coordinates(&self, x: usize, y: usize, max_size: usize) -> Vec<[usize; 2]> {
        let size = self.size();
        if x >= size || y >= size {
            return Vec::new();
        }
        let value = self.get(x, y);
        let index = |[px, py]: [usize; 2]| px * size + py;

        let mut area = Vec::new();
        let mut in_area: BitVec = bitvec![0; size * size];
        let mut on_edge: BitVec = bitvec![0; size * size];
        let mut queued: BitVec = bitvec![0; size * size];
        let mut queue = VecDeque::new();

        queue.push_back([x, y]);
        queued.set(index([x, y]), true);

        while let Some(next) = queue.pop_front() {
            queued.set(index(next), false);
            let [nx, ny] = next;
            if self.get(nx, ny) == value {
                if is_set(&in_area, index(next)) {
                    continue;
                }
                in_area.set(index(next), true);
                area.push(next);
                for (dx, dy) in NEIGHBOURS {
                    let (cx, cy) = (nx as i64 + dx, ny as i64 + dy);
                    if !self.in_bounds(cx, cy) {
                        continue;
                    }
                    let candidate = [cx as usize, cy as usize];
                    let slot = index(candidate);
                    if !is_set(&queued, slot) && !is_set(&in_area, slot) && !is_set(&on_edge, slot) {
                        queue.push_back(candidate);
                        queued.set(slot, true);
                    }
                }
            } else {
                on_edge.set(index(next), true);
            }
            if area.len() > max_size {
                break;
            }
        }
        area
    }

    /// Toggle every cell of the 4-connected region containing `(x, y)`
    pub fn fill_shape(&mut self, x: usize, y: usize) -> &mut Self {
        let size = self.size();
        if x >= size || y >= size {
            return self;
        }
        let value = self.get(x, y);
        let region = self.shape_coordinates(x, y, size * size);
        self.fill_coordinates(&region, !value)
    }

    /// Fill false regions and clear true regions smaller than `min_area` cells
    pub fn remove_areas_smaller_than(&mut self, min_area: usize) -> &mut Self {
        let limit = (min_area as f32).sqrt();

        let hole_field = self.distance_field();
        let hole_seeds = region_seeds(&hole_field, limit);
        self.fill_small_regions(&hole_seeds, min_area, true);

        let mut inverted = self.copy();
        inverted.invert();
        let island_field = inverted.distance_field();
        let island_seeds = region_seeds(&island_field, limit);
        self.fill_small_regions(&island_seeds, min_area, false);

        self.apply_symmetry()
    }

    fn fill_small_regions(&mut self, seeds: &[[usize; 2]], min_area: usize, value: bool) {
        let size = self.size();
        let mut consumed: BitVec = bitvec![0; size * size];
        for &[x, y] in seeds {
            if is_set(&consumed, x * size + y) {
                continue;
            }
            let region = self.shape_coordinates(x, y, min_area);
            if region.len() < min_area {
                self.fill_coordinates(&region, value);
            }
            for &[rx, ry] in &region {
                consumed.set(rx * size + ry, true);
            }
        }
    }

    /// Clear true regions of at least `max_area` cells
    pub fn remove_areas_bigger_than(&mut self, max_area: usize) -> &mut Self {
        let mut small = self.copy();
        small.remove_areas_smaller_than(max_area);
        self.cells_mut()
            .zip_mut_with(small.cells(), |cell, &kept| *cell = *cell && !kept);
        self.apply_symmetry()
    }

    /// Keep only regions between `min_size` and `max_size` cells
    pub fn remove_areas_outside_of_specified_size(
        &mut self,
        min_size: usize,
        max_size: usize,
    ) -> &mut Self {
        self.remove_areas_smaller_than(min_size)
            .remove_areas_bigger_than(max_size)
    }

    /// Clear the regions that `remove_areas_outside_of_specified_size` would keep
    pub fn remove_areas_of_specified_size(&mut self, min_size: usize, max_size: usize) -> &mut Self {
        let mut kept = self.copy();
        kept.remove_areas_outside_of_specified_size(min_size, max_size);
        self.cells_mut()
            .zip_mut_with(kept.cells(), |cell, &keep| *cell = *cell && !keep);
        self
    }

    /// Band of cells within `distance` of a boundary between true and false
    pub fn areas_within_distance_of_edges(&mut self, distance: f32) -> BinaryMask {
        let mut deflated = self.copy();
        deflated.deflate(distance);
        let mut band = self.copy();
        band.inflate(distance);
        band.cells_mut()
            .zip_mut_with(deflated.cells(), |cell, &inner| *cell = *cell && !inner);
        band
    }

    /// Close narrow false gaps between true regions
    pub fn fill_gaps(&mut self, min_dist: usize) -> &mut Self {
        let field = self.distance_field();
        let gaps = self.gap_seeds(&field, min_dist);
        self.cells_mut()
            .zip_mut_with(gaps.cells(), |cell, &gap| *cell = *cell || gap);
        self.apply_symmetry()
    }

    /// Open narrow true bridges between false regions
    pub fn widen_gaps(&mut self, min_dist: usize) -> &mut Self {
        let mut inverted = self.copy();
        inverted.invert();
        let field = inverted.distance_field();
        let gaps = self.gap_seeds(&field, min_dist);
        self.cells_mut()
            .zip_mut_with(gaps.cells(), |cell, &gap| *cell = *cell && !gap);
        self.apply_symmetry()
    }

    // Ridges of the distance field narrower than `min_dist`, inflated and smoothed
    fn gap_seeds(&mut self, field: &ScalarMask, min_dist: usize) -> BinaryMask {
        let seed = self.next_seed();
        let mut gaps = Self::new(self.size(), seed, self.symmetry_settings());
        let reach = min_dist as f32 / 2.0;
        for x in 0..field.size() {
            for y in 0..field.size() {
                let distance = field.get(x, y);
                if distance < reach && distance > 0.0 && is_local_max(field, x, y) {
                    gaps.set(x, y, true);
                }
            }
        }
        gaps.inflate(reach)
            .smooth_with_density(GAP_SMOOTH_RADIUS, GAP_SMOOTH_DENSITY);
        gaps
    }
}

// Interior peaks of a distance field below `limit`, in scan order
fn region_seeds(field: &ScalarMask, limit: f32) -> Vec<[usize; 2]> {
    let size = field.size();
    let mut seeds = Vec::new();
    for x in 0..size {
        for y in 0..size {
            let distance = field.get(x, y);
            if distance < limit && distance > 0.0 && is_local_max(field, x, y) {
                seeds.push([x, y]);
            }
        }
    }
    seeds
}

fn is_set(bits: &BitVec, index: usize) -> bool {
    bits.get(index).is_some_and(|bit| *bit)
}

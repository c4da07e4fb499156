//! Procedural feature placement along the interior of a boolean mask
//!
//! Placement points are local maxima of the distance to the mask's outside,
//! thinned to a minimum spacing. At each point a randomly chosen brush is
//! shrunk to the local width, scaled by a capped, smoothed copy of the
//! distance field and added to the target.

use tracing::debug;

use crate::distance::sampling::cell_distance;
use crate::io::configuration::{FeaturePlacement, PLACEMENT_PEAK_FLOOR};
use crate::io::error::{Result, ensure_same_size, invalid_parameter};
use crate::mask::grid::Grid;
use crate::mask::{BinaryMask, BrushSet};
use crate::symmetry::Symmetry;

impl Grid<f32> {
    /// Stamp hill brushes inside the true regions of `mask`
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size or `brushes` is empty
    pub fn mask_to_hills(&mut self, mask: &BinaryMask, brushes: &BrushSet) -> Result<&mut Self> {
        self.mask_to_features(mask, brushes, &FeaturePlacement::hills())
    }

    /// Stamp unit-peak mountain brushes inside the true regions of `mask`
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size or `brushes` is empty
    pub fn mask_to_mountains(
        &mut self,
        mask: &BinaryMask,
        brushes: &BrushSet,
    ) -> Result<&mut Self> {
        self.mask_to_features(mask, brushes, &FeaturePlacement::mountains())
    }

    /// Stamp brushes inside the true regions of `mask` with explicit placement parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the masks differ in size or `brushes` is empty
    pub fn mask_to_features(
        &mut self,
        mask: &BinaryMask,
        brushes: &BrushSet,
        placement: &FeaturePlacement,
    ) -> Result<&mut Self> {
        ensure_same_size("mask_to_features", self.size(), mask.size())?;

        let brush = brushes
            .pick(self.random_mut())
            .ok_or_else(|| invalid_parameter("brushes", &0, &"brush set is empty"))?;
        let mut pattern = brush.pattern().copy_with_seed(self.next_seed());
        if placement.normalize_brush {
            let peak = pattern.max();
            if peak > 0.0 {
                pattern.multiply_scalar(1.0 / peak);
            }
        }

        let mut outside = mask.copy_with_seed(self.next_seed());
        outside.invert();
        let mut distance = outside.distance_field();
        let mut peaks = distance.local_maxima(PLACEMENT_PEAK_FLOOR, f32::INFINITY);
        let mut candidates = peaks.random_coordinates(placement.min_spacing);

        let mut height = distance.copy();
        height
            .clamp_max(placement.height_cap)
            .smooth(placement.height_smoothing);

        let mut placed = 0_usize;
        while !candidates.is_empty() {
            let location = candidates.remove(0);
            let [x, y] = location;
            let local = distance.get(x, y);
            let stamp_size = ((local * placement.shrink_factor) as usize).max(1);

            let mut stamp = pattern.copy_with_seed(self.next_seed());
            stamp
                .resize_with(stamp_size, Symmetry::None)
                .multiply_at_offset(&height, x as i64, y as i64, true);
            self.add_at_offset(&stamp, x as i64, y as i64, true);
            placed += 1;

            let exclusion = local * placement.exclusion_factor;
            candidates.retain(|&candidate| cell_distance(location, candidate) >= exclusion);
        }

        debug!(brush = brush.name(), placed, "Stamped features");
        Ok(self)
    }
}

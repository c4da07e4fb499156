//! Tests for scalar mask arithmetic, smoothing, filtering and slopes

#[cfg(test)]
mod tests {
    use terramask::MaskError;
    use terramask::mask::{BinaryMask, ScalarMask};
    use terramask::symmetry::{Symmetry, SymmetrySettings};

    fn settings() -> SymmetrySettings {
        SymmetrySettings::default()
    }

    fn filled(size: usize, value: f32) -> ScalarMask {
        let mut mask = ScalarMask::new(size, 3, settings());
        mask.fill(value);
        mask
    }

    fn ramp(size: usize) -> ScalarMask {
        let mut mask = ScalarMask::new(size, 3, settings());
        for x in 0..size {
            for y in 0..size {
                mask.set(x, y, x as f32);
            }
        }
        mask
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_statistics() {
        let mut mask = ScalarMask::new(2, 3, settings());
        mask.set(0, 0, -1.0);
        mask.set(0, 1, 2.0);
        mask.set(1, 0, 3.0);
        mask.set(1, 1, 4.0);
        assert!(close(mask.min(), -1.0));
        assert!(close(mask.max(), 4.0));
        assert!(close(mask.sum(), 8.0));
        assert!(close(mask.avg(), 2.0));

        let empty = ScalarMask::new(0, 3, settings());
        assert!(close(empty.min(), 0.0) && close(empty.max(), 0.0) && close(empty.avg(), 0.0));
    }

    #[test]
    fn test_from_binary_and_init() {
        let mut binary = BinaryMask::new(3, 1, settings());
        binary.set(1, 1, true);
        let scalar = ScalarMask::from_binary(&mut binary, -2.0, 5.0);
        assert!(close(scalar.get(1, 1), 5.0));
        assert!(close(scalar.get(0, 0), -2.0));

        let mut target = filled(3, 9.0);
        target.init(&binary, 0.0, 1.0).expect("same size");
        assert!(close(target.sum(), 1.0));
    }

    #[test]
    fn test_pairwise_arithmetic() {
        let mut a = filled(4, 3.0);
        let b = filled(4, 2.0);
        a.add(&b).expect("same size");
        assert!(close(a.get(0, 0), 5.0));
        a.subtract(&b).expect("same size");
        assert!(close(a.get(1, 1), 3.0));
        a.multiply(&b).expect("same size");
        assert!(close(a.get(2, 2), 6.0));
        a.min_with(&b).expect("same size");
        assert!(close(a.max(), 2.0));
        a.max_with(&filled(4, 4.0)).expect("same size");
        assert!(close(a.min(), 4.0));
    }

    #[test]
    fn test_pairwise_rejects_size_mismatch() {
        let mut a = filled(4, 1.0);
        let result = a.add(&filled(5, 1.0)).map(|_| ());
        assert!(matches!(
            result,
            Err(MaskError::SizeMismatch { operation: "add", expected: 4, actual: 5 })
        ));
        assert!(close(a.sum(), 16.0));

        let binary = BinaryMask::new(3, 1, settings());
        assert!(a.remove_values_outside_of(&binary).is_err());
        assert!(a.smooth_limited(1, &binary).is_err());
        assert!(a.mask_to_ocean_heights(1.0, &binary).is_err());
    }

    #[test]
    fn test_constant_arithmetic() {
        let mut mask = filled(3, 4.0);
        mask.add_scalar(2.0).subtract_scalar(1.0).multiply_scalar(0.5);
        assert!(close(mask.get(2, 1), 2.5));
        mask.fill(16.0).sqrt();
        assert!(close(mask.avg(), 4.0));
    }

    #[test]
    fn test_binary_weighted_arithmetic() {
        let mut binary = BinaryMask::new(4, 1, settings());
        binary.fill_rect(0, 0, 2, 4, true);
        let mut mask = filled(4, 1.0);
        mask.add_binary(&binary, 2.0).expect("same size");
        assert!(close(mask.sum(), 32.0));
        mask.subtract_binary(&binary, 3.0).expect("same size");
        assert!(close(mask.get(0, 0), 0.0));
        assert!(close(mask.get(3, 3), 1.0));
    }

    // A centred 3x3 stamp lands on the 3x3 block around the offset
    #[test]
    fn test_add_at_offset_centred() {
        let mut target = ScalarMask::new(8, 3, settings());
        target.add_at_offset(&filled(3, 1.0), 4, 4, true);
        assert!(close(target.sum(), 9.0));
        assert!(close(target.get(3, 3), 1.0));
        assert!(close(target.get(5, 5), 1.0));
        assert!(close(target.get(6, 6), 0.0));
    }

    #[test]
    fn test_add_at_offset_mirrors_stamp() {
        let mut target = ScalarMask::new(8, 3, SymmetrySettings::uniform(Symmetry::Point2));
        target.add_at_offset(&filled(3, 1.0), 0, 0, false);
        assert!(close(target.sum(), 18.0));
        assert!(close(target.get(7, 7), 1.0));
    }

    // A smaller target samples the larger operand through the window
    #[test]
    fn test_at_offset_into_smaller_mask() {
        let mut target = filled(3, 1.0);
        target.multiply_at_offset(&ramp(8), 2, 5, false);
        assert!(close(target.get(0, 0), 2.0));
        assert!(close(target.get(2, 2), 4.0));

        let mut clipped = filled(3, 1.0);
        clipped.subtract_at_offset(&ramp(8), 7, 0, false);
        assert!(close(clipped.get(0, 0), -6.0));
        assert!(close(clipped.get(1, 0), 1.0));
    }

    #[test]
    fn test_convolve_uniform_kernel() {
        let mut mask = filled(4, 2.0);
        mask.convolve(&filled(1, 1.0));
        assert!(close(mask.sum(), 32.0));
    }

    #[test]
    fn test_noise_respects_symmetry() {
        let mut mask = ScalarMask::new(9, 8, SymmetrySettings::uniform(Symmetry::Point2));
        mask.add_gaussian_noise(1.0);
        for x in 0..9 {
            for y in 0..9 {
                assert!(close(mask.get(x, y), mask.get(8 - x, 8 - y)));
            }
        }

        let mut white = ScalarMask::new(9, 8, settings());
        white.add_white_noise(0.5);
        assert!(white.min() >= 0.0 && white.max() < 0.5);
    }

    #[test]
    fn test_clamp_and_threshold() {
        let mut mask = ramp(5);
        mask.clamp_min(1.0).clamp_max(3.0);
        assert!(close(mask.min(), 1.0) && close(mask.max(), 3.0));

        let mut cut = ramp(5);
        cut.threshold(2.0);
        assert!(close(cut.get(1, 0), 0.0));
        assert!(close(cut.get(2, 0), 2.0));
    }

    #[test]
    fn test_range_filters_are_inclusive() {
        let mut inside = ramp(5);
        inside.remove_values_outside_of_range(1.0, 3.0);
        assert!(close(inside.get(1, 0), 1.0));
        assert!(close(inside.get(3, 0), 3.0));
        assert!(close(inside.get(4, 0), 0.0));

        let mut outside = ramp(5);
        outside.remove_values_in_range(1.0, 3.0);
        assert!(close(outside.get(1, 0), 0.0));
        assert!(close(outside.get(4, 0), 4.0));
    }

    #[test]
    fn test_mask_filters_and_copies() {
        let mut region = BinaryMask::new(4, 1, settings());
        region.fill_rect(0, 0, 4, 2, true);

        let mut source = filled(4, 2.0);
        let within = source.copy_within_range(&region).expect("same size");
        let outside = source.copy_outside_range(&region).expect("same size");
        assert!(close(within.sum(), 16.0));
        assert!(close(outside.sum(), 16.0));
        assert!(close(within.get(0, 3), 0.0));
        assert!(close(source.sum(), 32.0));

        let mut replaced = filled(4, 2.0);
        replaced
            .replace_values_in_range_with(&region, &filled(4, 5.0))
            .expect("same size");
        assert!(close(replaced.get(0, 0), 5.0));
        assert!(close(replaced.get(0, 3), 2.0));
    }

    #[test]
    fn test_convert_to_binary_mask() {
        let mut mask = ramp(5);
        let selected = mask.convert_to_binary_mask(1.0, 3.0);
        assert_eq!(selected.count(), 15);
        assert!(!selected.get(0, 0) && !selected.get(4, 4));
    }

    #[test]
    fn test_distance_field_for_range() {
        let mut mask = ramp(6);
        let field = mask.distance_field_for_range(5.0, 6.0);
        assert!(close(field.get(5, 0), 0.0));
        assert!(close(field.get(2, 3), 3.0));
    }

    #[test]
    fn test_shrink_and_enlarge() {
        let mut mask = ramp(4);
        mask.shrink(2);
        assert_eq!(mask.size(), 2);
        assert!(close(mask.get(0, 0), 0.5));
        assert!(close(mask.get(1, 1), 2.5));

        mask.enlarge(4);
        assert_eq!(mask.size(), 4);
        assert!(close(mask.get(3, 0), 2.5));
    }

    #[test]
    fn test_smooth_averages_window() {
        let mut uniform = filled(6, 0.75);
        uniform.smooth(2);
        assert!(close(uniform.min(), 0.75) && close(uniform.max(), 0.75));

        let mut spike = ScalarMask::new(5, 3, settings());
        spike.set(2, 2, 9.0);
        spike.smooth(1);
        assert!(close(spike.get(2, 2), 1.0));
        assert!(close(spike.get(0, 0), 0.0));
        assert!(close(spike.get(1, 1), 1.0));
    }

    #[test]
    fn test_limited_smoothing_only_touches_limiter() {
        let mut limiter = BinaryMask::new(5, 1, settings());
        limiter.set(2, 2, true);
        let mut mask = ScalarMask::new(5, 3, settings());
        mask.set(2, 2, 9.0);
        mask.set(1, 1, 9.0);
        mask.smooth_limited(1, &limiter).expect("same size");
        assert!(close(mask.get(2, 2), 2.0));
        assert!(close(mask.get(1, 1), 9.0));

        let mut spiked = filled(5, 0.5);
        spiked.spike_limited(1, &limiter).expect("same size");
        assert!(close(spiked.get(2, 2), 0.25));
        assert!(close(spiked.get(0, 0), 0.5));
    }

    #[test]
    fn test_spike_squares_mean() {
        let mut mask = filled(4, 0.5);
        mask.spike(1);
        assert!(close(mask.avg(), 0.25));
    }

    #[test]
    fn test_gradients_of_ramp() {
        let mut central = ramp(5);
        central.gradient();
        assert!(close(central.get(2, 2), 2.0));
        assert!(close(central.get(0, 2), 1.0));

        let mut forward = ramp(5);
        forward.supcom_gradient();
        assert!(close(forward.get(2, 2), 1.0));
        assert!(close(forward.get(4, 2), 0.0));
    }

    // Forward differences only see the higher neighbour, so a centred peak
    // leaves a slope on its low side only
    #[test]
    fn test_supcom_gradient_is_one_sided() {
        let mut peak = ScalarMask::new(5, 1, SymmetrySettings::default());
        peak.set(2, 2, 1.0);
        peak.supcom_gradient();

        assert!(close(peak.get(1, 2), 1.0));
        assert!(close(peak.get(2, 2), 1.0));
        assert!(close(peak.get(3, 2), 0.0));
        assert!(close(peak.get(2, 1), 1.0));
        assert!(close(peak.get(2, 3), 0.0));
    }

    #[test]
    fn test_ocean_heights_slope_away_from_land() {
        let mut land = BinaryMask::new(6, 1, settings());
        land.fill_rect(0, 0, 6, 1, true);
        let mut heights = ScalarMask::new(6, 3, settings());
        heights.mask_to_ocean_heights(0.5, &land).expect("same size");
        assert!(close(heights.get(0, 0), 0.0));
        assert!(close(heights.get(0, 4), -2.0));
    }

    #[test]
    fn test_local_maxima() {
        let mut mask = ScalarMask::new(7, 3, settings());
        mask.set(3, 3, 2.0);
        mask.set(0, 0, 5.0);
        assert!(mask.is_local_max(3, 3));
        assert!(!mask.is_local_max(0, 0));
        assert!(!mask.is_local_1d_max(0, 0));
        assert!(mask.is_local_1d_max(3, 3));
        let peaks = mask.local_maxima(1.0, 3.0);
        assert_eq!(peaks.count(), 1);
        assert!(peaks.get(3, 3));
    }

    // Intensity regions are kept or dropped by their connected size
    #[test]
    fn test_intensity_area_filters() {
        let mut islands = BinaryMask::new(16, 5, settings());
        islands.set(8, 8, true);
        islands.fill_rect(1, 1, 6, 6, true);
        islands.fill_rect(12, 12, 2, 2, true);

        let mut kept = ScalarMask::from_binary(&mut islands, 0.0, 1.0);
        kept.remove_areas_outside_of_specified_intensity_and_size(2, 10, 0.5, 1.0);
        assert!(close(kept.sum(), 4.0));
        assert!(close(kept.get(12, 13), 1.0));

        let mut removed = ScalarMask::from_binary(&mut islands, 0.0, 1.0);
        removed.remove_areas_of_specified_intensity_and_size(2, 10, 0.5, 1.0);
        assert!(close(removed.sum(), 37.0));
        assert!(close(removed.get(12, 13), 0.0));
    }
}

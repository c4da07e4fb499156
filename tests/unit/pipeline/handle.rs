//! Tests for fluent pipeline handles against eager execution

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use terramask::MaskError;
    use terramask::io::configuration::FeaturePlacement;
    use terramask::mask::{BinaryMask, Brush, BrushSet, ScalarMask};
    use terramask::pipeline::Pipeline;
    use terramask::symmetry::{Symmetry, SymmetrySettings};

    fn pipeline() -> Pipeline {
        Pipeline::new(3).expect("start pipeline")
    }

    fn settings() -> SymmetrySettings {
        SymmetrySettings::uniform(Symmetry::Point4)
    }

    // A deferred chain materializes to the eager result, random state included
    #[test]
    fn test_chain_matches_eager() {
        let pipeline = pipeline();
        let mut deferred = pipeline.binary_mask(24, 9, settings());
        deferred.randomize(0.4).grow(0.5, 2).smooth(1).erode(0.3, 1);
        let mut deferred = deferred.materialize().expect("deferred chain");

        let mut eager = BinaryMask::new(24, 9, settings());
        eager.randomize(0.4).grow(0.5, 2).smooth(1).erode(0.3, 1);

        assert_eq!(deferred.cells(), eager.cells());
        assert_eq!(deferred.next_seed(), eager.next_seed());
    }

    // Forked masks draw their seed from the source exactly like eager copies
    #[test]
    fn test_forks_match_eager() {
        let pipeline = pipeline();
        let mut land = pipeline.binary_mask(16, 3, settings());
        land.randomize(0.5);
        let mut field = land.distance_field();
        let mut noisy = land.copy();
        noisy.flip_values(0.5);
        land.acid(0.2, 1.0);
        field.add_white_noise(0.1);

        let mut eager_land = BinaryMask::new(16, 3, settings());
        eager_land.randomize(0.5);
        let mut eager_field = eager_land.distance_field();
        let mut eager_noisy = eager_land.copy();
        eager_noisy.flip_values(0.5);
        eager_land.acid(0.2, 1.0);
        eager_field.add_white_noise(0.1);

        assert_eq!(land.materialize().expect("land").cells(), eager_land.cells());
        assert_eq!(noisy.materialize().expect("noisy").cells(), eager_noisy.cells());
        assert_eq!(field.materialize().expect("field").cells(), eager_field.cells());
    }

    #[test]
    fn test_copy_is_independent() {
        let pipeline = pipeline();
        let mut original = pipeline.binary_mask(8, 1, SymmetrySettings::default());
        original.fill(true);
        let mut copy = original.copy();
        copy.invert();
        assert_eq!(original.materialize().expect("original").count(), 64);
        assert_eq!(copy.materialize().expect("copy").count(), 0);
    }

    #[test]
    fn test_paired_operators_read_other_state() {
        let pipeline = pipeline();
        let mut left = pipeline.binary_mask(4, 1, SymmetrySettings::default());
        left.fill_rect(0, 0, 2, 4, true);
        let mut right = pipeline.binary_mask(4, 1, SymmetrySettings::default());
        right.fill_rect(0, 0, 4, 2, true);
        left.union(&right);
        right.invert();

        assert_eq!(left.materialize().expect("union").count(), 12);
        assert_eq!(right.materialize().expect("inverted").count(), 8);
    }

    #[test]
    fn test_scalar_chain_with_binary_arguments() {
        let pipeline = pipeline();
        let mut land = pipeline.binary_mask(8, 1, SymmetrySettings::default());
        land.fill_rect(0, 0, 8, 4, true);
        let mut heights = pipeline.scalar_mask(8, 1, SymmetrySettings::default());
        heights.add_scalar(1.0).add_binary(&land, 2.0).remove_values_inside_of(&land);
        let mut doubled = heights.to_binary(0.5).to_scalar(0.0, 2.0);
        doubled.multiply(&heights);

        let heights = heights.materialize().expect("heights");
        assert!((heights.sum() - 32.0).abs() < 1e-4);
        assert!((doubled.materialize().expect("doubled").sum() - 64.0).abs() < 1e-4);
    }

    #[test]
    fn test_size_mismatch_fails_node() {
        let pipeline = pipeline();
        let mut small = pipeline.binary_mask(4, 1, SymmetrySettings::default());
        let large = pipeline.binary_mask(8, 1, SymmetrySettings::default());
        small.intersect(&large);
        match small.materialize() {
            Err(MaskError::NodeFailed { name, reason, .. }) => {
                assert_eq!(name, "intersect");
                assert!(reason.contains("expected 4, got 8"));
            }
            other => unreachable!("expected node failure, got {other:?}"),
        }
    }

    #[test]
    fn test_derive_builds_new_mask() {
        let pipeline = pipeline();
        let mut mask = pipeline.binary_mask(6, 1, SymmetrySettings::default());
        mask.fill(true);
        let halved = mask.derive("halve", |grid: &BinaryMask| {
            let mut smaller = grid.copy_with_seed(5);
            smaller.resize(3);
            Ok(smaller)
        });
        assert_eq!(halved.materialize().expect("derived").size(), 3);
        assert_eq!(mask.materialize().expect("source").size(), 6);
    }

    #[test]
    fn test_forked_maxima_and_ranges() {
        let pipeline = pipeline();
        let mut scalar = pipeline.scalar_mask(7, 1, SymmetrySettings::default());
        scalar.map("peak", |grid| {
            grid.set(3, 3, 2.0);
            Ok(())
        });
        let peaks = scalar.local_maxima(1.0, 3.0);
        let range = scalar.convert_to_binary_mask(1.5, 2.5);
        assert_eq!(peaks.materialize().expect("peaks").count(), 1);
        assert!(range.materialize().expect("range").get(3, 3));
    }

    #[test]
    fn test_limited_and_offset_operators() {
        let pipeline = pipeline();
        let mut limiter = pipeline.binary_mask(5, 1, SymmetrySettings::default());
        limiter.fill_rect(2, 2, 1, 1, true);
        let mut stamp = pipeline.scalar_mask(3, 1, SymmetrySettings::default());
        stamp.add_scalar(1.0);
        let mut target = pipeline.scalar_mask(5, 1, SymmetrySettings::default());
        target.add_at_offset(&stamp, 2, 2, true).smooth_limited(1, &limiter);

        let result = target.materialize().expect("target");
        assert!((result.sum() - 9.0).abs() < 1e-4);
        assert!((result.get(2, 2) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_hills_through_pipeline() {
        let mut pattern = ScalarMask::new(8, 1, SymmetrySettings::default());
        pattern.fill(1.0);
        let brushes =
            Arc::new(BrushSet::new(vec![Brush::new("flat", pattern)]).expect("non-empty"));

        let pipeline = pipeline();
        let mut land = pipeline.binary_mask(32, 2, SymmetrySettings::default());
        land.fill_circle(16.0, 16.0, 8.0, true);
        let mut heights = pipeline.scalar_mask(32, 6, SymmetrySettings::default());
        heights.mask_to_hills(&land, Arc::clone(&brushes));

        let mut eager_land = BinaryMask::new(32, 2, SymmetrySettings::default());
        eager_land.fill_circle(16.0, 16.0, 8.0, true);
        let mut eager = ScalarMask::new(32, 6, SymmetrySettings::default());
        eager.mask_to_hills(&eager_land, &brushes).expect("same size");

        assert_eq!(heights.materialize().expect("hills").cells(), eager.cells());
    }

    // Handles of one pipeline never read nodes of another
    #[test]
    fn test_foreign_handle_fails_node() {
        let first = pipeline();
        let second = pipeline();
        let mut empty = first.binary_mask(8, 1, SymmetrySettings::default());
        let mut full = BinaryMask::new(8, 1, SymmetrySettings::default());
        full.fill(true);
        let full = second.mask(full);

        empty.union(&full);
        match empty.materialize() {
            Err(MaskError::NodeFailed { name, reason, .. }) => {
                assert_eq!(name, "union");
                assert!(reason.contains("different pipeline"));
            }
            other => unreachable!("expected node failure, got {other:?}"),
        }

        assert_eq!(full.materialize().expect("foreign mask").count(), 64);
        assert_eq!(second.wait_all().expect("wait").failed, 0);
        assert_eq!(first.wait_all().expect("wait").failed, 1);
    }

    // Only the node a live handle names keeps its value
    #[test]
    fn test_intermediate_values_released() {
        let pipeline = pipeline();
        let mut mask = pipeline.binary_mask(16, 1, settings());
        mask.randomize(0.5).invert().smooth(1).invert();
        let chain = mask.materialize().expect("chain");
        assert_eq!(chain.size(), 16);

        let stats = pipeline.wait_all().expect("wait");
        assert_eq!(stats.registered, 5);
        assert_eq!(stats.released, 4);

        drop(mask);
        assert_eq!(pipeline.stats().expect("stats").released, 5);
    }

    #[test]
    fn test_region_operators_match_eager() {
        let pipeline = pipeline();
        let mut deferred = pipeline.binary_mask(12, 1, SymmetrySettings::default());
        deferred
            .fill_rect(1, 1, 2, 2, true)
            .fill_rect(6, 6, 4, 4, true)
            .remove_areas_of_specified_size(1, 4)
            .fill_shape(0, 0);

        let mut eager = BinaryMask::new(12, 1, SymmetrySettings::default());
        eager
            .fill_rect(1, 1, 2, 2, true)
            .fill_rect(6, 6, 4, 4, true)
            .remove_areas_of_specified_size(1, 4)
            .fill_shape(0, 0);

        assert_eq!(deferred.materialize().expect("regions").cells(), eager.cells());
    }

    #[test]
    fn test_convolve_and_features_match_eager() {
        let mut pattern = ScalarMask::new(6, 1, SymmetrySettings::default());
        pattern.fill(1.0);
        let brushes =
            Arc::new(BrushSet::new(vec![Brush::new("flat", pattern)]).expect("non-empty"));
        let placement = FeaturePlacement::hills();

        let pipeline = pipeline();
        let mut kernel = pipeline.scalar_mask(3, 1, SymmetrySettings::default());
        kernel.add_scalar(1.5);
        let mut land = pipeline.binary_mask(24, 2, SymmetrySettings::default());
        land.fill_circle(12.0, 12.0, 6.0, true);
        let mut heights = pipeline.scalar_mask(24, 4, SymmetrySettings::default());
        heights
            .add_scalar(0.5)
            .convolve(&kernel)
            .mask_to_features(&land, Arc::clone(&brushes), placement);

        let mut eager_kernel = ScalarMask::new(3, 1, SymmetrySettings::default());
        eager_kernel.add_scalar(1.5);
        let mut eager_land = BinaryMask::new(24, 2, SymmetrySettings::default());
        eager_land.fill_circle(12.0, 12.0, 6.0, true);
        let mut eager = ScalarMask::new(24, 4, SymmetrySettings::default());
        eager.add_scalar(0.5).convolve(&eager_kernel);
        eager
            .mask_to_features(&eager_land, &brushes, &placement)
            .expect("same size");

        assert_eq!(heights.materialize().expect("features").cells(), eager.cells());
    }
}

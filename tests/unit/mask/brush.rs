//! Tests for brush decoding and brush sets

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use image::{GrayImage, Luma};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;
    use terramask::MaskError;
    use terramask::mask::{Brush, BrushSet, ScalarMask};
    use terramask::symmetry::SymmetrySettings;

    fn gradient_image(size: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |px, py| {
            Luma([if px == 0 && py == 1 { 255 } else { 51 }])
        })
    }

    fn save(directory: &Path, name: &str, image: &GrayImage) {
        image.save(directory.join(name)).expect("write brush image");
    }

    // Pixel (px, py) becomes cell (px, py) scaled to [0, 1]
    #[test]
    fn test_from_luma_image() {
        let mask = ScalarMask::from_luma_image(&gradient_image(4), 1, SymmetrySettings::default())
            .expect("square image");
        assert_eq!(mask.size(), 4);
        assert!((mask.get(0, 1) - 1.0).abs() < f32::EPSILON);
        assert!((mask.get(1, 0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_from_luma_image_rejects_rectangles() {
        let image = GrayImage::new(4, 3);
        let result = ScalarMask::from_luma_image(&image, 1, SymmetrySettings::default());
        assert!(matches!(
            result,
            Err(MaskError::InvalidParameter { parameter: "image", .. })
        ));
    }

    #[test]
    fn test_brush_load_names_after_stem() {
        let directory = TempDir::new().expect("temp dir");
        save(directory.path(), "ridge.png", &gradient_image(8));
        let brush = Brush::load(&directory.path().join("ridge.png")).expect("load brush");
        assert_eq!(brush.name(), "ridge");
        assert_eq!(brush.pattern().size(), 8);
        assert!((brush.pattern().max() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_brush_load_reports_missing_file() {
        let directory = TempDir::new().expect("temp dir");
        let result = Brush::load(&directory.path().join("absent.png"));
        assert!(matches!(result, Err(MaskError::BrushLoad { .. })));
    }

    #[test]
    fn test_brush_load_rejects_rectangular_image() {
        let directory = TempDir::new().expect("temp dir");
        save(directory.path(), "wide.png", &GrayImage::new(6, 3));
        let result = Brush::load(&directory.path().join("wide.png"));
        assert!(matches!(result, Err(MaskError::MalformedData { .. })));
    }

    #[test]
    fn test_brush_set_rejects_empty() {
        assert!(matches!(
            BrushSet::new(Vec::new()),
            Err(MaskError::InvalidParameter { parameter: "brushes", .. })
        ));
    }

    // Only png files are loaded, in file name order
    #[test]
    fn test_load_dir_filters_and_sorts() {
        let directory = TempDir::new().expect("temp dir");
        save(directory.path(), "b.png", &gradient_image(4));
        save(directory.path(), "a.png", &gradient_image(6));
        fs::write(directory.path().join("notes.txt"), "not a brush").expect("write note");

        let set = BrushSet::load_dir(directory.path()).expect("load directory");
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        let names: Vec<&str> = set.iter().map(Brush::name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_load_dir_without_images_fails() {
        let directory = TempDir::new().expect("temp dir");
        assert!(BrushSet::load_dir(directory.path()).is_err());
        assert!(matches!(
            BrushSet::load_dir(&directory.path().join("missing")),
            Err(MaskError::FileSystem { .. })
        ));
    }

    #[test]
    fn test_pick_returns_member() {
        let pattern = ScalarMask::new(2, 1, SymmetrySettings::default());
        let set = BrushSet::new(vec![
            Brush::new("first", pattern.clone()),
            Brush::new("second", pattern),
        ])
        .expect("non-empty");
        let mut random = StdRng::seed_from_u64(4);
        for _ in 0..10 {
            let picked = set.pick(&mut random).expect("non-empty set");
            assert!(matches!(picked.name(), "first" | "second"));
        }
    }
}

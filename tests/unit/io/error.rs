//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::PathBuf;

    use terramask::MaskError;
    use terramask::io::error::{ensure_same_size, invalid_parameter};

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = MaskError::FileSystem {
            path: "/tmp/mask.bin".into(),
            operation: "read mask",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(error.to_string().contains("/tmp/mask.bin"));
    }

    // Tests size mismatch names the operator and both sizes
    #[test]
    fn test_size_mismatch_message() {
        let message = ensure_same_size("union", 8, 4)
            .map_err(|error| error.to_string())
            .err()
            .unwrap_or_default();
        assert!(message.contains("union"));
        assert!(message.contains("expected 8, got 4"));
        assert!(ensure_same_size("union", 8, 8).is_ok());
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let message = invalid_parameter("density", &1.5, &"must be at most 1").to_string();
        assert!(message.contains("density"));
        assert!(message.contains("1.5"));
        assert!(message.contains("must be at most 1"));
    }

    #[test]
    fn test_brush_load_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let error = MaskError::BrushLoad {
            path: PathBuf::from("brushes/ridge.png"),
            source: image_error,
        };

        assert!(error.to_string().contains("brushes/ridge.png"));
        assert!(error.source().is_some());
    }

    #[test]
    fn test_malformed_data_error() {
        let error = MaskError::MalformedData {
            path: PathBuf::from("height.raw"),
            reason: "12 cells do not form a square grid".to_owned(),
        };
        let message = error.to_string();
        assert!(message.contains("height.raw"));
        assert!(message.contains("square grid"));
    }

    // Tests pipeline errors identify the node and its dependency
    #[test]
    fn test_pipeline_error_messages() {
        let failed = MaskError::NodeFailed {
            node: 3,
            name: "union".to_owned(),
            reason: "boom".to_owned(),
        };
        assert_eq!(failed.to_string(), "Pipeline node 3 ('union') failed: boom");

        let skipped = MaskError::UpstreamFailed {
            node: 5,
            name: "invert".to_owned(),
            dependency: 3,
        };
        assert!(skipped.to_string().contains("dependency 3 failed"));

        let kind = MaskError::KindMismatch {
            node: 1,
            expected: "scalar",
            actual: "binary",
        };
        assert!(kind.to_string().contains("holds a binary mask, expected a scalar mask"));

        assert!(MaskError::ShutDown { node: 9 }.to_string().contains("node 9"));
        assert!(MaskError::Poisoned.to_string().contains("poisoned"));
    }

    #[test]
    fn test_worker_spawn_error() {
        let error = MaskError::WorkerSpawn {
            index: 2,
            source: std::io::Error::other("no threads"),
        };
        assert!(error.to_string().contains("worker 2"));
        assert!(error.source().is_some());
    }
}

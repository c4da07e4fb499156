//! Tests for headerless mask files and canonical hashes

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;
    use terramask::MaskError;
    use terramask::io::format::{
        ByteOrder, read_binary, read_scalar, write_binary, write_scalar,
    };
    use terramask::mask::{BinaryMask, ScalarMask};
    use terramask::symmetry::{Symmetry, SymmetrySettings};

    // MD5 of sixteen zero bytes
    const ZERO_HASH: &str = "4ae71336e44bf9bf79d2752e234818a5";

    #[test]
    fn test_binary_bytes_are_row_major() {
        let mut mask = BinaryMask::new(2, 1, SymmetrySettings::default());
        mask.set(0, 1, true);
        mask.set(1, 0, true);
        assert_eq!(mask.to_bytes(ByteOrder::Big), vec![0, 1, 1, 0]);
    }

    // Tests scalar byte order selection
    // Verified by swapping the byte order branches
    #[test]
    fn test_scalar_byte_order() {
        let mut mask = ScalarMask::new(1, 1, SymmetrySettings::default());
        mask.set(0, 0, 1.0);
        assert_eq!(mask.to_bytes(ByteOrder::Big), vec![0x3f, 0x80, 0, 0]);
        assert_eq!(mask.to_bytes(ByteOrder::Little), vec![0, 0, 0x80, 0x3f]);
    }

    #[test]
    fn test_binary_file_round_trip() {
        let directory = TempDir::new().expect("temp dir");
        let path = directory.path().join("land.bin");
        let mut mask = BinaryMask::new(5, 1, SymmetrySettings::default());
        mask.fill_rect(1, 1, 3, 2, true);
        write_binary(&mask, &path).expect("write");

        assert_eq!(fs::metadata(&path).expect("metadata").len(), 25);
        let loaded = read_binary(&path, 7, SymmetrySettings::default()).expect("read");
        assert_eq!(loaded.cells(), mask.cells());
    }

    #[test]
    fn test_scalar_file_little_endian() {
        let directory = TempDir::new().expect("temp dir");
        let path = directory.path().join("height.raw");
        let mut mask = ScalarMask::new(3, 1, SymmetrySettings::default());
        mask.set(2, 1, -4.5);
        write_scalar(&mask, &path, ByteOrder::Little).expect("write");

        let loaded = read_scalar(&path, ByteOrder::Little, 7, SymmetrySettings::default())
            .expect("read");
        assert_eq!(loaded.cells(), mask.cells());

        let misread = read_scalar(&path, ByteOrder::Big, 7, SymmetrySettings::default())
            .expect("read");
        assert_ne!(misread.cells(), mask.cells());
    }

    fn malformed(bytes: &[u8], width: usize) -> bool {
        let source = Path::new("payload");
        let result = if width == 1 {
            BinaryMask::from_bytes(bytes, ByteOrder::Big, 1, SymmetrySettings::default(), source)
                .map(|_| ())
        } else {
            ScalarMask::from_bytes(bytes, ByteOrder::Big, 1, SymmetrySettings::default(), source)
                .map(|_| ())
        };
        matches!(result, Err(MaskError::MalformedData { .. }))
    }

    #[test]
    fn test_rejects_malformed_payloads() {
        assert!(malformed(&[], 1));
        assert!(malformed(&[0; 5], 1));
        assert!(malformed(&[0; 6], 4));
        assert!(malformed(&[0; 8], 4));
        assert!(!malformed(&[0; 9], 1));
        assert!(!malformed(&[0; 16], 4));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let directory = TempDir::new().expect("temp dir");
        let path = directory.path().join("absent.bin");
        match read_binary(&path, 1, SymmetrySettings::default()) {
            Err(MaskError::FileSystem { path: reported, operation, .. }) => {
                assert_eq!(reported, path);
                assert_eq!(operation, "read mask");
            }
            other => unreachable!("expected file system error, got {other:?}"),
        }
    }

    #[test]
    fn test_hash_of_empty_masks() {
        let binary = BinaryMask::new(4, 1, SymmetrySettings::default());
        assert_eq!(binary.to_hash(), ZERO_HASH);
        let scalar = ScalarMask::new(2, 1, SymmetrySettings::default());
        assert_eq!(scalar.to_hash(), ZERO_HASH);
    }

    // Only the spawn-canonical cells contribute to the hash
    #[test]
    fn test_hash_ignores_mirrored_cells() {
        let settings = SymmetrySettings::new(Symmetry::X, Symmetry::X, Symmetry::X);
        let mut first = BinaryMask::new(8, 1, settings);
        let mut second = BinaryMask::new(8, 1, settings);
        first.set(6, 2, true);
        second.set(7, 7, true);
        assert_eq!(first.to_hash(), second.to_hash());

        second.set(1, 2, true);
        assert_ne!(first.to_hash(), second.to_hash());
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let mut mask = ScalarMask::new(6, 1, SymmetrySettings::default());
        mask.add_white_noise(1.0);
        let hash = mask.to_hash();
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_hash_independent_of_seed() {
        let mut first = BinaryMask::new(8, 1, SymmetrySettings::default());
        let mut second = BinaryMask::new(8, 99, SymmetrySettings::default());
        first.fill_circle(4.0, 4.0, 2.0, true);
        second.fill_circle(4.0, 4.0, 2.0, true);
        assert_eq!(first.to_hash(), second.to_hash());
    }
}

//! Headerless mask files and reproducibility hashes
//!
//! Both file formats store cells row-major with `x` as the outer index and no
//! header. Binary masks use one byte per cell; scalar masks use four bytes per
//! cell in the requested byte order. Readers infer the side length from the
//! payload size.

use std::fs;
use std::path::Path;

use md5::{Digest, Md5};
use ndarray::Array2;
use tracing::debug;

use crate::io::error::{MaskError, Result};
use crate::mask::grid::{CellValue, Grid};
use crate::mask::{BinaryMask, ScalarMask};
use crate::symmetry::SymmetrySettings;

/// Byte order of scalar cells on disk
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ByteOrder {
    /// Most significant byte first
    #[default]
    Big,
    /// Least significant byte first
    Little,
}

/// Cells with a fixed-width byte encoding
pub trait CellBytes: CellValue {
    /// Encoded width of one cell
    const WIDTH: usize;

    /// Append the encoding of `self` to `buffer`
    fn encode(self, order: ByteOrder, buffer: &mut Vec<u8>);

    /// Decode one cell from exactly [`Self::WIDTH`] bytes
    fn decode(bytes: &[u8], order: ByteOrder) -> Self;
}

impl CellBytes for bool {
    const WIDTH: usize = 1;

    fn encode(self, _order: ByteOrder, buffer: &mut Vec<u8>) {
        buffer.push(u8::from(self));
    }

    fn decode(bytes: &[u8], _order: ByteOrder) -> Self {
        bytes.first().is_some_and(|&byte| byte != 0)
    }
}

impl CellBytes for f32 {
    const WIDTH: usize = 4;

    fn encode(self, order: ByteOrder, buffer: &mut Vec<u8>) {
        let bytes = match order {
            ByteOrder::Big => self.to_be_bytes(),
            ByteOrder::Little => self.to_le_bytes(),
        };
        buffer.extend_from_slice(&bytes);
    }

    fn decode(bytes: &[u8], order: ByteOrder) -> Self {
        let mut word = [0_u8; 4];
        for (slot, &byte) in word.iter_mut().zip(bytes) {
            *slot = byte;
        }
        match order {
            ByteOrder::Big => Self::from_be_bytes(word),
            ByteOrder::Little => Self::from_le_bytes(word),
        }
    }
}

impl<T: CellBytes> Grid<T> {
    /// Encode every cell in row-major order
    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(self.cells().len() * T::WIDTH);
        for &cell in self.cells() {
            cell.encode(order, &mut buffer);
        }
        buffer
    }

    /// Lowercase hex MD5 of the spawn-canonical cells in scan order
    ///
    /// Scalar cells are hashed as big-endian words regardless of file byte
    /// order, so equal masks always hash equally.
    pub fn to_hash(&self) -> String {
        let mut hasher = Md5::new();
        let mut buffer = Vec::with_capacity(T::WIDTH);
        for [x, y] in self.canonical_points(self.symmetry_settings().spawn) {
            buffer.clear();
            self.get(x, y).encode(ByteOrder::Big, &mut buffer);
            hasher.update(&buffer);
        }
        hex::encode(hasher.finalize())
    }

    /// Decode a row-major payload, inferring the side length
    ///
    /// # Errors
    ///
    /// Returns an error if the payload does not describe a square grid
    pub fn from_bytes(
        bytes: &[u8],
        order: ByteOrder,
        seed: u64,
        symmetry: SymmetrySettings,
        source: &Path,
    ) -> Result<Self> {
        let size = side_length(bytes.len(), T::WIDTH, source)?;
        let cells: Vec<T> = bytes
            .chunks_exact(T::WIDTH)
            .map(|chunk| T::decode(chunk, order))
            .collect();
        let cells = Array2::from_shape_vec((size, size), cells).map_err(|error| {
            MaskError::MalformedData {
                path: source.to_path_buf(),
                reason: error.to_string(),
            }
        })?;
        Self::from_cells(cells, seed, symmetry)
    }
}

fn side_length(length: usize, width: usize, source: &Path) -> Result<usize> {
    let malformed = |reason: String| MaskError::MalformedData {
        path: source.to_path_buf(),
        reason,
    };
    if length == 0 {
        return Err(malformed("payload is empty".to_owned()));
    }
    if length % width != 0 {
        return Err(malformed(format!(
            "{length} bytes is not a whole number of {width}-byte cells"
        )));
    }
    let cells = length / width;
    let size = cells.isqrt();
    if size * size != cells {
        return Err(malformed(format!("{cells} cells do not form a square grid")));
    }
    Ok(size)
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| MaskError::FileSystem {
        path: path.to_path_buf(),
        operation: "read mask",
        source,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| MaskError::FileSystem {
        path: path.to_path_buf(),
        operation: "write mask",
        source,
    })
}

/// Write a boolean mask, one byte per cell
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn write_binary(mask: &BinaryMask, path: &Path) -> Result<()> {
    write_file(path, &mask.to_bytes(ByteOrder::Big))?;
    debug!(path = %path.display(), size = mask.size(), "Wrote binary mask");
    Ok(())
}

/// Read a boolean mask written by [`write_binary`]
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not square
pub fn read_binary(path: &Path, seed: u64, symmetry: SymmetrySettings) -> Result<BinaryMask> {
    let bytes = read_file(path)?;
    let mask = BinaryMask::from_bytes(&bytes, ByteOrder::Big, seed, symmetry, path)?;
    debug!(path = %path.display(), size = mask.size(), "Read binary mask");
    Ok(mask)
}

/// Write a scalar mask, four bytes per cell
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn write_scalar(mask: &ScalarMask, path: &Path, order: ByteOrder) -> Result<()> {
    write_file(path, &mask.to_bytes(order))?;
    debug!(path = %path.display(), size = mask.size(), ?order, "Wrote scalar mask");
    Ok(())
}

/// Read a scalar mask written by [`write_scalar`] with the same byte order
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not square
pub fn read_scalar(
    path: &Path,
    order: ByteOrder,
    seed: u64,
    symmetry: SymmetrySettings,
) -> Result<ScalarMask> {
    let bytes = read_file(path)?;
    let mask = ScalarMask::from_bytes(&bytes, order, seed, symmetry, path)?;
    debug!(path = %path.display(), size = mask.size(), ?order, "Read scalar mask");
    Ok(mask)
}

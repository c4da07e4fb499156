//! Brush patterns stamped by the feature placement operators
//!
//! A brush is a named scalar mask decoded from a grayscale image, one cell per
//! pixel with value `luma / 255`. Brushes carry no symmetry of their own.

use std::fs;
use std::path::{Path, PathBuf};

use image::GrayImage;
use ndarray::Array2;
use rand::Rng;
use tracing::{debug, info};

use crate::io::configuration::DEFAULT_SEED;
use crate::io::error::{MaskError, Result, invalid_parameter};
use crate::mask::ScalarMask;
use crate::mask::grid::Grid;
use crate::symmetry::SymmetrySettings;

impl Grid<f32> {
    /// Scalar mask with one cell per pixel, scaled to `[0, 1]`
    ///
    /// Pixel `(px, py)` lands on cell `(px, py)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image is not square
    pub fn from_luma_image(
        image: &GrayImage,
        seed: u64,
        symmetry: SymmetrySettings,
    ) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != height {
            return Err(invalid_parameter(
                "image",
                &format!("{width}x{height}"),
                &"brush images must be square",
            ));
        }
        let size = width as usize;
        let cells = Array2::from_shape_fn((size, size), |(x, y)| {
            image
                .get_pixel_checked(x as u32, y as u32)
                .map_or(0.0, |pixel| f32::from(pixel.0[0]) / 255.0)
        });
        Ok(Self::with_cells(cells, seed, symmetry))
    }
}

/// Named scalar stamp pattern
#[derive(Clone, Debug)]
pub struct Brush {
    name: String,
    pattern: ScalarMask,
}

impl Brush {
    /// Wrap an existing pattern
    pub fn new(name: impl Into<String>, pattern: ScalarMask) -> Self {
        Self {
            name: name.into(),
            pattern,
        }
    }

    /// Decode a brush from a grayscale image file, named after its file stem
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded or is not square
    pub fn load(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|source| MaskError::BrushLoad {
                path: path.to_path_buf(),
                source,
            })?
            .into_luma8();
        let pattern = ScalarMask::from_luma_image(&image, DEFAULT_SEED, SymmetrySettings::default())
            .map_err(|error| MaskError::MalformedData {
                path: path.to_path_buf(),
                reason: error.to_string(),
            })?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        debug!(brush = %name, size = pattern.size(), "Decoded brush");
        Ok(Self::new(name, pattern))
    }

    /// Brush name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Brush pattern
    pub const fn pattern(&self) -> &ScalarMask {
        &self.pattern
    }
}

/// Non-empty collection of brushes a placement operator picks from
#[derive(Clone, Debug)]
pub struct BrushSet {
    brushes: Vec<Brush>,
}

impl BrushSet {
    /// Collect brushes into a set
    ///
    /// # Errors
    ///
    /// Returns an error if `brushes` is empty
    pub fn new(brushes: Vec<Brush>) -> Result<Self> {
        if brushes.is_empty() {
            return Err(invalid_parameter(
                "brushes",
                &0,
                &"a brush set needs at least one brush",
            ));
        }
        Ok(Self { brushes })
    }

    /// Load every listed image as a brush
    ///
    /// # Errors
    ///
    /// Returns an error if any image fails to load or the list is empty
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let brushes = paths
            .iter()
            .map(|path| Brush::load(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let set = Self::new(brushes)?;
        info!(count = set.len(), "Loaded brush set");
        Ok(set)
    }

    /// Load every `.png` file of a directory as a brush, in file name order
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read, any image fails to
    /// load, or no image is found
    pub fn load_dir(directory: &Path) -> Result<Self> {
        let entries = fs::read_dir(directory).map_err(|source| MaskError::FileSystem {
            path: directory.to_path_buf(),
            operation: "read brush directory",
            source,
        })?;
        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|extension| extension.eq_ignore_ascii_case("png"))
            })
            .collect();
        paths.sort();
        Self::load(&paths)
    }

    /// Pick a brush uniformly at random
    pub fn pick<R: Rng>(&self, random: &mut R) -> Option<&Brush> {
        if self.brushes.is_empty() {
            return None;
        }
        self.brushes.get(random.random_range(0..self.brushes.len()))
    }

    /// Number of brushes
    pub fn len(&self) -> usize {
        self.brushes.len()
    }

    /// Check whether the set holds no brush
    pub fn is_empty(&self) -> bool {
        self.brushes.is_empty()
    }

    /// Iterate the brushes in load order
    pub fn iter(&self) -> std::slice::Iter<'_, Brush> {
        self.brushes.iter()
    }
}

impl<'a> IntoIterator for &'a BrushSet {
    type Item = &'a Brush;
    type IntoIter = std::slice::Iter<'a, Brush>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

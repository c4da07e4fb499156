//! Square masks and their operators
//!
//! This module contains the grid engine and its two value kinds:
//! - Generic storage, randomness and symmetry handling
//! - Boolean operators, connected components and area filters
//! - Scalar arithmetic, smoothing and feature placement
//! - Brush patterns for procedural stamping

mod area;
mod binary;
/// Named brush patterns loaded from grayscale images
pub mod brush;
/// Generic grid engine shared by both mask kinds
pub mod grid;
mod placement;
mod scalar;

pub use brush::{Brush, BrushSet};
pub use grid::{CellValue, Grid};

/// Mask of boolean cells
pub type BinaryMask = Grid<bool>;

/// Mask of scalar cells
pub type ScalarMask = Grid<f32>;

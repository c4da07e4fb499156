//! Symmetry policy for balanced terrain
//!
//! This module contains the pure symmetry functions:
//! - Symmetry modes and their multiplicities
//! - Per-map symmetry settings
//! - Canonical regions and mirrored coordinates

/// Symmetry modes and their image counts
pub mod mode;
/// Canonical iteration regions and mirrored coordinates
pub mod region;
/// Per-map symmetry configuration
pub mod settings;

pub use mode::Symmetry;
pub use settings::SymmetrySettings;

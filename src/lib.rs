//! Symmetric grid masks for procedural terrain generation
//!
//! Square boolean and scalar masks are combined through set algebra,
//! morphology and arithmetic while every operator keeps the map's symmetry.
//! Chains of operators run eagerly on grids or deferred through a pipeline
//! that executes independent chains concurrently with reproducible results.

#![forbid(unsafe_code)]

/// Exact Euclidean distance fields, local maxima and spaced sampling
pub mod distance;
/// Input/output, configuration and error handling
pub mod io;
/// Square masks and their operators
pub mod mask;
/// Deferred execution of mask operator chains
pub mod pipeline;
/// Symmetry modes, settings and canonical regions
pub mod symmetry;

pub use io::error::{MaskError, Result};

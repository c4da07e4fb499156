//! Distance field engine
//!
//! This module contains the geometric analysis built on distance fields:
//! - Exact Euclidean distance transform
//! - Local maximum extraction
//! - Spaced and random coordinate sampling

/// Local maximum tests and peak masks
pub mod maxima;
/// Lattice, spaced and random coordinate sampling
pub mod sampling;
/// Separable lower-envelope distance transform
pub mod transform;

//! Input/output, configuration and error handling
//!
//! This module contains everything outside the mask algebra itself:
//! - The crate error type
//! - Operator constants and placement presets
//! - Mask file formats and hashing
//! - Logging setup and the command-line interface

/// Command-line interface for inspecting mask files
pub mod cli;
/// Operator constants and runtime configuration defaults
pub mod configuration;
/// Error types and helpers
pub mod error;
/// Headerless mask files and reproducibility hashes
pub mod format;
/// Tracing subscriber setup
pub mod logging;

//! Error types shared by mask operators, file formats and the deferred pipeline

use std::path::PathBuf;

/// Main error type for all mask operations
#[derive(Debug, thiserror::Error)]
pub enum MaskError {
    /// Operands of a pairwise operator do not share the same side length
    #[error("Masks not the same size during {operation}: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Operator that rejected its operands
        operation: &'static str,
        /// Size of the receiving mask
        expected: usize,
        /// Size of the argument mask
        actual: usize,
    },

    /// Operator parameter validation failed
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A brush pattern could not be decoded
    #[error("Failed to load brush '{}': {source}", path.display())]
    BrushLoad {
        /// Path to the brush image
        path: PathBuf,
        /// Underlying image decoding error
        #[source]
        source: image::ImageError,
    },

    /// Serialized mask data does not describe a square grid
    #[error("Malformed mask data in '{}': {reason}", path.display())]
    MalformedData {
        /// Path of the offending file
        path: PathBuf,
        /// Description of what is wrong with the payload
        reason: String,
    },

    /// General file system operation failure
    #[error("File system error during {operation} on '{}': {source}", path.display())]
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A pipeline node's operation returned an error or panicked
    #[error("Pipeline node {node} ('{name}') failed: {reason}")]
    NodeFailed {
        /// Identifier of the failing node
        node: usize,
        /// Diagnostic name of the node
        name: String,
        /// Rendered failure message
        reason: String,
    },

    /// A pipeline node was skipped because one of its dependencies failed
    #[error("Pipeline node {node} ('{name}') skipped: dependency {dependency} failed")]
    UpstreamFailed {
        /// Identifier of the skipped node
        node: usize,
        /// Diagnostic name of the skipped node
        name: String,
        /// Identifier of the failed dependency
        dependency: usize,
    },

    /// A pipeline node produced a value of the other cell kind
    #[error("Pipeline node {node} holds a {actual} mask, expected a {expected} mask")]
    KindMismatch {
        /// Identifier of the node
        node: usize,
        /// Kind requested by the caller
        expected: &'static str,
        /// Kind actually stored
        actual: &'static str,
    },

    /// The pipeline worker pool could not be started
    #[error("Failed to spawn pipeline worker {index}: {source}")]
    WorkerSpawn {
        /// Index of the worker that failed to start
        index: usize,
        /// Underlying thread creation error
        #[source]
        source: std::io::Error,
    },

    /// The pipeline was shut down before the requested node completed
    #[error("Pipeline shut down before node {node} completed")]
    ShutDown {
        /// Identifier of the unfinished node
        node: usize,
    },

    /// A thread panicked while holding the pipeline graph lock
    #[error("Pipeline graph lock poisoned")]
    Poisoned,
}

/// Convenience type alias for mask results
pub type Result<T> = std::result::Result<T, MaskError>;

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> MaskError {
    MaskError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Reject operands whose sizes differ before any storage is touched
///
/// # Errors
///
/// Returns [`MaskError::SizeMismatch`] when `expected != actual`
pub fn ensure_same_size(
    operation: &'static str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(MaskError::SizeMismatch {
            operation,
            expected,
            actual,
        })
    }
}

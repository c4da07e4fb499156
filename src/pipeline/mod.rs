//! Deferred execution of mask operator chains
//!
//! This module contains the dependency graph and its handles:
//! - A fixed worker pool running every node whose inputs are available
//! - Memoized node results shared between dependents
//! - Fluent handles mirroring the eager mask operators
//!
//! Node randomness comes from the grid value a node reads, so results do not
//! depend on worker count or scheduling order.

/// Dependency graph, worker pool and node bookkeeping
pub mod graph;
/// Fluent handles registering operators as nodes
pub mod handle;
/// Type-erased node results
pub mod value;

pub use graph::{NodeId, Pipeline, PipelineStats};
pub use handle::MaskHandle;
pub use value::{MaskValue, PipelineCell};

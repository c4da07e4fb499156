//! Operator constants and runtime configuration defaults

// Default values for configurable parameters
/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Worker count used when the host parallelism cannot be queried
pub const FALLBACK_WORKER_COUNT: usize = 4;

// Summed-area tables hold integers; scalar values are scaled before summation
/// Scale applied to scalar cells before they enter an inner count table
pub const INNER_COUNT_SCALE: f32 = 1000.0;

/// Density threshold used by binary smoothing when none is given
pub const DEFAULT_SMOOTH_DENSITY: f32 = 0.5;

// Gap filling and widening smooth the inflated gap seeds with these settings
/// Smoothing radius applied to gap seeds
pub const GAP_SMOOTH_RADIUS: usize = 4;
/// Smoothing density applied to gap seeds
pub const GAP_SMOOTH_DENSITY: f32 = 0.75;

/// Distance field values at or below this are never treated as placement peaks
pub const PLACEMENT_PEAK_FLOOR: f32 = 0.1;

/// Sentinel multiplier for cells with no seed in the distance transform
///
/// Seeds start at `DISTANCE_SENTINEL_FACTOR * size^2`, which exceeds every
/// reachable squared distance on a `size x size` grid.
pub const DISTANCE_SENTINEL_FACTOR: f64 = 2.0;

/// Parameters for stamping brush features along the spine of a mask
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeaturePlacement {
    /// Minimum spacing between candidate placement points
    pub min_spacing: f32,
    /// Distance values are clamped to this before becoming height multipliers
    pub height_cap: f32,
    /// Smoothing radius applied to the height multiplier
    pub height_smoothing: usize,
    /// Brush side length per unit of local distance
    pub shrink_factor: f32,
    /// Candidates closer than `exclusion_factor * distance` to a placed point are dropped
    pub exclusion_factor: f32,
    /// Rescale the brush so its peak is 1.0 before stamping
    pub normalize_brush: bool,
}

impl FeaturePlacement {
    /// Rolling hills: low height cap, brush used as-is
    pub const fn hills() -> Self {
        Self {
            min_spacing: 16.0,
            height_cap: 10.0,
            height_smoothing: 2,
            shrink_factor: 8.0,
            exclusion_factor: 2.0,
            normalize_brush: false,
        }
    }

    /// Mountains: higher height cap, brush normalised to a unit peak
    pub const fn mountains() -> Self {
        Self {
            min_spacing: 16.0,
            height_cap: 16.0,
            height_smoothing: 2,
            shrink_factor: 8.0,
            exclusion_factor: 2.0,
            normalize_brush: true,
        }
    }
}

/// Number of pipeline workers matching the host's available parallelism
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism().map_or(FALLBACK_WORKER_COUNT, std::num::NonZeroUsize::get)
}

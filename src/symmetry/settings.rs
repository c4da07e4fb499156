//! Per-map symmetry configuration

use crate::symmetry::mode::Symmetry;

/// Symmetry modes for the three axes a map is balanced along
///
/// Terrain symmetry is the mode every mutating operator restores; spawn
/// symmetry defines the region hashed for reproducibility checks and the
/// region spawn-related fills are limited to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct SymmetrySettings {
    /// Symmetry between player spawn locations
    pub spawn: Symmetry,
    /// Symmetry between teams
    pub team: Symmetry,
    /// Symmetry of the terrain itself
    pub terrain: Symmetry,
}

impl SymmetrySettings {
    /// Create settings from the three axis modes
    pub const fn new(spawn: Symmetry, team: Symmetry, terrain: Symmetry) -> Self {
        Self {
            spawn,
            team,
            terrain,
        }
    }

    /// Use the same mode on every axis
    pub const fn uniform(mode: Symmetry) -> Self {
        Self::new(mode, mode, mode)
    }
}

//! Symmetry modes and their image counts

use std::fmt;
use std::str::FromStr;

use crate::io::error::{MaskError, invalid_parameter};

/// Reflective or rotational symmetry applied to a square grid
///
/// Single-axis modes mirror across one line, `Point2` reflects through the
/// centre, and the compound modes combine two of the simple ones so every
/// canonical cell has up to three images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Symmetry {
    /// No symmetry, every cell is independent
    #[default]
    None,
    /// Mirror across the horizontal centre line (`x -> N-1-x`)
    X,
    /// Mirror across the vertical centre line (`y -> N-1-y`)
    Z,
    /// Mirror across the main diagonal (`(x, y) -> (y, x)`)
    XZ,
    /// Mirror across the anti-diagonal (`(x, y) -> (N-1-y, N-1-x)`)
    ZX,
    /// 180 degree rotation about the centre
    Point2,
    /// 90 degree rotational symmetry
    Point4,
    /// Both centre lines (`X` and `Z` combined)
    Quad,
    /// Both diagonals (`XZ` and `ZX` combined)
    Diag,
}

impl Symmetry {
    /// Every supported mode, in declaration order
    pub const ALL: [Self; 9] = [
        Self::None,
        Self::X,
        Self::Z,
        Self::XZ,
        Self::ZX,
        Self::Point2,
        Self::Point4,
        Self::Quad,
        Self::Diag,
    ];

    /// Number of images of a canonical cell, counting the cell itself
    pub const fn multiplicity(self) -> usize {
        match self {
            Self::None => 1,
            Self::X | Self::Z | Self::XZ | Self::ZX | Self::Point2 => 2,
            Self::Point4 | Self::Quad | Self::Diag => 4,
        }
    }

    /// The two simple modes a compound mode is built from
    pub const fn components(self) -> Option<(Self, Self)> {
        match self {
            Self::Quad => Some((Self::X, Self::Z)),
            Self::Diag => Some((Self::XZ, Self::ZX)),
            _ => None,
        }
    }

    /// Lower-case name used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::X => "x",
            Self::Z => "z",
            Self::XZ => "xz",
            Self::ZX => "zx",
            Self::Point2 => "point2",
            Self::Point4 => "point4",
            Self::Quad => "quad",
            Self::Diag => "diag",
        }
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symmetry {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == lowered)
            .ok_or_else(|| {
                invalid_parameter(
                    "symmetry",
                    &s,
                    &"expected one of none, x, z, xz, zx, point2, point4, quad, diag",
                )
            })
    }
}

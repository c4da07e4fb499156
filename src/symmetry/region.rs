//! Canonical iteration regions and mirrored coordinates
//!
//! The canonical region of a mode is the set of cells treated as independent:
//! `{(x, y) | min_x <= x < max_x, min_y(x) <= y < max_y(x)}`. Every other cell
//! is an image of exactly one canonical cell. Operators that only visit the
//! canonical region must copy the result to the images afterwards.

use crate::symmetry::mode::Symmetry;

/// First row of the canonical region
pub const fn min_x_bound(_mode: Symmetry, _size: usize) -> usize {
    0
}

/// One past the last row of the canonical region
pub const fn max_x_bound(mode: Symmetry, size: usize) -> usize {
    match mode {
        Symmetry::None | Symmetry::Z | Symmetry::XZ | Symmetry::ZX | Symmetry::Diag => size,
        Symmetry::X | Symmetry::Quad | Symmetry::Point2 | Symmetry::Point4 => size.div_ceil(2),
    }
}

/// First column of the canonical region in row `x`
pub const fn min_y_bound(mode: Symmetry, size: usize, x: usize) -> usize {
    match mode {
        // Odd grids keep only the centre cell of the middle row
        Symmetry::Point4 if size % 2 == 1 && x == size / 2 => size / 2,
        _ => 0,
    }
}

/// One past the last column of the canonical region in row `x`
pub const fn max_y_bound(mode: Symmetry, size: usize, x: usize) -> usize {
    match mode {
        Symmetry::None | Symmetry::X => size,
        Symmetry::Z | Symmetry::Quad => size.div_ceil(2),
        Symmetry::XZ => {
            if x < size {
                x + 1
            } else {
                size
            }
        }
        Symmetry::ZX => size.saturating_sub(x),
        Symmetry::Diag => {
            let mirrored = size.saturating_sub(x + 1);
            let limit = if x < mirrored { x } else { mirrored };
            limit + 1
        }
        Symmetry::Point2 => {
            if x < size / 2 {
                size
            } else {
                size.div_ceil(2)
            }
        }
        Symmetry::Point4 => {
            if x < size / 2 {
                size.div_ceil(2)
            } else {
                size / 2 + 1
            }
        }
    }
}

/// Check whether a cell lies inside the canonical region
pub const fn is_canonical(mode: Symmetry, size: usize, x: usize, y: usize) -> bool {
    x >= min_x_bound(mode, size)
        && x < max_x_bound(mode, size)
        && y >= min_y_bound(mode, size, x)
        && y < max_y_bound(mode, size, x)
}

/// Iterate the canonical region in scan order (x outer, y inner)
pub fn canonical_points(mode: Symmetry, size: usize) -> impl Iterator<Item = [usize; 2]> {
    (min_x_bound(mode, size)..max_x_bound(mode, size)).flat_map(move |x| {
        (min_y_bound(mode, size, x)..max_y_bound(mode, size, x)).map(move |y| [x, y])
    })
}

/// Images of `(x, y)` under `mode`, excluding the cell itself
///
/// Always returns `mode.multiplicity() - 1` points. On symmetry axes an image
/// may coincide with the source cell. Coordinates must be inside the grid.
pub fn mirrored_points(mode: Symmetry, size: usize, x: usize, y: usize) -> Vec<[usize; 2]> {
    let last = size.saturating_sub(1);
    let flip_x = last.saturating_sub(x);
    let flip_y = last.saturating_sub(y);

    match mode {
        Symmetry::None => Vec::new(),
        Symmetry::X => vec![[flip_x, y]],
        Symmetry::Z => vec![[x, flip_y]],
        Symmetry::XZ => vec![[y, x]],
        Symmetry::ZX => vec![[flip_y, flip_x]],
        Symmetry::Point2 => vec![[flip_x, flip_y]],
        Symmetry::Point4 => vec![[flip_y, x], [flip_x, flip_y], [y, flip_x]],
        Symmetry::Quad => vec![[flip_x, y], [x, flip_y], [flip_x, flip_y]],
        Symmetry::Diag => vec![[y, x], [flip_y, flip_x], [flip_x, flip_y]],
    }
}

/// Number of cells in the canonical region
pub fn canonical_cell_count(mode: Symmetry, size: usize) -> usize {
    (min_x_bound(mode, size)..max_x_bound(mode, size))
        .map(|x| max_y_bound(mode, size, x).saturating_sub(min_y_bound(mode, size, x)))
        .sum()
}

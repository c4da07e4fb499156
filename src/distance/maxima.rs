//! Local maximum extraction on scalar masks

use ndarray::Array2;

use crate::mask::{BinaryMask, ScalarMask};

/// Check whether `(x, y)` is at least as high as all eight neighbours
///
/// Only interior cells qualify; border cells are never local maxima.
pub fn is_local_max(mask: &ScalarMask, x: usize, y: usize) -> bool {
    let size = mask.size();
    if x == 0 || y == 0 || x + 1 >= size || y + 1 >= size {
        return false;
    }
    let value = mask.get(x, y);
    let (cx, cy) = (x as i64, y as i64);
    (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dy| (dx, dy)))
        .filter(|&offset| offset != (0, 0))
        .all(|(dx, dy)| {
            mask.try_get(cx + dx, cy + dy)
                .is_some_and(|neighbour| neighbour <= value)
        })
}

/// Check whether `(x, y)` peaks along the `x` axis or along the `y` axis
pub fn is_local_1d_max(mask: &ScalarMask, x: usize, y: usize) -> bool {
    let value = mask.get(x, y);
    let (cx, cy) = (x as i64, y as i64);
    let below = |dx: i64, dy: i64| {
        mask.try_get(cx + dx, cy + dy)
            .is_some_and(|neighbour| neighbour <= value)
    };
    (below(-1, 0) && below(1, 0)) || (below(0, -1) && below(0, 1))
}

/// Local maxima with values strictly between `min` and `max`
pub fn local_maxima(mask: &mut ScalarMask, min: f32, max: f32) -> BinaryMask {
    select_peaks(mask, min, max, is_local_max)
}

/// Axis-wise local maxima with values strictly between `min` and `max`
pub fn local_1d_maxima(mask: &mut ScalarMask, min: f32, max: f32) -> BinaryMask {
    select_peaks(mask, min, max, is_local_1d_max)
}

fn select_peaks<F>(mask: &mut ScalarMask, min: f32, max: f32, is_peak: F) -> BinaryMask
where
    F: Fn(&ScalarMask, usize, usize) -> bool,
{
    let seed = mask.next_seed();
    let view: &ScalarMask = mask;
    let size = view.size();
    let cells = Array2::from_shape_fn((size, size), |(x, y)| {
        let value = view.get(x, y);
        value > min && value < max && is_peak(view, x, y)
    });
    BinaryMask::with_cells(cells, seed, view.symmetry_settings())
}

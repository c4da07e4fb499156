//! Exact Euclidean distance transform
//!
//! Separable lower-envelope-of-parabolas transform: every line along `y` is
//! transformed first, then every line along `x`, which yields exact squared
//! Euclidean distances in `O(N^2)`.

use ndarray::{Array2, ArrayViewMut1};

use crate::io::configuration::DISTANCE_SENTINEL_FACTOR;
use crate::mask::{BinaryMask, ScalarMask};

/// Squared distance transform of a cost grid, in place
///
/// Each cell ends up holding `min over (i, j) of cost[i, j] + (x - i)^2 + (y - j)^2`.
/// Costs must be finite.
pub fn squared_distance_transform(values: &mut Array2<f64>) {
    let length = values.nrows().max(values.ncols());
    let mut scratch = Envelope::with_capacity(length);
    for lane in values.rows_mut() {
        scratch.transform(lane);
    }
    for lane in values.columns_mut() {
        scratch.transform(lane);
    }
}

/// Euclidean distance from every cell to the nearest true cell of `mask`
///
/// True cells are seeds at distance 0. A mask with no true cell maps every
/// cell to the square root of the sentinel, `sqrt(2) * N`.
pub fn distance_field(mask: &BinaryMask, seed: u64) -> ScalarMask {
    let size = mask.size();
    let sentinel = DISTANCE_SENTINEL_FACTOR * (size * size) as f64;
    let mut values = mask
        .cells()
        .mapv(|cell| if cell { 0.0 } else { sentinel });
    squared_distance_transform(&mut values);
    let cells = values.mapv(|squared| squared.sqrt() as f32);
    ScalarMask::with_cells(cells, seed, mask.symmetry_settings())
}

// Reusable buffers for the 1D lower envelope
struct Envelope {
    costs: Vec<f64>,
    vertices: Vec<usize>,
    boundaries: Vec<f64>,
}

impl Envelope {
    fn with_capacity(length: usize) -> Self {
        Self {
            costs: Vec::with_capacity(length),
            vertices: vec![0; length.max(1)],
            boundaries: vec![0.0; length + 1],
        }
    }

    // Intersection of the parabolas rooted at q and p
    fn intersection(&self, q: usize, p: usize) -> f64 {
        let at = |i: usize| self.costs.get(i).copied().unwrap_or(f64::INFINITY);
        let (qf, pf) = (q as f64, p as f64);
        (qf.mul_add(qf, at(q)) - pf.mul_add(pf, at(p))) / (2.0 * (qf - pf))
    }

    // The vertex and boundary stacks never grow past the line length
    #[allow(clippy::indexing_slicing)]
    fn transform(&mut self, mut lane: ArrayViewMut1<'_, f64>) {
        let length = lane.len();
        if length == 0 {
            return;
        }
        self.costs.clear();
        self.costs.extend(lane.iter().copied());

        let mut k = 0;
        self.vertices[0] = 0;
        self.boundaries[0] = f64::NEG_INFINITY;
        self.boundaries[1] = f64::INFINITY;

        for q in 1..length {
            let mut s = self.intersection(q, self.vertices[k]);
            while s <= self.boundaries[k] {
                k -= 1;
                s = self.intersection(q, self.vertices[k]);
            }
            k += 1;
            self.vertices[k] = q;
            self.boundaries[k] = s;
            self.boundaries[k + 1] = f64::INFINITY;
        }

        k = 0;
        for (q, cell) in lane.iter_mut().enumerate() {
            while self.boundaries[k + 1] < q as f64 {
                k += 1;
            }
            let vertex = self.vertices[k];
            let offset = q as f64 - vertex as f64;
            *cell = offset.mul_add(offset, self.costs[vertex]);
        }
    }
}

//! Coordinate sampling over boolean masks

use rand::Rng;

use crate::mask::BinaryMask;

/// Euclidean distance between two cells
pub fn cell_distance([ax, ay]: [usize; 2], [bx, by]: [usize; 2]) -> f32 {
    let dx = ax as f32 - bx as f32;
    let dy = ay as f32 - by as f32;
    dx.hypot(dy)
}

/// Cells on a lattice of `spacing` in scan order
pub fn all_coordinates(mask: &BinaryMask, spacing: usize) -> Vec<[usize; 2]> {
    let step = spacing.max(1);
    (0..mask.size())
        .step_by(step)
        .flat_map(|x| (0..mask.size()).step_by(step).map(move |y| [x, y]))
        .collect()
}

/// Lattice cells holding `value` in scan order
pub fn all_coordinates_equal_to(mask: &BinaryMask, value: bool, spacing: usize) -> Vec<[usize; 2]> {
    all_coordinates(mask, spacing)
        .into_iter()
        .filter(|&[x, y]| mask.get(x, y) == value)
        .collect()
}

/// Greedy ordered thinning: keep a candidate, drop everything closer than `radius`, repeat
pub fn spaced_coordinates(candidates: &[[usize; 2]], radius: f32) -> Vec<[usize; 2]> {
    let mut remaining = candidates.to_vec();
    let mut chosen = Vec::new();
    while !remaining.is_empty() {
        let location = remaining.remove(0);
        chosen.push(location);
        remaining.retain(|&candidate| cell_distance(location, candidate) >= radius);
    }
    chosen
}

/// Randomly ordered thinning of the true cells of `mask`
///
/// After each pick, candidates closer than `min_spacing` to the pick or to
/// any of its mirror images under the terrain symmetry are discarded, so
/// mirrored placements never crowd each other.
pub fn random_coordinates(mask: &mut BinaryMask, min_spacing: f32) -> Vec<[usize; 2]> {
    let mut remaining = all_coordinates_equal_to(mask, true, 1);
    let mut chosen = Vec::new();
    while !remaining.is_empty() {
        let pick = mask.random_mut().random_range(0..remaining.len());
        let location = remaining.remove(pick);
        chosen.push(location);

        let [x, y] = location;
        let mut exclusions = mask.mirrored_points(x, y);
        exclusions.push(location);
        remaining.retain(|&candidate| {
            exclusions
                .iter()
                .all(|&excluded| cell_distance(excluded, candidate) >= min_spacing)
        });
    }
    chosen
}

/// A uniformly chosen true cell, `None` when the mask has none
pub fn random_position(mask: &mut BinaryMask) -> Option<[usize; 2]> {
    let candidates = all_coordinates_equal_to(mask, true, 1);
    if candidates.is_empty() {
        return None;
    }
    let pick = mask.random_mut().random_range(0..candidates.len());
    candidates.get(pick).copied()
}

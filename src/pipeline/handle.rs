//! Fluent handles that register mask operators as pipeline nodes
//!
//! A handle names the node holding its current state. Each chained call
//! registers a node that reads that state (plus any other handle passed as an
//! argument), applies the operator to a private copy and becomes the handle's
//! new state. The grid's random source travels with its value, so a chain
//! materializes to exactly what the same calls produce on an eager grid.
//!
//! Single-mask operators and the paired operators of the mask kinds have
//! fluent counterparts here. Operators that read several masks at once or
//! mutate their argument go through [`MaskHandle::map`],
//! [`MaskHandle::combine`] and [`MaskHandle::derive`], which register any
//! closure as a node. Both handles passed to a paired operator must come from the
//! same pipeline; a foreign handle fails the node instead of reading another
//! pipeline's graph.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::io::error::{MaskError, Result, invalid_parameter};
use crate::mask::grid::Grid;
use crate::io::configuration::FeaturePlacement;
use crate::mask::{BinaryMask, BrushSet, ScalarMask};
use crate::pipeline::graph::{NodeId, NodeOp, Pipeline};
use crate::pipeline::value::{MaskValue, PipelineCell};
use crate::symmetry::{Symmetry, SymmetrySettings};

/// Reference to the latest state of a mask inside a [`Pipeline`]
#[derive(Debug)]
pub struct MaskHandle<'p, T: PipelineCell> {
    pipeline: &'p Pipeline,
    node: NodeId,
    kind: PhantomData<fn() -> T>,
}

impl Pipeline {
    /// Register an existing grid as a root node
    pub fn mask<T: PipelineCell>(&self, grid: Grid<T>) -> MaskHandle<'_, T> {
        let operation: NodeOp = Box::new(move |_inputs| Ok(T::wrap(grid)));
        let node = self.register("mask", Vec::new(), operation);
        MaskHandle::at(self, node)
    }

    /// Register an all-false boolean mask
    pub fn binary_mask(
        &self,
        size: usize,
        seed: u64,
        symmetry: SymmetrySettings,
    ) -> MaskHandle<'_, bool> {
        self.mask(BinaryMask::new(size, seed, symmetry))
    }

    /// Register an all-zero scalar mask
    pub fn scalar_mask(
        &self,
        size: usize,
        seed: u64,
        symmetry: SymmetrySettings,
    ) -> MaskHandle<'_, f32> {
        self.mask(ScalarMask::new(size, seed, symmetry))
    }
}

fn input<'a, T: PipelineCell>(
    inputs: &'a [Arc<MaskValue>],
    dependencies: &[NodeId],
    index: usize,
) -> Result<&'a Grid<T>> {
    let node = dependencies.get(index).copied().unwrap_or(index);
    let value = inputs
        .get(index)
        .ok_or_else(|| invalid_parameter("dependency", &node, &"value was not published"))?;
    T::peek(value).ok_or_else(|| MaskError::KindMismatch {
        node,
        expected: T::KIND,
        actual: value.kind(),
    })
}

impl<'p, T: PipelineCell> MaskHandle<'p, T> {
    const fn at(pipeline: &'p Pipeline, node: NodeId) -> Self {
        Self {
            pipeline,
            node,
            kind: PhantomData,
        }
    }

    /// Node holding the handle's current state
    pub const fn node(&self) -> NodeId {
        self.node
    }

    /// Pipeline the handle registers into
    pub const fn pipeline(&self) -> &'p Pipeline {
        self.pipeline
    }

    // Point the handle at a newly registered node and let go of the old one
    fn advance(&mut self, name: &'static str, dependencies: Vec<NodeId>, node_op: NodeOp) -> &mut Self {
        let previous = self.node;
        self.node = self.pipeline.register(name, dependencies, node_op);
        self.pipeline.drop_holder(previous);
        self
    }

    /// Register an arbitrary in-place operator
    pub fn map<F>(&mut self, name: &'static str, operation: F) -> &mut Self
    where
        F: FnOnce(&mut Grid<T>) -> Result<()> + Send + 'static,
    {
        let dependencies = vec![self.node];
        let reads = dependencies.clone();
        let node_op: NodeOp = Box::new(move |inputs| {
            let mut grid = input::<T>(inputs, &reads, 0)?.clone();
            operation(&mut grid)?;
            Ok(T::wrap(grid))
        });
        self.advance(name, dependencies, node_op)
    }

    /// Register an in-place operator that also reads the current state of `other`
    pub fn combine<U, F>(&mut self, name: &'static str, other: &MaskHandle<'p, U>, operation: F) -> &mut Self
    where
        U: PipelineCell,
        F: FnOnce(&mut Grid<T>, &Grid<U>) -> Result<()> + Send + 'static,
    {
        if !std::ptr::eq(self.pipeline, other.pipeline) {
            let foreign = other.node;
            return self.map(name, move |_grid| {
                Err(invalid_parameter(
                    "other",
                    &foreign,
                    &"handle belongs to a different pipeline",
                ))
            });
        }

        let dependencies = vec![self.node, other.node];
        let reads = dependencies.clone();
        let node_op: NodeOp = Box::new(move |inputs| {
            let mut grid = input::<T>(inputs, &reads, 0)?.clone();
            let argument = input::<U>(inputs, &reads, 1)?;
            operation(&mut grid, argument)?;
            Ok(T::wrap(grid))
        });
        self.advance(name, dependencies, node_op)
    }

    /// Register a node deriving a new mask from the current state without advancing it
    pub fn derive<U, F>(&self, name: &'static str, operation: F) -> MaskHandle<'p, U>
    where
        U: PipelineCell,
        F: FnOnce(&Grid<T>) -> Result<Grid<U>> + Send + 'static,
    {
        let dependencies = vec![self.node];
        let reads = dependencies.clone();
        let node_op: NodeOp = Box::new(move |inputs| {
            let grid = input::<T>(inputs, &reads, 0)?;
            Ok(U::wrap(operation(grid)?))
        });
        MaskHandle::at(self.pipeline, self.pipeline.register(name, dependencies, node_op))
    }

    // Derivations that draw one seed from the source; the source handle
    // advances its random source the same way
    fn fork<U, F>(&mut self, name: &'static str, operation: F) -> MaskHandle<'p, U>
    where
        U: PipelineCell,
        F: FnOnce(&mut Grid<T>) -> Grid<U> + Send + 'static,
    {
        let derived = self.derive(name, move |grid| {
            let mut source = grid.clone();
            Ok(operation(&mut source))
        });
        self.map("advance_seed", |grid| {
            grid.next_seed();
            Ok(())
        });
        derived
    }

    /// Register an independent copy of the current state
    #[must_use]
    pub fn copy(&mut self) -> Self {
        self.fork("copy", Grid::copy)
    }

    /// Block until the current state is computed and return it
    ///
    /// # Errors
    ///
    /// Returns an error if the node or one of its dependencies failed
    pub fn materialize(&self) -> Result<Grid<T>> {
        let value = self.pipeline.wait_for(self.node)?;
        T::peek(&value).cloned().ok_or_else(|| MaskError::KindMismatch {
            node: self.node,
            expected: T::KIND,
            actual: value.kind(),
        })
    }

    /// Mirror the canonical region over the whole grid
    pub fn apply_symmetry(&mut self) -> &mut Self {
        self.map("apply_symmetry", |grid| {
            grid.apply_symmetry();
            Ok(())
        })
    }

    /// Mirror the canonical region of `mode` over the whole grid
    pub fn apply_symmetry_with(&mut self, mode: Symmetry) -> &mut Self {
        self.map("apply_symmetry_with", move |grid| {
            grid.apply_symmetry_with(mode);
            Ok(())
        })
    }

    /// Resample to `size` cells per side
    pub fn resize(&mut self, size: usize) -> &mut Self {
        self.map("resize", move |grid| {
            grid.resize(size);
            Ok(())
        })
    }

    /// Resample to `size` cells per side, restoring `mode` symmetry
    pub fn resize_with(&mut self, size: usize, mode: Symmetry) -> &mut Self {
        self.map("resize_with", move |grid| {
            grid.resize_with(size, mode);
            Ok(())
        })
    }

    /// Set every cell to `value`
    pub fn fill(&mut self, value: T) -> &mut Self {
        self.map("fill", move |grid| {
            grid.fill(value);
            Ok(())
        })
    }
}

impl<T: PipelineCell> Drop for MaskHandle<'_, T> {
    fn drop(&mut self) {
        self.pipeline.drop_holder(self.node);
    }
}

macro_rules! unary_ops {
    ($($(#[$doc:meta])* $name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, $($arg: $ty),*) -> &mut Self {
                self.map(stringify!($name), move |grid| {
                    grid.$name($($arg),*);
                    Ok(())
                })
            }
        )*
    };
}

macro_rules! paired_ops {
    ($kind:ty; $($(#[$doc:meta])* $name:ident($($arg:ident: $ty:ty),*);)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self, other: &MaskHandle<'p, $kind>, $($arg: $ty),*) -> &mut Self {
                self.combine(stringify!($name), other, move |grid, argument| {
                    grid.$name(argument, $($arg),*)?;
                    Ok(())
                })
            }
        )*
    };
}

impl<'p> MaskHandle<'p, bool> {
    unary_ops! {
        /// Set every cell to false
        clear();
        /// Set canonical cells true with probability `density`
        randomize(density: f32);
        /// Keep each true cell of the spawn region with probability `density`
        flip_values(density: f32);
        /// Keep each true cell of the canonical region of `mode` with probability `density`
        flip_values_with(density: f32, mode: Symmetry);
        /// Mark cells visited by random walkers
        random_walk(walkers: usize, steps: usize);
        /// Random walks that never step in one banned direction
        progressive_walk(walkers: usize, steps: usize);
        /// Negate every cell
        invert();
        /// Grow true regions by `radius`
        inflate(radius: f32);
        /// Shrink true regions by `radius`
        deflate(radius: f32);
        /// Clear true cells with more than one false neighbour
        cut_corners();
        /// Randomly eat away at region edges
        acid(strength: f32, size: f32);
        /// Randomly extend region edges
        grow(strength: f32, count: usize);
        /// Randomly remove edge cells
        erode(strength: f32, count: usize);
        /// Randomly extend region edges under `mode` symmetry
        grow_with(strength: f32, mode: Symmetry, count: usize);
        /// Randomly remove edge cells under `mode` symmetry
        erode_with(strength: f32, mode: Symmetry, count: usize);
        /// Keep only region outlines
        outline();
        /// Majority filter over a square window
        smooth(radius: usize);
        /// Density filter over a square window
        smooth_with_density(radius: usize, density: f32);
        /// Fill the map sides under spawn symmetry
        fill_sides(extent: i64, value: bool);
        /// Fill the map centre under spawn symmetry
        fill_center(extent: i64, value: bool);
        /// Restrict true cells to the first spawn region
        limit_to_spawn_region();
        /// Fill the first team half
        fill_half(value: bool);
        /// Fill the map sides under `mode`
        fill_sides_with(extent: i64, value: bool, mode: Symmetry);
        /// Fill the map centre under `mode`
        fill_center_with(extent: i64, value: bool, mode: Symmetry);
        /// Fill the first half under `mode`
        fill_half_with(value: bool, mode: Symmetry);
        /// Fill a disc
        fill_circle(x: f32, y: f32, radius: f32, value: bool);
        /// Fill an axis-aligned rectangle
        fill_rect(x: i64, y: i64, width: i64, height: i64, value: bool);
        /// Fill a rim along every border
        fill_edge(rim_width: usize, value: bool);
        /// Fill a square with its corner at `(x, y)`
        fill_square(x: i64, y: i64, extent: i64, value: bool);
        /// Fill the rectangle spanned by two corners
        fill_rectangle_from_points(x1: i64, x2: i64, y1: i64, y2: i64, value: bool);
        /// Fill a sheared rectangle
        fill_parallelogram(x: i64, y: i64, width: i64, height: i64, x_slope: i64, y_slope: i64, value: bool);
        /// Fill a band along a diagonal
        fill_diagonal(extent: i64, inverted: bool, value: bool);
        /// Remove regions smaller than `min_area`
        remove_areas_smaller_than(min_area: usize);
        /// Remove regions bigger than `max_area`
        remove_areas_bigger_than(max_area: usize);
        /// Keep only regions within `[min_size, max_size]`
        remove_areas_outside_of_specified_size(min_size: usize, max_size: usize);
        /// Remove regions whose size lies within `[min_size, max_size]`
        remove_areas_of_specified_size(min_size: usize, max_size: usize);
        /// Flip the region containing `(x, y)`
        fill_shape(x: usize, y: usize);
        /// Fill gaps narrower than `min_dist`
        fill_gaps(min_dist: usize);
        /// Widen gaps narrower than `min_dist`
        widen_gaps(min_dist: usize);
    }

    paired_ops! { bool;
        /// Logical or with the current state of `other`
        union();
        /// Logical and with the current state of `other`
        intersect();
        /// Clear cells that are true in the current state of `other`
        difference();
    }

    /// Register the distance field of the current state
    pub fn distance_field(&mut self) -> MaskHandle<'p, f32> {
        self.fork("distance_field", BinaryMask::distance_field)
    }

    /// Register a scalar mask holding `high` where true and `low` elsewhere
    pub fn to_scalar(&mut self, low: f32, high: f32) -> MaskHandle<'p, f32> {
        self.fork("to_scalar", move |grid| ScalarMask::from_binary(grid, low, high))
    }
}

impl<'p> MaskHandle<'p, f32> {
    unary_ops! {
        /// Set every cell to zero
        clear();
        /// Add `value` to every cell
        add_scalar(value: f32);
        /// Subtract `value` from every cell
        subtract_scalar(value: f32);
        /// Multiply every cell by `value`
        multiply_scalar(value: f32);
        /// Add normally distributed noise
        add_gaussian_noise(scale: f32);
        /// Add uniform noise
        add_white_noise(scale: f32);
        /// Square root of every cell
        sqrt();
        /// Raise cells below `value` to it
        clamp_min(value: f32);
        /// Lower cells above `value` to it
        clamp_max(value: f32);
        /// Zero cells below `value`
        threshold(value: f32);
        /// Box blur
        smooth(radius: usize);
        /// Raise cells to the square of the local mean
        spike(radius: usize);
        /// Slope magnitude from central differences
        gradient();
        /// Maximum slope in the engine's vertex convention
        supcom_gradient();
        /// Zero values outside `[min, max]`
        remove_values_outside_of_range(min: f32, max: f32);
        /// Zero values inside `[min, max]`
        remove_values_in_range(min: f32, max: f32);
        /// Upsample to `size`
        enlarge(size: usize);
        /// Box-average downsample to `size`
        shrink(size: usize);
        /// Zero intensity regions whose size lies within `[min_size, max_size]`
        remove_areas_of_specified_intensity_and_size(min_size: usize, max_size: usize, min_intensity: f32, max_intensity: f32);
        /// Pull down intensity regions whose size lies outside `[min_size, max_size]`
        remove_areas_outside_of_specified_intensity_and_size(min_size: usize, max_size: usize, min_intensity: f32, max_intensity: f32);
        /// Remove sized regions at `precision` descending intensity levels
        remove_areas_of_specified_size_with_local_maximums(min_size: usize, max_size: usize, precision: usize, value_max: f32);
    }

    paired_ops! { f32;
        /// Cell-wise sum with `other`
        add();
        /// Cell-wise difference with `other`
        subtract();
        /// Cell-wise product with `other`
        multiply();
        /// Cell-wise minimum with `other`
        min_with();
        /// Cell-wise maximum with `other`
        max_with();
    }

    paired_ops! { bool;
        /// Overwrite with `high` where `other` is true and `low` elsewhere
        init(low: f32, high: f32);
        /// Add `value` where `other` is true
        add_binary(value: f32);
        /// Subtract `value` where `other` is true
        subtract_binary(value: f32);
        /// Zero cells outside `other`
        remove_values_outside_of();
        /// Zero cells inside `other`
        remove_values_inside_of();
    }

    /// Box blur restricted to the true cells of `limiter`
    pub fn smooth_limited(&mut self, radius: usize, limiter: &MaskHandle<'p, bool>) -> &mut Self {
        self.combine("smooth_limited", limiter, move |grid, argument| {
            grid.smooth_limited(radius, argument)?;
            Ok(())
        })
    }

    /// Spike restricted to the true cells of `limiter`
    pub fn spike_limited(&mut self, radius: usize, limiter: &MaskHandle<'p, bool>) -> &mut Self {
        self.combine("spike_limited", limiter, move |grid, argument| {
            grid.spike_limited(radius, argument)?;
            Ok(())
        })
    }

    /// Slope down from the shoreline of `land`
    pub fn mask_to_ocean_heights(&mut self, slope: f32, land: &MaskHandle<'p, bool>) -> &mut Self {
        self.combine("mask_to_ocean_heights", land, move |grid, argument| {
            grid.mask_to_ocean_heights(slope, argument)?;
            Ok(())
        })
    }

    /// Multiply by `kernel` stamped at every cell
    pub fn convolve(&mut self, kernel: &MaskHandle<'p, f32>) -> &mut Self {
        self.combine("convolve", kernel, |grid, argument| {
            grid.convolve(argument);
            Ok(())
        })
    }

    /// Stamp `other` at `(x, y)` onto the current state
    pub fn add_at_offset(&mut self, other: &MaskHandle<'p, f32>, x: i64, y: i64, center: bool) -> &mut Self {
        self.combine("add_at_offset", other, move |grid, argument| {
            grid.add_at_offset(argument, x, y, center);
            Ok(())
        })
    }

    /// Subtract `other` stamped at `(x, y)` from the current state
    pub fn subtract_at_offset(&mut self, other: &MaskHandle<'p, f32>, x: i64, y: i64, center: bool) -> &mut Self {
        self.combine("subtract_at_offset", other, move |grid, argument| {
            grid.subtract_at_offset(argument, x, y, center);
            Ok(())
        })
    }

    /// Multiply the current state by `other` stamped at `(x, y)`
    pub fn multiply_at_offset(&mut self, other: &MaskHandle<'p, f32>, x: i64, y: i64, center: bool) -> &mut Self {
        self.combine("multiply_at_offset", other, move |grid, argument| {
            grid.multiply_at_offset(argument, x, y, center);
            Ok(())
        })
    }

    /// Stamp hill brushes inside the true cells of `mask`
    pub fn mask_to_hills(&mut self, mask: &MaskHandle<'p, bool>, brushes: Arc<BrushSet>) -> &mut Self {
        self.combine("mask_to_hills", mask, move |grid, argument| {
            grid.mask_to_hills(argument, &brushes)?;
            Ok(())
        })
    }

    /// Stamp mountain brushes inside the true cells of `mask`
    pub fn mask_to_mountains(&mut self, mask: &MaskHandle<'p, bool>, brushes: Arc<BrushSet>) -> &mut Self {
        self.combine("mask_to_mountains", mask, move |grid, argument| {
            grid.mask_to_mountains(argument, &brushes)?;
            Ok(())
        })
    }

    /// Stamp brushes inside the true cells of `mask` with explicit placement parameters
    pub fn mask_to_features(
        &mut self,
        mask: &MaskHandle<'p, bool>,
        brushes: Arc<BrushSet>,
        placement: FeaturePlacement,
    ) -> &mut Self {
        self.combine("mask_to_features", mask, move |grid, argument| {
            grid.mask_to_features(argument, &brushes, &placement)?;
            Ok(())
        })
    }

    /// Register a boolean mask of the cells at or above `threshold`
    pub fn to_binary(&mut self, threshold: f32) -> MaskHandle<'p, bool> {
        self.fork("to_binary", move |grid| BinaryMask::from_scalar(grid, threshold))
    }

    /// Register a boolean mask of the cells inside `[min, max]`
    pub fn convert_to_binary_mask(&mut self, min: f32, max: f32) -> MaskHandle<'p, bool> {
        self.fork("convert_to_binary_mask", move |grid| grid.convert_to_binary_mask(min, max))
    }

    /// Register the local maxima strictly between `min` and `max`
    pub fn local_maxima(&mut self, min: f32, max: f32) -> MaskHandle<'p, bool> {
        self.fork("local_maxima", move |grid| grid.local_maxima(min, max))
    }

    /// Register the ridge cells strictly between `min` and `max`
    pub fn local_1d_maxima(&mut self, min: f32, max: f32) -> MaskHandle<'p, bool> {
        self.fork("local_1d_maxima", move |grid| grid.local_1d_maxima(min, max))
    }

    /// Register the distance field of the cells inside `[min, max]`
    pub fn distance_field_for_range(&mut self, min: f32, max: f32) -> MaskHandle<'p, f32> {
        self.fork("distance_field_for_range", move |grid| grid.distance_field_for_range(min, max))
    }
}

//! Type-erased mask values flowing between pipeline nodes

use crate::mask::grid::{CellValue, Grid};
use crate::mask::{BinaryMask, ScalarMask};

/// Result of a pipeline node, one of the two mask kinds
#[derive(Clone, Debug)]
pub enum MaskValue {
    /// Boolean mask
    Binary(BinaryMask),
    /// Scalar mask
    Scalar(ScalarMask),
}

impl MaskValue {
    /// Name of the held mask kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Binary(_) => bool::KIND,
            Self::Scalar(_) => f32::KIND,
        }
    }

    /// Side length of the held mask
    pub fn size(&self) -> usize {
        match self {
            Self::Binary(mask) => mask.size(),
            Self::Scalar(mask) => mask.size(),
        }
    }
}

/// Cell kinds that can travel through a pipeline
pub trait PipelineCell: CellValue {
    /// Erase the cell type of a grid
    fn wrap(grid: Grid<Self>) -> MaskValue;

    /// Borrow the grid back if `value` holds this kind
    fn peek(value: &MaskValue) -> Option<&Grid<Self>>;
}

impl PipelineCell for bool {
    fn wrap(grid: Grid<Self>) -> MaskValue {
        MaskValue::Binary(grid)
    }

    fn peek(value: &MaskValue) -> Option<&Grid<Self>> {
        match value {
            MaskValue::Binary(mask) => Some(mask),
            MaskValue::Scalar(_) => None,
        }
    }
}

impl PipelineCell for f32 {
    fn wrap(grid: Grid<Self>) -> MaskValue {
        MaskValue::Scalar(grid)
    }

    fn peek(value: &MaskValue) -> Option<&Grid<Self>> {
        match value {
            MaskValue::Scalar(mask) => Some(mask),
            MaskValue::Binary(_) => None,
        }
    }
}

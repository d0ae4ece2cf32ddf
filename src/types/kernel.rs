//! Structuring kernels for spreading.

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;

use crate::error::{Result, ShadeError};

/// Built-in kernel shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KernelShape {
    #[default]
    Circle,
    Square,
}

impl FromStr for KernelShape {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" => Ok(KernelShape::Circle),
            "square" => Ok(KernelShape::Square),
            other => Err(ShadeError::InvalidSpread {
                message: format!("Unknown kernel shape: {}", other),
                help: Some("Use 'circle' or 'square'".to_string()),
            }),
        }
    }
}

impl fmt::Display for KernelShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelShape::Circle => write!(f, "circle"),
            KernelShape::Square => write!(f, "square"),
        }
    }
}

/// A boolean footprint with odd dimensions, centred on its middle cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringKernel {
    mask: Array2<bool>,
}

impl StructuringKernel {
    /// Build a kernel of the given shape and radius.
    pub fn new(shape: KernelShape, px: usize) -> Self {
        match shape {
            KernelShape::Circle => Self::circle(px),
            KernelShape::Square => Self::square(px),
        }
    }

    /// Cells within `px + 0.5` of the centre.
    pub fn circle(px: usize) -> Self {
        let size = 2 * px + 1;
        let r = px as f64 + 0.5;
        let mask = Array2::from_shape_fn((size, size), |(i, j)| {
            let dy = i as f64 - px as f64;
            let dx = j as f64 - px as f64;
            (dx * dx + dy * dy).sqrt() <= r
        });
        Self { mask }
    }

    /// A full `(2px + 1)` square.
    pub fn square(px: usize) -> Self {
        let size = 2 * px + 1;
        Self {
            mask: Array2::from_elem((size, size), true),
        }
    }

    /// Use a caller-supplied mask. Both dimensions must be odd.
    pub fn from_mask(mask: Array2<bool>) -> Result<Self> {
        let (h, w) = mask.dim();
        if h % 2 == 0 || w % 2 == 0 {
            return Err(ShadeError::InvalidSpread {
                message: format!("mask must have odd dimensions, got {}x{}", h, w),
                help: Some("Use a mask like 3x3 or 5x5 so it has a centre cell".to_string()),
            });
        }
        Ok(Self { mask })
    }

    /// Dimensions as (rows, columns).
    pub fn dim(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Offset of the centre cell as (row, column).
    pub fn centre(&self) -> (usize, usize) {
        let (h, w) = self.mask.dim();
        (h / 2, w / 2)
    }

    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Whether the kernel leaves an image unchanged when stamped.
    pub fn is_identity(&self) -> bool {
        self.mask.dim() == (1, 1) && self.mask[[0, 0]]
    }
}

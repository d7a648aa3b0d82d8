//! Value types shared by the reprojection engines.

use nalgebra::DMatrix;
use omnimv_core::{fixed_to_floating, floating_to_fixed, Real, Vec2};
use serde::{Deserialize, Serialize};

/// Integer motion vector.
///
/// The number of fractional bits is not part of the type; every operation
/// takes it as an explicit `precision` argument.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MotionVector {
    pub hor: i32,
    pub ver: i32,
}

impl MotionVector {
    pub const ZERO: Self = Self { hor: 0, ver: 0 };

    pub fn new(hor: i32, ver: i32) -> Self {
        Self { hor, ver }
    }

    pub fn is_zero(&self) -> bool {
        self.hor == 0 && self.ver == 0
    }

    /// Motion in pixels.
    pub fn to_floating(&self, precision: u32) -> Vec2 {
        Vec2::new(
            fixed_to_floating(self.hor, precision),
            fixed_to_floating(self.ver, precision),
        )
    }

    pub fn from_floating(motion: &Vec2, precision: u32) -> Self {
        Self {
            hor: floating_to_fixed(motion.x, precision),
            ver: floating_to_fixed(motion.y, precision),
        }
    }

    /// Like [`MotionVector::from_floating`], but `None` when a component is
    /// not finite or its fixed-point value does not fit in an `i32`.
    pub fn checked_from_floating(motion: &Vec2, precision: u32) -> Option<Self> {
        let scale = (1i64 << precision) as Real;
        let fits = |v: Real| {
            let fixed = (v * scale).round();
            fixed.is_finite() && fixed >= i32::MIN as Real && fixed <= i32::MAX as Real
        };
        (fits(motion.x) && fits(motion.y)).then(|| Self::from_floating(motion, precision))
    }
}

/// Top-left corner of a block, in samples of its component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockPosition {
    pub x: usize,
    pub y: usize,
}

impl BlockPosition {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Block dimensions, in samples of its component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockSize {
    pub width: usize,
    pub height: usize,
}

impl BlockSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentId {
    Y,
    Cb,
    Cr,
}

impl ComponentId {
    pub fn is_luma(&self) -> bool {
        matches!(self, ComponentId::Y)
    }
}

/// Chroma subsampling of the coded pictures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromaFormat {
    Yuv400,
    #[default]
    Yuv420,
    Yuv422,
    Yuv444,
}

impl ChromaFormat {
    /// Horizontal chroma subsampling as a power of two.
    pub fn scale_x(&self) -> u32 {
        match self {
            ChromaFormat::Yuv420 | ChromaFormat::Yuv422 => 1,
            ChromaFormat::Yuv400 | ChromaFormat::Yuv444 => 0,
        }
    }

    /// Vertical chroma subsampling as a power of two.
    pub fn scale_y(&self) -> u32 {
        match self {
            ChromaFormat::Yuv420 => 1,
            ChromaFormat::Yuv400 | ChromaFormat::Yuv422 | ChromaFormat::Yuv444 => 0,
        }
    }

    pub fn has_chroma(&self) -> bool {
        !matches!(self, ChromaFormat::Yuv400)
    }
}

/// Reprojected sub-block corners in fixed point.
///
/// Entry `(i, j)` belongs to the sub-block in row `i` and column `j` of the
/// block. Coordinates are in samples of the requested component with
/// `precision_x`/`precision_y` fractional bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubblockPositions {
    pub x: DMatrix<i32>,
    pub y: DMatrix<i32>,
    pub precision_x: u32,
    pub precision_y: u32,
}

impl SubblockPositions {
    pub fn shape(&self) -> (usize, usize) {
        self.x.shape()
    }

    /// Displacement of sub-block `(row, col)` from the unmoved corner, in
    /// fixed point.
    pub fn displacement(&self, row: usize, col: usize, origin: &BlockPosition) -> MotionVector {
        let corner_x = ((origin.x + 4 * col) as i32) << self.precision_x;
        let corner_y = ((origin.y + 4 * row) as i32) << self.precision_y;
        MotionVector::new(self.x[(row, col)] - corner_x, self.y[(row, col)] - corner_y)
    }
}

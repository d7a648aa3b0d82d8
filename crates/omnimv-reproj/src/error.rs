use omnimv_motion::EpipoleError;
use thiserror::Error;

use crate::{ComponentId, MotionModelId};

/// Errors raised by the reprojection engines.
///
/// These report caller contract violations. Numerically degenerate motion
/// is not an error: it falls back to the unmoved position or a zero vector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReprojectionError {
    /// The motion model was not enabled in the configuration.
    #[error("motion model {0:?} is not active")]
    InactiveModel(MotionModelId),
    /// Block position or size is not a multiple of the sub-block size.
    #[error("block ({x}, {y}) {width}x{height} is not aligned to the 4x4 sub-block grid")]
    Misaligned {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// Block reaches past the picture of its component.
    #[error("block ({x}, {y}) {width}x{height} exceeds the {picture_width}x{picture_height} picture")]
    OutsidePicture {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        picture_width: usize,
        picture_height: usize,
    },
    /// Chroma requested for a picture without chroma planes.
    #[error("component {0:?} does not exist in 4:0:0 pictures")]
    NoChroma(ComponentId),
    /// Epipole lookup failed.
    #[error("epipole lookup failed: {0}")]
    Epipole(#[from] EpipoleError),
}

/// Errors raised while validating a configuration.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sub-block offset must be in 0..=4, got {0}")]
    InvalidSubblockOffset(u8),
    #[error("unknown motion model id {0}")]
    UnknownModelId(u8),
    #[error("picture size {width}x{height} must be a non-zero multiple of 4")]
    InvalidResolution { width: usize, height: usize },
}

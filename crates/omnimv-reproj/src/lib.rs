//! Motion-vector reprojection for 360° video coding.
//!
//! A motion vector found for one block of an omnidirectional picture is a
//! translation in the picture plane. Near the poles or the seams of the
//! projection that translation does not describe how content actually
//! moves on the sphere. This crate re-applies motion vectors through sphere
//! motion models:
//!
//! - [`ReprojectionEngine`] moves the 4x4 sub-blocks of a block under any
//!   configured [`MotionModelId`] and converts vectors between models,
//! - [`LegacyReprojection`] does the same for the classic model and three
//!   fixed perspective [`Viewport`]s.
//!
//! # Example
//!
//! ```no_run
//! use omnimv_core::{EquirectangularProjection, Projection};
//! use omnimv_motion::EpipoleList;
//! use omnimv_reproj::{
//!     ActiveModels, BlockPosition, BlockSize, ChromaFormat, ComponentId, MotionModelId,
//!     MotionVector, ReprojectionConfig, ReprojectionEngine,
//! };
//!
//! let projection = Projection::Equirectangular(EquirectangularProjection::new(3840.0, 1920.0, 0.5));
//! let config = ReprojectionConfig {
//!     active: ActiveModels { mpa_top_bottom: true, ..ActiveModels::default() },
//!     ..ReprojectionConfig::default()
//! };
//! let mut engine = ReprojectionEngine::new(projection, 3840, 1920, config, EpipoleList::new())?;
//! let corners = engine.reproject_motion_vector_subblocks(
//!     BlockPosition::new(640, 64),
//!     BlockSize::new(16, 16),
//!     MotionVector::new(-37, 12),
//!     4,
//!     MotionModelId::MpaTopBottom,
//!     ComponentId::Y,
//!     ChromaFormat::Yuv420,
//!     8,
//!     0,
//! )?;
//! assert_eq!(corners.shape(), (4, 4));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod engine;
mod error;
mod legacy;
mod subblock;
mod types;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use legacy::*;
pub use subblock::SUBBLOCK_SIZE;
pub use types::*;

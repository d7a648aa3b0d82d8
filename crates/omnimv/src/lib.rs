//! High-level entry crate for `omnimv`, motion-vector reprojection for
//! omnidirectional (360°) video coding.
//!
//! The workspace is split into three layers, re-exported here:
//!
//! - [`core`]: math aliases, coordinate conversions, lookup tables and the
//!   sphere ⇄ plane projections,
//! - [`motion`]: the sphere motion models and the epipole list,
//! - [`reproj`]: the reprojection engines used by the inter-prediction path.
//!
//! [`setup`] builds a ready engine from a JSON description.
//!
//! ```no_run
//! use omnimv::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let setup = omnimv::load_config(r#"{
//!     "projection": { "type": "equirectangular", "width": 3840, "height": 1920 },
//!     "width": 3840,
//!     "height": 1920,
//!     "reprojection": { "active": { "geodesic_camera_pose": true } },
//!     "epipoles": [ { "epipole": [0.0, 0.0, 1.0], "available": true } ]
//! }"#)?;
//! let mut engine = setup.build()?;
//! let mv = engine.motion_vector_in_desired_motion_model(
//!     MotionVector::new(40, -12),
//!     4,
//!     MotionModelId::Classic,
//!     MotionModelId::GeodesicCameraPose,
//!     &Pt2::new(1000.0, 300.0),
//!     &Pt2::new(1000.0, 300.0),
//!     &Pt2::new(1008.0, 300.0),
//!     (16, 8),
//!     (16, 8),
//! )?;
//! println!("{mv:?}");
//! # Ok(())
//! # }
//! ```

pub mod setup;

pub use setup::{load_config, EngineSetup, EpipoleSeed};

/// Math types, coordinate conversions, lookup tables and projections.
pub mod core {
    pub use omnimv_core::*;
}

/// Sphere motion models and epipole bookkeeping.
pub mod motion {
    pub use omnimv_motion::*;
}

/// Reprojection engines and their configuration.
pub mod reproj {
    pub use omnimv_reproj::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use omnimv::prelude::*;`.
pub mod prelude {
    pub use crate::core::{Projection, ProjectionParams, Pt2, Real, SphereProjection, Vec2, Vec3};
    pub use crate::motion::{EpipoleList, GeodesicFlavor, MotionModel, MotionPlane, ANY_POC};
    pub use crate::reproj::{
        ActiveModels, BlockPosition, BlockSize, ChromaFormat, ComponentId, LegacyReprojection,
        MotionModelId, MotionVector, ReprojectionConfig, ReprojectionEngine, ReprojectionError,
        SubblockPositions, Viewport,
    };
    pub use crate::{load_config, EngineSetup};
}

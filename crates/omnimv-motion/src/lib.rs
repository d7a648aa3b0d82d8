//! Motion models on the sphere for omnidirectional video.
//!
//! Every model moves a grid of planar coordinates of a base
//! [`omnimv_core::Projection`] by a 2D motion vector and solves the inverse
//! problem for a single pixel:
//!
//! - [`TranslationalModel`]: plain planar translation ("classic"),
//! - [`Translational3dModel`]: rigid 3D offset of sphere points,
//! - [`TangentialModel`]: translation on the tangent plane at the block center,
//! - [`RotationalModel`]: sphere rotation equivalent to moving the block center,
//! - [`MotionPlaneAdaptive`]: translation on one of three perspective motion planes,
//! - [`GeodesicModel`]: motion along great circles through an epipole.
//!
//! The closed [`AnyMotionModel`] enum dispatches between them. Per-block
//! caches ([`MpaCache`], [`GeodesicCache`]) are explicit state objects owned
//! by the caller. [`EpipoleList`] stores the epipoles of picture pairs for
//! the geodesic camera-pose model.

mod epipole;
mod frame;
mod geodesic;
mod model;
mod motion_plane;
mod rotational;
mod tangential;
mod translational;

pub use epipole::*;
pub use frame::*;
pub use geodesic::*;
pub use model::{AnyMotionModel, MotionModel, SubblockWindow};
pub use motion_plane::*;
pub use rotational::*;
pub use tangential::*;
pub use translational::*;

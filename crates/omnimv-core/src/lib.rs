//! Core math and geometry primitives for `omnimv`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt2`, `Grid`, ...),
//! - cartesian ⇄ polar ⇄ spherical conversions and fixed-point helpers,
//!   each available for scalars and for dense coordinate grids,
//! - a sampled monotonic [`LookupTable`] with nearest-sample inverse lookup,
//! - sphere ⇄ plane projections (equisolid and calibrated fisheye,
//!   equirectangular, and the viewport-local perspective projection with
//!   virtual-image-plane detection).
//!
//! Projection pipeline for radial lenses:
//! `planar → centered polar (r, φ) → θ(r) → spherical → world direction`

/// Linear algebra type aliases, coordinate conversion and grids.
pub mod math;
/// Sampled monotonic functions.
pub mod lut;
/// Sphere ⇄ plane projections.
pub mod projection;

pub use lut::*;
pub use math::*;
pub use projection::*;

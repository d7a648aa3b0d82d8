//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental types used throughout the workspace,
//! the coordinate-system conversions between cartesian, polar and spherical
//! frames, and the fixed-point helpers used for motion vectors.

use nalgebra::{DMatrix, Matrix3, Point2, Rotation3, Vector2, Vector3};

pub mod coordinate_utils;
pub mod grid;

// Re-export coordinate utilities for convenience
pub use coordinate_utils::{
    cartesian_to_polar, cartesian_to_polar_grid, cartesian_to_spherical,
    cartesian_to_spherical_grid, fixed_to_floating, fixed_to_floating_grid, floating_to_fixed,
    floating_to_fixed_grid, polar_to_cartesian, polar_to_cartesian_grid, spherical_to_cartesian,
    spherical_to_cartesian_grid,
};
pub use grid::{CartesianGrid, PlanarGrid, SphericalGrid};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3D rotation using [`Real`].
pub type Rot3 = Rotation3<Real>;

/// Dense 2D array of scalar coordinates (rows = vertical index).
pub type Grid = DMatrix<Real>;
/// Dense 2D array of per-point flags, shaped like the [`Grid`] it annotates.
pub type FlagGrid = DMatrix<bool>;

/// Wrap an angle into `(-π, π]`.
pub fn wrap_angle(angle: Real) -> Real {
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut a = angle % two_pi;
    if a > std::f64::consts::PI {
        a -= two_pi;
    } else if a <= -std::f64::consts::PI {
        a += two_pi;
    }
    a
}

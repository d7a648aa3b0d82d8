//! Coordinate transformation utilities.
//!
//! Conversions between planar cartesian, polar, spherical and 3D cartesian
//! coordinates, plus fixed-point ⇄ floating-point helpers. Every conversion
//! exists as a scalar function and as a `*_grid` function operating on dense
//! [`Grid`]s; the grid form is the scalar form applied element-wise.
//!
//! Spherical coordinates are `(r, θ, φ)` with `θ` the polar angle measured
//! from `+z` and `φ` the azimuth measured in the x-y plane from `+x` toward
//! `+y`.

use crate::{Grid, Real};

/// Convert planar cartesian `(x, y)` to polar `(r, φ)`.
pub fn cartesian_to_polar(x: Real, y: Real) -> (Real, Real) {
    ((x * x + y * y).sqrt(), y.atan2(x))
}

/// Convert polar `(r, φ)` to planar cartesian `(x, y)`.
///
/// A negative radius is allowed and mirrors the point through the origin.
pub fn polar_to_cartesian(r: Real, phi: Real) -> (Real, Real) {
    let (s, c) = phi.sin_cos();
    (r * c, r * s)
}

/// Convert 3D cartesian `(x, y, z)` to spherical `(r, θ, φ)`.
///
/// The argument of `acos` is clamped to `[-1, 1]` so that round-off on unit
/// vectors never produces a NaN polar angle. The origin maps to `θ = 0`.
pub fn cartesian_to_spherical(x: Real, y: Real, z: Real) -> (Real, Real, Real) {
    let r = (x * x + y * y + z * z).sqrt();
    let theta = if r == 0.0 {
        0.0
    } else {
        (z / r).clamp(-1.0, 1.0).acos()
    };
    (r, theta, y.atan2(x))
}

/// Convert spherical `(r, θ, φ)` to 3D cartesian `(x, y, z)`.
pub fn spherical_to_cartesian(r: Real, theta: Real, phi: Real) -> (Real, Real, Real) {
    let (st, ct) = theta.sin_cos();
    let (sp, cp) = phi.sin_cos();
    (r * st * cp, r * st * sp, r * ct)
}

/// Interpret `value` as a fixed-point number with `precision` fractional bits.
///
/// The integer part is the floor of `value / 2^precision` and the fraction is
/// the non-negative remainder, so negative inputs behave like a two's
/// complement arithmetic right shift followed by a low-bit mask.
///
/// # Arguments
/// * `value` - Fixed-point integer
/// * `precision` - Number of fractional bits
///
/// # Example
/// ```
/// use omnimv_core::fixed_to_floating;
///
/// // Quarter-sample motion: -5 quarters is -1.25 samples.
/// assert_eq!(fixed_to_floating(-5, 2), -1.25);
/// ```
pub fn fixed_to_floating(value: i32, precision: u32) -> Real {
    let scale = 1i64 << precision;
    let v = i64::from(value);
    let integer = v.div_euclid(scale);
    let fraction = v.rem_euclid(scale);
    integer as Real + fraction as Real / scale as Real
}

/// Round `value` to a fixed-point integer with `precision` fractional bits.
///
/// Rounding is half away from zero. Values outside the `i32` range
/// saturate.
///
/// # Example
/// ```
/// use omnimv_core::floating_to_fixed;
///
/// assert_eq!(floating_to_fixed(-1.125, 2), -5);
/// assert_eq!(floating_to_fixed(0.3, 4), 5);
/// ```
pub fn floating_to_fixed(value: Real, precision: u32) -> i32 {
    (value * (1i64 << precision) as Real).round() as i32
}

/// Element-wise [`cartesian_to_polar`].
pub fn cartesian_to_polar_grid(x: &Grid, y: &Grid) -> (Grid, Grid) {
    debug_assert_eq!(x.shape(), y.shape());
    let r = x.zip_map(y, |x, y| cartesian_to_polar(x, y).0);
    let phi = x.zip_map(y, |x, y| cartesian_to_polar(x, y).1);
    (r, phi)
}

/// Element-wise [`polar_to_cartesian`].
pub fn polar_to_cartesian_grid(r: &Grid, phi: &Grid) -> (Grid, Grid) {
    debug_assert_eq!(r.shape(), phi.shape());
    let x = r.zip_map(phi, |r, phi| polar_to_cartesian(r, phi).0);
    let y = r.zip_map(phi, |r, phi| polar_to_cartesian(r, phi).1);
    (x, y)
}

/// Element-wise [`cartesian_to_spherical`].
pub fn cartesian_to_spherical_grid(x: &Grid, y: &Grid, z: &Grid) -> (Grid, Grid, Grid) {
    debug_assert_eq!(x.shape(), y.shape());
    debug_assert_eq!(x.shape(), z.shape());
    let (rows, cols) = x.shape();
    let mut r = Grid::zeros(rows, cols);
    let mut theta = Grid::zeros(rows, cols);
    let mut phi = Grid::zeros(rows, cols);
    for i in 0..x.len() {
        let (ri, ti, pi) = cartesian_to_spherical(x[i], y[i], z[i]);
        r[i] = ri;
        theta[i] = ti;
        phi[i] = pi;
    }
    (r, theta, phi)
}

/// Element-wise [`spherical_to_cartesian`].
pub fn spherical_to_cartesian_grid(r: &Grid, theta: &Grid, phi: &Grid) -> (Grid, Grid, Grid) {
    debug_assert_eq!(r.shape(), theta.shape());
    debug_assert_eq!(r.shape(), phi.shape());
    let (rows, cols) = r.shape();
    let mut x = Grid::zeros(rows, cols);
    let mut y = Grid::zeros(rows, cols);
    let mut z = Grid::zeros(rows, cols);
    for i in 0..r.len() {
        let (xi, yi, zi) = spherical_to_cartesian(r[i], theta[i], phi[i]);
        x[i] = xi;
        y[i] = yi;
        z[i] = zi;
    }
    (x, y, z)
}

/// Element-wise [`fixed_to_floating`].
pub fn fixed_to_floating_grid(values: &nalgebra::DMatrix<i32>, precision: u32) -> Grid {
    values.map(|v| fixed_to_floating(v, precision))
}

/// Element-wise [`floating_to_fixed`].
pub fn floating_to_fixed_grid(values: &Grid, precision: u32) -> nalgebra::DMatrix<i32> {
    values.map(|v| floating_to_fixed(v, precision))
}

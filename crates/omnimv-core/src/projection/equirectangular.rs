use std::f64::consts::PI;

use crate::{
    cartesian_to_spherical, spherical_to_cartesian, CartesianGrid, Grid, PlanarGrid, Pt2, Real,
    Vec3,
};

use super::SphereProjection;

/// Equirectangular panorama: columns map linearly to azimuth, rows to the
/// polar angle from world up.
///
/// `φ = -(x + offset)/width · 2π`, `θ = (y + offset)/height · π`. The
/// inverse wraps `φ` into `(-2π, 0]` so the horizontal coordinate is
/// continuous across the seam.
#[derive(Clone, Copy, Debug)]
pub struct EquirectangularProjection {
    pub width: Real,
    pub height: Real,
    /// Sample position inside a pixel (0.5 for pixel centers).
    pub offset: Real,
}

impl EquirectangularProjection {
    pub fn new(width: Real, height: Real, offset: Real) -> Self {
        Self {
            width,
            height,
            offset,
        }
    }

    fn angles(&self, x: Real, y: Real) -> (Real, Real) {
        let phi = -(x + self.offset) / self.width * 2.0 * PI;
        let theta = (y + self.offset) / self.height * PI;
        (theta, phi)
    }

    fn planar(&self, theta: Real, phi: Real) -> Pt2 {
        let phi = if phi > 0.0 { phi - 2.0 * PI } else { phi };
        Pt2::new(
            -phi / (2.0 * PI) * self.width - self.offset,
            theta / PI * self.height - self.offset,
        )
    }
}

impl SphereProjection for EquirectangularProjection {
    fn to_sphere_point(&self, p: &Pt2) -> Vec3 {
        let (theta, phi) = self.angles(p.x, p.y);
        let (x, y, z) = spherical_to_cartesian(1.0, theta, phi);
        Vec3::new(x, y, z)
    }

    fn from_sphere_point(&self, v: &Vec3) -> Pt2 {
        let (_, theta, phi) = cartesian_to_spherical(v.x, v.y, v.z);
        self.planar(theta, phi)
    }

    fn to_sphere(&self, grid: &PlanarGrid) -> CartesianGrid {
        let (rows, cols) = grid.shape();
        let mut theta = Grid::zeros(rows, cols);
        let mut phi = Grid::zeros(rows, cols);
        for i in 0..grid.len() {
            let (t, p) = self.angles(grid.x[i], grid.y[i]);
            theta[i] = t;
            phi[i] = p;
        }
        let spherical = crate::SphericalGrid {
            r: Grid::from_element(rows, cols, 1.0),
            theta,
            phi,
        };
        spherical.to_cartesian()
    }

    fn from_sphere(&self, grid: &CartesianGrid) -> PlanarGrid {
        let spherical = grid.to_spherical();
        let (rows, cols) = grid.shape();
        let mut out = PlanarGrid {
            x: Grid::zeros(rows, cols),
            y: Grid::zeros(rows, cols),
        };
        for i in 0..grid.len() {
            let p = self.planar(spherical.theta[i], spherical.phi[i]);
            out.x[i] = p.x;
            out.y[i] = p.y;
        }
        out
    }

    fn focal_length(&self) -> Real {
        self.width / (2.0 * PI)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_center_column_looks_backward() {
        let proj = EquirectangularProjection::new(1024.0, 512.0, 0.5);
        // Top row is near the north pole.
        let top = proj.to_sphere_point(&Pt2::new(10.0, -0.5));
        assert!((top - Vec3::z()).norm() < 1e-12);
        // Column x = -offset has φ = 0, i.e. world forward.
        let fwd = proj.to_sphere_point(&Pt2::new(-0.5, 255.5));
        assert!((fwd - Vec3::x()).norm() < 1e-12);
        // The middle column is φ = -π.
        let back = proj.to_sphere_point(&Pt2::new(511.5, 255.5));
        assert!((back + Vec3::x()).norm() < 1e-12);
    }

    #[test]
    fn positive_azimuth_wraps_to_right_edge() {
        let proj = EquirectangularProjection::new(1024.0, 512.0, 0.5);
        // Slightly left of forward: φ > 0 wraps to the far right of the panorama.
        let v = Vec3::new(1.0, 0.01, 0.0);
        let p = proj.from_sphere_point(&v);
        assert!(p.x > 1020.0 && p.x < 1023.5, "x={}", p.x);
        let q = proj.from_sphere_point(&Vec3::new(1.0, -0.01, 0.0));
        assert!(q.x > 0.0 && q.x < 2.0, "x={}", q.x);
    }
}

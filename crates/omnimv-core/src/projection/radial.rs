use crate::{
    cartesian_to_polar, cartesian_to_polar_grid, cartesian_to_spherical,
    cartesian_to_spherical_grid, polar_to_cartesian, polar_to_cartesian_grid,
    spherical_to_cartesian, spherical_to_cartesian_grid, CartesianGrid, Grid, LookupTable,
    PlanarGrid, Pt2, Real, Vec3,
};

use super::{
    camera_to_world, camera_to_world_grid, world_to_camera, world_to_camera_grid,
    SphereProjection,
};

/// Relationship between the polar angle from the optical axis and the image
/// radius of a rotationally symmetric lens.
pub trait RadialMapping {
    /// Image radius in pixels for a polar angle `theta`.
    fn radius(&self, theta: Real) -> Real;
    /// Polar angle for an image radius in pixels.
    fn theta(&self, radius: Real) -> Real;
    /// Focal length in pixels.
    fn focal_length(&self) -> Real;

    fn radius_grid(&self, theta: &Grid) -> Grid {
        theta.map(|t| self.radius(t))
    }

    fn theta_grid(&self, radius: &Grid) -> Grid {
        radius.map(|r| self.theta(r))
    }
}

/// Equisolid-angle fisheye: `r = 2f·sin(θ/2)`.
#[derive(Clone, Copy, Debug)]
pub struct Equisolid {
    pub focal_length: Real,
}

impl Equisolid {
    pub fn new(focal_length: Real) -> Self {
        Self { focal_length }
    }
}

impl RadialMapping for Equisolid {
    fn radius(&self, theta: Real) -> Real {
        2.0 * self.focal_length * (theta / 2.0).sin()
    }

    /// NaN outside the image circle (`radius > 2f`).
    fn theta(&self, radius: Real) -> Real {
        2.0 * (radius / (2.0 * self.focal_length)).asin()
    }

    fn focal_length(&self) -> Real {
        self.focal_length
    }
}

/// Number of samples of the calibrated radius table.
pub const CALIBRATED_LUT_SAMPLES: usize = 1_000_000;

/// Largest polar angle covered by the calibrated radius table (100°).
pub const CALIBRATED_MAX_THETA: Real = std::f64::consts::FRAC_PI_2 + std::f64::consts::PI / 18.0;

/// Fisheye described by a calibrated polynomial `r(θ) = Σ cᵢ·θⁱ`.
///
/// The polynomial is sampled once into a [`LookupTable`]; the inverse
/// mapping is served by inverse lookup in the same table.
#[derive(Clone, Debug)]
pub struct CalibratedPolynomial {
    coefficients: Vec<Real>,
    table: LookupTable,
}

impl CalibratedPolynomial {
    /// Sample the polynomial with [`CALIBRATED_LUT_SAMPLES`] points.
    ///
    /// # Panics
    /// Panics if fewer than two coefficients are given or the linear
    /// coefficient (the focal length) is not positive.
    pub fn new(coefficients: Vec<Real>) -> Self {
        Self::with_samples(coefficients, CALIBRATED_LUT_SAMPLES)
    }

    pub fn with_samples(coefficients: Vec<Real>, samples: usize) -> Self {
        assert!(
            coefficients.len() >= 2 && coefficients[1] > 0.0,
            "calibrated polynomial needs a positive linear coefficient, got {coefficients:?}"
        );
        let poly = coefficients.clone();
        let table = LookupTable::new(0.0, CALIBRATED_MAX_THETA, samples, move |theta| {
            evaluate_polynomial(&poly, theta)
        });
        Self {
            coefficients,
            table,
        }
    }

    pub fn coefficients(&self) -> &[Real] {
        &self.coefficients
    }
}

/// Horner evaluation of `Σ cᵢ·xⁱ`.
pub fn evaluate_polynomial(coefficients: &[Real], x: Real) -> Real {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * x + c)
}

impl RadialMapping for CalibratedPolynomial {
    /// # Panics
    /// Panics on a negative polar angle.
    fn radius(&self, theta: Real) -> Real {
        assert!(!(theta < 0.0), "calibrated radius needs theta >= 0, got {theta}");
        self.table.lookup(theta)
    }

    /// # Panics
    /// Panics on a negative radius.
    fn theta(&self, radius: Real) -> Real {
        assert!(!(radius < 0.0), "calibrated theta needs radius >= 0, got {radius}");
        self.table.inverse_lookup(radius)
    }

    fn focal_length(&self) -> Real {
        self.coefficients[1]
    }
}

/// Rotationally symmetric projection around an optical center.
///
/// Planar points are centered, converted to polar form, and their radius is
/// mapped to a polar angle from the optical axis (world `+x`).
#[derive(Clone, Debug)]
pub struct RadialProjection<M: RadialMapping> {
    pub mapping: M,
    pub center: Pt2,
}

impl<M: RadialMapping> RadialProjection<M> {
    pub fn new(mapping: M, center: Pt2) -> Self {
        Self { mapping, center }
    }
}

impl<M: RadialMapping> SphereProjection for RadialProjection<M> {
    fn to_sphere_point(&self, p: &Pt2) -> Vec3 {
        let (r, phi) = cartesian_to_polar(p.x - self.center.x, p.y - self.center.y);
        let theta = self.mapping.theta(r);
        let (a, b, c) = spherical_to_cartesian(1.0, theta, phi);
        camera_to_world(&Vec3::new(a, b, c))
    }

    fn from_sphere_point(&self, v: &Vec3) -> Pt2 {
        let cam = world_to_camera(v);
        let (_, theta, phi) = cartesian_to_spherical(cam.x, cam.y, cam.z);
        let radius = self.mapping.radius(theta);
        let (x, y) = polar_to_cartesian(radius, phi);
        Pt2::new(x + self.center.x, y + self.center.y)
    }

    fn to_sphere(&self, grid: &PlanarGrid) -> CartesianGrid {
        let xc = grid.x.add_scalar(-self.center.x);
        let yc = grid.y.add_scalar(-self.center.y);
        let (r, phi) = cartesian_to_polar_grid(&xc, &yc);
        let theta = self.mapping.theta_grid(&r);
        let ones = Grid::from_element(r.nrows(), r.ncols(), 1.0);
        let (a, b, c) = spherical_to_cartesian_grid(&ones, &theta, &phi);
        camera_to_world_grid(&CartesianGrid { x: a, y: b, z: c })
    }

    fn from_sphere(&self, grid: &CartesianGrid) -> PlanarGrid {
        let cam = world_to_camera_grid(grid);
        let (_, theta, phi) = cartesian_to_spherical_grid(&cam.x, &cam.y, &cam.z);
        let radius = self.mapping.radius_grid(&theta);
        let (x, y) = polar_to_cartesian_grid(&radius, &phi);
        PlanarGrid {
            x: x.add_scalar(self.center.x),
            y: y.add_scalar(self.center.y),
        }
    }

    fn focal_length(&self) -> Real {
        self.mapping.focal_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equisolid_center_looks_forward() {
        let proj = RadialProjection::new(Equisolid::new(300.0), Pt2::new(511.5, 511.5));
        let v = proj.to_sphere_point(&Pt2::new(511.5, 511.5));
        assert!((v - Vec3::x()).norm() < 1e-12);

        // Right of the center is to the right of the camera, i.e. world -y.
        let right = proj.to_sphere_point(&Pt2::new(611.5, 511.5));
        assert!(right.y < 0.0 && right.z.abs() < 1e-12);
        // Above the center is world up.
        let up = proj.to_sphere_point(&Pt2::new(511.5, 411.5));
        assert!(up.z > 0.0 && up.y.abs() < 1e-12);
    }

    #[test]
    fn equisolid_outside_image_circle_is_nan() {
        let proj = RadialProjection::new(Equisolid::new(100.0), Pt2::new(0.0, 0.0));
        let v = proj.to_sphere_point(&Pt2::new(250.0, 0.0));
        assert!(v.x.is_nan());
    }

    #[test]
    fn polynomial_evaluation() {
        assert_eq!(evaluate_polynomial(&[1.0, 2.0, 3.0], 2.0), 17.0);
        assert_eq!(evaluate_polynomial(&[], 2.0), 0.0);
    }

    #[test]
    fn calibrated_mapping_inverts_within_table_resolution() {
        let m = CalibratedPolynomial::with_samples(vec![0.0, 320.0, 0.0, -12.0], 20_000);
        let step = CALIBRATED_MAX_THETA / 19_999.0;
        for &theta in &[0.0, 0.1, 0.5, 1.0, 1.5] {
            let r = m.radius(theta);
            let back = m.theta(r);
            assert!((back - theta).abs() <= step, "theta={theta} back={back}");
        }
    }

    #[test]
    #[should_panic(expected = "radius >= 0")]
    fn calibrated_rejects_negative_radius() {
        let m = CalibratedPolynomial::with_samples(vec![0.0, 320.0], 16);
        let _ = m.theta(-1.0);
    }

    #[test]
    #[should_panic(expected = "theta >= 0")]
    fn calibrated_rejects_negative_theta() {
        let m = CalibratedPolynomial::with_samples(vec![0.0, 320.0], 16);
        let _ = m.radius(-0.1);
    }
}

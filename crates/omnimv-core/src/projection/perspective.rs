use crate::{
    cartesian_to_polar, cartesian_to_polar_grid, cartesian_to_spherical,
    cartesian_to_spherical_grid, polar_to_cartesian, polar_to_cartesian_grid,
    spherical_to_cartesian, CartesianGrid, FlagGrid, Grid, LookupTable, PlanarGrid, Pt2, Real,
    Vec3,
};

use super::{camera_to_world, world_to_camera, world_to_camera_grid};

/// Viewport-local pinhole projection looking along world `+x`.
///
/// Directions in the rear hemisphere (`θ > π/2`) get a negative radius
/// `f·tan θ` and land mirrored on the image plane. Such points are flagged
/// as lying on the *virtual image plane* (VIP); the flag is needed to
/// unproject them back to the rear hemisphere and flips the sign of any
/// translation applied on the plane.
#[derive(Clone, Copy, Debug)]
pub struct PerspectiveProjection {
    pub focal_length: Real,
    pub center: Pt2,
}

impl PerspectiveProjection {
    pub fn new(focal_length: Real, center: Pt2) -> Self {
        Self {
            focal_length,
            center,
        }
    }

    pub fn radius(&self, theta: Real) -> Real {
        self.focal_length * theta.tan()
    }

    pub fn theta(&self, radius: Real) -> Real {
        (radius / self.focal_length).atan()
    }

    /// Project a direction; returns the planar point and its VIP flag.
    pub fn from_sphere_point(&self, v: &Vec3) -> (Pt2, bool) {
        let cam = world_to_camera(v);
        let (_, theta, phi) = cartesian_to_spherical(cam.x, cam.y, cam.z);
        let radius = self.radius(theta);
        let (x, y) = polar_to_cartesian(radius, phi);
        (Pt2::new(x + self.center.x, y + self.center.y), radius < 0.0)
    }

    /// Unproject a planar point; VIP points return the rear-hemisphere
    /// direction.
    pub fn to_sphere_point(&self, p: &Pt2, virtual_image_plane: bool) -> Vec3 {
        let (r, phi) = cartesian_to_polar(p.x - self.center.x, p.y - self.center.y);
        direction_from_polar(self.theta(r), phi, virtual_image_plane)
    }

    pub fn from_sphere(&self, grid: &CartesianGrid) -> (PlanarGrid, FlagGrid) {
        let cam = world_to_camera_grid(grid);
        let (_, theta, phi) = cartesian_to_spherical_grid(&cam.x, &cam.y, &cam.z);
        let radius = theta.map(|t| self.radius(t));
        planar_from_radius(&radius, &phi, &self.center)
    }

    pub fn to_sphere(&self, grid: &PlanarGrid, virtual_image_plane: &FlagGrid) -> CartesianGrid {
        let (r, phi) = centered_polar(grid, &self.center);
        let theta = r.map(|r| self.theta(r));
        directions_from_polar(&theta, &phi, virtual_image_plane)
    }

    /// Table-driven variant covering radii up to `max_radius`.
    pub fn tabulated(&self, max_radius: Real, samples: usize) -> TabulatedPerspective {
        let theta_max = self.theta(max_radius);
        let f = self.focal_length;
        TabulatedPerspective {
            center: self.center,
            focal_length: f,
            table: LookupTable::new(0.0, theta_max, samples, move |t| f * t.tan()),
        }
    }
}

/// Perspective projection whose `θ ⇄ radius` mapping is served by a
/// [`LookupTable`].
///
/// Rear-hemisphere angles are folded onto `π - θ` and negated, so the VIP
/// semantics match [`PerspectiveProjection`]. Accuracy is bounded by the
/// table resolution; radii beyond the sampled range saturate.
#[derive(Clone, Debug)]
pub struct TabulatedPerspective {
    pub focal_length: Real,
    pub center: Pt2,
    table: LookupTable,
}

impl TabulatedPerspective {
    pub fn radius(&self, theta: Real) -> Real {
        if theta > std::f64::consts::FRAC_PI_2 {
            -self.table.lookup(std::f64::consts::PI - theta)
        } else {
            self.table.lookup(theta)
        }
    }

    pub fn theta(&self, radius: Real) -> Real {
        self.table.inverse_lookup(radius)
    }

    pub fn from_sphere(&self, grid: &CartesianGrid) -> (PlanarGrid, FlagGrid) {
        let cam = world_to_camera_grid(grid);
        let (_, theta, phi) = cartesian_to_spherical_grid(&cam.x, &cam.y, &cam.z);
        let radius = theta.map(|t| self.radius(t));
        planar_from_radius(&radius, &phi, &self.center)
    }

    pub fn to_sphere(&self, grid: &PlanarGrid, virtual_image_plane: &FlagGrid) -> CartesianGrid {
        let (r, phi) = centered_polar(grid, &self.center);
        let theta = r.map(|r| self.theta(r));
        directions_from_polar(&theta, &phi, virtual_image_plane)
    }
}

fn centered_polar(grid: &PlanarGrid, center: &Pt2) -> (Grid, Grid) {
    let xc = grid.x.add_scalar(-center.x);
    let yc = grid.y.add_scalar(-center.y);
    cartesian_to_polar_grid(&xc, &yc)
}

fn planar_from_radius(radius: &Grid, phi: &Grid, center: &Pt2) -> (PlanarGrid, FlagGrid) {
    let (x, y) = polar_to_cartesian_grid(radius, phi);
    let vip = radius.map(|r| r < 0.0);
    (
        PlanarGrid {
            x: x.add_scalar(center.x),
            y: y.add_scalar(center.y),
        },
        vip,
    )
}

fn direction_from_polar(theta: Real, phi: Real, virtual_image_plane: bool) -> Vec3 {
    let (a, b, c) = spherical_to_cartesian(1.0, theta, phi);
    let front = camera_to_world(&Vec3::new(a, b, c));
    if virtual_image_plane {
        -front
    } else {
        front
    }
}

fn directions_from_polar(theta: &Grid, phi: &Grid, virtual_image_plane: &FlagGrid) -> CartesianGrid {
    debug_assert_eq!(theta.shape(), virtual_image_plane.shape());
    let (rows, cols) = theta.shape();
    let mut out = CartesianGrid {
        x: Grid::zeros(rows, cols),
        y: Grid::zeros(rows, cols),
        z: Grid::zeros(rows, cols),
    };
    for i in 0..theta.len() {
        let v = direction_from_polar(theta[i], phi[i], virtual_image_plane[i]);
        out.x[i] = v.x;
        out.y[i] = v.y;
        out.z[i] = v.z;
    }
    out
}

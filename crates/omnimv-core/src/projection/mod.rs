//! Sphere ⇄ plane projections.
//!
//! A projection maps planar pixel coordinates to directions on the unit
//! sphere and back. The family is closed: [`Projection`] enumerates every
//! supported base projection and dispatches to the concrete types, which all
//! implement [`SphereProjection`]. The viewport-local
//! [`PerspectiveProjection`] is deliberately separate because it also
//! produces and consumes per-point virtual-image-plane flags.
//!
//! World frame: `x` forward, `y` left, `z` up. Planar frame: `x` right,
//! `y` down. Radial and perspective projections look along world `+x`.

use serde::{Deserialize, Serialize};

use crate::{CartesianGrid, PlanarGrid, Pt2, Real, Vec3};

mod equirectangular;
mod perspective;
mod radial;

pub use equirectangular::*;
pub use perspective::*;
pub use radial::*;

/// Mapping between planar pixel coordinates and the unit sphere.
pub trait SphereProjection {
    /// Unproject a single planar point to a unit direction.
    fn to_sphere_point(&self, p: &Pt2) -> Vec3;
    /// Project a direction (any positive length) to planar coordinates.
    fn from_sphere_point(&self, v: &Vec3) -> Pt2;
    /// Unproject a grid of planar points.
    fn to_sphere(&self, grid: &PlanarGrid) -> CartesianGrid;
    /// Project a grid of directions.
    fn from_sphere(&self, grid: &CartesianGrid) -> PlanarGrid;
    /// Focal length in pixels (pixels per radian near the optical axis).
    fn focal_length(&self) -> Real;
}

/// Camera-local frame of a world direction: `(right, down, forward)`.
pub(crate) fn world_to_camera(v: &Vec3) -> Vec3 {
    Vec3::new(-v.y, -v.z, v.x)
}

/// World direction of a camera-local `(right, down, forward)` vector.
pub(crate) fn camera_to_world(v: &Vec3) -> Vec3 {
    Vec3::new(v.z, -v.x, -v.y)
}

pub(crate) fn world_to_camera_grid(g: &CartesianGrid) -> CartesianGrid {
    CartesianGrid {
        x: -g.y.clone(),
        y: -g.z.clone(),
        z: g.x.clone(),
    }
}

pub(crate) fn camera_to_world_grid(g: &CartesianGrid) -> CartesianGrid {
    CartesianGrid {
        x: g.z.clone(),
        y: -g.x.clone(),
        z: -g.y.clone(),
    }
}

/// Serializable base projection parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectionParams {
    /// Equisolid fisheye, `r = 2f·sin(θ/2)`.
    Equisolid {
        focal_length: Real,
        center_x: Real,
        center_y: Real,
    },
    /// Fisheye with a calibrated polynomial `r(θ) = Σ cᵢ·θⁱ`.
    Calibrated {
        coefficients: Vec<Real>,
        center_x: Real,
        center_y: Real,
    },
    /// Equirectangular panorama.
    Equirectangular {
        width: Real,
        height: Real,
        #[serde(default = "default_pixel_offset")]
        offset: Real,
    },
}

fn default_pixel_offset() -> Real {
    0.5
}

impl ProjectionParams {
    /// Build the runtime projection.
    ///
    /// Panics if calibrated coefficients do not describe an increasing
    /// radius (see [`CalibratedPolynomial::new`]).
    pub fn build(&self) -> Projection {
        match self {
            ProjectionParams::Equisolid {
                focal_length,
                center_x,
                center_y,
            } => Projection::Equisolid(RadialProjection::new(
                Equisolid::new(*focal_length),
                Pt2::new(*center_x, *center_y),
            )),
            ProjectionParams::Calibrated {
                coefficients,
                center_x,
                center_y,
            } => Projection::Calibrated(RadialProjection::new(
                CalibratedPolynomial::new(coefficients.clone()),
                Pt2::new(*center_x, *center_y),
            )),
            ProjectionParams::Equirectangular {
                width,
                height,
                offset,
            } => Projection::Equirectangular(EquirectangularProjection::new(
                *width, *height, *offset,
            )),
        }
    }
}

/// Runtime base projection.
#[derive(Clone, Debug)]
pub enum Projection {
    Equisolid(RadialProjection<Equisolid>),
    Calibrated(RadialProjection<CalibratedPolynomial>),
    Equirectangular(EquirectangularProjection),
}

impl SphereProjection for Projection {
    fn to_sphere_point(&self, p: &Pt2) -> Vec3 {
        match self {
            Projection::Equisolid(m) => m.to_sphere_point(p),
            Projection::Calibrated(m) => m.to_sphere_point(p),
            Projection::Equirectangular(m) => m.to_sphere_point(p),
        }
    }

    fn from_sphere_point(&self, v: &Vec3) -> Pt2 {
        match self {
            Projection::Equisolid(m) => m.from_sphere_point(v),
            Projection::Calibrated(m) => m.from_sphere_point(v),
            Projection::Equirectangular(m) => m.from_sphere_point(v),
        }
    }

    fn to_sphere(&self, grid: &PlanarGrid) -> CartesianGrid {
        match self {
            Projection::Equisolid(m) => m.to_sphere(grid),
            Projection::Calibrated(m) => m.to_sphere(grid),
            Projection::Equirectangular(m) => m.to_sphere(grid),
        }
    }

    fn from_sphere(&self, grid: &CartesianGrid) -> PlanarGrid {
        match self {
            Projection::Equisolid(m) => m.from_sphere(grid),
            Projection::Calibrated(m) => m.from_sphere(grid),
            Projection::Equirectangular(m) => m.from_sphere(grid),
        }
    }

    fn focal_length(&self) -> Real {
        match self {
            Projection::Equisolid(m) => m.focal_length(),
            Projection::Calibrated(m) => m.focal_length(),
            Projection::Equirectangular(m) => m.focal_length(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_frame_remap_is_a_rotation() {
        let v = Vec3::new(0.2, -0.5, 0.7);
        let c = world_to_camera(&v);
        assert_eq!(camera_to_world(&c), v);
        // Forward in the world is the optical axis of the camera.
        assert_eq!(world_to_camera(&Vec3::x()), Vec3::z());
        // World up is camera "up", i.e. negative image y.
        assert_eq!(world_to_camera(&Vec3::z()), -Vec3::y());
    }

    #[test]
    fn params_roundtrip_through_json() {
        let params = ProjectionParams::Equisolid {
            focal_length: 400.0,
            center_x: 959.5,
            center_y: 959.5,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"type\":\"equisolid\""));
        let back: ProjectionParams = serde_json::from_str(&json).unwrap();
        let proj = back.build();
        assert!((proj.focal_length() - 400.0).abs() < 1e-12);

        let eq: ProjectionParams =
            serde_json::from_str(r#"{"type":"equirectangular","width":512,"height":256}"#)
                .unwrap();
        match eq {
            ProjectionParams::Equirectangular { offset, .. } => assert_eq!(offset, 0.5),
            _ => panic!("expected equirectangular params"),
        }
    }
}

//! Geodesic motion along great circles through an epipole.
//!
//! The sphere is rotated so the epipole becomes the north pole. In that
//! frame the horizontal motion component moves points along meridians
//! (polar angle `θ`) and the vertical component along parallels
//! (azimuth `φ`).

use std::f64::consts::PI;
use std::sync::Arc;

use log::trace;
use omnimv_core::{
    cartesian_to_spherical, spherical_to_cartesian, wrap_angle, CartesianGrid, Grid, Mat3,
    PlanarGrid, Projection, Pt2, Real, Rot3, SphereProjection, Vec2, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::model::{angle_resolution, is_zero_motion};
use crate::{MotionModel, SubblockWindow};

/// How the horizontal motion component advances the polar angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeodesicFlavor {
    /// `θ' = θ + Δ` for every point.
    VishwanathOriginal,
    /// Parallax flow `tan(θ'/2) = e^k·tan(θ/2)`, with `k` chosen so the
    /// block center advances by exactly `Δ`. Points closer to the pole move
    /// less.
    #[default]
    VishwanathModulated,
}

/// Epipole and the rotation taking it to `+z`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpipoleFrame {
    epipole: Vec3,
    rotation: Mat3,
}

impl EpipoleFrame {
    /// A zero epipole keeps the world frame.
    pub fn new(epipole: Vec3) -> Self {
        let rotation = if epipole.norm_squared() == 0.0 {
            Rot3::identity()
        } else {
            Rot3::rotation_between(&epipole, &Vec3::z()).unwrap_or_else(|| {
                // Antiparallel to +z: any half turn about a horizontal axis.
                Rot3::from_axis_angle(&Vec3::x_axis(), PI)
            })
        };
        Self {
            epipole,
            rotation: rotation.into_inner(),
        }
    }

    pub fn epipole(&self) -> &Vec3 {
        &self.epipole
    }

    /// World → epipole frame.
    pub fn rotation(&self) -> &Mat3 {
        &self.rotation
    }

    fn same_epipole(&self, epipole: &Vec3) -> bool {
        self.epipole
            .iter()
            .zip(epipole.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Polar and azimuth angles in the epipole frame.
    pub fn spherical(&self, v: &Vec3) -> (Real, Real) {
        let r = self.rotation * v;
        let (_, theta, phi) = cartesian_to_spherical(r.x, r.y, r.z);
        (theta, phi)
    }

    /// World direction of epipole-frame angles.
    pub fn direction(&self, theta: Real, phi: Real) -> Vec3 {
        let (x, y, z) = spherical_to_cartesian(1.0, theta, phi);
        self.rotation.transpose() * Vec3::new(x, y, z)
    }
}

/// Epipole-frame angles of a block.
#[derive(Clone, Debug, PartialEq)]
pub struct RotatedSpherical {
    pub theta: Grid,
    pub phi: Grid,
}

/// Geodesic motion model.
///
/// The epipole is the only mutable part; [`GeodesicModel::set_epipole`]
/// recomputes the rotation only when the epipole changes bit-for-bit.
#[derive(Clone, Debug)]
pub struct GeodesicModel {
    projection: Arc<Projection>,
    flavor: GeodesicFlavor,
    angle_resolution: Real,
    frame: EpipoleFrame,
}

impl GeodesicModel {
    pub fn new(projection: Arc<Projection>, flavor: GeodesicFlavor, epipole: Vec3) -> Self {
        let angle_resolution = angle_resolution(projection.focal_length());
        Self {
            projection,
            flavor,
            angle_resolution,
            frame: EpipoleFrame::new(epipole),
        }
    }

    pub fn flavor(&self) -> GeodesicFlavor {
        self.flavor
    }

    pub fn frame(&self) -> &EpipoleFrame {
        &self.frame
    }

    pub fn epipole(&self) -> &Vec3 {
        self.frame.epipole()
    }

    /// Point the model at a new epipole. Returns whether the rotation was
    /// recomputed.
    pub fn set_epipole(&mut self, epipole: Vec3) -> bool {
        if self.frame.same_epipole(&epipole) {
            return false;
        }
        trace!(
            "geodesic epipole changed: [{:.6}, {:.6}, {:.6}]",
            epipole.x,
            epipole.y,
            epipole.z
        );
        self.frame = EpipoleFrame::new(epipole);
        true
    }

    /// Epipole-frame angles of world directions.
    pub fn rotate(&self, sphere: &CartesianGrid) -> RotatedSpherical {
        let (rows, cols) = sphere.shape();
        let mut out = RotatedSpherical {
            theta: Grid::zeros(rows, cols),
            phi: Grid::zeros(rows, cols),
        };
        for i in 0..sphere.len() {
            let (theta, phi) = self.frame.spherical(&sphere.point(i));
            out.theta[i] = theta;
            out.phi[i] = phi;
        }
        out
    }

    fn advance_theta(&self, theta: Real, modulation: Modulation) -> Real {
        match modulation {
            Modulation::Linear(delta) => theta + delta,
            Modulation::Parallax(k) => 2.0 * (k.exp() * (theta / 2.0).tan()).atan(),
        }
    }

    /// Whether `theta` is within one angle resolution of the epipole or its
    /// antipode, where the parallax flow has no usable `k`.
    fn near_pole(&self, theta: Real) -> bool {
        theta < self.angle_resolution || theta > PI - self.angle_resolution
    }

    /// Modulation taking the polar angle `from` to `to`.
    ///
    /// Starting on a pole falls back to a linear advance. Overshooting a
    /// pole keeps the NaN exponent so callers can revert the point.
    fn modulation_between(&self, from: Real, to: Real) -> Modulation {
        if self.near_pole(from) {
            Modulation::Linear(to - from)
        } else {
            Modulation::Parallax(parallax_exponent(from, to))
        }
    }

    fn center_theta(&self, block_center: &Pt2) -> Real {
        self.frame
            .spherical(&self.projection.to_sphere_point(block_center))
            .0
    }

    fn modulation(&self, motion: &Vec2, block_center: &Pt2) -> Modulation {
        let delta = motion.x * self.angle_resolution;
        match self.flavor {
            GeodesicFlavor::VishwanathOriginal => Modulation::Linear(delta),
            GeodesicFlavor::VishwanathModulated => {
                let theta_c = self.center_theta(block_center);
                self.modulation_between(theta_c, theta_c + delta)
            }
        }
    }

    fn move_rotated(
        &self,
        rotated: &RotatedSpherical,
        motion: &Vec2,
        block_center: &Pt2,
    ) -> PlanarGrid {
        let modulation = self.modulation(motion, block_center);
        let dphi = motion.y * self.angle_resolution;
        let (rows, cols) = rotated.theta.shape();
        let mut moved = CartesianGrid::new(
            Grid::zeros(rows, cols),
            Grid::zeros(rows, cols),
            Grid::zeros(rows, cols),
        );
        for i in 0..rotated.theta.len() {
            let theta = self.advance_theta(rotated.theta[i], modulation);
            let v = self.frame.direction(theta, rotated.phi[i] + dphi);
            moved.x[i] = v.x;
            moved.y[i] = v.y;
            moved.z[i] = v.z;
        }
        self.projection.from_sphere(&moved)
    }

    /// [`MotionModel::model_motion`] for a block of the picture-wide grid,
    /// reusing the epipole-frame angles kept in `cache`.
    pub fn model_motion_cached(
        &self,
        cache: &mut GeodesicCache,
        window: SubblockWindow,
        grid: &PlanarGrid,
        motion: &Vec2,
        block_center: &Pt2,
    ) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let rotated = cache.block(self, window);
        self.move_rotated(rotated, motion, block_center)
    }
}

#[derive(Clone, Copy, Debug)]
enum Modulation {
    Linear(Real),
    Parallax(Real),
}

/// `k` such that `2·atan(e^k·tan(from/2)) = to`.
fn parallax_exponent(from: Real, to: Real) -> Real {
    ((to / 2.0).tan() / (from / 2.0).tan()).ln()
}

impl MotionModel for GeodesicModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let rotated = self.rotate(&self.projection.to_sphere(grid));
        self.move_rotated(&rotated, motion, block_center)
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2 {
        let (theta_p, phi_p) = self.frame.spherical(&self.projection.to_sphere_point(position));
        let (theta_q, phi_q) = self.frame.spherical(&self.projection.to_sphere_point(shifted));
        let dphi = wrap_angle(phi_q - phi_p);
        let dtheta = match self.flavor {
            GeodesicFlavor::VishwanathOriginal => theta_q - theta_p,
            GeodesicFlavor::VishwanathModulated => {
                let theta_c = self.center_theta(block_center);
                if self.near_pole(theta_c) {
                    theta_q - theta_p
                } else {
                    let modulation = self.modulation_between(theta_p, theta_q);
                    self.advance_theta(theta_c, modulation) - theta_c
                }
            }
        };
        Vec2::new(dtheta, dphi) / self.angle_resolution
    }
}

#[derive(Clone, Debug)]
struct GeodesicBlock {
    window: SubblockWindow,
    epipole: Vec3,
    rotated: RotatedSpherical,
}

/// World directions of the whole picture plus the epipole-frame angles of
/// the last block.
#[derive(Clone, Debug)]
pub struct GeodesicCache {
    picture: CartesianGrid,
    block: Option<GeodesicBlock>,
}

impl GeodesicCache {
    pub fn seed(picture_sphere: CartesianGrid) -> Self {
        Self {
            picture: picture_sphere,
            block: None,
        }
    }

    /// Key of the cached block.
    pub fn cached_key(&self) -> Option<(SubblockWindow, Vec3)> {
        self.block.as_ref().map(|b| (b.window, b.epipole))
    }

    /// Epipole-frame angles of `window`, recomputed when the window or the
    /// model's epipole changed.
    pub fn block(&mut self, model: &GeodesicModel, window: SubblockWindow) -> &RotatedSpherical {
        let stale = match &self.block {
            Some(b) => b.window != window || !model.frame.same_epipole(&b.epipole),
            None => true,
        };
        if stale {
            self.block = None;
        }
        let picture = &self.picture;
        let block = self.block.get_or_insert_with(|| GeodesicBlock {
            window,
            epipole: *model.epipole(),
            rotated: model.rotate(&picture.window(
                window.row,
                window.col,
                window.rows,
                window.cols,
            )),
        });
        &block.rotated
    }
}

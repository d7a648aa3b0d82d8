//! Sphere rotation equivalent to translating the block center.

use std::sync::Arc;

use omnimv_core::{Mat3, PlanarGrid, Projection, Pt2, Real, Rot3, SphereProjection, Vec2, Vec3};

use crate::model::{angle_resolution, is_zero_motion};
use crate::{MotionModel, TangentFrame};

/// Rotation of the whole sphere that carries the block center along the
/// motion vector.
///
/// In the block center's [`TangentFrame`] the center sits at the local
/// front pole `+z`. The horizontal component becomes a yaw about the local
/// `y` axis and the vertical component a pitch about the local `x` axis,
/// composed as `R = R_y(α)·R_x(-β)`, so the center lands at local azimuth
/// `α` and elevation `β`.
#[derive(Clone, Debug)]
pub struct RotationalModel {
    projection: Arc<Projection>,
    angle_resolution: Real,
}

impl RotationalModel {
    pub fn new(projection: Arc<Projection>) -> Self {
        let angle_resolution = angle_resolution(projection.focal_length());
        Self {
            projection,
            angle_resolution,
        }
    }

    /// World-frame rotation for a motion vector at a block center.
    pub fn rotation(&self, motion: &Vec2, block_center: &Pt2) -> Mat3 {
        let frame = TangentFrame::at(&self.projection, block_center);
        let alpha = motion.x * self.angle_resolution;
        let beta = motion.y * self.angle_resolution;
        let local = Rot3::from_axis_angle(&Vec3::y_axis(), alpha)
            * Rot3::from_axis_angle(&Vec3::x_axis(), -beta);
        let basis = frame.basis();
        basis * local.matrix() * basis.transpose()
    }

    fn azimuth_elevation(l: &Vec3) -> (Real, Real) {
        (l.x.atan2(l.z), l.y.atan2((l.x * l.x + l.z * l.z).sqrt()))
    }
}

impl MotionModel for RotationalModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let rotation = self.rotation(motion, block_center);
        let moved = self.projection.to_sphere(grid).map_points(|v| rotation * v);
        self.projection.from_sphere(&moved)
    }

    /// Two-angle estimate: the azimuth and elevation differences of the two
    /// points in the block center's frame.
    ///
    /// Exact when `position` is the block center, an approximation
    /// elsewhere.
    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2 {
        let frame = TangentFrame::at(&self.projection, block_center);
        let (a0, e0) =
            Self::azimuth_elevation(&frame.to_local(&self.projection.to_sphere_point(position)));
        let (a1, e1) =
            Self::azimuth_elevation(&frame.to_local(&self.projection.to_sphere_point(shifted)));
        Vec2::new(a1 - a0, e1 - e0) / self.angle_resolution
    }
}

//! Translation on the plane tangent to the sphere at the block center.

use std::sync::Arc;

use omnimv_core::{PlanarGrid, Projection, Pt2, Real, SphereProjection, Vec2, Vec3};

use crate::model::{angle_resolution, is_zero_motion};
use crate::{MotionModel, TangentFrame};

/// Gnomonic tangent-plane motion.
///
/// Points are expressed in the [`TangentFrame`] of the block center and
/// projected onto the tangent plane as `(α, ε) = (x/z, y/z)`. The motion
/// vector, scaled by the angle resolution, translates `(α, ε)`; the result
/// is lifted back to the sphere. Points in the hemisphere facing away from
/// the block center have no tangent-plane image and come out as NaN.
#[derive(Clone, Debug)]
pub struct TangentialModel {
    projection: Arc<Projection>,
    angle_resolution: Real,
}

impl TangentialModel {
    pub fn new(projection: Arc<Projection>) -> Self {
        let angle_resolution = angle_resolution(projection.focal_length());
        Self {
            projection,
            angle_resolution,
        }
    }

    fn tangent_coordinates(frame: &TangentFrame, v: &Vec3) -> Vec2 {
        let l = frame.to_local(v);
        if l.z <= 0.0 {
            return Vec2::new(Real::NAN, Real::NAN);
        }
        Vec2::new(l.x / l.z, l.y / l.z)
    }
}

impl MotionModel for TangentialModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let frame = TangentFrame::at(&self.projection, block_center);
        let delta = motion * self.angle_resolution;
        let moved = self.projection.to_sphere(grid).map_points(|v| {
            let t = Self::tangent_coordinates(&frame, &v) + delta;
            frame.to_world(&Vec3::new(t.x, t.y, 1.0))
        });
        self.projection.from_sphere(&moved)
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2 {
        let frame = TangentFrame::at(&self.projection, block_center);
        let from = Self::tangent_coordinates(&frame, &self.projection.to_sphere_point(position));
        let to = Self::tangent_coordinates(&frame, &self.projection.to_sphere_point(shifted));
        (to - from) / self.angle_resolution
    }
}

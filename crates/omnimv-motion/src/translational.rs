//! Classic planar translation and its 3D lift.

use std::sync::Arc;

use omnimv_core::{PlanarGrid, Projection, Pt2, SphereProjection, Vec2, Vec3};

use crate::model::is_zero_motion;
use crate::MotionModel;

/// Plain translation in the base projection's pixel grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct TranslationalModel;

impl MotionModel for TranslationalModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, _block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        grid.translated(motion.x, motion.y)
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        _block_center: &Pt2,
    ) -> Vec2 {
        shifted - position
    }
}

/// Rigid 3D translation of sphere points.
///
/// The block center and its planar-shifted position are lifted to the
/// sphere; their difference is applied as the same 3D offset to every point
/// before projecting back.
#[derive(Clone, Debug)]
pub struct Translational3dModel {
    projection: Arc<Projection>,
}

impl Translational3dModel {
    pub fn new(projection: Arc<Projection>) -> Self {
        Self { projection }
    }

    fn offset_for(&self, motion: &Vec2, block_center: &Pt2) -> Vec3 {
        let from = self.projection.to_sphere_point(block_center);
        let to = self.projection.to_sphere_point(&(block_center + motion));
        to - from
    }
}

impl MotionModel for Translational3dModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let offset = self.offset_for(motion, block_center);
        let moved = self.projection.to_sphere(grid).map_points(|v| v + offset);
        self.projection.from_sphere(&moved)
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2 {
        // The moved point is only known up to scale: find λ > 0 with
        // |λ·q + (c - p)| = 1, so that λ·q + (c - p) is the moved center.
        let q = self.projection.to_sphere_point(shifted);
        let w = self.projection.to_sphere_point(block_center)
            - self.projection.to_sphere_point(position);
        let qw = q.dot(&w);
        let lambda = -qw + (qw * qw - w.norm_squared() + 1.0).sqrt();
        let moved_center = q * lambda + w;
        self.projection.from_sphere_point(&moved_center) - block_center
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnimv_core::{Equisolid, RadialProjection};

    fn fisheye() -> Arc<Projection> {
        Arc::new(Projection::Equisolid(RadialProjection::new(
            Equisolid::new(320.0),
            Pt2::new(639.5, 639.5),
        )))
    }

    #[test]
    fn translational_adds_the_vector() {
        let grid = PlanarGrid::lattice(2, 2, 10.0, 20.0, 4.0, 4.0);
        let moved = TranslationalModel.model_motion(&grid, &Vec2::new(1.5, -2.0), &Pt2::origin());
        assert_eq!(moved.x[(1, 1)], 15.5);
        assert_eq!(moved.y[(1, 1)], 22.0);
        let mv = TranslationalModel.motion_vector_for_equivalent_pixel_shift(
            &Pt2::new(3.0, 4.0),
            &Pt2::new(5.0, 1.0),
            &Pt2::origin(),
        );
        assert_eq!(mv, Vec2::new(2.0, -3.0));
    }

    #[test]
    fn block_center_moves_by_the_planar_vector() {
        let model = Translational3dModel::new(fisheye());
        let center = Pt2::new(800.0, 500.0);
        let motion = Vec2::new(6.0, -3.5);
        let moved = model.model_motion(&PlanarGrid::from_point(center), &motion, &center);
        assert!((moved.point(0) - (center + motion)).norm() < 1e-8);
    }

    #[test]
    fn inverse_recovers_the_vector() {
        let model = Translational3dModel::new(fisheye());
        let center = Pt2::new(760.0, 560.0);
        let position = Pt2::new(752.0, 572.0);
        let motion = Vec2::new(-4.25, 7.0);
        let moved = model.model_motion(&PlanarGrid::from_point(position), &motion, &center);
        let mv = model.motion_vector_for_equivalent_pixel_shift(&position, &moved.point(0), &center);
        assert!((mv - motion).norm() < 1e-8, "mv={mv:?}");
    }
}

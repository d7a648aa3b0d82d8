use omnimv_core::{PlanarGrid, Pt2, Real, Vec2};

use crate::{
    GeodesicModel, MotionPlaneAdaptive, RotationalModel, TangentialModel, Translational3dModel,
    TranslationalModel,
};

/// A strategy for applying a 2D motion vector on the sphere.
///
/// The motion vector is expressed in the model's own motion plane, in pixels
/// of the base projection. Implementations must return the input grid
/// unchanged for a zero motion vector.
pub trait MotionModel {
    /// Move every point of `grid` by `motion`, anchored at `block_center`.
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid;

    /// Motion vector that moves `position` to `shifted` under this model when
    /// anchored at `block_center`.
    ///
    /// May contain NaN when the shift is numerically degenerate for the
    /// model; callers decide how to fall back.
    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2;
}

/// Window of the picture-wide sub-block grid covered by one block.
///
/// Used as the key of the single-slot block caches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubblockWindow {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

pub(crate) fn is_zero_motion(motion: &Vec2) -> bool {
    motion.x == 0.0 && motion.y == 0.0
}

/// Radians per pixel near the optical axis of a projection.
pub(crate) fn angle_resolution(focal_length: Real) -> Real {
    1.0 / focal_length
}

/// Closed set of runtime motion models.
#[derive(Clone, Debug)]
pub enum AnyMotionModel {
    Translational(TranslationalModel),
    Translational3d(Translational3dModel),
    Tangential(TangentialModel),
    Rotational(RotationalModel),
    MotionPlane(MotionPlaneAdaptive),
    Geodesic(GeodesicModel),
}

impl AnyMotionModel {
    pub fn as_geodesic_mut(&mut self) -> Option<&mut GeodesicModel> {
        match self {
            AnyMotionModel::Geodesic(m) => Some(m),
            _ => None,
        }
    }
}

impl MotionModel for AnyMotionModel {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, block_center: &Pt2) -> PlanarGrid {
        match self {
            AnyMotionModel::Translational(m) => m.model_motion(grid, motion, block_center),
            AnyMotionModel::Translational3d(m) => m.model_motion(grid, motion, block_center),
            AnyMotionModel::Tangential(m) => m.model_motion(grid, motion, block_center),
            AnyMotionModel::Rotational(m) => m.model_motion(grid, motion, block_center),
            AnyMotionModel::MotionPlane(m) => m.model_motion(grid, motion, block_center),
            AnyMotionModel::Geodesic(m) => m.model_motion(grid, motion, block_center),
        }
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        block_center: &Pt2,
    ) -> Vec2 {
        match self {
            AnyMotionModel::Translational(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
            AnyMotionModel::Translational3d(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
            AnyMotionModel::Tangential(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
            AnyMotionModel::Rotational(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
            AnyMotionModel::MotionPlane(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
            AnyMotionModel::Geodesic(m) => {
                m.motion_vector_for_equivalent_pixel_shift(position, shifted, block_center)
            }
        }
    }
}

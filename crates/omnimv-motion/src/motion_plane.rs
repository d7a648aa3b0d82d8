//! Motion-plane-adaptive (MPA) translation.
//!
//! Sphere points are rotated into one of three fixed motion planes and
//! projected with a [`PerspectiveProjection`]. Motion is a plain translation
//! on that plane, with its sign flipped for points on the virtual image
//! plane, before projecting back to the base projection.

use std::sync::Arc;

use omnimv_core::{
    CartesianGrid, FlagGrid, Mat3, PerspectiveProjection, PlanarGrid, Projection, Pt2, Real,
    SphereProjection, TabulatedPerspective, Vec2, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::model::is_zero_motion;
use crate::{MotionModel, SubblockWindow};

/// Viewing axis of a motion plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPlane {
    /// Plane perpendicular to the world forward/backward axis.
    FrontBack,
    /// Plane perpendicular to the world left/right axis.
    LeftRight,
    /// Plane perpendicular to the world up/down axis.
    TopBottom,
}

impl MotionPlane {
    /// Signed axis permutation taking world directions into the plane frame,
    /// whose `+x` is the plane's viewing axis.
    pub fn world_to_plane(&self) -> Mat3 {
        match self {
            MotionPlane::FrontBack => Mat3::identity(),
            MotionPlane::LeftRight => Mat3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            MotionPlane::TopBottom => Mat3::new(0.0, 0.0, 1.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0),
        }
    }
}

/// Translation on a fixed perspective motion plane.
#[derive(Clone, Debug)]
pub struct MotionPlaneAdaptive {
    projection: Arc<Projection>,
    plane: MotionPlane,
    rotation: Mat3,
    perspective: PerspectiveProjection,
}

impl MotionPlaneAdaptive {
    /// The motion plane uses the focal length of the base projection, so one
    /// pixel of motion spans the same angle near the plane's axis.
    pub fn new(projection: Arc<Projection>, plane: MotionPlane) -> Self {
        let perspective = PerspectiveProjection::new(projection.focal_length(), Pt2::origin());
        Self {
            projection,
            plane,
            rotation: plane.world_to_plane(),
            perspective,
        }
    }

    pub fn plane(&self) -> MotionPlane {
        self.plane
    }

    pub fn perspective(&self) -> &PerspectiveProjection {
        &self.perspective
    }

    fn rotate_in(&self, sphere: &CartesianGrid) -> CartesianGrid {
        sphere.map_points(|v| self.rotation * v)
    }

    fn rotate_out(&self, sphere: &CartesianGrid) -> CartesianGrid {
        let back = self.rotation.transpose();
        sphere.map_points(|v| back * v)
    }

    /// Plane coordinates and VIP flags of world directions.
    pub fn to_plane(&self, sphere: &CartesianGrid) -> (PlanarGrid, FlagGrid) {
        self.perspective.from_sphere(&self.rotate_in(sphere))
    }

    pub fn to_plane_point(&self, v: &Vec3) -> (Pt2, bool) {
        self.perspective.from_sphere_point(&(self.rotation * v))
    }

    /// World directions of plane coordinates.
    pub fn from_plane(&self, planar: &PlanarGrid, virtual_image_plane: &FlagGrid) -> CartesianGrid {
        self.rotate_out(&self.perspective.to_sphere(planar, virtual_image_plane))
    }

    /// Translate plane coordinates, negating the motion on the virtual image
    /// plane.
    pub fn translate_in_plane(
        planar: &PlanarGrid,
        virtual_image_plane: &FlagGrid,
        motion: &Vec2,
    ) -> PlanarGrid {
        let (rows, cols) = planar.shape();
        let mut out = PlanarGrid {
            x: planar.x.clone(),
            y: planar.y.clone(),
        };
        for i in 0..rows * cols {
            let sign = vip_sign(virtual_image_plane[i]);
            out.x[i] += sign * motion.x;
            out.y[i] += sign * motion.y;
        }
        out
    }

    fn move_on_plane(
        &self,
        planar: &PlanarGrid,
        virtual_image_plane: &FlagGrid,
        motion: &Vec2,
    ) -> PlanarGrid {
        let moved = Self::translate_in_plane(planar, virtual_image_plane, motion);
        let sphere = self.from_plane(&moved, virtual_image_plane);
        self.projection.from_sphere(&sphere)
    }

    /// [`MotionModel::model_motion`] for a block of the picture-wide grid,
    /// reusing the plane coordinates kept in `cache`.
    ///
    /// `grid` is the block's base-projection grid, returned unchanged for a
    /// zero motion vector.
    pub fn model_motion_cached(
        &self,
        cache: &mut MpaCache,
        window: SubblockWindow,
        grid: &PlanarGrid,
        motion: &Vec2,
    ) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let (planar, vip) = cache.block(window);
        self.move_on_plane(planar, vip, motion)
    }

    /// Table for [`MotionPlaneAdaptive::model_motion_tabulated`].
    pub fn tabulated_perspective(&self, max_radius: Real, samples: usize) -> TabulatedPerspective {
        self.perspective.tabulated(max_radius, samples)
    }

    /// [`MotionModel::model_motion`] with the plane projection served by a
    /// lookup table instead of `tan`/`atan`.
    pub fn model_motion_tabulated(
        &self,
        table: &TabulatedPerspective,
        grid: &PlanarGrid,
        motion: &Vec2,
    ) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let sphere = self.projection.to_sphere(grid);
        let (planar, vip) = table.from_sphere(&self.rotate_in(&sphere));
        let moved = Self::translate_in_plane(&planar, &vip, motion);
        let sphere = self.rotate_out(&table.to_sphere(&moved, &vip));
        self.projection.from_sphere(&sphere)
    }
}

fn vip_sign(virtual_image_plane: bool) -> Real {
    if virtual_image_plane {
        -1.0
    } else {
        1.0
    }
}

impl MotionModel for MotionPlaneAdaptive {
    fn model_motion(&self, grid: &PlanarGrid, motion: &Vec2, _block_center: &Pt2) -> PlanarGrid {
        if is_zero_motion(motion) {
            return grid.clone();
        }
        let (planar, vip) = self.to_plane(&self.projection.to_sphere(grid));
        self.move_on_plane(&planar, &vip, motion)
    }

    fn motion_vector_for_equivalent_pixel_shift(
        &self,
        position: &Pt2,
        shifted: &Pt2,
        _block_center: &Pt2,
    ) -> Vec2 {
        let (from, vip) = self.to_plane_point(&self.projection.to_sphere_point(position));
        let (to, _) = self.to_plane_point(&self.projection.to_sphere_point(shifted));
        (to - from) * vip_sign(vip)
    }
}

#[derive(Clone, Debug)]
struct MpaBlock {
    window: SubblockWindow,
    planar: PlanarGrid,
    vip: FlagGrid,
}

/// Plane coordinates of the whole picture plus the slice of the last block.
#[derive(Clone, Debug)]
pub struct MpaCache {
    picture: PlanarGrid,
    picture_vip: FlagGrid,
    block: Option<MpaBlock>,
}

impl MpaCache {
    /// Project the picture-wide sphere grid onto the model's plane once.
    pub fn seed(model: &MotionPlaneAdaptive, picture_sphere: &CartesianGrid) -> Self {
        let (picture, picture_vip) = model.to_plane(picture_sphere);
        Self {
            picture,
            picture_vip,
            block: None,
        }
    }

    /// Window the last block was sliced for.
    pub fn cached_window(&self) -> Option<SubblockWindow> {
        self.block.as_ref().map(|b| b.window)
    }

    /// Plane coordinates and VIP flags of `window`, sliced on a key change.
    pub fn block(&mut self, window: SubblockWindow) -> (&PlanarGrid, &FlagGrid) {
        if self.cached_window() != Some(window) {
            self.block = None;
        }
        let picture = &self.picture;
        let picture_vip = &self.picture_vip;
        let block = self.block.get_or_insert_with(|| MpaBlock {
            window,
            planar: picture.window(window.row, window.col, window.rows, window.cols),
            vip: picture_vip
                .view((window.row, window.col), (window.rows, window.cols))
                .into_owned(),
        });
        (&block.planar, &block.vip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnimv_core::{EquirectangularProjection, Grid};

    fn panorama() -> Arc<Projection> {
        Arc::new(Projection::Equirectangular(EquirectangularProjection::new(
            1024.0, 512.0, 0.5,
        )))
    }

    #[test]
    fn plane_rotations_put_their_axis_forward() {
        assert_eq!(MotionPlane::LeftRight.world_to_plane() * Vec3::y(), Vec3::x());
        assert_eq!(MotionPlane::TopBottom.world_to_plane() * Vec3::z(), Vec3::x());
        for plane in [MotionPlane::FrontBack, MotionPlane::LeftRight, MotionPlane::TopBottom] {
            let r = plane.world_to_plane();
            assert_eq!(r.determinant(), 1.0);
        }
    }

    #[test]
    fn front_back_motion_near_the_axis_is_translational() {
        let model = MotionPlaneAdaptive::new(panorama(), MotionPlane::FrontBack);
        // Column -0.5 is world forward; stay a little inside the image.
        let grid = PlanarGrid::lattice(2, 2, 1.0, 253.0, 2.0, 2.0);
        let motion = Vec2::new(1.0, 1.0);
        let moved = model.model_motion(&grid, &motion, &grid.point(0));
        for i in 0..grid.len() {
            let d = moved.point(i) - grid.point(i);
            assert!((d - motion).norm() < 0.05, "d={d:?}");
        }
    }

    #[test]
    fn inverse_recovers_the_vector() {
        let model = MotionPlaneAdaptive::new(panorama(), MotionPlane::TopBottom);
        let position = Pt2::new(300.0, 60.0);
        let motion = Vec2::new(-3.0, 2.25);
        let moved = model.model_motion(&PlanarGrid::from_point(position), &motion, &position);
        let mv = model.motion_vector_for_equivalent_pixel_shift(&position, &moved.point(0), &position);
        assert!((mv - motion).norm() < 1e-7, "mv={mv:?}");
    }

    #[test]
    fn vip_flag_and_translation_sign_flip_at_the_plane_boundary() {
        let model = MotionPlaneAdaptive::new(panorama(), MotionPlane::LeftRight);
        // The middle column (x = 511.5) is world backward, which lies exactly
        // on the boundary (θ = π/2) of the left/right plane. Columns to its
        // left have φ > -π (world right, behind the plane), columns to its
        // right have φ < -π (world left, in front of the plane).
        let grid = PlanarGrid::new(
            Grid::from_row_slice(1, 2, &[509.5, 513.5]),
            Grid::from_row_slice(1, 2, &[255.5, 255.5]),
        );
        let (planar, vip) = model.to_plane(&panorama().to_sphere(&grid));
        assert!(vip[0], "right-hand side must be on the virtual image plane");
        assert!(!vip[1], "left-hand side must be on the real image plane");

        let motion = Vec2::new(3.0, -2.0);
        let moved = MotionPlaneAdaptive::translate_in_plane(&planar, &vip, &motion);
        assert!((moved.point(0) - planar.point(0) + motion).norm() < 1e-9);
        assert!((moved.point(1) - planar.point(1) - motion).norm() < 1e-9);
    }

    #[test]
    fn cached_entry_matches_uncached_motion() {
        let proj = panorama();
        let model = MotionPlaneAdaptive::new(proj.clone(), MotionPlane::LeftRight);
        let picture = PlanarGrid::lattice(16, 32, 1.5, 1.5, 4.0, 4.0);
        let mut cache = MpaCache::seed(&model, &proj.to_sphere(&picture));
        let window = SubblockWindow {
            row: 3,
            col: 20,
            rows: 2,
            cols: 4,
        };
        let block = picture.window(3, 20, 2, 4);
        let motion = Vec2::new(-5.0, 1.5);
        let cached = model.model_motion_cached(&mut cache, window, &block, &motion);
        assert_eq!(cache.cached_window(), Some(window));
        let direct = model.model_motion(&block, &motion, &block.point(0));
        for i in 0..block.len() {
            assert!((cached.point(i) - direct.point(i)).norm() < 1e-12);
        }
    }

    #[test]
    fn tabulated_projection_tracks_the_exact_one() {
        let model = MotionPlaneAdaptive::new(panorama(), MotionPlane::FrontBack);
        let table = model.tabulated_perspective(4000.0, 400_000);
        let grid = PlanarGrid::lattice(2, 3, 40.0, 200.0, 12.0, 12.0);
        let motion = Vec2::new(2.0, -1.0);
        let exact = model.model_motion(&grid, &motion, &grid.point(0));
        let approx = model.model_motion_tabulated(&table, &grid, &motion);
        for i in 0..grid.len() {
            assert!((exact.point(i) - approx.point(i)).norm() < 0.05);
        }
    }
}

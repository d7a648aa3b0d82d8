//! Fixed four-viewport reprojection.

use std::sync::Arc;

use log::debug;
use omnimv_core::{PlanarGrid, Projection, Pt2, SphereProjection, Vec2};
use omnimv_motion::{MotionModel, MotionPlane, MotionPlaneAdaptive, MpaCache, TranslationalModel};
use serde::{Deserialize, Serialize};

use crate::config::subblock_offset_value;
use crate::subblock::{finalize, SubblockPicture};
use crate::{
    BlockPosition, BlockSize, ChromaFormat, ComponentId, ConfigError, MotionVector,
    ReprojectionError, SubblockPositions,
};

/// Viewports of the legacy engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Viewport {
    /// Plain translation in the base projection.
    Classic,
    FrontBack,
    LeftRight,
    TopBottom,
}

impl Viewport {
    pub const ALL: [Viewport; 4] = [
        Viewport::Classic,
        Viewport::FrontBack,
        Viewport::LeftRight,
        Viewport::TopBottom,
    ];

    pub fn motion_plane(self) -> Option<MotionPlane> {
        match self {
            Viewport::Classic => None,
            Viewport::FrontBack => Some(MotionPlane::FrontBack),
            Viewport::LeftRight => Some(MotionPlane::LeftRight),
            Viewport::TopBottom => Some(MotionPlane::TopBottom),
        }
    }
}

/// A perspective viewport and the plane coordinates of its last block.
#[derive(Debug)]
struct ViewportSlot {
    model: MotionPlaneAdaptive,
    cache: MpaCache,
}

/// Reprojection restricted to the classic model and the three perspective
/// viewports, all of them always available.
#[derive(Debug)]
pub struct LegacyReprojection {
    projection: Arc<Projection>,
    picture: SubblockPicture,
    viewports: [ViewportSlot; 3],
}

impl LegacyReprojection {
    pub fn new(
        projection: Projection,
        width: usize,
        height: usize,
        subblock_offset: u8,
    ) -> Result<Self, ConfigError> {
        let offset = subblock_offset_value(subblock_offset)?;
        let picture = SubblockPicture::new(width, height, offset)?;
        let projection = Arc::new(projection);
        let picture_sphere = projection.to_sphere(picture.grid());
        let viewports = [
            MotionPlane::FrontBack,
            MotionPlane::LeftRight,
            MotionPlane::TopBottom,
        ]
        .map(|plane| {
            let model = MotionPlaneAdaptive::new(projection.clone(), plane);
            let cache = MpaCache::seed(&model, &picture_sphere);
            ViewportSlot { model, cache }
        });
        debug!(
            "legacy reprojection {}x{}: {:?} sub-blocks, offset {}",
            width,
            height,
            picture.grid().shape(),
            offset
        );
        Ok(Self {
            projection,
            picture,
            viewports,
        })
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    fn viewport(&self, viewport: Viewport) -> Option<&MotionPlaneAdaptive> {
        let plane = viewport.motion_plane()?;
        self.viewports
            .iter()
            .map(|slot| &slot.model)
            .find(|model| model.plane() == plane)
    }

    fn model_motion(&self, viewport: Viewport, grid: &PlanarGrid, motion: &Vec2) -> PlanarGrid {
        match self.viewport(viewport) {
            Some(model) => model.model_motion(grid, motion, &Pt2::origin()),
            None => TranslationalModel.model_motion(grid, motion, &Pt2::origin()),
        }
    }

    /// Move the motion position of every 4x4 sub-block of a block by `mv`
    /// in `viewport` and return the moved sub-block corners.
    ///
    /// Same conventions as
    /// [`ReprojectionEngine::reproject_motion_vector_subblocks`](crate::ReprojectionEngine::reproject_motion_vector_subblocks).
    #[allow(clippy::too_many_arguments)]
    pub fn reproject_motion_vector_subblocks(
        &mut self,
        position: BlockPosition,
        size: BlockSize,
        mv: MotionVector,
        precision: u32,
        viewport: Viewport,
        component: ComponentId,
        chroma_format: ChromaFormat,
    ) -> Result<SubblockPositions, ReprojectionError> {
        let block = self
            .picture
            .locate(position, size, component, chroma_format)?;
        let motion = mv.to_floating(precision);
        let offset = self.picture.offset();
        if block.luma {
            let base = self.picture.luma_block(block.window);
            let slot = match viewport.motion_plane() {
                Some(plane) => self
                    .viewports
                    .iter_mut()
                    .find(|slot| slot.model.plane() == plane),
                None => None,
            };
            let moved = match slot {
                Some(slot) => {
                    slot.model
                        .model_motion_cached(&mut slot.cache, block.window, base, &motion)
                }
                None => TranslationalModel.model_motion(base, &motion, &Pt2::origin()),
            };
            Ok(finalize(base, &moved, &block, offset, precision))
        } else {
            let base = self.picture.chroma_block(&block);
            let moved = self.model_motion(viewport, &base, &motion);
            Ok(finalize(&base, &moved, &block, offset, precision))
        }
    }

    /// Express a motion vector estimated in `orig` as a vector in
    /// `desired` at `position`.
    ///
    /// A vector whose start and end fall on different sides of the desired
    /// viewport (one on its virtual image plane, one not) cannot be
    /// expressed there and comes back as zero, as do degenerate ones.
    pub fn motion_vector_in_desired_viewport(
        &self,
        mv: MotionVector,
        precision: u32,
        orig: Viewport,
        desired: Viewport,
        position: &Pt2,
    ) -> MotionVector {
        if orig == desired || mv.is_zero() {
            return mv;
        }
        let motion = mv.to_floating(precision);
        let shifted = self
            .model_motion(orig, &PlanarGrid::from_point(*position), &motion)
            .point(0);

        let desired_motion = match self.viewport(desired) {
            None => shifted - position,
            Some(model) => {
                let (from, from_vip) =
                    model.to_plane_point(&self.projection.to_sphere_point(position));
                let (to, to_vip) = model.to_plane_point(&self.projection.to_sphere_point(&shifted));
                if from_vip != to_vip {
                    return MotionVector::ZERO;
                }
                let d = to - from;
                if from_vip {
                    -d
                } else {
                    d
                }
            }
        };
        MotionVector::checked_from_floating(&desired_motion, precision)
            .unwrap_or(MotionVector::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnimv_core::EquirectangularProjection;

    fn legacy() -> LegacyReprojection {
        LegacyReprojection::new(
            Projection::Equirectangular(EquirectangularProjection::new(512.0, 256.0, 0.5)),
            512,
            256,
            2,
        )
        .unwrap()
    }

    #[test]
    fn same_viewport_is_identity() {
        let l = legacy();
        let mv = MotionVector::new(-13, 7);
        for v in Viewport::ALL {
            assert_eq!(
                l.motion_vector_in_desired_viewport(mv, 4, v, v, &Pt2::new(40.0, 100.0)),
                mv
            );
        }
    }

    #[test]
    fn classic_to_viewport_and_back() {
        let l = legacy();
        // Near world forward the front/back plane is close to the panorama.
        let position = Pt2::new(2.0, 127.0);
        let mv = MotionVector::new(16, -8);
        let in_plane = l.motion_vector_in_desired_viewport(
            mv,
            4,
            Viewport::Classic,
            Viewport::FrontBack,
            &position,
        );
        assert!((in_plane.hor - 16).abs() <= 1 && (in_plane.ver + 8).abs() <= 1, "{in_plane:?}");
        let back = l.motion_vector_in_desired_viewport(
            in_plane,
            4,
            Viewport::FrontBack,
            Viewport::Classic,
            &position,
        );
        assert!((back.hor - in_plane.hor).abs() <= 1 && (back.ver - in_plane.ver).abs() <= 1);
    }

    #[test]
    fn crossing_the_virtual_image_plane_gives_zero() {
        let l = legacy();
        // Column 255.5 is world backward, on the left/right plane boundary.
        // Moving from its right side (behind the plane) across it flips VIP.
        let position = Pt2::new(254.5, 127.0);
        let mv = MotionVector::new(3 << 4, 0);
        let out = l.motion_vector_in_desired_viewport(
            mv,
            4,
            Viewport::Classic,
            Viewport::LeftRight,
            &position,
        );
        assert_eq!(out, MotionVector::ZERO);
    }

    #[test]
    fn viewport_block_cache_is_transparent() {
        let mv = MotionVector::new(-40, 22);
        let blocks = [
            (BlockPosition::new(64, 32), BlockSize::new(16, 8)),
            (BlockPosition::new(64, 32), BlockSize::new(8, 8)),
            (BlockPosition::new(200, 12), BlockSize::new(16, 16)),
            (BlockPosition::new(64, 32), BlockSize::new(16, 8)),
        ];
        for viewport in Viewport::ALL {
            let mut cached = legacy();
            for (position, size) in blocks {
                let reproject = |l: &mut LegacyReprojection| {
                    l.reproject_motion_vector_subblocks(
                        position,
                        size,
                        mv,
                        4,
                        viewport,
                        ComponentId::Y,
                        ChromaFormat::Yuv420,
                    )
                    .unwrap()
                };
                let first = reproject(&mut cached);
                let again = reproject(&mut cached);
                let fresh = reproject(&mut legacy());
                assert_eq!(first, again, "{viewport:?} at {position:?}");
                assert_eq!(first, fresh, "{viewport:?} at {position:?}");
            }
        }
    }

    #[test]
    fn cached_viewport_motion_matches_the_uncached_model() {
        let mut l = legacy();
        let position = BlockPosition::new(120, 40);
        let mv = MotionVector::new(27, -9);
        let out = l
            .reproject_motion_vector_subblocks(
                position,
                BlockSize::new(8, 8),
                mv,
                4,
                Viewport::TopBottom,
                ComponentId::Y,
                ChromaFormat::Yuv420,
            )
            .unwrap();
        let offset = l.picture.offset();
        let base = PlanarGrid::lattice(2, 2, 120.0 + offset, 40.0 + offset, 4.0, 4.0);
        let moved = l.model_motion(Viewport::TopBottom, &base, &mv.to_floating(4));
        for row in 0..2 {
            for col in 0..2 {
                let expected_x = ((moved.x[(row, col)] - offset) * 16.0).round() as i32;
                let expected_y = ((moved.y[(row, col)] - offset) * 16.0).round() as i32;
                assert!((out.x[(row, col)] - expected_x).abs() <= 1, "{row},{col}");
                assert!((out.y[(row, col)] - expected_y).abs() <= 1, "{row},{col}");
            }
        }
    }

    #[test]
    fn reprojection_with_zero_motion_gives_corners() {
        let mut l = legacy();
        for viewport in Viewport::ALL {
            let out = l
                .reproject_motion_vector_subblocks(
                    BlockPosition::new(32, 16),
                    BlockSize::new(8, 8),
                    MotionVector::ZERO,
                    4,
                    viewport,
                    ComponentId::Y,
                    ChromaFormat::Yuv420,
                )
                .unwrap();
            assert_eq!(out.x[(1, 1)], 36 << 4);
            assert_eq!(out.y[(1, 0)], 20 << 4);
        }
    }
}

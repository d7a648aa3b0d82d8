//! Generalized reprojection over the configured motion models.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use omnimv_core::{CartesianGrid, PlanarGrid, Projection, Pt2, SphereProjection, Vec3};
use omnimv_motion::{
    AnyMotionModel, EpipoleList, GeodesicCache, GeodesicModel, MotionModel, MotionPlaneAdaptive,
    MpaCache, RotationalModel, TangentialModel, Translational3dModel, TranslationalModel,
};

use crate::config::subblock_offset_value;
use crate::subblock::{finalize, SubblockPicture};
use crate::{
    BlockPosition, BlockSize, ChromaFormat, ComponentId, ConfigError, MotionModelId,
    MotionVector, ReprojectionConfig, ReprojectionError, SubblockPositions,
};

#[derive(Debug)]
enum ModelCache {
    None,
    Mpa(MpaCache),
    Geodesic(GeodesicCache),
}

#[derive(Debug)]
struct ModelSlot {
    model: AnyMotionModel,
    cache: ModelCache,
}

impl ModelSlot {
    fn build(
        id: MotionModelId,
        config: &ReprojectionConfig,
        projection: &Arc<Projection>,
        picture_sphere: &CartesianGrid,
    ) -> Self {
        let plain = |model| Self {
            model,
            cache: ModelCache::None,
        };
        if let Some(plane) = id.motion_plane() {
            let model = MotionPlaneAdaptive::new(projection.clone(), plane);
            let cache = MpaCache::seed(&model, picture_sphere);
            return Self {
                model: AnyMotionModel::MotionPlane(model),
                cache: ModelCache::Mpa(cache),
            };
        }
        if id.is_geodesic() {
            // The camera-pose epipole is looked up per call.
            let epipole = id.fixed_epipole().unwrap_or_else(Vec3::zeros);
            return Self {
                model: AnyMotionModel::Geodesic(GeodesicModel::new(
                    projection.clone(),
                    config.geodesic_flavor,
                    epipole,
                )),
                cache: ModelCache::Geodesic(GeodesicCache::seed(picture_sphere.clone())),
            };
        }
        match id {
            MotionModelId::Translational3d => plain(AnyMotionModel::Translational3d(
                Translational3dModel::new(projection.clone()),
            )),
            MotionModelId::Tangential => plain(AnyMotionModel::Tangential(TangentialModel::new(
                projection.clone(),
            ))),
            MotionModelId::Rotational => plain(AnyMotionModel::Rotational(RotationalModel::new(
                projection.clone(),
            ))),
            _ => plain(AnyMotionModel::Translational(TranslationalModel)),
        }
    }

    fn set_epipole(&mut self, epipole: Option<Vec3>) {
        if let (Some(e), Some(model)) = (epipole, self.model.as_geodesic_mut()) {
            model.set_epipole(e);
        }
    }
}

/// Reprojects motion vectors of 360° video blocks through a set of sphere
/// motion models.
///
/// The engine owns its motion models together with their per-block caches
/// and a single-slot cache of the last luma block. It is not meant to be
/// shared between threads; parallel encoders create one engine per worker.
#[derive(Debug)]
pub struct ReprojectionEngine {
    config: ReprojectionConfig,
    projection: Arc<Projection>,
    picture: SubblockPicture,
    epipoles: EpipoleList,
    slots: BTreeMap<MotionModelId, ModelSlot>,
}

impl ReprojectionEngine {
    /// Build the picture-wide sub-block grid and seed the caches of every
    /// active model from it.
    ///
    /// `width` and `height` are the luma picture size and must be non-zero
    /// multiples of 4.
    pub fn new(
        projection: Projection,
        width: usize,
        height: usize,
        config: ReprojectionConfig,
        epipoles: EpipoleList,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let offset = subblock_offset_value(config.subblock_offset)?;
        let picture = SubblockPicture::new(width, height, offset)?;
        let projection = Arc::new(projection);
        let picture_sphere = projection.to_sphere(picture.grid());

        let slots: BTreeMap<_, _> = config
            .active
            .iter()
            .map(|id| (id, ModelSlot::build(id, &config, &projection, &picture_sphere)))
            .collect();

        debug!(
            "reprojection engine {}x{}: {:?} sub-blocks, offset {}, models {:?}",
            width,
            height,
            picture.grid().shape(),
            offset,
            slots.keys().collect::<Vec<_>>()
        );

        Ok(Self {
            config,
            projection,
            picture,
            epipoles,
            slots,
        })
    }

    pub fn config(&self) -> &ReprojectionConfig {
        &self.config
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn epipoles(&self) -> &EpipoleList {
        &self.epipoles
    }

    pub fn epipoles_mut(&mut self) -> &mut EpipoleList {
        &mut self.epipoles
    }

    pub fn is_active(&self, model: MotionModelId) -> bool {
        self.slots.contains_key(&model)
    }

    /// Motion positions of every luma sub-block of the picture.
    pub fn subblock_grid(&self) -> &PlanarGrid {
        self.picture.grid()
    }

    fn epipole_for(
        &self,
        model: MotionModelId,
        (cur_poc, ref_poc): (i32, i32),
    ) -> Result<Option<Vec3>, ReprojectionError> {
        if model == MotionModelId::GeodesicCameraPose {
            Ok(Some(self.epipoles.find_epipole(cur_poc, ref_poc)?))
        } else {
            Ok(None)
        }
    }

    fn slot_mut(&mut self, model: MotionModelId) -> Result<&mut ModelSlot, ReprojectionError> {
        self.slots
            .get_mut(&model)
            .ok_or(ReprojectionError::InactiveModel(model))
    }

    /// Move the motion position of every 4x4 sub-block of a block by `mv`
    /// under `model` and return the moved sub-block corners.
    ///
    /// `position` and `size` are in samples of `component`; `mv` is a luma
    /// motion vector with `precision` fractional bits. Chroma results carry
    /// the chroma subsampling as extra fractional bits. Sub-blocks whose
    /// motion is numerically degenerate keep their unmoved corner.
    #[allow(clippy::too_many_arguments)]
    pub fn reproject_motion_vector_subblocks(
        &mut self,
        position: BlockPosition,
        size: BlockSize,
        mv: MotionVector,
        precision: u32,
        model: MotionModelId,
        component: ComponentId,
        chroma_format: ChromaFormat,
        cur_poc: i32,
        ref_poc: i32,
    ) -> Result<SubblockPositions, ReprojectionError> {
        if !self.is_active(model) {
            return Err(ReprojectionError::InactiveModel(model));
        }
        let block = self
            .picture
            .locate(position, size, component, chroma_format)?;
        let epipole = self.epipole_for(model, (cur_poc, ref_poc))?;
        let motion = mv.to_floating(precision);
        let offset = self.picture.offset();

        let slot = self
            .slots
            .get_mut(&model)
            .ok_or(ReprojectionError::InactiveModel(model))?;
        slot.set_epipole(epipole);

        if block.luma {
            let base = self.picture.luma_block(block.window);
            let moved = match (&slot.model, &mut slot.cache) {
                (AnyMotionModel::MotionPlane(m), ModelCache::Mpa(cache)) => {
                    m.model_motion_cached(cache, block.window, base, &motion)
                }
                (AnyMotionModel::Geodesic(m), ModelCache::Geodesic(cache)) => {
                    m.model_motion_cached(cache, block.window, base, &motion, &block.center)
                }
                (m, _) => m.model_motion(base, &motion, &block.center),
            };
            Ok(finalize(base, &moved, &block, offset, precision))
        } else {
            let base = self.picture.chroma_block(&block);
            let moved = slot.model.model_motion(&base, &motion, &block.center);
            Ok(finalize(&base, &moved, &block, offset, precision))
        }
    }

    /// Express a motion vector estimated under `model_orig` as a vector
    /// under `model_desired`.
    ///
    /// `mv` is applied under the original model at `position`, anchored at
    /// the center of the block it was estimated for (`candidate_center`);
    /// the shifted position is then explained under the desired model
    /// anchored at `current_center`. POC pairs select the epipole of the
    /// camera-pose geodesic model on each side. Vectors that cannot be
    /// expressed come back as zero.
    #[allow(clippy::too_many_arguments)]
    pub fn motion_vector_in_desired_motion_model(
        &mut self,
        mv: MotionVector,
        precision: u32,
        model_orig: MotionModelId,
        model_desired: MotionModelId,
        position: &Pt2,
        candidate_center: &Pt2,
        current_center: &Pt2,
        orig_pocs: (i32, i32),
        desired_pocs: (i32, i32),
    ) -> Result<MotionVector, ReprojectionError> {
        for model in [model_orig, model_desired] {
            if !self.is_active(model) {
                return Err(ReprojectionError::InactiveModel(model));
            }
        }
        let epipole_orig = self.epipole_for(model_orig, orig_pocs)?;
        let epipole_desired = self.epipole_for(model_desired, desired_pocs)?;
        if mv.is_zero() || (model_orig == model_desired && same_bits(epipole_orig, epipole_desired))
        {
            return Ok(mv);
        }

        let motion = mv.to_floating(precision);
        let slot = self.slot_mut(model_orig)?;
        slot.set_epipole(epipole_orig);
        let shifted = slot
            .model
            .model_motion(&PlanarGrid::from_point(*position), &motion, candidate_center)
            .point(0);

        let slot = self.slot_mut(model_desired)?;
        slot.set_epipole(epipole_desired);
        let desired =
            slot.model
                .motion_vector_for_equivalent_pixel_shift(position, &shifted, current_center);
        Ok(MotionVector::checked_from_floating(&desired, precision)
            .unwrap_or(MotionVector::ZERO))
    }
}

fn same_bits(a: Option<Vec3>, b: Option<Vec3>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => a.iter().zip(b.iter()).all(|(x, y)| x.to_bits() == y.to_bits()),
        _ => false,
    }
}

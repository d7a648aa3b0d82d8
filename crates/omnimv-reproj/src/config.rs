//! Engine configuration.

use omnimv_core::{Real, Vec3};
use omnimv_motion::{GeodesicFlavor, MotionPlane};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Motion models selectable per block.
///
/// The numeric index is what callers store in integer syntax elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionModelId {
    Classic,
    MpaFrontBack,
    MpaLeftRight,
    MpaTopBottom,
    Translational3d,
    Tangential,
    Rotational,
    GeodesicCameraPose,
    GeodesicX,
    GeodesicY,
    GeodesicZ,
}

impl MotionModelId {
    pub const ALL: [MotionModelId; 11] = [
        MotionModelId::Classic,
        MotionModelId::MpaFrontBack,
        MotionModelId::MpaLeftRight,
        MotionModelId::MpaTopBottom,
        MotionModelId::Translational3d,
        MotionModelId::Tangential,
        MotionModelId::Rotational,
        MotionModelId::GeodesicCameraPose,
        MotionModelId::GeodesicX,
        MotionModelId::GeodesicY,
        MotionModelId::GeodesicZ,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: u8) -> Result<Self, ConfigError> {
        Self::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(ConfigError::UnknownModelId(index))
    }

    pub fn motion_plane(self) -> Option<MotionPlane> {
        match self {
            MotionModelId::MpaFrontBack => Some(MotionPlane::FrontBack),
            MotionModelId::MpaLeftRight => Some(MotionPlane::LeftRight),
            MotionModelId::MpaTopBottom => Some(MotionPlane::TopBottom),
            _ => None,
        }
    }

    pub fn is_geodesic(self) -> bool {
        matches!(
            self,
            MotionModelId::GeodesicCameraPose
                | MotionModelId::GeodesicX
                | MotionModelId::GeodesicY
                | MotionModelId::GeodesicZ
        )
    }

    /// Epipole of the axis-bound geodesic models.
    pub fn fixed_epipole(self) -> Option<Vec3> {
        match self {
            MotionModelId::GeodesicX => Some(Vec3::x()),
            MotionModelId::GeodesicY => Some(Vec3::y()),
            MotionModelId::GeodesicZ => Some(Vec3::z()),
            _ => None,
        }
    }
}

/// Optional motion models; the classic model is always active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActiveModels {
    pub mpa_front_back: bool,
    pub mpa_left_right: bool,
    pub mpa_top_bottom: bool,
    pub translational_3d: bool,
    pub tangential: bool,
    pub rotational: bool,
    pub geodesic_camera_pose: bool,
    pub geodesic_x: bool,
    pub geodesic_y: bool,
    pub geodesic_z: bool,
}

impl ActiveModels {
    pub fn all() -> Self {
        Self {
            mpa_front_back: true,
            mpa_left_right: true,
            mpa_top_bottom: true,
            translational_3d: true,
            tangential: true,
            rotational: true,
            geodesic_camera_pose: true,
            geodesic_x: true,
            geodesic_y: true,
            geodesic_z: true,
        }
    }

    pub fn contains(&self, id: MotionModelId) -> bool {
        match id {
            MotionModelId::Classic => true,
            MotionModelId::MpaFrontBack => self.mpa_front_back,
            MotionModelId::MpaLeftRight => self.mpa_left_right,
            MotionModelId::MpaTopBottom => self.mpa_top_bottom,
            MotionModelId::Translational3d => self.translational_3d,
            MotionModelId::Tangential => self.tangential,
            MotionModelId::Rotational => self.rotational,
            MotionModelId::GeodesicCameraPose => self.geodesic_camera_pose,
            MotionModelId::GeodesicX => self.geodesic_x,
            MotionModelId::GeodesicY => self.geodesic_y,
            MotionModelId::GeodesicZ => self.geodesic_z,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = MotionModelId> + '_ {
        MotionModelId::ALL
            .into_iter()
            .filter(move |id| self.contains(*id))
    }
}

/// Configuration of [`crate::ReprojectionEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReprojectionConfig {
    pub active: ActiveModels,
    pub geodesic_flavor: GeodesicFlavor,
    /// Position of the motion sample inside a 4x4 sub-block, see
    /// [`subblock_offset_value`].
    pub subblock_offset: u8,
}

impl Default for ReprojectionConfig {
    fn default() -> Self {
        Self {
            active: ActiveModels::default(),
            geodesic_flavor: GeodesicFlavor::default(),
            subblock_offset: 2,
        }
    }
}

impl ReprojectionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        subblock_offset_value(self.subblock_offset).map(|_| ())
    }
}

/// Sample offset of the sub-block motion position from its corner.
///
/// Offsets 0 to 3 are used as is; 4 selects the half-sample position 1.5.
pub fn subblock_offset_value(offset: u8) -> Result<Real, ConfigError> {
    match offset {
        0..=3 => Ok(Real::from(offset)),
        4 => Ok(1.5),
        _ => Err(ConfigError::InvalidSubblockOffset(offset)),
    }
}

//! JSON engine setup.

use anyhow::{ensure, Context, Result};
use log::debug;
use omnimv_core::{ProjectionParams, Real, Vec3};
use omnimv_motion::{EpipoleList, ANY_POC};
use omnimv_reproj::{LegacyReprojection, ReprojectionConfig, ReprojectionEngine};
use serde::{Deserialize, Serialize};

fn any_poc() -> i32 {
    ANY_POC
}

/// Initial entry of the epipole list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpipoleSeed {
    #[serde(default = "any_poc")]
    pub cur_poc: i32,
    #[serde(default = "any_poc")]
    pub ref_poc: i32,
    pub epipole: [Real; 3],
    #[serde(default)]
    pub available: bool,
}

/// Everything needed to build a reprojection engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineSetup {
    pub projection: ProjectionParams,
    /// Luma picture width.
    pub width: usize,
    /// Luma picture height.
    pub height: usize,
    #[serde(default)]
    pub reprojection: ReprojectionConfig,
    #[serde(default)]
    pub epipoles: Vec<EpipoleSeed>,
}

impl EngineSetup {
    pub fn epipole_list(&self) -> EpipoleList {
        let mut list = EpipoleList::new();
        for seed in &self.epipoles {
            list.add_epipole(
                &Vec3::from(seed.epipole),
                seed.cur_poc,
                seed.ref_poc,
                seed.available,
            );
        }
        list
    }

    pub fn build(&self) -> Result<ReprojectionEngine> {
        ReprojectionEngine::new(
            self.projection.build(),
            self.width,
            self.height,
            self.reprojection.clone(),
            self.epipole_list(),
        )
        .context("failed to build reprojection engine")
    }

    pub fn build_legacy(&self) -> Result<LegacyReprojection> {
        LegacyReprojection::new(
            self.projection.build(),
            self.width,
            self.height,
            self.reprojection.subblock_offset,
        )
        .context("failed to build legacy reprojection")
    }
}

/// Parse and validate an [`EngineSetup`] from JSON.
pub fn load_config(json: &str) -> Result<EngineSetup> {
    let setup: EngineSetup =
        serde_json::from_str(json).context("failed to parse reprojection setup")?;
    setup
        .reprojection
        .validate()
        .context("invalid reprojection configuration")?;
    match &setup.projection {
        ProjectionParams::Equisolid { focal_length, .. } => {
            ensure!(*focal_length > 0.0, "focal length must be positive");
        }
        ProjectionParams::Calibrated { coefficients, .. } => {
            ensure!(
                coefficients.get(1).is_some_and(|c| *c > 0.0),
                "calibrated polynomial needs a positive linear coefficient"
            );
        }
        ProjectionParams::Equirectangular { width, height, .. } => {
            ensure!(
                *width > 0.0 && *height > 0.0,
                "panorama size must be positive"
            );
        }
    }
    debug!(
        "loaded setup: {}x{} picture, {} epipole(s)",
        setup.width,
        setup.height,
        setup.epipoles.len()
    );
    Ok(setup)
}

//! World generation configuration.
//!
//! All sections have defaults, so a partial JSON document is enough:
//!
//! ```json
//! { "seed": 7, "terrain": { "size": [500.0, 500.0] }, "tree": { "iterations": 4 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::nature::TreeParams;
use crate::terrain::check_parameters;
use crate::{Error, Result};

/// Terrain construction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World extent along x and z.
    pub size: [f64; 2],
    /// Patch resolution; the patch grid spacing is `resolution * 64`.
    pub resolution: f64,
    /// Vertical scale applied by the renderer to sampled heights.
    pub height_scale: f64,
    /// Initial step length of the ray marcher.
    pub ray_step: f64,
    /// Maximum ray-march iterations.
    pub ray_max_steps: usize,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: [100.0, 100.0],
            resolution: 1.0,
            height_scale: 1.0,
            ray_step: 10.0,
            ray_max_steps: 1000,
        }
    }
}

impl TerrainConfig {
    pub fn validate(&self) -> Result<()> {
        check_parameters(self.size.into(), self.resolution)?;
        if !(self.ray_step.is_finite() && self.ray_step > 0.0) {
            return Err(Error::InvalidParameter(format!("ray step {} must be positive", self.ray_step)));
        }
        if !self.height_scale.is_finite() {
            return Err(Error::InvalidParameter(format!("height scale {} must be finite", self.height_scale)));
        }
        Ok(())
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub seed: u64,
    pub terrain: TerrainConfig,
    pub tree: TreeParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            terrain: TerrainConfig::default(),
            tree: TreeParams::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.terrain.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading world config");
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// src/catalog/bands.rs
use crate::catalog::search::SceneDescriptor;
use crate::error::{PipelineError, Result};
use crate::processing::scheduler::BandPair;

/// The red/NIR asset pair of a scene, keyed by the sensor family's
/// declared asset names. Selection is by explicit inspection of the
/// asset keys, not by string heuristics on the scene id.
#[derive(Debug, Clone, PartialEq)]
pub enum BandLayout {
    /// Landsat-style numbering: red = `B4`, NIR = `B5`.
    Landsat { red: String, nir: String },
    /// Sentinel-2-style numbering: red = `B04`, NIR = `B08`.
    Sentinel { red: String, nir: String },
}

impl BandLayout {
    /// Resolve the band layout from a scene's asset map, failing with a
    /// band-resolution error when neither pair is present.
    pub fn resolve(scene: &SceneDescriptor) -> Result<Self> {
        if let (Some(red), Some(nir)) = (scene.assets.get("B4"), scene.assets.get("B5")) {
            return Ok(BandLayout::Landsat {
                red: red.href.clone(),
                nir: nir.href.clone(),
            });
        }
        if let (Some(red), Some(nir)) = (scene.assets.get("B04"), scene.assets.get("B08")) {
            return Ok(BandLayout::Sentinel {
                red: red.href.clone(),
                nir: nir.href.clone(),
            });
        }
        Err(PipelineError::BandResolution {
            scene: scene.id.clone(),
        })
    }

    /// The resolved URLs in the order the tile tasks consume them.
    pub fn band_pair(self) -> BandPair {
        match self {
            BandLayout::Landsat { red, nir } | BandLayout::Sentinel { red, nir } => {
                BandPair::new(red, nir)
            }
        }
    }
}

// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::search::DEFAULT_CATALOG_URL;
use crate::error::{PipelineError, Result};

/// A catalog-driven job: what to search, how to tile, where to write.
///
/// Loaded from a JSON file or assembled from CLI flags; `validate()`
/// runs before any I/O so malformed input fails as a configuration
/// error, not mid-pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JobConfig {
    /// Bounding box as [west, south, east, north] in degrees.
    pub bbox: [f64; 4],

    /// One or two date or date-range strings (RFC 3339 or
    /// `start/end`). With one entry both timesteps search the same
    /// range.
    pub dates: Vec<String>,

    /// Optional STAC property filter, e.g. `eo:cloud_cover<10`.
    #[serde(default)]
    pub property: Option<String>,

    /// Physical tile width/height in map units. Absence selects the
    /// reference raster's intrinsic block grid.
    #[serde(default)]
    pub tile_width: Option<f64>,
    #[serde(default)]
    pub tile_height: Option<f64>,

    pub output: PathBuf,

    #[serde(default = "default_workers")]
    pub workers: usize,

    #[serde(default = "default_catalog")]
    pub catalog: String,
}

fn default_workers() -> usize {
    1
}

fn default_catalog() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

impl JobConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: JobConfig = serde_json::from_str(&content)
            .map_err(|e| PipelineError::Config(format!("parsing job config: {e}")))?;
        Ok(config)
    }

    /// The date string for each timestep.
    pub fn timestep_dates(&self) -> (&str, &str) {
        match self.dates.as_slice() {
            [single] => (single, single),
            [first, second, ..] => (first, second),
            [] => ("", ""),
        }
    }

    /// Custom tile size when configured, after validation.
    pub fn tile_size(&self) -> Option<(f64, f64)> {
        match (self.tile_width, self.tile_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let [west, south, east, north] = self.bbox;
        if !(-180.0..=180.0).contains(&west) || !(-180.0..=180.0).contains(&east) {
            return Err(PipelineError::Config(format!(
                "longitude out of range in bbox: {west}, {east}"
            )));
        }
        if !(-90.0..=90.0).contains(&south) || !(-90.0..=90.0).contains(&north) {
            return Err(PipelineError::Config(format!(
                "latitude out of range in bbox: {south}, {north}"
            )));
        }
        if west >= east || south >= north {
            return Err(PipelineError::Config(
                "bbox must be [west, south, east, north] with west < east and south < north"
                    .into(),
            ));
        }

        if self.dates.is_empty() || self.dates.len() > 2 {
            return Err(PipelineError::Config(format!(
                "expected one or two date strings, got {}",
                self.dates.len()
            )));
        }
        if self.dates.iter().any(|d| d.trim().is_empty()) {
            return Err(PipelineError::Config("empty date string".into()));
        }

        match (self.tile_width, self.tile_height) {
            (None, None) => {}
            (Some(w), Some(h)) => {
                if w <= 0.0 || h <= 0.0 {
                    return Err(PipelineError::Config(format!(
                        "tile size must be positive, got {w} x {h}"
                    )));
                }
            }
            _ => {
                return Err(PipelineError::Config(
                    "tile width and height must be given together".into(),
                ));
            }
        }

        if self.workers == 0 {
            return Err(PipelineError::Config("worker count must be at least 1".into()));
        }
        if self.output.as_os_str().is_empty() {
            return Err(PipelineError::Config("output path is empty".into()));
        }
        if self.catalog.trim().is_empty() {
            return Err(PipelineError::Config("catalog endpoint is empty".into()));
        }

        Ok(())
    }
}

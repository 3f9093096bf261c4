// src/error.rs
use thiserror::Error;

use crate::raster::window::Window;

/// Error kinds surfaced by the pipeline.
///
/// Everything except the boundary-read fallback in
/// `RasterSource::read_aligned` is fatal for the run: the first error
/// observed by the collecting thread aborts the job.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no scene found for '{datetime}' in the requested region")]
    Selection { datetime: String },

    #[error("no recognizable red/NIR asset pair on scene '{scene}'")]
    BandResolution { scene: String },

    #[error("shape mismatch in {context}: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
        context: &'static str,
    },

    #[error("window {0:?} lies outside the raster extent")]
    BoundaryRead(Window),

    #[error("catalog request failed: {0}")]
    Catalog(String),

    #[error("worker pool terminated before all tiles were reported")]
    WorkerPool,

    #[error(transparent)]
    Gdal(#[from] gdal::errors::GdalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

// src/raster/source.rs
use gdal::raster::{Buffer, ResampleAlg};
use gdal::Dataset;

use crate::error::{PipelineError, Result};
use crate::raster::window::{GeoTransform, Window};

/// Metadata snapshot of an opened raster band source.
///
/// Cheap to clone and `Send`, so the orchestrator can keep the reference
/// profile around after the dataset handle is dropped.
#[derive(Debug, Clone)]
pub struct RasterMeta {
    pub width: usize,
    pub height: usize,
    pub transform: GeoTransform,
    pub projection: String,
    pub band_count: usize,
    pub nodata: Option<f64>,
    pub block_size: (usize, usize),
}

impl RasterMeta {
    pub fn full_window(&self) -> Window {
        Window::full(self.width, self.height)
    }

    /// World-coordinate bounds as (left, top, right, bottom).
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let gt = &self.transform;
        let left = gt[0];
        let top = gt[3];
        let right = gt[0] + self.width as f64 * gt[1] + self.height as f64 * gt[2];
        let bottom = gt[3] + self.width as f64 * gt[4] + self.height as f64 * gt[5];
        (left, top, right, bottom)
    }
}

/// A single-band raster source opened for windowed reads.
///
/// Sources are task-local: a tile task opens, reads and drops its own
/// handles, so no locking is needed on the read side.
pub struct RasterSource {
    dataset: Dataset,
    meta: RasterMeta,
}

impl RasterSource {
    /// Open a local path or a remote URL. HTTP(S) URLs go through GDAL's
    /// `/vsicurl/` virtual filesystem for ranged reads.
    pub fn open(identifier: &str) -> Result<Self> {
        let gdal_name = if identifier.starts_with("http://") || identifier.starts_with("https://") {
            format!("/vsicurl/{identifier}")
        } else {
            identifier.to_string()
        };
        let dataset = Dataset::open(&gdal_name)?;
        let (width, height) = dataset.raster_size();
        let transform = dataset.geo_transform()?;
        let projection = dataset.projection();
        let band_count = dataset.raster_count();
        let band = dataset.rasterband(1)?;
        let nodata = band.no_data_value();
        let block_size = band.block_size();
        drop(band);

        Ok(Self {
            dataset,
            meta: RasterMeta {
                width,
                height,
                transform,
                projection,
                band_count,
                nodata,
                block_size,
            },
        })
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    /// Read a window of band 1 at native resolution.
    pub fn read(&self, window: &Window) -> Result<Buffer<f32>> {
        self.read_with(window, window.shape(), None)
    }

    /// Read a window of band 1 resampled to `target_shape` with bilinear
    /// interpolation.
    pub fn read_resampled(&self, window: &Window, target_shape: (usize, usize)) -> Result<Buffer<f32>> {
        self.read_with(window, target_shape, Some(ResampleAlg::Bilinear))
    }

    /// Resampled read with a boundary fallback for misaligned grids.
    ///
    /// When the two timesteps' rasters differ in size or alignment, a
    /// window valid on the reference raster can overrun this raster's
    /// trailing edge and GDAL refuses the read. The fallback clamps the
    /// window against this raster's full extent and retries once, still
    /// resampling to `target_shape` so the caller's shape contract holds.
    /// A window with no overlap at all is a `BoundaryRead` error.
    pub fn read_aligned(&self, window: &Window, target_shape: (usize, usize)) -> Result<Buffer<f32>> {
        match self.read_with(window, target_shape, Some(ResampleAlg::Bilinear)) {
            Ok(block) => Ok(block),
            Err(PipelineError::Gdal(err)) => {
                let clamped = window
                    .intersection(&self.meta.full_window())
                    .ok_or(PipelineError::BoundaryRead(*window))?;
                if clamped == *window {
                    // The window was inside the raster; the failure was real I/O.
                    return Err(PipelineError::Gdal(err));
                }
                log::debug!(
                    "boundary fallback: clamped {:?} to {:?}, resampling to {:?}",
                    window,
                    clamped,
                    target_shape
                );
                self.read_with(&clamped, target_shape, Some(ResampleAlg::Bilinear))
            }
            Err(err) => Err(err),
        }
    }

    fn read_with(
        &self,
        window: &Window,
        target_shape: (usize, usize),
        resampling: Option<ResampleAlg>,
    ) -> Result<Buffer<f32>> {
        let band = self.dataset.rasterband(1)?;
        let buffer = band.read_as::<f32>(
            (window.col_off, window.row_off),
            window.shape(),
            target_shape,
            resampling,
        )?;
        Ok(buffer)
    }
}

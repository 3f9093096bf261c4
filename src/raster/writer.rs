// src/raster/writer.rs
use std::path::Path;

use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{Dataset, DriverManager, DriverType, Metadata};

use crate::error::{PipelineError, Result};
use crate::processing::index::INVALID_INDEX;
use crate::raster::source::RasterMeta;
use crate::raster::window::Window;

/// Owns the destination raster for a run.
///
/// The profile is copied from the timestep-1 reference source with the
/// pixel type overridden to float32, created once before any task is
/// scheduled. Blocks are committed only from the collecting thread, so
/// writes are serialized without a lock.
pub struct OutputWriter {
    dataset: Dataset,
}

impl OutputWriter {
    pub fn create<P: AsRef<Path>>(path: P, reference: &RasterMeta) -> Result<Self> {
        let path = path.as_ref();
        let driver = DriverManager::get_output_driver_for_dataset_name(path, DriverType::Raster)
            .ok_or_else(|| {
                PipelineError::Config(format!("no raster driver for '{}'", path.display()))
            })?;

        let creation_options = RasterCreationOptions::from_iter([
            "COMPRESS=DEFLATE",
            "TILED=YES",
            "NUM_THREADS=ALL_CPUS",
        ]);

        let mut dataset = driver.create_with_band_type_with_options::<f32, _>(
            path,
            reference.width,
            reference.height,
            1,
            &creation_options,
        )?;

        dataset.set_projection(&reference.projection)?;
        dataset.set_geo_transform(&reference.transform)?;

        let mut band = dataset.rasterband(1)?;
        band.set_no_data_value(Some(INVALID_INDEX as f64))?;
        band.set_description("NDVI difference")?;
        drop(band);

        Ok(Self { dataset })
    }

    /// Commit one completed block at its originating window.
    pub fn write_block(&mut self, window: &Window, block: Buffer<f32>) -> Result<()> {
        if window.is_empty() {
            // Partitioner contract: zero-area windows are filtered before here.
            return Err(PipelineError::BoundaryRead(*window));
        }
        if block.shape() != window.shape() {
            return Err(PipelineError::ShapeMismatch {
                left: block.shape(),
                right: window.shape(),
                context: "output write",
            });
        }

        let mut band = self.dataset.rasterband(1)?;
        let mut buffer = block;
        band.write((window.col_off, window.row_off), window.shape(), &mut buffer)?;
        Ok(())
    }

    /// Flush and close the destination after the last window is written.
    pub fn finish(mut self) -> Result<()> {
        self.dataset.flush_cache()?;
        Ok(())
    }
}

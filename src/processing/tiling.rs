// src/processing/tiling.rs
use itertools::iproduct;

use crate::error::{PipelineError, Result};
use crate::raster::source::RasterMeta;
use crate::raster::window::{world_to_pixel, GeoTransform, Window};

/// Fallback stride when a driver reports no usable block size.
const DEFAULT_BLOCK: usize = 256;

/// How the reference raster is partitioned into tiles.
#[derive(Debug, Clone, Copy)]
pub enum TileGrid {
    /// The raster's intrinsic block grid; zero configuration.
    Intrinsic,
    /// Physical tile size in map units, converted to pixel strides.
    Custom { tile_width: f64, tile_height: f64 },
}

/// Produces a finite, restartable sequence of `(Window, GeoTransform)`
/// pairs covering the reference raster: pairwise disjoint, union equal
/// to the full extent, no zero-area windows.
#[derive(Debug)]
pub struct WindowPartitioner {
    meta: RasterMeta,
    grid: TileGrid,
}

impl WindowPartitioner {
    pub fn intrinsic(meta: RasterMeta) -> Self {
        Self {
            meta,
            grid: TileGrid::Intrinsic,
        }
    }

    pub fn custom(meta: RasterMeta, tile_width: f64, tile_height: f64) -> Result<Self> {
        if tile_width <= 0.0 || tile_height <= 0.0 {
            return Err(PipelineError::Config(format!(
                "tile size must be positive, got {tile_width} x {tile_height}"
            )));
        }
        Ok(Self {
            meta,
            grid: TileGrid::Custom {
                tile_width,
                tile_height,
            },
        })
    }

    pub fn meta(&self) -> &RasterMeta {
        &self.meta
    }

    /// Pixel strides for the configured grid.
    fn strides(&self) -> Result<(usize, usize)> {
        match self.grid {
            TileGrid::Intrinsic => {
                let (bx, by) = self.meta.block_size;
                let stride_x = if bx > 0 { bx } else { DEFAULT_BLOCK };
                let stride_y = if by > 0 { by } else { DEFAULT_BLOCK };
                Ok((stride_x.min(self.meta.width), stride_y.min(self.meta.height)))
            }
            TileGrid::Custom {
                tile_width,
                tile_height,
            } => {
                // Walk the tile size away from the origin corner and invert
                // the transform to find the equivalent pixel distance.
                let (left, top, _, _) = self.meta.bounds();
                let (col, row) = world_to_pixel(
                    &self.meta.transform,
                    left + tile_width,
                    top - tile_height,
                )
                .ok_or_else(|| {
                    PipelineError::Config("raster has a singular geo transform".into())
                })?;

                let stride_x = col.floor() as isize;
                let stride_y = row.floor() as isize;
                if stride_x < 1 || stride_y < 1 {
                    return Err(PipelineError::Config(format!(
                        "tile size {tile_width} x {tile_height} is smaller than one pixel"
                    )));
                }
                Ok((stride_x as usize, stride_y as usize))
            }
        }
    }

    /// Enumerate the tile windows with their per-window transforms.
    ///
    /// Each stride window is intersected against the full-extent window
    /// so edge tiles are clipped rather than overrun; the per-window
    /// transform keeps destination geocoding correct even though the
    /// output's global transform is set once at creation.
    pub fn windows(&self) -> Result<Vec<(Window, GeoTransform)>> {
        let (stride_x, stride_y) = self.strides()?;
        let big_window = self.meta.full_window();

        let tiles = iproduct!(
            (0..self.meta.width).step_by(stride_x),
            (0..self.meta.height).step_by(stride_y)
        )
        .filter_map(|(col_off, row_off)| {
            let window = Window::new(col_off as isize, row_off as isize, stride_x, stride_y);
            window.intersection(&big_window)
        })
        .map(|window| {
            let transform = window.transform(&self.meta.transform);
            (window, transform)
        })
        .collect();

        Ok(tiles)
    }
}

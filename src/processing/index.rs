// src/processing/index.rs
use gdal::raster::Buffer;
use rayon::prelude::*;

use crate::error::{PipelineError, Result};

/// Sentinel for pixels where the index is undefined (both bands
/// non-positive). Outside the valid NDVI range [-1, 1] and preserved
/// exactly so downstream consumers can recognize invalid cells.
pub const INVALID_INDEX: f32 = -2.0;

fn check_shapes(
    a: (usize, usize),
    b: (usize, usize),
    context: &'static str,
) -> Result<()> {
    if a != b {
        return Err(PipelineError::ShapeMismatch {
            left: a,
            right: b,
            context,
        });
    }
    Ok(())
}

/// Elementwise `(nir - red) / (nir + red)` in f32.
///
/// Cells where both operands are non-positive get [`INVALID_INDEX`]
/// instead of reaching the divide, so 0/0 is never evaluated. Cells
/// where only the sum happens to be zero follow IEEE semantics (inf or
/// NaN) without failing, matching the suppressed numpy warnings of the
/// original workflow. Output shape equals input shape.
pub fn normalized_difference(red: &Buffer<f32>, nir: &Buffer<f32>) -> Result<Buffer<f32>> {
    check_shapes(red.shape(), nir.shape(), "index operands")?;

    let shape = nir.shape();
    let red_data = red.data();
    let nir_data = nir.data();

    let mut result = vec![0.0f32; red_data.len()];
    result.par_iter_mut().enumerate().for_each(|(i, cell)| {
        let r = red_data[i];
        let n = nir_data[i];
        *cell = if r > 0.0 || n > 0.0 {
            (n - r) / (n + r)
        } else {
            INVALID_INDEX
        };
    });

    Ok(Buffer::new(shape, result))
}

/// Elementwise `a - b`; both operands must have identical shapes.
pub fn difference(a: &Buffer<f32>, b: &Buffer<f32>) -> Result<Buffer<f32>> {
    check_shapes(a.shape(), b.shape(), "difference operands")?;

    let shape = a.shape();
    let a_data = a.data();
    let b_data = b.data();

    let mut result = vec![0.0f32; a_data.len()];
    result.par_iter_mut().enumerate().for_each(|(i, cell)| {
        *cell = a_data[i] - b_data[i];
    });

    Ok(Buffer::new(shape, result))
}

/// Force cells that were invalid in either index block back to
/// [`INVALID_INDEX`] in the difference, so the output marks pixels that
/// were undefined in either timestep.
pub fn mask_invalid(delta: &mut Buffer<f32>, a: &Buffer<f32>, b: &Buffer<f32>) {
    let a_data = a.data();
    let b_data = b.data();
    delta
        .data_mut()
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, cell)| {
            if a_data[i] == INVALID_INDEX || b_data[i] == INVALID_INDEX {
                *cell = INVALID_INDEX;
            }
        });
}

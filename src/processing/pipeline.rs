// src/processing/pipeline.rs
use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::processing::scheduler::{BandPair, TileScheduler, TileTask};
use crate::processing::tiling::WindowPartitioner;
use crate::raster::source::RasterSource;
use crate::raster::writer::OutputWriter;

/// Process the raster pair block-by-block on the reference raster's
/// intrinsic block grid.
pub fn run_optimal<P: AsRef<Path>>(
    first: BandPair,
    second: BandPair,
    output: P,
    workers: usize,
) -> Result<()> {
    let meta = reference_meta(&first)?;
    let partitioner = WindowPartitioner::intrinsic(meta);
    run(first, second, output, partitioner, workers)
}

/// Process the raster pair with a caller-specified physical tile size
/// (map units, converted to pixels against the reference grid).
pub fn run_custom<P: AsRef<Path>>(
    first: BandPair,
    second: BandPair,
    output: P,
    tile_width: f64,
    tile_height: f64,
    workers: usize,
) -> Result<()> {
    let meta = reference_meta(&first)?;
    let partitioner = WindowPartitioner::custom(meta, tile_width, tile_height)?;
    run(first, second, output, partitioner, workers)
}

fn reference_meta(first: &BandPair) -> Result<crate::raster::source::RasterMeta> {
    // The timestep-1 red band is the reference for the output profile
    // and for tiling; the handle is dropped before scheduling starts.
    let reference = RasterSource::open(&first.red)?;
    Ok(reference.meta().clone())
}

fn run<P: AsRef<Path>>(
    first: BandPair,
    second: BandPair,
    output: P,
    partitioner: WindowPartitioner,
    workers: usize,
) -> Result<()> {
    let tiles = partitioner.windows()?;
    log::info!(
        "processing {} tiles with {} worker(s) -> {}",
        tiles.len(),
        workers.max(1),
        output.as_ref().display()
    );

    let mut writer = OutputWriter::create(output.as_ref(), partitioner.meta())?;

    let first = Arc::new(first);
    let second = Arc::new(second);
    let tasks: Vec<TileTask> = tiles
        .into_iter()
        .filter(|(window, _)| !window.is_empty())
        .map(|(window, _)| TileTask {
            window,
            first: Arc::clone(&first),
            second: Arc::clone(&second),
        })
        .collect();

    let scheduler = TileScheduler::new(workers);
    scheduler.run(tasks, |window, block| writer.write_block(&window, block))?;

    writer.finish()
}

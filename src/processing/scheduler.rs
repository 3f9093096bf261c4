// src/processing/scheduler.rs
use std::sync::Arc;
use std::thread;

use gdal::raster::Buffer;

use crate::error::{PipelineError, Result};
use crate::processing::index::{difference, mask_invalid, normalized_difference};
use crate::raster::source::RasterSource;
use crate::raster::window::Window;

/// Red and near-infrared band sources for one timestep.
#[derive(Debug, Clone)]
pub struct BandPair {
    pub red: String,
    pub nir: String,
}

impl BandPair {
    pub fn new(red: impl Into<String>, nir: impl Into<String>) -> Self {
        Self {
            red: red.into(),
            nir: nir.into(),
        }
    }
}

/// One unit of concurrent work: a window plus the four band sources it
/// needs. Consumed exactly once, producing one difference block or a
/// failure.
pub struct TileTask {
    pub window: Window,
    pub first: Arc<BandPair>,
    pub second: Arc<BandPair>,
}

impl TileTask {
    /// Compute the index difference for this tile.
    ///
    /// All four handles are opened and dropped inside this call; nothing
    /// is shared across tasks, so workers need no read-side locking.
    /// Timestep-2 reads are resampled to the timestep-1 block's shape,
    /// with the boundary fallback for misaligned trailing edges.
    pub fn run(&self) -> Result<Buffer<f32>> {
        let red_a = RasterSource::open(&self.first.red)?.read(&self.window)?;
        let nir_a = RasterSource::open(&self.first.nir)?.read(&self.window)?;
        let index_a = normalized_difference(&red_a, &nir_a)?;

        let target_shape = red_a.shape();
        let red_b = RasterSource::open(&self.second.red)?.read_aligned(&self.window, target_shape)?;
        let nir_b = RasterSource::open(&self.second.nir)?.read_aligned(&self.window, target_shape)?;
        let index_b = normalized_difference(&red_b, &nir_b)?;

        let mut delta = difference(&index_a, &index_b)?;
        mask_invalid(&mut delta, &index_a, &index_b);
        Ok(delta)
    }
}

/// Fixed-size worker pool: one submitted task per window, results
/// collected in completion order.
pub struct TileScheduler {
    workers: usize,
}

impl TileScheduler {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Submit all tasks, then invoke `on_complete` from the calling
    /// thread for each finished tile as it arrives.
    ///
    /// Fail-fast: the first task error (or `on_complete` error) aborts
    /// collection and propagates. Remaining results are abandoned;
    /// workers notice the closed result channel and exit without being
    /// cancelled mid-read.
    pub fn run<F>(&self, tasks: Vec<TileTask>, mut on_complete: F) -> Result<()>
    where
        F: FnMut(Window, Buffer<f32>) -> Result<()>,
    {
        let total = tasks.len();
        let (task_tx, task_rx) = flume::unbounded::<TileTask>();
        let (result_tx, result_rx) = flume::unbounded::<(Window, Result<Buffer<f32>>)>();

        let mut workers = Vec::with_capacity(self.workers);
        for _ in 0..self.workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            workers.push(thread::spawn(move || {
                for task in task_rx {
                    let outcome = task.run();
                    if result_tx.send((task.window, outcome)).is_err() {
                        // Collector is gone; the job already failed.
                        break;
                    }
                }
            }));
        }
        drop(task_rx);
        drop(result_tx);

        for task in tasks {
            task_tx.send(task).map_err(|_| PipelineError::WorkerPool)?;
        }
        drop(task_tx);

        let mut completed = 0usize;
        for (window, outcome) in result_rx.iter() {
            let block = outcome?;
            on_complete(window, block)?;
            completed += 1;
            log::debug!("tile {:?} committed ({completed}/{total})", window);
        }

        if completed != total {
            // A worker died without reporting its tile.
            return Err(PipelineError::WorkerPool);
        }

        for worker in workers {
            worker.join().map_err(|_| PipelineError::WorkerPool)?;
        }
        Ok(())
    }
}

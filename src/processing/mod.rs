// src/processing/mod.rs
pub mod index;
pub mod pipeline;
pub mod scheduler;
pub mod tiling;

pub use pipeline::{run_custom, run_optimal};
pub use scheduler::{BandPair, TileScheduler, TileTask};
pub use tiling::{TileGrid, WindowPartitioner};

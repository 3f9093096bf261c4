// src/raster/mod.rs
pub mod source;
pub mod window;
pub mod writer;

pub use source::{RasterMeta, RasterSource};
pub use window::{GeoTransform, Window};
pub use writer::OutputWriter;

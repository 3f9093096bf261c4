// src/lib.rs
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod processing;
pub mod raster;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

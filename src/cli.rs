use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ndvi-delta")]
#[command(about = "Tiled, concurrent NDVI change detection between two dates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output raster path
    #[arg(short, long, default_value = "ndvi_difference.tif", global = true)]
    pub output: PathBuf,

    /// Worker thread count (0 = one per CPU)
    #[arg(short = 'j', long, default_value = "1", global = true)]
    pub workers: usize,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search a STAC catalog for the clearest scene per date and
    /// process the difference of their NDVI
    Search {
        /// Bounding box: west south east north (degrees)
        #[arg(long, num_args = 4, allow_negative_numbers = true)]
        bbox: Vec<f64>,

        /// One or two dates or date ranges (e.g. 2019-06-01/2019-06-30)
        #[arg(short, long, num_args = 1..=2)]
        date: Vec<String>,

        /// STAC property filter, e.g. 'eo:cloud_cover<10'
        #[arg(short, long)]
        property: Option<String>,

        /// Tile width in map units (with --tile-height selects custom tiling)
        #[arg(long)]
        tile_width: Option<f64>,

        /// Tile height in map units
        #[arg(long)]
        tile_height: Option<f64>,

        /// STAC API endpoint
        #[arg(long, default_value = crate::catalog::DEFAULT_CATALOG_URL)]
        catalog: String,

        /// Read the whole job from a JSON config file instead of flags
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Process local (or already-resolved) band files directly,
    /// skipping the catalog
    Local {
        /// Red band of timestep 1
        #[arg(long)]
        red1: String,

        /// NIR band of timestep 1
        #[arg(long)]
        nir1: String,

        /// Red band of timestep 2
        #[arg(long)]
        red2: String,

        /// NIR band of timestep 2
        #[arg(long)]
        nir2: String,

        /// Tile width in map units
        #[arg(long)]
        tile_width: Option<f64>,

        /// Tile height in map units
        #[arg(long)]
        tile_height: Option<f64>,
    },
}

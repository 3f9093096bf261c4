// src/main.rs
use anyhow::Result;
use clap::Parser;

mod catalog;
mod cli;
mod config;
mod error;
mod processing;
mod raster;

use crate::catalog::{select_scene, BandLayout, CatalogClient, SearchQuery};
use crate::cli::{Cli, Commands};
use crate::config::JobConfig;
use crate::error::PipelineError;
use crate::processing::{run_custom, run_optimal, BandPair};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let workers = if cli.workers == 0 {
        num_cpus::get()
    } else {
        cli.workers
    };

    match cli.command {
        Commands::Search {
            bbox,
            date,
            property,
            tile_width,
            tile_height,
            catalog,
            config,
        } => {
            let job = match config {
                Some(path) => JobConfig::from_file(path)?,
                None => JobConfig {
                    bbox: parse_bbox(&bbox)?,
                    dates: date,
                    property,
                    tile_width,
                    tile_height,
                    output: cli.output.clone(),
                    workers,
                    catalog,
                },
            };
            job.validate()?;
            run_search_job(&job)?;
            println!("Processing complete: {}", job.output.display());
        }
        Commands::Local {
            red1,
            nir1,
            red2,
            nir2,
            tile_width,
            tile_height,
        } => {
            let first = BandPair::new(red1, nir1);
            let second = BandPair::new(red2, nir2);
            match (tile_width, tile_height) {
                (Some(w), Some(h)) => run_custom(first, second, &cli.output, w, h, workers)?,
                (None, None) => run_optimal(first, second, &cli.output, workers)?,
                _ => {
                    return Err(PipelineError::Config(
                        "tile width and height must be given together".into(),
                    )
                    .into())
                }
            }
            println!("Processing complete: {}", cli.output.display());
        }
    }

    Ok(())
}

fn parse_bbox(values: &[f64]) -> std::result::Result<[f64; 4], PipelineError> {
    match values {
        [w, s, e, n] => Ok([*w, *s, *e, *n]),
        _ => Err(PipelineError::Config(
            "a bounding box (--bbox west south east north) is required without --config".into(),
        )),
    }
}

fn run_search_job(job: &JobConfig) -> std::result::Result<(), PipelineError> {
    let client = CatalogClient::new(&job.catalog)?;
    let (date1, date2) = job.timestep_dates();

    let first = resolve_timestep(&client, job, date1)?;
    let second = resolve_timestep(&client, job, date2)?;

    match job.tile_size() {
        Some((w, h)) => run_custom(first, second, &job.output, w, h, job.workers),
        None => run_optimal(first, second, &job.output, job.workers),
    }
}

fn resolve_timestep(
    client: &CatalogClient,
    job: &JobConfig,
    datetime: &str,
) -> std::result::Result<BandPair, PipelineError> {
    let query = SearchQuery::new(job.bbox, datetime, job.property.as_deref())?;
    let scenes = client.search(&query)?;
    let scene = select_scene(scenes, datetime)?;
    log::info!(
        "selected scene {} (cloud cover {:?}) for '{datetime}'",
        scene.id,
        scene.properties.cloud_cover
    );
    Ok(BandLayout::resolve(&scene)?.band_pair())
}

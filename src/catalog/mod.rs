// src/catalog/mod.rs
pub mod bands;
pub mod search;

pub use bands::BandLayout;
pub use search::{select_scene, CatalogClient, SceneDescriptor, SearchQuery, DEFAULT_CATALOG_URL};

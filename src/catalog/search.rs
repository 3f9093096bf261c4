// src/catalog/search.rs
use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{PipelineError, Result};

pub const DEFAULT_CATALOG_URL: &str = "https://earth-search.aws.element84.com/v1";

/// Body for STAC `POST /search` (Item Search).
#[derive(Debug, Clone, Serialize)]
pub struct SearchQuery {
    pub bbox: [f64; 4],
    pub datetime: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    pub sortby: Vec<SortSpec>,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: String,
}

impl SearchQuery {
    /// A query for the given region and date (or date range), sorted by
    /// cloud cover ascending so the first result is the clearest scene.
    pub fn new(bbox: [f64; 4], datetime: &str, property: Option<&str>) -> Result<Self> {
        let query = property.map(compile_property_filter).transpose()?;
        Ok(Self {
            bbox,
            datetime: datetime.to_string(),
            query,
            sortby: vec![SortSpec {
                field: "properties.eo:cloud_cover".to_string(),
                direction: "asc".to_string(),
            }],
            limit: 50,
        })
    }
}

/// Compile a `key op value` filter expression into the STAC `query`
/// extension object, e.g. `eo:cloud_cover<5` becomes
/// `{"eo:cloud_cover": {"lt": 5.0}}`.
pub fn compile_property_filter(expression: &str) -> Result<Value> {
    let operators = [("<=", "lte"), (">=", "gte"), ("<", "lt"), (">", "gt"), ("=", "eq")];

    for (symbol, stac_op) in operators {
        if let Some(pos) = expression.find(symbol) {
            let key = expression[..pos].trim();
            let raw = expression[pos + symbol.len()..].trim();
            if key.is_empty() || raw.is_empty() {
                break;
            }
            let value: Value = match raw.parse::<f64>() {
                Ok(num) => json!(num),
                Err(_) => json!(raw),
            };
            return Ok(json!({ key: { stac_op: value } }));
        }
    }

    Err(PipelineError::Config(format!(
        "unparseable property filter '{expression}' (expected 'key<op>value')"
    )))
}

/// One satellite acquisition as returned by the catalog: identity,
/// acquisition properties and the asset href map the band resolver
/// inspects.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescriptor {
    pub id: String,
    pub properties: SceneProperties,
    pub assets: HashMap<String, SceneAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneProperties {
    pub datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneAsset {
    pub href: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    features: Vec<SceneDescriptor>,
}

/// Blocking STAC Item Search client.
pub struct CatalogClient {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl CatalogClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::Catalog(format!("building HTTP client: {e}")))?;
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Ok(Self { endpoint, client })
    }

    /// Execute an item search, returning scenes in the catalog's sort
    /// order (cloud cover ascending for queries built by [`SearchQuery`]).
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SceneDescriptor>> {
        let url = format!("{}/search", self.endpoint);
        log::debug!("STAC search {} datetime={}", url, query.datetime);

        let response = self
            .client
            .post(&url)
            .json(query)
            .send()
            .map_err(|e| PipelineError::Catalog(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(PipelineError::Catalog(format!(
                "search returned HTTP {status}: {}",
                body.chars().take(300).collect::<String>()
            )));
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| PipelineError::Catalog(format!("parsing search response: {e}")))?;
        Ok(parsed.features)
    }
}

/// Pick the scene for one timestep: the first (clearest) result, or a
/// selection error when the catalog returned nothing.
pub fn select_scene(scenes: Vec<SceneDescriptor>, datetime: &str) -> Result<SceneDescriptor> {
    scenes
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::Selection {
            datetime: datetime.to_string(),
        })
}

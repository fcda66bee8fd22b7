//! Geoapify Places API adapter for category search.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::{optional_u64, require_var};
use crate::error::{ConfigError, ProviderError};
use crate::traits::{PlaceResult, PlacesSearch};
use crate::types::Coordinates;

const SERVICE: &str = "geoapify";

#[derive(Debug, Clone)]
pub struct GeoapifyConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for GeoapifyConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.geoapify.com".to_string(),
            api_key: String::new(),
            timeout_secs: 8,
        }
    }
}

impl GeoapifyConfig {
    /// Reads `GEOAPIFY_API_KEY` and optionally `GEOAPIFY_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            api_key: require_var("GEOAPIFY_API_KEY")?,
            ..Self::default()
        };
        if let Some(timeout) = optional_u64("GEOAPIFY_TIMEOUT_SECS")? {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct GeoapifyClient {
    config: GeoapifyConfig,
    client: reqwest::blocking::Client,
}

impl GeoapifyClient {
    pub fn new(config: GeoapifyConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Client configured from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(GeoapifyConfig::from_env()?)?)
    }
}

impl PlacesSearch for GeoapifyClient {
    fn search(
        &self,
        origin: Coordinates,
        category_tags: &[&str],
        result_limit: usize,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        let url = format!("{}/v2/places", self.config.base_url);
        let categories = category_tags.join(",");
        let bias = format!("proximity:{:.6},{:.6}", origin.longitude, origin.latitude);
        let limit = result_limit.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("categories", categories.as_str()),
                ("bias", bias.as_str()),
                ("limit", limit.as_str()),
                ("apiKey", self.config.api_key.as_str()),
            ])
            .send()
            .map_err(|source| ProviderError::Http {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::UnexpectedStatus {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(|source| ProviderError::Http {
            service: SERVICE,
            source,
        })?;

        let places = parse_places(&body, &categories)?;
        debug!(categories = %categories, results = places.len(), "geoapify places");
        Ok(places)
    }
}

fn parse_places(body: &str, categories: &str) -> Result<Vec<PlaceResult>, ProviderError> {
    let collection: FeatureCollection =
        serde_json::from_str(body).map_err(|source| ProviderError::Deserialize {
            context: format!("geoapify places for {categories}"),
            source,
        })?;

    Ok(collection
        .features
        .into_iter()
        .filter_map(|feature| {
            let props = feature.properties;
            let (latitude, longitude) = match (props.lat, props.lon) {
                (Some(lat), Some(lon)) => (lat, lon),
                _ => feature.geometry.and_then(|g| g.point())?,
            };
            Some(PlaceResult {
                name: props.name.filter(|n| !n.trim().is_empty()),
                coordinates: Coordinates::new(latitude, longitude),
                source_id: props.place_id,
                category_tags: props.categories,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
    #[serde(default)]
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Properties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    place_id: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(default)]
    coordinates: Vec<f64>,
}

impl Geometry {
    /// GeoJSON points are `[lon, lat]`.
    fn point(&self) -> Option<(f64, f64)> {
        match self.coordinates.as_slice() {
            [lon, lat, ..] => Some((*lat, *lon)),
            _ => None,
        }
    }
}

//! Google Maps web-service adapters: geocoding, text search and the
//! distance matrix.

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::{optional_u64, require_var};
use crate::error::{ConfigError, ProviderError};
use crate::traits::{Geocoder, RoutedDistanceProvider, TextPlaceResult, TextPlaceSearch};
use crate::types::{Coordinates, DestinationTarget, Origin, RefinedDistance};

const SERVICE: &str = "google maps";

#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    /// Sent as `traffic_model` on distance-matrix requests.
    pub traffic_model: String,
    /// Route from the origin's address instead of its coordinates when the
    /// address is known.
    pub route_from_address: bool,
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
            traffic_model: "best_guess".to_string(),
            route_from_address: false,
        }
    }
}

impl GoogleMapsConfig {
    /// Reads `GOOGLE_MAPS_API_KEY` and optionally `GOOGLE_MAPS_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self {
            api_key: require_var("GOOGLE_MAPS_API_KEY")?,
            ..Self::default()
        };
        if let Some(timeout) = optional_u64("GOOGLE_MAPS_TIMEOUT_SECS")? {
            config.timeout_secs = timeout;
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    config: GoogleMapsConfig,
    client: reqwest::blocking::Client,
}

impl GoogleMapsClient {
    pub fn new(config: GoogleMapsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    /// Client configured from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(GoogleMapsConfig::from_env()?)?)
    }

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
        context: &str,
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
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
        decode(&body, context)
    }
}

fn decode<T: DeserializeOwned>(body: &str, context: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|source| ProviderError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// `OK` and `ZERO_RESULTS` are both successes.
fn check_status(status: &str) -> Result<(), ProviderError> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ProviderError::Service {
            service: SERVICE,
            status: other.to_string(),
        }),
    }
}

fn lat_lng(point: Coordinates) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

impl Geocoder for GoogleMapsClient {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError> {
        let response: GeocodeResponse = self.get(
            "/maps/api/geocode/json",
            &[("address", address)],
            "geocode response",
        )?;
        geocode_result(response)
    }
}

fn geocode_result(response: GeocodeResponse) -> Result<Option<Coordinates>, ProviderError> {
    check_status(&response.status)?;
    Ok(response
        .results
        .into_iter()
        .next()
        .map(|result| result.geometry.location.into()))
}

impl TextPlaceSearch for GoogleMapsClient {
    fn search_text(
        &self,
        origin: Coordinates,
        query: &str,
        radius_meters: u32,
    ) -> Result<Vec<TextPlaceResult>, ProviderError> {
        let location = lat_lng(origin);
        let radius = radius_meters.to_string();
        let response: TextSearchResponse = self.get(
            "/maps/api/place/textsearch/json",
            &[
                ("query", query),
                ("location", location.as_str()),
                ("radius", radius.as_str()),
            ],
            "text search response",
        )?;
        let results = text_results(response)?;
        debug!(query, results = results.len(), "google text search");
        Ok(results)
    }
}

fn text_results(response: TextSearchResponse) -> Result<Vec<TextPlaceResult>, ProviderError> {
    check_status(&response.status)?;
    Ok(response
        .results
        .into_iter()
        .map(|place| TextPlaceResult {
            name: place.name.unwrap_or_default(),
            address: place.formatted_address,
            coordinates: place.geometry.location.into(),
            place_id: place.place_id,
        })
        .collect())
}

impl RoutedDistanceProvider for GoogleMapsClient {
    fn distance_matrix(
        &self,
        origin: &Origin,
        destinations: &[DestinationTarget],
        departure_unix: i64,
    ) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
        if destinations.is_empty() {
            return Ok(Vec::new());
        }

        let params = matrix_params(
            &origin_param(origin, self.config.route_from_address),
            destinations,
            departure_unix,
            &self.config.traffic_model,
        );
        let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let response: MatrixResponse =
            self.get("/maps/api/distancematrix/json", &params, "distance matrix response")?;
        matrix_row(response, destinations.len())
    }
}

/// Coordinates unless the address is preferred and known. Unusable
/// coordinates fall back to the address.
fn origin_param(origin: &Origin, prefer_address: bool) -> String {
    match origin.address.as_deref() {
        Some(address) if prefer_address || !origin.coordinates.is_valid() => address.to_string(),
        _ => lat_lng(origin.coordinates),
    }
}

fn matrix_params(
    origin: &str,
    destinations: &[DestinationTarget],
    departure_unix: i64,
    traffic_model: &str,
) -> Vec<(&'static str, String)> {
    let targets = destinations
        .iter()
        .map(|target| match target {
            DestinationTarget::Coordinates(point) => lat_lng(*point),
            DestinationTarget::Address(address) => address.clone(),
        })
        .collect::<Vec<_>>()
        .join("|");

    vec![
        ("origins", origin.to_string()),
        ("destinations", targets),
        ("mode", "driving".to_string()),
        ("departure_time", departure_unix.to_string()),
        ("traffic_model", traffic_model.to_string()),
    ]
}

fn matrix_row(
    response: MatrixResponse,
    expected: usize,
) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
    check_status(&response.status)?;
    let elements = response
        .rows
        .into_iter()
        .next()
        .map(|row| row.elements)
        .unwrap_or_default();

    if elements.len() != expected {
        return Err(ProviderError::Misaligned {
            service: SERVICE,
            expected,
            actual: elements.len(),
        });
    }

    Ok(elements
        .into_iter()
        .map(|element| {
            if element.status != "OK" {
                return None;
            }
            let distance = element.distance?;
            let duration = element.duration_in_traffic.or(element.duration)?;
            Some(RefinedDistance {
                distance_meters: distance.value,
                duration_seconds: duration.value,
            })
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl From<LatLng> for Coordinates {
    fn from(value: LatLng) -> Self {
        Coordinates::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
struct PlaceGeometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: PlaceGeometry,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<TextSearchPlace>,
}

#[derive(Debug, Deserialize)]
struct TextSearchPlace {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted_address: Option<String>,
    geometry: PlaceGeometry,
    #[serde(default)]
    place_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    distance: Option<ValueField>,
    #[serde(default)]
    duration: Option<ValueField>,
    #[serde(default)]
    duration_in_traffic: Option<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: u64,
}

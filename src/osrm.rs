//! OSRM HTTP adapter for routed distances.
//!
//! Uses the `table` service with the origin as the only source. OSRM has no
//! traffic model, so the departure time is ignored. Address destinations
//! cannot be routed and come back as `None`.

use serde::Deserialize;

use crate::error::ProviderError;
use crate::traits::RoutedDistanceProvider;
use crate::types::{Coordinates, DestinationTarget, Origin, RefinedDistance};

const SERVICE: &str = "osrm";

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self, points: &[Coordinates]) -> String {
        let coords = points
            .iter()
            .map(|p| format!("{:.6},{:.6}", p.longitude, p.latitude))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/table/v1/{}/{}?sources=0&annotations=distance,duration",
            self.config.base_url, self.config.profile, coords
        )
    }
}

impl RoutedDistanceProvider for OsrmClient {
    fn distance_matrix(
        &self,
        origin: &Origin,
        destinations: &[DestinationTarget],
        _departure_unix: i64,
    ) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
        let routable: Vec<(usize, Coordinates)> = destinations
            .iter()
            .enumerate()
            .filter_map(|(index, target)| match target {
                DestinationTarget::Coordinates(point) => Some((index, *point)),
                DestinationTarget::Address(_) => None,
            })
            .collect();

        let mut results = vec![None; destinations.len()];
        if routable.is_empty() {
            return Ok(results);
        }

        let mut points = Vec::with_capacity(routable.len() + 1);
        points.push(origin.coordinates);
        points.extend(routable.iter().map(|(_, point)| *point));

        let response = self
            .client
            .get(self.table_url(&points))
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

        let row = parse_table(&body, points.len())?;
        for ((index, _), element) in routable.iter().zip(row.into_iter().skip(1)) {
            results[*index] = element;
        }
        Ok(results)
    }
}

/// Decode the first row of a table response into per-column distances.
fn parse_table(body: &str, columns: usize) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
    let table: OsrmTableResponse =
        serde_json::from_str(body).map_err(|source| ProviderError::Deserialize {
            context: "OSRM table response".to_string(),
            source,
        })?;

    if table.code != "Ok" {
        return Err(ProviderError::Service {
            service: SERVICE,
            status: table.code,
        });
    }

    let distances = table.distances.and_then(|rows| rows.into_iter().next()).unwrap_or_default();
    let durations = table.durations.and_then(|rows| rows.into_iter().next()).unwrap_or_default();
    if distances.len() != columns || durations.len() != columns {
        return Err(ProviderError::Misaligned {
            service: SERVICE,
            expected: columns,
            actual: distances.len().min(durations.len()),
        });
    }

    Ok(distances
        .into_iter()
        .zip(durations)
        .map(|(distance, duration)| match (distance, duration) {
            (Some(distance), Some(duration)) => Some(RefinedDistance {
                distance_meters: distance.round() as u64,
                duration_seconds: duration.round() as u64,
            }),
            _ => None,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    code: String,
    distances: Option<Vec<Vec<Option<f64>>>>,
    durations: Option<Vec<Vec<Option<f64>>>>,
}

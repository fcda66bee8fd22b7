//! Great-circle distance and an offline distance estimator.
//!
//! Haversine distance is used to rank and truncate candidate pools before
//! the routed-distance step. It ignores roads, so it is a sort key only.

use std::cmp::Ordering;

use crate::error::ProviderError;
use crate::traits::RoutedDistanceProvider;
use crate::types::{Coordinates, DestinationTarget, Origin, Ranked, RefinedDistance};

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Straight-line road factor applied by the estimator.
const DEFAULT_DETOUR_FACTOR: f64 = 1.3;

/// Great-circle distance between two points in meters.
pub fn distance_meters(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Annotate items with their distance from `origin` and sort ascending.
///
/// Ties keep input order.
pub fn rank<T, F>(origin: Coordinates, items: Vec<T>, coordinates_of: F) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> Coordinates,
{
    let mut ranked: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let approximate_distance_meters = distance_meters(origin, coordinates_of(&item));
            Ranked {
                item,
                approximate_distance_meters,
            }
        })
        .collect();
    sort_ranked(&mut ranked);
    ranked
}

pub fn sort_ranked<T>(ranked: &mut [Ranked<T>]) {
    ranked.sort_by(|a, b| {
        a.approximate_distance_meters
            .partial_cmp(&b.approximate_distance_meters)
            .unwrap_or(Ordering::Equal)
    });
}

/// Routed-distance stand-in that never leaves the process.
///
/// Scales the great-circle distance by a detour factor and derives a
/// duration from an assumed speed. Address destinations cannot be placed
/// and come back as `None`.
#[derive(Debug, Clone)]
pub struct HaversineEstimator {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    pub detour_factor: f64,
}

impl Default for HaversineEstimator {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            detour_factor: DEFAULT_DETOUR_FACTOR,
        }
    }
}

impl HaversineEstimator {
    pub fn new(speed_kmh: f64, detour_factor: f64) -> Self {
        Self {
            speed_kmh,
            detour_factor,
        }
    }

    fn meters_to_seconds(&self, meters: f64) -> u64 {
        let hours = meters / 1000.0 / self.speed_kmh;
        (hours * 3600.0).round() as u64
    }
}

impl RoutedDistanceProvider for HaversineEstimator {
    fn distance_matrix(
        &self,
        origin: &Origin,
        destinations: &[DestinationTarget],
        _departure_unix: i64,
    ) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
        Ok(destinations
            .iter()
            .map(|target| match target {
                DestinationTarget::Coordinates(point) => {
                    let meters = distance_meters(origin.coordinates, *point) * self.detour_factor;
                    Some(RefinedDistance {
                        distance_meters: meters.round() as u64,
                        duration_seconds: self.meters_to_seconds(meters),
                    })
                }
                DestinationTarget::Address(_) => None,
            })
            .collect())
    }
}

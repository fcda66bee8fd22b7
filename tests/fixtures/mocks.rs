//! In-memory collaborators for driving the engine without a network.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use amenity_proximity::error::ProviderError;
use amenity_proximity::traits::{
    Geocoder, PlaceResult, PlacesSearch, RoutedDistanceProvider, TextPlaceResult, TextPlaceSearch,
};
use amenity_proximity::types::{Coordinates, DestinationTarget, Origin, RefinedDistance};

use super::Location;

/// Returns every stored place carrying one of the requested tags.
///
/// Searches whose tags include one of `failing_tags` fail instead.
#[derive(Debug, Default)]
pub struct MockPlaces {
    pub places: Vec<PlaceResult>,
    pub failing_tags: Vec<&'static str>,
}

impl MockPlaces {
    pub fn new(locations: &[Location]) -> Self {
        Self {
            places: locations.iter().map(Location::to_place).collect(),
            failing_tags: Vec::new(),
        }
    }

    pub fn failing(mut self, tag: &'static str) -> Self {
        self.failing_tags.push(tag);
        self
    }
}

impl PlacesSearch for MockPlaces {
    fn search(
        &self,
        _origin: Coordinates,
        category_tags: &[&str],
        result_limit: usize,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        if category_tags.iter().any(|tag| self.failing_tags.contains(tag)) {
            return Err(ProviderError::UnexpectedStatus {
                service: "mock places",
                status: 503,
            });
        }
        Ok(self
            .places
            .iter()
            .filter(|place| {
                place
                    .category_tags
                    .iter()
                    .any(|tag| category_tags.contains(&tag.as_str()))
            })
            .take(result_limit)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MockTextSearch {
    pub results: Vec<TextPlaceResult>,
    pub fail: bool,
}

impl TextPlaceSearch for MockTextSearch {
    fn search_text(
        &self,
        _origin: Coordinates,
        _query: &str,
        _radius_meters: u32,
    ) -> Result<Vec<TextPlaceResult>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Other("text search offline".to_string()));
        }
        Ok(self.results.clone())
    }
}

/// Routed distances looked up by destination coordinates.
///
/// Unknown destinations are unroutable. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockDistances {
    table: Vec<(Coordinates, RefinedDistance)>,
    pub fail_calls: Vec<usize>,
    pub calls: Mutex<Vec<usize>>,
}

impl MockDistances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, at: Coordinates, distance_meters: u64, duration_seconds: u64) -> Self {
        self.table.push((
            at,
            RefinedDistance {
                distance_meters,
                duration_seconds,
            },
        ));
        self
    }

    /// Fail the `index`th call (zero-based).
    pub fn failing_call(mut self, index: usize) -> Self {
        self.fail_calls.push(index);
        self
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn lookup(&self, target: &DestinationTarget) -> Option<RefinedDistance> {
        match target {
            DestinationTarget::Coordinates(point) => self
                .table
                .iter()
                .find(|(at, _)| at == point)
                .map(|(_, distance)| *distance),
            DestinationTarget::Address(_) => None,
        }
    }
}

impl RoutedDistanceProvider for MockDistances {
    fn distance_matrix(
        &self,
        _origin: &Origin,
        destinations: &[DestinationTarget],
        _departure_unix: i64,
    ) -> Result<Vec<Option<RefinedDistance>>, ProviderError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(destinations.len());
            calls.len() - 1
        };
        if self.fail_calls.contains(&index) {
            return Err(ProviderError::Service {
                service: "mock distances",
                status: "OVER_QUERY_LIMIT".to_string(),
            });
        }
        Ok(destinations.iter().map(|d| self.lookup(d)).collect())
    }
}

/// Resolves a fixed set of addresses.
#[derive(Debug, Default)]
pub struct MockGeocoder {
    pub known: HashMap<&'static str, Coordinates>,
    pub fail: bool,
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError> {
        if self.fail {
            return Err(ProviderError::Other("geocoder offline".to_string()));
        }
        Ok(self.known.get(address).copied())
    }
}

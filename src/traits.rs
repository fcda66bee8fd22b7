//! Collaborator seams for the proximity engine.
//!
//! Each external service is a trait so that the engine can be driven by
//! HTTP adapters in production and by in-memory mocks in tests. All
//! implementations must be `Sync`: the engine calls them from rayon workers.

use crate::error::ProviderError;
use crate::types::{Coordinates, DestinationTarget, Origin, RefinedDistance};

/// Resolves a postal address to coordinates.
pub trait Geocoder: Sync {
    /// `Ok(None)` when the address is well-formed but unknown.
    fn geocode(&self, address: &str) -> Result<Option<Coordinates>, ProviderError>;
}

/// A place as returned by the places-search service.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceResult {
    pub name: Option<String>,
    pub coordinates: Coordinates,
    pub source_id: Option<String>,
    pub category_tags: Vec<String>,
}

/// Category-tag search biased toward (not filtered by) the origin.
pub trait PlacesSearch: Sync {
    fn search(
        &self,
        origin: Coordinates,
        category_tags: &[&str],
        result_limit: usize,
    ) -> Result<Vec<PlaceResult>, ProviderError>;
}

/// A place as returned by free-text search.
#[derive(Debug, Clone, PartialEq)]
pub struct TextPlaceResult {
    pub name: String,
    pub address: Option<String>,
    pub coordinates: Coordinates,
    pub place_id: Option<String>,
}

/// Free-text place search, used for childcare.
pub trait TextPlaceSearch: Sync {
    fn search_text(
        &self,
        origin: Coordinates,
        query: &str,
        radius_meters: u32,
    ) -> Result<Vec<TextPlaceResult>, ProviderError>;
}

/// Routed driving distance from one origin to many destinations.
///
/// The returned vector must have one element per destination, in order.
/// `None` marks an element the service could not route.
pub trait RoutedDistanceProvider: Sync {
    fn distance_matrix(
        &self,
        origin: &Origin,
        destinations: &[DestinationTarget],
        departure_unix: i64,
    ) -> Result<Vec<Option<RefinedDistance>>, ProviderError>;
}

/// Text search is optional; `()` never finds anything.
impl TextPlaceSearch for () {
    fn search_text(
        &self,
        _origin: Coordinates,
        _query: &str,
        _radius_meters: u32,
    ) -> Result<Vec<TextPlaceResult>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Geocoding is optional when callers always pass coordinates.
impl Geocoder for () {
    fn geocode(&self, _address: &str) -> Result<Option<Coordinates>, ProviderError> {
        Ok(None)
    }
}

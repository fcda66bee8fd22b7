//! Error types for collaborators and the engine.

use thiserror::Error;

/// A failure talking to one external collaborator.
///
/// The engine absorbs these for places search, text search and distance
/// refinement; only geocoding failures surface to the caller.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error calling {service}: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {service}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    #[error("{service} returned status {status}")]
    Service { service: &'static str, status: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{service} response had {actual} elements, expected {expected}")]
    Misaligned {
        service: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    Other(String),
}

/// The only failure class surfaced by [`crate::engine::ProximityEngine`].
#[derive(Debug, Error)]
pub enum ProximityError {
    #[error("cannot resolve origin: {reason}")]
    UnresolvableOrigin { reason: String },

    #[error("cannot resolve origin: geocoding failed: {source}")]
    Geocoding {
        #[source]
        source: ProviderError,
    },

    #[error("invalid origin coordinates ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

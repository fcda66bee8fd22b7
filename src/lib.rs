//! amenity-proximity
//!
//! Resolves the nearest transport, schools, childcare, supermarkets,
//! hospitals, airports and cities around a property and renders them as
//! report-ready "distance (time), name" lines.

pub mod assembler;
pub mod catalog;
pub mod category;
pub mod collector;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod geoapify;
pub mod google;
pub mod haversine;
pub mod osrm;
pub mod policy;
pub mod refiner;
pub mod traits;
pub mod types;

pub use catalog::ReferenceCatalog;
pub use config::{EngineConfig, SelectionConfig};
pub use engine::{Diagnostics, ProximityEngine, ProximityReport};
pub use error::{ProviderError, ProximityError};
pub use types::{Coordinates, OriginInput, ProximityEntry};

//! Test fixtures for amenity-proximity.
//!
//! Provides realistic test data including:
//! - Real inner-Sydney amenity locations
//! - Mock places-search and routed-distance collaborators

pub mod mocks;
pub mod sydney_locations;

pub use mocks::*;
pub use sydney_locations::*;

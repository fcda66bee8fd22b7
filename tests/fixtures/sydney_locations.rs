//! Real inner-Sydney locations around Surry Hills for realistic fixtures.
//!
//! Coordinates are approximate street-level positions.

#![allow(dead_code)]

use amenity_proximity::traits::PlaceResult;
use amenity_proximity::types::Coordinates;

/// A named place with coordinates and the raw tags a places search would
/// return for it.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub tags: &'static [&'static str],
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64, tags: &'static [&'static str]) -> Self {
        Self { name, lat, lng, tags }
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }

    pub fn to_place(&self) -> PlaceResult {
        PlaceResult {
            name: if self.name.is_empty() {
                None
            } else {
                Some(self.name.to_string())
            },
            coordinates: self.coords(),
            source_id: Some(format!("osm:{}", self.name.to_lowercase().replace(' ', "-"))),
            category_tags: self.tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Crown St, Surry Hills.
pub const SURRY_HILLS: Coordinates = Coordinates::new(-33.8861, 151.2111);

const TRAIN: &[&str] = &["public_transport", "public_transport.train"];
const TRAM: &[&str] = &["public_transport", "public_transport.tram"];
const BUS: &[&str] = &["public_transport", "public_transport.bus"];
const KINDER: &[&str] = &["childcare", "childcare.kindergarten"];
const CHILDCARE: &[&str] = &["childcare"];
const SCHOOL: &[&str] = &["education", "education.school"];
const SUPERMARKET: &[&str] = &["commercial", "commercial.supermarket"];
const HOSPITAL: &[&str] = &["healthcare", "healthcare.hospital"];

// ============================================================================
// Transit
// ============================================================================

pub const TRANSIT: &[Location] = &[
    Location::new("Central Station", -33.8830, 151.2067, TRAIN),
    Location::new("Redfern Station", -33.8917, 151.1987, TRAIN),
    Location::new("St James Station", -33.8708, 151.2107, TRAIN),
    Location::new("Sydney Live Steam Locomotive Society", -33.8858, 151.2108, TRAIN),
    Location::new("Surry Hills Light Rail", -33.8877, 151.2133, TRAM),
    Location::new("Central Chalmers Street", -33.8840, 151.2070, TRAM),
    Location::new("Crown St near Devonshire St", -33.8864, 151.2140, BUS),
    Location::new("Cleveland St near Crown St", -33.8897, 151.2122, BUS),
];

// ============================================================================
// Early years
// ============================================================================

pub const EARLY_YEARS: &[Location] = &[
    Location::new("KU Surry Hills Preschool", -33.8876, 151.2114, KINDER),
    Location::new("Goodstart Early Learning Surry Hills", -33.8841, 151.2117, CHILDCARE),
    Location::new("Harmony Childcare Redfern", -33.8925, 151.2040, CHILDCARE),
    Location::new("SDN Erskineville", -33.9020, 151.1860, CHILDCARE),
];

// ============================================================================
// Schools
// ============================================================================

pub const SCHOOLS: &[Location] = &[
    Location::new("Bourke Street Public School", -33.8868, 151.2150, SCHOOL),
    Location::new("Crown Street Public School", -33.8831, 151.2140, SCHOOL),
    Location::new("Sydney Boys High School", -33.8936, 151.2226, SCHOOL),
    Location::new("Sydney Girls High School", -33.8923, 151.2222, SCHOOL),
    Location::new("Cleveland Street Intensive English High School", -33.8905, 151.2060, SCHOOL),
    Location::new("", -33.8850, 151.2100, SCHOOL),
];

// ============================================================================
// Supermarkets
// ============================================================================

pub const SUPERMARKETS: &[Location] = &[
    Location::new("Coles Surry Hills", -33.8832, 151.2113, SUPERMARKET),
    Location::new("Surry Hills Grocer", -33.8858, 151.2125, SUPERMARKET),
    Location::new("Harris Farm Markets", -33.8810, 151.2150, SUPERMARKET),
    Location::new("Woolworths Metro Redfern", -33.8925, 151.2035, SUPERMARKET),
    Location::new("ALDI Waterloo", -33.9000, 151.2050, SUPERMARKET),
    Location::new("Foodworks Darlinghurst", -33.8780, 151.2190, SUPERMARKET),
];

// ============================================================================
// Hospitals
// ============================================================================

pub const HOSPITALS: &[Location] = &[
    Location::new("St Vincent's Emergency Department", -33.8805, 151.2198, HOSPITAL),
    Location::new("St Vincent's Hospital", -33.8807, 151.2203, HOSPITAL),
    Location::new("Sydney Eye Hospital", -33.8693, 151.2128, HOSPITAL),
    Location::new("Royal Prince Alfred Hospital", -33.8891, 151.1826, HOSPITAL),
    Location::new("Car Park P2", -33.8890, 151.1830, HOSPITAL),
];

pub fn all_locations() -> Vec<Location> {
    [TRANSIT, EARLY_YEARS, SCHOOLS, SUPERMARKETS, HOSPITALS]
        .iter()
        .flat_map(|group| group.iter().cloned())
        .collect()
}

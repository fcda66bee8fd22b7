//! Domain types shared across the resolution pipeline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((latitude, longitude): (f64, f64)) -> Self {
        Self { latitude, longitude }
    }
}

/// What the caller knows about the property location.
#[derive(Debug, Clone, PartialEq)]
pub enum OriginInput {
    Coordinates(Coordinates),
    Address(String),
    /// Coordinates already resolved upstream, with the address kept for
    /// services that want a textual origin.
    Both {
        coordinates: Coordinates,
        address: String,
    },
}

/// A resolved origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Origin {
    pub coordinates: Coordinates,
    pub address: Option<String>,
}

/// Amenity categories searched around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "train_station")]
    Train,
    #[serde(rename = "tram_stop")]
    Tram,
    #[serde(rename = "bus_stop")]
    Bus,
    #[serde(rename = "kindergarten")]
    Kindergarten,
    #[serde(rename = "childcare")]
    Childcare,
    #[serde(rename = "school")]
    School,
    #[serde(rename = "supermarket")]
    Supermarket,
    #[serde(rename = "hospital")]
    Hospital,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Train,
        Category::Tram,
        Category::Bus,
        Category::Kindergarten,
        Category::Childcare,
        Category::School,
        Category::Supermarket,
        Category::Hospital,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Train => "train_station",
            Category::Tram => "tram_stop",
            Category::Bus => "bus_stop",
            Category::Kindergarten => "kindergarten",
            Category::Childcare => "childcare",
            Category::School => "school",
            Category::Supermarket => "supermarket",
            Category::Hospital => "hospital",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One place discovered by a search collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// May be empty; see [`crate::category::generic_label`].
    pub name: String,
    pub category: Category,
    pub coordinates: Coordinates,
    pub source_id: Option<String>,
    pub raw_category_tags: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Airport,
    City,
}

/// Priority band of a reference location. Tier 1 is the most important.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    One,
    Two,
    Three,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::One, Tier::Two, Tier::Three];
}

/// A hand-curated airport or city.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLocation {
    pub name: String,
    pub kind: ReferenceKind,
    pub tier: Tier,
    pub coordinates: Coordinates,
    /// IATA code, airports only.
    pub code: Option<String>,
}

impl ReferenceLocation {
    pub fn city(name: &str, tier: Tier, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ReferenceKind::City,
            tier,
            coordinates: Coordinates::new(latitude, longitude),
            code: None,
        }
    }

    pub fn airport(name: &str, code: &str, tier: Tier, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            kind: ReferenceKind::Airport,
            tier,
            coordinates: Coordinates::new(latitude, longitude),
            code: Some(code.to_string()),
        }
    }

    pub fn display_name(&self) -> String {
        match &self.code {
            Some(code) => format!("{} ({})", self.name, code),
            None => self.name.clone(),
        }
    }
}

/// An item annotated with its great-circle distance from the origin.
///
/// The distance is a sort key only and never reaches the output.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub approximate_distance_meters: f64,
}

/// Opaque tag carried from shortlist to destination to refined distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DestinationKey(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum DestinationTarget {
    Coordinates(Coordinates),
    Address(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub key: DestinationKey,
    pub target: DestinationTarget,
}

/// Routed distance for one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RefinedDistance {
    pub distance_meters: u64,
    pub duration_seconds: u64,
}

impl RefinedDistance {
    /// Placeholder for a destination whose lookup failed.
    pub const SENTINEL: RefinedDistance = RefinedDistance {
        distance_meters: 0,
        duration_seconds: 0,
    };

    pub fn is_sentinel(&self) -> bool {
        self.distance_meters == 0
    }
}

/// Category of an output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryCategory {
    Amenity(Category),
    Reference(ReferenceKind),
}

impl EntryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryCategory::Amenity(category) => category.as_str(),
            EntryCategory::Reference(ReferenceKind::Airport) => "airport",
            EntryCategory::Reference(ReferenceKind::City) => "city",
        }
    }
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityEntry {
    pub category: EntryCategory,
    pub display_name: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub formatted_line: String,
}

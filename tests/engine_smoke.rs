mod fixtures;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use amenity_proximity::catalog::ReferenceCatalog;
use amenity_proximity::category::QUERY_GROUPS;
use amenity_proximity::config::EngineConfig;
use amenity_proximity::engine::ProximityEngine;
use amenity_proximity::error::{ProviderError, ProximityError};
use amenity_proximity::haversine::HaversineEstimator;
use amenity_proximity::traits::{PlaceResult, PlacesSearch, TextPlaceResult, TextPlaceSearch};
use amenity_proximity::types::{Category, Coordinates, EntryCategory, OriginInput, ReferenceKind};

use fixtures::*;

const DEPARTURE: i64 = 1_792_573_200;

const NEAR_SCHOOL: Location = Location::new(
    "Riley Street Primary",
    -33.8933,
    151.2111,
    &["education", "education.school"],
);
const NEAR_STATION: Location = Location::new(
    "Town Hall Station",
    -33.8753,
    151.2111,
    &["public_transport", "public_transport.train"],
);
const UNROUTABLE_BUS: Location = Location::new(
    "Oxford St near Crown St",
    -33.8790,
    151.2160,
    &["public_transport", "public_transport.bus"],
);

fn entry_names(report: &amenity_proximity::ProximityReport, category: EntryCategory) -> Vec<&str> {
    report
        .entries
        .iter()
        .filter(|e| e.category == category)
        .map(|e| e.display_name.as_str())
        .collect()
}

fn assert_sorted(report: &amenity_proximity::ProximityReport) {
    let distances: Vec<u64> = report.entries.iter().map(|e| e.distance_meters).collect();
    let mut sorted = distances.clone();
    sorted.sort();
    assert_eq!(distances, sorted);
}

#[test]
fn test_end_to_end_two_amenities() {
    let places = MockPlaces::new(&[NEAR_STATION, NEAR_SCHOOL, UNROUTABLE_BUS]);
    let distances = MockDistances::new()
        .with(NEAR_SCHOOL.coords(), 800, 120)
        .with(NEAR_STATION.coords(), 1500, 300);
    let engine =
        ProximityEngine::new(places, (), distances, ()).with_catalog(ReferenceCatalog::empty());

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    assert_eq!(
        report.lines(),
        vec!["800 m (2 mins), Riley Street Primary", "1.5 km (5 mins), Town Hall Station"]
    );
    assert_eq!(report.entries[0].category, EntryCategory::Amenity(Category::School));
    assert_eq!(report.entries[1].category, EntryCategory::Amenity(Category::Train));
    assert_eq!(report.entries[1].duration_seconds, 300);

    let diagnostics = &report.diagnostics;
    assert_eq!(diagnostics.routed_distance_calls, 1);
    assert_eq!(diagnostics.failed_distance_chunks, 0);
    // The bus stop has no routed distance and is dropped.
    assert_eq!(diagnostics.failed_distance_elements, 1);
    let bus = diagnostics.categories[&EntryCategory::Amenity(Category::Bus)];
    assert_eq!(bus.shortlisted, 1);
    assert_eq!(bus.displayed, 0);
}

#[test]
fn test_failed_category_search_is_contained() {
    let places = MockPlaces::new(&all_locations()).failing("healthcare.hospital");
    let engine = ProximityEngine::new(places, (), HaversineEstimator::default(), ())
        .with_catalog(ReferenceCatalog::empty());

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    assert!(entry_names(&report, EntryCategory::Amenity(Category::Hospital)).is_empty());
    assert_eq!(entry_names(&report, EntryCategory::Amenity(Category::School)).len(), 3);
    assert!(!entry_names(&report, EntryCategory::Amenity(Category::Supermarket)).is_empty());
    assert_sorted(&report);

    let hospital = report.diagnostics.categories[&EntryCategory::Amenity(Category::Hospital)];
    assert_eq!(hospital.raw, 0);
    assert_eq!(hospital.displayed, 0);
    assert!(
        report
            .diagnostics
            .notes
            .iter()
            .any(|note| note.starts_with("places search hospital"))
    );
}

#[test]
fn test_failed_distance_chunk_drops_only_its_entries() {
    let places = MockPlaces::new(&all_locations());
    let config = EngineConfig {
        max_destinations_per_call: 5,
        ..EngineConfig::default()
    };
    let engine = ProximityEngine::new(places, (), HaversineEstimator::default(), ())
        .with_config(config.clone());
    let full = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    // 1 rail + 1 bus + 4 childcare + 3 schools + 6 supermarkets + 2 hospitals
    // + 3 airports + 3 cities.
    let shortlisted: usize = full
        .diagnostics
        .categories
        .values()
        .map(|counts| counts.shortlisted)
        .sum();
    assert_eq!(shortlisted, 23);
    assert_eq!(full.diagnostics.routed_distance_calls, 5);
    assert_eq!(full.diagnostics.failed_distance_chunks, 0);

    let mut table = MockDistances::new();
    for location in all_locations() {
        table = table.with(location.coords(), 1000, 120);
    }
    let distances = table.failing_call(0);
    let engine = ProximityEngine::new(MockPlaces::new(&all_locations()), (), distances, ())
        .with_catalog(ReferenceCatalog::empty())
        .with_config(config);
    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    assert_eq!(report.diagnostics.failed_distance_chunks, 1);
    assert_eq!(report.diagnostics.routed_distance_calls, 4);
    // The first chunk held rail, bus and the first three childcare centres.
    assert!(entry_names(&report, EntryCategory::Amenity(Category::Bus)).is_empty());
    assert_eq!(entry_names(&report, EntryCategory::Amenity(Category::School)).len(), 3);
    assert!(report.diagnostics.notes.iter().any(|n| n.contains("OVER_QUERY_LIMIT")));
}

#[test]
fn test_realistic_surry_hills() {
    let places = MockPlaces::new(&all_locations());
    let engine = ProximityEngine::new(places, (), HaversineEstimator::default(), ());

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();
    assert_sorted(&report);

    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Tram)),
        vec!["Surry Hills Light Rail"]
    );
    assert!(entry_names(&report, EntryCategory::Amenity(Category::Train)).is_empty());
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Bus)),
        vec!["Crown St near Devonshire St"]
    );
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::School)),
        vec!["School", "Bourke Street Public School", "Crown Street Public School"]
    );
    assert_eq!(report.diagnostics.unnamed_substitutions, 1);

    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Supermarket)),
        vec![
            "Surry Hills Grocer",
            "Coles Surry Hills",
            "Woolworths Metro Redfern",
            "ALDI Waterloo"
        ]
    );
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Hospital)),
        vec!["St Vincent's Hospital", "Sydney Eye Hospital"]
    );

    assert!(!report.diagnostics.childcare_from_text_search);
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Kindergarten)),
        vec!["KU Surry Hills Preschool"]
    );
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Childcare)),
        vec!["Goodstart Early Learning Surry Hills", "Harmony Childcare Redfern"]
    );

    assert_eq!(
        entry_names(&report, EntryCategory::Reference(ReferenceKind::Airport)),
        vec![
            "Sydney Airport (SYD)",
            "Newcastle Airport (NTL)",
            "Port Macquarie Airport (PQQ)"
        ]
    );
    assert_eq!(
        entry_names(&report, EntryCategory::Reference(ReferenceKind::City)),
        vec!["Sydney", "Wollongong", "Port Macquarie"]
    );
    assert!(report.diagnostics.notes.is_empty());
}

#[test]
fn test_text_search_childcare_preferred() {
    let text = MockTextSearch {
        results: vec![
            TextPlaceResult {
                name: "Little Zak's Surry Hills".to_string(),
                address: Some("Mary St, Surry Hills NSW".to_string()),
                coordinates: Coordinates::new(-33.8846, 151.2090),
                place_id: Some("ChIJzak".to_string()),
            },
            TextPlaceResult {
                name: "Penrith Early Learning".to_string(),
                address: None,
                coordinates: Coordinates::new(-33.7510, 150.6942),
                place_id: Some("ChIJfar".to_string()),
            },
        ],
        fail: false,
    };
    let engine = ProximityEngine::new(
        MockPlaces::new(&all_locations()),
        text,
        HaversineEstimator::default(),
        (),
    )
    .with_catalog(ReferenceCatalog::empty());

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    assert!(report.diagnostics.childcare_from_text_search);
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Childcare)),
        vec!["Little Zak's Surry Hills"]
    );
    assert!(entry_names(&report, EntryCategory::Amenity(Category::Kindergarten)).is_empty());
}

#[test]
fn test_text_search_failure_falls_back() {
    let text = MockTextSearch {
        results: Vec::new(),
        fail: true,
    };
    let engine = ProximityEngine::new(
        MockPlaces::new(&all_locations()),
        text,
        HaversineEstimator::default(),
        (),
    )
    .with_catalog(ReferenceCatalog::empty());

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    assert!(!report.diagnostics.childcare_from_text_search);
    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Kindergarten)),
        vec!["KU Surry Hills Preschool"]
    );
    assert!(
        report
            .diagnostics
            .notes
            .iter()
            .any(|n| n.starts_with("childcare text search"))
    );
}

#[test]
fn test_origin_from_address() {
    let geocoder = MockGeocoder {
        known: HashMap::from([("300 Crown St, Surry Hills NSW", SURRY_HILLS)]),
        fail: false,
    };
    let engine = ProximityEngine::new(MockPlaces::default(), (), MockDistances::new(), geocoder);

    let origin = engine
        .resolve_origin(&OriginInput::Address("  300 Crown St, Surry Hills NSW ".to_string()))
        .unwrap();
    assert_eq!(origin.coordinates, SURRY_HILLS);
    assert_eq!(origin.address.as_deref(), Some("300 Crown St, Surry Hills NSW"));

    let unknown = engine.resolve_origin(&OriginInput::Address("Nowhere".to_string()));
    assert!(matches!(unknown, Err(ProximityError::UnresolvableOrigin { .. })));

    let empty = engine.resolve_origin(&OriginInput::Address("   ".to_string()));
    assert!(matches!(empty, Err(ProximityError::UnresolvableOrigin { .. })));
}

#[test]
fn test_origin_errors() {
    let geocoder = MockGeocoder {
        known: HashMap::new(),
        fail: true,
    };
    let engine = ProximityEngine::new(MockPlaces::default(), (), MockDistances::new(), geocoder);

    let failed = engine.resolve_proximity_at(&OriginInput::Address("1 George St".to_string()), DEPARTURE);
    assert!(matches!(failed, Err(ProximityError::Geocoding { .. })));

    let invalid = engine.resolve_proximity_at(
        &OriginInput::Coordinates(Coordinates::new(-95.0, 151.0)),
        DEPARTURE,
    );
    assert!(matches!(invalid, Err(ProximityError::InvalidCoordinates { .. })));

    let both = engine
        .resolve_origin(&OriginInput::Both {
            coordinates: SURRY_HILLS,
            address: "300 Crown St".to_string(),
        })
        .unwrap();
    assert_eq!(both.coordinates, SURRY_HILLS);
    assert_eq!(both.address.as_deref(), Some("300 Crown St"));
}

#[test]
fn test_nothing_found_is_empty_report() {
    let engine = ProximityEngine::new(MockPlaces::default(), (), MockDistances::new(), ())
        .with_catalog(ReferenceCatalog::empty());
    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();
    assert!(report.entries.is_empty());
    assert_eq!(report.diagnostics.routed_distance_calls, 0);
    assert_eq!(report.diagnostics.categories.len(), 10);
}

const CROWDED_SUPERMARKETS: &[Location] = &[
    Location::new("Crown Grocer", -33.8871, 151.2111, &["commercial.supermarket"]),
    Location::new("Devonshire Deli Mart", -33.8881, 151.2111, &["commercial.supermarket"]),
    Location::new("Surry Fresh", -33.8891, 151.2111, &["commercial.supermarket"]),
    Location::new("Ridge Street Provisions", -33.8901, 151.2111, &["commercial.supermarket"]),
    Location::new("Night Owl Foods", -33.8911, 151.2111, &["commercial.supermarket"]),
    Location::new("Woolworths Metro Redfern", -33.8925, 151.2035, &["commercial.supermarket"]),
    Location::new("Coles Darlinghurst", -33.8780, 151.2190, &["commercial.supermarket"]),
    Location::new("ALDI Waterloo", -33.9000, 151.2050, &["commercial.supermarket"]),
    Location::new("IGA Moore Park", -33.8950, 151.2250, &["commercial.supermarket"]),
];

#[test]
fn test_fully_populated_origin_fits_one_distance_call() {
    let locations: Vec<Location> = [TRANSIT, EARLY_YEARS, SCHOOLS, CROWDED_SUPERMARKETS, HOSPITALS]
        .iter()
        .flat_map(|group| group.iter().cloned())
        .collect();
    let text = MockTextSearch {
        results: (0..6)
            .map(|i| TextPlaceResult {
                name: format!("Early Learning {i}"),
                address: None,
                coordinates: Coordinates::new(SURRY_HILLS.latitude, SURRY_HILLS.longitude + 0.002 * (i + 1) as f64),
                place_id: Some(format!("text-{i}")),
            })
            .collect(),
        fail: false,
    };
    let engine = ProximityEngine::new(
        MockPlaces::new(&locations),
        text,
        HaversineEstimator::default(),
        (),
    );

    let report = engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();

    let shortlisted: usize = report
        .diagnostics
        .categories
        .values()
        .map(|counts| counts.shortlisted)
        .sum();
    assert_eq!(shortlisted, 25);
    assert_eq!(report.diagnostics.budget_trimmed_destinations, 3);
    assert_eq!(report.diagnostics.routed_distance_calls, 1);

    assert_eq!(
        entry_names(&report, EntryCategory::Amenity(Category::Supermarket)),
        vec![
            "Crown Grocer",
            "Woolworths Metro Redfern",
            "Coles Darlinghurst",
            "IGA Moore Park",
            "ALDI Waterloo"
        ]
    );
    assert_eq!(entry_names(&report, EntryCategory::Amenity(Category::Childcare)).len(), 6);
    assert_eq!(entry_names(&report, EntryCategory::Reference(ReferenceKind::City)).len(), 3);
}

/// Sleeps in every call and records how many calls overlap.
#[derive(Default)]
struct SlowSearch {
    in_flight: AtomicUsize,
    peak_places: AtomicUsize,
    peak_total: AtomicUsize,
    places_in_flight: AtomicUsize,
}

const SEARCH_DELAY: Duration = Duration::from_millis(300);

impl SlowSearch {
    fn enter(&self, places: bool) {
        let total = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_total.fetch_max(total, Ordering::SeqCst);
        if places {
            let current = self.places_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_places.fetch_max(current, Ordering::SeqCst);
        }
        thread::sleep(SEARCH_DELAY);
        if places {
            self.places_in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PlacesSearch for &SlowSearch {
    fn search(
        &self,
        _origin: Coordinates,
        _category_tags: &[&str],
        _result_limit: usize,
    ) -> Result<Vec<PlaceResult>, ProviderError> {
        self.enter(true);
        Ok(Vec::new())
    }
}

impl TextPlaceSearch for &SlowSearch {
    fn search_text(
        &self,
        _origin: Coordinates,
        _query: &str,
        _radius_meters: u32,
    ) -> Result<Vec<TextPlaceResult>, ProviderError> {
        self.enter(false);
        Ok(Vec::new())
    }
}

#[test]
fn test_searches_run_concurrently() {
    let slow = SlowSearch::default();
    let engine = ProximityEngine::new(&slow, &slow, MockDistances::new(), ())
        .with_catalog(ReferenceCatalog::empty());

    let started = Instant::now();
    engine
        .resolve_proximity_at(&OriginInput::Coordinates(SURRY_HILLS), DEPARTURE)
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(slow.peak_places.load(Ordering::SeqCst), QUERY_GROUPS.len());
    assert_eq!(slow.peak_total.load(Ordering::SeqCst), QUERY_GROUPS.len() + 1);
    assert!(elapsed < SEARCH_DELAY * 3, "searches took {elapsed:?}");
}

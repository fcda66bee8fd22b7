//! Proximity resolution: origin in, ranked amenity lines out.

use std::collections::{BTreeMap, HashSet};

use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assembler::{ShortlistEntry, Subject, assemble};
use crate::category::QUERY_GROUPS;
use crate::catalog::ReferenceCatalog;
use crate::collector::{Collection, collect};
use crate::config::EngineConfig;
use crate::error::ProximityError;
use crate::haversine::rank;
use crate::policy::{
    ChildcareSource, Shortlist, select_childcare, select_hospitals, select_nearest, select_rail,
    select_references, select_supermarkets,
};
use crate::refiner::{Refinement, departure_timestamp, refine};
use crate::traits::{Geocoder, PlacesSearch, RoutedDistanceProvider, TextPlaceResult, TextPlaceSearch};
use crate::types::{
    Candidate, Category, Coordinates, Destination, DestinationKey, DestinationTarget,
    EntryCategory, Origin, OriginInput, ProximityEntry, Ranked, ReferenceKind,
};

/// Raw tag attached to childcare places found by text search.
pub const TEXT_SEARCH_TAG: &str = "text_search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCounts {
    /// Results returned by the search before deduplication.
    pub raw: usize,
    pub deduplicated: usize,
    /// Sent for routed-distance refinement.
    pub shortlisted: usize,
    pub displayed: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Diagnostics {
    pub routed_distance_calls: usize,
    pub failed_distance_chunks: usize,
    pub failed_distance_elements: usize,
    /// Shortlisted destinations dropped to stay within the total budget.
    pub budget_trimmed_destinations: usize,
    pub unnamed_substitutions: usize,
    pub childcare_from_text_search: bool,
    pub categories: BTreeMap<EntryCategory, CategoryCounts>,
    /// One line per absorbed failure.
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityReport {
    /// Ascending by routed distance.
    pub entries: Vec<ProximityEntry>,
    pub diagnostics: Diagnostics,
}

impl ProximityReport {
    pub fn lines(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.formatted_line.as_str()).collect()
    }
}

/// Resolves nearby amenities and reference locations for one origin.
///
/// Holds no per-request state; every call recomputes from scratch.
///
/// Searches block on the network, so they run on a dedicated pool with one
/// thread per query group plus one for text search rather than on the
/// CPU-sized global pool.
pub struct ProximityEngine<P, T, D, G> {
    places: P,
    text_search: T,
    distances: D,
    geocoder: G,
    catalog: ReferenceCatalog,
    config: EngineConfig,
    search_pool: Option<ThreadPool>,
}

impl<P, T, D, G> ProximityEngine<P, T, D, G>
where
    P: PlacesSearch,
    T: TextPlaceSearch,
    D: RoutedDistanceProvider,
    G: Geocoder,
{
    /// Engine with the Australian reference catalog and default rules.
    pub fn new(places: P, text_search: T, distances: D, geocoder: G) -> Self {
        Self {
            places,
            text_search,
            distances,
            geocoder,
            catalog: ReferenceCatalog::australia(),
            config: EngineConfig::default(),
            search_pool: search_pool(),
        }
    }

    pub fn with_catalog(mut self, catalog: ReferenceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve the origin, geocoding an address when no coordinates are given.
    pub fn resolve_origin(&self, input: &OriginInput) -> Result<Origin, ProximityError> {
        let (coordinates, address) = match input {
            OriginInput::Coordinates(coordinates) => (*coordinates, None),
            OriginInput::Both {
                coordinates,
                address,
            } => (*coordinates, Some(address.clone())),
            OriginInput::Address(address) => {
                let address = address.trim();
                if address.is_empty() {
                    return Err(ProximityError::UnresolvableOrigin {
                        reason: "no coordinates and an empty address".to_string(),
                    });
                }
                let coordinates = self
                    .geocoder
                    .geocode(address)
                    .map_err(|source| ProximityError::Geocoding { source })?
                    .ok_or_else(|| ProximityError::UnresolvableOrigin {
                        reason: format!("no geocoding result for \"{address}\""),
                    })?;
                (coordinates, Some(address.to_string()))
            }
        };

        if !coordinates.is_valid() {
            return Err(ProximityError::InvalidCoordinates {
                latitude: coordinates.latitude,
                longitude: coordinates.longitude,
            });
        }

        Ok(Origin {
            coordinates,
            address,
        })
    }

    /// Nearest amenities and reference locations, priced for the configured
    /// departure slot.
    pub fn resolve_proximity(&self, input: &OriginInput) -> Result<ProximityReport, ProximityError> {
        let departure =
            departure_timestamp(self.config.departure_weekday, self.config.departure_hour);
        self.resolve_proximity_at(input, departure)
    }

    /// As [`Self::resolve_proximity`] with an explicit departure timestamp.
    pub fn resolve_proximity_at(
        &self,
        input: &OriginInput,
        departure_unix: i64,
    ) -> Result<ProximityReport, ProximityError> {
        let origin = self.resolve_origin(input)?;
        let at = origin.coordinates;
        let selection = &self.config.selection;
        let mut diagnostics = Diagnostics::default();

        let fan_out = || {
            rayon::join(
                || collect(&self.places, at, self.config.places_result_limit),
                || {
                    self.text_search.search_text(
                        at,
                        &selection.childcare_text_query,
                        selection.childcare_text_radius_meters,
                    )
                },
            )
        };
        let (collection, text_results) = match &self.search_pool {
            Some(pool) => pool.install(fan_out),
            None => fan_out(),
        };

        for failure in collection.failures() {
            diagnostics
                .notes
                .push(format!("places search {}: {}", failure.group, failure.message));
        }
        let text_candidates: Vec<Candidate> = match text_results {
            Ok(results) => text_candidates(results),
            Err(err) => {
                warn!(error = %err, "childcare text search failed, using places search");
                diagnostics.notes.push(format!("childcare text search: {err}"));
                Vec::new()
            }
        };

        let ranked = |category: Category| ranked_pool(at, &collection, category);
        let childcare = select_childcare(
            rank(at, text_candidates, |c| c.coordinates),
            ranked(Category::Kindergarten),
            ranked(Category::Childcare),
            selection,
        );
        let childcare_source = childcare.source;
        let mut picked = Shortlist {
            rail: select_rail(ranked(Category::Train), ranked(Category::Tram), selection),
            bus: select_nearest(ranked(Category::Bus), selection.bus_count),
            childcare: childcare.shortlist,
            schools: select_nearest(ranked(Category::School), selection.school_count),
            supermarkets: select_supermarkets(ranked(Category::Supermarket), selection),
            hospitals: select_hospitals(ranked(Category::Hospital), selection),
            references: select_references(
                rank(at, self.catalog.entries().to_vec(), |r| r.coordinates),
                &self.catalog,
            ),
        };

        let trimmed = picked.fit_budget(self.config.max_total_destinations, selection);
        if trimmed > 0 {
            debug!(
                trimmed,
                budget = self.config.max_total_destinations,
                "shortlist trimmed to destination budget"
            );
        }
        diagnostics.budget_trimmed_destinations = trimmed;

        let subjects = picked
            .rail
            .into_iter()
            .chain(picked.bus)
            .chain(picked.childcare)
            .chain(picked.schools)
            .chain(picked.supermarkets)
            .chain(picked.hospitals)
            .map(|r| Subject::Amenity(r.item))
            .chain(picked.references.into_iter().map(|r| Subject::Reference(r.item)));

        let mut shortlist = Vec::new();
        let mut destinations = Vec::new();
        for (index, subject) in subjects.enumerate() {
            let key = DestinationKey(index as u32);
            let point = match &subject {
                Subject::Amenity(candidate) => candidate.coordinates,
                Subject::Reference(reference) => reference.coordinates,
            };
            destinations.push(Destination {
                key,
                target: DestinationTarget::Coordinates(point),
            });
            shortlist.push(ShortlistEntry { key, subject });
        }

        let refinement = refine(
            &self.distances,
            &origin,
            &destinations,
            self.config.max_destinations_per_call,
            departure_unix,
        );

        let shortlisted = count_shortlisted(&shortlist);
        let assembly = assemble(shortlist, &refinement, Some(childcare_source), selection);

        diagnostics.childcare_from_text_search = childcare_source == ChildcareSource::TextSearch;
        diagnostics.unnamed_substitutions = assembly.unnamed_substitutions;
        record_refinement(&mut diagnostics, refinement);
        let displayed = assembly.displayed();
        for category in Category::ALL {
            let key = EntryCategory::Amenity(category);
            diagnostics.categories.insert(
                key,
                CategoryCounts {
                    raw: collection.raw_count(category),
                    deduplicated: collection.pool(category).len(),
                    shortlisted: shortlisted.get(&key).copied().unwrap_or(0),
                    displayed: displayed.get(&key).copied().unwrap_or(0),
                },
            );
        }
        for kind in [ReferenceKind::Airport, ReferenceKind::City] {
            let key = EntryCategory::Reference(kind);
            let catalogued = self.catalog.of_kind(kind).count();
            diagnostics.categories.insert(
                key,
                CategoryCounts {
                    raw: catalogued,
                    deduplicated: catalogued,
                    shortlisted: shortlisted.get(&key).copied().unwrap_or(0),
                    displayed: displayed.get(&key).copied().unwrap_or(0),
                },
            );
        }

        info!(
            entries = assembly.entries.len(),
            routed_calls = diagnostics.routed_distance_calls,
            failures = diagnostics.notes.len(),
            "proximity resolved"
        );

        Ok(ProximityReport {
            entries: assembly.entries,
            diagnostics,
        })
    }
}

fn ranked_pool(origin: Coordinates, collection: &Collection, category: Category) -> Vec<Ranked<Candidate>> {
    rank(origin, collection.pool(category).to_vec(), |c| c.coordinates)
}

fn search_pool() -> Option<ThreadPool> {
    match ThreadPoolBuilder::new()
        .num_threads(QUERY_GROUPS.len() + 1)
        .thread_name(|index| format!("proximity-search-{index}"))
        .build()
    {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(error = %err, "search pool unavailable, using the global rayon pool");
            None
        }
    }
}

/// Childcare candidates from text search, one per non-empty place id.
fn text_candidates(results: Vec<TextPlaceResult>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|result| match result.place_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => seen.insert(id.to_string()),
            None => true,
        })
        .map(|result| Candidate {
            name: result.name.trim().to_string(),
            category: Category::Childcare,
            coordinates: result.coordinates,
            source_id: result.place_id.filter(|id| !id.is_empty()),
            raw_category_tags: [TEXT_SEARCH_TAG.to_string()].into_iter().collect(),
        })
        .collect()
}

fn count_shortlisted(shortlist: &[ShortlistEntry]) -> BTreeMap<EntryCategory, usize> {
    let mut counts = BTreeMap::new();
    for entry in shortlist {
        *counts.entry(entry.subject.category()).or_insert(0) += 1;
    }
    counts
}

fn record_refinement(diagnostics: &mut Diagnostics, refinement: Refinement) {
    diagnostics.routed_distance_calls = refinement.calls;
    diagnostics.failed_distance_chunks = refinement.failed_chunks;
    diagnostics.failed_distance_elements = refinement.failed_elements;
    diagnostics.notes.extend(refinement.notes);
}

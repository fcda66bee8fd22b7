//! Engine configuration and business constants.

use std::env;

use chrono::Weekday;

use crate::error::ConfigError;

/// Places-search results requested per query group.
pub const DEFAULT_PLACES_RESULT_LIMIT: usize = 500;

/// Destinations accepted by the routed-distance service per call.
pub const DEFAULT_MAX_DESTINATIONS_PER_CALL: usize = 25;

/// Destinations refined per request, across all categories.
pub const DEFAULT_MAX_TOTAL_DESTINATIONS: usize = 25;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub selection: SelectionConfig,
    pub places_result_limit: usize,
    pub max_destinations_per_call: usize,
    /// Upper bound on the whole shortlist; see
    /// [`crate::policy::Shortlist::fit_budget`] for the trim order.
    pub max_total_destinations: usize,
    /// Refinement is priced at this weekday/hour so traffic estimates are
    /// stable between runs.
    pub departure_weekday: Weekday,
    pub departure_hour: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            places_result_limit: DEFAULT_PLACES_RESULT_LIMIT,
            max_destinations_per_call: DEFAULT_MAX_DESTINATIONS_PER_CALL,
            max_total_destinations: DEFAULT_MAX_TOTAL_DESTINATIONS,
            departure_weekday: Weekday::Wed,
            departure_hour: 9,
        }
    }
}

/// Per-category selection rules.
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub rail_count: usize,
    /// Name fragments of places that look like stations but are not.
    pub rail_denylist: Vec<String>,
    pub bus_count: usize,

    pub childcare_text_query: String,
    pub childcare_text_radius_meters: u32,
    pub childcare_text_max_results: usize,
    /// Shortlist size when falling back to the places-search pools.
    pub childcare_fallback_shortlist: usize,
    /// Entries kept after refinement on the fallback path.
    pub childcare_fallback_final: usize,
    /// Routed distance beyond which childcare entries are dropped.
    pub childcare_radius_cap_meters: u64,

    pub school_count: usize,

    pub supermarket_shortlist: usize,
    pub supermarket_chains: Vec<String>,

    /// Haversine pool inspected before sub-location filtering.
    pub hospital_pool: usize,
    pub hospital_count: usize,
    pub hospital_sub_location_terms: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            rail_count: 1,
            rail_denylist: strings(&[
                "club",
                "society",
                "model railway",
                "modellers",
                "miniature railway",
                "museum",
            ]),
            bus_count: 1,
            childcare_text_query: "childcare centre".to_string(),
            childcare_text_radius_meters: 10_000,
            childcare_text_max_results: 6,
            childcare_fallback_shortlist: 4,
            childcare_fallback_final: 3,
            childcare_radius_cap_meters: 10_000,
            school_count: 3,
            supermarket_shortlist: 5,
            supermarket_chains: strings(&["Woolworths", "Coles", "Aldi", "IGA"]),
            hospital_pool: 50,
            hospital_count: 2,
            hospital_sub_location_terms: strings(&[
                "emergency",
                "reception",
                "outpatient",
                "outpatients",
                "ward",
                "car park",
                "parking",
                "entrance",
                "pharmacy",
                "pathology",
                "radiology",
                "clinic",
                "building",
                "wing",
                "level",
                "lift",
                "cafe",
                "kiosk",
            ]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Read a required environment variable.
pub(crate) fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

/// Read an optional numeric environment variable.
pub(crate) fn optional_u64(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| ConfigError::InvalidVar {
                name,
                reason: err.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

//! Joins refined distances back onto shortlisted places and formats output.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::category::generic_label;
use crate::config::SelectionConfig;
use crate::format::format_line;
use crate::policy::{ChildcareSource, Refined, finalize_childcare, finalize_supermarkets};
use crate::refiner::Refinement;
use crate::types::{
    Candidate, Category, DestinationKey, EntryCategory, ProximityEntry, ReferenceLocation,
    RefinedDistance,
};

/// What a shortlisted destination stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum Subject {
    Amenity(Candidate),
    Reference(ReferenceLocation),
}

impl Subject {
    pub fn category(&self) -> EntryCategory {
        match self {
            Subject::Amenity(candidate) => EntryCategory::Amenity(candidate.category),
            Subject::Reference(reference) => EntryCategory::Reference(reference.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortlistEntry {
    pub key: DestinationKey,
    pub subject: Subject,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    /// Ascending by routed distance across all categories.
    pub entries: Vec<ProximityEntry>,
    pub unnamed_substitutions: usize,
}

impl Assembly {
    pub fn displayed(&self) -> BTreeMap<EntryCategory, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.category).or_insert(0) += 1;
        }
        counts
    }
}

pub fn assemble(
    shortlist: Vec<ShortlistEntry>,
    refinement: &Refinement,
    childcare_source: Option<ChildcareSource>,
    config: &SelectionConfig,
) -> Assembly {
    let by_key: HashMap<DestinationKey, RefinedDistance> =
        refinement.distances.iter().copied().collect();

    let mut amenities: BTreeMap<Category, Vec<Refined<Candidate>>> = BTreeMap::new();
    let mut references: Vec<Refined<ReferenceLocation>> = Vec::new();

    for entry in shortlist {
        let distance = match by_key.get(&entry.key) {
            Some(distance) if !distance.is_sentinel() => *distance,
            _ => {
                debug!(key = entry.key.0, "dropping destination without routed distance");
                continue;
            }
        };
        match entry.subject {
            Subject::Amenity(item) => amenities
                .entry(item.category)
                .or_default()
                .push(Refined { item, distance }),
            Subject::Reference(item) => references.push(Refined { item, distance }),
        }
    }

    let mut early_years: Vec<Refined<Candidate>> = Vec::new();
    for category in [Category::Kindergarten, Category::Childcare] {
        early_years.extend(amenities.remove(&category).unwrap_or_default());
    }
    if let Some(source) = childcare_source {
        early_years = finalize_childcare(early_years, source, config);
    }

    if let Some(stores) = amenities.remove(&Category::Supermarket) {
        amenities.insert(Category::Supermarket, finalize_supermarkets(stores, config));
    }

    let mut assembly = Assembly::default();
    let refined_amenities = amenities.into_values().flatten().chain(early_years);
    for Refined { item, distance } in refined_amenities {
        let category = EntryCategory::Amenity(item.category);
        let display_name = display_name(&item.name, category, &mut assembly);
        assembly.entries.push(to_entry(category, display_name, distance));
    }
    for Refined { item, distance } in references {
        let category = EntryCategory::Reference(item.kind);
        let display_name = display_name(&item.display_name(), category, &mut assembly);
        assembly.entries.push(to_entry(category, display_name, distance));
    }

    assembly.entries.sort_by(|a, b| {
        a.distance_meters
            .cmp(&b.distance_meters)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    assembly
}

fn display_name(name: &str, category: EntryCategory, assembly: &mut Assembly) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        assembly.unnamed_substitutions += 1;
        generic_label(category).to_string()
    } else {
        trimmed.to_string()
    }
}

fn to_entry(category: EntryCategory, display_name: String, distance: RefinedDistance) -> ProximityEntry {
    ProximityEntry {
        category,
        formatted_line: format_line(&distance, &display_name),
        display_name,
        distance_meters: distance.distance_meters,
        duration_seconds: distance.duration_seconds,
    }
}

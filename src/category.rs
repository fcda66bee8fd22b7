//! Raw places-search tags, query groups and fallback labels.

use crate::types::{Category, EntryCategory, ReferenceKind};

/// Every raw tag the engine understands, with the category it maps to.
///
/// Matching is exact. Tags not listed here are ignored.
pub const TAG_TABLE: &[(&str, Category)] = &[
    ("public_transport.train", Category::Train),
    ("railway.train", Category::Train),
    ("public_transport.tram", Category::Tram),
    ("public_transport.light_rail", Category::Tram),
    ("railway.tram", Category::Tram),
    ("public_transport.bus", Category::Bus),
    ("highway.bus_stop", Category::Bus),
    ("childcare.kindergarten", Category::Kindergarten),
    ("childcare", Category::Childcare),
    ("education.school", Category::School),
    ("commercial.supermarket", Category::Supermarket),
    ("healthcare.hospital", Category::Hospital),
];

pub fn category_for_tag(tag: &str) -> Option<Category> {
    TAG_TABLE
        .iter()
        .find(|(raw, _)| *raw == tag)
        .map(|(_, category)| *category)
}

/// Tag sent to the places-search service for a category.
pub fn search_tag(category: Category) -> &'static str {
    match category {
        Category::Train => "public_transport.train",
        Category::Tram => "public_transport.tram",
        Category::Bus => "public_transport.bus",
        Category::Kindergarten => "childcare.kindergarten",
        Category::Childcare => "childcare",
        Category::School => "education.school",
        Category::Supermarket => "commercial.supermarket",
        Category::Hospital => "healthcare.hospital",
    }
}

/// Categories requested together in one places-search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryGroup {
    pub name: &'static str,
    pub categories: &'static [Category],
}

impl QueryGroup {
    pub fn tags(&self) -> Vec<&'static str> {
        self.categories.iter().map(|c| search_tag(*c)).collect()
    }
}

pub const QUERY_GROUPS: &[QueryGroup] = &[
    QueryGroup {
        name: "transit",
        categories: &[Category::Train, Category::Tram, Category::Bus],
    },
    QueryGroup {
        name: "early_years",
        categories: &[Category::Kindergarten, Category::Childcare],
    },
    QueryGroup {
        name: "school",
        categories: &[Category::School],
    },
    QueryGroup {
        name: "supermarket",
        categories: &[Category::Supermarket],
    },
    QueryGroup {
        name: "hospital",
        categories: &[Category::Hospital],
    },
];

/// Label used when a located place has no name.
pub fn generic_label(category: EntryCategory) -> &'static str {
    match category {
        EntryCategory::Amenity(Category::Train) => "Train Station",
        EntryCategory::Amenity(Category::Tram) => "Tram Stop",
        EntryCategory::Amenity(Category::Bus) => "Bus Stop",
        EntryCategory::Amenity(Category::Kindergarten) => "Kindergarten",
        EntryCategory::Amenity(Category::Childcare) => "Childcare Centre",
        EntryCategory::Amenity(Category::School) => "School",
        EntryCategory::Amenity(Category::Supermarket) => "Supermarket",
        EntryCategory::Amenity(Category::Hospital) => "Hospital",
        EntryCategory::Reference(ReferenceKind::Airport) => "Airport",
        EntryCategory::Reference(ReferenceKind::City) => "City",
    }
}

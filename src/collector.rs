//! Parallel candidate collection from the places-search service.
//!
//! One search per [`QueryGroup`] runs on the rayon pool. A failed group
//! leaves its categories with an error outcome that reads as an empty pool;
//! sibling groups are unaffected.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::category::{QUERY_GROUPS, QueryGroup, category_for_tag};
use crate::error::ProviderError;
use crate::traits::{PlaceResult, PlacesSearch};
use crate::types::{Candidate, Category, Coordinates};

/// Why a category has no pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectError {
    pub group: &'static str,
    pub message: String,
}

/// Collected pool for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPool {
    /// Results mapped to this category before deduplication.
    pub raw_count: usize,
    pub candidates: Vec<Candidate>,
}

pub type CategoryOutcome = Result<CategoryPool, CollectError>;

#[derive(Debug, Clone, Default)]
pub struct Collection {
    outcomes: BTreeMap<Category, CategoryOutcome>,
}

impl Collection {
    /// Deduplicated candidates for a category; empty when its group failed.
    pub fn pool(&self, category: Category) -> &[Candidate] {
        match self.outcomes.get(&category) {
            Some(Ok(pool)) => &pool.candidates,
            _ => &[],
        }
    }

    pub fn raw_count(&self, category: Category) -> usize {
        match self.outcomes.get(&category) {
            Some(Ok(pool)) => pool.raw_count,
            _ => 0,
        }
    }

    /// One entry per failed group.
    pub fn failures(&self) -> Vec<CollectError> {
        let mut seen = BTreeSet::new();
        self.outcomes
            .values()
            .filter_map(|outcome| outcome.as_ref().err())
            .filter(|err| seen.insert(err.group))
            .cloned()
            .collect()
    }
}

/// Search every query group around `origin` and merge the results.
pub fn collect<P>(places: &P, origin: Coordinates, result_limit: usize) -> Collection
where
    P: PlacesSearch + ?Sized,
{
    let per_group: Vec<(QueryGroup, Result<Vec<PlaceResult>, ProviderError>)> = QUERY_GROUPS
        .par_iter()
        .map(|group| {
            let tags = group.tags();
            debug!(group = group.name, tags = ?tags, "places search");
            (*group, places.search(origin, &tags, result_limit))
        })
        .collect();

    let mut outcomes = BTreeMap::new();
    for (group, result) in per_group {
        match result {
            Ok(results) => {
                debug!(group = group.name, results = results.len(), "places search complete");
                for (category, pool) in split_group(&group, results) {
                    outcomes.insert(category, Ok(pool));
                }
            }
            Err(err) => {
                warn!(group = group.name, error = %err, "places search failed, treating as empty");
                let failure = CollectError {
                    group: group.name,
                    message: err.to_string(),
                };
                for category in group.categories {
                    outcomes.insert(*category, Err(failure.clone()));
                }
            }
        }
    }

    Collection { outcomes }
}

/// Fan a group's results out into one deduplicated pool per category.
fn split_group(group: &QueryGroup, results: Vec<PlaceResult>) -> BTreeMap<Category, CategoryPool> {
    let mut pools: BTreeMap<Category, CategoryPool> = group
        .categories
        .iter()
        .map(|category| {
            (
                *category,
                CategoryPool {
                    raw_count: 0,
                    candidates: Vec::new(),
                },
            )
        })
        .collect();
    let mut seen: BTreeMap<Category, HashSet<String>> = BTreeMap::new();

    for result in results {
        let categories = categories_in_group(group, &result.category_tags);
        if categories.is_empty() {
            debug!(group = group.name, tags = ?result.category_tags, "result matches no category in group");
            continue;
        }

        for category in categories {
            let Some(pool) = pools.get_mut(&category) else {
                continue;
            };
            pool.raw_count += 1;

            if let Some(id) = result.source_id.as_deref().filter(|id| !id.is_empty()) {
                if !seen.entry(category).or_default().insert(id.to_string()) {
                    continue;
                }
            }

            pool.candidates.push(to_candidate(&result, category));
        }
    }

    pools
}

/// Categories of `group` that the raw tags map to.
///
/// A single-category group accepts untagged results, since the query only
/// asked for that category.
fn categories_in_group(group: &QueryGroup, tags: &[String]) -> Vec<Category> {
    let mapped: BTreeSet<Category> = tags
        .iter()
        .filter_map(|tag| category_for_tag(tag))
        .filter(|category| group.categories.contains(category))
        .collect();

    if mapped.is_empty() && group.categories.len() == 1 {
        return group.categories.to_vec();
    }
    mapped.into_iter().collect()
}

fn to_candidate(result: &PlaceResult, category: Category) -> Candidate {
    Candidate {
        name: result.name.clone().unwrap_or_default().trim().to_string(),
        category,
        coordinates: result.coordinates,
        source_id: result.source_id.clone().filter(|id| !id.is_empty()),
        raw_category_tags: result.category_tags.iter().cloned().collect(),
    }
}

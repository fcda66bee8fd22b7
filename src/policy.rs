//! Per-category selection rules.
//!
//! Selection runs twice. Before refinement, Haversine-ranked pools are cut
//! down to the shortlist worth paying routed-distance calls for. After
//! refinement, rules that depend on accurate distance (the supermarket chain
//! union and the childcare radius cap) narrow the shortlist again.

use std::collections::HashSet;

use crate::catalog::ReferenceCatalog;
use crate::config::SelectionConfig;
use crate::haversine::sort_ranked;
use crate::types::{Candidate, Category, Ranked, RefinedDistance, ReferenceKind, ReferenceLocation, Tier};

/// Where the childcare shortlist came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildcareSource {
    TextSearch,
    PlacesFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChildcareSelection {
    pub source: ChildcareSource,
    pub shortlist: Vec<Ranked<Candidate>>,
}

/// A shortlisted item paired with its routed distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Refined<T> {
    pub item: T,
    pub distance: RefinedDistance,
}

/// Everything chosen for refinement, per category.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shortlist {
    pub rail: Vec<Ranked<Candidate>>,
    pub bus: Vec<Ranked<Candidate>>,
    pub childcare: Vec<Ranked<Candidate>>,
    pub schools: Vec<Ranked<Candidate>>,
    pub supermarkets: Vec<Ranked<Candidate>>,
    pub hospitals: Vec<Ranked<Candidate>>,
    pub references: Vec<Ranked<ReferenceLocation>>,
}

impl Shortlist {
    pub fn destination_count(&self) -> usize {
        self.rail.len()
            + self.bus.len()
            + self.childcare.len()
            + self.schools.len()
            + self.supermarkets.len()
            + self.hospitals.len()
            + self.references.len()
    }

    /// Trim the shortlist to at most `budget` destinations and return how
    /// many were dropped.
    ///
    /// Trim order, farthest first within each step:
    /// 1. supermarkets that are neither the nearest store nor the nearest
    ///    store of a configured chain;
    /// 2. childcare beyond the fallback shortlist size;
    /// 3. tier-3 reference locations;
    /// 4. any remaining references, then hospitals, supermarkets, schools,
    ///    childcare, bus and rail.
    pub fn fit_budget(&mut self, budget: usize, config: &SelectionConfig) -> usize {
        let before = self.destination_count();
        let mut excess = before.saturating_sub(budget);

        while excess > 0 {
            let Some(index) = redundant_store(&self.supermarkets, config) else {
                break;
            };
            self.supermarkets.remove(index);
            excess -= 1;
        }

        let spare_childcare = self
            .childcare
            .len()
            .saturating_sub(config.childcare_fallback_shortlist);
        excess -= drop_tail(&mut self.childcare, excess.min(spare_childcare));

        while excess > 0 {
            let Some(index) = self.references.iter().rposition(|r| r.item.tier == Tier::Three)
            else {
                break;
            };
            self.references.remove(index);
            excess -= 1;
        }

        excess -= drop_tail(&mut self.references, excess);
        for list in [
            &mut self.hospitals,
            &mut self.supermarkets,
            &mut self.schools,
            &mut self.childcare,
            &mut self.bus,
            &mut self.rail,
        ] {
            excess -= drop_tail(list, excess);
        }

        before - self.destination_count()
    }
}

/// Drop up to `count` trailing entries; returns how many went.
fn drop_tail<T>(list: &mut Vec<T>, count: usize) -> usize {
    let count = count.min(list.len());
    list.truncate(list.len() - count);
    count
}

/// Farthest store that refinement cannot promote into the final union
/// unless routing reorders it.
fn redundant_store(stores: &[Ranked<Candidate>], config: &SelectionConfig) -> Option<usize> {
    let chain_leaders: Vec<usize> = config
        .supermarket_chains
        .iter()
        .filter_map(|chain| stores.iter().position(|s| is_chain(&s.item.name, chain)))
        .collect();
    (1..stores.len()).rev().find(|index| !chain_leaders.contains(index))
}

/// Nearest `count` entries of an already-ranked pool.
pub fn select_nearest<T>(mut pool: Vec<Ranked<T>>, count: usize) -> Vec<Ranked<T>> {
    pool.truncate(count);
    pool
}

/// Nearest operational train or tram station.
pub fn select_rail(
    train: Vec<Ranked<Candidate>>,
    tram: Vec<Ranked<Candidate>>,
    config: &SelectionConfig,
) -> Vec<Ranked<Candidate>> {
    let mut merged: Vec<Ranked<Candidate>> = train
        .into_iter()
        .chain(tram)
        .filter(|ranked| !matches_any(&ranked.item.name, &config.rail_denylist))
        .collect();
    sort_ranked(&mut merged);
    select_nearest(merged, config.rail_count)
}

/// Childcare shortlist, preferring text-search results.
///
/// `text` must already be ranked. The places-search fallback merges
/// kindergartens with generic childcare, skipping generic entries that are
/// also tagged or listed as kindergartens.
pub fn select_childcare(
    text: Vec<Ranked<Candidate>>,
    kindergarten: Vec<Ranked<Candidate>>,
    childcare: Vec<Ranked<Candidate>>,
    config: &SelectionConfig,
) -> ChildcareSelection {
    let radius = f64::from(config.childcare_text_radius_meters);
    let text: Vec<Ranked<Candidate>> = text
        .into_iter()
        .filter(|ranked| ranked.approximate_distance_meters <= radius)
        .take(config.childcare_text_max_results)
        .collect();

    if !text.is_empty() {
        return ChildcareSelection {
            source: ChildcareSource::TextSearch,
            shortlist: text,
        };
    }

    let kindergarten_ids: HashSet<&str> = kindergarten
        .iter()
        .filter_map(|ranked| ranked.item.source_id.as_deref())
        .collect();
    let kindergarten_tag = crate::category::search_tag(Category::Kindergarten);

    let generic: Vec<Ranked<Candidate>> = childcare
        .into_iter()
        .filter(|ranked| {
            let listed = ranked
                .item
                .source_id
                .as_deref()
                .is_some_and(|id| kindergarten_ids.contains(id));
            let tagged = ranked.item.raw_category_tags.contains(kindergarten_tag);
            !listed && !tagged
        })
        .collect();

    let mut merged: Vec<Ranked<Candidate>> = kindergarten.into_iter().chain(generic).collect();
    sort_ranked(&mut merged);

    ChildcareSelection {
        source: ChildcareSource::PlacesFallback,
        shortlist: select_nearest(merged, config.childcare_fallback_shortlist),
    }
}

/// Nearest `supermarket_shortlist` stores, plus the nearest store of every
/// configured chain that is not already in that set.
pub fn select_supermarkets(
    pool: Vec<Ranked<Candidate>>,
    config: &SelectionConfig,
) -> Vec<Ranked<Candidate>> {
    let mut chosen = vec![false; pool.len()];
    for flag in chosen.iter_mut().take(config.supermarket_shortlist) {
        *flag = true;
    }

    for chain in &config.supermarket_chains {
        let already = pool
            .iter()
            .zip(&chosen)
            .any(|(ranked, picked)| *picked && is_chain(&ranked.item.name, chain));
        if already {
            continue;
        }
        if let Some(index) = pool.iter().position(|ranked| is_chain(&ranked.item.name, chain)) {
            chosen[index] = true;
        }
    }

    pool.into_iter()
        .zip(chosen)
        .filter_map(|(ranked, picked)| picked.then_some(ranked))
        .collect()
}

/// Nearest hospitals after discarding internal points of interest.
///
/// Falls back to the unfiltered pool if the filter removes everything.
pub fn select_hospitals(
    pool: Vec<Ranked<Candidate>>,
    config: &SelectionConfig,
) -> Vec<Ranked<Candidate>> {
    let pool = select_nearest(pool, config.hospital_pool);
    let filtered: Vec<Ranked<Candidate>> = pool
        .iter()
        .filter(|ranked| !is_hospital_sub_location(&ranked.item.name, config))
        .cloned()
        .collect();

    let source = if filtered.is_empty() { pool } else { filtered };
    select_nearest(source, config.hospital_count)
}

pub fn is_hospital_sub_location(name: &str, config: &SelectionConfig) -> bool {
    !contains_term(name, "hospital") && matches_any(name, &config.hospital_sub_location_terms)
}

/// Nearest airport and city of every populated tier.
///
/// A promoted secondary city that is strictly closer than the chosen tier-1
/// city is added too, unless already chosen. The result is ranked.
pub fn select_references(
    ranked: Vec<Ranked<ReferenceLocation>>,
    catalog: &ReferenceCatalog,
) -> Vec<Ranked<ReferenceLocation>> {
    let mut selected: Vec<Ranked<ReferenceLocation>> = Vec::new();

    for kind in [ReferenceKind::Airport, ReferenceKind::City] {
        for tier in Tier::ALL {
            if let Some(nearest) = ranked
                .iter()
                .find(|r| r.item.kind == kind && r.item.tier == tier)
            {
                selected.push(nearest.clone());
            }
        }
    }

    let tier_one_city = selected
        .iter()
        .find(|r| r.item.kind == ReferenceKind::City && r.item.tier == Tier::One)
        .map(|r| r.approximate_distance_meters);

    if let Some(tier_one_distance) = tier_one_city {
        let promoted = ranked.iter().find(|r| {
            catalog.is_promoted(&r.item)
                && r.approximate_distance_meters < tier_one_distance
                && !selected.iter().any(|s| s.item == r.item)
        });
        if let Some(promoted) = promoted {
            selected.push(promoted.clone());
        }
    }

    sort_ranked(&mut selected);
    selected
}

/// Sort refined entries ascending by routed distance. Ties keep input order.
pub fn sort_refined<T>(entries: &mut [Refined<T>]) {
    entries.sort_by_key(|entry| entry.distance.distance_meters);
}

/// Nearest store overall plus the nearest store of every configured chain.
pub fn finalize_supermarkets(
    mut entries: Vec<Refined<Candidate>>,
    config: &SelectionConfig,
) -> Vec<Refined<Candidate>> {
    sort_refined(&mut entries);

    let mut keep = vec![false; entries.len()];
    if let Some(first) = keep.first_mut() {
        *first = true;
    }
    for chain in &config.supermarket_chains {
        if let Some(index) = entries.iter().position(|e| is_chain(&e.item.name, chain)) {
            keep[index] = true;
        }
    }

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, kept)| kept.then_some(entry))
        .collect()
}

/// Apply the routed-distance radius cap and the final count.
pub fn finalize_childcare(
    mut entries: Vec<Refined<Candidate>>,
    source: ChildcareSource,
    config: &SelectionConfig,
) -> Vec<Refined<Candidate>> {
    sort_refined(&mut entries);
    let limit = match source {
        ChildcareSource::TextSearch => config.childcare_text_max_results,
        ChildcareSource::PlacesFallback => config.childcare_fallback_final,
    };
    entries
        .into_iter()
        .filter(|e| e.distance.distance_meters <= config.childcare_radius_cap_meters)
        .take(limit)
        .collect()
}

pub fn is_chain(name: &str, chain: &str) -> bool {
    contains_term(name, chain)
}

fn matches_any(name: &str, terms: &[String]) -> bool {
    terms.iter().any(|term| contains_term(name, term))
}

/// Case-insensitive whole-word match of `term` inside `name`.
fn contains_term(name: &str, term: &str) -> bool {
    let words = tokenize(name);
    let needle = tokenize(term);
    if needle.is_empty() || needle.len() > words.len() {
        return false;
    }
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

//! Routed-distance refinement of the shortlist.
//!
//! Destinations are sent in chunks of at most the per-call limit, one chunk
//! after another. Output is always one keyed result per destination in input
//! order; anything that fails comes back as [`RefinedDistance::SENTINEL`].

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use tracing::{debug, warn};

use crate::traits::RoutedDistanceProvider;
use crate::types::{Destination, DestinationKey, DestinationTarget, Origin, RefinedDistance};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Refinement {
    /// Same length and order as the submitted destinations.
    pub distances: Vec<(DestinationKey, RefinedDistance)>,
    pub calls: usize,
    pub failed_chunks: usize,
    pub failed_elements: usize,
    pub notes: Vec<String>,
}

/// The first `weekday` strictly after `today`, at `hour`:00.
pub fn next_departure(today: NaiveDate, weekday: Weekday, hour: u32) -> NaiveDateTime {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let mut days_ahead = (target + 7 - current) % 7;
    if days_ahead == 0 {
        days_ahead = 7;
    }

    let date = today
        .checked_add_days(Days::new(u64::from(days_ahead)))
        .unwrap_or(today);
    let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    date.and_time(time)
}

/// Unix timestamp of the next departure slot in local time.
pub fn departure_timestamp(weekday: Weekday, hour: u32) -> i64 {
    let today = Local::now().date_naive();
    let departure = next_departure(today, weekday, hour);
    Local
        .from_local_datetime(&departure)
        .earliest()
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| departure.and_utc().timestamp())
}

/// Refine every destination, `max_per_call` at a time.
pub fn refine<D>(
    provider: &D,
    origin: &Origin,
    destinations: &[Destination],
    max_per_call: usize,
    departure_unix: i64,
) -> Refinement
where
    D: RoutedDistanceProvider + ?Sized,
{
    let mut refinement = Refinement {
        distances: Vec::with_capacity(destinations.len()),
        ..Refinement::default()
    };

    for (chunk_index, chunk) in destinations.chunks(max_per_call.max(1)).enumerate() {
        let targets: Vec<DestinationTarget> = chunk.iter().map(|d| d.target.clone()).collect();
        refinement.calls += 1;
        debug!(chunk = chunk_index, destinations = chunk.len(), "routed distance request");

        match provider.distance_matrix(origin, &targets, departure_unix) {
            Ok(results) if results.len() == chunk.len() => {
                for (destination, result) in chunk.iter().zip(results) {
                    let distance = match result {
                        Some(distance) if !distance.is_sentinel() => distance,
                        _ => {
                            refinement.failed_elements += 1;
                            RefinedDistance::SENTINEL
                        }
                    };
                    refinement.distances.push((destination.key, distance));
                }
            }
            Ok(results) => {
                warn!(
                    chunk = chunk_index,
                    expected = chunk.len(),
                    actual = results.len(),
                    "routed distance response misaligned, discarding chunk"
                );
                refinement.notes.push(format!(
                    "distance chunk {chunk_index}: expected {} results, got {}",
                    chunk.len(),
                    results.len()
                ));
                fail_chunk(&mut refinement, chunk);
            }
            Err(err) => {
                warn!(chunk = chunk_index, error = %err, "routed distance request failed");
                refinement
                    .notes
                    .push(format!("distance chunk {chunk_index}: {err}"));
                fail_chunk(&mut refinement, chunk);
            }
        }
    }

    refinement
}

fn fail_chunk(refinement: &mut Refinement, chunk: &[Destination]) {
    refinement.failed_chunks += 1;
    refinement
        .distances
        .extend(chunk.iter().map(|d| (d.key, RefinedDistance::SENTINEL)));
}

//! Grouping and ordering of unordered upstream readings.
//!
//! The upstream returns arrival and timetable records in arbitrary order,
//! with duplicates across vehicles. Records are grouped by (route-or-line,
//! direction), sorted within a group by estimated time, and groups ordered
//! by their soonest arrival. All sorts are stable so ties keep insertion
//! order and output is deterministic.

use std::collections::HashMap;

use crate::domain::{DirectionGroup, RawBusArrival, RawTimetableEntry};

/// A record that can be grouped into a direction group.
pub trait DirectionKeyed {
    /// Route or line identifier.
    fn route_id(&self) -> &str;

    /// Direction key: headsign for metro, outbound/inbound for bus.
    fn direction_key(&self) -> &str;

    /// Comparable estimate for ordering; `None` means unknown and sorts
    /// last. Units only need to be consistent within one record type.
    fn estimate(&self) -> Option<i64>;
}

impl DirectionKeyed for RawTimetableEntry {
    fn route_id(&self) -> &str {
        &self.line_id
    }

    fn direction_key(&self) -> &str {
        &self.headsign
    }

    fn estimate(&self) -> Option<i64> {
        // Earliest scheduled time of day, in minutes.
        self.times.iter().min().map(|t| i64::from(t.minutes()))
    }
}

impl DirectionKeyed for RawBusArrival {
    fn route_id(&self) -> &str {
        &self.route_id
    }

    fn direction_key(&self) -> &str {
        self.direction.as_str()
    }

    fn estimate(&self) -> Option<i64> {
        self.estimate_secs.map(i64::from)
    }
}

/// Sort key placing unknown estimates last.
fn estimate_key(estimate: Option<i64>) -> (bool, i64) {
    (estimate.is_none(), estimate.unwrap_or(0))
}

/// Group records by (route, direction) and order everything by soonest
/// arrival.
pub fn group_by_direction<T: DirectionKeyed>(records: Vec<T>) -> Vec<DirectionGroup<T>> {
    let mut order: Vec<(String, String)> = Vec::new();
    let mut buckets: HashMap<(String, String), Vec<T>> = HashMap::new();

    for record in records {
        let key = (
            record.route_id().to_string(),
            record.direction_key().to_string(),
        );
        match buckets.get_mut(&key) {
            Some(members) => members.push(record),
            None => {
                order.push(key.clone());
                buckets.insert(key, vec![record]);
            }
        }
    }

    let mut groups: Vec<DirectionGroup<T>> = order
        .into_iter()
        .map(|key| {
            let mut entries = buckets.remove(&key).expect("bucket for ordered key");
            entries.sort_by_key(|e| estimate_key(e.estimate()));
            DirectionGroup {
                route_id: key.0,
                direction: key.1,
                entries,
            }
        })
        .collect();

    // Order groups by their earliest timed entry; untimed groups last.
    // sort_by_key is stable, so equal keys keep insertion order.
    groups.sort_by_key(|g| estimate_key(g.entries.iter().filter_map(|e| e.estimate()).min()));

    groups
}

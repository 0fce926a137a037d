//! Status engine facade.
//!
//! Ties the fetch orchestrator, direction disambiguator, grouper, and
//! next-departure calculator into the three user-facing queries. Every
//! query resolves to a board, never an error; degraded upstreams surface
//! only through the board's freshness.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::domain::{
    CivilTime, DirectionGroup, RawBusArrival, RawTimetableEntry, ServiceDays, StationId, StopId,
};

use super::disambiguate::DirectionRules;
use super::group::group_by_direction;
use super::next_event::{NextDeparture, next_departure};
use super::orchestrator::{FetchOrchestrator, Freshness, QueryKey, TransitSource};

/// TTL classes for the two kinds of transit data.
#[derive(Debug, Clone)]
pub struct StatusConfig {
    /// TTL for schedule-like data (first/last-train tables); these change
    /// at most daily.
    pub schedule_ttl: Duration,

    /// TTL for live data (timetables, bus estimates).
    pub live_ttl: Duration,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            schedule_ttl: Duration::from_secs(30 * 60),
            live_ttl: Duration::from_secs(20),
        }
    }
}

impl StatusConfig {
    /// Set the schedule-data TTL.
    pub fn with_schedule_ttl(mut self, ttl: Duration) -> Self {
        self.schedule_ttl = ttl;
        self
    }

    /// Set the live-data TTL.
    pub fn with_live_ttl(mut self, ttl: Duration) -> Self {
        self.live_ttl = ttl;
        self
    }
}

/// First and last train for one direction at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstLastDirection {
    pub line_id: String,
    pub headsign: String,
    pub first_train: CivilTime,
    pub last_train: CivilTime,
    pub service_days: Option<ServiceDays>,
}

/// First/last-train board for a station.
#[derive(Debug, Clone)]
pub struct FirstLastBoard {
    pub station: StationId,
    pub directions: Vec<FirstLastDirection>,
    pub freshness: Freshness,
}

/// Upcoming departures for one direction at a station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableDirection {
    pub line_id: String,
    pub headsign: String,
    /// Scheduled times applicable today, ascending.
    pub upcoming: Vec<CivilTime>,
    /// Next departure relative to now; `None` when no times are known.
    pub next: Option<NextDeparture>,
}

/// Live timetable board for a station.
#[derive(Debug, Clone)]
pub struct TimetableBoard {
    pub station: StationId,
    pub directions: Vec<TimetableDirection>,
    pub freshness: Freshness,
}

/// Live bus arrival board for a stop.
#[derive(Debug, Clone)]
pub struct BusBoard {
    pub stop: StopId,
    pub groups: Vec<DirectionGroup<RawBusArrival>>,
    pub freshness: Freshness,
}

/// The transit status engine.
pub struct StatusEngine<S> {
    orchestrator: FetchOrchestrator<S>,
    rules: DirectionRules,
    config: StatusConfig,
    clock: Arc<dyn Clock>,
}

impl<S: TransitSource> StatusEngine<S> {
    /// Create an engine over the given upstream source.
    pub fn new(
        source: S,
        rules: DirectionRules,
        config: StatusConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orchestrator: FetchOrchestrator::new(source, Arc::clone(&clock)),
            rules,
            config,
            clock,
        }
    }

    /// First/last-train board for a station.
    pub async fn metro_first_last(&self, station: &StationId) -> FirstLastBoard {
        let outcome = self
            .orchestrator
            .fetch(
                QueryKey::MetroFirstLast(station.clone()),
                self.config.schedule_ttl,
            )
            .await;

        let entries = self
            .rules
            .filter(station, outcome.payload.timetable_entries().to_vec());

        let directions = group_by_direction(entries)
            .into_iter()
            .flat_map(|group| group.entries)
            .filter_map(|entry| {
                let first = entry.times.iter().copied().min_by_key(|&t| service_order(t))?;
                let last = entry
                    .times
                    .iter()
                    .copied()
                    .max_by_key(|&t| service_order(t))
                    .unwrap_or(first);
                Some(FirstLastDirection {
                    line_id: entry.line_id,
                    headsign: entry.headsign,
                    first_train: first,
                    last_train: last,
                    service_days: entry.service_days,
                })
            })
            .collect();

        FirstLastBoard {
            station: station.clone(),
            directions,
            freshness: outcome.freshness,
        }
    }

    /// Live timetable board for a station, filtered to entries whose
    /// service days include today.
    pub async fn metro_timetable(&self, station: &StationId) -> TimetableBoard {
        let outcome = self
            .orchestrator
            .fetch(
                QueryKey::MetroTimetable(station.clone()),
                self.config.live_ttl,
            )
            .await;

        let civil = self.clock.civil_now();

        let entries: Vec<RawTimetableEntry> = self
            .rules
            .filter(station, outcome.payload.timetable_entries().to_vec())
            .into_iter()
            .filter(|entry| {
                entry
                    .service_days
                    .is_none_or(|days| days.contains(civil.weekday))
            })
            .collect();

        // Next departure is computed per direction group independently:
        // one direction having no service left today must not suppress
        // the other.
        let directions = group_by_direction(entries)
            .into_iter()
            .map(|group| {
                let mut upcoming: Vec<CivilTime> = group
                    .entries
                    .iter()
                    .flat_map(|entry| entry.times.iter().copied())
                    .collect();
                upcoming.sort_unstable();
                upcoming.dedup();

                let next = next_departure(&upcoming, civil.time);
                let line_id = group.route_id;
                let headsign = group.direction;

                TimetableDirection {
                    line_id,
                    headsign,
                    upcoming,
                    next,
                }
            })
            .collect();

        TimetableBoard {
            station: station.clone(),
            directions,
            freshness: outcome.freshness,
        }
    }

    /// Live bus arrival board for a stop.
    pub async fn bus_arrivals(&self, stop: &StopId) -> BusBoard {
        let outcome = self
            .orchestrator
            .fetch(QueryKey::BusArrivals(stop.clone()), self.config.live_ttl)
            .await;

        BusBoard {
            stop: stop.clone(),
            groups: group_by_direction(outcome.payload.bus_arrivals().to_vec()),
            freshness: outcome.freshness,
        }
    }

    /// Both metro boards for a station, fetched concurrently.
    pub async fn metro_station_boards(
        &self,
        station: &StationId,
    ) -> (FirstLastBoard, TimetableBoard) {
        futures::join!(
            self.metro_first_last(station),
            self.metro_timetable(station)
        )
    }
}

/// Position of a time within the service day.
///
/// A "24:00" last train parses as midnight, but in a first/last table it
/// marks the end of service, not the start, so it orders after 23:59.
fn service_order(time: CivilTime) -> u16 {
    if time == CivilTime::MIDNIGHT {
        24 * 60
    } else {
        time.minutes()
    }
}

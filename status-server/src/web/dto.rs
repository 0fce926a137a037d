//! Data transfer objects for web responses.

use serde::Serialize;

use crate::domain::DirectionGroup;
use crate::stations::Station;
use crate::status::{
    BusBoard, FirstLastBoard, Freshness, NextDeparture, TimetableBoard, TimetableDirection,
};

/// Freshness of the data behind a board.
#[derive(Debug, Serialize)]
pub struct FreshnessView {
    /// "fresh", "stale", or "empty".
    pub status: &'static str,

    /// Age of a stale payload in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_secs: Option<u64>,

    /// Degrade reason for stale or empty payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl FreshnessView {
    pub fn from_freshness(freshness: &Freshness) -> Self {
        match freshness {
            Freshness::Fresh => Self {
                status: "fresh",
                age_secs: None,
                reason: None,
            },
            Freshness::Stale { age, reason } => Self {
                status: "stale",
                age_secs: Some(age.as_secs()),
                reason: Some(reason.as_str()),
            },
            Freshness::Empty { reason } => Self {
                status: "empty",
                age_secs: None,
                reason: Some(reason.as_str()),
            },
        }
    }
}

/// A station in the catalogue listing.
#[derive(Debug, Serialize)]
pub struct StationResult {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    pub is_transfer: bool,
}

impl StationResult {
    pub fn from_station(station: &Station) -> Self {
        Self {
            id: station.id.as_str().to_string(),
            name: station.name.clone(),
            lat: station.lat,
            lon: station.lon,
            is_transfer: station.is_transfer,
        }
    }
}

/// Response for the station listing.
#[derive(Debug, Serialize)]
pub struct StationListResponse {
    pub stations: Vec<StationResult>,
}

/// One direction row in a first/last-train table.
#[derive(Debug, Serialize)]
pub struct FirstLastResult {
    pub line: String,
    pub headsign: String,
    /// "HH:MM"
    pub first_train: String,
    /// "HH:MM"
    pub last_train: String,
    /// Weekday names this row applies to; absent means every day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_days: Option<Vec<&'static str>>,
}

/// Response for a first/last-train query.
#[derive(Debug, Serialize)]
pub struct FirstLastResponse {
    pub station: String,
    pub directions: Vec<FirstLastResult>,
    pub freshness: FreshnessView,
}

impl FirstLastResponse {
    pub fn from_board(board: &FirstLastBoard) -> Self {
        Self {
            station: board.station.as_str().to_string(),
            directions: board
                .directions
                .iter()
                .map(|d| FirstLastResult {
                    line: d.line_id.clone(),
                    headsign: d.headsign.clone(),
                    first_train: d.first_train.to_string(),
                    last_train: d.last_train.to_string(),
                    service_days: d.service_days.map(|days| days.names()),
                })
                .collect(),
            freshness: FreshnessView::from_freshness(&board.freshness),
        }
    }
}

/// The next departure in a direction.
#[derive(Debug, Serialize)]
pub struct NextDepartureResult {
    /// "HH:MM"
    pub time: String,

    /// Minutes until departure; absent when the time is tomorrow's first
    /// service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutes_remaining: Option<u16>,

    /// Whether the departure is tomorrow's first service.
    pub is_next_day: bool,
}

impl NextDepartureResult {
    fn from_next(next: &NextDeparture) -> Self {
        Self {
            time: next.time.to_string(),
            minutes_remaining: next.minutes_remaining,
            is_next_day: next.minutes_remaining.is_none(),
        }
    }
}

/// One direction in a live timetable.
#[derive(Debug, Serialize)]
pub struct TimetableResult {
    pub line: String,
    pub headsign: String,
    /// Today's scheduled times, ascending, "HH:MM".
    pub upcoming: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextDepartureResult>,
}

/// Response for a live timetable query.
#[derive(Debug, Serialize)]
pub struct TimetableResponse {
    pub station: String,
    pub directions: Vec<TimetableResult>,
    pub freshness: FreshnessView,
}

impl TimetableResponse {
    pub fn from_board(board: &TimetableBoard) -> Self {
        Self {
            station: board.station.as_str().to_string(),
            directions: board
                .directions
                .iter()
                .map(TimetableResult::from_direction)
                .collect(),
            freshness: FreshnessView::from_freshness(&board.freshness),
        }
    }
}

impl TimetableResult {
    fn from_direction(direction: &TimetableDirection) -> Self {
        Self {
            line: direction.line_id.clone(),
            headsign: direction.headsign.clone(),
            upcoming: direction.upcoming.iter().map(|t| t.to_string()).collect(),
            next: direction.next.as_ref().map(NextDepartureResult::from_next),
        }
    }
}

/// One bus reading in an arrival group.
#[derive(Debug, Serialize)]
pub struct BusArrivalResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate_secs: Option<u32>,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
}

/// One route/direction group of bus arrivals.
#[derive(Debug, Serialize)]
pub struct BusGroupResult {
    pub route: String,
    pub route_name: String,
    pub direction: String,
    pub arrivals: Vec<BusArrivalResult>,
}

/// Response for a bus arrival query.
#[derive(Debug, Serialize)]
pub struct BusArrivalsResponse {
    pub stop: String,
    pub groups: Vec<BusGroupResult>,
    pub freshness: FreshnessView,
}

impl BusArrivalsResponse {
    pub fn from_board(board: &BusBoard) -> Self {
        Self {
            stop: board.stop.as_str().to_string(),
            groups: board.groups.iter().map(BusGroupResult::from_group).collect(),
            freshness: FreshnessView::from_freshness(&board.freshness),
        }
    }
}

impl BusGroupResult {
    fn from_group(group: &DirectionGroup<crate::domain::RawBusArrival>) -> Self {
        let route_name = group
            .entries
            .first()
            .map(|a| a.route_name.clone())
            .unwrap_or_else(|| group.route_id.clone());

        Self {
            route: group.route_id.clone(),
            route_name,
            direction: group.direction.clone(),
            arrivals: group
                .entries
                .iter()
                .map(|a| BusArrivalResult {
                    estimate_secs: a.estimate_secs,
                    status: a.status.as_str(),
                    plate: a.plate.clone(),
                })
                .collect(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

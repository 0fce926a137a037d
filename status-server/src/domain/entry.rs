//! Normalized upstream records.
//!
//! These are the records the upstream client produces after defensive
//! parsing. They are never mutated downstream, only filtered and grouped.

use super::ids::StationId;
use super::time::{CivilTime, ServiceDays};

/// A normalized metro timetable record: one destination/direction at the
/// queried station, with one or more scheduled times.
///
/// For first/last-train queries the times are the first and last train; for
/// live timetable queries they are the upcoming scheduled arrivals. The
/// upstream does not guarantee any ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTimetableEntry {
    /// Line identifier (e.g. "G", "BL").
    pub line_id: String,

    /// Destination station id, when the upstream provides one.
    pub destination_id: Option<StationId>,

    /// Destination display name.
    pub destination_name: String,

    /// Human-readable direction label (e.g. "往新店").
    pub headsign: String,

    /// Scheduled times of day, unordered as received.
    pub times: Vec<CivilTime>,

    /// Weekdays this entry applies to; absent means every day.
    pub service_days: Option<ServiceDays>,

    /// Upstream's own update timestamp, passed through for display.
    pub updated_at: Option<String>,
}

/// Travel direction of a bus route, as encoded by the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Away from the route origin.
    Outbound,
    /// Back towards the route origin.
    Inbound,
}

impl Direction {
    /// Stable key used for grouping and serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
        }
    }
}

/// Stop-level status of a bus, beyond the raw arrival estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopStatus {
    /// Normal operation, the estimate is live.
    Approaching,
    /// The bus has not left the depot yet.
    NotYetDispatched,
    /// Skipping this stop due to traffic control.
    TrafficControl,
    /// The last bus of the day has already departed.
    LastBusDeparted,
    /// The route is not operating today.
    NotOperating,
}

impl StopStatus {
    /// Stable label used for serialization.
    pub fn as_str(&self) -> &'static str {
        match self {
            StopStatus::Approaching => "approaching",
            StopStatus::NotYetDispatched => "not-yet-dispatched",
            StopStatus::TrafficControl => "traffic-control",
            StopStatus::LastBusDeparted => "last-bus-departed",
            StopStatus::NotOperating => "not-operating",
        }
    }
}

/// A normalized live bus arrival: one vehicle/route/direction reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBusArrival {
    /// Route identifier.
    pub route_id: String,

    /// Route display name.
    pub route_name: String,

    /// Travel direction.
    pub direction: Direction,

    /// Estimated seconds until arrival; absent when the upstream has no
    /// live estimate (not dispatched, not operating, ...).
    pub estimate_secs: Option<u32>,

    /// Stop-level status.
    pub status: StopStatus,

    /// Vehicle plate, when a vehicle is assigned.
    pub plate: Option<String>,
}

/// Records sharing a route (or line) and travel direction, sorted ascending
/// by estimated time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionGroup<T> {
    /// Route or line identifier shared by the group.
    pub route_id: String,

    /// Direction key: a headsign for metro entries, `outbound`/`inbound`
    /// for bus arrivals.
    pub direction: String,

    /// Member records, sorted ascending by estimate, unknowns last.
    pub entries: Vec<T>,
}

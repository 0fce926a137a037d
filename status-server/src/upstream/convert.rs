//! Conversion from proxy DTOs to normalized records.
//!
//! A malformed record never fails its batch: it is skipped with a debug
//! log and the rest of the response is kept. The live timetable's arrival
//! time field name is not guaranteed, so an ordered list of accessors is
//! probed and the first non-absent result wins.

use serde_json::Value;
use tracing::debug;

use crate::domain::{
    CivilTime, Direction, RawBusArrival, RawTimetableEntry, ServiceDays, StationId, StopStatus,
};

use super::types::{BusArrivalDto, FirstLastDto};

/// Convert first/last-train rows, skipping malformed ones.
pub fn convert_first_last(dtos: Vec<FirstLastDto>) -> Vec<RawTimetableEntry> {
    let mut entries = Vec::with_capacity(dtos.len());

    for dto in dtos {
        match convert_first_last_row(&dto) {
            Some(entry) => entries.push(entry),
            None => debug!(?dto, "skipping malformed first/last row"),
        }
    }

    entries
}

fn convert_first_last_row(dto: &FirstLastDto) -> Option<RawTimetableEntry> {
    let destination_name = dto.destination_name.clone()?;
    let headsign = dto
        .trip_head_sign
        .clone()
        .unwrap_or_else(|| format!("往{destination_name}"));

    let destination_id = dto
        .destination_station_id
        .as_deref()
        .and_then(|s| StationId::parse(s).ok());

    // A row without a line id is still usable if the destination id
    // carries a line prefix.
    let line_id = dto
        .line_id
        .clone()
        .or_else(|| destination_id.as_ref().map(|id| id.line_prefix().to_string()))?;

    let mut times = Vec::with_capacity(2);
    for raw in [&dto.first_train_time, &dto.last_train_time]
        .into_iter()
        .flatten()
    {
        match CivilTime::parse_hhmm(raw) {
            Ok(t) => times.push(t),
            Err(e) => debug!(time = %raw, error = %e, "unparseable train time"),
        }
    }
    if times.is_empty() {
        return None;
    }

    Some(RawTimetableEntry {
        line_id,
        destination_id,
        destination_name,
        headsign,
        times,
        service_days: dto.service_day.map(ServiceDays::from_bits),
        updated_at: dto.src_update_time.clone(),
    })
}

/// Field names under which deployments nest the per-train schedule list,
/// probed in order.
const SCHEDULE_LIST_FIELDS: &[&str] = &["Timetables", "Schedules", "Trains"];

/// Accessors for a per-train record's arrival time, probed in order; the
/// first non-absent result wins.
const TIME_ACCESSORS: &[(&str, fn(&Value) -> Option<&str>)] = &[
    ("ArrivalTime", |v| {
        v.get("ArrivalTime").and_then(Value::as_str)
    }),
    ("ArriveTime", |v| v.get("ArriveTime").and_then(Value::as_str)),
    ("DepartureTime", |v| {
        v.get("DepartureTime").and_then(Value::as_str)
    }),
    ("Time", |v| v.get("Time").and_then(Value::as_str)),
];

/// Convert live timetable records, skipping malformed ones.
///
/// Records are loosely typed because the schedule-list and time field names
/// vary between provider deployments.
pub fn convert_timetable(records: Vec<Value>) -> Vec<RawTimetableEntry> {
    let mut entries = Vec::with_capacity(records.len());

    for record in &records {
        match convert_timetable_record(record) {
            Some(entry) => entries.push(entry),
            None => debug!(%record, "skipping malformed timetable record"),
        }
    }

    entries
}

fn convert_timetable_record(record: &Value) -> Option<RawTimetableEntry> {
    let destination_name = record
        .get("DestinationName")
        .and_then(Value::as_str)?
        .to_string();
    let headsign = record
        .get("TripHeadSign")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("往{destination_name}"));

    let destination_id = record
        .get("DestinationStationID")
        .and_then(Value::as_str)
        .and_then(|s| StationId::parse(s).ok());

    let line_id = record
        .get("LineID")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| destination_id.as_ref().map(|id| id.line_prefix().to_string()))?;

    let trains = SCHEDULE_LIST_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(Value::as_array))?;

    let mut times = Vec::with_capacity(trains.len());
    for train in trains {
        match probe_arrival_time(train) {
            Some(t) => times.push(t),
            None => debug!(%train, "per-train record has no usable time"),
        }
    }
    if times.is_empty() {
        return None;
    }

    let service_days = record
        .get("ServiceDay")
        .and_then(Value::as_u64)
        .map(|bits| ServiceDays::from_bits(bits as u8));

    Some(RawTimetableEntry {
        line_id,
        destination_id,
        destination_name,
        headsign,
        times,
        service_days,
        updated_at: record
            .get("SrcUpdateTime")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Try each time accessor in order; first parseable hit wins.
fn probe_arrival_time(train: &Value) -> Option<CivilTime> {
    for (name, accessor) in TIME_ACCESSORS {
        if let Some(raw) = accessor(train) {
            match CivilTime::parse_hhmm(raw) {
                Ok(t) => {
                    debug!(field = name, "arrival time accessor matched");
                    return Some(t);
                }
                Err(e) => debug!(field = name, time = raw, error = %e, "accessor hit but unparseable"),
            }
        }
    }
    None
}

/// Convert live bus arrival rows, skipping malformed ones.
pub fn convert_bus_arrivals(dtos: Vec<BusArrivalDto>) -> Vec<RawBusArrival> {
    let mut arrivals = Vec::with_capacity(dtos.len());

    for dto in dtos {
        match convert_bus_row(&dto) {
            Some(arrival) => arrivals.push(arrival),
            None => debug!(?dto, "skipping malformed bus arrival row"),
        }
    }

    arrivals
}

fn convert_bus_row(dto: &BusArrivalDto) -> Option<RawBusArrival> {
    let route_id = dto.route_id.clone()?;
    let route_name = dto.route_name.clone().unwrap_or_else(|| route_id.clone());

    let direction = match dto.direction? {
        0 => Direction::Outbound,
        1 => Direction::Inbound,
        _ => return None,
    };

    let status = match dto.stop_status.unwrap_or(0) {
        0 => StopStatus::Approaching,
        1 => StopStatus::NotYetDispatched,
        2 => StopStatus::TrafficControl,
        3 => StopStatus::LastBusDeparted,
        4 => StopStatus::NotOperating,
        _ => return None,
    };

    // Negative estimates are "no data" sentinels.
    let estimate_secs = dto
        .estimate_time
        .filter(|&secs| secs >= 0)
        .map(|secs| secs as u32);

    let plate = dto
        .plate_numb
        .clone()
        .filter(|p| !p.is_empty() && p != "-1");

    Some(RawBusArrival {
        route_id,
        route_name,
        direction,
        estimate_secs,
        status,
        plate,
    })
}

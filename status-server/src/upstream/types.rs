//! Transit proxy response DTOs.
//!
//! These map directly to the proxied provider JSON. They use `Option`
//! liberally because the provider omits fields rather than sending null in
//! many cases, and different deployments disagree on which fields exist.
//!
//! Live timetable records are *not* typed here: their per-train time field
//! name varies between deployments, so they are handled as raw
//! `serde_json::Value` with accessor probing in `convert`.

use serde::Deserialize;

/// One row of the metro first/last-train table: a destination/direction at
/// the queried station.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FirstLastDto {
    /// Line identifier (e.g. "G").
    #[serde(rename = "LineID")]
    pub line_id: Option<String>,

    /// Destination station id.
    #[serde(rename = "DestinationStationID")]
    pub destination_station_id: Option<String>,

    /// Destination display name.
    pub destination_name: Option<String>,

    /// Direction label as shown on the train (e.g. "往新店").
    pub trip_head_sign: Option<String>,

    /// First train time, "HH:MM".
    pub first_train_time: Option<String>,

    /// Last train time, "HH:MM". May be "24:00".
    pub last_train_time: Option<String>,

    /// Weekday bitmask, bit 0 = Monday. Absent means every day.
    pub service_day: Option<u8>,

    /// Provider's own update timestamp.
    pub src_update_time: Option<String>,
}

/// One live bus arrival reading: a vehicle/route/direction combination at
/// the queried stop.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusArrivalDto {
    /// Route identifier.
    #[serde(rename = "RouteID")]
    pub route_id: Option<String>,

    /// Route display name.
    pub route_name: Option<String>,

    /// 0 = outbound, 1 = inbound.
    pub direction: Option<u8>,

    /// Estimated seconds to arrival. Negative values are sentinels for
    /// "no estimate".
    pub estimate_time: Option<i64>,

    /// Stop status code: 0 approaching, 1 not yet dispatched, 2 traffic
    /// control, 3 last bus departed, 4 not operating today.
    pub stop_status: Option<u8>,

    /// Vehicle plate. The provider uses "-1" when no vehicle is assigned.
    pub plate_numb: Option<String>,
}

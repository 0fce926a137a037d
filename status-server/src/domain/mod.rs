//! Domain types for the transit status engine.
//!
//! All identifier and time types validate their invariants at construction,
//! so downstream code can trust any value it receives.

mod entry;
mod ids;
mod time;

pub use entry::{Direction, DirectionGroup, RawBusArrival, RawTimetableEntry, StopStatus};
pub use ids::{InvalidStationId, InvalidStopId, StationId, StopId};
pub use time::{CivilTime, InvalidCivilTime, ServiceDays};

//! Next-departure arithmetic with day rollover.

use crate::domain::CivilTime;

/// The next departure in a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextDeparture {
    /// Time of day of the departure.
    pub time: CivilTime,

    /// Minutes until the departure, if it is still today. `None` means the
    /// time is tomorrow's first service; callers must render that
    /// distinctly, never as "0 minutes".
    pub minutes_remaining: Option<u16>,
}

/// Find the earliest departure at or after `now`.
///
/// If every time has already passed today, the result is the earliest time
/// in the list — the first service of the next day — with no
/// minutes-remaining value. Empty input yields `None`; a station with no
/// schedule is an absence, not an error.
pub fn next_departure(times: &[CivilTime], now: CivilTime) -> Option<NextDeparture> {
    let remaining_today = times.iter().copied().filter(|&t| t >= now).min();

    match remaining_today {
        Some(time) => Some(NextDeparture {
            time,
            minutes_remaining: Some(time.minutes() - now.minutes()),
        }),
        None => times.iter().copied().min().map(|time| NextDeparture {
            time,
            minutes_remaining: None,
        }),
    }
}

//! Civil time-of-day handling.
//!
//! The upstream provides times as "HH:MM" strings in the venue's local
//! civil day. The engine represents them as minutes since midnight
//! (0-1439); day rollover is handled at the point of use (next-departure
//! arithmetic), not by tracking dates.

use std::fmt;

use chrono::Weekday;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct InvalidCivilTime {
    reason: &'static str,
}

impl InvalidCivilTime {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day in the venue's local civil day, minutes since midnight.
///
/// # Examples
///
/// ```
/// use status_server::domain::CivilTime;
///
/// let t = CivilTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(t.minutes(), 14 * 60 + 30);
/// assert_eq!(t.to_string(), "14:30");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilTime(u16);

impl CivilTime {
    /// Midnight, the first minute of the civil day.
    pub const MIDNIGHT: CivilTime = CivilTime(0);

    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, InvalidCivilTime> {
        if hour > 23 {
            return Err(InvalidCivilTime::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(InvalidCivilTime::new("minute must be 0-59"));
        }
        Ok(CivilTime(hour * 60 + minute))
    }

    /// Create a time directly from minutes since midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self, InvalidCivilTime> {
        if minutes >= 1440 {
            return Err(InvalidCivilTime::new("minutes must be 0-1439"));
        }
        Ok(CivilTime(minutes))
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// The upstream occasionally emits "24:00" for end-of-service midnight;
    /// that is accepted and normalized to 00:00 of the next civil day.
    pub fn parse_hhmm(s: &str) -> Result<Self, InvalidCivilTime> {
        if s.len() != 5 {
            return Err(InvalidCivilTime::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();
        if bytes[2] != b':' {
            return Err(InvalidCivilTime::new("expected colon at position 2"));
        }

        let hour = parse_two_digits(&bytes[0..2])
            .ok_or_else(|| InvalidCivilTime::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| InvalidCivilTime::new("invalid minute digits"))?;

        if minute > 59 {
            return Err(InvalidCivilTime::new("minute must be 0-59"));
        }

        // "24:00" end-of-service convention.
        if hour == 24 {
            if minute != 0 {
                return Err(InvalidCivilTime::new("hour 24 only valid as 24:00"));
            }
            return Ok(CivilTime(0));
        }

        if hour > 23 {
            return Err(InvalidCivilTime::new("hour must be 0-23"));
        }

        Ok(CivilTime(hour * 60 + minute))
    }

    /// Minutes since midnight, 0-1439.
    pub fn minutes(&self) -> u16 {
        self.0
    }

    /// Hour component, 0-23.
    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    /// Minute component, 0-59.
    pub fn minute(&self) -> u16 {
        self.0 % 60
    }
}

impl fmt::Debug for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CivilTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u16.
fn parse_two_digits(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)? as u16;
    let d2 = (bytes[1] as char).to_digit(10)? as u16;
    Some(d1 * 10 + d2)
}

/// Weekday applicability bitmask for a scheduled time.
///
/// Bit 0 is Monday through bit 6 Sunday, matching the upstream's service-day
/// encoding. A schedule without a mask applies every day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDays(u8);

impl ServiceDays {
    /// Applies on all seven days.
    pub const EVERY_DAY: ServiceDays = ServiceDays(0b0111_1111);

    /// Monday through Friday.
    pub const WEEKDAYS: ServiceDays = ServiceDays(0b0001_1111);

    /// Saturday and Sunday.
    pub const WEEKENDS: ServiceDays = ServiceDays(0b0110_0000);

    /// Build from raw bits; bits above the low seven are ignored.
    pub fn from_bits(bits: u8) -> Self {
        ServiceDays(bits & 0b0111_1111)
    }

    /// Raw bitmask.
    pub fn bits(&self) -> u8 {
        self.0
    }

    /// Whether the schedule applies on the given weekday.
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Weekday names covered by the mask, Monday first.
    pub fn names(&self) -> Vec<&'static str> {
        const NAMES: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
        NAMES
            .iter()
            .enumerate()
            .filter(|(i, _)| self.0 & (1 << i) != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_mask_names() {
        assert_eq!(
            ServiceDays::WEEKENDS.names(),
            vec!["sat", "sun"]
        );
        assert_eq!(ServiceDays::EVERY_DAY.names().len(), 7);
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(CivilTime::parse_hhmm("00:00").unwrap().minutes(), 0);
        assert_eq!(CivilTime::parse_hhmm("23:59").unwrap().minutes(), 1439);
        assert_eq!(CivilTime::parse_hhmm("08:00").unwrap().minutes(), 480);
        assert_eq!(CivilTime::parse_hhmm("22:00").unwrap().minutes(), 1320);
    }

    #[test]
    fn parse_end_of_service_midnight() {
        // "24:00" appears in last-train tables; normalized to midnight.
        assert_eq!(CivilTime::parse_hhmm("24:00").unwrap().minutes(), 0);
        assert!(CivilTime::parse_hhmm("24:01").is_err());
    }

    #[test]
    fn parse_invalid_format() {
        assert!(CivilTime::parse_hhmm("0800").is_err());
        assert!(CivilTime::parse_hhmm("8:00").is_err());
        assert!(CivilTime::parse_hhmm("08-00").is_err());
        assert!(CivilTime::parse_hhmm("ab:cd").is_err());
        assert!(CivilTime::parse_hhmm("08:000").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(CivilTime::parse_hhmm("25:00").is_err());
        assert!(CivilTime::parse_hhmm("12:60").is_err());
    }

    #[test]
    fn from_hm_bounds() {
        assert!(CivilTime::from_hm(23, 59).is_ok());
        assert!(CivilTime::from_hm(24, 0).is_err());
        assert!(CivilTime::from_hm(12, 60).is_err());
    }

    #[test]
    fn from_minutes_bounds() {
        assert!(CivilTime::from_minutes(1439).is_ok());
        assert!(CivilTime::from_minutes(1440).is_err());
    }

    #[test]
    fn ordering() {
        let early = CivilTime::parse_hhmm("06:00").unwrap();
        let late = CivilTime::parse_hhmm("23:30").unwrap();
        assert!(early < late);
    }

    #[test]
    fn display_format() {
        assert_eq!(CivilTime::parse_hhmm("09:05").unwrap().to_string(), "09:05");
        assert_eq!(CivilTime::parse_hhmm("00:00").unwrap().to_string(), "00:00");
    }

    #[test]
    fn service_days_contains() {
        assert!(ServiceDays::EVERY_DAY.contains(Weekday::Mon));
        assert!(ServiceDays::EVERY_DAY.contains(Weekday::Sun));

        assert!(ServiceDays::WEEKDAYS.contains(Weekday::Fri));
        assert!(!ServiceDays::WEEKDAYS.contains(Weekday::Sat));

        assert!(ServiceDays::WEEKENDS.contains(Weekday::Sat));
        assert!(!ServiceDays::WEEKENDS.contains(Weekday::Wed));
    }

    #[test]
    fn service_days_from_bits_masks_high_bit() {
        let days = ServiceDays::from_bits(0b1111_1111);
        assert_eq!(days.bits(), 0b0111_1111);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn valid_time()(hour in 0u16..24, minute in 0u16..60) -> String {
            format!("{:02}:{:02}", hour, minute)
        }
    }

    proptest! {
        /// Any valid HH:MM string parses.
        #[test]
        fn valid_hhmm_parses(s in valid_time()) {
            prop_assert!(CivilTime::parse_hhmm(&s).is_ok());
        }

        /// Parse then display roundtrips.
        #[test]
        fn parse_display_roundtrip(s in valid_time()) {
            let t = CivilTime::parse_hhmm(&s).unwrap();
            prop_assert_eq!(t.to_string(), s);
        }

        /// Minutes stay in range.
        #[test]
        fn minutes_in_range(s in valid_time()) {
            let t = CivilTime::parse_hhmm(&s).unwrap();
            prop_assert!(t.minutes() < 1440);
        }

        /// Ordering matches minute ordering.
        #[test]
        fn ordering_matches_minutes(a in 0u16..1440, b in 0u16..1440) {
            let ta = CivilTime::from_minutes(a).unwrap();
            let tb = CivilTime::from_minutes(b).unwrap();
            prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));
        }

        /// Invalid hours are rejected (except the 24:00 convention).
        #[test]
        fn invalid_hour_rejected(hour in 25u16..100, minute in 0u16..60) {
            let s = format!("{:02}:{:02}", hour, minute);
            prop_assert!(CivilTime::parse_hhmm(&s).is_err());
        }
    }
}

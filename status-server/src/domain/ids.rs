//! Station and stop identifier types.

use std::fmt;

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A validated metro station identifier.
///
/// Station ids are a line prefix of 1-2 uppercase ASCII letters followed by
/// 1-3 digits, with an optional single trailing uppercase letter for branch
/// stations (e.g. `G07`, `BL14`, `G03A`).
///
/// # Examples
///
/// ```
/// use status_server::domain::StationId;
///
/// let gongguan = StationId::parse("G07").unwrap();
/// assert_eq!(gongguan.as_str(), "G07");
/// assert_eq!(gongguan.line_prefix(), "G");
///
/// assert!(StationId::parse("g07").is_err());
/// assert!(StationId::parse("07").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StationId(String);

impl StationId {
    /// Parse a station id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        let bytes = s.as_bytes();

        if bytes.len() < 2 || bytes.len() > 6 {
            return Err(InvalidStationId {
                reason: "must be 2-6 characters",
            });
        }

        let letters = bytes.iter().take_while(|b| b.is_ascii_uppercase()).count();
        if letters == 0 || letters > 2 {
            return Err(InvalidStationId {
                reason: "must start with 1-2 uppercase letters",
            });
        }

        let digits = bytes[letters..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits == 0 || digits > 3 {
            return Err(InvalidStationId {
                reason: "line prefix must be followed by 1-3 digits",
            });
        }

        // Optional single branch suffix letter (G03A).
        let rest = &bytes[letters + digits..];
        match rest {
            [] => {}
            [b] if b.is_ascii_uppercase() => {}
            _ => {
                return Err(InvalidStationId {
                    reason: "trailing characters must be a single uppercase branch letter",
                });
            }
        }

        Ok(StationId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the line prefix (the leading letters).
    pub fn line_prefix(&self) -> &str {
        let letters = self
            .0
            .bytes()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        &self.0[..letters]
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Error returned when parsing an invalid stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stop id: {reason}")]
pub struct InvalidStopId {
    reason: &'static str,
}

/// A validated bus stop identifier: 1-16 ASCII alphanumerics.
///
/// Bus stop ids are opaque upstream keys; we only guard against obviously
/// malformed input before building request URLs from them.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StopId(String);

impl StopId {
    /// Parse a stop id from a string.
    pub fn parse(s: &str) -> Result<Self, InvalidStopId> {
        if s.is_empty() || s.len() > 16 {
            return Err(InvalidStopId {
                reason: "must be 1-16 characters",
            });
        }

        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(InvalidStopId {
                reason: "must be ASCII alphanumeric",
            });
        }

        Ok(StopId(s.to_string()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_station_ids() {
        assert!(StationId::parse("G07").is_ok());
        assert!(StationId::parse("BL14").is_ok());
        assert!(StationId::parse("R08").is_ok());
        assert!(StationId::parse("G03A").is_ok());
        assert!(StationId::parse("O1").is_ok());
    }

    #[test]
    fn reject_bad_station_ids() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse("g07").is_err());
        assert!(StationId::parse("07").is_err());
        assert!(StationId::parse("G").is_err());
        assert!(StationId::parse("GRN07").is_err());
        assert!(StationId::parse("G0712").is_err());
        assert!(StationId::parse("G07AB").is_err());
        assert!(StationId::parse("G07a").is_err());
    }

    #[test]
    fn line_prefix() {
        assert_eq!(StationId::parse("G07").unwrap().line_prefix(), "G");
        assert_eq!(StationId::parse("BL14").unwrap().line_prefix(), "BL");
        assert_eq!(StationId::parse("G03A").unwrap().line_prefix(), "G");
    }

    #[test]
    fn station_display_and_debug() {
        let id = StationId::parse("G07").unwrap();
        assert_eq!(format!("{}", id), "G07");
        assert_eq!(format!("{:?}", id), "StationId(G07)");
    }

    #[test]
    fn parse_valid_stop_ids() {
        assert!(StopId::parse("1000").is_ok());
        assert!(StopId::parse("UNI01234").is_ok());
        assert!(StopId::parse("a").is_ok());
    }

    #[test]
    fn reject_bad_stop_ids() {
        assert!(StopId::parse("").is_err());
        assert!(StopId::parse("stop-01").is_err());
        assert!(StopId::parse("stop 01").is_err());
        assert!(StopId::parse("12345678901234567").is_err());
    }

    #[test]
    fn station_hash_consistent_with_eq() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(StationId::parse("G07").unwrap());
        assert!(set.contains(&StationId::parse("G07").unwrap()));
        assert!(!set.contains(&StationId::parse("G08").unwrap()));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn valid_station_string() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[A-Z]{1,2}[0-9]{1,3}[A-Z]?").unwrap()
    }

    proptest! {
        /// Any well-formed station id parses and roundtrips.
        #[test]
        fn station_roundtrip(s in valid_station_string()) {
            let id = StationId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Lowercase prefixes are rejected.
        #[test]
        fn lowercase_station_rejected(s in "[a-z]{1,2}[0-9]{1,3}") {
            prop_assert!(StationId::parse(&s).is_err());
        }

        /// Alphanumeric stop ids up to 16 chars always parse.
        #[test]
        fn stop_roundtrip(s in "[A-Za-z0-9]{1,16}") {
            let id = StopId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// The line prefix is exactly the leading letters.
        #[test]
        fn prefix_is_leading_letters(s in valid_station_string()) {
            let id = StationId::parse(&s).unwrap();
            let prefix = id.line_prefix();
            prop_assert!(prefix.bytes().all(|b| b.is_ascii_uppercase()));
            prop_assert!(s.starts_with(prefix));
        }
    }
}

//! Direction disambiguation for single-line stations.
//!
//! The provider occasionally tags entries at a single-line station with a
//! headsign belonging to an unrelated line (a known upstream data-quality
//! defect). This is a data-cleaning step, applied identically to first/last
//! tables and live timetables: one rule table, keyed by station, extended
//! by adding rows.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{RawTimetableEntry, StationId};

/// How a station's entries are validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationClass {
    /// Single line with exactly two termini: the headsign must reference
    /// one of them.
    TwoTerminus { termini: [String; 2] },

    /// Single-line branch station: the entry's line id must match the
    /// branch prefix.
    Branch { line_prefix: String },

    /// Served by more than one line; every line is legitimately present.
    Transfer,
}

/// The station-class rule table.
///
/// Stations without a row are passed through unfiltered.
#[derive(Debug, Clone, Default)]
pub struct DirectionRules {
    rules: HashMap<StationId, StationClass>,
}

impl DirectionRules {
    /// An empty rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the rule for a station.
    pub fn insert(&mut self, station: StationId, class: StationClass) {
        self.rules.insert(station, class);
    }

    /// Rule for a station, if any.
    pub fn get(&self, station: &StationId) -> Option<&StationClass> {
        self.rules.get(station)
    }

    /// Rules for the stations around campus.
    ///
    /// Adding a station is a row here, not a new branch in `filter`.
    pub fn campus_defaults() -> Self {
        let mut rules = Self::new();

        let station = |s: &str| StationId::parse(s).expect("default rule table station id");
        let two_terminus = |a: &str, b: &str| StationClass::TwoTerminus {
            termini: [a.to_string(), b.to_string()],
        };

        // Green-line stations near campus: two termini, 松山 and 新店.
        rules.insert(station("G07"), two_terminus("松山", "新店")); // 公館 Gongguan
        rules.insert(station("G08"), two_terminus("松山", "新店")); // 台電大樓
        rules.insert(station("G06"), two_terminus("松山", "新店")); // 萬隆

        // 小碧潭 sits on the green-line branch shuttle.
        rules.insert(
            station("G03A"),
            StationClass::Branch {
                line_prefix: "G".to_string(),
            },
        );

        // 中正紀念堂 is a green/red transfer; everything is legitimate.
        rules.insert(station("G10"), StationClass::Transfer);
        rules.insert(station("R08"), StationClass::Transfer);

        rules
    }

    /// Drop entries that claim an implausible direction/line combination
    /// for the given station.
    pub fn filter(
        &self,
        station: &StationId,
        entries: Vec<RawTimetableEntry>,
    ) -> Vec<RawTimetableEntry> {
        let class = match self.rules.get(station) {
            // Unknown or transfer stations are not filtered.
            None | Some(StationClass::Transfer) => return entries,
            Some(class) => class,
        };

        entries
            .into_iter()
            .filter(|entry| {
                let keep = match class {
                    StationClass::TwoTerminus { termini } => {
                        termini.iter().any(|t| entry.headsign.contains(t.as_str()))
                    }
                    StationClass::Branch { line_prefix } => {
                        entry.line_id.starts_with(line_prefix.as_str())
                    }
                    StationClass::Transfer => true,
                };
                if !keep {
                    debug!(
                        %station,
                        headsign = %entry.headsign,
                        line = %entry.line_id,
                        "dropping implausible direction entry"
                    );
                }
                keep
            })
            .collect()
    }
}

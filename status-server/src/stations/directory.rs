//! Station catalogue lookup.
//!
//! The catalogue is small and changes rarely (stations open every few
//! years), so it is loaded once at startup from a JSON file, or falls
//! back to the built-in campus set.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::domain::StationId;

/// Failure to load the station catalogue.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read station file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse station file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One station in the catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub is_transfer: bool,
}

#[derive(Debug, Deserialize)]
struct StationRecord {
    id: String,
    name: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    is_transfer: bool,
}

/// Station id → station lookup.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    stations: HashMap<StationId, Station>,
}

impl StationDirectory {
    /// Load the catalogue from a JSON file.
    pub fn load(path: &Path) -> Result<Self, DirectoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Parse the catalogue from a JSON array of station records.
    ///
    /// Records with an unparseable id are skipped rather than failing the
    /// whole load.
    pub fn from_json_str(json: &str) -> Result<Self, DirectoryError> {
        let records: Vec<StationRecord> = serde_json::from_str(json)?;
        Ok(Self {
            stations: build_map(records),
        })
    }

    /// The stations around campus, used when no catalogue file is given.
    pub fn campus_defaults() -> Self {
        let station = |id: &str, name: &str, is_transfer: bool| Station {
            id: StationId::parse(id).expect("default catalogue station id"),
            name: name.to_string(),
            lat: None,
            lon: None,
            is_transfer,
        };

        let stations = [
            station("G07", "公館", false),
            station("G08", "台電大樓", false),
            station("G06", "萬隆", false),
            station("G03A", "小碧潭", false),
            station("G10", "中正紀念堂", true),
            station("R08", "中正紀念堂", true),
        ];

        Self {
            stations: stations.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    /// Look up a station by id.
    pub fn get(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    /// All stations, sorted by id for stable listings.
    pub fn all(&self) -> Vec<&Station> {
        let mut stations: Vec<&Station> = self.stations.values().collect();
        stations.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

fn build_map(records: Vec<StationRecord>) -> HashMap<StationId, Station> {
    records
        .into_iter()
        .filter_map(|r| {
            let id = StationId::parse(&r.id.to_uppercase()).ok()?;
            Some((
                id.clone(),
                Station {
                    id,
                    name: r.name,
                    lat: r.lat,
                    lon: r.lon,
                    is_transfer: r.is_transfer,
                },
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"id": "G07", "name": "公館", "lat": 25.0145, "lon": 121.5343},
        {"id": "g10", "name": "中正紀念堂", "is_transfer": true},
        {"id": "not a station", "name": "Bad Row"}
    ]"#;

    #[test]
    fn parses_records_and_skips_invalid_ids() {
        let directory = StationDirectory::from_json_str(SAMPLE).unwrap();

        assert_eq!(directory.len(), 2);
        let gongguan = directory
            .get(&StationId::parse("G07").unwrap())
            .unwrap();
        assert_eq!(gongguan.name, "公館");
        assert_eq!(gongguan.lat, Some(25.0145));
        assert!(!gongguan.is_transfer);

        // Lowercase ids are normalised.
        let memorial = directory.get(&StationId::parse("G10").unwrap()).unwrap();
        assert!(memorial.is_transfer);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(StationDirectory::from_json_str("{not json").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let directory = StationDirectory::load(file.path()).unwrap();
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = StationDirectory::load(Path::new("/nonexistent/stations.json"));
        assert!(matches!(result, Err(DirectoryError::Io(_))));
    }

    #[test]
    fn campus_defaults_cover_the_green_line_stations() {
        let directory = StationDirectory::campus_defaults();

        assert!(directory.get(&StationId::parse("G07").unwrap()).is_some());
        assert!(directory.get(&StationId::parse("G03A").unwrap()).is_some());

        // Listing order is stable.
        let ids: Vec<&str> = directory.all().iter().map(|s| s.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}

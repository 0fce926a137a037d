//! Station catalogue.

mod directory;

pub use directory::{DirectoryError, Station, StationDirectory};

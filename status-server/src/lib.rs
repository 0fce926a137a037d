//! Real-time transit status engine for the campus portal.
//!
//! Periodically queries the transit data proxy (metro first/last-train
//! tables, per-station live timetables, bus arrival estimates), normalizes
//! the noisy responses into a consistent per-direction view, and caches
//! results with bounded freshness. Upstream failure always degrades to
//! "best available data, possibly empty" — never to an error.

pub mod cache;
pub mod clock;
pub mod domain;
pub mod stations;
pub mod status;
pub mod upstream;
pub mod web;

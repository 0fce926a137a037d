//! Client for the transit data provider.
//!
//! The provider is reached through a same-origin proxy that injects
//! credentials; this process never sees them. Three query kinds exist:
//! metro first/last-train tables, metro live per-station timetables, and
//! bus arrival estimates.
//!
//! Upstream responses are noisy: field names vary between deployments,
//! records arrive unordered and sometimes malformed, and the proxy signals
//! missing credentials with a 500. Everything in this module parses
//! defensively and classifies failures so the fetch layer can degrade
//! instead of erroring.

mod client;
mod convert;
mod error;
mod types;

pub use client::{TransitClient, TransitConfig};
pub use convert::{convert_bus_arrivals, convert_first_last, convert_timetable};
pub use error::UpstreamError;
pub use types::{BusArrivalDto, FirstLastDto};

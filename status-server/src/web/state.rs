//! Application state for the web layer.

use std::sync::Arc;

use crate::stations::StationDirectory;
use crate::status::StatusEngine;
use crate::upstream::TransitClient;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The status engine over the live upstream client.
    pub engine: Arc<StatusEngine<TransitClient>>,

    /// Station catalogue.
    pub stations: Arc<StationDirectory>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(engine: StatusEngine<TransitClient>, stations: StationDirectory) -> Self {
        Self {
            engine: Arc::new(engine),
            stations: Arc::new(stations),
        }
    }
}

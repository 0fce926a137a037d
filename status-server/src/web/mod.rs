//! Web layer for the transit status engine.
//!
//! Exposes JSON endpoints for the portal frontend: metro first/last
//! tables, metro live timetables, and bus arrivals.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::create_router;
pub use state::AppState;

//! The status engine: orchestrated fetching, data cleaning, and board
//! assembly for metro and bus queries.

mod disambiguate;
mod engine;
mod group;
mod next_event;
mod orchestrator;

pub use disambiguate::{DirectionRules, StationClass};
pub use engine::{
    BusBoard, FirstLastBoard, FirstLastDirection, StatusConfig, StatusEngine, TimetableBoard,
    TimetableDirection,
};
pub use group::{DirectionKeyed, group_by_direction};
pub use next_event::{NextDeparture, next_departure};
pub use orchestrator::{
    DegradeReason, FetchOrchestrator, FetchOutcome, Freshness, Payload, QueryKey, QueryKind,
    TransitSource,
};

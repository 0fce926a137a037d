//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::domain::{StationId, StopId};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/stations", get(list_stations))
        .route("/api/metro/:station/first-last", get(metro_first_last))
        .route("/api/metro/:station/timetable", get(metro_timetable))
        .route("/api/bus/:stop/arrivals", get(bus_arrivals))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// List the station catalogue.
async fn list_stations(State(state): State<AppState>) -> Json<StationListResponse> {
    let stations = state
        .stations
        .all()
        .into_iter()
        .map(StationResult::from_station)
        .collect();
    Json(StationListResponse { stations })
}

/// First/last-train table for a station.
async fn metro_first_last(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<Json<FirstLastResponse>, AppError> {
    let station = parse_station(&station)?;
    let board = state.engine.metro_first_last(&station).await;
    Ok(Json(FirstLastResponse::from_board(&board)))
}

/// Live timetable for a station.
async fn metro_timetable(
    State(state): State<AppState>,
    Path(station): Path<String>,
) -> Result<Json<TimetableResponse>, AppError> {
    let station = parse_station(&station)?;
    let board = state.engine.metro_timetable(&station).await;
    Ok(Json(TimetableResponse::from_board(&board)))
}

/// Live bus arrivals for a stop.
async fn bus_arrivals(
    State(state): State<AppState>,
    Path(stop): Path<String>,
) -> Result<Json<BusArrivalsResponse>, AppError> {
    let stop = StopId::parse(&stop).map_err(|_| AppError::BadRequest {
        message: format!("Invalid stop id: {stop}"),
    })?;
    let board = state.engine.bus_arrivals(&stop).await;
    Ok(Json(BusArrivalsResponse::from_board(&board)))
}

fn parse_station(raw: &str) -> Result<StationId, AppError> {
    StationId::parse(&raw.to_uppercase()).map_err(|_| AppError::BadRequest {
        message: format!("Invalid station id: {raw}"),
    })
}

/// Application-level error, rendered as a JSON error body.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
        };

        tracing::debug!(%status, %message, "request rejected");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_path_is_case_insensitive() {
        assert!(parse_station("g07").is_ok());
        assert!(parse_station("G07").is_ok());
        assert!(parse_station("not a station").is_err());
    }

    #[test]
    fn bad_request_renders_400() {
        let response = AppError::BadRequest {
            message: "Invalid station id: xyz".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

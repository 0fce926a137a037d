use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use status_server::clock::SystemClock;
use status_server::stations::StationDirectory;
use status_server::status::{DirectionRules, StatusConfig, StatusEngine};
use status_server::upstream::{TransitClient, TransitConfig};
use status_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Upstream proxy base URL
    let base_url = std::env::var("TRANSIT_PROXY_URL").unwrap_or_else(|_| {
        let default = TransitConfig::default().base_url;
        warn!("TRANSIT_PROXY_URL not set, using {default}");
        default
    });

    let client =
        TransitClient::new(TransitConfig::new(&base_url)).expect("Failed to create transit client");

    // Station catalogue: file if given, built-in campus set otherwise
    let stations = match std::env::var("STATIONS_FILE") {
        Ok(path) => StationDirectory::load(Path::new(&path)).expect("Failed to load station file"),
        Err(_) => StationDirectory::campus_defaults(),
    };
    info!("Loaded {} stations", stations.len());

    let engine = StatusEngine::new(
        client,
        DirectionRules::campus_defaults(),
        StatusConfig::default(),
        Arc::new(SystemClock),
    );

    let state = AppState::new(engine, stations);
    let app = create_router(state);

    let addr: SocketAddr = std::env::var("BIND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
        .parse()
        .expect("Invalid BIND_ADDR");

    info!("Transit status engine listening on http://{addr}");
    info!("  GET /health                          - Health check");
    info!("  GET /api/stations                    - Station catalogue");
    info!("  GET /api/metro/:station/first-last   - First/last-train table");
    info!("  GET /api/metro/:station/timetable    - Live timetable");
    info!("  GET /api/bus/:stop/arrivals          - Live bus arrivals");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind");
    axum::serve(listener, app).await.expect("Server error");
}

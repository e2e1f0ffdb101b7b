// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, Location};
use crate::application::readings_cache::ReadingsCache;
use crate::application::sensor_service::{LabelResolver, SensorService};
use crate::application::session::{AuthService, Session};
use crate::infrastructure::backend_client::BackendClient;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::open_meteo::OpenMeteoClient;
use crate::infrastructure::prediction_client::PredictionClient;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_dashboard_config()?;
    let window = config.lookback_window()?;

    // Create adapters (infrastructure layer)
    let session = Arc::new(Session::new(config.api.token.clone()));
    let backend = Arc::new(BackendClient::new(config.api.base_url.clone(), session.clone()));
    let humidity = Arc::new(OpenMeteoClient::new(config.humidity.base_url.clone()));
    let predictions = Arc::new(PredictionClient::new(config.predictions.base_url.clone()));

    // Create services (application layer)
    let labels = Arc::new(LabelResolver::default());
    let cache = Arc::new(ReadingsCache::new(backend.clone(), window));
    let dashboard = DashboardService::new(
        cache,
        humidity,
        predictions,
        Location {
            latitude: config.humidity.latitude,
            longitude: config.humidity.longitude,
        },
        labels.clone(),
        session.clone(),
    );
    let sensors = SensorService::new(backend.clone(), labels);
    let auth = AuthService::new(backend, session);

    // Humidity does not need a session; load it up front.
    tokio::spawn({
        let dashboard = dashboard.clone();
        async move { dashboard.refresh_humidity().await }
    });

    let state = Arc::new(AppState {
        dashboard,
        sensors,
        auth,
    });
    let router = build_router(state);

    let addr: SocketAddr = config
        .server
        .listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server.listen_addr))?;
    tracing::info!(
        "Starting sensor dashboard on {} (lookback {} days)",
        addr,
        window.days()
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

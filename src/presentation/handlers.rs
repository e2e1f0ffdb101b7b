// HTTP request handlers
use crate::application::dashboard_service::SensorStatus;
use crate::application::ports::FetchError;
use crate::domain::chart::ChartView;
use crate::domain::prediction::Predictions;
use crate::domain::readings::LookbackWindow;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct WindowRequest {
    pub days: u32,
}

#[derive(Serialize)]
pub struct WindowResponse {
    pub days: u32,
}

fn status_for(err: &FetchError) -> StatusCode {
    match err {
        FetchError::Auth => StatusCode::UNAUTHORIZED,
        FetchError::Transport(_) => StatusCode::BAD_GATEWAY,
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> StatusCode {
    match state.auth.login(&request.username, &request.password).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            tracing::warn!("Login failed for {}: {}", request.username, e);
            status_for(&e)
        }
    }
}

pub async fn logout(State(state): State<Arc<AppState>>) -> StatusCode {
    state.auth.logout();
    StatusCode::NO_CONTENT
}

/// Sensor grid: every known sensor with its selection and fetch status
pub async fn list_sensors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SensorStatus>>, StatusCode> {
    match state.sensors.list_sensors().await {
        Ok(sensors) => {
            let today = Utc::now().date_naive();
            Ok(Json(state.dashboard.sensor_statuses(&sensors, today)))
        }
        Err(e) => {
            tracing::warn!("Error listing sensors: {}", e);
            if e.is_auth() {
                state.auth.logout();
            }
            Err(status_for(&e))
        }
    }
}

/// Select a sensor; its series shows up on the chart once fetched
pub async fn select_sensor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    let dashboard = state.dashboard.clone();
    tokio::spawn(async move {
        // Failures are logged by the cache and shown through /sensors.
        let _ = dashboard.select(&id).await;
    });
    StatusCode::ACCEPTED
}

pub async fn deselect_sensor(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> StatusCode {
    state.dashboard.deselect(&id);
    StatusCode::NO_CONTENT
}

pub async fn get_window(State(state): State<Arc<AppState>>) -> Json<WindowResponse> {
    Json(WindowResponse {
        days: state.dashboard.window().days(),
    })
}

pub async fn change_window(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WindowRequest>,
) -> StatusCode {
    let Some(window) = LookbackWindow::new(request.days) else {
        return StatusCode::BAD_REQUEST;
    };
    let dashboard = state.dashboard.clone();
    tokio::spawn(async move {
        let _ = dashboard.change_window(window).await;
    });
    StatusCode::ACCEPTED
}

pub async fn refresh_humidity(State(state): State<Arc<AppState>>) -> StatusCode {
    let dashboard = state.dashboard.clone();
    tokio::spawn(async move { dashboard.refresh_humidity().await });
    StatusCode::ACCEPTED
}

pub async fn get_chart(State(state): State<Arc<AppState>>) -> Json<ChartView> {
    Json(state.dashboard.chart())
}

/// Predictions for tomorrow for the selected sensors
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Predictions>, StatusCode> {
    let today = Utc::now().date_naive();
    state
        .dashboard
        .predictions(today)
        .await
        .map(Json)
        .map_err(|e| status_for(&e))
}

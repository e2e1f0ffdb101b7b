use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    change_window, deselect_sensor, get_chart, get_predictions, get_window, health_check,
    list_sensors, login, logout, refresh_humidity, select_sensor,
};
use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/session", post(login).delete(logout))
        .route("/sensors", get(list_sensors))
        .route("/selection/:id", put(select_sensor).delete(deselect_sensor))
        .route("/window", get(get_window).put(change_window))
        .route("/humidity/refresh", post(refresh_humidity))
        .route("/chart", get(get_chart))
        .route("/predictions", get(get_predictions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::state::app_state::AppState;
use crate::utils::conf_helper;

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/info", get(info_check))
        .route("/stop", get(stop_process))
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthStatus {
    status: &'static str,
    open_readers: usize,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let open_readers = state.readers.read().await.len();
    Json(HealthStatus {
        status: "ok",
        open_readers,
    })
}

async fn info_check() -> Response {
    match conf_helper::get_cached_config() {
        Ok(config) => {
            debug!("{} requested", config.name);
            Json(config).into_response()
        }
        Err(e) => {
            warn!("Info requested before startup finished: {}", e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn stop_process() -> impl IntoResponse {
    error!("Stop endpoint called, shutting down process");

    // Let the response and pending logs flush first
    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::process::exit(0);
    });

    StatusCode::OK
}

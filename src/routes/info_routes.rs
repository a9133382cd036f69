use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};

use beat_reader::core::constants::SW_VERSION;
use serde::Serialize;
use tracing::{debug, error};

use crate::models::config_model::BeatConfig;
use crate::state::app_state::AppState;

pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health_check))
        .route("/info", get(info_check))
        .route("/stop", get(stop_process))
        .with_state(state)
}

async fn index_page() -> Response {
    let config = crate::utils::conf_helper::get_cached_config();
    Html(format!(
        "<h1>{}</h1><p>SW version: {}</p><p>Endpoints: /info, /signals, /events, /stats/&lt;name&gt;, /fetch/&lt;name&gt;</p>",
        config.name, SW_VERSION
    ))
    .into_response()
}

#[derive(Serialize)]
struct InfoResponse<'a> {
    sw_version: &'static str,
    config: &'a BeatConfig,
    file: Option<String>,
    metadata: Vec<(String, String)>,
}

async fn info_check(State(state): State<AppState>) -> Response {
    let config = crate::utils::conf_helper::get_cached_config();
    debug!("{} requested", config.name);

    let loaded = state.current().await;
    Json(InfoResponse {
        sw_version: SW_VERSION,
        config,
        file: loaded.as_ref().map(|f| f.source.display().to_string()),
        metadata: loaded.map(|f| f.metadata.entries.clone()).unwrap_or_default(),
    })
    .into_response()
}

async fn health_check() -> Response {
    Json(HealthStatus {
        status: "ok".to_owned(),
    })
    .into_response()
}

async fn stop_process() -> impl IntoResponse {
    error!("Stop endpoint called, shutting down process");

    tokio::spawn(async {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        std::process::exit(0);
    });

    StatusCode::OK
}

#[derive(Serialize)]
pub struct HealthStatus {
    status: String,
}

use axum::{
    extract::{ws::WebSocketUpgrade, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use beat_reader::core::segmentation::PhaseSummary;
use beat_reader::{extract_data, handle_ws_fetch, BeatError, EventSpan, TimeRange};

use crate::state::app_state::{AppState, LoadedFile};

#[derive(Deserialize, Debug)]
pub struct FileReadRequest {
    pub path: String,
}

#[derive(Serialize, Debug)]
pub struct FileReadResponse {
    pub name: String,
    pub path: String,
    pub artifact: String,
    pub rows: usize,
    pub headers: Vec<String>,
}

#[derive(Serialize)]
pub struct SignalData<'a> {
    pub name: &'a str,
    pub time: &'a [f64],
    pub values: &'a [i64],
}

#[derive(Serialize)]
pub struct EventsResponse<'a> {
    pub phases: &'a PhaseSummary,
    pub alarms: &'a [EventSpan],
    pub ui: &'a [EventSpan],
    pub wire: &'a [EventSpan],
}

#[derive(Deserialize, Debug)]
pub struct StatsQuery {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
}

/// =======================
/// ROUTER
/// =======================

pub fn data_routes(state: AppState) -> Router {
    Router::new()
        .route("/read-file", post(read_file))
        .route("/signals", get(list_signals))
        .route("/signals/{name}", get(signal_data))
        .route("/fetch/{name}", get(ws_fetch))
        .route("/events", get(events))
        .route("/stats/{name}", get(stats))
        .with_state(state)
}

/// Opens a log in the background and swaps it into the state.
pub async fn load_into_state(state: &AppState, path: PathBuf) -> Result<Arc<LoadedFile>, BeatError> {
    let options = crate::utils::conf_helper::get_cached_config().processing.clone();
    let loaded = tokio::task::spawn_blocking(move || LoadedFile::load(&path, &options))
        .await
        .map_err(|e| BeatError::Io(std::io::Error::other(e)))??;

    let loaded = Arc::new(loaded);
    *state.file.write().await = Some(loaded.clone());
    info!("Loaded {} ({} rows)", loaded.source.display(), loaded.table.len());
    Ok(loaded)
}

fn error_status(e: &BeatError) -> StatusCode {
    match e {
        BeatError::Schema(_) => StatusCode::NOT_FOUND,
        BeatError::EmptyRange | BeatError::NoDataFile => StatusCode::BAD_REQUEST,
        BeatError::Format { .. } | BeatError::NoHeader { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// =======================
/// HANDLERS
/// =======================

async fn read_file(State(state): State<AppState>, Json(request): Json<FileReadRequest>) -> Response {
    debug!("Reading file: path={}", request.path);

    let loaded = match load_into_state(&state, PathBuf::from(&request.path)).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to open file {}: {}", request.path, e);
            return error_status(&e).into_response();
        }
    };

    let name = loaded
        .source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string());

    Json(FileReadResponse {
        name,
        path: request.path,
        artifact: loaded.artifact.display().to_string(),
        rows: loaded.table.len(),
        headers: loaded.table.column_names().into_iter().map(str::to_string).collect(),
    })
    .into_response()
}

async fn list_signals(State(state): State<AppState>) -> Response {
    match state.current().await {
        Some(file) => Json(file.table.column_names()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn signal_data(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(file) = state.current().await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match file.table.int_column(&name) {
        Some(values) => Json(SignalData {
            name: &name,
            time: &file.table.time,
            values,
        })
        .into_response(),
        None => {
            error!("Signal not found: {}", name);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn ws_fetch(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(file) = state.current().await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if !file.table.contains(&name) {
        error!("Signal not found: {}", name);
        return StatusCode::NOT_FOUND.into_response();
    }

    let table = file.table.clone();
    ws.on_upgrade(move |socket| handle_ws_fetch(socket, table, name))
}

async fn events(State(state): State<AppState>) -> Response {
    let Some(file) = state.current().await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let spans = |column: &str| {
        file.events
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, spans)| spans.as_slice())
            .unwrap_or(&[])
    };
    Json(EventsResponse {
        phases: &file.phases,
        alarms: spans("Alarm"),
        ui: spans("UI"),
        wire: spans("Wire"),
    })
    .into_response()
}

async fn stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Response {
    let Some(file) = state.current().await else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let range = match (query.x_min, query.x_max) {
        (Some(x_min), Some(x_max)) => Some(TimeRange { x_min, x_max }),
        _ => None,
    };
    match extract_data(&file.table, &name, range) {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!("Stats for {} failed: {}", name, e);
            error_status(&e).into_response()
        }
    }
}

use axum::Router;
use std::path::PathBuf;
use tracing::{error, info, warn, Level};

mod models;
mod routes;
mod state;
mod utils;

use crate::state::app_state::AppState;
use crate::utils::conf_helper::{get_cached_config, init_config_and_bind, DEFAULT_CONFIG_FILE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let state = AppState::new();

    // === CONFIG + LISTENER ===
    let config_path = std::env::var("BEAT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let listener = init_config_and_bind(&PathBuf::from(config_path)).await?;
    let config = get_cached_config();

    info!(
        "Server initialized on {}:{}",
        config.connection.ip, config.connection.port
    );

    // Command line path wins over the configured one
    let data_file = std::env::args()
        .nth(1)
        .or_else(|| config.data_file.clone())
        .map(PathBuf::from);

    match data_file {
        Some(path) => {
            if let Err(e) = routes::data_routes::load_into_state(&state, path.clone()).await {
                error!("Could not load {}: {}", path.display(), e);
            }
        }
        None => warn!("No data file given, waiting for POST /read-file"),
    }

    let app = Router::new()
        .merge(routes::info_routes::health_routes(state.clone()))
        .merge(routes::data_routes::data_routes(state));

    axum::serve(listener, app).await?;
    Ok(())
}

use std::path::Path;
use std::sync::OnceLock;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::models::config_model::BeatConfig;

static CONFIG_CACHE: OnceLock<BeatConfig> = OnceLock::new();

pub const DEFAULT_CONFIG_FILE: &str = "beat.json";

pub async fn load_config(file_path: &Path) -> anyhow::Result<BeatConfig> {
    if !fs::try_exists(file_path).await.unwrap_or(false) {
        warn!("{} not found, using default configuration", file_path.display());
        return Ok(BeatConfig::default());
    }

    let data = fs::read_to_string(file_path)
        .await
        .map_err(|e| anyhow::anyhow!("File read Error: {e} {}", file_path.display()))?;

    let config: BeatConfig =
        serde_json::from_str(&data).map_err(|e| anyhow::anyhow!("JSON Parse Error: {e}"))?;
    Ok(config)
}

pub async fn init_config_and_bind(file_path: &Path) -> anyhow::Result<TcpListener> {
    let mut config = load_config(file_path).await?;

    let bind_addr = format!("{}:{}", config.connection.ip, config.connection.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Bind failed: {e}"))?;

    let actual_port = listener.local_addr()?.port();
    config.connection.port = actual_port;

    CONFIG_CACHE
        .set(config)
        .map_err(|_| anyhow::anyhow!("Config already initialized"))?;

    info!("Config initialized with port: {}", actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> &'static BeatConfig {
    CONFIG_CACHE.get_or_init(BeatConfig::default)
}

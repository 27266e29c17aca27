use std::sync::OnceLock;
use thiserror::Error;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::info;

use crate::models::extension_model::ExtensionConfig;

pub const CONFIG_PATH: &str = "plugin.json";

static CONFIG_CACHE: OnceLock<ExtensionConfig> = OnceLock::new();
static CORE_URL: OnceLock<String> = OnceLock::new();

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File read error: {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Bind failed on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Config already initialized")]
    AlreadyInitialized,

    #[error("Config not initialized")]
    NotInitialized,
}

pub async fn init_config_and_bind() -> Result<TcpListener, ConfigError> {
    let data = fs::read_to_string(CONFIG_PATH)
        .await
        .map_err(|source| ConfigError::Read {
            path: CONFIG_PATH.to_string(),
            source,
        })?;

    let mut config: ExtensionConfig = serde_json::from_str(&data)?;

    let bind_addr = format!("{}:{}", config.connection.ip, config.connection.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|source| ConfigError::Bind {
            addr: bind_addr.clone(),
            source,
        })?;

    // Port 0 asks the OS for a free port; the core must learn the real one
    let actual_port = listener
        .local_addr()
        .map_err(|source| ConfigError::Bind {
            addr: bind_addr,
            source,
        })?
        .port();
    config.connection.port = actual_port;

    let url = format!(
        "{}:{}",
        config.connection.target, config.connection.target_port
    );

    CORE_URL
        .set(url)
        .map_err(|_| ConfigError::AlreadyInitialized)?;
    CONFIG_CACHE
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)?;

    info!("Config initialized with dynamic port: {}", actual_port);

    Ok(listener)
}

pub fn get_cached_config() -> Result<&'static ExtensionConfig, ConfigError> {
    CONFIG_CACHE.get().ok_or(ConfigError::NotInitialized)
}

pub fn get_core_url() -> Result<&'static str, ConfigError> {
    CORE_URL
        .get()
        .map(String::as_str)
        .ok_or(ConfigError::NotInitialized)
}

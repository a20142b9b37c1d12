use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed or
    /// violated a bound.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Quizmill services.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Base URL of the document store.
    pub store_url: String,
    /// Database name prefix for questions and deduplicated entities.
    pub store_database: String,
    /// Optional username for store basic authentication.
    pub store_username: Option<String>,
    /// Optional password for store basic authentication.
    pub store_password: Option<String>,
    /// Fixed size of the parser worker pool.
    pub num_workers: usize,
    /// Target chunk size in megabytes for parallel ingestion.
    pub chunk_size_mb: f64,
    /// Buffered documents per bulk write.
    pub batch_size: usize,
    /// Capacity of the parse service response cache.
    pub parse_cache_capacity: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, falling back to local
    /// defaults and validating bounds along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            store_url: load_env("STORE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:5984".to_string()),
            store_database: load_env("STORE_DATABASE").unwrap_or_else(|| "quizmill".to_string()),
            store_username: load_env("STORE_USERNAME"),
            store_password: load_env("STORE_PASSWORD"),
            num_workers: parse_env("NUM_WORKERS", 4)?,
            chunk_size_mb: parse_env("CHUNK_SIZE_MB", 10.0)?,
            batch_size: parse_env("BATCH_SIZE", 1000)?,
            parse_cache_capacity: parse_env("PARSE_CACHE_CAPACITY", 128)?,
            server_port: load_env("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
        };
        validate(config)
    }
}

fn validate(config: Config) -> Result<Config, ConfigError> {
    if config.num_workers == 0 {
        return Err(ConfigError::InvalidValue("NUM_WORKERS".into()));
    }
    if config.batch_size == 0 {
        return Err(ConfigError::InvalidValue("BATCH_SIZE".into()));
    }
    if !(config.chunk_size_mb > 0.0) {
        return Err(ConfigError::InvalidValue("CHUNK_SIZE_MB".into()));
    }
    Ok(config)
}

fn load_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match load_env(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        store_url = %config.store_url,
        database = %config.store_database,
        workers = config.num_workers,
        chunk_size_mb = config.chunk_size_mb,
        batch_size = config.batch_size,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
const DEFAULT_BACKEND: &str = "redis";
const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_CACHE_PATH: &str = "schedules.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const CONFIG_DIR: &str = "config";
const CLIENT_ENV_PREFIX: &str = "DISPATCH";

/// Server configuration with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Redis connection URL
    pub redis_url: String,

    /// Key holding the serialized schedule collection
    #[serde(default = "default_schedules_key")]
    #[validate(length(min = 1))]
    pub schedules_key: String,

    /// Schedule backend: "redis" or "in-memory"
    #[serde(default = "default_backend")]
    #[validate(custom = "validate_backend")]
    pub backend: String,

    /// CORS: comma-separated list of allowed origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow permissive CORS outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_size")]
    #[validate(range(min = 1))]
    pub max_body_size: usize,
}

impl AppConfig {
    pub fn new(host: String, port: u16, environment: String, redis_url: String) -> Self {
        Self {
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            redis_url,
            schedules_key: default_schedules_key(),
            backend: default_backend(),
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            max_body_size: default_max_body_size(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn uses_redis(&self) -> bool {
        self.backend.eq_ignore_ascii_case("redis")
    }

    /// Configured CORS origins, blanks removed
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && self.cors_origins().is_empty() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration for the dispatch client
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the schedules API
    #[serde(default = "default_api_base_url")]
    #[validate(url(message = "Invalid API base URL"), custom = "validate_http_scheme")]
    pub api_base_url: String,

    /// Local cache file mirroring the last known collection
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Timeout for each remote request
    #[serde(default = "default_request_timeout_secs")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,

    /// Logging level
    #[serde(default = "default_client_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            cache_path: default_cache_path(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_client_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_client_log_level() -> String {
    "warn".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_schedules_key() -> String {
    crate::remote_store::DEFAULT_SCHEDULES_KEY.to_string()
}

fn default_backend() -> String {
    DEFAULT_BACKEND.to_string()
}

fn default_max_body_size() -> usize {
    DEFAULT_MAX_BODY_SIZE
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_PATH)
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn validate_backend(value: &str) -> Result<(), ValidationError> {
    match value.to_ascii_lowercase().as_str() {
        "in-memory" | "redis" => Ok(()),
        _ => {
            let mut err = ValidationError::new("backend");
            err.message = Some("Must be one of: in-memory, redis".into());
            Err(err)
        }
    }
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Scheme check on top of `url`; the client only speaks HTTP.
fn validate_http_scheme(value: &str) -> Result<(), ValidationError> {
    let scheme = value.split_once("://").map(|(scheme, _)| scheme);
    if matches!(scheme, Some(s) if s.eq_ignore_ascii_case("http") || s.eq_ignore_ascii_case("https")) {
        Ok(())
    } else {
        let mut err = ValidationError::new("api_base_url");
        err.message = Some("Must start with http:// or https://".into());
        Err(err)
    }
}

pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("dispatch_board={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

fn run_env() -> String {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string())
}

fn file_sources(
    builder: ConfigBuilder<DefaultState>,
    config_dir: &Path,
    names: &[&str],
) -> ConfigBuilder<DefaultState> {
    names.iter().fold(builder, |builder, name| {
        builder.add_source(File::from(config_dir.join(name)).required(false))
    })
}

pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = run_env();
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    load_config_from(Path::new(CONFIG_DIR), &run_env)
}

/// Loads server configuration from `config_dir` for the given profile.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    let builder = Config::builder()
        .set_default("host", DEFAULT_HOST)?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .set_default("redis_url", DEFAULT_REDIS_URL)?;

    let config = file_sources(builder, config_dir, &["default", run_env])
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration security validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!(backend = %app_config.backend, "Configuration loaded successfully");
    Ok(app_config)
}

pub fn load_client_config() -> Result<ClientConfig, AppConfigError> {
    load_client_config_from(Path::new(CONFIG_DIR))
}

/// Client settings come from `client.toml` and `DISPATCH__*` variables.
pub fn load_client_config_from(config_dir: &Path) -> Result<ClientConfig, AppConfigError> {
    let config = file_sources(Config::builder(), config_dir, &["client"])
        .add_source(Environment::with_prefix(CLIENT_ENV_PREFIX).separator("__"))
        .build()?;

    let client_config: ClientConfig = config.try_deserialize()?;
    client_config.validate()?;
    Ok(client_config)
}

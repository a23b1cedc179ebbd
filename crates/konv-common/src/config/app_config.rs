//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub store: StoreBackend,
    pub redis: RedisConfig,
    pub telegram: TelegramConfig,
    pub dispatch: DispatchConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// Emit logs as JSON
    #[serde(default)]
    pub log_json: bool,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP ingestion server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which key-value backend holds channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// In-process store; contents are lost on restart
    Memory,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default)]
    pub bot_name: String,
    /// Public URL of the ingestion endpoint, shown in channel listings
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

impl TelegramConfig {
    /// Whether a bot token has been configured
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.bot_token.is_empty()
    }
}

/// Dispatch bus and fan-out configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Capacity of the in-process dispatch bus
    #[serde(default = "default_dispatch_buffer")]
    pub buffer: usize,
    /// Maximum characters per delivered chunk
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            buffer: default_dispatch_buffer(),
            max_chunk_size: default_max_chunk_size(),
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

// Default value functions
fn default_app_name() -> String {
    "konvbot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_port() -> u16 {
    8000
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_public_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_dispatch_buffer() -> usize {
    1024
}

fn default_max_chunk_size() -> usize {
    konv_core::MAX_CHUNK_SIZE
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: impl FnOnce() -> T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source
    ///
    /// # Errors
    /// Returns an error if required variables are missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = match lookup("STORE_BACKEND").as_deref().map(str::to_lowercase) {
            None => StoreBackend::default(),
            Some(s) if s == "redis" => StoreBackend::Redis,
            Some(s) if s == "memory" => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::InvalidValue("STORE_BACKEND", other)),
        };

        // REDIS_HOST is the historical name of the setting
        let redis_url = lookup("REDIS_URL").or_else(|| lookup("REDIS_HOST"));
        let redis_url = match (store, redis_url) {
            (_, Some(url)) => url,
            (StoreBackend::Memory, None) => String::new(),
            (StoreBackend::Redis, None) => return Err(ConfigError::MissingVar("REDIS_URL")),
        };

        let telegram = TelegramConfig {
            bot_token: lookup("TELEGRAM_BOT_TOKEN")
                .map(|s| s.trim().to_string())
                .ok_or(ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"))?,
            bot_name: lookup("BOT_NAME").unwrap_or_default(),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(default_public_base_url),
        };
        // A blank token counts as missing
        if !telegram.is_enabled() {
            return Err(ConfigError::MissingVar("TELEGRAM_BOT_TOKEN"));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
                log_json: parse_or(&lookup, "LOG_JSON", || false)?,
            },
            api: ServerConfig {
                host: lookup("API_HOST").unwrap_or_else(default_host),
                port: parse_or(&lookup, "API_PORT", default_api_port)?,
            },
            store,
            redis: RedisConfig {
                url: redis_url,
                max_connections: parse_or(
                    &lookup,
                    "REDIS_MAX_CONNECTIONS",
                    default_redis_max_connections,
                )?,
            },
            telegram,
            dispatch: DispatchConfig {
                buffer: parse_or(&lookup, "DISPATCH_BUFFER", default_dispatch_buffer)?,
                max_chunk_size: parse_or(&lookup, "MAX_CHUNK_SIZE", default_max_chunk_size)?,
            },
            rate_limit: RateLimitConfig {
                requests_per_second: parse_or(
                    &lookup,
                    "RATE_LIMIT_REQUESTS_PER_SECOND",
                    default_requests_per_second,
                )?,
                burst: parse_or(&lookup, "RATE_LIMIT_BURST", default_burst)?,
            },
            cors: CorsConfig {
                allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                    .map(|s| {
                        s.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

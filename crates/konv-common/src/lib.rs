//! # konv-common
//!
//! Shared utilities including configuration, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DispatchConfig, Environment,
    RateLimitConfig, RedisConfig, ServerConfig, StoreBackend, TelegramConfig,
};
pub use error::{domain_status, AppError, AppResult};
pub use telemetry::{try_init_tracing_with_config, TracingConfig, TracingError};

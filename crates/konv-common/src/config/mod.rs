//! Configuration module

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DispatchConfig, Environment,
    RateLimitConfig, RedisConfig, ServerConfig, StoreBackend, TelegramConfig,
};

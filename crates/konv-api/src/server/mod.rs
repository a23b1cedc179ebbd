//! Server setup and initialization
//!
//! The composition root: builds the store, repository, dispatch bus,
//! delivery worker and Telegram front end, then serves HTTP until a shutdown
//! signal arrives.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use konv_cache::{KvChannelRepository, MemoryStore, RedisPool, RedisStore};
use konv_common::{AppConfig, AppError, StoreBackend};
use konv_core::{ChannelRepository, KeyValueStore, Transport};
use konv_service::{DeliveryWorker, DispatchBus, FanoutEngine, ServiceContextBuilder};
use konv_telegram::{build_bot, start_polling, TelegramTransport};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::middleware::{apply_middleware, apply_middleware_with_config};
use crate::routes::{create_router, health_routes};
use crate::state::AppState;

/// Build the application with the default middleware (no rate limiting)
pub fn create_app(state: AppState) -> Router {
    let router = apply_middleware(create_router());
    router.merge(health_routes()).with_state(state)
}

/// Build the application with rate limiting and configured CORS
pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Result<Router, AppError> {
    let router = apply_middleware_with_config(create_router(), &config.rate_limit, &config.cors)?;
    Ok(router.merge(health_routes()).with_state(state))
}

/// Create the key-value store for the configured backend
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    match config.store {
        StoreBackend::Redis => {
            info!("Connecting to Redis...");
            let pool =
                RedisPool::from_config(&config.redis).map_err(|e| AppError::Storage(e.to_string()))?;
            pool.ping()
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;
            info!("Redis connection established");
            Ok(Arc::new(RedisStore::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; channels are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Wire the bus, engine and worker around a store and transport.
///
/// The worker is started before this returns.
pub fn create_app_state(
    store: Arc<dyn KeyValueStore>,
    transport: Arc<dyn Transport>,
    config: &AppConfig,
) -> Result<AppState, AppError> {
    let repo: Arc<dyn ChannelRepository> = Arc::new(KvChannelRepository::new(store.clone()));
    let bus = DispatchBus::new(config.dispatch.buffer);

    let engine = Arc::new(
        FanoutEngine::new(repo.clone(), transport)
            .with_max_chunk_size(config.dispatch.max_chunk_size),
    );
    let worker = Arc::new(DeliveryWorker::new(engine, &bus));
    worker.clone().start();

    let service_context = ServiceContextBuilder::new()
        .store(store)
        .channel_repo(repo)
        .bus(bus)
        .public_base_url(config.telegram.public_base_url.clone())
        .bot_name(config.telegram.bot_name.clone())
        .build()
        .map_err(|e| AppError::Config(e.to_string()))?;

    Ok(AppState::new(service_context, worker))
}

/// Serve HTTP until `shutdown` is cancelled
pub async fn run_server(
    app: Router,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Run konvbot with the given configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let store = create_store(&config).await?;

    let bot = build_bot(&config.telegram.bot_token).map_err(|e| AppError::Config(e.to_string()))?;
    let transport = Arc::new(TelegramTransport::new(bot.clone()));

    let state = create_app_state(store, transport, &config)?;
    let polling = start_polling(bot, state.service_context().clone())
        .await
        .map_err(|e| AppError::Transport(e.to_string()))?;

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone(), polling.clone()));

    let app = create_app_with_config(state.clone(), &config)?;
    let result = run_server(app, addr, shutdown).await;

    polling.cancel();
    state.worker().stop();
    info!("konvbot stopped");
    result
}

/// Cancel `shutdown` on ctrl-c, or when the polling loop gives up
async fn watch_signals(shutdown: CancellationToken, polling: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!(error = %e, "Failed to listen for ctrl-c");
                return;
            }
            info!("Shutdown signal received");
        }
        () = polling.cancelled() => {
            warn!("Telegram polling stopped, shutting down");
        }
    }
    shutdown.cancel();
}

//! Test helpers for integration tests
//!
//! `TestServer` serves the real router on a free local port. Channels are
//! set up through the same repository and conversation service the bot uses,
//! and deliveries land in a `RecordingTransport`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use konv_api::{create_app, create_app_state, AppState};
use konv_cache::{KvChannelRepository, MemoryStore};
use konv_common::AppConfig;
use konv_core::{Channel, ChannelRepository, KeyValueStore, User};
use konv_service::testing::{RecordingTransport, SentChunk};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How long to wait for the background worker to deliver
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    pub transport: Arc<RecordingTransport>,
    pub repo: KvChannelRepository,
    _handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let transport = Arc::new(RecordingTransport::new());

        let state = create_app_state(store.clone(), transport.clone(), &config)?;
        let app = create_app(state.clone());

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            transport,
            repo: KvChannelRepository::new(store),
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Create a channel owned by `owner` with the given targets
    pub async fn channel_with_targets(&self, owner: &User, targets: &[&str]) -> Result<Channel> {
        let mut channel = self
            .repo
            .create(owner, &crate::fixtures::unique_channel_name())
            .await?;
        for target in targets {
            channel.add_target(*target);
        }
        self.repo.save(&channel).await?;
        Ok(channel)
    }

    /// Wait until at least `count` chunks have been sent
    pub async fn wait_for_sent(&self, count: usize) -> Vec<SentChunk> {
        self.transport.wait_for(count, DELIVERY_TIMEOUT).await
    }

    /// Wait until the worker has finished `count` deliveries
    pub async fn wait_for_deliveries(&self, count: u64) -> Result<()> {
        let deadline = tokio::time::Instant::now() + DELIVERY_TIMEOUT;
        while self.state.worker().completed_count() < count {
            if tokio::time::Instant::now() >= deadline {
                anyhow::bail!(
                    "Only {} of {count} deliveries completed",
                    self.state.worker().completed_count()
                );
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }
}

/// Configuration for an in-memory server with a placeholder bot token
pub fn test_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| match key {
        "STORE_BACKEND" => Some("memory".to_string()),
        "TELEGRAM_BOT_TOKEN" => Some("test-token".to_string()),
        "PUBLIC_BASE_URL" => Some("http://konvbot.test".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {e}"))?;
    Ok(config)
}

/// Assert response status and return the body text
pub async fn assert_text(response: Response, expected_status: StatusCode) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if status != expected_status {
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(body)
}

/// Assert response status and parse the JSON body
pub async fn assert_json(
    response: Response,
    expected_status: StatusCode,
) -> Result<serde_json::Value> {
    let body = assert_text(response, expected_status).await?;
    Ok(serde_json::from_str(&body)?)
}

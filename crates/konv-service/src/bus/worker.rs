//! Delivery worker
//!
//! Receives events from the dispatch bus and runs each fan-out on its own
//! task, so a slow transport stalls only the delivery it belongs to.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::dispatch_bus::{DispatchBus, MessageEvent};
use crate::fanout::FanoutEngine;

pub struct DeliveryWorker {
    engine: Arc<FanoutEngine>,
    /// Subscribed at construction so events published before `start` are kept
    receiver: Mutex<Option<broadcast::Receiver<MessageEvent>>>,
    running: AtomicBool,
    shutdown: CancellationToken,
    completed: Arc<AtomicU64>,
}

impl std::fmt::Debug for DeliveryWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryWorker")
            .field("running", &self.is_running())
            .field("completed", &self.completed_count())
            .finish_non_exhaustive()
    }
}

impl DeliveryWorker {
    pub fn new(engine: Arc<FanoutEngine>, bus: &DispatchBus) -> Self {
        Self {
            engine,
            receiver: Mutex::new(Some(bus.subscribe())),
            running: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
            completed: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start consuming events in a background task.
    ///
    /// Returns `None` if the worker was already started.
    pub fn start(self: Arc<Self>) -> Option<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Delivery worker is already running");
            return None;
        }
        let Some(receiver) = self.receiver.lock().take() else {
            self.running.store(false, Ordering::SeqCst);
            tracing::warn!("Delivery worker cannot be restarted");
            return None;
        };

        let worker = self.clone();
        let handle = tokio::spawn(async move {
            worker.run(receiver).await;
        });

        tracing::info!("Delivery worker started");
        Some(handle)
    }

    /// Stop receiving new events. Deliveries already spawned run to completion.
    pub fn stop(&self) {
        self.shutdown.cancel();
        tracing::info!("Delivery worker stopping");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Number of fan-outs that have finished, successfully or not
    pub fn completed_count(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }

    async fn run(&self, mut receiver: broadcast::Receiver<MessageEvent>) {
        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(event) => self.dispatch(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "Delivery worker lagged behind, events dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!("Dispatch bus closed");
                        break;
                    }
                },
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Delivery worker loop ended");
    }

    fn dispatch(&self, event: MessageEvent) {
        let engine = self.engine.clone();
        let completed = self.completed.clone();

        tokio::spawn(async move {
            let MessageEvent {
                channel_id,
                message,
            } = event;

            match engine.deliver(&channel_id, &message).await {
                Ok(report) => {
                    for failure in report.failures() {
                        tracing::debug!(
                            channel_id = %channel_id,
                            address = %failure.target,
                            outcome = ?failure.outcome,
                            "Target not fully delivered"
                        );
                    }
                    tracing::info!(
                        channel_id = %channel_id,
                        targets = report.targets.len(),
                        failed = report.failed_count(),
                        chunks = report.chunk_count,
                        "Message delivered"
                    );
                }
                Err(e) if e.is_not_found() => {
                    tracing::warn!(channel_id = %channel_id, "Message for unknown channel dropped");
                }
                Err(e) => {
                    tracing::error!(channel_id = %channel_id, error = %e, "Message delivery failed");
                }
            }

            completed.fetch_add(1, Ordering::SeqCst);
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::RecordingTransport;
    use konv_cache::{KvChannelRepository, MemoryStore};
    use konv_core::{ChannelRepository, User};

    async fn wait_completed(worker: &DeliveryWorker, count: u64) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while worker.completed_count() < count && tokio::time::Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn test_published_event_is_delivered() {
        let repo = Arc::new(KvChannelRepository::new(Arc::new(MemoryStore::new())));
        let transport = Arc::new(RecordingTransport::new());
        let engine = Arc::new(FanoutEngine::new(repo.clone(), transport.clone()));
        let bus = DispatchBus::new(16);

        let mut channel = repo.create(&User::new("u1"), "alerts").await.unwrap();
        channel.add_target("chat42");
        repo.save(&channel).await.unwrap();

        let worker = Arc::new(DeliveryWorker::new(engine, &bus));
        // Published before start: kept by the early subscription
        bus.publish(MessageEvent::new(channel.id.clone(), "hello"));
        worker.clone().start().unwrap();

        wait_completed(&worker, 1).await;
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target, "chat42");
        assert_eq!(sent[0].chunk, "hello");
        assert_eq!(repo.load(&channel.id).await.unwrap().message_count, 1);
    }

    #[tokio::test]
    async fn test_unknown_channel_does_not_stop_worker() {
        let repo = Arc::new(KvChannelRepository::new(Arc::new(MemoryStore::new())));
        let transport = Arc::new(RecordingTransport::new());
        let engine = Arc::new(FanoutEngine::new(repo.clone(), transport.clone()));
        let bus = DispatchBus::new(16);
        let worker = Arc::new(DeliveryWorker::new(engine, &bus));
        worker.clone().start().unwrap();

        let mut channel = repo.create(&User::new("u1"), "alerts").await.unwrap();
        channel.add_target("chat42");
        repo.save(&channel).await.unwrap();

        bus.publish(MessageEvent::new("missing", "lost"));
        bus.publish(MessageEvent::new(channel.id.clone(), "kept"));

        wait_completed(&worker, 2).await;
        assert!(worker.is_running());
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chunk, "kept");
    }

    #[tokio::test]
    async fn test_start_twice_and_stop() {
        let repo = Arc::new(KvChannelRepository::new(Arc::new(MemoryStore::new())));
        let engine = Arc::new(FanoutEngine::new(repo, Arc::new(RecordingTransport::new())));
        let bus = DispatchBus::new(4);
        let worker = Arc::new(DeliveryWorker::new(engine, &bus));

        let handle = worker.clone().start().unwrap();
        assert!(worker.clone().start().is_none());

        worker.stop();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!worker.is_running());
    }

    #[tokio::test]
    async fn test_restart_after_stop_stays_stopped() {
        let repo = Arc::new(KvChannelRepository::new(Arc::new(MemoryStore::new())));
        let engine = Arc::new(FanoutEngine::new(repo, Arc::new(RecordingTransport::new())));
        let bus = DispatchBus::new(4);
        let worker = Arc::new(DeliveryWorker::new(engine, &bus));

        let handle = worker.clone().start().unwrap();
        worker.stop();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(!worker.is_running());

        assert!(worker.clone().start().is_none());
        assert!(!worker.is_running());
    }
}

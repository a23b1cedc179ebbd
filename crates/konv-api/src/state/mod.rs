//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use konv_service::{DeliveryWorker, ServiceContext};

#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    worker: Arc<DeliveryWorker>,
}

impl AppState {
    pub fn new(service_context: ServiceContext, worker: Arc<DeliveryWorker>) -> Self {
        Self {
            service_context: Arc::new(service_context),
            worker,
        }
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// The worker draining the dispatch bus
    pub fn worker(&self) -> &DeliveryWorker {
        &self.worker
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("worker_running", &self.worker.is_running())
            .finish_non_exhaustive()
    }
}

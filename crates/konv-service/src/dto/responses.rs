//! Response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health of each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub store: String,
    pub delivery_worker: String,
}

fn health_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    pub fn ready(store_healthy: bool, worker_running: bool) -> Self {
        let all_healthy = store_healthy && worker_running;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                store: health_label(store_healthy),
                delivery_worker: health_label(worker_running),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.version, "1.1.1");
    }

    #[test]
    fn test_readiness() {
        assert!(ReadinessResponse::ready(true, true).is_ready());

        let not_ready = ReadinessResponse::ready(false, true);
        assert!(!not_ready.is_ready());
        let json = serde_json::to_value(&not_ready).unwrap();
        assert_eq!(json["checks"]["store"], "unhealthy");
        assert_eq!(json["checks"]["delivery_worker"], "healthy");
    }
}

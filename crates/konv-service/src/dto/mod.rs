//! Data transfer objects for the HTTP ingestion endpoint

pub mod requests;
pub mod responses;

pub use requests::PublishRequest;
pub use responses::{HealthChecks, HealthResponse, ReadinessResponse};

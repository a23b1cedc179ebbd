//! # konv-api
//!
//! HTTP ingestion endpoint built with Axum, plus the composition root that
//! wires the store, the dispatch bus, the delivery worker and the Telegram
//! front end together.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, create_app_with_config, create_store, run};
pub use state::AppState;

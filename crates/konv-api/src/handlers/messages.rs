//! Message ingestion handlers
//!
//! Every accepted message is queued on the dispatch bus and acknowledged
//! with `ok` straight away. Delivery, and any failure of it, happens later.

use axum::extract::{Path, State};
use konv_service::{MessageService, PublishRequest};

use crate::extractors::ValidatedJson;
use crate::response::{ApiResult, ACK_BODY};
use crate::state::AppState;

/// Publish a message
///
/// POST /message
pub async fn publish_message(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PublishRequest>,
) -> ApiResult<&'static str> {
    MessageService::new(state.service_context())
        .publish(request)
        .await?;
    Ok(ACK_BODY)
}

/// Publish a message given in the path
///
/// GET /message/:target/:message
pub async fn publish_message_from_path(
    State(state): State<AppState>,
    Path((target, message)): Path<(String, String)>,
) -> ApiResult<&'static str> {
    MessageService::new(state.service_context())
        .publish(PublishRequest::new(target, message))
        .await?;
    Ok(ACK_BODY)
}

/// Liveness probe kept for existing senders
///
/// GET /message/ping
pub async fn ping() -> &'static str {
    "pong"
}

//! HTTP ingestion tests
//!
//! Every test runs its own in-process server backed by the in-memory store.
//!
//! Run with: cargo test -p integration-tests --test api_tests

use integration_tests::{
    assert_json, assert_text, fixtures::*, TestServer,
};
use konv_core::{ChannelRepository, User};
use konv_service::{ConversationService, InboundMessage};
use reqwest::StatusCode;

// ============================================================================
// Health and ping
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/message/ping").await.unwrap();
    assert_eq!(assert_text(response, StatusCode::OK).await.unwrap(), "pong");
}

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health").await.unwrap();
    let body = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    let server = TestServer::start().await.expect("Failed to start server");
    let response = server.get("/health/ready").await.unwrap();
    let body = assert_json(response, StatusCode::OK).await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["store"], "healthy");
    assert_eq!(body["checks"]["delivery_worker"], "healthy");
}

#[tokio::test]
async fn test_health_not_ready_without_worker() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.state.worker().stop();
    for _ in 0..100 {
        if !server.state.worker().is_running() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let response = server.get("/health/ready").await.unwrap();
    let body = assert_json(response, StatusCode::SERVICE_UNAVAILABLE)
        .await
        .unwrap();
    assert_eq!(body["checks"]["delivery_worker"], "unhealthy");
}

// ============================================================================
// Publishing
// ============================================================================

#[tokio::test]
async fn test_post_message_delivers_to_every_target_in_order() {
    let server = TestServer::start().await.expect("Failed to start server");
    let owner = User::new("u1");
    let channel = server
        .channel_with_targets(&owner, &["chat-a", "chat-b"])
        .await
        .unwrap();

    let response = server
        .post("/message", &PublishBody::new(channel.id.as_str(), "hello"))
        .await
        .unwrap();
    assert_eq!(assert_text(response, StatusCode::OK).await.unwrap(), "ok");

    let sent = server.wait_for_sent(2).await;
    let targets: Vec<_> = sent.iter().map(|s| s.target.as_str()).collect();
    assert_eq!(targets, ["chat-a", "chat-b"]);
    assert!(sent.iter().all(|s| s.chunk == "hello"));

    server.wait_for_deliveries(1).await.unwrap();
    let stored = server.repo.load(&channel.id).await.unwrap();
    assert_eq!(stored.message_count, 1);
    assert_eq!(server.repo.global_message_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_get_message_from_path_is_url_decoded() {
    let server = TestServer::start().await.expect("Failed to start server");
    let channel = server
        .channel_with_targets(&User::new("u1"), &["chat-a"])
        .await
        .unwrap();

    let path = format!("/message/{}/hello%20world", channel.id);
    let response = server.get(&path).await.unwrap();
    assert_eq!(assert_text(response, StatusCode::OK).await.unwrap(), "ok");

    let sent = server.wait_for_sent(1).await;
    assert_eq!(sent[0].target, "chat-a");
    assert_eq!(sent[0].chunk, "hello world");
}

#[tokio::test]
async fn test_long_message_is_chunked() {
    let server = TestServer::start().await.expect("Failed to start server");
    let channel = server
        .channel_with_targets(&User::new("u1"), &["chat-a", "chat-b"])
        .await
        .unwrap();

    let message = "x".repeat(9000);
    let response = server
        .post("/message", &PublishBody::new(channel.id.as_str(), message))
        .await
        .unwrap();
    assert_text(response, StatusCode::OK).await.unwrap();

    let sent = server.wait_for_sent(6).await;
    let lengths: Vec<_> = sent.iter().map(|s| s.chunk.len()).collect();
    assert_eq!(lengths, [4096, 4096, 808, 4096, 4096, 808]);
    assert!(sent[..3].iter().all(|s| s.target == "chat-a"));
    assert!(sent[3..].iter().all(|s| s.target == "chat-b"));
}

#[tokio::test]
async fn test_failing_target_does_not_block_others() {
    let server = TestServer::start().await.expect("Failed to start server");
    server.transport.fail_target("chat-gone");
    let channel = server
        .channel_with_targets(&User::new("u1"), &["chat-gone", "chat-b"])
        .await
        .unwrap();

    let response = server
        .post("/message", &PublishBody::new(channel.id.as_str(), "hi"))
        .await
        .unwrap();
    assert_text(response, StatusCode::OK).await.unwrap();

    let sent = server.wait_for_sent(2).await;
    assert_eq!(sent[1].target, "chat-b");

    server.wait_for_deliveries(1).await.unwrap();
    let stored = server.repo.load(&channel.id).await.unwrap();
    assert_eq!(stored.message_count, 1);
}

#[tokio::test]
async fn test_unknown_channel_is_accepted_and_dropped() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/message", &PublishBody::new("no-such-channel", "hello"))
        .await
        .unwrap();
    assert_eq!(assert_text(response, StatusCode::OK).await.unwrap(), "ok");

    server.wait_for_deliveries(1).await.unwrap();
    assert_eq!(server.transport.sent_count(), 0);
    assert_eq!(server.repo.global_message_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_post_rejects_malformed_body() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/message", &serde_json::json!({ "target": "c1" }))
        .await
        .unwrap();
    let body = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_BODY");
}

#[tokio::test]
async fn test_post_rejects_empty_target() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .post("/message", &PublishBody::new("", "hello"))
        .await
        .unwrap();
    let body = assert_json(response, StatusCode::BAD_REQUEST).await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let server = TestServer::start().await.expect("Failed to start server");

    let response = server
        .client
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/message", server.base_url()),
        )
        .header("Origin", "https://sender.example")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}

// ============================================================================
// End to end: chat front end plus HTTP ingestion
// ============================================================================

#[tokio::test]
async fn test_channel_created_in_chat_receives_posted_messages() {
    let server = TestServer::start().await.expect("Failed to start server");
    let ctx = server.state.service_context();
    let conversations = ConversationService::new(ctx);
    let owner = User::new(unique_chat_id());
    let chat = unique_chat_id();
    let name = unique_channel_name();

    let reply = conversations
        .handle_message(&InboundMessage::new(&chat, owner.clone(), "New Channel"))
        .await
        .unwrap();
    assert_eq!(reply.text, "Give me a name for the channel");

    let reply = conversations
        .handle_message(&InboundMessage::new(&chat, owner.clone(), &name))
        .await
        .unwrap();
    assert_eq!(reply.text, format!("channel {name} created and activated here"));

    let channels = server.repo.list_for_owner(&owner).await.unwrap();
    assert_eq!(channels.len(), 1);
    let channel_id = channels[0].id.clone();

    let response = server
        .post("/message", &PublishBody::new(channel_id.as_str(), "first"))
        .await
        .unwrap();
    assert_text(response, StatusCode::OK).await.unwrap();

    let sent = server.wait_for_sent(1).await;
    assert_eq!(sent[0].target, chat);
    assert_eq!(sent[0].chunk, "first");

    // Pressing Activate again in the same chat unsubscribes it
    let answer = conversations
        .handle_callback(
            Some(&chat),
            &owner,
            &format!("ACTIVATECHANNEL/{channel_id}"),
        )
        .await
        .unwrap();
    assert_eq!(answer.notice.as_deref(), Some("Channel removed!"));

    let response = server
        .get(&format!("/message/{channel_id}/second"))
        .await
        .unwrap();
    assert_text(response, StatusCode::OK).await.unwrap();

    server.wait_for_deliveries(2).await.unwrap();
    assert_eq!(server.transport.sent_count(), 1);

    let stored = server.repo.load(&channel_id).await.unwrap();
    assert_eq!(stored.message_count, 2);
    assert!(stored.targets().is_empty());
}

use httpmock::prelude::*;
use prompt_enhancer::llm::{AnthropicClient, BackendError, ChatMessage, LLMClient, LLMRequest};
use serde_json::json;
use std::time::Duration;

const MODEL: &str = "claude-sonnet-4-5-20250929";

fn client_for(server: &MockServer) -> AnthropicClient {
    AnthropicClient::with_options(
        "test-key".to_string(),
        MODEL.to_string(),
        server.base_url(),
        None,
    )
    .expect("client")
}

fn request() -> LLMRequest {
    LLMRequest::new(vec![ChatMessage::user("Original Prompt:\n\"make a website\"")])
        .with_system("You are an expert.")
        .with_temperature(0.7)
        .with_max_tokens(2048)
}

#[tokio::test]
async fn anthropic_chat_sends_headers_and_maps_response() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/messages")
                .header("x-api-key", "test-key")
                .header("anthropic-version", "2023-06-01")
                .json_body_partial(
                    r#"{
                        "model": "claude-sonnet-4-5-20250929",
                        "max_tokens": 2048,
                        "system": "You are an expert.",
                        "messages": [{"role": "user", "content": "Original Prompt:\n\"make a website\""}]
                    }"#,
                );
            then.status(200).json_body(json!({
                "id": "msg_01",
                "type": "message",
                "role": "assistant",
                "content": [
                    {"type": "thinking", "thinking": "..."},
                    {"type": "text", "text": "{\"enhanced\": {}}"}
                ],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 100, "output_tokens": 50}
            }));
        })
        .await;

    let response = client_for(&server).chat(request()).await.expect("chat");

    mock.assert_async().await;
    assert_eq!(response.text_blocks, vec!["{\"enhanced\": {}}".to_string()]);
    assert_eq!(response.first_text(), Some("{\"enhanced\": {}}"));
    assert_eq!(response.usage.input_tokens, 100);
    assert_eq!(response.usage.output_tokens, 50);
}

#[tokio::test]
async fn anthropic_unauthorized_maps_to_authentication_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(401).json_body(json!({
                "type": "error",
                "error": {"type": "authentication_error", "message": "invalid x-api-key"}
            }));
        })
        .await;

    let err = client_for(&server).chat(request()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::AuthenticationError {
            message: "invalid x-api-key".to_string()
        }
    );
}

#[tokio::test]
async fn anthropic_rate_limit_reads_retry_after() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(429)
                .header("retry-after", "12")
                .json_body(json!({
                    "type": "error",
                    "error": {"type": "rate_limit_error", "message": "slow down"}
                }));
        })
        .await;

    let err = client_for(&server).chat(request()).await.unwrap_err();
    assert_eq!(
        err,
        BackendError::RateLimitError {
            retry_after: Some(12)
        }
    );
}

#[tokio::test]
async fn anthropic_server_error_maps_to_api_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(529).json_body(json!({
                "type": "error",
                "error": {"type": "overloaded_error", "message": "Overloaded"}
            }));
        })
        .await;

    let err = client_for(&server).chat(request()).await.unwrap_err();
    match err {
        BackendError::ApiError {
            message,
            status_code,
        } => {
            assert_eq!(status_code, Some(529));
            assert!(message.contains("Overloaded"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn anthropic_undecodable_body_is_invalid_response() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let err = client_for(&server).chat(request()).await.unwrap_err();
    assert!(matches!(err, BackendError::InvalidResponse { .. }));
}

#[tokio::test]
async fn anthropic_timeout_maps_to_timeout_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/messages");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"content": [], "usage": {"input_tokens": 0, "output_tokens": 0}}));
        })
        .await;

    let client = AnthropicClient::with_options(
        "test-key".to_string(),
        MODEL.to_string(),
        server.base_url(),
        Some(Duration::from_secs(1)),
    )
    .expect("client");

    let err = client.chat(request()).await.unwrap_err();
    assert_eq!(err, BackendError::TimeoutError { seconds: 1 });
}

#[tokio::test]
async fn anthropic_unreachable_host_is_network_error() {
    let client = AnthropicClient::with_options(
        "test-key".to_string(),
        MODEL.to_string(),
        "http://127.0.0.1:1".to_string(),
        Some(Duration::from_secs(5)),
    )
    .expect("client");

    let err = client.chat(request()).await.unwrap_err();
    assert!(matches!(err, BackendError::NetworkError { .. }));
}

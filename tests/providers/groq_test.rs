//! Groq provider wire format tests.

use serde_json::json;

use leadreply::providers::groq::{build_request, parse_response, GroqProvider, GROQ_API_BASE};
use leadreply::providers::{CompletionRequest, LlmProvider, Message, ProviderError};

use crate::stub_server::{serve_completion, serve_once};

fn simple_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![Message::system("Be careful."), Message::user("Hello")],
        temperature: 0.5,
        top_p: 0.9,
        max_tokens: 1024,
    }
}

#[test]
fn build_request_keeps_order_and_parameters() {
    let req = build_request("llama-3.3-70b-versatile", &simple_request());
    assert_eq!(req.model, "llama-3.3-70b-versatile");
    assert_eq!(req.messages.len(), 2);
    assert_eq!(req.messages[0].role, "system");
    assert_eq!(req.messages[0].content, "Be careful.");
    assert_eq!(req.messages[1].role, "user");
    assert_eq!(req.messages[1].content, "Hello");
    assert_eq!(req.max_tokens, 1024);

    let value = serde_json::to_value(&req).expect("request should serialize");
    assert_eq!(value["temperature"], json!(0.5));
    assert_eq!(value["top_p"], json!(0.9_f32));
    assert_eq!(value["max_tokens"], json!(1024));
}

#[test]
fn parse_response_takes_first_choice() {
    let body = json!({
        "choices": [
            {"message": {"role": "assistant", "content": "first"}, "finish_reason": "stop"},
            {"message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
        ],
        "model": "llama-3.3-70b-versatile",
        "usage": {"prompt_tokens": 10, "completion_tokens": 5}
    });

    let resp = parse_response(&body.to_string()).expect("should parse");
    assert_eq!(resp.text.as_deref(), Some("first"));
    assert_eq!(resp.finish_reason.as_deref(), Some("stop"));
    assert_eq!(resp.model, "llama-3.3-70b-versatile");
    assert_eq!(resp.usage.input_tokens, 10);
    assert_eq!(resp.usage.output_tokens, 5);
}

#[test]
fn parse_response_without_usage_defaults_to_zero() {
    let body = json!({
        "choices": [{"message": {"content": null}, "finish_reason": "length"}],
        "model": "m"
    });
    let resp = parse_response(&body.to_string()).expect("should parse");
    assert!(resp.text.is_none());
    assert_eq!(resp.usage.input_tokens, 0);
    assert_eq!(resp.usage.output_tokens, 0);
}

#[test]
fn parse_response_missing_choices_is_parse_error() {
    let body = json!({"choices": [], "model": "m"});
    let err = parse_response(&body.to_string()).expect_err("empty choices should fail");
    assert!(matches!(err, ProviderError::Parse(msg) if msg.contains("choices")));
}

#[test]
fn parse_response_rejects_non_json() {
    let err = parse_response("<html>bad gateway</html>").expect_err("html should fail");
    assert!(matches!(err, ProviderError::Parse(_)));
}

#[test]
fn endpoint_joins_base_url() {
    let provider = GroqProvider::new("m".to_owned(), "http://localhost:9/v1/", None);
    assert_eq!(provider.endpoint(), "http://localhost:9/v1/chat/completions");

    let default = GroqProvider::new("m".to_owned(), GROQ_API_BASE, None);
    assert_eq!(
        default.endpoint(),
        "https://api.groq.com/openai/v1/chat/completions"
    );
    assert_eq!(default.model_id(), "m");
}

#[test]
fn debug_output_redacts_api_key() {
    let provider = GroqProvider::new(
        "m".to_owned(),
        GROQ_API_BASE,
        Some("gsk_supersecretvalue".to_owned()),
    );
    let debug = format!("{provider:?}");
    assert!(!debug.contains("gsk_supersecretvalue"));
    assert!(debug.contains("[REDACTED]"));
}

#[tokio::test]
async fn complete_posts_bearer_authenticated_json() {
    let (base_url, captured) = serve_completion("drafted").await;
    let provider = GroqProvider::new(
        "llama-3.3-70b-versatile".to_owned(),
        &base_url,
        Some("test-key".to_owned()),
    );

    let resp = provider
        .complete(simple_request())
        .await
        .expect("stub completion should succeed");
    assert_eq!(resp.text.as_deref(), Some("drafted"));

    let request = captured.await.expect("stub should capture request");
    assert!(request.head.starts_with("post /chat/completions "));
    assert!(request.head.contains("authorization: bearer test-key"));

    let body: serde_json::Value =
        serde_json::from_str(&request.body).expect("request body should be JSON");
    assert_eq!(body["model"], "llama-3.3-70b-versatile");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "Hello");
}

#[tokio::test]
async fn complete_without_key_omits_authorization_and_surfaces_401() {
    let (base_url, captured) = serve_once(
        "401 Unauthorized",
        "application/json",
        r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error"}}"#,
    )
    .await;
    let provider = GroqProvider::new("m".to_owned(), &base_url, None);

    let err = provider
        .complete(simple_request())
        .await
        .expect_err("401 should fail");
    match err {
        ProviderError::HttpStatus { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API Key"));
        }
        other => panic!("expected http status error, got: {other}"),
    }

    let request = captured.await.expect("stub should capture request");
    assert!(!request.head.contains("authorization:"));
}

#[tokio::test]
async fn complete_reports_transport_failure() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        listener.local_addr().expect("listener should expose local addr")
    };
    let provider = GroqProvider::new("m".to_owned(), &format!("http://{addr}"), None);
    let err = provider
        .complete(simple_request())
        .await
        .expect_err("connection should fail");
    assert!(matches!(err, ProviderError::Request(_)));
}

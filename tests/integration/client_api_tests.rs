/*!
 * Integration tests for the HTTP translation client against mock endpoints
 */

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pagewai::errors::ProviderError;
use pagewai::translation::{ClientSettings, TranslationClient};

use crate::common;

/// Base URL that the client treats as an Ollama server
fn ollama_base(server: &MockServer) -> String {
    format!("{}/ollama", server.uri())
}

fn fast_client() -> TranslationClient {
    TranslationClient::new(ClientSettings {
        page_timeout: Duration::from_secs(1),
        selection_timeout: Duration::from_secs(1),
        ..ClientSettings::default()
    })
}

#[tokio::test]
async fn test_generate_endpoint_withResponseField_shouldReturnTrimmedText() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ollama/api/generate"))
        .and(body_partial_json(serde_json::json!({"model": "llama2", "stream": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "model": "llama2",
            "response": "  Hola\n---\nMundo \n",
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Hello\n---\nWorld", &common::test_config(&ollama_base(&server)))
        .await;

    assert_eq!(result, Ok("Hola\n---\nMundo".to_string()));
}

#[tokio::test]
async fn test_generate_endpoint_withPrompt_shouldIncludeLanguageAndText() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ollama/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"response": "ok"})))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    client
        .translate_text("Good evening", &common::test_config(&ollama_base(&server)))
        .await
        .expect("translation");

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let prompt = body["prompt"].as_str().expect("prompt");
    assert!(prompt.starts_with("Translate the following text to Spanish."));
    assert!(prompt.ends_with("Text to translate:\nGood evening"));
}

#[tokio::test]
async fn test_chat_endpoint_withChoices_shouldReturnFirstContent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "llama2", "max_tokens": 2000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "\nBuenos días\n"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Good morning", &common::test_config(&server.uri()))
        .await;

    assert_eq!(result, Ok("Buenos días".to_string()));
}

#[tokio::test]
async fn test_selection_withChatEndpoint_shouldUseSelectionLimits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"max_tokens": 1000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": "Gato"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_selection("Cat", &common::test_config(&server.uri()))
        .await;
    assert_eq!(result, Ok("Gato".to_string()));

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    let prompt = body["messages"][0]["content"].as_str().expect("content");
    assert!(!prompt.contains("---"));
}

#[tokio::test]
async fn test_error_status_withJsonError_shouldReturnApiError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ollama/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(serde_json::json!({"error": "model 'llama2' not found"})),
        )
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Hello", &common::test_config(&ollama_base(&server)))
        .await;

    assert_eq!(
        result,
        Err(ProviderError::ApiError {
            status_code: 404,
            status_text: "Not Found".to_string(),
            detail: "model 'llama2' not found".to_string(),
        })
    );
}

#[tokio::test]
async fn test_error_status_withLongPlainBody_shouldTruncateDetail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(2000)))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Hello", &common::test_config(&server.uri()))
        .await;

    match result {
        Err(ProviderError::ApiError {
            status_code, detail, ..
        }) => {
            assert_eq!(status_code, 500);
            assert_eq!(detail.chars().count(), 500);
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_success_status_withHtmlBody_shouldReturnParseError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Hello", &common::test_config(&server.uri()))
        .await;

    assert_eq!(result, Err(ProviderError::ParseError("<html>proxy login</html>".to_string())));
}

#[tokio::test]
async fn test_success_status_withUnknownShape_shouldReturnFormatError() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"output": "Hola"})))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    let result = client
        .translate_text("Hello", &common::test_config(&server.uri()))
        .await;

    assert_eq!(result, Err(ProviderError::FormatError));
}

#[tokio::test]
async fn test_slow_endpoint_withShortCeiling_shouldReturnTimeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(serde_json::json!({"choices": [{"message": {"content": "late"}}]})),
        )
        .mount(&server)
        .await;

    let result = fast_client()
        .translate_text("Hello", &common::test_config(&server.uri()))
        .await;

    assert_eq!(result, Err(ProviderError::Timeout { seconds: 1 }));
}

#[tokio::test]
async fn test_unreachable_endpoint_withClosedPort_shouldReturnRequestFailed() {
    let result = fast_client()
        .translate_text("Hello", &common::test_config("http://127.0.0.1:9"))
        .await;

    assert!(matches!(result, Err(ProviderError::RequestFailed(_))), "got {:?}", result);
}

#[tokio::test]
async fn test_cancellable_withCancelledToken_shouldReturnCancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({"choices": [{"message": {"content": "late"}}]})),
        )
        .mount(&server)
        .await;

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let client = TranslationClient::default();
    let result = client
        .translate_cancellable("Hello", &common::test_config(&server.uri()), &token)
        .await;

    assert_eq!(result, Err(ProviderError::Cancelled));
}

#[tokio::test]
async fn test_connection_withHealthyEndpoints_shouldSucceed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ollama/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    assert_eq!(client.test_connection(&common::test_config(&ollama_base(&server))).await, Ok(()));
    assert_eq!(client.test_connection(&common::test_config(&server.uri())).await, Ok(()));
}

#[tokio::test]
async fn test_connection_withUnauthorized_shouldReturnShortDetail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401).set_body_string("y".repeat(300)))
        .mount(&server)
        .await;

    let client = TranslationClient::default();
    match client.test_connection(&common::test_config(&server.uri())).await {
        Err(ProviderError::ApiError {
            status_code,
            status_text,
            detail,
        }) => {
            assert_eq!(status_code, 401);
            assert_eq!(status_text, "Unauthorized");
            assert_eq!(detail.len(), 100);
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

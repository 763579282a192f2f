/*!
 * End-to-end tests: parse a page, translate it through a mock endpoint, revert it
 */

use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use pagewai::job::{JobController, JobEvent, JobOutcome};
use pagewai::page::Document;
use pagewai::providers::mock::MockTranslator;
use pagewai::translation::{SECTION_SEPARATOR, TranslationClient};

use crate::common::{self, RecordingSink, SAMPLE_PAGE};

/// Generate-style endpoint that prefixes every section of the prompt text
struct PrefixingResponder;

impl Respond for PrefixingResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: serde_json::Value = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let prompt = body["prompt"].as_str().unwrap_or_default();
        let text = prompt
            .split_once("Text to translate:\n")
            .map(|(_, text)| text)
            .unwrap_or_default();
        let translated = text
            .split(SECTION_SEPARATOR)
            .map(|section| format!("ES: {}", section))
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": translated }))
    }
}

#[tokio::test]
async fn test_page_translation_withGenerateEndpoint_shouldTranslateAndRevert() {
    common::init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ollama/api/generate"))
        .respond_with(PrefixingResponder)
        .mount(&server)
        .await;

    let document = Document::parse_html(SAMPLE_PAGE);
    let original_html = document.to_html();
    let sink = RecordingSink::new();
    let controller = JobController::with_sink(
        Arc::new(TranslationClient::default()),
        document,
        Arc::new(sink.clone()),
    )
    .with_batch_size(2);

    let config = common::test_config(&format!("{}/ollama", server.uri()));
    let outcome = controller.start(&config).await;
    assert_eq!(outcome, JobOutcome::Completed);

    let html = controller.document_html();
    assert!(html.contains("<h1 data-translated=\"true\""));
    assert!(html.contains("ES: Welcome to the garden"));
    assert!(html.contains("ES: every morning"));
    assert!(html.contains("var greeting = \"do not translate\";"));
    assert!(html.contains("<pre>cargo build --release</pre>"));
    assert!(html.contains("<textarea>Draft notes</textarea>"));

    // 5 units in batches of 2: three requests
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(3));
    assert_eq!(sink.percents(), vec![10, 20, 43, 67, 90, 100]);

    controller.revert();
    assert_eq!(controller.document_html(), original_html);
}

#[tokio::test]
async fn test_page_translation_withServerErrors_shouldCompleteWithoutChanges() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({"message": "overloaded"})))
        .mount(&server)
        .await;

    let document = Document::parse_html(SAMPLE_PAGE);
    let original_html = document.to_html();
    let sink = RecordingSink::new();
    let controller = JobController::with_sink(
        Arc::new(TranslationClient::default()),
        document,
        Arc::new(sink.clone()),
    );

    let outcome = controller.start(&common::test_config(&server.uri())).await;

    assert_eq!(outcome, JobOutcome::Completed);
    assert_eq!(sink.events().last(), Some(&JobEvent::complete()));
    assert_eq!(controller.document_html(), original_html);
    assert!(controller.with_page(|page| page.undo.is_empty()));
}

#[tokio::test]
async fn test_page_translation_withHtmlFile_shouldWriteTranslatedCopy() {
    let temp_dir = common::create_temp_dir().expect("temp dir");
    let input = common::create_test_file(temp_dir.path(), "article.html", SAMPLE_PAGE).expect("input");

    let html = std::fs::read_to_string(&input).expect("readable");
    let controller = JobController::new(Arc::new(MockTranslator::working()), Document::parse_html(&html));
    assert_eq!(controller.start(&common::offline_config()).await, JobOutcome::Completed);

    let output = temp_dir.path().join("article.spanish.html");
    std::fs::write(&output, controller.document_html()).expect("writable");

    let reparsed = Document::parse_html(&std::fs::read_to_string(&output).expect("readable"));
    let h1 = reparsed.find_element("h1").expect("heading");
    assert_eq!(reparsed.text_content(h1), "[Spanish] Welcome to the garden");
    assert_eq!(reparsed.attribute(h1, "data-translated"), Some("true"));
}

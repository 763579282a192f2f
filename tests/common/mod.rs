/*!
 * Common test utilities for the pagewai test suite
 */

#![allow(dead_code)]

use anyhow::Result;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use pagewai::app_config::TranslationConfig;
use pagewai::job::{EventSink, JobEvent, JobMessage};
use pagewai::page::{Document, NodeId};

/// Route library logs to the test output; safe to call from every test
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A small article with content that must and must not be translated
pub const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sample article</title><style>p { color: red; }</style></head>
<body>
<h1>Welcome to the garden</h1>
<p class="intro">Tomatoes need plenty of sun.</p>
<p>Water them <em>every morning</em> before noon.</p>
<script>var greeting = "do not translate";</script>
<pre>cargo build --release</pre>
<code>let x = 42;</code>
<p>2024</p>
<p>OK</p>
<textarea>Draft notes</textarea>
</body>
</html>"#;

/// Translatable strings of `SAMPLE_PAGE` in document order
pub const SAMPLE_PAGE_UNITS: &[&str] = &[
    "Welcome to the garden",
    "Tomatoes need plenty of sun.",
    "Water them",
    "every morning",
    "before noon.",
];

/// Build `<html><body>` with `count` paragraphs "Paragraph number N"
pub fn page_with_paragraphs(count: usize) -> (Document, Vec<NodeId>) {
    let (mut doc, body) = Document::with_body();
    let mut text_nodes = Vec::with_capacity(count);
    for i in 0..count {
        let p = doc.append_element(body, "p");
        text_nodes.push(doc.append_text(p, &format!("Paragraph number {}", i + 1)));
    }
    (doc, text_nodes)
}

/// Translation config pointing at `endpoint_url`
pub fn test_config(endpoint_url: &str) -> TranslationConfig {
    TranslationConfig::new(endpoint_url, "llama2", "Spanish")
}

/// Config for tests that never reach the network
pub fn offline_config() -> TranslationConfig {
    test_config("http://localhost:11434")
}

/// Sink that keeps every message for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<JobMessage>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<JobMessage> {
        self.messages.lock().clone()
    }

    pub fn events(&self) -> Vec<JobEvent> {
        self.messages().into_iter().map(|m| m.event).collect()
    }

    /// Percent values of progress and completion events, in order
    pub fn percents(&self) -> Vec<u8> {
        self.events().iter().filter_map(JobEvent::percent).collect()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, message: JobMessage) {
        self.messages.lock().push(message);
    }
}

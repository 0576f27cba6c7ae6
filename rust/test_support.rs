// Fakes shared by the unit tests: a local stand-in for the messages endpoint,
// plus scripted extractor/generator/sink implementations.
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use lopdf::{
    Document, Object, Stream,
    content::{Content, Operation},
    dictionary,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::{
    clients::anthropic::GeneratedContent, error::AgentError, extract::TextExtractor,
    generator::Generate, sink::OutputSink,
};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub api_key: Option<String>,
    pub version: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockAnthropic {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockAnthropic {
    pub async fn ok(text: &str) -> Self {
        let reply = json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-sonnet-20240229",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn"
        });
        Self::spawn(StatusCode::OK, reply).await
    }

    pub async fn failing(status: u16, kind: &str, message: &str) -> Self {
        let reply = json!({
            "type": "error",
            "error": { "type": kind, "message": message }
        });
        let status = StatusCode::from_u16(status).expect("valid status code");
        Self::spawn(status, reply).await
    }

    async fn spawn(status: StatusCode, reply: Value) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            status,
            reply,
            requests: requests.clone(),
        };
        let app = Router::new()
            .route("/v1/messages", post(messages_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
        let addr = listener.local_addr().expect("mock addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

async fn messages_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        api_key: header("x-api-key"),
        version: header("anthropic-version"),
        body,
    });
    (state.status, Json(state.reply.clone()))
}

/// Writes a PDF with one Helvetica text line per page.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .map(|text| {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            })
            .into()
        })
        .collect();

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    // One write, so a watcher never sees a half-written file for long.
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Wraps an extractor and records every path it is asked to open.
pub struct RecordingExtractor<E> {
    inner: E,
    paths: Arc<Mutex<Vec<PathBuf>>>,
}

impl<E> RecordingExtractor<E> {
    pub fn new(inner: E) -> (Self, Arc<Mutex<Vec<PathBuf>>>) {
        let paths = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                inner,
                paths: paths.clone(),
            },
            paths,
        )
    }
}

impl<E: TextExtractor> TextExtractor for RecordingExtractor<E> {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, AgentError> {
        self.paths.lock().unwrap().push(path.to_path_buf());
        self.inner.extract_pages(path)
    }
}

/// Extractor that serves canned pages per path; unknown paths fail like a corrupt file.
#[derive(Default)]
pub struct ScriptedExtractor {
    pages: HashMap<PathBuf, Vec<String>>,
}

impl ScriptedExtractor {
    pub fn with_pdf(mut self, path: impl Into<PathBuf>, pages: &[&str]) -> Self {
        self.pages
            .insert(path.into(), pages.iter().map(|p| p.to_string()).collect());
        self
    }
}

impl TextExtractor for ScriptedExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, AgentError> {
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| AgentError::extraction(path, "not a PDF"))
    }
}

/// Generator that records every text it receives and answers with a fixed result.
#[derive(Clone, Default)]
pub struct RecordingGenerator {
    calls: Arc<Mutex<Vec<String>>>,
    failure: Option<AgentError>,
}

impl RecordingGenerator {
    pub fn failing(error: AgentError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Generate for RecordingGenerator {
    async fn generate(&self, text: &str) -> Result<(), AgentError> {
        self.calls.lock().unwrap().push(text.to_string());
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Default)]
pub struct MemorySink {
    emitted: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn emitted(&self) -> Vec<String> {
        self.emitted.lock().unwrap().clone()
    }
}

impl OutputSink for MemorySink {
    fn emit(&self, content: &GeneratedContent) {
        self.emitted.lock().unwrap().push(content.text.clone());
    }
}

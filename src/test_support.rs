//! Shared fixtures for unit tests: an in-process recognition service stub
//! and a view that records every UI transition.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    routing::post,
    Router,
};

use crate::form::UploadFile;
use crate::render::Report;
use crate::submission::{ControlState, SubmissionState};
use crate::view::SubmissionView;

pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3, 4];

pub fn png_upload(name: &str) -> UploadFile {
    UploadFile::from_bytes(name, PNG_BYTES.to_vec())
}

/// The `file` field as the stub received it.
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    body: String,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<ReceivedUpload>>>,
}

/// Recognition endpoint answering every request with a fixed status and body.
pub struct StubServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last: Arc<Mutex<Option<ReceivedUpload>>>,
}

impl StubServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            hits: Arc::new(AtomicUsize::new(0)),
            last: Arc::new(Mutex::new(None)),
        };
        let hits = state.hits.clone();
        let last = state.last.clone();

        let app = Router::new()
            .route("/inec-ocr", post(recognize))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            hits,
            last,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_upload(&self) -> Option<ReceivedUpload> {
        self.last.lock().unwrap().clone()
    }
}

async fn recognize(
    State(state): State<StubState>,
    mut multipart: Multipart,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.hits.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            *state.last.lock().unwrap() = Some(ReceivedUpload {
                file_name,
                content_type,
                data,
            });
            break;
        }
    }

    (
        state.status,
        [(header::CONTENT_TYPE, "application/json")],
        state.body.clone(),
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Controls(SubmissionState),
    Cleared,
    Report,
    PlaceholderHidden,
    Scrolled(String),
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub controls: Option<ControlState>,
    pub report: Option<Report>,
    pub failure: Option<String>,
    pub placeholder_visible: bool,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            controls: None,
            report: None,
            failure: None,
            placeholder_visible: true,
        }
    }
}

impl SubmissionView for RecordingView {
    fn apply_controls(&mut self, controls: &ControlState) {
        let state = if controls.spinner_visible {
            SubmissionState::Busy
        } else {
            SubmissionState::Idle
        };
        self.events.push(ViewEvent::Controls(state));
        self.controls = Some(controls.clone());
    }

    fn clear_report(&mut self) {
        self.events.push(ViewEvent::Cleared);
        self.report = None;
        self.failure = None;
    }

    fn show_report(&mut self, report: &Report) {
        self.events.push(ViewEvent::Report);
        self.report = Some(report.clone());
    }

    fn hide_placeholder(&mut self) {
        self.events.push(ViewEvent::PlaceholderHidden);
        self.placeholder_visible = false;
    }

    fn scroll_into_view(&mut self, element_id: &str) {
        self.events.push(ViewEvent::Scrolled(element_id.to_string()));
    }

    fn show_failure(&mut self, message: &str) {
        self.events.push(ViewEvent::Failure(message.to_string()));
        self.failure = Some(message.to_string());
    }
}

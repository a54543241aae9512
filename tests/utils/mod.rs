use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once, mpsc};
use std::thread::{self, JoinHandle};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use log::{Level, LevelFilter, Log, Metadata, Record};
use serde_json::{Value, json};
use tender_sync::ReleaseSource;
use tender_sync::schema::{RecordType, ReleasePackage};
use tokio::sync::oneshot;

/// Release from the end-to-end notice scenario
#[must_use]
pub fn road_works_release() -> Value {
    json!({
        "ocid": "ocds-1",
        "id": "r1",
        "date": "2025-06-01T00:00:00Z",
        "tender": {
            "title": "Road works",
            "status": "active",
            "value": {"amount": 50000, "currency": "GBP"},
            "tenderPeriod": {"endDate": "2025-06-20T00:00:00Z"}
        },
        "buyer": {"name": "City Council"}
    })
}

/// Minimal tender-stage release
#[must_use]
pub fn tender_release(ocid: &str, id: &str, title: &str) -> Value {
    json!({
        "ocid": ocid,
        "id": id,
        "date": "2025-06-13T09:30:00Z",
        "tender": {"title": title, "status": "active"},
        "buyer": {"name": "County Council"}
    })
}

/// Minimal planning-stage release
#[must_use]
pub fn planning_release(ocid: &str, id: &str, title: &str) -> Value {
    json!({
        "ocid": ocid,
        "id": id,
        "date": "2025-06-13T09:30:00Z",
        "planning": {
            "budget": {"amount": {"amount": 120_000, "currency": "GBP"}},
            "project": {"title": title}
        },
        "buyer": {"name": "Health Trust"}
    })
}

/// Package wrapping the given releases
#[must_use]
pub fn package(releases: Vec<Value>) -> ReleasePackage {
    ReleasePackage { releases }
}

/// Source serving fixed packages and recording what was asked for
#[derive(Debug, Default)]
pub struct StaticSource {
    pub tender: Option<ReleasePackage>,
    pub pipeline: Option<ReleasePackage>,
    pub requests: RefCell<Vec<RecordType>>,
}

impl StaticSource {
    #[must_use]
    pub fn new(tender: Option<ReleasePackage>, pipeline: Option<ReleasePackage>) -> Self {
        Self {
            tender,
            pipeline,
            requests: RefCell::default(),
        }
    }
}

impl ReleaseSource for StaticSource {
    fn fetch(&self, record_type: RecordType) -> Option<ReleasePackage> {
        self.requests.borrow_mut().push(record_type);
        match record_type {
            RecordType::Tender => self.tender.clone(),
            RecordType::Pipeline => self.pipeline.clone(),
        }
    }
}

/// Log line emitted on the capturing thread
#[derive(Debug, Clone)]
pub struct CapturedLog {
    pub level: Level,
    pub message: String,
}

thread_local! {
    static CAPTURED: RefCell<Vec<CapturedLog>> = const { RefCell::new(Vec::new()) };
}

/// Keeps each thread's records apart, so parallel tests do not see each other's lines
struct ThreadLogger;

impl Log for ThreadLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED.with(|captured| {
            captured.borrow_mut().push(CapturedLog {
                level: record.level(),
                message: record.args().to_string(),
            });
        });
    }

    fn flush(&self) {}
}

static LOGGER: ThreadLogger = ThreadLogger;
static INSTALL_LOGGER: Once = Once::new();

/// Run `f` and return what it logged on this thread
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<CapturedLog>) {
    INSTALL_LOGGER.call_once(|| {
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
    });

    CAPTURED.with(|captured| captured.borrow_mut().clear());
    let result = f();
    let logs = CAPTURED.with(|captured| std::mem::take(&mut *captured.borrow_mut()));
    (result, logs)
}

/// Request as seen by [`StubServer`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path and query string
    pub target: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    #[must_use]
    pub fn json_body(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

/// Canned response
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
}

impl StubResponse {
    #[must_use]
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct StubState {
    responses: Mutex<VecDeque<StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Loopback axum server answering requests with canned responses, in order.
///
/// The server runs on its own tokio runtime in a background thread, so the
/// blocking clients under test can call it from the test thread.
pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    #[must_use]
    pub fn start(responses: Vec<StubResponse>) -> Self {
        let state = Arc::new(StubState {
            responses: Mutex::new(responses.into()),
            requests: Mutex::default(),
        });
        let app = Router::new()
            .fallback(record_and_reply)
            .with_state(Arc::clone(&state));

        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                addr_tx.send(listener.local_addr().unwrap()).unwrap();
                tokio::select! {
                    _ = axum::serve(listener, app).into_future() => {}
                    _ = shutdown_rx => {}
                }
            });
        });
        let addr = addr_rx.recv().unwrap();

        Self {
            base_url: format!("http://{addr}"),
            state,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the server and return the requests it received
    #[must_use]
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        self.stop();
        self.state.requests.lock().unwrap().clone()
    }

    fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn record_and_reply(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        target: uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), ToString::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body,
    });

    let response = state.responses.lock().unwrap().pop_front();
    let (status, body) = match response {
        Some(response) => (
            StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            response.body,
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "no canned response left"}).to_string(),
        ),
    };
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

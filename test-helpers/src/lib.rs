pub mod mock;

use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, http, web};
use loader::{LoaderOptions, ResourceLoader, telemetry};
use payloads::{APIClient, ProductPage, REQUEST_SEQUENCE_HEADER};
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_log::LogTracer;
use tracing_subscriber::util::SubscriberInitExt;

/// One canned response from the mock source.
#[derive(Debug, Clone, PartialEq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
    /// Wait this long before answering.
    pub delay: Duration,
}

impl MockResponse {
    /// 200 with an arbitrary body, valid or not.
    pub fn raw(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// 200 with a serialized page.
    pub fn page(page: &ProductPage) -> Self {
        Self::raw(serde_json::to_string(page).unwrap())
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            ..Self::raw(body)
        }
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self { delay, ..self }
    }
}

/// Shared, mutable script of what the mock source answers.
///
/// Requests carrying a sequence number with a scripted response get that
/// response; everything else gets the default.
#[derive(Clone)]
pub struct Script {
    inner: Arc<Mutex<ScriptState>>,
}

struct ScriptState {
    default: MockResponse,
    by_sequence: HashMap<u64, MockResponse>,
    hits: Vec<Option<u64>>,
}

impl Script {
    pub fn new(default: MockResponse) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ScriptState {
                default,
                by_sequence: HashMap::new(),
                hits: Vec::new(),
            })),
        }
    }

    pub fn set_default(&self, response: MockResponse) {
        self.inner.lock().unwrap().default = response;
    }

    /// Answer the request tagged with `sequence` with `response`.
    pub fn respond_to(&self, sequence: u64, response: MockResponse) {
        self.inner
            .lock()
            .unwrap()
            .by_sequence
            .insert(sequence, response);
    }

    /// Sequence numbers of the requests served so far, in arrival order.
    pub fn hits(&self) -> Vec<Option<u64>> {
        self.inner.lock().unwrap().hits.clone()
    }

    fn next(&self, sequence: Option<u64>) -> MockResponse {
        let mut state = self.inner.lock().unwrap();
        state.hits.push(sequence);
        sequence
            .and_then(|s| state.by_sequence.get(&s).cloned())
            .unwrap_or_else(|| state.default.clone())
    }
}

#[get("/products")]
async fn products(req: HttpRequest, script: web::Data<Script>) -> HttpResponse {
    let sequence = req
        .headers()
        .get(REQUEST_SEQUENCE_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let response = script.next(sequence);
    tracing::debug!(?sequence, status = response.status, "serving products");

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    let status = http::StatusCode::from_u16(response.status)
        .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(response.body)
}

pub struct TestSource {
    pub port: u16,
    pub client: APIClient,
    pub script: Script,
}

impl TestSource {
    pub fn address(&self) -> String {
        self.client.address.clone()
    }

    /// A loader pointed at this source.
    pub fn loader(&self, options: LoaderOptions) -> ResourceLoader<APIClient> {
        ResourceLoader::new(self.client.clone(), options)
    }
}

/// Start the mock source on `port`, serving the full sample catalog until
/// scripted otherwise.
pub async fn spawn_source_on_port(port: u16) -> TestSource {
    let subscriber = telemetry::get_subscriber("error".into());
    let _ = LogTracer::init();
    let _ = subscriber.try_init();

    let script = Script::new(MockResponse::raw(mock::full_catalog_body()));

    // OS assigns the port if binding to 0
    let listener = TcpListener::bind(("127.0.0.1", port)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let data = web::Data::new(script.clone());
    let server =
        HttpServer::new(move || App::new().app_data(data.clone()).service(products))
            .workers(1)
            .listen(listener)
            .unwrap()
            .run();
    tokio::spawn(server);

    TestSource {
        port,
        client: APIClient::new(format!("http://127.0.0.1:{port}")),
        script,
    }
}

/// Use OS-assigned port for parallel testing.
pub async fn spawn_source() -> TestSource {
    spawn_source_on_port(0).await
}

/// Reserve a port with nothing listening on it. Connections to it are
/// refused until something binds it again.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

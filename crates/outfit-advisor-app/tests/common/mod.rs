//! Shared fixtures for app integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use outfit_advisor_api::{
    ApiClient, ApiError, FormPart, HttpRequest, HttpResponse, HttpTransport, RequestBody,
};
use outfit_advisor_app::{AdvisorApp, Clock};
use outfit_advisor_auth::{AuthClient, ClientStore, HttpAuthTransport, MemoryClientStore};
use outfit_advisor_core::ImageUpload;

/// Loopback origin used by every fixture.
pub const BASE_URL: &str = "http://127.0.0.1:8000";

/// Well-formed advice Markdown.
#[allow(dead_code)]
pub const ADVICE_MARKDOWN: &str = "# Outfit Rating: 92/100\n\n## Quick Take\nPolished and weather-ready.\n\n## Highlights\nThe coat fits well.\n\n## Color Analysis\nNavy and camel work together.\n\n## Suggestions\n* Swap the sneakers for loafers\n* Add a silk scarf\n";

/// Transport that replays queued responses per URL path and records requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<BTreeMap<String, VecDeque<Result<HttpResponse, ApiError>>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

#[allow(dead_code)]
impl ScriptedTransport {
    /// Creates an empty script.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues a raw response for `path`.
    pub fn push(&self, path: &str, response: Result<HttpResponse, ApiError>) {
        self.responses
            .lock()
            .expect("script lock")
            .entry(path.to_string())
            .or_default()
            .push_back(response);
    }

    /// Queues a `200 OK` JSON body for `path`.
    pub fn push_json(&self, path: &str, body: &str) {
        self.push(path, Ok(HttpResponse::json(body)));
    }

    /// Queues a successful analysis.
    pub fn push_analysis(&self, image_path: &str) {
        self.push_json(
            "/api/analyze",
            &format!(
                r#"{{"success":true,"image_path":"{image_path}","description":"navy coat, white sneakers"}}"#
            ),
        );
    }

    /// Queues a successful advice reply carrying `markdown`.
    pub fn push_advice(&self, markdown: &str) {
        let body = serde_json::json!({ "success": true, "advice": markdown }).to_string();
        self.push_json("/api/advice", &body);
    }

    /// Queues a successful login.
    pub fn push_login(&self, token: &str) {
        self.push_json(
            "/auth/login",
            &format!(r#"{{"access_token":"{token}","token_type":"bearer"}}"#),
        );
    }

    /// Returns every request seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request lock").clone()
    }

    /// Returns requests sent to `path`.
    pub fn requests_to(&self, path: &str) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect()
    }
}

impl HttpTransport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests
            .lock()
            .expect("request lock")
            .push(request.clone());
        self.responses
            .lock()
            .expect("script lock")
            .get_mut(request.url.path())
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Err(ApiError::Network(format!("unscripted {}", request.url))))
    }
}

/// Clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

#[allow(dead_code)]
impl ManualClock {
    /// Creates a clock at `now_ms`.
    pub fn at(now_ms: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(now_ms)))
    }

    /// Moves the clock to `now_ms`.
    pub fn set(&self, now_ms: u64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Builds an app over `transport`, `store` and `clock`.
#[allow(dead_code)]
pub fn app_with(
    transport: Arc<ScriptedTransport>,
    store: Box<dyn ClientStore>,
    clock: Arc<ManualClock>,
) -> AdvisorApp {
    let http: Arc<dyn HttpTransport> = transport;
    let api = ApiClient::new(BASE_URL, Arc::clone(&http)).expect("api client");
    let auth = AuthClient::new(BASE_URL, Arc::new(HttpAuthTransport::new(http))).expect("auth client");
    AdvisorApp::new("0.1.0", api, auth, store, clock)
}

/// Builds an app with in-memory storage at time 1000.
#[allow(dead_code)]
pub fn app(transport: Arc<ScriptedTransport>) -> AdvisorApp {
    app_with(transport, Box::new(MemoryClientStore::new()), ManualClock::at(1_000))
}

/// Small JPEG-named fixture image.
#[allow(dead_code)]
pub fn fixture_image(name: &str) -> ImageUpload {
    ImageUpload::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff, name.len() as u8])
        .expect("fixture image should be valid")
}

/// Returns the value of text field `name` in a multipart or form body.
#[allow(dead_code)]
pub fn text_field(request: &HttpRequest, name: &str) -> Option<String> {
    match &request.body {
        RequestBody::Multipart(parts) => parts.iter().find_map(|part| match part {
            FormPart::Text { name: field, value } if field == name => Some(value.clone()),
            _ => None,
        }),
        RequestBody::UrlEncoded(fields) => fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone()),
        RequestBody::Empty => None,
    }
}

/// Drives a fresh app through a first successful upload.
#[allow(dead_code)]
pub fn analyzed_app(transport: Arc<ScriptedTransport>) -> AdvisorApp {
    transport.push_analysis("uploads/look-1.jpg");
    transport.push_advice(ADVICE_MARKDOWN);

    let mut app = app(transport);
    app.start();
    app.select_occasion("Business Casual");
    app.select_image(fixture_image("look-1.jpg"));
    app.submit_upload().expect("upload should run");
    app
}

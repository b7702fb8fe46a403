#![warn(missing_docs)]
//! # outfit-advisor-api
//!
//! ## Purpose
//! Client for the outfit analysis service: image analysis and advice
//! requests over an injectable HTTP transport.
//!
//! ## Responsibilities
//! - Validate the service base URL (HTTPS, or HTTP on loopback only).
//! - Build multipart requests for `/api/analyze` and `/api/advice`.
//! - Normalize HTTP status, content type, JSON decoding and the logical
//!   `success` flag into one [`ApiError`] taxonomy.
//! - Fingerprint requests so callers can detect duplicate submissions.
//!
//! ## Data flow
//! Workflow handler -> [`ApiRequest`] -> [`ApiClient::dispatch`] ->
//! [`HttpTransport::execute`] -> [`HttpResponse`] -> normalized [`ApiReply`].
//!
//! ## Ownership and lifetimes
//! Requests own their bodies so a prepared request can be handed to another
//! thread by the host event loop.
//!
//! ## Error model
//! Every failure class maps to a distinct [`ApiError`] variant. There is no
//! retry; a failed call ends the current workflow step.
//!
//! ## Security and privacy notes
//! Access tokens travel only in the `Cookie` header and are excluded from
//! fingerprints and log events.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use outfit_advisor_advice_contract::{parse_advice_response, parse_analyze_response};
use outfit_advisor_core::ImageUpload;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::{Host, Url};

/// Analysis endpoint path.
pub const ANALYZE_PATH: &str = "/api/analyze";
/// Advice endpoint path.
pub const ADVICE_PATH: &str = "/api/advice";
/// Cookie carrying the identity token.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

const JSON_CONTENT_TYPE: &str = "application/json";
const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred";
const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to continue";

/// One part of a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// File field.
    File {
        /// Field name.
        name: String,
        /// Uploaded file name.
        file_name: String,
        /// MIME type of the file.
        content_type: String,
        /// File content.
        bytes: Vec<u8>,
    },
}

impl FormPart {
    /// Creates a text part.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the field name.
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for FormPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text { name, value } => f
                .debug_struct("Text")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::File {
                name,
                file_name,
                content_type,
                bytes,
            } => f
                .debug_struct("File")
                .field("name", name)
                .field("file_name", file_name)
                .field("content_type", content_type)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Request body encodings used by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// `multipart/form-data` body.
    Multipart(Vec<FormPart>),
    /// `application/x-www-form-urlencoded` body.
    UrlEncoded(Vec<(String, String)>),
    /// No body.
    Empty,
}

/// Transport-level POST request.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: Url,
    /// Encoded body.
    pub body: RequestBody,
    /// Identity token sent as the `access_token` cookie.
    pub access_token: Option<String>,
}

impl HttpRequest {
    /// Computes a stable SHA-256 fingerprint of URL and body.
    ///
    /// The access token is excluded so the same request made before and
    /// after a token refresh fingerprints identically.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url.as_str().as_bytes());
        match &self.body {
            RequestBody::Multipart(parts) => {
                for part in parts {
                    hasher.update([0x1e]);
                    match part {
                        FormPart::Text { name, value } => {
                            hasher.update(name.as_bytes());
                            hasher.update([0x1f]);
                            hasher.update(value.as_bytes());
                        }
                        FormPart::File {
                            name,
                            file_name,
                            bytes,
                            ..
                        } => {
                            hasher.update(name.as_bytes());
                            hasher.update([0x1f]);
                            hasher.update(file_name.as_bytes());
                            hasher.update([0x1f]);
                            hasher.update(bytes);
                        }
                    }
                }
            }
            RequestBody::UrlEncoded(fields) => {
                for (name, value) in fields {
                    hasher.update([0x1e]);
                    hasher.update(name.as_bytes());
                    hasher.update([0x1f]);
                    hasher.update(value.as_bytes());
                }
            }
            RequestBody::Empty => {}
        }
        hex::encode(hasher.finalize())
    }
}

impl std::fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url.as_str())
            .field("body", &self.body)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Transport-level response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Reason phrase for the status.
    pub reason: String,
    /// `Content-Type` header, when present.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Builds a `200 OK` JSON response. Used by in-memory transports.
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            reason: "OK".to_string(),
            content_type: Some(JSON_CONTENT_TYPE.to_string()),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` when the content type declares JSON.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|value| value.to_ascii_lowercase().contains(JSON_CONTENT_TYPE))
            .unwrap_or(false)
    }
}

/// Abstract transport used by the API and auth clients.
pub trait HttpTransport: Send + Sync {
    /// Sends one POST request and returns the raw response.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] when no response was received.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking `reqwest` transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport. `timeout = None` waits indefinitely.
    ///
    /// # Errors
    /// Returns [`ApiError::Network`] when the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|error| ApiError::Network(format!("http client setup failed: {error}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        use reqwest::blocking::multipart::{Form, Part};
        use reqwest::header::{CONTENT_TYPE, COOKIE};

        let mut builder = self.client.post(request.url.clone());
        if let Some(token) = &request.access_token {
            builder = builder.header(COOKIE, format!("{ACCESS_TOKEN_COOKIE}={token}"));
        }

        builder = match &request.body {
            RequestBody::Multipart(parts) => {
                let mut form = Form::new();
                for part in parts {
                    form = match part {
                        FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                        FormPart::File {
                            name,
                            file_name,
                            content_type,
                            bytes,
                        } => {
                            let file = Part::bytes(bytes.clone())
                                .file_name(file_name.clone())
                                .mime_str(content_type)
                                .map_err(|error| {
                                    ApiError::Network(format!("invalid part content type: {error}"))
                                })?;
                            form.part(name.clone(), file)
                        }
                    };
                }
                builder.multipart(form)
            }
            RequestBody::UrlEncoded(fields) => builder.form(fields),
            RequestBody::Empty => builder,
        };

        let response = builder
            .send()
            .map_err(|error| ApiError::Network(error.to_string()))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .map_err(|error| ApiError::Network(format!("failed to read body: {error}")))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            content_type,
            body,
        })
    }
}

/// Validates the service base URL.
///
/// # Errors
/// Returns [`ApiError::InvalidEndpoint`] for unparsable URLs, schemes other
/// than HTTP(S), or plain HTTP to a non-loopback host.
pub fn validate_base_url(raw: &str) -> Result<Url, ApiError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|error| ApiError::InvalidEndpoint(format!("invalid base url: {error}")))?;

    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if is_loopback(&parsed) => Ok(parsed),
        "http" => Err(ApiError::InvalidEndpoint(
            "plain http is only allowed for loopback hosts".to_string(),
        )),
        other => Err(ApiError::InvalidEndpoint(format!(
            "unsupported url scheme: {other}"
        ))),
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

/// Appends an endpoint path to a validated base URL.
///
/// Any path prefix on the base is kept: `https://host/outfit` joined with
/// `/api/analyze` gives `https://host/outfit/api/analyze`.
///
/// # Errors
/// Returns [`ApiError::InvalidEndpoint`] when the join fails.
pub fn join_endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    let mut prefix = base.clone();
    if !prefix.path().ends_with('/') {
        let directory = format!("{}/", prefix.path());
        prefix.set_path(&directory);
    }
    prefix
        .join(path.trim_start_matches('/'))
        .map_err(|error| ApiError::InvalidEndpoint(format!("cannot join {path}: {error}")))
}

/// Fields of one advice request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceRequest {
    /// Image reference from the analysis step.
    pub image_reference: String,
    /// Outfit description from the analysis step.
    pub description: String,
    /// Question asked by the user.
    pub user_input: String,
    /// Occasion or style goal.
    pub style_goal: String,
}

impl AdviceRequest {
    fn form_parts(&self) -> Vec<FormPart> {
        vec![
            FormPart::text("image_path", &self.image_reference),
            FormPart::text("description", &self.description),
            FormPart::text("user_input", &self.user_input),
            FormPart::text("style_goals", &self.style_goal),
        ]
    }
}

/// Successful analysis result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    /// Server-side image reference.
    pub image_reference: String,
    /// Outfit description.
    pub description: String,
}

/// Request kinds issued by the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    /// Upload and analyze an image.
    Analyze(ImageUpload),
    /// Ask for advice.
    Advice(AdviceRequest),
}

/// Normalized successful replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply {
    /// Analysis finished.
    Analysis(AnalysisOutcome),
    /// Advice Markdown, absent when the server omitted it.
    Advice(Option<String>),
}

/// Analysis/advice client bound to one service.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    analyze_url: Url,
    advice_url: Url,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Creates a client for a validated base URL.
    ///
    /// # Errors
    /// Returns [`ApiError::InvalidEndpoint`] per [`validate_base_url`].
    pub fn new(base_url: &str, transport: Arc<dyn HttpTransport>) -> Result<Self, ApiError> {
        let base_url = validate_base_url(base_url)?;
        let analyze_url = join_endpoint(&base_url, ANALYZE_PATH)?;
        let advice_url = join_endpoint(&base_url, ADVICE_PATH)?;
        Ok(Self {
            base_url,
            analyze_url,
            advice_url,
            transport,
        })
    }

    /// Returns the validated base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the shared transport.
    pub fn transport(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.transport)
    }

    /// Builds the transport request for `request`.
    pub fn build_request(&self, request: &ApiRequest, access_token: Option<&str>) -> HttpRequest {
        let (url, parts) = match request {
            ApiRequest::Analyze(upload) => (
                self.analyze_url.clone(),
                vec![FormPart::File {
                    name: "image".to_string(),
                    file_name: upload.file_name.clone(),
                    content_type: upload.content_type.clone(),
                    bytes: upload.bytes.clone(),
                }],
            ),
            ApiRequest::Advice(advice) => (self.advice_url.clone(), advice.form_parts()),
        };

        HttpRequest {
            url,
            body: RequestBody::Multipart(parts),
            access_token: access_token.map(str::to_string),
        }
    }

    /// Sends a request and normalizes its reply.
    ///
    /// # Errors
    /// Returns the [`ApiError`] class matching the failure.
    pub fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
    ) -> Result<ApiReply, ApiError> {
        let http_request = self.build_request(request, access_token);
        tracing::debug!(url = %http_request.url, "dispatching api request");

        let response = self.transport.execute(&http_request)?;
        let reply = match request {
            ApiRequest::Analyze(_) => normalize_analysis(&response).map(ApiReply::Analysis),
            ApiRequest::Advice(_) => normalize_advice(&response).map(ApiReply::Advice),
        };

        if let Err(error) = &reply {
            tracing::warn!(url = %http_request.url, %error, "api request failed");
        }
        reply
    }

    /// Uploads an image for analysis.
    ///
    /// # Errors
    /// See [`ApiClient::dispatch`].
    pub fn analyze_image(
        &self,
        upload: &ImageUpload,
        access_token: Option<&str>,
    ) -> Result<AnalysisOutcome, ApiError> {
        match self.dispatch(&ApiRequest::Analyze(upload.clone()), access_token)? {
            ApiReply::Analysis(outcome) => Ok(outcome),
            ApiReply::Advice(_) => Err(ApiError::Contract("unexpected advice reply".to_string())),
        }
    }

    /// Requests advice Markdown.
    ///
    /// # Errors
    /// See [`ApiClient::dispatch`].
    pub fn request_advice(
        &self,
        advice: &AdviceRequest,
        access_token: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        match self.dispatch(&ApiRequest::Advice(advice.clone()), access_token)? {
            ApiReply::Advice(text) => Ok(text),
            ApiReply::Analysis(_) => {
                Err(ApiError::Contract("unexpected analysis reply".to_string()))
            }
        }
    }
}

/// Checks status and content type, returning the JSON body text.
///
/// # Errors
/// Returns [`ApiError::Status`] for non-2xx statuses and
/// [`ApiError::NonJson`] when the body is not declared as JSON.
pub fn json_body(response: &HttpResponse) -> Result<&str, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status {
            status: response.status,
            reason: response.reason.clone(),
        });
    }
    if !response.is_json() {
        return Err(ApiError::NonJson);
    }
    Ok(&response.body)
}

fn rejection_message(message: Option<String>) -> String {
    message
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string())
}

fn normalize_analysis(response: &HttpResponse) -> Result<AnalysisOutcome, ApiError> {
    let parsed = parse_analyze_response(json_body(response)?)
        .map_err(|error| ApiError::Decode(error.to_string()))?;

    if !parsed.success {
        if parsed.requires_login {
            return Err(ApiError::LoginRequired(
                parsed
                    .message
                    .unwrap_or_else(|| LOGIN_REQUIRED_MESSAGE.to_string()),
            ));
        }
        return Err(ApiError::Rejected(rejection_message(parsed.message)));
    }

    let image_reference = parsed
        .image_path
        .filter(|path| !path.trim().is_empty())
        .ok_or_else(|| ApiError::Contract("analysis response missing image_path".to_string()))?;

    Ok(AnalysisOutcome {
        image_reference,
        description: parsed.description.unwrap_or_default(),
    })
}

fn normalize_advice(response: &HttpResponse) -> Result<Option<String>, ApiError> {
    let parsed = parse_advice_response(json_body(response)?)
        .map_err(|error| ApiError::Decode(error.to_string()))?;

    if !parsed.success {
        return Err(ApiError::Rejected(rejection_message(parsed.message)));
    }
    Ok(parsed.advice)
}

/// API client errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Base URL or endpoint path is invalid.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// No response was received.
    #[error("network error: {0}")]
    Network(String),
    /// Server answered with a non-2xx status.
    #[error("API error: {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reason phrase.
        reason: String,
    },
    /// Body was not declared as JSON.
    #[error("Server returned a non-JSON response")]
    NonJson,
    /// Body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),
    /// Server reported `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// Server reported `success: false` and asked for a login.
    #[error("{0}")]
    LoginRequired(String),
    /// Successful response violated the contract.
    #[error("contract violation: {0}")]
    Contract(String),
}

//! HTTP client for the thread server.
//!
//! `request` is the single choke point: it performs the call, parses the body
//! as JSON regardless of status and maps failures onto [`ApiError`]. The
//! typed helpers below decode into the schemas in [`crate::model`].
//!
//! The client does not write to the audit log. A body that is not JSON is
//! reported on the optional notice channel so the caller can audit it.

mod error;

pub use error::{ApiError, ApiErrorKind, ApiResult, classify_reqwest_error};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tokio::sync::mpsc::UnboundedSender;
use url::Url;

use crate::model::{
    CreateThreadResponse, NewThread, SearchResponse, SourceResponse, StatusResponse, Thread,
    ThreadsResponse,
};

/// Header the server uses to hand the client a ready-made audit line.
pub const AUDIT_HEADER: &str = "x-action-audit";

/// Unparsed response of `GET /export/pdf/{id}`.
#[derive(Debug, Clone)]
pub struct ExportResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub audit_header: Option<String>,
    pub body: Vec<u8>,
}

impl ExportResponse {
    /// True when the server answered with a PDF payload.
    pub fn is_pdf(&self) -> bool {
        self.status.is_success()
            && self
                .content_type
                .as_deref()
                .and_then(|ct| ct.split(';').next())
                .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/pdf"))
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    notices: Option<UnboundedSender<String>>,
}

impl ApiClient {
    pub fn new(base: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            base,
            notices: None,
        }
    }

    /// Routes "Non-JSON response" notices to `tx`.
    #[must_use]
    pub fn with_notices(mut self, tx: UnboundedSender<String>) -> Self {
        self.notices = Some(tx);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `<base>/<segments...>`. Each segment is percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::validation(format!("Server URL cannot be a base: {}", self.base))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of the printable view for a thread. Opened, never fetched.
    pub fn print_url(&self, thread_id: &str) -> ApiResult<Url> {
        self.endpoint(&["_print", thread_id])
    }

    /// Performs one call and returns the JSON payload.
    ///
    /// A success status with a non-JSON body yields `{}`. A failure status
    /// yields `Server { status }` with the payload's `error`, the canonical
    /// status text, or "Request failed", in that order.
    pub async fn request(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let url = self.endpoint(segments)?;
        let path = url.path().to_string();

        let mut builder = self.http.request(method.clone(), url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(%method, %path, error = %e, "request did not complete");
            classify_reqwest_error(e)
        })?;
        let status = response.status();
        tracing::debug!(%method, %path, status = status.as_u16(), "response");

        let bytes = response.bytes().await.map_err(classify_reqwest_error)?;
        let payload = self.parse_payload(&path, &bytes);

        if !status.is_success() {
            return Err(ApiError::request_failed(
                status.as_u16(),
                failure_reason(status, payload.as_ref()),
            ));
        }

        Ok(payload.unwrap_or_else(|| Value::Object(Map::new())))
    }

    fn parse_payload(&self, path: &str, bytes: &[u8]) -> Option<Value> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return None;
        }
        match serde_json::from_slice(bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(%path, error = %e, "non-JSON body");
                self.notice(format!("Non-JSON response from {path}"));
                None
            }
        }
    }

    fn notice(&self, message: String) {
        if let Some(tx) = &self.notices {
            // Receiver gone means the session is shutting down.
            let _ = tx.send(message);
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> ApiResult<T> {
        let value = self.request(Method::GET, segments, query, None).await?;
        decode(value, segments)
    }

    async fn post<T: DeserializeOwned>(&self, segments: &[&str], body: &Value) -> ApiResult<T> {
        let value = self.request(Method::POST, segments, &[], Some(body)).await?;
        decode(value, segments)
    }

    /// `GET /api/sources`
    pub async fn active_source(&self) -> ApiResult<SourceResponse> {
        self.get(&["api", "sources"], &[]).await
    }

    /// `GET /api/threads`
    pub async fn list_threads(&self) -> ApiResult<Vec<Thread>> {
        let response: ThreadsResponse = self.get(&["api", "threads"], &[]).await?;
        Ok(response.threads)
    }

    /// `POST /threads`
    pub async fn create_thread(&self, new: &NewThread) -> ApiResult<CreateThreadResponse> {
        let body = serde_json::to_value(new)
            .map_err(|e| ApiError::validation(format!("Invalid thread request: {e}")))?;
        self.post(&["threads"], &body).await
    }

    /// `POST /threads/{id}/archive`
    pub async fn archive_thread(&self, thread_id: &str, archive: bool) -> ApiResult<()> {
        self.request(
            Method::POST,
            &["threads", thread_id, "archive"],
            &[],
            Some(&json!({ "archive": archive })),
        )
        .await
        .map(drop)
    }

    /// `POST /threads/{id}/messages`. Blank prompts never reach the network.
    pub async fn send_message(&self, thread_id: &str, prompt: &str) -> ApiResult<()> {
        let prompt = validate_prompt(prompt)?;
        self.request(
            Method::POST,
            &["threads", thread_id, "messages"],
            &[],
            Some(&json!({ "prompt": prompt })),
        )
        .await
        .map(drop)
    }

    /// `GET /api/search?q=`
    pub async fn search(&self, query: &str) -> ApiResult<SearchResponse> {
        self.get(&["api", "search"], &[("q", query)]).await
    }

    /// `GET /export/pdf/{id}`, returned unparsed for the export negotiator.
    pub async fn fetch_export(&self, thread_id: &str) -> ApiResult<ExportResponse> {
        let url = self.endpoint(&["export", "pdf", thread_id])?;
        let path = url.path().to_string();

        let response = self.http.get(url).send().await.map_err(|e| {
            tracing::warn!(%path, error = %e, "export request did not complete");
            classify_reqwest_error(e)
        })?;

        let status = response.status();
        let header = |name| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        let content_type = header(CONTENT_TYPE.as_str());
        let audit_header = header(AUDIT_HEADER);
        tracing::debug!(%path, status = status.as_u16(), ?content_type, "export response");

        let body = response.bytes().await.map_err(classify_reqwest_error)?;
        Ok(ExportResponse {
            status,
            content_type,
            audit_header,
            body: body.to_vec(),
        })
    }

    /// `POST /set-source`
    pub async fn set_source(&self, path: &str, force: bool) -> ApiResult<StatusResponse> {
        self.post(&["set-source"], &json!({ "path": path, "force": force }))
            .await
    }

    /// `POST /ingest`
    pub async fn ingest(
        &self,
        path: &str,
        client_slug: &str,
        dest: &str,
    ) -> ApiResult<StatusResponse> {
        self.post(
            &["ingest"],
            &json!({ "path": path, "client_slug": client_slug, "dest": dest }),
        )
        .await
    }

    /// `POST /hotswap`
    pub async fn hotswap(&self, client_slug: &str) -> ApiResult<StatusResponse> {
        self.post(&["hotswap"], &json!({ "client_slug": client_slug }))
            .await
    }

    /// `POST /preset`
    pub async fn apply_preset(&self, preset: &str) -> ApiResult<StatusResponse> {
        self.post(&["preset"], &json!({ "preset": preset })).await
    }
}

/// Trims a prompt, rejecting blank input.
pub fn validate_prompt(prompt: &str) -> ApiResult<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Prompt is empty"));
    }
    Ok(trimmed)
}

fn failure_reason(status: StatusCode, payload: Option<&Value>) -> String {
    payload
        .and_then(|p| p.get("error"))
        .and_then(Value::as_str)
        .filter(|e| !e.trim().is_empty())
        .or_else(|| status.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}

fn decode<T: DeserializeOwned>(value: Value, segments: &[&str]) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| {
        ApiError::malformed(format!(
            "Unexpected response from /{}: {e}",
            segments.join("/")
        ))
    })
}

//! PDF export with a print-view fallback.
//!
//! The server either streams `application/pdf` or answers with JSON carrying
//! `{"fallback": "print-to-pdf"}` when it has no PDF engine. Anything else is
//! reported as a failure rather than guessed at. A request that never
//! completes always falls back to the printable view.
//!
//! The negotiator never opens a browser itself. It returns an
//! [`ExportOutcome`] and the caller decides whether to open the print URL.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use url::Url;

use crate::api::{ApiClient, ApiError, ExportResponse};

pub const DEFAULT_FILENAME: &str = "thread";
const MAX_FILENAME_CHARS: usize = 120;
const MAX_COLLISION_SUFFIX: u32 = 999;

/// Turns a display title into a safe file stem.
///
/// Trims, collapses whitespace runs to `_`, replaces anything outside
/// `[A-Za-z0-9._-]` with `_` and truncates to 120 characters. Empty input
/// becomes `"thread"`.
pub fn sanitize_filename(title: &str) -> String {
    let trimmed = title.trim();
    let source = if trimmed.is_empty() {
        DEFAULT_FILENAME
    } else {
        trimmed
    };

    let mut out = String::with_capacity(source.len());
    let mut in_whitespace = false;
    for ch in source.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }

    let out: String = out.chars().take(MAX_FILENAME_CHARS).collect();
    if out.is_empty() {
        DEFAULT_FILENAME.to_string()
    } else {
        out
    }
}

/// The server's fallback indicator. Closed set; other shapes are malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackSignal {
    None,
    PrintToPdf,
}

impl FallbackSignal {
    pub const PRINT_TO_PDF: &str = "print-to-pdf";

    pub fn from_payload(payload: &Value) -> Result<Self, ApiError> {
        let Some(object) = payload.as_object() else {
            return Err(ApiError::malformed("Export response is not a JSON object"));
        };
        match object.get("fallback") {
            None | Some(Value::Null) => Ok(FallbackSignal::None),
            Some(Value::String(s)) if s == Self::PRINT_TO_PDF => Ok(FallbackSignal::PrintToPdf),
            Some(other) => Err(ApiError::malformed(format!(
                "Unknown export fallback: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// PDF written to `path`.
    Downloaded { path: PathBuf },
    /// Caller should open `url`. `error` is set when the request itself failed.
    PrintFallback { url: Url, error: Option<String> },
    /// Nothing to open or save.
    Failed { error: String },
}

/// Outcome plus the single audit line describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub outcome: ExportOutcome,
    pub audit: String,
}

impl ExportReport {
    pub fn print_url(&self) -> Option<&Url> {
        match &self.outcome {
            ExportOutcome::PrintFallback { url, .. } => Some(url),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.outcome,
            ExportOutcome::Failed { .. } | ExportOutcome::PrintFallback { error: Some(_), .. }
        )
    }
}

pub struct ExportNegotiator<'a> {
    client: &'a ApiClient,
    download_dir: PathBuf,
}

impl<'a> ExportNegotiator<'a> {
    pub fn new(client: &'a ApiClient, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            download_dir: download_dir.into(),
        }
    }

    /// Runs the export protocol for one thread.
    pub async fn export(&self, thread_id: &str, title: &str) -> ExportReport {
        let print_url = match self.client.print_url(thread_id) {
            Ok(url) => url,
            Err(e) => return failed(None, e.message),
        };

        let response = match self.client.fetch_export(thread_id).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "export request failed, using print view");
                return ExportReport {
                    audit: format!("Export request failed ({e}); falling back to print view."),
                    outcome: ExportOutcome::PrintFallback {
                        url: print_url,
                        error: Some(e.message),
                    },
                };
            }
        };

        if response.is_pdf() {
            return self.save(thread_id, title, &response);
        }
        interpret(thread_id, &response, print_url)
    }

    fn save(&self, thread_id: &str, title: &str, response: &ExportResponse) -> ExportReport {
        let stem = sanitize_filename(title);
        match write_pdf(&self.download_dir, &stem, &response.body) {
            Ok(path) => {
                tracing::info!(thread_id, path = %path.display(), "pdf saved");
                let audit = response
                    .audit_header
                    .clone()
                    .unwrap_or_else(|| format!("Exported {thread_id} to {}", path.display()));
                ExportReport {
                    outcome: ExportOutcome::Downloaded { path },
                    audit,
                }
            }
            Err(e) => failed(None, format!("Could not save PDF: {e}")),
        }
    }
}

fn interpret(thread_id: &str, response: &ExportResponse, print_url: Url) -> ExportReport {
    let payload: Option<Value> = serde_json::from_slice(&response.body).ok();
    let server_audit = response.audit_header.clone().or_else(|| {
        payload
            .as_ref()
            .and_then(|p| p.get("audit"))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    });

    let signal = match &payload {
        Some(payload) => FallbackSignal::from_payload(payload),
        None => Err(ApiError::malformed(match response.content_type.as_deref() {
            Some(ct) => format!("Unexpected export response ({ct})"),
            None => "Unexpected export response".to_string(),
        })),
    };

    match signal {
        Ok(FallbackSignal::PrintToPdf) => ExportReport {
            audit: server_audit
                .unwrap_or_else(|| format!("PDF unavailable for {thread_id}; opening print view.")),
            outcome: ExportOutcome::PrintFallback {
                url: print_url,
                error: None,
            },
        },
        Ok(FallbackSignal::None) => {
            let reason = payload
                .as_ref()
                .and_then(|p| p.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| status_reason(response))
                .unwrap_or_else(|| "No PDF or fallback in response".to_string());
            failed(server_audit, reason)
        }
        Err(e) if !response.status.is_success() => failed(
            server_audit,
            status_reason(response).unwrap_or(e.message),
        ),
        Err(e) => failed(server_audit, e.message),
    }
}

fn status_reason(response: &ExportResponse) -> Option<String> {
    if response.status.is_success() {
        return None;
    }
    Some(
        response
            .status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    )
}

fn failed(server_audit: Option<String>, error: String) -> ExportReport {
    ExportReport {
        audit: server_audit.unwrap_or_else(|| format!("Export failed: {error}")),
        outcome: ExportOutcome::Failed { error },
    }
}

/// Writes `bytes` to `<dir>/<stem>.pdf`, adding `-1`, `-2`, ... on collision.
///
/// Bytes land in a temp file in the same directory first, which is removed
/// on every error path.
fn write_pdf(dir: &Path, stem: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;

    for n in 0..=MAX_COLLISION_SUFFIX {
        let name = if n == 0 {
            format!("{stem}.pdf")
        } else {
            format!("{stem}-{n}.pdf")
        };
        let target = dir.join(name);
        match tmp.persist_noclobber(&target) {
            Ok(_) => return Ok(target),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => tmp = e.file,
            Err(e) => return Err(e.error),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("too many files named {stem}.pdf"),
    ))
}

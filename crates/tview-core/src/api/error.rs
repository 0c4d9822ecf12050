//! Error type shared by every API call.

use std::fmt;

/// Categories of client-side failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// The request never completed (connect, DNS, reset, body read).
    Transport,
    /// Non-success HTTP status, with or without an `error` field.
    Server { status: u16 },
    /// Success status but the body did not match the expected shape.
    Malformed,
    /// Client-side precondition failed; no request was sent.
    Validation,
}

impl fmt::Display for ApiErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorKind::Transport => write!(f, "transport"),
            ApiErrorKind::Server { status } => write!(f, "server ({status})"),
            ApiErrorKind::Malformed => write!(f, "malformed"),
            ApiErrorKind::Validation => write!(f, "validation"),
        }
    }
}

/// Structured API error with a one-line, user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Transport, message)
    }

    /// `RequestFailed(reason)`: the server answered with a non-success status.
    pub fn request_failed(status: u16, reason: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Server { status }, reason)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Malformed, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Validation, message)
    }

    pub fn is_transport(&self) -> bool {
        self.kind == ApiErrorKind::Transport
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

/// Classifies a reqwest error into a transport `ApiError`.
pub fn classify_reqwest_error(e: reqwest::Error) -> ApiError {
    let e = e.without_url();
    if e.is_timeout() {
        ApiError::transport(format!("Request timed out: {e}"))
    } else if e.is_connect() {
        ApiError::transport(format!("Connection failed: {e}"))
    } else if e.is_request() {
        ApiError::transport(format!("Request error: {e}"))
    } else {
        ApiError::transport(format!("Network error: {e}"))
    }
}

/// Result type for API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

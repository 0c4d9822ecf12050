//! Wire schemas for threads, messages and endpoint responses.
//!
//! The server is loosely typed: titles may be `null`, timestamps may be
//! integers or floats, and older servers omit whole fields. Everything here
//! deserializes leniently (missing or `null` becomes the default) so that a
//! single odd thread never poisons a whole snapshot. Display fallbacks such as
//! "Untitled" live in the view layer, not here.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A conversation thread as returned by `GET /api/threads`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub client_slug: Option<String>,
    #[serde(default)]
    pub source_slug: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
}

/// A single message inside a thread. Insertion order is chronological.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Open display tag ("user", "assistant", "plan", ...). Blank when absent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "lenient_ts")]
    pub ts: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<Citation>,
}

/// Accepts numbers and numeric strings; anything else is treated as absent.
fn lenient_ts<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// A source reference attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub file: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
}

/// `GET /api/threads`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadsResponse {
    /// Required: a success body without it is malformed, not an empty list.
    #[serde(deserialize_with = "null_as_default")]
    pub threads: Vec<Thread>,
}

/// `GET /api/sources`
///
/// Current servers answer `{ active_source }`; older ones `{ source, slug }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceResponse {
    #[serde(default)]
    pub active_source: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

impl SourceResponse {
    /// Display label for the active source, or `None` if the server sent neither field.
    pub fn label(&self) -> Option<String> {
        let name = self
            .active_source
            .as_deref()
            .or(self.source.as_deref())
            .filter(|s| !s.trim().is_empty())?;
        Some(match self.slug.as_deref().filter(|s| !s.is_empty()) {
            Some(slug) => format!("Source: {name} (slug {slug})"),
            None => format!("Source: {name}"),
        })
    }
}

/// Request body for `POST /threads`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewThread {
    pub title: String,
    pub client_slug: String,
    pub source_slug: String,
}

/// Minimal view of a created thread; only the id is needed for auditing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedThread {
    #[serde(default)]
    pub id: Option<String>,
}

/// `POST /threads`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateThreadResponse {
    #[serde(default)]
    pub thread: Option<CreatedThread>,
}

/// One hit from `GET /api/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchMatch {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
}

impl SearchMatch {
    /// `<title or id> — <snippet>`
    pub fn display_line(&self) -> String {
        let name = if self.title.trim().is_empty() {
            self.id.as_str()
        } else {
            self.title.as_str()
        };
        format!("{name} — {}", self.snippet)
    }
}

/// `GET /api/search`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub matches: Vec<SearchMatch>,
}

/// Generic `{ status, job_id, message }` reply used by the configuration triggers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

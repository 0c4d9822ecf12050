//! Audit lines for completed or failed actions.
//!
//! Shared by the TUI reducer and the CLI so both describe outcomes the same
//! way.

use crate::api::{ApiError, ApiResult};
use crate::model::{CreateThreadResponse, SearchResponse, SourceResponse, StatusResponse};

pub const SOURCE_LOOKUP_FAILED: &str = "Source lookup failed.";
pub const SOURCE_UNKNOWN: &str = "Source: unknown";
pub const NO_MATCHES: &str = "No matches.";
pub const SEARCH_FAILED: &str = "Search failed.";

pub fn thread_created(result: &ApiResult<CreateThreadResponse>) -> String {
    match result {
        Ok(response) => {
            let id = response
                .thread
                .as_ref()
                .and_then(|t| t.id.as_deref())
                .unwrap_or("?");
            format!("Thread created: {id}")
        }
        Err(e) => format!("Create thread failed: {e}"),
    }
}

pub fn thread_archived(thread_id: &str, archive: bool, result: &ApiResult<()>) -> String {
    match result {
        Ok(()) if archive => format!("Archived thread {thread_id}"),
        Ok(()) => format!("Restored thread {thread_id}"),
        Err(e) => format!("Archive failed: {e}"),
    }
}

pub fn message_sent(thread_id: &str, result: &ApiResult<()>) -> String {
    match result {
        Ok(()) => format!("Message appended to {thread_id}"),
        Err(e) => format!("Message failed: {e}"),
    }
}

pub fn threads_refresh_failed(error: &ApiError) -> String {
    format!("Thread refresh failed: {error}")
}

/// Audit line for a search. `None` when a successful search found nothing,
/// which is shown in the results pane only.
pub fn search(result: &ApiResult<SearchResponse>) -> Option<String> {
    match result {
        Ok(response) if response.matches.is_empty() => None,
        Ok(response) => Some(format!(
            "Search returned {} matches.",
            response.matches.len()
        )),
        Err(e) => Some(format!("Search failed: {e}")),
    }
}

/// Lines for the search results pane.
pub fn search_results(result: &ApiResult<SearchResponse>) -> Vec<String> {
    match result {
        Ok(response) if response.matches.is_empty() => vec![NO_MATCHES.to_string()],
        Ok(response) => response.matches.iter().map(|m| m.display_line()).collect(),
        Err(_) => vec![SEARCH_FAILED.to_string()],
    }
}

/// `(label, audit)` for an active-source lookup.
pub fn source_refreshed(result: &ApiResult<SourceResponse>) -> (String, String) {
    match result {
        Ok(response) => (
            response
                .label()
                .unwrap_or_else(|| SOURCE_UNKNOWN.to_string()),
            "Source info refreshed.".to_string(),
        ),
        Err(e) => (
            SOURCE_LOOKUP_FAILED.to_string(),
            format!("Source refresh failed: {e}"),
        ),
    }
}

pub fn source_set(result: &ApiResult<StatusResponse>) -> String {
    match result {
        Ok(response) => format!(
            "Set source: {}",
            response.status.as_deref().unwrap_or("ok")
        ),
        Err(e) => format!("Set source failed: {e}"),
    }
}

pub fn ingest_queued(result: &ApiResult<StatusResponse>) -> String {
    match result {
        Ok(response) => format!(
            "Ingest queued: {}",
            response
                .job_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .unwrap_or("n/a")
        ),
        Err(e) => format!("Ingest failed: {e}"),
    }
}

pub fn hotswapped(result: &ApiResult<StatusResponse>) -> String {
    match result {
        Ok(_) => "Hotswap completed.".to_string(),
        Err(e) => format!("Hotswap failed: {e}"),
    }
}

pub fn preset_applied(result: &ApiResult<StatusResponse>) -> String {
    match result {
        Ok(response) => response
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "Preset applied.".to_string()),
        Err(e) => format!("Preset failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreatedThread, SearchMatch};

    fn server_error(reason: &str) -> ApiError {
        ApiError::request_failed(500, reason)
    }

    #[test]
    fn test_thread_created_falls_back_to_question_mark() {
        let ok = Ok(CreateThreadResponse {
            thread: Some(CreatedThread {
                id: Some("t7".to_string()),
            }),
        });
        assert_eq!(thread_created(&ok), "Thread created: t7");
        assert_eq!(
            thread_created(&Ok(CreateThreadResponse::default())),
            "Thread created: ?"
        );
        assert_eq!(
            thread_created(&Err(server_error("boom"))),
            "Create thread failed: boom"
        );
    }

    #[test]
    fn test_archive_lines() {
        assert_eq!(thread_archived("t1", true, &Ok(())), "Archived thread t1");
        assert_eq!(thread_archived("t1", false, &Ok(())), "Restored thread t1");
        assert_eq!(
            thread_archived("t1", true, &Err(server_error("Thread not found"))),
            "Archive failed: Thread not found"
        );
    }

    #[test]
    fn test_search_lines() {
        let empty = Ok(SearchResponse::default());
        assert_eq!(search(&empty), None);
        assert_eq!(search_results(&empty), vec!["No matches."]);

        let hits = Ok(SearchResponse {
            matches: vec![SearchMatch {
                id: "t1".to_string(),
                title: "Budget".to_string(),
                snippet: "q3".to_string(),
            }],
        });
        assert_eq!(search(&hits).as_deref(), Some("Search returned 1 matches."));
        assert_eq!(search_results(&hits), vec!["Budget — q3"]);

        let failed = Err(ApiError::transport("Connection failed"));
        assert_eq!(search_results(&failed), vec!["Search failed."]);
        assert_eq!(
            search(&failed).as_deref(),
            Some("Search failed: Connection failed")
        );
    }

    #[test]
    fn test_source_lines() {
        let (label, audit) = source_refreshed(&Err(server_error("down")));
        assert_eq!(label, "Source lookup failed.");
        assert_eq!(audit, "Source refresh failed: down");
    }

    #[test]
    fn test_trigger_lines() {
        let status = |status: Option<&str>, job: Option<&str>, message: Option<&str>| {
            Ok(StatusResponse {
                status: status.map(str::to_string),
                job_id: job.map(str::to_string),
                message: message.map(str::to_string),
            })
        };

        assert_eq!(source_set(&status(Some("ok"), None, None)), "Set source: ok");
        assert_eq!(ingest_queued(&status(None, Some("j-42"), None)), "Ingest queued: j-42");
        assert_eq!(ingest_queued(&status(None, None, None)), "Ingest queued: n/a");
        assert_eq!(hotswapped(&status(None, None, None)), "Hotswap completed.");
        assert_eq!(preset_applied(&status(None, None, None)), "Preset applied.");
        assert_eq!(
            preset_applied(&status(None, None, Some("Preset fast loaded"))),
            "Preset fast loaded"
        );
        assert_eq!(
            preset_applied(&Err(server_error("unknown preset"))),
            "Preset failed: unknown preset"
        );
    }
}

//! Events consumed by the reducer.
//!
//! Terminal input and ticks come from the event loop. Everything else is the
//! result of an effect, delivered through the runtime inbox.

use crossterm::event::Event;
use tview_core::api::ApiResult;
use tview_core::export::ExportReport;
use tview_core::model::{
    CreateThreadResponse, SearchResponse, SourceResponse, StatusResponse, Thread,
};
use tview_core::store::FetchId;

#[derive(Debug)]
pub enum UiEvent {
    Terminal(Event),
    Tick,

    ThreadsLoaded {
        fetch: FetchId,
        result: ApiResult<Vec<Thread>>,
    },
    SourceLoaded(ApiResult<SourceResponse>),

    ThreadCreated(ApiResult<CreateThreadResponse>),
    ThreadArchived {
        thread_id: String,
        archive: bool,
        result: ApiResult<()>,
    },
    MessageSent {
        thread_id: String,
        result: ApiResult<()>,
    },
    SearchCompleted(ApiResult<SearchResponse>),
    ExportFinished(ExportReport),

    SourceSet(ApiResult<StatusResponse>),
    IngestQueued(ApiResult<StatusResponse>),
    Hotswapped(ApiResult<StatusResponse>),
    PresetApplied(ApiResult<StatusResponse>),

    /// Free-form line for the audit log (non-JSON notices, browser failures).
    Notice(String),
}

//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They cover network calls and opening the browser; the reducer itself
//! never performs I/O.

use tview_core::model::NewThread;
use tview_core::store::FetchId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Re-fetch the thread snapshot, tagged for the stale-response guard.
    FetchThreads { fetch: FetchId },

    /// Re-fetch the active source label.
    FetchSource,

    CreateThread { request: NewThread },

    ArchiveThread { thread_id: String, archive: bool },

    /// Append a prompt. Only emitted for non-blank prompts.
    SendMessage { thread_id: String, prompt: String },

    Search { query: String },

    /// Run the PDF export protocol.
    Export { thread_id: String, title: String },

    /// Open the printable view for a thread in the system browser.
    OpenPrintView { thread_id: String },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },

    SetSource { path: String, force: bool },

    Ingest {
        path: String,
        client_slug: String,
        dest: String,
    },

    Hotswap { client_slug: String },

    ApplyPreset { preset: String },
}

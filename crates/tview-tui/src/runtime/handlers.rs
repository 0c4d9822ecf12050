//! Effect handlers.
//!
//! Each handler is a plain async function that performs one request and
//! wraps the result in a `UiEvent`. The runtime spawns them and forwards
//! the event to the inbox.

use std::path::PathBuf;

use tview_core::api::ApiClient;
use tview_core::export::ExportNegotiator;
use tview_core::model::NewThread;
use tview_core::store::FetchId;

use crate::events::UiEvent;

pub async fn fetch_threads(client: ApiClient, fetch: FetchId) -> UiEvent {
    UiEvent::ThreadsLoaded {
        fetch,
        result: client.list_threads().await,
    }
}

pub async fn fetch_source(client: ApiClient) -> UiEvent {
    UiEvent::SourceLoaded(client.active_source().await)
}

pub async fn create_thread(client: ApiClient, request: NewThread) -> UiEvent {
    UiEvent::ThreadCreated(client.create_thread(&request).await)
}

pub async fn archive_thread(client: ApiClient, thread_id: String, archive: bool) -> UiEvent {
    let result = client.archive_thread(&thread_id, archive).await;
    UiEvent::ThreadArchived {
        thread_id,
        archive,
        result,
    }
}

pub async fn send_message(client: ApiClient, thread_id: String, prompt: String) -> UiEvent {
    let result = client.send_message(&thread_id, &prompt).await;
    UiEvent::MessageSent { thread_id, result }
}

pub async fn search(client: ApiClient, query: String) -> UiEvent {
    UiEvent::SearchCompleted(client.search(&query).await)
}

/// Runs the export protocol. Never fails; the report carries the outcome.
pub async fn export(
    client: ApiClient,
    download_dir: PathBuf,
    thread_id: String,
    title: String,
) -> UiEvent {
    let report = ExportNegotiator::new(&client, download_dir)
        .export(&thread_id, &title)
        .await;
    UiEvent::ExportFinished(report)
}

pub async fn set_source(client: ApiClient, path: String, force: bool) -> UiEvent {
    UiEvent::SourceSet(client.set_source(&path, force).await)
}

pub async fn ingest(client: ApiClient, path: String, client_slug: String, dest: String) -> UiEvent {
    UiEvent::IngestQueued(client.ingest(&path, &client_slug, &dest).await)
}

pub async fn hotswap(client: ApiClient, client_slug: String) -> UiEvent {
    UiEvent::Hotswapped(client.hotswap(&client_slug).await)
}

pub async fn apply_preset(client: ApiClient, preset: String) -> UiEvent {
    UiEvent::PresetApplied(client.apply_preset(&preset).await)
}

//! Server-side job triggers: ingest, hotswap and presets.

use anyhow::Result;
use tview_core::api::ApiClient;
use tview_core::report;

use super::finish;

pub async fn ingest(client: &ApiClient, path: &str, client_slug: &str, dest: &str) -> Result<()> {
    let result = client.ingest(path, client_slug, dest).await;
    finish(&result, report::ingest_queued(&result))
}

pub async fn hotswap(client: &ApiClient, client_slug: &str) -> Result<()> {
    let result = client.hotswap(client_slug).await;
    finish(&result, report::hotswapped(&result))
}

pub async fn preset(client: &ApiClient, name: &str) -> Result<()> {
    let result = client.apply_preset(name).await;
    finish(&result, report::preset_applied(&result))
}

//! Source command handlers.

use anyhow::{Result, bail};
use tview_core::api::ApiClient;
use tview_core::report;

use super::finish;

pub async fn show(client: &ApiClient) -> Result<()> {
    let result = client.active_source().await;
    let (label, audit) = report::source_refreshed(&result);
    if result.is_err() {
        bail!(audit);
    }
    println!("{label}");
    Ok(())
}

pub async fn set(client: &ApiClient, path: &str, force: bool) -> Result<()> {
    let result = client.set_source(path, force).await;
    finish(&result, report::source_set(&result))
}

//! Export and print command handlers.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tview_core::api::ApiClient;
use tview_core::export::{ExportNegotiator, ExportOutcome};

use super::open_browser;

pub async fn run(
    client: &ApiClient,
    download_dir: &Path,
    id: &str,
    title: Option<String>,
    open: bool,
) -> Result<()> {
    let title = match title {
        Some(title) => title,
        None => thread_title(client, id).await,
    };

    let report = ExportNegotiator::new(client, download_dir)
        .export(id, &title)
        .await;

    match &report.outcome {
        ExportOutcome::Downloaded { path } => println!("Saved {}", path.display()),
        ExportOutcome::PrintFallback { url, .. } => {
            println!("Print view: {url}");
            if open {
                open_browser(url.as_str());
            }
        }
        ExportOutcome::Failed { .. } => {}
    }

    if report.is_failure() {
        bail!(report.audit);
    }
    println!("{}", report.audit);
    Ok(())
}

pub fn print(client: &ApiClient, id: &str, open: bool) -> Result<()> {
    let url = client.print_url(id).context("build print url")?;
    println!("Opening print view for {id}");
    println!("{url}");
    if open {
        open_browser(url.as_str());
    }
    Ok(())
}

/// Title of `id` from the current snapshot, or empty when it can't be found.
async fn thread_title(client: &ApiClient, id: &str) -> String {
    match client.list_threads().await {
        Ok(threads) => threads
            .into_iter()
            .find(|t| t.id == id)
            .map(|t| t.title)
            .unwrap_or_default(),
        Err(e) => {
            tracing::warn!(thread_id = id, error = %e, "title lookup failed");
            String::new()
        }
    }
}

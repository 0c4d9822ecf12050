//! Search command handler.

use anyhow::{Result, bail};
use tview_core::api::ApiClient;
use tview_core::report;

pub async fn run(client: &ApiClient, query: &str) -> Result<()> {
    let result = client.search(query).await;
    let audit = report::search(&result);
    if result.is_err() {
        bail!(audit.unwrap_or_else(|| report::SEARCH_FAILED.to_string()));
    }

    for line in report::search_results(&result) {
        println!("{line}");
    }
    if let Some(audit) = audit {
        println!("{audit}");
    }
    Ok(())
}

//! CLI command handlers.

pub mod config;
pub mod export;
pub mod jobs;
pub mod search;
pub mod source;
pub mod threads;
pub mod tui;

use anyhow::{Result, anyhow};
use tview_core::api::ApiResult;

/// Prints the audit line on success. On failure the line becomes the error,
/// so the process exits non-zero with the reason.
fn finish<T>(result: &ApiResult<T>, audit: String) -> Result<()> {
    match result {
        Ok(_) => {
            println!("{audit}");
            Ok(())
        }
        Err(_) => Err(anyhow!(audit)),
    }
}

fn open_browser(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(url, error = %e, "failed to open browser");
        eprintln!("Could not open browser: {e}");
    }
}

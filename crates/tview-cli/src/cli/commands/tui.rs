//! Interactive viewer (default command).

use anyhow::Result;
use tview_core::config::Config;
use url::Url;

#[cfg(feature = "tui")]
pub async fn run(config: &Config, server: Url) -> Result<()> {
    tview_tui::run(config, server).await
}

#[cfg(not(feature = "tui"))]
pub async fn run(_config: &Config, _server: Url) -> Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}

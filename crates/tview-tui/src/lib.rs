//! Full-screen thread viewer.

pub mod common;
pub mod effects;
pub mod events;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stderr, stdout};

use anyhow::Result;
pub use runtime::TuiRuntime;
use tview_core::config::Config;
use url::Url;

/// Runs the interactive viewer against `server`.
pub async fn run(config: &Config, server: Url) -> Result<()> {
    if !stdout().is_terminal() || !stderr().is_terminal() {
        anyhow::bail!(
            "The viewer requires a terminal.\n\
             Use `tview threads list` for non-interactive output."
        );
    }

    tracing::info!(server = %server, "starting TUI");
    let mut runtime = TuiRuntime::new(config, server)?;
    runtime.run()
}

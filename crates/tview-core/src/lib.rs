//! Core of the tview thread client.
//!
//! Everything here is terminal-agnostic: wire schemas, the HTTP client, the
//! snapshot store, reconciliation into a view model and the export protocol.

pub mod api;
pub mod audit;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod report;
pub mod store;
pub mod view;

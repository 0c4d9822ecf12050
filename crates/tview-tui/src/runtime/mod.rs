//! TUI runtime - owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and returns
//! effects; async handlers send their result events to the inbox, which the
//! loop drains every frame.

mod handlers;

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use tokio::sync::mpsc;
use tview_core::api::ApiClient;
use tview_core::config::Config;
use url::Url;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::AppState;
use crate::terminal::{self, Tty};
use crate::{render, update};

/// Poll duration when idle.
pub const IDLE_POLL_DURATION: Duration = Duration::from_millis(100);

pub struct TuiRuntime {
    terminal: Tty,
    pub state: AppState,
    client: ApiClient,
    download_dir: PathBuf,
    inbox_tx: mpsc::UnboundedSender<UiEvent>,
    inbox_rx: mpsc::UnboundedReceiver<UiEvent>,
    last_tick: Instant,
}

impl TuiRuntime {
    /// Creates the runtime and enters the alternate screen.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new(config: &Config, server: Url) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal().context("Failed to setup terminal")?;

        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        // Non-JSON notices from the client land in the audit log.
        let (notice_tx, mut notice_rx) = mpsc::unbounded_channel::<String>();
        let forward = inbox_tx.clone();
        tokio::spawn(async move {
            while let Some(notice) = notice_rx.recv().await {
                if forward.send(UiEvent::Notice(notice)).is_err() {
                    break;
                }
            }
        });

        let state = AppState::new(config, &server);
        let client = ApiClient::new(server).with_notices(notice_tx);

        Ok(Self {
            terminal,
            state,
            client,
            download_dir: config.download_dir(),
            inbox_tx,
            inbox_rx,
            last_tick: Instant::now(),
        })
    }

    /// Runs the main event loop until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let effects = update::init(&mut self.state);
        self.execute_effects(effects);

        while !self.state.tui.should_quit {
            let events = self.collect_events()?;
            for event in events {
                let effects = update::update(&mut self.state, event);
                self.execute_effects(effects);
            }

            self.terminal.draw(|frame| {
                render::render(&self.state, frame);
            })?;
        }

        tracing::info!("TUI exited");
        Ok(())
    }

    /// Drains the inbox, then waits for terminal input until the next tick.
    fn collect_events(&mut self) -> Result<Vec<UiEvent>> {
        let mut events = Vec::new();
        while let Ok(ev) = self.inbox_rx.try_recv() {
            events.push(ev);
        }

        let poll_duration = if events.is_empty() {
            IDLE_POLL_DURATION.saturating_sub(self.last_tick.elapsed())
        } else {
            Duration::ZERO
        };

        if event::poll(poll_duration)? {
            events.push(UiEvent::Terminal(event::read()?));
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }
        }

        if self.last_tick.elapsed() >= IDLE_POLL_DURATION {
            events.push(UiEvent::Tick);
            self.last_tick = Instant::now();
        }

        Ok(events)
    }

    fn execute_effects(&mut self, effects: Vec<UiEffect>) {
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    /// Spawns a handler and sends its result event to the inbox.
    fn spawn_effect<F, Fut>(&self, f: F)
    where
        F: FnOnce(ApiClient) -> Fut + Send + 'static,
        Fut: Future<Output = UiEvent> + Send + 'static,
    {
        let tx = self.inbox_tx.clone();
        let client = self.client.clone();
        tokio::spawn(async move {
            let _ = tx.send(f(client).await);
        });
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        tracing::debug!(?effect, "executing effect");
        match effect {
            UiEffect::Quit => {
                self.state.tui.should_quit = true;
            }
            UiEffect::OpenBrowser { url } => self.open_in_browser(&url),
            UiEffect::OpenPrintView { thread_id } => match self.client.print_url(&thread_id) {
                Ok(url) => self.open_in_browser(url.as_str()),
                Err(e) => {
                    let _ = self.inbox_tx.send(UiEvent::Notice(e.to_string()));
                }
            },

            UiEffect::FetchThreads { fetch } => {
                self.spawn_effect(move |client| handlers::fetch_threads(client, fetch));
            }
            UiEffect::FetchSource => self.spawn_effect(handlers::fetch_source),
            UiEffect::CreateThread { request } => {
                self.spawn_effect(move |client| handlers::create_thread(client, request));
            }
            UiEffect::ArchiveThread { thread_id, archive } => {
                self.spawn_effect(move |client| handlers::archive_thread(client, thread_id, archive));
            }
            UiEffect::SendMessage { thread_id, prompt } => {
                self.spawn_effect(move |client| handlers::send_message(client, thread_id, prompt));
            }
            UiEffect::Search { query } => {
                self.spawn_effect(move |client| handlers::search(client, query));
            }
            UiEffect::Export { thread_id, title } => {
                let dir = self.download_dir.clone();
                self.spawn_effect(move |client| handlers::export(client, dir, thread_id, title));
            }
            UiEffect::SetSource { path, force } => {
                self.spawn_effect(move |client| handlers::set_source(client, path, force));
            }
            UiEffect::Ingest {
                path,
                client_slug,
                dest,
            } => {
                self.spawn_effect(move |client| handlers::ingest(client, path, client_slug, dest));
            }
            UiEffect::Hotswap { client_slug } => {
                self.spawn_effect(move |client| handlers::hotswap(client, client_slug));
            }
            UiEffect::ApplyPreset { preset } => {
                self.spawn_effect(move |client| handlers::apply_preset(client, preset));
            }
        }
    }

    fn open_in_browser(&self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!(url, error = %e, "failed to open browser");
            let _ = self
                .inbox_tx
                .send(UiEvent::Notice(format!("Could not open {url}: {e}")));
        }
    }
}

impl Drop for TuiRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}

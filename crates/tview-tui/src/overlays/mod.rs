//! Modal overlays.
//!
//! While an overlay is open it receives every key. Each overlay owns its
//! state, key handler and render function.
//!
//! - `form.rs`: single-purpose forms (new thread, search, source and ingest triggers)
//! - `composer.rs`: reply composer for the expanded thread
//! - `render_utils.rs`: shared drawing helpers

pub mod composer;
pub mod form;
pub mod render_utils;

pub use composer::ComposerState;
use crossterm::event::KeyEvent;
pub use form::{FormKind, FormState};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;

#[derive(Debug, Clone)]
pub enum Overlay {
    Form(FormState),
    Composer(ComposerState),
}

impl Overlay {
    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Form(form) => form.handle_key(key),
            Overlay::Composer(composer) => composer.handle_key(key),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::Form(form) => form.render(frame, area),
            Overlay::Composer(composer) => composer.render(frame, area),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Result of an overlay key handler.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    pub fn stay() -> Self {
        Self {
            transition: OverlayTransition::Stay,
            effects: Vec::new(),
        }
    }

    pub fn close() -> Self {
        Self {
            transition: OverlayTransition::Close,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: UiEffect) -> Self {
        self.effects.push(effect);
        self
    }
}

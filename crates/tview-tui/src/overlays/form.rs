//! Single-purpose forms for the global actions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tview_core::model::NewThread;

use super::OverlayUpdate;
use super::render_utils::{InputHint, OverlayConfig, input_line, render_overlay, status_line};
use crate::effects::UiEffect;
use crate::state::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    CreateThread,
    Search,
    SetSource,
    Ingest,
    Hotswap,
    Preset,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            FormKind::CreateThread => "New Thread",
            FormKind::Search => "Search",
            FormKind::SetSource => "Set Source",
            FormKind::Ingest => "Ingest",
            FormKind::Hotswap => "Hotswap Client",
            FormKind::Preset => "Apply Preset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Toggle(bool),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
    pub required: bool,
}

impl Field {
    fn text(label: &'static str, value: &str, required: bool) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.to_string()),
            required,
        }
    }

    fn toggle(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Toggle(false),
            required: false,
        }
    }

    fn text_value(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Toggle(_) => "",
        }
    }

    fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Toggle(on) => if *on { "[x]" } else { "[ ]" }.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    pub error: Option<String>,
}

impl FormState {
    /// Opens a form, pre-filling client and source tags from settings.
    pub fn open(kind: FormKind, settings: &Settings) -> Self {
        let fields = match kind {
            FormKind::CreateThread => vec![
                Field::text("Title", "", false),
                Field::text("Client", &settings.client_slug, false),
                Field::text("Source", &settings.source_slug, false),
            ],
            FormKind::Search => vec![Field::text("Query", "", false)],
            FormKind::SetSource => vec![Field::text("Path", "", true), Field::toggle("Force")],
            FormKind::Ingest => vec![
                Field::text("Path", "", true),
                Field::text("Client", &settings.client_slug, true),
                Field::text("Dest", "", false),
            ],
            FormKind::Hotswap => vec![Field::text("Client", &settings.client_slug, true)],
            FormKind::Preset => vec![Field::text("Preset", "", true)],
        };
        Self {
            kind,
            fields,
            focus: 0,
            error: None,
        }
    }

    fn value(&self, idx: usize) -> String {
        self.fields
            .get(idx)
            .map(|f| f.text_value().trim().to_string())
            .unwrap_or_default()
    }

    fn flag(&self, idx: usize) -> bool {
        matches!(
            self.fields.get(idx).map(|f| &f.value),
            Some(FieldValue::Toggle(true))
        )
    }

    /// Validates required fields and builds the effect for this form.
    pub fn submit(&self) -> Result<UiEffect, String> {
        if let Some(missing) = self
            .fields
            .iter()
            .find(|f| f.required && f.text_value().trim().is_empty())
        {
            return Err(format!("{} is required", missing.label));
        }

        Ok(match self.kind {
            FormKind::CreateThread => UiEffect::CreateThread {
                request: NewThread {
                    title: self.value(0),
                    client_slug: self.value(1),
                    source_slug: self.value(2),
                },
            },
            FormKind::Search => UiEffect::Search {
                query: self.value(0),
            },
            FormKind::SetSource => UiEffect::SetSource {
                path: self.value(0),
                force: self.flag(1),
            },
            FormKind::Ingest => UiEffect::Ingest {
                path: self.value(0),
                client_slug: self.value(1),
                dest: self.value(2),
            },
            FormKind::Hotswap => UiEffect::Hotswap {
                client_slug: self.value(0),
            },
            FormKind::Preset => UiEffect::ApplyPreset {
                preset: self.value(0),
            },
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Enter) {
            self.error = None;
        }

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Enter => match self.submit() {
                Ok(effect) => OverlayUpdate::close().with_effect(effect),
                Err(error) => {
                    self.error = Some(error);
                    OverlayUpdate::stay()
                }
            },
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len().max(1);
                OverlayUpdate::stay()
            }
            KeyCode::BackTab | KeyCode::Up => {
                let len = self.fields.len().max(1);
                self.focus = (self.focus + len - 1) % len;
                OverlayUpdate::stay()
            }
            code => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    match (&mut field.value, code) {
                        (FieldValue::Text(s), KeyCode::Backspace) => {
                            s.pop();
                        }
                        (FieldValue::Text(s), KeyCode::Char(c)) if !ctrl => s.push(c),
                        (FieldValue::Toggle(on), KeyCode::Char(' ')) => *on = !*on,
                        _ => {}
                    }
                }
                OverlayUpdate::stay()
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let hints = [
            InputHint::new("Enter", "submit"),
            InputHint::new("Tab", "next field"),
            InputHint::new("Esc", "cancel"),
        ];
        let height = self.fields.len() as u16 + 5;
        let layout = render_overlay(
            frame,
            area,
            &OverlayConfig {
                title: self.kind.title(),
                border_color: Color::Cyan,
                width: 60,
                height,
                hints: &hints,
            },
        );

        let mut lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| input_line(f.label, &f.display(), i == self.focus, layout.body.width))
            .collect();
        lines.push(Line::default());
        lines.push(status_line(
            self.error.as_deref(),
            "Space toggles checkboxes",
        ));
        frame.render_widget(Paragraph::new(lines), layout.body);
    }
}

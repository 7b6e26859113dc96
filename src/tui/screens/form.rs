//! Form screen: field editing on the left, live JSON preview on the right.
//!
//! Edits are debounced twice over: the preview rebuilds shortly after the
//! last keystroke, and the draft autosaves a little later. Line items are
//! tracked by id, so removing or reordering lines never moves the cursor
//! onto a different row than the one the user was editing.

use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::client::Transport;
use crate::driver;
use crate::form::{FormState, LineItems};
use crate::pages::PageSpec;
use crate::payload::BuildContext;
use crate::preview::{self, TokenKind};
use crate::schema::InputType;
use crate::storage::Storage;

const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(300);
const AUTOSAVE_DEBOUNCE: Duration = Duration::from_secs(2);

/// Which input slot the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Base(usize),
    /// A line field, addressed by the line's id rather than its position.
    Item { id: u64, field: usize },
}

pub struct FormScreen {
    spec: &'static PageSpec,
    /// Active preset: embedded by default, refreshed from the backend for
    /// pages that expose a preset endpoint.
    preset: serde_json::Value,
    base: std::collections::BTreeMap<String, String>,
    items: LineItems,
    focus: Focus,
    preview_lines: Vec<String>,
    preview_scroll: u16,
    preview_due: Option<Instant>,
    autosave_due: Option<Instant>,
    status: String,
}

impl FormScreen {
    /// Opens the page, restoring its autosaved draft if one exists.
    pub fn new(spec: &'static PageSpec, storage: &Storage) -> Self {
        let draft = storage.load_draft(spec.name).unwrap_or_else(|e| {
            log::warn!("could not load draft for {}: {e}", spec.name);
            None
        });

        let (base, items) = match draft {
            Some(state) => {
                let items = state.restore_items(spec.min_items, spec.max_items);
                (state.base, items)
            }
            None => {
                let mut base = std::collections::BTreeMap::new();
                for field in spec.base_fields {
                    if !field.default.is_empty() {
                        base.insert(field.key.to_string(), field.default.to_string());
                    }
                }
                (base, LineItems::new(spec.min_items, spec.max_items))
            }
        };

        let focus = if spec.base_fields.is_empty() {
            items
                .get(0)
                .map_or(Focus::Base(0), |item| Focus::Item { id: item.id, field: 0 })
        } else {
            Focus::Base(0)
        };

        let mut screen = Self {
            spec,
            preset: (spec.preset)(),
            base,
            items,
            focus,
            preview_lines: Vec::new(),
            preview_scroll: 0,
            preview_due: None,
            autosave_due: None,
            status: String::new(),
        };
        screen.rebuild_preview();
        screen
    }

    pub fn state(&self) -> FormState {
        FormState::capture(&self.base, &self.items)
    }

    // ── Focus movement ──

    fn slots(&self) -> Vec<Focus> {
        let mut slots: Vec<Focus> = (0..self.spec.base_fields.len()).map(Focus::Base).collect();
        for item in self.items.iter() {
            for field in 0..self.spec.item_fields.len() {
                slots.push(Focus::Item { id: item.id, field });
            }
        }
        slots
    }

    fn slot_index(&self) -> usize {
        self.slots()
            .iter()
            .position(|slot| *slot == self.focus)
            .unwrap_or(0)
    }

    pub fn next_field(&mut self) {
        let slots = self.slots();
        if slots.is_empty() {
            return;
        }
        let index = (self.slot_index() + 1) % slots.len();
        self.focus = slots[index];
    }

    pub fn prev_field(&mut self) {
        let slots = self.slots();
        if slots.is_empty() {
            return;
        }
        let index = self.slot_index().checked_sub(1).unwrap_or(slots.len() - 1);
        self.focus = slots[index];
    }

    /// Index of the line the cursor is on, if any.
    fn focused_line(&self) -> Option<usize> {
        match self.focus {
            Focus::Base(_) => None,
            Focus::Item { id, .. } => self.items.position(id),
        }
    }

    // ── Editing ──

    fn focused_input(&self) -> Option<InputType> {
        match self.focus {
            Focus::Base(i) => self.spec.base_fields.get(i).map(|f| f.input),
            Focus::Item { field, .. } => self.spec.item_fields.get(field).map(|f| f.input),
        }
    }

    fn focused_value_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Base(i) => {
                let key = self.spec.base_fields.get(i)?.key;
                Some(self.base.entry(key.to_string()).or_default())
            }
            Focus::Item { id, field } => {
                let key = self.spec.item_fields.get(field)?.key;
                let index = self.items.position(id)?;
                let item = self.items.get_mut(index)?;
                Some(item.values.entry(key.to_string()).or_default())
            }
        }
    }

    fn focused_value(&self) -> &str {
        match self.focus {
            Focus::Base(i) => self
                .spec
                .base_fields
                .get(i)
                .map_or("", |f| self.base.get(f.key).map_or("", String::as_str)),
            Focus::Item { id, field } => {
                let Some(key) = self.spec.item_fields.get(field).map(|f| f.key) else {
                    return "";
                };
                self.items
                    .position(id)
                    .and_then(|index| self.items.get(index))
                    .and_then(|item| item.values.get(key))
                    .map_or("", String::as_str)
            }
        }
    }

    pub fn on_char(&mut self, c: char) {
        // Space on a select field cycles its options instead of typing.
        if let Some(InputType::Select { options }) = self.focused_input() {
            if c == ' ' {
                let current = self.focused_value().to_string();
                let next = options
                    .iter()
                    .position(|(v, _)| *v == current)
                    .map_or(0, |i| (i + 1) % options.len());
                if let Some(value) = self.focused_value_mut() {
                    *value = options[next].0.to_string();
                }
                self.mark_dirty();
                return;
            }
        }
        if let Some(value) = self.focused_value_mut() {
            value.push(c);
            self.mark_dirty();
        }
    }

    pub fn on_backspace(&mut self) {
        if let Some(value) = self.focused_value_mut() {
            if value.pop().is_some() {
                self.mark_dirty();
            }
        }
    }

    // ── Line items ──

    pub fn add_line(&mut self) {
        let at = self.focused_line().unwrap_or(self.items.len().saturating_sub(1));
        match self.items.add_after(at) {
            Ok(id) => {
                self.focus = Focus::Item { id, field: 0 };
                self.mark_dirty();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn copy_line(&mut self) {
        let Some(at) = self.focused_line() else {
            return;
        };
        match self.items.copy(at) {
            Ok(id) => {
                self.focus = Focus::Item { id, field: 0 };
                self.mark_dirty();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    pub fn remove_line(&mut self) {
        let Some(at) = self.focused_line() else {
            return;
        };
        match self.items.remove(at) {
            Ok(()) => {
                let index = at.min(self.items.len().saturating_sub(1));
                if let Some(item) = self.items.get(index) {
                    self.focus = Focus::Item { id: item.id, field: 0 };
                }
                self.mark_dirty();
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    // ── Preview and autosave ──

    fn mark_dirty(&mut self) {
        let now = Instant::now();
        self.preview_due = Some(now + PREVIEW_DEBOUNCE);
        self.autosave_due = Some(now + AUTOSAVE_DEBOUNCE);
    }

    fn rebuild_preview(&mut self) {
        let ctx = BuildContext::capture();
        let text = preview::render_with(&self.preset, self.spec, &self.state(), &ctx);
        self.preview_lines = text.lines().map(String::from).collect();
    }

    /// Swaps in the backend's preset, if this page exposes one. A fetch
    /// failure keeps the embedded preset and is logged, never surfaced.
    pub fn refresh_preset(&mut self, transport: &dyn Transport) {
        let Some(path) = self.spec.preset_path else {
            return;
        };
        match transport.fetch_preset(path) {
            Ok(preset) => {
                self.preset = preset;
                self.rebuild_preview();
            }
            Err(e) => log::warn!("could not fetch preset for {}: {e}", self.spec.name),
        }
    }

    /// Fires whichever debounce deadlines have passed.
    pub fn on_tick(&mut self, storage: &Storage) {
        self.tick_at(storage, Instant::now());
    }

    fn tick_at(&mut self, storage: &Storage, now: Instant) {
        if self.preview_due.is_some_and(|due| now >= due) {
            self.preview_due = None;
            self.rebuild_preview();
        }
        if self.autosave_due.is_some_and(|due| now >= due) {
            self.autosave_due = None;
            self.save_draft(storage);
        }
    }

    pub fn save_draft(&mut self, storage: &Storage) {
        if let Err(e) = storage.save_draft(self.spec.name, &self.state()) {
            self.status = format!("autosave failed: {e}");
        }
    }

    // ── Submit ──

    pub fn submit(&mut self, storage: &Storage, transport: &dyn Transport) {
        // Flush the draft first so a crash mid-submit loses nothing.
        self.save_draft(storage);
        match driver::submit_with(&self.preset, self.spec, &self.state(), storage, transport) {
            Ok(reply) if reply.message.is_empty() => {
                self.status = "submitted".to_string();
            }
            Ok(reply) => self.status = format!("submitted: {}", reply.message),
            Err(e) => {
                if let driver::SubmitError::Validation(ref v) = e {
                    self.focus_error(v);
                }
                self.status = e.to_string();
            }
        }
        self.rebuild_preview();
    }

    /// Moves the cursor onto the input a validation failure points at.
    fn focus_error(&mut self, error: &driver::ValidationError) {
        match error.line {
            None => {
                if let Some(i) = self
                    .spec
                    .base_fields
                    .iter()
                    .position(|f| f.key == error.field)
                {
                    self.focus = Focus::Base(i);
                }
            }
            Some(line) => {
                let Some(field) = self
                    .spec
                    .item_fields
                    .iter()
                    .position(|f| f.key == error.field)
                else {
                    return;
                };
                let index = line.saturating_sub(self.spec.index_origin);
                if let Some(item) = self.items.get(index) {
                    self.focus = Focus::Item { id: item.id, field };
                }
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = u16::try_from(self.preview_lines.len().saturating_sub(1)).unwrap_or(u16::MAX);
        if self.preview_scroll < max {
            self.preview_scroll += 1;
        }
    }

    // ── Rendering ──

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::vertical([
            Constraint::Length(3), // title
            Constraint::Min(0),    // form + preview
            Constraint::Length(1), // help / status
        ])
        .split(area);

        let muted = Style::default().fg(Color::DarkGray);
        let normal = Style::default().fg(Color::Gray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        // Title.
        let title = Paragraph::new(Line::from(vec![
            Span::styled(self.spec.title, highlight),
            Span::styled(format!("  [{}]", self.spec.name), muted),
        ]))
        .block(Block::default().padding(Padding::new(2, 0, 1, 0)));
        frame.render_widget(title, chunks[0]);

        let panes = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(chunks[1]);

        // Form fields.
        let mut lines: Vec<Line> = Vec::new();
        for (i, field) in self.spec.base_fields.iter().enumerate() {
            let focused = self.focus == Focus::Base(i);
            lines.push(self.field_line(field.label, self.base.get(field.key), focused));
        }
        for (index, item) in self.items.iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!("  ── Line {} ──", self.spec.index_origin + index),
                muted,
            )));
            for (f, field) in self.spec.item_fields.iter().enumerate() {
                let focused = self.focus == Focus::Item { id: item.id, field: f };
                lines.push(self.field_line(field.label, item.values.get(field.key), focused));
            }
        }
        let form = Paragraph::new(lines)
            .block(Block::default().padding(Padding::new(2, 1, 0, 0)))
            .style(normal);
        frame.render_widget(form, panes[0]);

        // Preview.
        let preview_lines: Vec<Line> = self
            .preview_lines
            .iter()
            .map(|line| {
                let spans: Vec<Span> = preview::classify(line)
                    .into_iter()
                    .map(|(kind, text)| {
                        let style = match kind {
                            TokenKind::Key => Style::default().fg(Color::Cyan),
                            TokenKind::Str => Style::default().fg(Color::Green),
                            TokenKind::Num | TokenKind::Literal => {
                                Style::default().fg(Color::Magenta)
                            }
                            TokenKind::Punct => muted,
                        };
                        Span::styled(text, style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();
        let preview = Paragraph::new(preview_lines)
            .scroll((self.preview_scroll, 0))
            .block(
                Block::default()
                    .borders(Borders::LEFT)
                    .border_style(muted)
                    .padding(Padding::new(1, 1, 0, 0)),
            );
        frame.render_widget(preview, panes[1]);

        // Help / status line.
        let help = if self.status.is_empty() {
            " ↑↓ fields  ^N add line  ^D remove  ^Y copy  ^S submit  PgUp/PgDn preview  esc back"
                .to_string()
        } else {
            format!(" {}", self.status)
        };
        frame.render_widget(Paragraph::new(Line::from(Span::styled(help, muted))), chunks[2]);
    }

    fn field_line(&self, label: &str, value: Option<&String>, focused: bool) -> Line<'_> {
        let muted = Style::default().fg(Color::DarkGray);
        let highlight = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);
        let pointer = if focused { "› " } else { "  " };
        let style = if focused {
            highlight
        } else {
            Style::default().fg(Color::Gray)
        };

        let mut spans = vec![
            Span::styled(pointer.to_string(), style),
            Span::styled(format!("{label}: "), muted),
            Span::styled(value.cloned().unwrap_or_default(), style),
        ];
        if focused {
            spans.push(Span::styled("█", highlight));
        }
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::pages;

    fn storage(dir: &TempDir) -> Storage {
        Storage::new(dir.path()).unwrap()
    }

    /// Transport stub: posts succeed, preset fetches return a marked copy
    /// of the return-order-entry preset.
    struct StubTransport;

    impl Transport for StubTransport {
        fn post_json(
            &self,
            _path: &str,
            _body: &serde_json::Value,
        ) -> crate::client::Result<crate::client::BackendReply> {
            Ok(crate::client::BackendReply {
                ok: true,
                message: "ok".to_string(),
            })
        }

        fn post_form(
            &self,
            _path: &str,
            _fields: &[(String, String)],
        ) -> crate::client::Result<crate::client::BackendReply> {
            Ok(crate::client::BackendReply {
                ok: true,
                message: "ok".to_string(),
            })
        }

        fn fetch_preset(&self, _path: &str) -> crate::client::Result<serde_json::Value> {
            let page = pages::find("return-order-entry").unwrap();
            let mut preset = (page.preset)();
            preset["remarkFromServer"] = serde_json::Value::String("fetched".to_string());
            Ok(preset)
        }
    }

    fn type_str(screen: &mut FormScreen, s: &str) {
        for c in s.chars() {
            screen.on_char(c);
        }
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        type_str(&mut screen, "EO123");
        screen.on_backspace();
        assert_eq!(screen.state().base("entryOrderCode"), "EO12");
    }

    #[test]
    fn focus_walks_base_fields_then_lines_and_wraps() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        // 2 base fields + 2 item fields on one line.
        screen.next_field();
        screen.next_field();
        type_str(&mut screen, "SKU1");
        assert_eq!(screen.state().item(0, "itemCode"), "SKU1");

        screen.next_field();
        screen.next_field();
        type_str(&mut screen, "EO1");
        assert_eq!(screen.state().base("entryOrderCode"), "EO1");

        screen.prev_field();
        type_str(&mut screen, "9");
        assert_eq!(screen.state().item(0, "actualQty"), "9");
    }

    #[test]
    fn focus_follows_the_line_id_through_removal() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        // Move onto line 0, add a line (focus moves to it), type into it.
        screen.next_field();
        screen.next_field();
        screen.add_line();
        type_str(&mut screen, "SKU2");
        assert_eq!(screen.state().item(1, "itemCode"), "SKU2");

        // Removing the focused line moves focus to a surviving line.
        screen.remove_line();
        assert_eq!(screen.items.len(), 1);
        type_str(&mut screen, "X");
        assert_eq!(screen.state().item(0, "itemCode"), "X");
    }

    #[test]
    fn copy_line_duplicates_values() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        screen.next_field();
        screen.next_field();
        type_str(&mut screen, "SKU1");
        screen.copy_line();
        assert_eq!(screen.state().item(1, "itemCode"), "SKU1");
    }

    #[test]
    fn removing_the_last_line_reports_instead_of_removing() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        screen.next_field();
        screen.next_field();
        screen.remove_line();
        assert_eq!(screen.items.len(), 1);
        assert!(!screen.status.is_empty());
    }

    #[test]
    fn space_cycles_select_options() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("inventory-adjustment").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        // apiEnv is the fourth base field; defaults to "test".
        screen.next_field();
        screen.next_field();
        screen.next_field();
        assert_eq!(screen.state().base("apiEnv"), "test");
        screen.on_char(' ');
        assert_eq!(screen.state().base("apiEnv"), "uat");
        screen.on_char(' ');
        assert_eq!(screen.state().base("apiEnv"), "test");
    }

    #[test]
    fn debounce_rebuilds_preview_then_autosaves() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        type_str(&mut screen, "EO123");
        assert!(!screen.preview_lines.iter().any(|l| l.contains("EO123")));

        let now = Instant::now();
        screen.tick_at(&storage, now + PREVIEW_DEBOUNCE);
        assert!(screen.preview_lines.iter().any(|l| l.contains("EO123")));
        assert!(storage.load_draft(page.name).unwrap().is_none());

        screen.tick_at(&storage, now + AUTOSAVE_DEBOUNCE);
        let draft = storage.load_draft(page.name).unwrap().unwrap();
        assert_eq!(draft.base("entryOrderCode"), "EO123");
    }

    #[test]
    fn refresh_preset_swaps_in_the_fetched_document() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("return-order-entry").unwrap();
        let mut screen = FormScreen::new(page, &storage);
        assert!(!screen.preview_lines.iter().any(|l| l.contains("remarkFromServer")));

        screen.refresh_preset(&StubTransport);
        assert!(screen.preview_lines.iter().any(|l| l.contains("remarkFromServer")));

        // Pages without a preset endpoint keep their embedded preset.
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);
        let before = screen.preview_lines.clone();
        screen.refresh_preset(&StubTransport);
        assert_eq!(screen.preview_lines, before);
    }

    #[test]
    fn failed_validation_moves_focus_to_the_offending_input() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();
        let mut screen = FormScreen::new(page, &storage);

        // Fill everything except line 0's quantity, then park the cursor
        // back on the first base field.
        type_str(&mut screen, "EO1");
        screen.next_field();
        type_str(&mut screen, "W1");
        screen.next_field();
        type_str(&mut screen, "SKU1");
        screen.next_field();
        screen.next_field();
        assert_eq!(screen.focus, Focus::Base(0));

        screen.submit(&storage, &StubTransport);
        let id = screen.items.get(0).unwrap().id;
        assert_eq!(screen.focus, Focus::Item { id, field: 1 });
        assert!(screen.status.contains("Actual Qty"));

        // A base-field failure points back at the base field. Fresh storage
        // so the draft the submit above flushed is not restored.
        let dir = TempDir::new().unwrap();
        let storage = self::storage(&dir);
        let mut screen = FormScreen::new(page, &storage);
        screen.next_field();
        type_str(&mut screen, "W1");
        screen.submit(&storage, &StubTransport);
        assert_eq!(screen.focus, Focus::Base(0));
        assert!(screen.status.contains("Entry Order Code"));
    }

    #[test]
    fn draft_restores_on_reopen() {
        let dir = TempDir::new().unwrap();
        let storage = storage(&dir);
        let page = pages::find("allocation-in").unwrap();

        let mut screen = FormScreen::new(page, &storage);
        type_str(&mut screen, "EO77");
        screen.save_draft(&storage);

        let reopened = FormScreen::new(page, &storage);
        assert_eq!(reopened.state().base("entryOrderCode"), "EO77");
    }
}

use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use crate::components::{Component, ComponentContext};
use crate::ui::{UiFrame, rect_contains};

/// Single-line editable field.
///
/// Enter and Tab are left unhandled so the owner can submit or move focus.
#[derive(Debug, Default, Clone)]
pub struct TextInputComponent {
    value: String,
    // cursor as a char index
    cursor: usize,
    masked: bool,
    placeholder: String,
    area: Rect,
}

impl TextInputComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every character as `*`.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the last rendered field contains this cell.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        rect_contains(self.area, column, row)
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }
}

impl Component for TextInputComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let palette = ctx.palette();
        let style = palette.entry(ctx.focused());
        let row = Rect { height: 1, ..area };
        frame.fill(row, style);

        let width = area.width as usize;
        let shown: Vec<char> = if self.masked {
            std::iter::repeat_n('*', self.value.chars().count()).collect()
        } else {
            self.value.chars().collect()
        };
        if shown.is_empty() && !ctx.focused() && !self.placeholder.is_empty() {
            frame.set_string(
                area.x,
                area.y,
                &self.placeholder,
                style.add_modifier(Modifier::DIM),
            );
            return;
        }
        // keep the cursor cell on screen
        let start = (self.cursor + 1).saturating_sub(width);
        let visible: String = shown.iter().skip(start).take(width).collect();
        frame.set_string(area.x, area.y, &visible, style);
        if ctx.focused() {
            let cx = area.x + (self.cursor - start) as u16;
            let symbol = shown.get(self.cursor).copied().unwrap_or(' ').to_string();
            frame.set_string(cx, area.y, &symbol, style.add_modifier(Modifier::REVERSED));
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        match event {
            Event::Key(key) => {
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    return false;
                }
                match key.code {
                    KeyCode::Char(c) => {
                        self.insert(c);
                        true
                    }
                    KeyCode::Backspace => {
                        self.backspace();
                        true
                    }
                    KeyCode::Delete => {
                        self.delete();
                        true
                    }
                    KeyCode::Left => {
                        self.cursor = self.cursor.saturating_sub(1);
                        true
                    }
                    KeyCode::Right => {
                        self.cursor = (self.cursor + 1).min(self.value.chars().count());
                        true
                    }
                    KeyCode::Home => {
                        self.cursor = 0;
                        true
                    }
                    KeyCode::End => {
                        self.cursor = self.value.chars().count();
                        true
                    }
                    _ => false,
                }
            }
            Event::Mouse(mouse)
                if matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) =>
            {
                if !self.contains(mouse.column, mouse.row) {
                    return false;
                }
                let clicked = (mouse.column - self.area.x) as usize;
                self.cursor = clicked.min(self.value.chars().count());
                true
            }
            _ => false,
        }
    }
}

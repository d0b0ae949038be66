use crossterm::event::{Event, KeyCode, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use crate::components::{Component, ComponentContext};
use crate::ui::{UiFrame, rect_contains};

/// Multi-line editor. Lines are never wrapped; the view scrolls to follow
/// the cursor instead.
#[derive(Debug, Clone)]
pub struct TextAreaComponent {
    lines: Vec<String>,
    row: usize,
    col: usize,
    top: usize,
    left: usize,
    area: Rect,
    read_only: bool,
}

impl Default for TextAreaComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl TextAreaComponent {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            top: 0,
            left: 0,
            area: Rect::default(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(str::to_string).collect();
        self.row = 0;
        self.col = 0;
        self.top = 0;
        self.left = 0;
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    /// Cursor as (line, char column).
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn contains(&self, column: u16, row: u16) -> bool {
        rect_contains(self.area, column, row)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    fn insert_char(&mut self, c: char) {
        let line = &mut self.lines[self.row];
        let at = Self::byte_index(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    fn newline(&mut self) {
        let line = &mut self.lines[self.row];
        let at = Self::byte_index(line, self.col);
        let rest = line.split_off(at);
        self.row += 1;
        self.lines.insert(self.row, rest);
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let line = &mut self.lines[self.row];
            let at = Self::byte_index(line, self.col);
            line.remove(at);
        } else if self.row > 0 {
            let current = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&current);
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.row.saturating_sub(delta.unsigned_abs())
        } else {
            (self.row + delta as usize).min(self.lines.len() - 1)
        };
        self.row = target;
        self.col = self.col.min(self.line_len(self.row));
    }

    fn scroll_into_view(&mut self, height: usize, width: usize) {
        if self.row < self.top {
            self.top = self.row;
        } else if height > 0 && self.row >= self.top + height {
            self.top = self.row + 1 - height;
        }
        if self.col < self.left {
            self.left = self.col;
        } else if width > 0 && self.col >= self.left + width {
            self.left = self.col + 1 - width;
        }
    }
}

impl Component for TextAreaComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.area = area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = ctx.palette().entry(false);
        frame.fill(area, style);
        let height = area.height as usize;
        let width = area.width as usize;
        self.scroll_into_view(height, width);
        for (i, line) in self.lines.iter().skip(self.top).take(height).enumerate() {
            let visible: String = line.chars().skip(self.left).take(width).collect();
            frame.set_string(area.x, area.y + i as u16, &visible, style);
        }
        if ctx.focused() && !self.read_only {
            let x = area.x + (self.col - self.left) as u16;
            let y = area.y + (self.row - self.top) as u16;
            let symbol = self.lines[self.row]
                .chars()
                .nth(self.col)
                .unwrap_or(' ')
                .to_string();
            frame.set_string(x, y, &symbol, style.add_modifier(Modifier::REVERSED));
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        match event {
            Event::Key(key) => {
                if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                    return false;
                }
                match key.code {
                    KeyCode::Up => self.move_vertical(-1),
                    KeyCode::Down => self.move_vertical(1),
                    KeyCode::PageUp => self.move_vertical(-(self.area.height.max(1) as isize)),
                    KeyCode::PageDown => self.move_vertical(self.area.height.max(1) as isize),
                    KeyCode::Left => {
                        if self.col > 0 {
                            self.col -= 1;
                        } else if self.row > 0 {
                            self.row -= 1;
                            self.col = self.line_len(self.row);
                        }
                    }
                    KeyCode::Right => {
                        if self.col < self.line_len(self.row) {
                            self.col += 1;
                        } else if self.row + 1 < self.lines.len() {
                            self.row += 1;
                            self.col = 0;
                        }
                    }
                    KeyCode::Home => self.col = 0,
                    KeyCode::End => self.col = self.line_len(self.row),
                    _ if self.read_only => return false,
                    KeyCode::Char(c) => self.insert_char(c),
                    KeyCode::Enter => self.newline(),
                    KeyCode::Backspace => self.backspace(),
                    _ => return false,
                }
                true
            }
            Event::Mouse(mouse) => {
                if !self.contains(mouse.column, mouse.row) {
                    return false;
                }
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let row = self.top + (mouse.row - self.area.y) as usize;
                        self.row = row.min(self.lines.len() - 1);
                        let col = self.left + (mouse.column - self.area.x) as usize;
                        self.col = col.min(self.line_len(self.row));
                        true
                    }
                    MouseEventKind::ScrollUp => {
                        self.move_vertical(-1);
                        true
                    }
                    MouseEventKind::ScrollDown => {
                        self.move_vertical(1);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn press(area: &mut TextAreaComponent, code: KeyCode) {
        area.handle_event(
            &Event::Key(KeyEvent::new(code, KeyModifiers::NONE)),
            &ComponentContext::default(),
        );
    }

    fn type_str(area: &mut TextAreaComponent, s: &str) {
        for c in s.chars() {
            if c == '\n' {
                press(area, KeyCode::Enter);
            } else {
                press(area, KeyCode::Char(c));
            }
        }
    }

    #[test]
    fn enter_splits_and_backspace_joins() {
        let mut ta = TextAreaComponent::new();
        type_str(&mut ta, "abcd");
        press(&mut ta, KeyCode::Left);
        press(&mut ta, KeyCode::Left);
        press(&mut ta, KeyCode::Enter);
        assert_eq!(ta.text(), "ab\ncd");
        assert_eq!(ta.cursor(), (1, 0));
        press(&mut ta, KeyCode::Backspace);
        assert_eq!(ta.text(), "abcd");
        assert_eq!(ta.cursor(), (0, 2));
    }

    #[test]
    fn vertical_motion_clamps_column() {
        let mut ta = TextAreaComponent::new();
        ta.set_text("long line\nab");
        press(&mut ta, KeyCode::End);
        press(&mut ta, KeyCode::Down);
        assert_eq!(ta.cursor(), (1, 2));
    }

    #[test]
    fn read_only_ignores_edits() {
        let mut ta = TextAreaComponent::new().read_only();
        ta.set_text("fixed");
        type_str(&mut ta, "x\n");
        assert_eq!(ta.text(), "fixed");
        assert!(!ta.is_blank());
    }
}

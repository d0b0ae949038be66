use crossterm::event::{Event, KeyCode, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};

use super::{App, AppContext, RenderContext};
use crate::log_buffer::{self, LogHandle};
use crate::ui::{UiFrame, truncate_to_width};

/// Tail view of the in-memory log. Scrolling up stops following new lines;
/// `End` resumes.
pub struct SystemLogApp {
    handle: Option<LogHandle>,
    // lines above the bottom
    scroll: usize,
    view_rows: usize,
    total: usize,
}

impl SystemLogApp {
    pub fn new(handle: Option<LogHandle>) -> Self {
        Self {
            handle,
            scroll: 0,
            view_rows: 0,
            total: 0,
        }
    }

    pub fn from_global() -> Self {
        Self::new(log_buffer::global())
    }

    pub fn is_following(&self) -> bool {
        self.scroll == 0
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.total.saturating_sub(self.view_rows);
        if delta.is_negative() {
            self.scroll = self.scroll.saturating_sub(delta.unsigned_abs());
        } else {
            self.scroll = self.scroll.saturating_add(delta as usize).min(max);
        }
    }
}

impl App for SystemLogApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.entry(false));
        let lines = self
            .handle
            .as_ref()
            .map(LogHandle::snapshot)
            .unwrap_or_default();
        let title = if self.is_following() {
            format!(" {} lines ", lines.len())
        } else {
            format!(" {} lines, scrolled ", lines.len())
        };
        let block = Block::default()
            .borders(Borders::TOP)
            .title(title)
            .border_style(Style::default().fg(palette.border));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.total = lines.len();
        self.view_rows = inner.height as usize;
        if inner.height == 0 {
            return;
        }
        if self.handle.is_none() {
            frame.set_string(inner.x, inner.y, "Log buffer not installed.", palette.entry(false));
            return;
        }
        let end = lines.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(self.view_rows);
        for (row, line) in lines[start..end].iter().enumerate() {
            let style = if line.contains("ERROR") || line.contains("PANIC") {
                palette.entry(false).fg(palette.close)
            } else if line.contains("WARN") {
                palette.entry(false).fg(palette.warning)
            } else {
                palette.entry(false).fg(Color::Gray)
            };
            let text = truncate_to_width(line, inner.width as usize);
            frame.set_string(inner.x, inner.y + row as u16, &text, style);
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &mut AppContext<'_>) -> bool {
        let page = self.view_rows.max(1) as isize;
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Up => self.scroll_by(1),
                KeyCode::Down => self.scroll_by(-1),
                KeyCode::PageUp => self.scroll_by(page),
                KeyCode::PageDown => self.scroll_by(-page),
                KeyCode::Home => self.scroll_by(isize::MAX),
                KeyCode::End => self.scroll = 0,
                _ => return false,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scroll_by(3),
                MouseEventKind::ScrollDown => self.scroll_by(-3),
                _ => return false,
            },
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{Harness, buffer_text};

    #[test]
    fn follows_tail_until_scrolled() {
        let mut h = Harness::new();
        let handle = LogHandle::new(100);
        for i in 0..20 {
            handle.push(format!("line {i}"));
        }
        let mut app = SystemLogApp::new(Some(handle.clone()));
        let text = buffer_text(&h.render(&mut app, 40, 6));
        assert!(text.contains("line 19"));
        assert!(!text.contains("line 10"));

        h.key(&mut app, KeyCode::PageUp);
        assert!(!app.is_following());
        handle.push("line 20");
        let text = buffer_text(&h.render(&mut app, 40, 6));
        assert!(!text.contains("line 20"));

        h.key(&mut app, KeyCode::End);
        let text = buffer_text(&h.render(&mut app, 40, 6));
        assert!(text.contains("line 20"));
    }

    #[test]
    fn missing_buffer_is_reported() {
        let h = Harness::new();
        let mut app = SystemLogApp::new(None);
        let text = buffer_text(&h.render(&mut app, 40, 4));
        assert!(text.contains("Log buffer not installed."));
    }
}

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::components::{Component, ComponentContext};
use crate::ui::{UiFrame, rect_contains};

/// Bordered, scrolling single-selection list.
pub struct ListComponent {
    items: Vec<String>,
    selected: usize,
    offset: usize,
    title: String,
    inner: Rect,
}

impl ListComponent {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            offset: 0,
            title: title.into(),
            inner: Rect::default(),
        }
    }

    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    pub fn set_selected(&mut self, selected: usize) {
        self.selected = selected.min(self.items.len().saturating_sub(1));
    }

    pub fn scroll_offset(&self) -> usize {
        self.offset
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.items.is_empty() {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = (self.selected + delta as usize).min(self.items.len() - 1);
        }
    }

    fn keep_selected_in_view(&mut self, view: usize) {
        if view == 0 || self.items.is_empty() {
            self.offset = 0;
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + view {
            self.offset = self.selected + 1 - view;
        }
    }
}

impl Component for ListComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        let palette = ctx.palette();
        let border = if ctx.focused() {
            palette.success
        } else {
            palette.border
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .border_style(Style::default().fg(border))
            .style(palette.text());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.inner = inner;
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let view = inner.height as usize;
        self.keep_selected_in_view(view);

        let items = self
            .items
            .iter()
            .skip(self.offset)
            .take(view)
            .map(|item| ListItem::new(item.clone()))
            .collect::<Vec<_>>();

        let mut state = ListState::default();
        if !self.items.is_empty() && self.selected >= self.offset {
            state.select(Some(self.selected - self.offset));
        }

        let list = List::new(items).highlight_style(palette.selected());
        frame.render_stateful_widget(list, inner, &mut state);
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Up => {
                    self.move_selection(-1);
                    true
                }
                KeyCode::Down => {
                    self.move_selection(1);
                    true
                }
                KeyCode::PageUp => {
                    self.move_selection(-5);
                    true
                }
                KeyCode::PageDown => {
                    self.move_selection(5);
                    true
                }
                KeyCode::Home => {
                    self.selected = 0;
                    true
                }
                KeyCode::End => {
                    if !self.items.is_empty() {
                        self.selected = self.items.len() - 1;
                    }
                    true
                }
                _ => false,
            },
            Event::Mouse(mouse) => {
                if !rect_contains(self.inner, mouse.column, mouse.row) {
                    return false;
                }
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        let row = self.offset + (mouse.row - self.inner.y) as usize;
                        if row < self.items.len() {
                            self.selected = row;
                        }
                        true
                    }
                    MouseEventKind::ScrollUp => {
                        self.move_selection(-1);
                        true
                    }
                    MouseEventKind::ScrollDown => {
                        self.move_selection(1);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

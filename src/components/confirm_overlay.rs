use crossterm::event::{Event, MouseEventKind};
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::components::{Component, ComponentContext};
use crate::keybindings::{Action, KeyBindings};
use crate::ui::{UiFrame, centered, rect_contains};

const DIALOG_WIDTH: u16 = 48;
const DIALOG_HEIGHT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

/// Modal yes/no dialog with Cancel and Exit buttons.
#[derive(Debug, Default)]
pub struct ConfirmOverlayComponent {
    visible: bool,
    title: String,
    body: String,
    selected_confirm: bool,
    cancel_rect: Option<Rect>,
    confirm_rect: Option<Rect>,
    keys: KeyBindings,
}

impl Component for ConfirmOverlayComponent {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.cancel_rect = None;
        self.confirm_rect = None;
        if !self.visible || area.width < 12 || area.height < DIALOG_HEIGHT {
            return;
        }
        let palette = ctx.palette();
        let rect = centered(area, DIALOG_WIDTH, DIALOG_HEIGHT);
        frame.render_widget(Clear, rect);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title.as_str())
            .border_style(Style::default().fg(palette.warning))
            .style(palette.text());
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let content = Rect {
            x: inner.x.saturating_add(1),
            y: inner.y,
            width: inner.width.saturating_sub(2),
            height: inner.height,
        };
        if content.height < 4 || content.width == 0 {
            return;
        }
        let separator_y = content.y + content.height - 2;
        let button_y = content.y + content.height - 1;
        let body_rect = Rect {
            height: content.height - 3,
            ..content
        };
        let paragraph = Paragraph::new(self.body.as_str())
            .alignment(Alignment::Left)
            .style(palette.text())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body_rect);
        let rule = "─".repeat(content.width as usize);
        frame.set_string(
            content.x,
            separator_y,
            &rule,
            Style::default().fg(palette.border).bg(palette.bg),
        );

        let cancel = "[ Cancel ]";
        let confirm = "[ Exit ]";
        let selected_style = palette.selected().add_modifier(Modifier::BOLD);
        let unselected_style = palette.button();
        let (cancel_style, confirm_style) = if self.selected_confirm {
            (unselected_style, selected_style)
        } else {
            (selected_style, unselected_style)
        };
        let total_width = (cancel.len() + 1 + confirm.len()) as u16;
        let start_x = content.x + content.width.saturating_sub(total_width);
        let confirm_x = start_x + cancel.len() as u16 + 1;
        frame.set_string(start_x, button_y, cancel, cancel_style);
        frame.set_string(confirm_x, button_y, confirm, confirm_style);
        self.cancel_rect = Some(Rect::new(start_x, button_y, cancel.len() as u16, 1));
        self.confirm_rect = Some(Rect::new(confirm_x, button_y, confirm.len() as u16, 1));
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        if self.handle_confirm_event(event).is_some() {
            return true;
        }
        let Event::Key(key) = event else {
            return false;
        };
        self.keys.matches(Action::ConfirmToggle, key)
            || self.keys.matches(Action::ConfirmLeft, key)
            || self.keys.matches(Action::ConfirmRight, key)
    }
}

impl ConfirmOverlayComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show the dialog with the Exit button preselected.
    pub fn open(&mut self, title: &str, body: &str) {
        self.visible = true;
        self.title = title.to_string();
        self.body = body.to_string();
        self.selected_confirm = true;
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.cancel_rect = None;
        self.confirm_rect = None;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn handle_confirm_event(&mut self, event: &Event) -> Option<ConfirmAction> {
        match event {
            Event::Mouse(mouse) if matches!(mouse.kind, MouseEventKind::Down(_)) => {
                if self
                    .confirm_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Confirm);
                }
                if self
                    .cancel_rect
                    .is_some_and(|rect| rect_contains(rect, mouse.column, mouse.row))
                {
                    return Some(ConfirmAction::Cancel);
                }
                None
            }
            Event::Key(key) => {
                if self.keys.matches(Action::ConfirmToggle, key) {
                    self.selected_confirm = !self.selected_confirm;
                    None
                } else if self.keys.matches(Action::ConfirmLeft, key) {
                    self.selected_confirm = false;
                    None
                } else if self.keys.matches(Action::ConfirmRight, key) {
                    self.selected_confirm = true;
                    None
                } else if self.keys.matches(Action::ConfirmAccept, key) {
                    if self.selected_confirm {
                        Some(ConfirmAction::Confirm)
                    } else {
                        Some(ConfirmAction::Cancel)
                    }
                } else if self.keys.matches(Action::ConfirmCancel, key) {
                    Some(ConfirmAction::Cancel)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent};
    use ratatui::buffer::Buffer;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn keyboard_flow() {
        let mut o = ConfirmOverlayComponent::new();
        o.open("Exit", "Leave the desktop?");
        assert_eq!(o.handle_confirm_event(&key(KeyCode::Tab)), None);
        assert_eq!(
            o.handle_confirm_event(&key(KeyCode::Enter)),
            Some(ConfirmAction::Cancel)
        );
        o.handle_confirm_event(&key(KeyCode::Right));
        assert_eq!(
            o.handle_confirm_event(&key(KeyCode::Char('y'))),
            Some(ConfirmAction::Confirm)
        );
        assert_eq!(
            o.handle_confirm_event(&key(KeyCode::Esc)),
            Some(ConfirmAction::Cancel)
        );
    }

    #[test]
    fn rendered_buttons_are_clickable() {
        let mut o = ConfirmOverlayComponent::new();
        o.open("Exit", "Leave the desktop?");
        let area = Rect::new(0, 0, 60, 20);
        let mut buffer = Buffer::empty(area);
        o.render(
            &mut UiFrame::from_parts(area, &mut buffer),
            area,
            &ComponentContext::default(),
        );
        let exit = o.confirm_rect.unwrap();
        let down = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: exit.x + 1,
            row: exit.y,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(o.handle_confirm_event(&down), Some(ConfirmAction::Confirm));
        o.close();
        assert!(!o.visible());
        assert_eq!(o.handle_confirm_event(&down), None);
    }
}

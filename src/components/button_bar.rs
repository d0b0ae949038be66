use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use crate::components::{Component, ComponentContext};
use crate::ui::{UiFrame, rect_contains};

/// A row of `[ label ]` buttons. Buttons that do not fit are not drawn and
/// cannot be clicked.
#[derive(Debug, Default, Clone)]
pub struct ButtonBar {
    labels: Vec<String>,
    rects: Vec<Option<Rect>>,
    active: Option<usize>,
}

impl ButtonBar {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let rects = vec![None; labels.len()];
        Self {
            labels,
            rects,
            active: None,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn set_label(&mut self, index: usize, label: impl Into<String>) {
        if let Some(slot) = self.labels.get_mut(index) {
            *slot = label.into();
        }
    }

    /// Draw one button with the selected style.
    pub fn set_active(&mut self, active: Option<usize>) {
        self.active = active;
    }

    /// Index of the button under a left click, if any.
    pub fn clicked(&self, event: &Event) -> Option<usize> {
        let Event::Mouse(mouse) = event else {
            return None;
        };
        if !matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)) {
            return None;
        }
        self.hit(mouse.column, mouse.row)
    }

    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        self.rects
            .iter()
            .position(|r| r.is_some_and(|r| rect_contains(r, column, row)))
    }

    /// Width of the whole bar when laid out on one row.
    pub fn width(&self) -> u16 {
        let total: usize = self.labels.iter().map(|l| l.chars().count() + 5).sum();
        total.saturating_sub(1) as u16
    }
}

impl Component for ButtonBar {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext) {
        self.rects = vec![None; self.labels.len()];
        if area.width == 0 || area.height == 0 {
            return;
        }
        let palette = ctx.palette();
        let mut x = area.x;
        let right = area.right();
        for (i, label) in self.labels.iter().enumerate() {
            let text = format!("[ {label} ]");
            let width = text.chars().count() as u16;
            if x.saturating_add(width) > right {
                break;
            }
            let style = if self.active == Some(i) {
                palette.selected()
            } else {
                palette.button()
            };
            frame.set_string(x, area.y, &text, style);
            self.rects[i] = Some(Rect::new(x, area.y, width, 1));
            x = x.saturating_add(width + 1);
        }
    }

    fn handle_event(&mut self, event: &Event, _ctx: &ComponentContext) -> bool {
        self.clicked(event).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn clicks_map_to_buttons() {
        let mut bar = ButtonBar::new(["Save", "Delete"]);
        let area = Rect::new(2, 1, 30, 1);
        let mut buffer = Buffer::empty(Rect::new(0, 0, 40, 3));
        bar.render(
            &mut UiFrame::from_parts(area, &mut buffer),
            area,
            &ComponentContext::default(),
        );
        // "[ Save ]" spans 2..10, "[ Delete ]" starts at 11
        assert_eq!(bar.clicked(&click(2, 1)), Some(0));
        assert_eq!(bar.clicked(&click(10, 1)), None);
        assert_eq!(bar.clicked(&click(11, 1)), Some(1));
        assert_eq!(bar.clicked(&click(11, 2)), None);
        assert_eq!(bar.width(), 19);
    }

    #[test]
    fn buttons_past_the_edge_are_skipped() {
        let mut bar = ButtonBar::new(["One", "Two"]);
        let area = Rect::new(0, 0, 10, 1);
        let mut buffer = Buffer::empty(area);
        bar.render(
            &mut UiFrame::from_parts(area, &mut buffer),
            area,
            &ComponentContext::default(),
        );
        assert_eq!(bar.hit(0, 0), Some(0));
        assert_eq!(bar.hit(8, 0), None);
    }
}

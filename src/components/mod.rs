use crossterm::event::Event;
use ratatui::layout::Rect;

use crate::ui::UiFrame;

pub mod button_bar;
pub mod confirm_overlay;
pub mod list;
pub mod text_area;
pub mod text_input;

pub use button_bar::ButtonBar;
pub use confirm_overlay::{ConfirmAction, ConfirmOverlayComponent};
pub use list::ListComponent;
pub use text_area::TextAreaComponent;
pub use text_input::TextInputComponent;

pub use crate::component_context::ComponentContext;

/// A reusable widget with its own state.
///
/// Mouse coordinates handed to `handle_event` live in the same space as the
/// `area` last passed to `render`.
pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &ComponentContext);

    fn handle_event(&mut self, _event: &Event, _ctx: &ComponentContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    struct DummyComp;
    impl Component for DummyComp {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &ComponentContext) {}
    }

    #[test]
    fn default_handle_event_returns_false() {
        let mut d = DummyComp;
        assert!(!d.handle_event(
            &Event::Key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE)),
            &ComponentContext::default()
        ));
    }
}

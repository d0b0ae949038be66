use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::style::Modifier;

use super::{App, AppContext, RenderContext};
use crate::components::{ButtonBar, Component};
use crate::theme::ThemeKind;
use crate::ui::UiFrame;

pub struct SettingsApp {
    themes: ButtonBar,
}

impl Default for SettingsApp {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsApp {
    pub fn new() -> Self {
        Self {
            themes: ButtonBar::new(ThemeKind::ALL.iter().map(|t| t.label())),
        }
    }

    fn apply(&self, theme: ThemeKind, ctx: &mut AppContext<'_>) {
        if ctx.session.theme != theme {
            ctx.session.theme = theme;
            tracing::info!(theme = theme.label(), "theme changed");
        }
    }

    fn step(&self, delta: isize, ctx: &mut AppContext<'_>) {
        let len = ThemeKind::ALL.len() as isize;
        let current = ThemeKind::ALL
            .iter()
            .position(|t| *t == ctx.session.theme)
            .unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.apply(ThemeKind::ALL[next], ctx);
    }
}

impl App for SettingsApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        let text = palette.text();
        frame.fill(area, text);
        if area.height < 6 {
            return;
        }
        let heading = format!("⚙ {} Settings", crate::constants::DESKTOP_NAME);
        frame.set_string(area.x + 1, area.y, &heading, text.add_modifier(Modifier::BOLD));
        let user = format!("User: {}", ctx.session.display_user());
        frame.set_string(area.x + 1, area.y + 1, &user, text.add_modifier(Modifier::ITALIC));

        frame.set_string(area.x + 1, area.y + 3, "Theme", text.add_modifier(Modifier::BOLD));
        let active = ThemeKind::ALL.iter().position(|t| *t == ctx.session.theme);
        self.themes.set_active(active);
        let bar = Rect::new(area.x + 1, area.y + 4, area.width.saturating_sub(2), 1);
        self.themes.render(frame, bar, &ctx.component(false));

        frame.set_string(area.x + 1, area.y + 6, "(Other settings simulated)", text);
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        if let Some(index) = self.themes.clicked(event) {
            self.apply(ThemeKind::ALL[index], ctx);
            return true;
        }
        let Event::Key(key) = event else {
            return false;
        };
        match key.code {
            KeyCode::Left => self.step(-1, ctx),
            KeyCode::Right | KeyCode::Tab => self.step(1, ctx),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{Harness, buffer_text, find};

    #[test]
    fn shows_user_and_switches_theme() {
        let mut h = Harness::new();
        let mut app = SettingsApp::new();
        let buffer = h.render(&mut app, 50, 10);
        assert!(buffer_text(&buffer).contains("User: tester"));

        let (x, y) = find(&buffer, "[ Dark ]").unwrap();
        h.click(&mut app, x + 1, y);
        assert_eq!(h.session.theme, ThemeKind::Dark);

        h.key(&mut app, KeyCode::Right);
        assert_eq!(h.session.theme, ThemeKind::Gradient);
        h.key(&mut app, KeyCode::Left);
        assert_eq!(h.session.theme, ThemeKind::Dark);
    }
}

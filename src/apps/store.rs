use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::widgets::{Paragraph, Wrap};

use super::{App, AppContext, RenderContext, ShellRequest};
use crate::components::{ButtonBar, Component, ComponentContext, ListComponent};
use crate::ui::{UiFrame, rect_contains};

/// Catalog browser. Installing is the shell's job; the store only asks.
pub struct StoreApp {
    list: ListComponent,
    buttons: ButtonBar,
    // catalog ids in list order, refreshed on every render
    ids: Vec<&'static str>,
    installed: Vec<bool>,
    list_rect: Rect,
}

impl Default for StoreApp {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreApp {
    pub fn new() -> Self {
        Self {
            list: ListComponent::new(format!("{} Store", crate::constants::DESKTOP_NAME)),
            buttons: ButtonBar::new(["Install", "Open"]),
            ids: Vec::new(),
            installed: Vec::new(),
            list_rect: Rect::default(),
        }
    }

    fn selected_id(&self) -> Option<&'static str> {
        self.ids.get(self.list.selected()).copied()
    }

    fn install(&mut self, ctx: &mut AppContext<'_>) {
        match self.selected_id() {
            Some(id) => ctx.request(ShellRequest::Install(id.to_string())),
            None => ctx.notify("Select an app to install."),
        }
    }

    fn open(&mut self, ctx: &mut AppContext<'_>) {
        let index = self.list.selected();
        match (self.selected_id(), self.installed.get(index)) {
            (Some(id), Some(true)) => ctx.request(ShellRequest::Launch(id.to_string())),
            (Some(_), _) => ctx.notify("Install the app first."),
            (None, _) => ctx.notify("Select an app to open."),
        }
    }
}

impl App for StoreApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 6 || area.width < 16 {
            return;
        }
        let catalog = ctx.launcher.catalog();
        self.ids = catalog.items().iter().map(|d| d.id).collect();
        self.installed = self.ids.iter().map(|id| catalog.is_installed(id)).collect();
        let items = catalog
            .items()
            .iter()
            .map(|d| {
                let state = if catalog.is_installed(d.id) {
                    "  [Installed]"
                } else {
                    ""
                };
                format!("{} {}{state}", d.icon, d.label)
            })
            .collect();
        self.list.set_items(items);

        self.list_rect = Rect::new(area.x, area.y, area.width, area.height - 4);
        self.list
            .render(frame, self.list_rect, &ctx.component(true));

        if let Some(descriptor) = self.selected_id().and_then(|id| catalog.get(id)) {
            let detail = Rect::new(area.x + 1, self.list_rect.bottom(), area.width - 2, 2);
            frame.render_widget(
                Paragraph::new(descriptor.description)
                    .style(palette.text())
                    .wrap(Wrap { trim: true }),
                detail,
            );
        }
        let bar = Rect::new(area.x + 1, area.bottom() - 1, area.width - 2, 1);
        self.buttons.render(frame, bar, &ctx.component(false));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        if let Some(index) = self.buttons.clicked(event) {
            if index == 0 {
                self.install(ctx);
            } else {
                self.open(ctx);
            }
            return true;
        }
        match event {
            Event::Key(key) if key.code == KeyCode::Enter => {
                self.install(ctx);
                true
            }
            Event::Key(key) if key.code == KeyCode::Char('o') => {
                self.open(ctx);
                true
            }
            Event::Key(_) => self.list.handle_event(event, &ComponentContext::default()),
            Event::Mouse(mouse) if rect_contains(self.list_rect, mouse.column, mouse.row) => {
                self.list.handle_event(event, &ComponentContext::default())
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::ids;
    use crate::apps::testing::{Harness, buffer_text, find};

    #[test]
    fn lists_catalog_with_install_state() {
        let h = Harness::new();
        let mut app = StoreApp::new();
        let text = buffer_text(&h.render(&mut app, 60, 16));
        assert!(text.contains("Tic-Tac-Toe"));
        assert!(!text.contains("Tic-Tac-Toe  [Installed]"));
        assert!(text.contains("Contacts  [Installed]"));
        assert!(text.contains("Advanced whiteboard for drawing and notes."));
    }

    #[test]
    fn install_and_open_go_through_the_shell() {
        let mut h = Harness::new();
        let mut app = StoreApp::new();
        let buffer = h.render(&mut app, 60, 16);
        h.key(&mut app, KeyCode::Down);
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(
            h.take_requests(),
            vec![ShellRequest::Install(ids::TICTACTOE.to_string())]
        );

        let (x, y) = find(&buffer, "[ Open ]").unwrap();
        h.click(&mut app, x + 1, y);
        assert_eq!(h.notices(), vec!["Install the app first."]);

        let contacts = app.ids.iter().position(|id| *id == ids::CONTACTS).unwrap();
        app.list.set_selected(contacts);
        h.key(&mut app, KeyCode::Char('o'));
        assert_eq!(
            h.take_requests(),
            vec![ShellRequest::Launch(ids::CONTACTS.to_string())]
        );
    }
}

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{App, AppContext, RenderContext, is_ctrl};
use crate::components::{
    ButtonBar, Component, ComponentContext, ListComponent, TextAreaComponent, TextInputComponent,
};
use crate::ui::{UiFrame, rect_contains};

const BUTTONS: [&str; 4] = ["Save Note", "Clear", "Delete Note", "View Selected"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Content,
    List,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Title => Field::Content,
            Field::Content => Field::List,
            Field::List => Field::Title,
        }
    }
}

/// Title + body editor over the session's note map.
pub struct NotesApp {
    title: TextInputComponent,
    content: TextAreaComponent,
    list: ListComponent,
    buttons: ButtonBar,
    field: Field,
    content_rect: Rect,
    list_rect: Rect,
}

impl Default for NotesApp {
    fn default() -> Self {
        Self::new()
    }
}

impl NotesApp {
    pub fn new() -> Self {
        Self {
            title: TextInputComponent::new().with_placeholder("Title"),
            content: TextAreaComponent::new(),
            list: ListComponent::new("Notes"),
            buttons: ButtonBar::new(BUTTONS),
            field: Field::Title,
            content_rect: Rect::default(),
            list_rect: Rect::default(),
        }
    }

    fn save(&mut self, ctx: &mut AppContext<'_>) {
        let title = self.title.value().trim().to_string();
        let body = self.content.text().trim().to_string();
        if title.is_empty() || body.is_empty() {
            ctx.notify("Please enter both a title and content.");
            return;
        }
        ctx.session.notes.insert(title.clone(), body);
        tracing::debug!(note = %title, "note saved");
        self.clear();
        self.sync_list(ctx);
    }

    fn clear(&mut self) {
        self.title.clear();
        self.content.clear();
    }

    fn delete(&mut self, ctx: &mut AppContext<'_>) {
        self.sync_list(ctx);
        let Some(key) = self.list.selected_item().map(str::to_string) else {
            ctx.notify("Select a note to delete.");
            return;
        };
        if ctx.session.notes.remove(&key).is_some() {
            ctx.notify(format!("Deleted note '{key}'."));
        }
        self.sync_list(ctx);
    }

    fn view(&mut self, ctx: &mut AppContext<'_>) {
        self.sync_list(ctx);
        let Some(key) = self.list.selected_item().map(str::to_string) else {
            return;
        };
        if let Some(body) = ctx.session.notes.get(&key) {
            self.content.set_text(body);
            self.title.set_value(key);
        }
    }

    fn sync_list(&mut self, ctx: &AppContext<'_>) {
        self.list
            .set_items(ctx.session.notes.keys().cloned().collect());
    }

    fn run_button(&mut self, index: usize, ctx: &mut AppContext<'_>) {
        match index {
            0 => self.save(ctx),
            1 => self.clear(),
            2 => self.delete(ctx),
            _ => self.view(ctx),
        }
    }
}

impl App for NotesApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 6 || area.width < 12 {
            return;
        }
        self.list
            .set_items(ctx.session.notes.keys().cloned().collect());

        let label = "Title: ";
        frame.set_string(area.x + 1, area.y, label, palette.text());
        let title_rect = Rect::new(
            area.x + 1 + label.len() as u16,
            area.y,
            area.width.saturating_sub(label.len() as u16 + 2),
            1,
        );
        self.title
            .render(frame, title_rect, &ctx.component(self.field == Field::Title));

        frame.set_string(area.x + 1, area.y + 1, "Content:", palette.text());
        let body_rows = area.height - 4;
        let content_height = (body_rows / 2).max(1);
        self.content_rect = Rect::new(
            area.x + 1,
            area.y + 2,
            area.width - 2,
            content_height,
        );
        self.content
            .render(frame, self.content_rect, &ctx.component(self.field == Field::Content));

        self.list_rect = Rect::new(
            area.x + 1,
            self.content_rect.bottom(),
            area.width - 2,
            body_rows - content_height,
        );
        self.list
            .render(frame, self.list_rect, &ctx.component(self.field == Field::List));

        let bar = Rect::new(area.x + 1, area.bottom() - 1, area.width - 2, 1);
        self.buttons.render(frame, bar, &ctx.component(false));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        let inner = ComponentContext::default();
        if let Some(index) = self.buttons.clicked(event) {
            self.run_button(index, ctx);
            return true;
        }
        match event {
            Event::Key(key) => {
                if is_ctrl(key, 's') {
                    self.save(ctx);
                    return true;
                }
                if key.code == KeyCode::Tab {
                    self.field = self.field.next();
                    return true;
                }
                match self.field {
                    Field::Title => {
                        if key.code == KeyCode::Enter {
                            self.field = Field::Content;
                            return true;
                        }
                        self.title.handle_event(event, &inner)
                    }
                    Field::Content => self.content.handle_event(event, &inner),
                    Field::List => match key.code {
                        KeyCode::Enter => {
                            self.view(ctx);
                            true
                        }
                        KeyCode::Delete => {
                            self.delete(ctx);
                            true
                        }
                        _ => self.list.handle_event(event, &inner),
                    },
                }
            }
            Event::Mouse(mouse) => {
                let down = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
                if self.title.contains(mouse.column, mouse.row) {
                    if down {
                        self.field = Field::Title;
                    }
                    return self.title.handle_event(event, &inner);
                }
                if rect_contains(self.content_rect, mouse.column, mouse.row) {
                    if down {
                        self.field = Field::Content;
                    }
                    return self.content.handle_event(event, &inner);
                }
                if rect_contains(self.list_rect, mouse.column, mouse.row) {
                    if down {
                        self.field = Field::List;
                    }
                    return self.list.handle_event(event, &inner);
                }
                false
            }
            _ => false,
        }
    }
}

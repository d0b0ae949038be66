use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{App, AppContext, RenderContext, is_ctrl};
use crate::components::{
    ButtonBar, Component, ComponentContext, ListComponent, TextAreaComponent, TextInputComponent,
};
use crate::ui::{UiFrame, rect_contains};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    List,
    Name,
    Handle,
    Notes,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::List => Field::Name,
            Field::Name => Field::Handle,
            Field::Handle => Field::Notes,
            Field::Notes => Field::List,
        }
    }
}

/// Address book over `Session::contacts`.
pub struct ContactsApp {
    list: ListComponent,
    name: TextInputComponent,
    handle: TextInputComponent,
    notes: TextAreaComponent,
    buttons: ButtonBar,
    field: Field,
    // contact whose details are in the editors
    loaded: Option<String>,
    list_rect: Rect,
    notes_rect: Rect,
}

impl Default for ContactsApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ContactsApp {
    pub fn new() -> Self {
        Self {
            list: ListComponent::new("Contacts"),
            name: TextInputComponent::new().with_placeholder("New contact name"),
            handle: TextInputComponent::new().with_placeholder("@handle"),
            notes: TextAreaComponent::new(),
            buttons: ButtonBar::new(["Add", "Save", "Delete"]),
            field: Field::List,
            loaded: None,
            list_rect: Rect::default(),
            notes_rect: Rect::default(),
        }
    }

    fn sync_list(&mut self, ctx: &AppContext<'_>) {
        self.list.set_items(ctx.session.contacts.keys().cloned().collect());
    }

    /// Copy the selected contact into the editors when the selection moved.
    fn load_selected(&mut self, ctx: &AppContext<'_>) {
        let selected = self.list.selected_item().map(str::to_string);
        if selected == self.loaded {
            return;
        }
        match selected.as_deref().and_then(|name| ctx.session.contacts.get(name)) {
            Some(contact) => {
                self.handle.set_value(contact.handle.clone());
                self.notes.set_text(&contact.notes);
            }
            None => {
                self.handle.clear();
                self.notes.clear();
            }
        }
        self.loaded = selected;
    }

    fn add(&mut self, ctx: &mut AppContext<'_>) {
        let name = self.name.value().trim().to_string();
        match ctx.session.add_contact(&name, self.handle.value()) {
            Ok(()) => {
                tracing::debug!(contact = %name, "contact added");
                self.name.clear();
                self.sync_list(ctx);
                if let Some(index) = self.list.items().iter().position(|n| *n == name) {
                    self.list.set_selected(index);
                }
                self.loaded = None;
                self.load_selected(ctx);
                self.field = Field::List;
            }
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn save(&mut self, ctx: &mut AppContext<'_>) {
        self.sync_list(ctx);
        let Some(name) = self.list.selected_item().map(str::to_string) else {
            ctx.notify("Select a contact to save changes.");
            return;
        };
        match ctx
            .session
            .update_contact(&name, self.handle.value(), &self.notes.text())
        {
            Ok(()) => ctx.notify(format!("Contact '{name}' saved.")),
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn delete(&mut self, ctx: &mut AppContext<'_>) {
        self.sync_list(ctx);
        let Some(name) = self.list.selected_item().map(str::to_string) else {
            ctx.notify("Select a contact to delete.");
            return;
        };
        if ctx.session.contacts.remove(&name).is_some() {
            ctx.notify(format!("Deleted contact '{name}'."));
        }
        self.sync_list(ctx);
        self.loaded = None;
        self.load_selected(ctx);
    }

    fn run_button(&mut self, index: usize, ctx: &mut AppContext<'_>) {
        match index {
            0 => self.add(ctx),
            1 => self.save(ctx),
            _ => self.delete(ctx),
        }
    }
}

impl App for ContactsApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 8 || area.width < 24 {
            return;
        }
        self.list
            .set_items(ctx.session.contacts.keys().cloned().collect());

        let list_width = area.width * 2 / 5;
        self.list_rect = Rect::new(area.x, area.y, list_width, area.height - 1);
        self.list
            .render(frame, self.list_rect, &ctx.component(self.field == Field::List));

        let x = area.x + list_width + 1;
        let width = area.right().saturating_sub(x + 1);
        let label_width = 8;
        let input_width = width.saturating_sub(label_width);
        frame.set_string(x, area.y, "Name:", palette.text());
        self.name.render(
            frame,
            Rect::new(x + label_width, area.y, input_width, 1),
            &ctx.component(self.field == Field::Name),
        );
        frame.set_string(x, area.y + 2, "Handle:", palette.text());
        self.handle.render(
            frame,
            Rect::new(x + label_width, area.y + 2, input_width, 1),
            &ctx.component(self.field == Field::Handle),
        );
        frame.set_string(x, area.y + 4, "Notes:", palette.text());
        self.notes_rect = Rect::new(x, area.y + 5, width, area.height.saturating_sub(7));
        self.notes
            .render(frame, self.notes_rect, &ctx.component(self.field == Field::Notes));

        let bar = Rect::new(x, area.bottom() - 1, width, 1);
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
                    Field::List => {
                        if key.code == KeyCode::Delete {
                            self.delete(ctx);
                            return true;
                        }
                        let handled = self.list.handle_event(event, &inner);
                        self.load_selected(ctx);
                        handled
                    }
                    Field::Name => {
                        if key.code == KeyCode::Enter {
                            self.add(ctx);
                            return true;
                        }
                        self.name.handle_event(event, &inner)
                    }
                    Field::Handle => self.handle.handle_event(event, &inner),
                    Field::Notes => self.notes.handle_event(event, &inner),
                }
            }
            Event::Mouse(mouse) => {
                let down = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
                if rect_contains(self.list_rect, mouse.column, mouse.row) {
                    if down {
                        self.field = Field::List;
                    }
                    let handled = self.list.handle_event(event, &inner);
                    self.load_selected(ctx);
                    return handled;
                }
                if self.name.contains(mouse.column, mouse.row) {
                    if down {
                        self.field = Field::Name;
                    }
                    return self.name.handle_event(event, &inner);
                }
                if self.handle.contains(mouse.column, mouse.row) {
                    if down {
                        self.field = Field::Handle;
                    }
                    return self.handle.handle_event(event, &inner);
                }
                if rect_contains(self.notes_rect, mouse.column, mouse.row) {
                    if down {
                        self.field = Field::Notes;
                    }
                    return self.notes.handle_event(event, &inner);
                }
                false
            }
            _ => false,
        }
    }
}

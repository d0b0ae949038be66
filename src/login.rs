//! Login / sign-up overlay drawn over the desktop until somebody logs in.

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear};

use crate::components::{ButtonBar, Component, ComponentContext, TextInputComponent};
use crate::constants::DESKTOP_NAME;
use crate::keybindings::{Action, KeyBindings};
use crate::session::Session;
use crate::theme::Palette;
use crate::ui::{UiFrame, centered};

const WIDTH: u16 = 44;
const HEIGHT: u16 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginOverlay {
    visible: bool,
    signup: bool,
    field: Field,
    username: TextInputComponent,
    password: TextInputComponent,
    buttons: ButtonBar,
    // (text, is_error)
    message: Option<(String, bool)>,
    keys: KeyBindings,
}

impl Default for LoginOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginOverlay {
    pub fn new() -> Self {
        Self {
            visible: false,
            signup: false,
            field: Field::Username,
            username: TextInputComponent::new().with_placeholder("username"),
            password: TextInputComponent::new()
                .masked()
                .with_placeholder("password"),
            buttons: ButtonBar::new(["Login", "Sign Up", "Guest"]),
            message: None,
            keys: KeyBindings::default(),
        }
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.signup = false;
        self.field = Field::Username;
        self.username.clear();
        self.password.clear();
        self.message = None;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn is_signup(&self) -> bool {
        self.signup
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_ref().map(|(text, _)| text.as_str())
    }

    fn toggle_signup(&mut self) {
        self.signup = !self.signup;
        self.message = None;
        self.password.clear();
    }

    fn submit(&mut self, session: &mut Session) -> Option<String> {
        let username = self.username.value().trim().to_string();
        let password = self.password.value().to_string();
        if self.signup {
            match session.signup(&username, &password) {
                Ok(()) => {
                    self.message = Some((
                        format!("Account '{username}' created! You can now login."),
                        false,
                    ));
                    self.signup = false;
                    self.password.clear();
                    self.field = Field::Password;
                }
                Err(err) => self.message = Some((err.to_string(), true)),
            }
            return None;
        }
        match session.login(&username, &password) {
            Ok(()) => {
                self.visible = false;
                Some(format!("Welcome, {username}!"))
            }
            Err(err) => {
                self.message = Some((err.to_string(), true));
                self.password.clear();
                None
            }
        }
    }

    fn guest(&mut self, session: &mut Session) -> Option<String> {
        session.login_as_guest();
        self.visible = false;
        Some(format!("Welcome, {}!", session.display_user()))
    }

    /// Feed an event to the overlay. Returns the welcome notice once a login
    /// succeeds; the overlay hides itself at that point.
    pub fn handle_event(&mut self, event: &Event, session: &mut Session) -> Option<String> {
        if !self.visible {
            return None;
        }
        if let Some(index) = self.buttons.clicked(event) {
            return match index {
                0 => {
                    self.signup = false;
                    self.submit(session)
                }
                1 => {
                    if self.signup {
                        self.submit(session)
                    } else {
                        self.toggle_signup();
                        None
                    }
                }
                _ => self.guest(session),
            };
        }
        let ctx = ComponentContext::new(true);
        match event {
            Event::Key(key) if self.keys.matches(Action::ToggleSignup, key) => {
                self.toggle_signup();
                None
            }
            Event::Key(key) => match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    self.field = match self.field {
                        Field::Username => Field::Password,
                        Field::Password => Field::Username,
                    };
                    None
                }
                KeyCode::Enter => {
                    if self.field == Field::Username && self.password.value().is_empty() {
                        self.field = Field::Password;
                        None
                    } else {
                        self.submit(session)
                    }
                }
                _ => {
                    match self.field {
                        Field::Username => self.username.handle_event(event, &ctx),
                        Field::Password => self.password.handle_event(event, &ctx),
                    };
                    None
                }
            },
            Event::Mouse(mouse) => {
                if self.username.contains(mouse.column, mouse.row) {
                    self.field = Field::Username;
                } else if self.password.contains(mouse.column, mouse.row) {
                    self.field = Field::Password;
                }
                None
            }
            _ => None,
        }
    }

    pub fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, palette: &Palette) {
        if !self.visible || area.width < 20 || area.height < HEIGHT {
            return;
        }
        let rect = centered(area, WIDTH, HEIGHT);
        frame.render_widget(Clear, rect);
        let title = if self.signup {
            format!(" {DESKTOP_NAME} - Sign Up ")
        } else {
            format!(" {DESKTOP_NAME} - Login ")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(palette.border))
            .style(palette.text());
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let x = inner.x + 1;
        let w = inner.width.saturating_sub(2);
        let text = palette.text();

        let heading = if self.signup {
            "Create an account"
        } else {
            "Login to continue"
        };
        frame.set_string(x, inner.y, heading, text.add_modifier(Modifier::BOLD));
        frame.set_string(x, inner.y + 2, "Username", text);
        let user_rect = Rect::new(x, inner.y + 3, w, 1);
        self.username.render(
            frame,
            user_rect,
            &ComponentContext::new(self.field == Field::Username).with_palette(*palette),
        );
        frame.set_string(x, inner.y + 4, "Password", text);
        let pass_rect = Rect::new(x, inner.y + 5, w, 1);
        self.password.render(
            frame,
            pass_rect,
            &ComponentContext::new(self.field == Field::Password).with_palette(*palette),
        );

        self.buttons.set_active(Some(usize::from(self.signup)));
        let bar = Rect::new(x, inner.y + 7, w, 1);
        self.buttons
            .render(frame, bar, &ComponentContext::new(false).with_palette(*palette));

        let hint_y = inner.y + 8;
        match &self.message {
            Some((msg, is_error)) => {
                let color = if *is_error { palette.close } else { palette.success };
                frame.set_string(x, hint_y, msg, text.fg(color));
            }
            None => frame.set_string(
                x,
                hint_y,
                "F2 switches login / sign up",
                text.add_modifier(Modifier::DIM),
            ),
        }
    }
}

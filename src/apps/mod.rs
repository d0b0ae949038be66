//! Hosted applications and the contract between them and the shell.
//!
//! An application never touches the shell directly. It reads shared state
//! through [`RenderContext`], mutates the [`Session`] and schedules timers
//! through [`AppContext`], and asks the shell for anything else (launching,
//! installing, closing, notices) by pushing a [`ShellRequest`].

pub mod calculator;
pub mod contacts;
pub mod explorer;
pub mod notes;
pub mod settings;
pub mod store;
pub mod system_log;
pub mod terminal;
pub mod tictactoe;
pub mod video_call;
pub mod whiteboard;

use std::rc::Rc;
use std::time::Instant;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::Rect;

use crate::components::ComponentContext;
use crate::launcher::Launcher;
use crate::scheduler::{Scheduler, TaskId};
use crate::session::Session;
use crate::theme::Palette;
use crate::ui::UiFrame;
use crate::window::WindowId;

pub use calculator::CalculatorApp;
pub use contacts::ContactsApp;
pub use explorer::ExplorerApp;
pub use notes::NotesApp;
pub use settings::SettingsApp;
pub use store::StoreApp;
pub use system_log::SystemLogApp;
pub use terminal::{TerminalApp, TerminalFlavor};
pub use tictactoe::TicTacToeApp;
pub use video_call::VideoCallApp;
pub use whiteboard::WhiteboardApp;

/// Effects an application cannot perform on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    /// Open a new window for the given app id.
    Launch(String),
    /// Install a catalog app and add it to the dock.
    Install(String),
    Close(WindowId),
    /// Show a transient message in the status bar.
    Notify(String),
    /// Close every window and return to the login screen.
    Restart,
    Quit,
}

/// Read-only view handed to [`App::render`].
pub struct RenderContext<'a> {
    pub session: &'a Session,
    pub launcher: &'a Launcher,
    pub palette: &'a Palette,
    pub focused: bool,
}

impl RenderContext<'_> {
    /// Component context for a child widget; `child_focused` only counts
    /// while the window itself has focus.
    pub fn component(&self, child_focused: bool) -> ComponentContext {
        ComponentContext::new(self.focused && child_focused).with_palette(*self.palette)
    }
}

/// Mutable view handed to event, timer and close callbacks.
pub struct AppContext<'a> {
    pub session: &'a mut Session,
    pub scheduler: &'a Scheduler,
    pub window: WindowId,
    pub requests: &'a mut Vec<ShellRequest>,
    pub now: Instant,
}

impl AppContext<'_> {
    pub fn request(&mut self, request: ShellRequest) {
        self.requests.push(request);
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.requests.push(ShellRequest::Notify(message.into()));
    }
}

/// Ctrl+`c`, as typed.
pub(crate) fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// A hosted application.
///
/// Each window renders into its own buffer; `area` is the content region of
/// that buffer and mouse events arrive in the same coordinate space, so a
/// rect recorded during `render` can be hit-tested directly.
pub trait App {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>);

    fn handle_event(&mut self, _event: &Event, _ctx: &mut AppContext<'_>) -> bool {
        false
    }

    /// A repeating task owned by this window fired.
    fn on_timer(&mut self, _task: TaskId, _ctx: &mut AppContext<'_>) {}

    /// The window is being torn down. Timers owned by the window are
    /// cancelled by the shell right after this returns.
    fn on_close(&mut self, _ctx: &mut AppContext<'_>) {}
}

pub type AppFactory = Rc<dyn Fn() -> Box<dyn App>>;

/// Static description of an application the shell knows how to build.
#[derive(Clone)]
pub struct AppDescriptor {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub factory: AppFactory,
}

impl std::fmt::Debug for AppDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

fn descriptor<A, F>(
    id: &'static str,
    label: &'static str,
    icon: &'static str,
    description: &'static str,
    build: F,
) -> AppDescriptor
where
    A: App + 'static,
    F: Fn() -> A + 'static,
{
    AppDescriptor {
        id,
        label,
        icon,
        description,
        factory: Rc::new(move || Box::new(build()) as Box<dyn App>),
    }
}

pub mod ids {
    pub const NOTES: &str = "notes";
    pub const CALCULATOR: &str = "calculator";
    pub const TERMINAL: &str = "terminal";
    pub const TERMINAL_PLUS: &str = "terminal_plus";
    pub const STORE: &str = "store";
    pub const EXPLORER: &str = "file_explorer";
    pub const CONTACTS: &str = "contacts";
    pub const VIDEO_CALL: &str = "video_call";
    pub const SETTINGS: &str = "settings";
    pub const WHITEBOARD: &str = "whiteboard";
    pub const TICTACTOE: &str = "tictactoe";
    pub const SYSTEM_LOG: &str = "system_log";
}

/// Every application the shell can build, keyed by id.
pub fn builtin(id: &str) -> Option<AppDescriptor> {
    let d = match id {
        ids::NOTES => descriptor(
            ids::NOTES,
            "Notes",
            "✎",
            "Write and keep short notes.",
            NotesApp::new,
        ),
        ids::CALCULATOR => descriptor(
            ids::CALCULATOR,
            "Calculator",
            "±",
            "Scientific calculator with history.",
            CalculatorApp::new,
        ),
        ids::TERMINAL => descriptor(ids::TERMINAL, "Terminal", ">", "Simulated shell.", || {
            TerminalApp::new(TerminalFlavor::Basic)
        }),
        ids::TERMINAL_PLUS => descriptor(
            ids::TERMINAL_PLUS,
            "Terminal++",
            "»",
            "Enhanced terminal with extra commands.",
            || TerminalApp::new(TerminalFlavor::Plus),
        ),
        ids::STORE => descriptor(
            ids::STORE,
            "Store",
            "$",
            "Install more applications.",
            StoreApp::new,
        ),
        ids::EXPLORER => descriptor(
            ids::EXPLORER,
            "File Explorer",
            "▤",
            "Browse the virtual filesystem.",
            ExplorerApp::new,
        ),
        ids::CONTACTS => descriptor(
            ids::CONTACTS,
            "Contacts",
            "☺",
            "Manage your contacts (create/edit/delete).",
            ContactsApp::new,
        ),
        ids::VIDEO_CALL => descriptor(
            ids::VIDEO_CALL,
            "Video Call",
            "◉",
            "Simulated video call UI with mute/camera buttons.",
            VideoCallApp::new,
        ),
        ids::SETTINGS => descriptor(
            ids::SETTINGS,
            "Settings",
            "⚙",
            "Desktop preferences.",
            SettingsApp::new,
        ),
        ids::WHITEBOARD => descriptor(
            ids::WHITEBOARD,
            "Whiteboard Pro+Mega",
            "✐",
            "Advanced whiteboard for drawing and notes.",
            WhiteboardApp::new,
        ),
        ids::TICTACTOE => descriptor(
            ids::TICTACTOE,
            "Tic-Tac-Toe",
            "#",
            "Classic tic-tac-toe game.",
            TicTacToeApp::new,
        ),
        ids::SYSTEM_LOG => descriptor(
            ids::SYSTEM_LOG,
            "System Log",
            "≡",
            "Live view of the desktop log.",
            SystemLogApp::from_global,
        ),
        _ => return None,
    };
    Some(d)
}

/// Dock contents at startup, left to right.
pub const PREINSTALLED: [&str; 8] = [
    ids::NOTES,
    ids::CALCULATOR,
    ids::TERMINAL,
    ids::STORE,
    ids::EXPLORER,
    ids::CONTACTS,
    ids::VIDEO_CALL,
    ids::SETTINGS,
];

/// Store catalog in display order.
pub const CATALOG: [&str; 6] = [
    ids::WHITEBOARD,
    ids::TICTACTOE,
    ids::TERMINAL_PLUS,
    ids::CONTACTS,
    ids::VIDEO_CALL,
    ids::SYSTEM_LOG,
];

/// Catalog entries that count as installed from the start.
pub const CATALOG_PREINSTALLED: [&str; 2] = [ids::CONTACTS, ids::VIDEO_CALL];

/// Drives a single app without a shell around it.
#[cfg(test)]
pub(crate) mod testing {
    use std::time::Instant;

    use crossterm::event::{
        Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    };
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    use super::{App, AppContext, RenderContext, ShellRequest};
    use crate::launcher::Launcher;
    use crate::scheduler::Scheduler;
    use crate::session::Session;
    use crate::theme::Palette;
    use crate::ui::UiFrame;
    use crate::window::WindowId;

    pub struct Harness {
        pub session: Session,
        pub scheduler: Scheduler,
        pub requests: Vec<ShellRequest>,
        pub launcher: Launcher,
        pub palette: Palette,
        pub now: Instant,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                session: Session::with_user("tester"),
                scheduler: Scheduler::new(),
                requests: Vec::new(),
                launcher: Launcher::with_defaults(),
                palette: Palette::default(),
                now: Instant::now(),
            }
        }

        pub fn ctx(&mut self) -> AppContext<'_> {
            AppContext {
                session: &mut self.session,
                scheduler: &self.scheduler,
                window: WindowId::new(1),
                requests: &mut self.requests,
                now: self.now,
            }
        }

        pub fn render(&self, app: &mut dyn App, width: u16, height: u16) -> Buffer {
            let area = Rect::new(0, 0, width, height);
            let mut buffer = Buffer::empty(area);
            let ctx = RenderContext {
                session: &self.session,
                launcher: &self.launcher,
                palette: &self.palette,
                focused: true,
            };
            app.render(&mut UiFrame::from_parts(area, &mut buffer), area, &ctx);
            buffer
        }

        pub fn event(&mut self, app: &mut dyn App, event: Event) -> bool {
            let mut ctx = self.ctx();
            app.handle_event(&event, &mut ctx)
        }

        pub fn key(&mut self, app: &mut dyn App, code: KeyCode) -> bool {
            self.event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        }

        pub fn ctrl(&mut self, app: &mut dyn App, c: char) -> bool {
            self.event(
                app,
                Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
            )
        }

        pub fn type_str(&mut self, app: &mut dyn App, text: &str) {
            for c in text.chars() {
                self.key(app, KeyCode::Char(c));
            }
        }

        pub fn mouse(
            &mut self,
            app: &mut dyn App,
            kind: MouseEventKind,
            column: u16,
            row: u16,
        ) -> bool {
            self.event(
                app,
                Event::Mouse(MouseEvent {
                    kind,
                    column,
                    row,
                    modifiers: KeyModifiers::NONE,
                }),
            )
        }

        pub fn click(&mut self, app: &mut dyn App, column: u16, row: u16) -> bool {
            self.mouse(app, MouseEventKind::Down(MouseButton::Left), column, row)
        }

        pub fn take_requests(&mut self) -> Vec<ShellRequest> {
            std::mem::take(&mut self.requests)
        }

        pub fn notices(&mut self) -> Vec<String> {
            self.take_requests()
                .into_iter()
                .filter_map(|r| match r {
                    ShellRequest::Notify(msg) => Some(msg),
                    _ => None,
                })
                .collect()
        }
    }

    /// Buffer rows joined with newlines, trailing blanks trimmed.
    pub fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Position of the first cell where `needle` starts.
    pub fn find(buffer: &Buffer, needle: &str) -> Option<(u16, u16)> {
        let text = buffer_text(buffer);
        text.lines().enumerate().find_map(|(y, line)| {
            line.find(needle).map(|byte| {
                let x = line[..byte].chars().count();
                (x as u16, y as u16)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_id_has_a_builtin() {
        for id in PREINSTALLED.iter().chain(CATALOG.iter()) {
            let d = builtin(id).unwrap_or_else(|| panic!("missing builtin {id}"));
            assert_eq!(d.id, *id);
        }
        assert!(builtin("nope").is_none());
    }
}

use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use term_desk::apps::ids;
use term_desk::session::Session;
use term_desk::shell::DesktopShell;
use term_desk::ui::UiFrame;
use term_desk::window::WindowState;

const WIDTH: u16 = 120;
const HEIGHT: u16 = 40;
const DOCK_ROW: u16 = HEIGHT - 2;
const TASKBAR_ROW: u16 = HEIGHT - 1;

struct Desk {
    shell: DesktopShell,
    terminal: Terminal<TestBackend>,
    now: Instant,
}

impl Desk {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            shell: DesktopShell::new(
                Session::with_user("ada"),
                Rect::new(0, 0, WIDTH, HEIGHT),
                now,
            ),
            terminal: Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap(),
            now,
        }
    }

    fn draw(&mut self) -> Buffer {
        let shell = &mut self.shell;
        self.terminal
            .draw(|frame| shell.render(&mut UiFrame::new(frame)))
            .unwrap();
        self.terminal.backend().buffer().clone()
    }

    fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        self.shell.tick(self.now);
    }

    fn send(&mut self, event: Event) -> bool {
        self.shell.handle_event(&event, self.now)
    }

    fn mouse(&mut self, kind: MouseEventKind, column: u16, row: u16) -> bool {
        self.send(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn click(&mut self, column: u16, row: u16) -> bool {
        self.draw();
        let handled = self.mouse(MouseEventKind::Down(MouseButton::Left), column, row);
        self.mouse(MouseEventKind::Up(MouseButton::Left), column, row);
        handled
    }

    fn key(&mut self, code: KeyCode) -> bool {
        self.send(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }
}

fn text(buffer: &Buffer) -> String {
    let area = buffer.area;
    (area.y..area.bottom())
        .map(|y| {
            (area.x..area.right())
                .map(|x| buffer[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn row(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect()
}

#[test]
fn notes_minimize_and_restore_through_the_taskbar() {
    let mut desk = Desk::new();
    // first dock entry is Notes
    assert!(desk.click(3, DOCK_ROW));
    assert_eq!(desk.shell.taskbar_labels(), vec!["Notes"]);
    let id = desk.shell.window_ids()[0];

    // minimize control on the title bar
    let bounds = desk.shell.window(id).unwrap().bounds();
    let minimize_x = (bounds.x + i32::from(bounds.width) - 8) as u16;
    desk.click(minimize_x, bounds.y as u16);
    assert_eq!(desk.shell.taskbar_labels(), vec!["Notes (minimized)"]);
    assert!(row(&desk.draw(), TASKBAR_ROW).contains("[ Notes (minimized) ]"));

    desk.click(3, TASKBAR_ROW);
    let window = desk.shell.window(id).unwrap();
    assert!(window.is_visible());
    assert_eq!(window.state(), WindowState::Normal);
    assert_eq!(desk.shell.taskbar_labels(), vec!["Notes"]);
    assert_eq!(desk.shell.focused(), Some(id));
}

#[test]
fn dragging_the_title_bar_moves_by_the_pointer_delta() {
    let mut desk = Desk::new();
    let id = desk.shell.launch(ids::CALCULATOR).unwrap();
    desk.draw();
    let start = desk.shell.window(id).unwrap().bounds();
    let (x, y) = ((start.x + 6) as u16, start.y as u16);
    desk.mouse(MouseEventKind::Down(MouseButton::Left), x, y);
    desk.mouse(MouseEventKind::Drag(MouseButton::Left), x + 20, y + 7);
    desk.mouse(MouseEventKind::Drag(MouseButton::Left), x + 9, y + 4);
    desk.mouse(MouseEventKind::Up(MouseButton::Left), x + 9, y + 4);
    let end = desk.shell.window(id).unwrap().bounds();
    assert_eq!((end.x - start.x, end.y - start.y), (9, 4));
    assert_eq!((end.width, end.height), (start.width, start.height));
}

#[test]
fn double_click_on_title_bar_toggles_maximize() {
    let mut desk = Desk::new();
    let id = desk.shell.launch(ids::NOTES).unwrap();
    let start = desk.shell.window(id).unwrap().bounds();
    let (x, y) = ((start.x + 6) as u16, start.y as u16);

    desk.click(x, y);
    desk.advance(100);
    desk.click(x, y);
    assert_eq!(
        desk.shell.window(id).unwrap().state(),
        WindowState::Maximized
    );
    let max = desk.shell.window(id).unwrap().bounds();
    let desktop = desk.shell.desktop_area();
    assert_eq!(max.y, i32::from(desktop.y) + 1);
    assert_eq!(max.height, desktop.height - 2);

    // too slow for a double click: the second press only starts a drag
    desk.advance(1000);
    desk.click((max.x + 6) as u16, max.y as u16);
    desk.advance(1000);
    desk.click((max.x + 6) as u16, max.y as u16);
    assert_eq!(
        desk.shell.window(id).unwrap().state(),
        WindowState::Maximized
    );

    desk.shell.toggle_maximize(id);
    assert_eq!(desk.shell.window(id).unwrap().bounds(), start);
}

#[test]
fn close_control_removes_window_and_entry() {
    let mut desk = Desk::new();
    let a = desk.shell.launch(ids::NOTES).unwrap();
    let b = desk.shell.launch(ids::SETTINGS).unwrap();
    let bounds = desk.shell.window(b).unwrap().bounds();
    let close_x = (bounds.x + i32::from(bounds.width) - 2) as u16;
    desk.click(close_x, bounds.y as u16);
    assert!(desk.shell.window(b).is_none());
    assert_eq!(desk.shell.taskbar_labels(), vec!["Notes"]);
    assert_eq!(desk.shell.focused(), Some(a));
    assert!(!row(&desk.draw(), TASKBAR_ROW).contains("Settings"));
}

#[test]
fn store_install_adds_dock_entry_and_notice() {
    let mut desk = Desk::new();
    desk.shell.launch(ids::STORE).unwrap();
    desk.draw();
    desk.key(KeyCode::Down);
    desk.key(KeyCode::Enter);
    assert_eq!(
        desk.shell.notice(),
        Some("'Tic-Tac-Toe' has been installed!")
    );
    assert!(desk.shell.launcher().dock().contains(ids::TICTACTOE));
    assert!(row(&desk.draw(), 0).contains("'Tic-Tac-Toe' has been installed!"));

    desk.key(KeyCode::Enter);
    assert_eq!(
        desk.shell.notice(),
        Some("'Tic-Tac-Toe' is already installed.")
    );

    desk.advance(5000);
    assert_eq!(desk.shell.notice(), None);
}

#[test]
fn terminal_restart_returns_to_login() {
    let mut desk = Desk::new();
    desk.shell.launch(ids::NOTES).unwrap();
    desk.shell.launch(ids::TERMINAL).unwrap();
    desk.type_str("restart");
    desk.key(KeyCode::Enter);
    assert!(desk.shell.window_ids().is_empty());
    assert!(desk.shell.login_visible());
    assert!(text(&desk.draw()).contains("term-desk - Login"));

    // keys now go to the login overlay, not to any window
    desk.type_str("demo");
    desk.key(KeyCode::Tab);
    desk.type_str("demo");
    desk.key(KeyCode::Enter);
    assert!(!desk.shell.login_visible());
    assert_eq!(desk.shell.session().user(), Some("demo"));
    assert_eq!(desk.shell.notice(), Some("Welcome, demo!"));
}

#[test]
fn video_call_timers_stop_when_the_window_closes() {
    use term_desk::scheduler::TaskOwner;

    let mut desk = Desk::new();
    desk.shell
        .session_mut()
        .add_contact("Bob", "@bob")
        .unwrap();
    let id = desk.shell.launch(ids::VIDEO_CALL).unwrap();
    desk.draw();
    desk.key(KeyCode::Enter);
    assert_eq!(desk.shell.scheduler().count_for(TaskOwner::Window(id)), 3);
    desk.advance(1000);
    desk.advance(1000);
    assert!(text(&desk.draw()).contains("On call with Bob"));

    desk.shell.close_window(id);
    assert_eq!(desk.shell.scheduler().count_for(TaskOwner::Window(id)), 0);
    desk.advance(1000);
    assert!(desk.shell.window(id).is_none());
}

#[test]
fn taskbar_tracks_registration_order_under_mixed_operations() {
    let mut desk = Desk::new();
    let apps = [ids::NOTES, ids::CALCULATOR, ids::TERMINAL, ids::SETTINGS];
    let mut model: Vec<(term_desk::window::WindowId, String, bool)> = Vec::new();
    // small LCG so the sequence is fixed but not hand-picked
    let mut seed: u32 = 7;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let pick = (seed >> 16) as usize;
        match pick % 4 {
            0 | 1 if model.len() < 6 => {
                let app = apps[pick % apps.len()];
                let id = desk.shell.launch(app).unwrap();
                let title = desk.shell.window(id).unwrap().title().to_string();
                model.push((id, title, false));
            }
            2 if !model.is_empty() => {
                let i = pick % model.len();
                desk.shell.activate_taskbar_entry(model[i].0);
                model[i].2 = !model[i].2;
            }
            _ if !model.is_empty() => {
                let i = pick % model.len();
                let (id, _, _) = model.remove(i);
                assert!(desk.shell.close_window(id));
            }
            _ => {}
        }
        let expected: Vec<String> = model
            .iter()
            .map(|(_, title, minimized)| {
                if *minimized {
                    format!("{title} (minimized)")
                } else {
                    title.clone()
                }
            })
            .collect();
        assert_eq!(desk.shell.taskbar_labels(), expected);
    }
}

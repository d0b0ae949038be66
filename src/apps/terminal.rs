use crossterm::event::{Event, KeyCode, MouseEventKind};
use indoc::indoc;
use ratatui::layout::Rect;

use super::{App, AppContext, RenderContext, ShellRequest};
use crate::components::{Component, ComponentContext, TextInputComponent};
use crate::ui::UiFrame;
use crate::vfs::VfsPath;

const BASIC_HELP: &str = indoc! {"
    Commands:
    help - Show help
    sysinfo - Show system info
    whoami - Show user
    clear - Clear terminal
    sleep - Sleep mode
    restart - Log out and restart
    shutdown - Shut down
"};

const PLUS_HELP: &str = indoc! {"
    dir, ls - List the current folder
    cd <folder> - Change folder ('..' goes up)
    open, cat <file> - Print a file
"};

const SCROLLBACK: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalFlavor {
    Basic,
    /// Adds filesystem commands against the session tree.
    Plus,
}

/// Line-oriented simulated shell.
pub struct TerminalApp {
    flavor: TerminalFlavor,
    output: Vec<String>,
    input: TextInputComponent,
    cwd: VfsPath,
    // lines scrolled up from the bottom
    scroll: usize,
    history: Vec<String>,
    history_pos: Option<usize>,
    view_rows: usize,
}

impl TerminalApp {
    pub fn new(flavor: TerminalFlavor) -> Self {
        let mut app = Self {
            flavor,
            output: Vec::new(),
            input: TextInputComponent::new(),
            cwd: VfsPath::root().join("home"),
            scroll: 0,
            history: Vec::new(),
            history_pos: None,
            view_rows: 0,
        };
        match flavor {
            TerminalFlavor::Basic => app.print("Welcome to the Terminal!"),
            TerminalFlavor::Plus => app.print("Terminal++ (simulated filesystem)"),
        }
        app.print("Type 'help' for commands.");
        app
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn cwd(&self) -> &VfsPath {
        &self.cwd
    }

    fn prompt(&self) -> String {
        match self.flavor {
            TerminalFlavor::Basic => "> ".to_string(),
            TerminalFlavor::Plus => format!("{}> ", self.cwd),
        }
    }

    fn print(&mut self, text: impl AsRef<str>) {
        for line in text.as_ref().split('\n') {
            self.output.push(line.to_string());
        }
        if self.output.len() > SCROLLBACK {
            let excess = self.output.len() - SCROLLBACK;
            self.output.drain(..excess);
        }
        self.scroll = 0;
    }

    fn submit(&mut self, ctx: &mut AppContext<'_>) {
        let line = self.input.take().trim().to_string();
        let prompt = self.prompt();
        self.print(format!("{prompt}{line}"));
        self.history_pos = None;
        if !line.is_empty() {
            self.history.push(line.clone());
        }
        self.execute(&line, ctx);
    }

    /// Run one command line.
    pub fn execute(&mut self, line: &str, ctx: &mut AppContext<'_>) {
        let args = match shell_words::split(line) {
            Ok(args) => args,
            Err(err) => {
                self.print(format!("Parse error: {err}"));
                return;
            }
        };
        let Some((base, rest)) = args.split_first() else {
            return;
        };
        let base = base.to_lowercase();
        tracing::debug!(command = %base, window_id = ?ctx.window, "terminal command");
        match base.as_str() {
            "help" => self.help(),
            "sysinfo" => {
                let now = chrono::Local::now();
                self.print(format!("{} Terminal v1.0", crate::constants::DESKTOP_NAME));
                self.print(format!("User: {}", ctx.session.display_user()));
                self.print(format!("Time: {}", now.format("%Y-%m-%d %H:%M:%S")));
            }
            "whoami" => self.print(format!("User: {}", ctx.session.display_user())),
            "clear" => {
                self.output.clear();
                self.scroll = 0;
            }
            "sleep" => self.print("Sleep mode (simulated)..."),
            "restart" => {
                self.print("Restarting...");
                ctx.request(ShellRequest::Restart);
            }
            "shutdown" => {
                self.print("Shutting down...");
                ctx.request(ShellRequest::Quit);
            }
            "dir" | "ls" if self.flavor == TerminalFlavor::Plus => self.dir(ctx),
            "cd" if self.flavor == TerminalFlavor::Plus => self.cd(rest, ctx),
            "open" | "cat" if self.flavor == TerminalFlavor::Plus => self.open(rest, ctx),
            _ => self.print(format!("Unknown command: {line}")),
        }
    }

    fn help(&mut self) {
        self.print(BASIC_HELP.trim_end());
        if self.flavor == TerminalFlavor::Plus {
            self.print(PLUS_HELP.trim_end());
        }
    }

    fn dir(&mut self, ctx: &AppContext<'_>) {
        match ctx.session.fs.list(&self.cwd) {
            Ok(entries) => {
                let lines: Vec<String> = entries
                    .iter()
                    .map(|e| {
                        if e.is_folder {
                            format!("- {}/", e.name)
                        } else {
                            format!("- {}", e.name)
                        }
                    })
                    .collect();
                for line in lines {
                    self.print(line);
                }
            }
            Err(err) => self.print(err.to_string()),
        }
    }

    fn cd(&mut self, rest: &[String], ctx: &AppContext<'_>) {
        let Some(target) = rest.first() else {
            self.print("Usage: cd <folder>");
            return;
        };
        let next = if target == ".." {
            self.cwd.parent().unwrap_or_else(VfsPath::root)
        } else if target.starts_with('/') {
            match VfsPath::parse(target) {
                Ok(path) => path,
                Err(err) => {
                    self.print(err.to_string());
                    return;
                }
            }
        } else {
            self.cwd.join(target)
        };
        if ctx.session.fs.is_folder(&next) {
            self.cwd = next;
            let msg = format!("Changed directory to {}", self.cwd);
            self.print(msg);
        } else {
            self.print("Folder not found.");
        }
    }

    fn open(&mut self, rest: &[String], ctx: &AppContext<'_>) {
        let Some(file) = rest.first() else {
            self.print("Usage: open <file>");
            return;
        };
        match ctx.session.fs.read_file(&self.cwd, file) {
            Ok(contents) => {
                let text = format!("--- {file} ---\n{contents}");
                self.print(text);
            }
            Err(_) => self.print(format!("File '{file}' not found.")),
        }
    }

    fn recall(&mut self, older: bool) {
        if self.history.is_empty() {
            return;
        }
        let pos = match (self.history_pos, older) {
            (None, true) => self.history.len() - 1,
            (None, false) => return,
            (Some(p), true) => p.saturating_sub(1),
            (Some(p), false) if p + 1 >= self.history.len() => {
                self.history_pos = None;
                self.input.clear();
                return;
            }
            (Some(p), false) => p + 1,
        };
        self.history_pos = Some(pos);
        self.input.set_value(self.history[pos].clone());
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.output.len().saturating_sub(self.view_rows);
        if delta.is_negative() {
            self.scroll = self.scroll.saturating_sub(delta.unsigned_abs());
        } else {
            self.scroll = (self.scroll + delta as usize).min(max);
        }
    }
}

impl App for TerminalApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let style = ctx.palette.entry(false);
        frame.fill(area, style);
        if area.height < 2 || area.width < 4 {
            return;
        }
        let rows = (area.height - 1) as usize;
        self.view_rows = rows;
        let end = self.output.len().saturating_sub(self.scroll);
        let start = end.saturating_sub(rows);
        for (i, line) in self.output[start..end].iter().enumerate() {
            frame.set_string(area.x, area.y + i as u16, line, style);
        }
        let prompt = self.prompt();
        let y = area.bottom() - 1;
        frame.set_string(area.x, y, &prompt, style);
        let offset = prompt.chars().count() as u16;
        let input_rect = Rect::new(
            area.x + offset.min(area.width),
            y,
            area.width.saturating_sub(offset),
            1,
        );
        self.input.render(frame, input_rect, &ctx.component(true));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Enter => {
                    self.submit(ctx);
                    true
                }
                KeyCode::Up => {
                    self.recall(true);
                    true
                }
                KeyCode::Down => {
                    self.recall(false);
                    true
                }
                KeyCode::PageUp => {
                    self.scroll_by(self.view_rows.max(1) as isize);
                    true
                }
                KeyCode::PageDown => {
                    self.scroll_by(-(self.view_rows.max(1) as isize));
                    true
                }
                _ => self.input.handle_event(event, &ComponentContext::default()),
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => {
                    self.scroll_by(3);
                    true
                }
                MouseEventKind::ScrollDown => {
                    self.scroll_by(-3);
                    true
                }
                _ => self.input.handle_event(event, &ComponentContext::default()),
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::Harness;

    fn run(h: &mut Harness, app: &mut TerminalApp, line: &str) {
        h.type_str(app, line);
        h.key(app, KeyCode::Enter);
    }

    #[test]
    fn basic_commands() {
        let mut h = Harness::new();
        let mut app = TerminalApp::new(TerminalFlavor::Basic);
        run(&mut h, &mut app, "whoami");
        assert_eq!(app.output().last().unwrap(), "User: tester");
        run(&mut h, &mut app, "bogus --flag");
        assert_eq!(
            app.output().last().unwrap(),
            "Unknown command: bogus --flag"
        );
        run(&mut h, &mut app, "sysinfo");
        assert!(app.output().last().unwrap().starts_with("Time: "));
        run(&mut h, &mut app, "clear");
        assert!(app.output().is_empty());
    }

    #[test]
    fn filesystem_commands_need_plus() {
        let mut h = Harness::new();
        let mut app = TerminalApp::new(TerminalFlavor::Basic);
        run(&mut h, &mut app, "ls");
        assert_eq!(app.output().last().unwrap(), "Unknown command: ls");
    }

    #[test]
    fn plus_navigates_the_session_tree() {
        let mut h = Harness::new();
        let mut app = TerminalApp::new(TerminalFlavor::Plus);
        assert_eq!(app.cwd().to_string(), "/home");
        run(&mut h, &mut app, "dir");
        assert!(app.output().contains(&"- welcome.txt".to_string()));
        run(&mut h, &mut app, "cat \"welcome.txt\"");
        assert_eq!(app.output().last().unwrap(), "Welcome to term-desk!");
        run(&mut h, &mut app, "cd ..");
        assert_eq!(app.cwd().to_string(), "/");
        run(&mut h, &mut app, "cd nowhere");
        assert_eq!(app.output().last().unwrap(), "Folder not found.");
        run(&mut h, &mut app, "cd /docs");
        assert_eq!(app.output().last().unwrap(), "Changed directory to /docs");
        run(&mut h, &mut app, "open missing.txt");
        assert_eq!(
            app.output().last().unwrap(),
            "File 'missing.txt' not found."
        );
        run(&mut h, &mut app, "cd 'unterminated");
        assert!(app.output().last().unwrap().starts_with("Parse error"));
    }

    #[test]
    fn restart_and_shutdown_reach_the_shell() {
        let mut h = Harness::new();
        let mut app = TerminalApp::new(TerminalFlavor::Basic);
        run(&mut h, &mut app, "restart");
        run(&mut h, &mut app, "SHUTDOWN");
        assert_eq!(
            h.take_requests(),
            vec![ShellRequest::Restart, ShellRequest::Quit]
        );
    }

    #[test]
    fn up_recalls_previous_command() {
        let mut h = Harness::new();
        let mut app = TerminalApp::new(TerminalFlavor::Basic);
        run(&mut h, &mut app, "sleep");
        h.key(&mut app, KeyCode::Up);
        assert_eq!(app.input.value(), "sleep");
        h.key(&mut app, KeyCode::Down);
        assert_eq!(app.input.value(), "");
    }
}

use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;

use super::{App, AppContext, RenderContext, is_ctrl};
use crate::components::{
    ButtonBar, Component, ComponentContext, ListComponent, TextAreaComponent, TextInputComponent,
};
use crate::session::Session;
use crate::ui::{UiFrame, rect_contains};
use crate::vfs::{DirEntry, FsError, VfsPath};

const ACTIONS: [&str; 5] = ["Open", "New File", "New Folder", "Rename", "Delete"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    NewFile,
    NewFolder,
    Rename,
}

impl Prompt {
    fn label(self) -> &'static str {
        match self {
            Prompt::NewFile => "New file name: ",
            Prompt::NewFolder => "New folder name: ",
            Prompt::Rename => "Rename to: ",
        }
    }
}

enum Mode {
    Browse,
    Prompt(Prompt),
    Edit { file: String, editor: TextAreaComponent },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Path,
    List,
}

/// Browser over the session filesystem. Each window keeps its own location
/// and back history.
pub struct ExplorerApp {
    cwd: VfsPath,
    history: Vec<VfsPath>,
    entries: Vec<DirEntry>,
    list: ListComponent,
    path: TextInputComponent,
    name: TextInputComponent,
    nav: ButtonBar,
    actions: ButtonBar,
    editor_bar: ButtonBar,
    mode: Mode,
    focus: Focus,
    list_rect: Rect,
    editor_rect: Rect,
}

impl Default for ExplorerApp {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplorerApp {
    pub fn new() -> Self {
        let cwd = VfsPath::root();
        let mut path = TextInputComponent::new();
        path.set_value(cwd.to_string());
        Self {
            cwd,
            history: Vec::new(),
            entries: Vec::new(),
            list: ListComponent::new("/"),
            path,
            name: TextInputComponent::new(),
            nav: ButtonBar::new(["← Back", "↑ Up", "Go"]),
            actions: ButtonBar::new(ACTIONS),
            editor_bar: ButtonBar::new(["Save", "Close"]),
            mode: Mode::Browse,
            focus: Focus::List,
            list_rect: Rect::default(),
            editor_rect: Rect::default(),
        }
    }

    pub fn cwd(&self) -> &VfsPath {
        &self.cwd
    }

    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(DirEntry::label).collect()
    }

    pub fn editing(&self) -> Option<&str> {
        match &self.mode {
            Mode::Edit { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Re-read the current folder. A folder removed behind our back sends the
    /// window to the root.
    fn refresh(&mut self, session: &Session) {
        self.entries = match session.fs.list(&self.cwd) {
            Ok(entries) => entries,
            Err(_) => {
                self.cwd = VfsPath::root();
                session.fs.list(&self.cwd).unwrap_or_default()
            }
        };
        self.list.set_items(self.labels());
        self.list.set_title(self.cwd.to_string());
    }

    fn navigate(&mut self, to: VfsPath, session: &Session) {
        let from = std::mem::replace(&mut self.cwd, to);
        self.history.push(from);
        self.list.set_selected(0);
        self.path.set_value(self.cwd.to_string());
        tracing::debug!(path = %self.cwd, "explorer navigated");
        self.refresh(session);
    }

    fn selected(&mut self, session: &Session) -> Option<DirEntry> {
        self.refresh(session);
        self.entries.get(self.list.selected()).cloned()
    }

    fn back(&mut self, ctx: &mut AppContext<'_>) {
        match self.history.pop() {
            Some(previous) => {
                self.cwd = previous;
                self.path.set_value(self.cwd.to_string());
                self.refresh(ctx.session);
            }
            None => ctx.notify("No back history."),
        }
    }

    fn up(&mut self, ctx: &mut AppContext<'_>) {
        match self.cwd.parent() {
            Some(parent) => self.navigate(parent, ctx.session),
            None => ctx.notify("Already at root folder."),
        }
    }

    fn go_to_path(&mut self, ctx: &mut AppContext<'_>) {
        let target = match VfsPath::parse(self.path.value()) {
            Ok(target) => target,
            Err(err) => {
                ctx.notify(err.to_string());
                return;
            }
        };
        if ctx.session.fs.is_folder(&target) {
            self.navigate(target, ctx.session);
            self.focus = Focus::List;
        } else {
            ctx.notify(FsError::NotFound.to_string());
        }
    }

    fn open(&mut self, ctx: &mut AppContext<'_>) {
        let Some(entry) = self.selected(ctx.session) else {
            ctx.notify("Select a file or folder.");
            return;
        };
        if entry.is_folder {
            let next = self.cwd.join(&entry.name);
            self.navigate(next, ctx.session);
            return;
        }
        match ctx.session.fs.read_file(&self.cwd, &entry.name) {
            Ok(content) => {
                let mut editor = TextAreaComponent::new();
                editor.set_text(content);
                self.mode = Mode::Edit {
                    file: entry.name,
                    editor,
                };
            }
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn save_file(&mut self, ctx: &mut AppContext<'_>) {
        let Mode::Edit { file, editor } = &self.mode else {
            return;
        };
        match ctx.session.fs.write_file(&self.cwd, file, &editor.text()) {
            Ok(()) => {
                ctx.notify(format!("File '{file}' saved."));
                self.mode = Mode::Browse;
                self.refresh(ctx.session);
            }
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn begin_prompt(&mut self, prompt: Prompt, ctx: &mut AppContext<'_>) {
        self.name.clear();
        if prompt == Prompt::Rename {
            match self.selected(ctx.session) {
                Some(entry) => self.name.set_value(entry.name),
                None => {
                    ctx.notify("Select a file or folder to rename.");
                    return;
                }
            }
        }
        self.mode = Mode::Prompt(prompt);
    }

    fn finish_prompt(&mut self, prompt: Prompt, ctx: &mut AppContext<'_>) {
        let name = self.name.value().trim().to_string();
        if name.is_empty() {
            self.mode = Mode::Browse;
            return;
        }
        let result = match prompt {
            Prompt::NewFile => ctx.session.fs.create_file(&self.cwd, &name),
            Prompt::NewFolder => ctx.session.fs.create_folder(&self.cwd, &name),
            Prompt::Rename => match self.selected(ctx.session) {
                Some(entry) if entry.name == name => Ok(()),
                Some(entry) => ctx.session.fs.rename(&self.cwd, &entry.name, &name),
                None => Err(FsError::NotFound),
            },
        };
        match result {
            Ok(()) => {
                self.mode = Mode::Browse;
                self.refresh(ctx.session);
                if let Some(index) = self.entries.iter().position(|e| e.name == name) {
                    self.list.set_selected(index);
                }
            }
            Err(FsError::AlreadyExists) if prompt == Prompt::Rename => {
                ctx.notify("Name already exists.")
            }
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn delete(&mut self, ctx: &mut AppContext<'_>) {
        let Some(entry) = self.selected(ctx.session) else {
            ctx.notify("Select a file or folder to delete.");
            return;
        };
        match ctx.session.fs.remove(&self.cwd, &entry.name) {
            Ok(()) => {
                ctx.notify(format!("Deleted '{}'.", entry.name));
                self.refresh(ctx.session);
            }
            Err(err) => ctx.notify(err.to_string()),
        }
    }

    fn run_action(&mut self, index: usize, ctx: &mut AppContext<'_>) {
        match index {
            0 => self.open(ctx),
            1 => self.begin_prompt(Prompt::NewFile, ctx),
            2 => self.begin_prompt(Prompt::NewFolder, ctx),
            3 => self.begin_prompt(Prompt::Rename, ctx),
            _ => self.delete(ctx),
        }
    }

    fn run_nav(&mut self, index: usize, ctx: &mut AppContext<'_>) {
        match index {
            0 => self.back(ctx),
            1 => self.up(ctx),
            _ => self.go_to_path(ctx),
        }
    }

    fn handle_edit(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        if let Some(index) = self.editor_bar.clicked(event) {
            if index == 0 {
                self.save_file(ctx);
            } else {
                self.mode = Mode::Browse;
            }
            return true;
        }
        if let Event::Key(key) = event {
            if is_ctrl(key, 's') {
                self.save_file(ctx);
                return true;
            }
            if key.code == KeyCode::Esc {
                self.mode = Mode::Browse;
                return true;
            }
        }
        if let Event::Mouse(mouse) = event
            && !rect_contains(self.editor_rect, mouse.column, mouse.row)
        {
            return false;
        }
        match &mut self.mode {
            Mode::Edit { editor, .. } => editor.handle_event(event, &ComponentContext::default()),
            _ => false,
        }
    }

    fn handle_prompt(&mut self, prompt: Prompt, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        let Event::Key(key) = event else {
            return self.name.handle_event(event, &ComponentContext::default());
        };
        match key.code {
            KeyCode::Enter => self.finish_prompt(prompt, ctx),
            KeyCode::Esc => self.mode = Mode::Browse,
            _ => return self.name.handle_event(event, &ComponentContext::default()),
        }
        true
    }

    fn handle_browse(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        let inner = ComponentContext::default();
        if let Some(index) = self.nav.clicked(event) {
            self.run_nav(index, ctx);
            return true;
        }
        if let Some(index) = self.actions.clicked(event) {
            self.run_action(index, ctx);
            return true;
        }
        match event {
            Event::Key(key) => {
                if key.code == KeyCode::Tab {
                    self.focus = match self.focus {
                        Focus::Path => Focus::List,
                        Focus::List => Focus::Path,
                    };
                    return true;
                }
                match self.focus {
                    Focus::Path => {
                        if key.code == KeyCode::Enter {
                            self.go_to_path(ctx);
                            return true;
                        }
                        self.path.handle_event(event, &inner)
                    }
                    Focus::List => match key.code {
                        KeyCode::Enter => {
                            self.open(ctx);
                            true
                        }
                        KeyCode::Backspace => {
                            self.back(ctx);
                            true
                        }
                        KeyCode::Delete => {
                            self.delete(ctx);
                            true
                        }
                        KeyCode::F(2) => {
                            self.begin_prompt(Prompt::Rename, ctx);
                            true
                        }
                        _ => self.list.handle_event(event, &inner),
                    },
                }
            }
            Event::Mouse(mouse) => {
                let down = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
                if self.path.contains(mouse.column, mouse.row) {
                    if down {
                        self.focus = Focus::Path;
                    }
                    return self.path.handle_event(event, &inner);
                }
                if rect_contains(self.list_rect, mouse.column, mouse.row) {
                    if down {
                        self.focus = Focus::List;
                    }
                    return self.list.handle_event(event, &inner);
                }
                false
            }
            _ => false,
        }
    }
}

impl App for ExplorerApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 5 || area.width < 20 {
            return;
        }
        self.refresh(ctx.session);

        if let Mode::Edit { file, editor } = &mut self.mode {
            frame.set_string(area.x, area.y, &format!("Editing: {file}"), palette.text());
            self.editor_rect = Rect::new(area.x, area.y + 1, area.width, area.height - 2);
            editor.render(frame, self.editor_rect, &ctx.component(true));
            let bar = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            self.editor_bar.render(frame, bar, &ctx.component(false));
            return;
        }

        let nav = Rect::new(area.x, area.y, area.width, 1);
        self.nav.render(frame, nav, &ctx.component(false));
        let path_x = area.x + self.nav.width() + 1;
        let path_rect = Rect::new(path_x, area.y, area.right().saturating_sub(path_x), 1);
        self.path
            .render(frame, path_rect, &ctx.component(self.focus == Focus::Path));

        let mut list_height = area.height - 2;
        if let Mode::Prompt(prompt) = self.mode {
            list_height -= 1;
            let y = area.bottom() - 2;
            let label = prompt.label();
            frame.set_string(area.x, y, label, palette.text());
            let x = area.x + label.chars().count() as u16;
            let rect = Rect::new(x, y, area.right().saturating_sub(x), 1);
            self.name.render(frame, rect, &ctx.component(true));
        }
        self.list_rect = Rect::new(area.x, area.y + 1, area.width, list_height);
        let list_focused = self.focus == Focus::List && matches!(self.mode, Mode::Browse);
        self.list
            .render(frame, self.list_rect, &ctx.component(list_focused));

        let bar = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        self.actions.render(frame, bar, &ctx.component(false));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        match self.mode {
            Mode::Edit { .. } => self.handle_edit(event, ctx),
            Mode::Prompt(prompt) => self.handle_prompt(prompt, event, ctx),
            Mode::Browse => self.handle_browse(event, ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::{Harness, find};

    fn select(app: &mut ExplorerApp, label: &str) {
        let index = app.labels().iter().position(|l| l == label).unwrap();
        app.list.set_selected(index);
    }

    #[test]
    fn lists_folders_first_and_opens_them() {
        let mut h = Harness::new();
        let mut app = ExplorerApp::new();
        let buffer = h.render(&mut app, 80, 20);
        assert_eq!(app.labels()[0], "[Folder] Documents");
        assert_eq!(app.labels().last().unwrap(), "Notes.txt");

        select(&mut app, "[Folder] Documents");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(app.cwd().to_string(), "/Documents");
        assert_eq!(app.labels(), ["readme.txt"]);

        let (x, y) = find(&buffer, "[ ← Back ]").unwrap();
        h.click(&mut app, x + 1, y);
        assert!(app.cwd().is_root());
        h.click(&mut app, x + 1, y);
        assert_eq!(h.notices(), vec!["No back history."]);
    }

    #[test]
    fn up_and_go_to_path() {
        let mut h = Harness::new();
        let mut app = ExplorerApp::new();
        h.render(&mut app, 80, 20);
        h.key(&mut app, KeyCode::Tab);
        app.path.clear();
        h.type_str(&mut app, "home");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(h.notices(), vec!["Path must start with '/'"]);

        app.path.set_value("/nowhere");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(h.notices(), vec!["Path does not exist."]);

        app.path.set_value("/home");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(app.cwd().to_string(), "/home");

        let mut ctx = h.ctx();
        app.up(&mut ctx);
        assert!(app.cwd().is_root());
        app.up(&mut ctx);
        assert_eq!(h.notices(), vec!["Already at root folder."]);
    }

    #[test]
    fn edit_and_save_file() {
        let mut h = Harness::new();
        let mut app = ExplorerApp::new();
        h.render(&mut app, 80, 20);
        select(&mut app, "Notes.txt");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(app.editing(), Some("Notes.txt"));
        h.key(&mut app, KeyCode::End);
        h.type_str(&mut app, "!");
        h.ctrl(&mut app, 's');
        assert_eq!(h.notices(), vec!["File 'Notes.txt' saved."]);
        assert_eq!(app.editing(), None);
        assert_eq!(
            h.session.fs.read_file(&VfsPath::root(), "Notes.txt").unwrap(),
            "These are some notes in a text file.!"
        );
    }

    #[test]
    fn create_rename_and_delete() {
        let mut h = Harness::new();
        let mut app = ExplorerApp::new();
        h.render(&mut app, 80, 20);

        let mut ctx = h.ctx();
        app.run_action(2, &mut ctx);
        drop(ctx);
        h.type_str(&mut app, "Projects");
        h.key(&mut app, KeyCode::Enter);
        assert!(app.labels().contains(&"[Folder] Projects".to_string()));

        let mut ctx = h.ctx();
        app.run_action(1, &mut ctx);
        drop(ctx);
        h.type_str(&mut app, "Notes.txt");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(
            h.notices(),
            vec!["File or folder with this name already exists."]
        );
        h.key(&mut app, KeyCode::Esc);

        select(&mut app, "[Folder] Projects");
        h.key(&mut app, KeyCode::F(2));
        app.name.set_value("EmptyFolder");
        h.key(&mut app, KeyCode::Enter);
        assert_eq!(h.notices(), vec!["Name already exists."]);
        app.name.set_value("Work");
        h.key(&mut app, KeyCode::Enter);
        assert!(app.labels().contains(&"[Folder] Work".to_string()));

        select(&mut app, "[Folder] Work");
        h.key(&mut app, KeyCode::Delete);
        assert!(!app.labels().contains(&"[Folder] Work".to_string()));
    }

    #[test]
    fn windows_keep_separate_locations() {
        let mut h = Harness::new();
        let mut a = ExplorerApp::new();
        let mut b = ExplorerApp::new();
        h.render(&mut a, 80, 20);
        h.render(&mut b, 80, 20);
        select(&mut a, "[Folder] home");
        h.key(&mut a, KeyCode::Enter);
        assert_eq!(a.cwd().to_string(), "/home");
        assert!(b.cwd().is_root());
    }
}

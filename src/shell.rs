//! The desktop: owns the session, every hosted window and the chrome around
//! them, and turns input events into window-manager operations.

use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;

use crate::apps::{self, App, AppContext, RenderContext, ShellRequest, ids};
use crate::catalog::{InstallOutcome, StoreError};
use crate::components::{Component, ComponentContext, ConfirmAction, ConfirmOverlayComponent};
use crate::constants::{
    CASCADE_SLOTS, CASCADE_STEP, CLOCK_INTERVAL, DESKTOP_NAME, DOUBLE_CLICK_WINDOW,
    NOTICE_DURATION,
};
use crate::dock::{DockEntry, DockInsert};
use crate::keybindings::{Action, KeyBindings};
use crate::launcher::Launcher;
use crate::login::LoginOverlay;
use crate::panel::{Panel, PanelLayout, StatusLine};
use crate::scheduler::{Scheduler, TaskGuard, TaskId, TaskOwner};
use crate::session::Session;
use crate::taskbar::Taskbar;
use crate::theme::Palette;
use crate::ui::UiFrame;
use crate::window::decorator::{DesktopDecorator, HeaderAction, WindowDecorator, content_rect};
use crate::window::{Point, Window, WindowId, maximized_bounds};

struct HostedWindow {
    window: Window,
    app_id: Option<String>,
    app: Box<dyn App>,
}

/// Root of the desktop.
///
/// Windows are owned here and referenced everywhere else by [`WindowId`].
/// `z_order` runs bottom to top; the last visible entry is drawn last and
/// wins hit tests.
pub struct DesktopShell {
    session: Session,
    launcher: Launcher,
    scheduler: Scheduler,
    taskbar: Taskbar,
    panel: Panel,
    decorator: Box<dyn WindowDecorator>,
    keys: KeyBindings,
    windows: BTreeMap<WindowId, HostedWindow>,
    z_order: Vec<WindowId>,
    focused: Option<WindowId>,
    next_window: u64,
    cascade: usize,
    area: Rect,
    layout: PanelLayout,
    now: Instant,
    notice: Option<(String, Instant)>,
    clock: String,
    clock_task: TaskGuard,
    login: LoginOverlay,
    exit_confirm: ConfirmOverlayComponent,
    dragging: Option<WindowId>,
    pointer_grab: Option<WindowId>,
    last_header_press: Option<(WindowId, Instant)>,
    last_brand_press: Option<Instant>,
    quit: bool,
}

impl DesktopShell {
    /// A desktop covering `area`. The login overlay is shown unless
    /// `session` already has somebody logged in.
    pub fn new(session: Session, area: Rect, now: Instant) -> Self {
        let scheduler = Scheduler::new();
        let clock_task = scheduler.repeat(TaskOwner::Shell, CLOCK_INTERVAL, now);
        let mut login = LoginOverlay::new();
        if !session.is_logged_in() {
            login.open();
        }
        let mut shell = Self {
            session,
            launcher: Launcher::with_defaults(),
            scheduler,
            taskbar: Taskbar::new(),
            panel: Panel::new(),
            decorator: Box::new(DesktopDecorator),
            keys: KeyBindings::default(),
            windows: BTreeMap::new(),
            z_order: Vec::new(),
            focused: None,
            next_window: 0,
            cascade: 0,
            area,
            layout: PanelLayout::default(),
            now,
            notice: None,
            clock: String::new(),
            clock_task,
            login,
            exit_confirm: ConfirmOverlayComponent::new(),
            dragging: None,
            pointer_grab: None,
            last_header_press: None,
            last_brand_press: None,
            quit: false,
        };
        shell.refresh_clock();
        shell.resize(area);
        tracing::info!(width = area.width, height = area.height, "desktop started");
        shell
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn launcher(&self) -> &Launcher {
        &self.launcher
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    pub fn desktop_area(&self) -> Rect {
        self.layout.desktop
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn login_visible(&self) -> bool {
        self.login.visible()
    }

    pub fn exit_confirm_visible(&self) -> bool {
        self.exit_confirm.visible()
    }

    pub fn fullscreen(&self) -> bool {
        self.panel.fullscreen()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn clock(&self) -> &str {
        &self.clock
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id).map(|hosted| &hosted.window)
    }

    /// App id a window was launched from, if it came from the launcher.
    pub fn window_app(&self, id: WindowId) -> Option<&str> {
        self.windows.get(&id).and_then(|hosted| hosted.app_id.as_deref())
    }

    /// Open windows, bottom to top.
    pub fn window_ids(&self) -> &[WindowId] {
        &self.z_order
    }

    pub fn taskbar(&self) -> &Taskbar {
        &self.taskbar
    }

    /// Taskbar labels as they would be drawn right now.
    pub fn taskbar_labels(&self) -> Vec<String> {
        self.taskbar
            .entries(|id| self.window(id))
            .into_iter()
            .map(|entry| entry.label)
            .collect()
    }

    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        self.layout = self.panel.split_area(area);
        let desktop = self.layout.desktop;
        for hosted in self.windows.values_mut() {
            if hosted.window.is_maximized() {
                hosted.window.set_bounds(maximized_bounds(desktop));
            }
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        let fullscreen = !self.panel.fullscreen();
        self.panel.set_fullscreen(fullscreen);
        self.resize(self.area);
        tracing::debug!(fullscreen, "fullscreen toggled");
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(notice = %message, "notice");
        self.notice = Some((message, self.now));
    }

    fn refresh_clock(&mut self) {
        self.clock = chrono::Local::now().format("%a %H:%M:%S").to_string();
    }

    // --- windows -----------------------------------------------------------

    fn cascade_origin(&mut self) -> Point {
        let slot = (self.cascade % CASCADE_SLOTS) as i32;
        self.cascade += 1;
        let desktop = self.layout.desktop;
        Point::new(
            i32::from(desktop.x) + 2 + CASCADE_STEP.0 * slot,
            i32::from(desktop.y) + 1 + CASCADE_STEP.1 * slot,
        )
    }

    /// Open a window hosting `app`, focused and on top. The window is not on
    /// the taskbar until it is [registered](Self::register).
    pub fn create_window(
        &mut self,
        title: impl Into<String>,
        icon: impl Into<String>,
        app: Box<dyn App>,
    ) -> WindowId {
        self.next_window += 1;
        let id = WindowId::new(self.next_window);
        let origin = self.cascade_origin();
        let window = Window::create(id, title, icon, origin);
        tracing::info!(window_id = ?id, title = window.title(), "window opened");
        self.windows.insert(
            id,
            HostedWindow {
                window,
                app_id: None,
                app,
            },
        );
        self.z_order.push(id);
        self.focused = Some(id);
        id
    }

    /// Put a window on the taskbar. Registering twice is a no-op, as is
    /// registering an id that has no live window.
    pub fn register(&mut self, id: WindowId) -> bool {
        if !self.windows.contains_key(&id) {
            return false;
        }
        self.taskbar.register(id)
    }

    /// Build and register a window for a dock or installed catalog entry.
    pub fn launch(&mut self, app_id: &str) -> Option<WindowId> {
        let Some(descriptor) = self.launcher.resolve(app_id) else {
            tracing::warn!(app = %app_id, "launch of unknown or uninstalled app");
            self.notify(format!("Application '{app_id}' is not installed."));
            return None;
        };
        let app = (descriptor.factory)();
        let id = self.create_window(descriptor.title, descriptor.icon, app);
        if let Some(hosted) = self.windows.get_mut(&id) {
            hosted.app_id = Some(descriptor.id);
        }
        self.register(id);
        Some(id)
    }

    /// Open a builtin app regardless of install state.
    fn open_builtin(&mut self, app_id: &str) -> Option<WindowId> {
        let descriptor = apps::builtin(app_id)?;
        let id = self.create_window(descriptor.label, descriptor.icon, (descriptor.factory)());
        if let Some(hosted) = self.windows.get_mut(&id) {
            hosted.app_id = Some(descriptor.id.to_string());
        }
        self.register(id);
        Some(id)
    }

    fn raise(&mut self, id: WindowId) {
        if let Some(pos) = self.z_order.iter().position(|w| *w == id) {
            self.z_order.remove(pos);
            self.z_order.push(id);
        }
    }

    fn topmost_visible(&self) -> Option<WindowId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.window(*id).is_some_and(Window::is_visible))
    }

    /// Focus and raise a visible window.
    pub fn focus(&mut self, id: WindowId) -> bool {
        if !self.window(id).is_some_and(Window::is_visible) {
            return false;
        }
        self.raise(id);
        self.focused = Some(id);
        true
    }

    pub fn minimize(&mut self, id: WindowId) -> bool {
        let Some(hosted) = self.windows.get_mut(&id) else {
            return false;
        };
        if !hosted.window.minimize() {
            return false;
        }
        tracing::debug!(window_id = ?id, "window minimized");
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        if self.focused == Some(id) {
            self.focused = self.topmost_visible();
        }
        true
    }

    /// Show a minimized window again, raised and focused.
    pub fn restore(&mut self, id: WindowId) -> bool {
        let Some(hosted) = self.windows.get_mut(&id) else {
            return false;
        };
        if !hosted.window.restore() {
            return false;
        }
        tracing::debug!(window_id = ?id, "window restored");
        self.focus(id);
        true
    }

    pub fn toggle_maximize(&mut self, id: WindowId) -> bool {
        let desktop = self.layout.desktop;
        let Some(hosted) = self.windows.get_mut(&id) else {
            return false;
        };
        if !hosted.window.is_visible() {
            return false;
        }
        hosted.window.toggle_maximize(desktop);
        tracing::debug!(window_id = ?id, state = ?hosted.window.state(), "maximize toggled");
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        self.focus(id);
        true
    }

    /// Taskbar activation: restore a minimized window, minimize anything
    /// else.
    pub fn activate_taskbar_entry(&mut self, id: WindowId) -> bool {
        match self.window(id) {
            Some(window) if window.is_minimized() => self.restore(id),
            Some(_) => self.minimize(id),
            None => false,
        }
    }

    /// Tear a window down: taskbar entry, app, timers. Closing an unknown or
    /// already closed window does nothing.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        let Some(mut hosted) = self.windows.remove(&id) else {
            return false;
        };
        hosted.window.close();
        self.taskbar.unregister(id);
        self.z_order.retain(|w| *w != id);
        if self.dragging == Some(id) {
            self.dragging = None;
        }
        if self.pointer_grab == Some(id) {
            self.pointer_grab = None;
        }
        let mut requests = Vec::new();
        {
            let mut ctx = AppContext {
                session: &mut self.session,
                scheduler: &self.scheduler,
                window: id,
                requests: &mut requests,
                now: self.now,
            };
            hosted.app.on_close(&mut ctx);
        }
        drop(hosted);
        self.scheduler.cancel_owner(TaskOwner::Window(id));
        tracing::info!(window_id = ?id, "window closed");
        if self.focused == Some(id) || self.focused.is_none() {
            self.focused = self.topmost_visible();
        }
        self.process_requests(requests);
        true
    }

    fn close_all(&mut self) {
        for id in self.z_order.clone() {
            self.close_window(id);
        }
    }

    fn cycle_focus(&mut self, forward: bool) {
        let visible: Vec<WindowId> = self
            .taskbar
            .ids()
            .iter()
            .copied()
            .filter(|id| self.window(*id).is_some_and(Window::is_visible))
            .collect();
        if visible.is_empty() {
            return;
        }
        let current = self
            .focused
            .and_then(|f| visible.iter().position(|id| *id == f));
        let next = match (current, forward) {
            (Some(i), true) => (i + 1) % visible.len(),
            (Some(i), false) => (i + visible.len() - 1) % visible.len(),
            (None, _) => 0,
        };
        self.focus(visible[next]);
    }

    // --- dock and store ----------------------------------------------------

    pub fn add_dock_entry(&mut self, entry: DockEntry) -> DockInsert {
        let id = entry.id.clone();
        let outcome = self.launcher.add_dock_entry(entry);
        if outcome == DockInsert::AlreadyPresent {
            tracing::debug!(app = %id, "dock entry already present");
        }
        outcome
    }

    /// Drop a dock entry. Windows already open from it stay open.
    pub fn remove_dock_entry(&mut self, id: &str) -> bool {
        self.launcher.remove_dock_entry(id)
    }

    pub fn install(&mut self, id: &str) -> Result<InstallOutcome, StoreError> {
        let result = self.launcher.install(id);
        let label = self
            .launcher
            .catalog()
            .get(id)
            .map(|d| d.label)
            .unwrap_or(id)
            .to_string();
        match &result {
            Ok(InstallOutcome::Installed) => {
                self.notify(format!("'{label}' has been installed!"))
            }
            Ok(InstallOutcome::AlreadyInstalled) => {
                self.notify(format!("'{label}' is already installed."))
            }
            Err(err) => self.notify(err.to_string()),
        }
        result
    }

    /// Close everything and go back to the login screen.
    pub fn restart(&mut self) {
        tracing::info!("restarting session");
        self.close_all();
        self.session.logout();
        self.notice = None;
        self.cascade = 0;
        self.login.open();
    }

    fn process_requests(&mut self, requests: Vec<ShellRequest>) {
        let mut queue: VecDeque<ShellRequest> = requests.into();
        while let Some(request) = queue.pop_front() {
            tracing::trace!(?request, "shell request");
            match request {
                ShellRequest::Launch(id) => {
                    self.launch(&id);
                }
                ShellRequest::Install(id) => {
                    // the notice already reports the failure
                    if let Err(err) = self.install(&id) {
                        tracing::debug!(app = %id, %err, "install request failed");
                    }
                }
                ShellRequest::Close(id) => {
                    self.close_window(id);
                }
                ShellRequest::Notify(message) => self.notify(message),
                ShellRequest::Restart => self.restart(),
                ShellRequest::Quit => {
                    tracing::info!("shutdown requested");
                    self.quit = true;
                }
            }
        }
    }

    fn with_app<R>(
        &mut self,
        id: WindowId,
        f: impl FnOnce(&mut dyn App, &mut AppContext<'_>) -> R,
    ) -> Option<R> {
        let mut requests = Vec::new();
        let result = {
            let hosted = self.windows.get_mut(&id)?;
            let mut ctx = AppContext {
                session: &mut self.session,
                scheduler: &self.scheduler,
                window: id,
                requests: &mut requests,
                now: self.now,
            };
            f(hosted.app.as_mut(), &mut ctx)
        };
        self.process_requests(requests);
        Some(result)
    }

    // --- timers ------------------------------------------------------------

    /// Fire due timers and expire the notice.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;
        for (task, owner) in self.scheduler.due(now) {
            match owner {
                TaskOwner::Shell => self.on_shell_timer(task),
                TaskOwner::Window(id) => self.on_window_timer(id, task),
            }
        }
        if let Some((_, shown)) = &self.notice
            && now.duration_since(*shown) >= NOTICE_DURATION
        {
            self.notice = None;
        }
    }

    fn on_shell_timer(&mut self, task: TaskId) {
        if task == self.clock_task.id() {
            self.refresh_clock();
        } else {
            self.scheduler.cancel(task);
        }
    }

    fn on_window_timer(&mut self, id: WindowId, task: TaskId) {
        if self.with_app(id, |app, ctx| app.on_timer(task, ctx)).is_none() {
            tracing::debug!(window_id = ?id, ?task, "discarding timer for closed window");
            self.scheduler.cancel(task);
        }
    }

    // --- input -------------------------------------------------------------

    /// Route one input event. Returns whether anything consumed it.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        self.now = now;
        if let Event::Resize(width, height) = event {
            self.resize(Rect::new(self.area.x, self.area.y, *width, *height));
            return true;
        }
        if let Event::Key(key) = event
            && key.kind == KeyEventKind::Release
        {
            return false;
        }
        if self.exit_confirm.visible() {
            match self.exit_confirm.handle_confirm_event(event) {
                Some(ConfirmAction::Confirm) => {
                    tracing::info!("exit confirmed");
                    self.exit_confirm.close();
                    self.quit = true;
                }
                Some(ConfirmAction::Cancel) => self.exit_confirm.close(),
                None => {}
            }
            return true;
        }
        if let Event::Key(key) = event
            && self.keys.matches(Action::Quit, key)
        {
            self.open_exit_confirm();
            return true;
        }
        if self.login.visible() {
            if let Some(welcome) = self.login.handle_event(event, &mut self.session) {
                self.notify(welcome);
            }
            return true;
        }
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => false,
        }
    }

    pub fn open_exit_confirm(&mut self) {
        self.exit_confirm.open(
            "Exit",
            &format!("Leave {DESKTOP_NAME}? Open windows will be closed."),
        );
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if let Some(action) = self.keys.global_action(key) {
            match action {
                Action::FocusNext => self.cycle_focus(true),
                Action::FocusPrev => self.cycle_focus(false),
                Action::CloseWindow => {
                    if let Some(id) = self.focused {
                        self.close_window(id);
                    }
                }
                Action::MinimizeWindow => {
                    if let Some(id) = self.focused {
                        self.minimize(id);
                    }
                }
                Action::ToggleMaximize => {
                    if let Some(id) = self.focused {
                        self.toggle_maximize(id);
                    }
                }
                Action::ToggleFullscreen => self.toggle_fullscreen(),
                Action::OpenSystemLog => {
                    self.open_builtin(ids::SYSTEM_LOG);
                }
                _ => return false,
            }
            return true;
        }
        let Some(id) = self.focused else {
            return false;
        };
        let event = Event::Key(*key);
        self.with_app(id, |app, ctx| app.handle_event(&event, ctx))
            .unwrap_or(false)
    }

    fn window_at(&self, point: Point) -> Option<WindowId> {
        if !crate::ui::rect_contains(
            self.layout.desktop,
            point.x.max(0) as u16,
            point.y.max(0) as u16,
        ) {
            return None;
        }
        self.z_order.iter().rev().copied().find(|id| {
            self.window(*id)
                .is_some_and(|w| w.is_visible() && w.bounds().contains(point))
        })
    }

    /// Forward a mouse event to a window's app in window-local cells.
    fn forward_mouse(&mut self, id: WindowId, mouse: &MouseEvent) -> bool {
        let Some(bounds) = self.window(id).map(Window::bounds) else {
            return false;
        };
        let local = |abs: u16, origin: i32| -> u16 {
            (i32::from(abs) - origin).clamp(0, i32::from(u16::MAX)) as u16
        };
        let event = Event::Mouse(MouseEvent {
            column: local(mouse.column, bounds.x),
            row: local(mouse.row, bounds.y),
            ..*mouse
        });
        self.with_app(id, |app, ctx| app.handle_event(&event, ctx))
            .unwrap_or(false)
    }

    fn is_double_press(last: Option<Instant>, now: Instant) -> bool {
        last.is_some_and(|t| now.duration_since(t) <= DOUBLE_CLICK_WINDOW)
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent) -> bool {
        let point = Point::from_cell(mouse.column, mouse.row);
        let event = Event::Mouse(*mouse);
        match mouse.kind {
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(id) = self.dragging {
                    if let Some(hosted) = self.windows.get_mut(&id) {
                        hosted.window.drag_to(point);
                    }
                    return true;
                }
                if let Some(id) = self.pointer_grab {
                    return self.forward_mouse(id, mouse);
                }
                false
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(id) = self.dragging.take() {
                    if let Some(hosted) = self.windows.get_mut(&id) {
                        hosted.window.end_drag();
                    }
                    return true;
                }
                if let Some(id) = self.pointer_grab.take() {
                    return self.forward_mouse(id, mouse);
                }
                false
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if self.panel.hit_test_brand(&event) {
                    if Self::is_double_press(self.last_brand_press, self.now) {
                        self.last_brand_press = None;
                        self.toggle_fullscreen();
                    } else {
                        self.last_brand_press = Some(self.now);
                    }
                    return true;
                }
                if let Some(app_id) = self.panel.hit_test_dock(&event).map(str::to_string) {
                    self.launch(&app_id);
                    return true;
                }
                if let Some(id) = self.panel.hit_test_taskbar(&event) {
                    return self.activate_taskbar_entry(id);
                }
                if self.panel.contains(mouse.column, mouse.row) {
                    return true;
                }
                let Some(id) = self.window_at(point) else {
                    return false;
                };
                self.focus(id);
                let Some(bounds) = self.window(id).map(Window::bounds) else {
                    return false;
                };
                match self.decorator.hit_test(bounds, point) {
                    HeaderAction::Close => {
                        self.close_window(id);
                    }
                    HeaderAction::Minimize => {
                        self.minimize(id);
                    }
                    HeaderAction::Maximize => {
                        self.toggle_maximize(id);
                    }
                    HeaderAction::Drag => {
                        let last = self
                            .last_header_press
                            .filter(|(w, _)| *w == id)
                            .map(|(_, t)| t);
                        if Self::is_double_press(last, self.now) {
                            self.last_header_press = None;
                            self.toggle_maximize(id);
                        } else {
                            self.last_header_press = Some((id, self.now));
                            if let Some(hosted) = self.windows.get_mut(&id) {
                                hosted.window.begin_drag(point);
                                self.dragging = Some(id);
                            }
                        }
                    }
                    HeaderAction::None => {
                        self.pointer_grab = Some(id);
                        self.forward_mouse(id, mouse);
                    }
                }
                true
            }
            _ => match self.window_at(point) {
                Some(id) => self.forward_mouse(id, mouse),
                None => false,
            },
        }
    }

    // --- drawing -----------------------------------------------------------

    pub fn render(&mut self, frame: &mut UiFrame<'_>) {
        let area = frame.area();
        if area != self.area {
            self.resize(area);
        }
        let palette = Palette::new(self.session.theme);
        let layout = self.layout;
        self.panel.begin_frame();

        let desktop = layout.desktop;
        for row in 0..desktop.height {
            let line = Rect::new(desktop.x, desktop.y + row, desktop.width, 1);
            frame.fill(line, Style::default().bg(palette.desktop_bg(row, desktop.height)));
        }

        let app_focus = !self.login.visible() && !self.exit_confirm.visible();
        for id in &self.z_order {
            let Some(hosted) = self.windows.get_mut(id) else {
                continue;
            };
            if !hosted.window.is_visible() {
                continue;
            }
            let bounds = hosted.window.bounds();
            if bounds.width == 0 || bounds.height == 0 {
                continue;
            }
            let focused = self.focused == Some(*id);
            let local = Rect::new(0, 0, bounds.width, bounds.height);
            let mut buffer = Buffer::empty(local);
            self.decorator.render_window(
                &mut buffer,
                hosted.window.title(),
                hosted.window.icon(),
                focused,
                &palette,
            );
            let content = content_rect(bounds.width, bounds.height);
            if content.width > 0 && content.height > 0 {
                let ctx = RenderContext {
                    session: &self.session,
                    launcher: &self.launcher,
                    palette: &palette,
                    focused: focused && app_focus,
                };
                let mut window_frame = UiFrame::from_parts(content, &mut buffer);
                hosted.app.render(&mut window_frame, content, &ctx);
            }
            let mut desktop_frame = UiFrame::from_parts(desktop, frame.buffer_mut());
            desktop_frame.blit_from_signed(&buffer, bounds);
        }

        let entries = self.taskbar.entries(|id| self.windows.get(&id).map(|h| &h.window));
        let user = self.session.display_user().to_string();
        self.panel.render_status(
            frame,
            &palette,
            StatusLine {
                user: &user,
                notice: self.notice.as_ref().map(|(text, _)| text.as_str()),
                clock: &self.clock,
            },
        );
        self.panel
            .render_dock(frame, &palette, self.launcher.dock().entries());
        self.panel
            .render_taskbar(frame, &palette, &entries, self.focused);

        self.login.render(frame, area, &palette);
        self.exit_confirm.render(
            frame,
            area,
            &ComponentContext::new(true)
                .with_overlay(true)
                .with_palette(palette),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::window::WindowState;
    use crossterm::event::{KeyCode, KeyModifiers};

    struct Blank;

    impl App for Blank {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &RenderContext<'_>) {}
    }

    /// Holds a window timer and counts its firings.
    struct Ticker {
        guard: Option<TaskGuard>,
        fired: std::rc::Rc<std::cell::Cell<u32>>,
    }

    impl App for Ticker {
        fn render(&mut self, _frame: &mut UiFrame<'_>, _area: Rect, _ctx: &RenderContext<'_>) {}

        fn handle_event(&mut self, _event: &Event, ctx: &mut AppContext<'_>) -> bool {
            self.guard = Some(ctx.scheduler.repeat(
                TaskOwner::Window(ctx.window),
                Duration::from_millis(100),
                ctx.now,
            ));
            true
        }

        fn on_timer(&mut self, _task: TaskId, _ctx: &mut AppContext<'_>) {
            self.fired.set(self.fired.get() + 1);
        }
    }

    fn shell() -> (DesktopShell, Instant) {
        let now = Instant::now();
        let shell = DesktopShell::new(Session::with_user("ada"), Rect::new(0, 0, 120, 40), now);
        (shell, now)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn create_window_focuses_but_does_not_register() {
        let (mut shell, _) = shell();
        let id = shell.create_window("Blank", "*", Box::new(Blank));
        assert_eq!(shell.focused(), Some(id));
        assert!(shell.taskbar_labels().is_empty());
        assert!(shell.register(id));
        assert!(!shell.register(id));
        assert_eq!(shell.taskbar_labels(), vec!["Blank"]);
    }

    #[test]
    fn minimize_moves_focus_and_restore_brings_it_back() {
        let (mut shell, _) = shell();
        let a = shell.launch(ids::NOTES).unwrap();
        let b = shell.launch(ids::CALCULATOR).unwrap();
        assert_eq!(shell.focused(), Some(b));
        assert!(shell.minimize(b));
        assert_eq!(shell.focused(), Some(a));
        assert_eq!(
            shell.taskbar_labels(),
            vec!["Notes", "Calculator (minimized)"]
        );

        assert!(shell.activate_taskbar_entry(b));
        assert_eq!(shell.focused(), Some(b));
        assert_eq!(shell.window_ids().last(), Some(&b));
        assert_eq!(
            shell.window(b).map(Window::state),
            Some(WindowState::Normal)
        );
    }

    #[test]
    fn restore_after_maximize_lands_in_normal() {
        let (mut shell, _) = shell();
        let id = shell.launch(ids::NOTES).unwrap();
        shell.toggle_maximize(id);
        shell.minimize(id);
        shell.restore(id);
        assert_eq!(
            shell.window(id).map(Window::state),
            Some(WindowState::Normal)
        );
    }

    #[test]
    fn close_is_idempotent_and_cancels_window_timers() {
        let (mut shell, now) = shell();
        let fired = std::rc::Rc::new(std::cell::Cell::new(0));
        let id = shell.create_window(
            "Ticker",
            "t",
            Box::new(Ticker {
                guard: None,
                fired: fired.clone(),
            }),
        );
        shell.register(id);
        shell.handle_event(&key(KeyCode::Char('x'), KeyModifiers::NONE), now);
        assert_eq!(shell.scheduler().count_for(TaskOwner::Window(id)), 1);

        shell.tick(now + Duration::from_millis(150));
        assert_eq!(fired.get(), 1);

        assert!(shell.close_window(id));
        assert!(!shell.close_window(id));
        assert_eq!(shell.scheduler().count_for(TaskOwner::Window(id)), 0);
        assert!(shell.taskbar_labels().is_empty());
        assert_eq!(shell.focused(), None);
    }

    #[test]
    fn timers_for_missing_windows_are_discarded() {
        let (mut shell, now) = shell();
        let ghost = WindowId::new(99);
        let guard = shell
            .scheduler()
            .repeat(TaskOwner::Window(ghost), Duration::from_millis(10), now);
        shell.tick(now + Duration::from_millis(20));
        assert!(!shell.scheduler().is_active(guard.id()));
    }

    #[test]
    fn install_reports_first_and_repeat_installs() {
        let (mut shell, _) = shell();
        assert_eq!(shell.install(ids::TICTACTOE), Ok(InstallOutcome::Installed));
        assert_eq!(shell.notice(), Some("'Tic-Tac-Toe' has been installed!"));
        assert!(shell.launcher().dock().contains(ids::TICTACTOE));
        assert_eq!(
            shell.install(ids::TICTACTOE),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(shell.notice(), Some("'Tic-Tac-Toe' is already installed."));
        assert!(shell.install("nope").is_err());
    }

    #[test]
    fn reinstall_keeps_removed_dock_entry_removed() {
        let (mut shell, _) = shell();
        assert!(shell.remove_dock_entry(ids::CONTACTS));
        let before = shell.launcher().dock().len();
        assert_eq!(
            shell.install(ids::CONTACTS),
            Ok(InstallOutcome::AlreadyInstalled)
        );
        assert_eq!(shell.notice(), Some("'Contacts' is already installed."));
        assert_eq!(shell.launcher().dock().len(), before);
        assert!(!shell.launcher().dock().contains(ids::CONTACTS));
    }

    #[test]
    fn failed_install_request_posts_notice() {
        let (mut shell, _) = shell();
        shell.process_requests(vec![ShellRequest::Install("nope".into())]);
        let expected = StoreError::UnknownApp("nope".into()).to_string();
        assert_eq!(shell.notice(), Some(expected.as_str()));
    }

    #[test]
    fn uninstalled_catalog_apps_do_not_launch() {
        let (mut shell, _) = shell();
        assert!(shell.launch(ids::WHITEBOARD).is_none());
        shell.install(ids::WHITEBOARD).unwrap();
        assert!(shell.launch(ids::WHITEBOARD).is_some());
    }

    #[test]
    fn removing_a_dock_entry_keeps_open_windows() {
        let (mut shell, _) = shell();
        let id = shell.launch(ids::NOTES).unwrap();
        let before = shell.launcher().dock().len();
        let entry = shell.launcher().dock().get(ids::NOTES).cloned().unwrap();
        assert_eq!(shell.add_dock_entry(entry), DockInsert::AlreadyPresent);
        assert_eq!(shell.launcher().dock().len(), before);
        assert!(shell.remove_dock_entry(ids::NOTES));
        assert!(shell.window(id).is_some());
        assert_eq!(shell.launcher().dock().len(), before - 1);
    }

    #[test]
    fn notices_expire() {
        let (mut shell, now) = shell();
        shell.notify("hello");
        shell.tick(now + Duration::from_secs(1));
        assert_eq!(shell.notice(), Some("hello"));
        shell.tick(now + NOTICE_DURATION + Duration::from_millis(1));
        assert_eq!(shell.notice(), None);
    }

    #[test]
    fn quit_asks_first() {
        let (mut shell, now) = shell();
        shell.handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), now);
        assert!(shell.exit_confirm_visible());
        shell.handle_event(&key(KeyCode::Esc, KeyModifiers::NONE), now);
        assert!(!shell.exit_confirm_visible());
        assert!(!shell.should_quit());
        shell.handle_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), now);
        shell.handle_event(&key(KeyCode::Enter, KeyModifiers::NONE), now);
        assert!(shell.should_quit());
    }

    #[test]
    fn restart_closes_everything_and_logs_out() {
        let (mut shell, _) = shell();
        shell.launch(ids::NOTES);
        shell.launch(ids::TERMINAL);
        shell.restart();
        assert!(shell.window_ids().is_empty());
        assert!(shell.taskbar().is_empty());
        assert!(!shell.session().is_logged_in());
        assert!(shell.login_visible());
    }

    #[test]
    fn fullscreen_gives_the_desktop_everything() {
        let (mut shell, now) = shell();
        let id = shell.launch(ids::NOTES).unwrap();
        shell.toggle_maximize(id);
        let before = shell.window(id).unwrap().bounds();
        shell.handle_event(&key(KeyCode::F(11), KeyModifiers::NONE), now);
        assert!(shell.fullscreen());
        assert_eq!(shell.desktop_area(), Rect::new(0, 0, 120, 40));
        let after = shell.window(id).unwrap().bounds();
        assert!(after.height > before.height);
    }

    #[test]
    fn focus_cycles_in_taskbar_order() {
        let (mut shell, now) = shell();
        let a = shell.launch(ids::NOTES).unwrap();
        let b = shell.launch(ids::CALCULATOR).unwrap();
        let c = shell.launch(ids::SETTINGS).unwrap();
        let f6 = key(KeyCode::F(6), KeyModifiers::NONE);
        shell.handle_event(&f6, now);
        assert_eq!(shell.focused(), Some(a));
        shell.handle_event(&f6, now);
        assert_eq!(shell.focused(), Some(b));
        shell.handle_event(&key(KeyCode::F(6), KeyModifiers::SHIFT), now);
        assert_eq!(shell.focused(), Some(a));
        shell.handle_event(&key(KeyCode::Char('w'), KeyModifiers::CONTROL), now);
        assert!(shell.window(a).is_none());
        // b was raised most recently after a
        assert_eq!(shell.focused(), Some(b));
        shell.handle_event(&f6, now);
        assert_eq!(shell.focused(), Some(c));
    }
}

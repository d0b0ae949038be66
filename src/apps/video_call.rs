use std::time::Instant;

use crossterm::event::{Event, KeyCode};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::{App, AppContext, RenderContext, ShellRequest, ids};
use crate::components::{ButtonBar, Component, ComponentContext, ListComponent};
use crate::constants::{CALL_TIMER_INTERVAL, LOCAL_FEED_INTERVAL, REMOTE_FEED_INTERVAL};
use crate::scheduler::{TaskGuard, TaskId, TaskOwner};
use crate::ui::{UiFrame, rect_contains, truncate_to_width};

const SIDE_PANEL_WIDTH: u16 = 28;
const LOCAL_TILES: usize = 6;
const REMOTE_TILES: usize = 8;

/// Linear congruential generator for the fake feeds.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    fn next_u8(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) as u8
    }
}

/// Colored rectangle in feed-relative units (0..=255 on both axes).
#[derive(Debug, Clone, Copy)]
struct Tile {
    x: u8,
    y: u8,
    w: u8,
    h: u8,
    color: Color,
}

fn random_frame(rng: &mut Lcg, count: usize) -> Vec<Tile> {
    (0..count)
        .map(|_| Tile {
            x: rng.next_u8(),
            y: rng.next_u8(),
            w: rng.next_u8() / 3 + 20,
            h: rng.next_u8() / 3 + 20,
            color: Color::Rgb(rng.next_u8(), rng.next_u8(), rng.next_u8()),
        })
        .collect()
}

#[derive(Debug)]
struct Call {
    target: String,
    started: Instant,
}

/// Simulated call screen. Nothing leaves the process: the feeds are random
/// rectangles repainted by window-owned timers.
pub struct VideoCallApp {
    call: Option<Call>,
    camera: bool,
    audio_muted: bool,
    video_muted: bool,
    elapsed: String,
    local_frame: Vec<Tile>,
    remote_frame: Vec<Tile>,
    rng: Lcg,
    local_task: Option<TaskGuard>,
    remote_task: Option<TaskGuard>,
    timer_task: Option<TaskGuard>,
    contacts: ListComponent,
    controls: ButtonBar,
    contact_bar: ButtonBar,
    call_bar: ButtonBar,
    list_rect: Rect,
}

impl Default for VideoCallApp {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCallApp {
    pub fn new() -> Self {
        Self {
            call: None,
            camera: false,
            audio_muted: false,
            video_muted: false,
            elapsed: "00:00".to_string(),
            local_frame: Vec::new(),
            remote_frame: Vec::new(),
            rng: Lcg(0x5eed_cafe),
            local_task: None,
            remote_task: None,
            timer_task: None,
            contacts: ListComponent::new("Contacts"),
            controls: ButtonBar::new(["Start Camera", "Mute Audio", "Mute Video"]),
            contact_bar: ButtonBar::new(["Add Contact", "Refresh"]),
            call_bar: ButtonBar::new(["Start Call", "End Call"]),
            list_rect: Rect::default(),
        }
    }

    pub fn in_call_with(&self) -> Option<&str> {
        self.call.as_ref().map(|c| c.target.as_str())
    }

    pub fn elapsed(&self) -> &str {
        &self.elapsed
    }

    pub fn status(&self) -> String {
        let mut parts = Vec::with_capacity(4);
        if let Some(call) = &self.call {
            parts.push(format!("On call with {}", call.target));
        }
        parts.push(format!("Camera: {}", if self.camera { "On" } else { "Off" }));
        parts.push(format!("Audio: {}", if self.audio_muted { "Muted" } else { "On" }));
        parts.push(format!("Video: {}", if self.video_muted { "Muted" } else { "On" }));
        parts.join(" | ")
    }

    fn owner(ctx: &AppContext<'_>) -> TaskOwner {
        TaskOwner::Window(ctx.window)
    }

    pub fn start_call(&mut self, name: &str, ctx: &mut AppContext<'_>) {
        if !ctx.session.contacts.contains_key(name) {
            ctx.notify("Contact does not exist.");
            return;
        }
        if self.call.is_some() {
            ctx.notify("Already on a call.");
            return;
        }
        self.call = Some(Call {
            target: name.to_string(),
            started: ctx.now,
        });
        self.elapsed = "00:00".to_string();
        tracing::info!(contact = %name, window_id = ?ctx.window, "call started");
        self.timer_task = Some(ctx.scheduler.repeat(
            Self::owner(ctx),
            CALL_TIMER_INTERVAL,
            ctx.now,
        ));
        self.start_remote(ctx);
        ctx.notify(format!("Calling {name} (simulated)..."));
        if !self.camera {
            self.start_camera(ctx);
        }
    }

    pub fn end_call(&mut self, ctx: &mut AppContext<'_>) {
        let Some(call) = self.call.take() else {
            return;
        };
        tracing::info!(contact = %call.target, window_id = ?ctx.window, "call ended");
        self.remote_task = None;
        self.timer_task = None;
        self.remote_frame.clear();
        self.elapsed = "00:00".to_string();
        ctx.notify("Call has ended (simulated).");
    }

    fn start_remote(&mut self, ctx: &AppContext<'_>) {
        if self.call.is_none() || self.video_muted {
            return;
        }
        self.remote_frame = random_frame(&mut self.rng, REMOTE_TILES);
        self.remote_task = Some(ctx.scheduler.repeat(
            Self::owner(ctx),
            REMOTE_FEED_INTERVAL,
            ctx.now,
        ));
    }

    fn start_camera(&mut self, ctx: &AppContext<'_>) {
        self.camera = true;
        self.local_frame = random_frame(&mut self.rng, LOCAL_TILES);
        self.local_task = Some(ctx.scheduler.repeat(
            Self::owner(ctx),
            LOCAL_FEED_INTERVAL,
            ctx.now,
        ));
    }

    fn toggle_camera(&mut self, ctx: &AppContext<'_>) {
        if self.camera {
            self.camera = false;
            self.local_task = None;
            self.local_frame.clear();
        } else {
            self.start_camera(ctx);
        }
    }

    fn toggle_video(&mut self, ctx: &AppContext<'_>) {
        self.video_muted = !self.video_muted;
        if self.video_muted {
            self.remote_task = None;
            self.remote_frame.clear();
        } else {
            self.start_remote(ctx);
        }
    }

    fn call_selected(&mut self, ctx: &mut AppContext<'_>) {
        self.contacts
            .set_items(ctx.session.contacts.keys().cloned().collect());
        match self.contacts.selected_item().map(str::to_string) {
            Some(name) => self.start_call(&name, ctx),
            None => ctx.notify("Select a contact to call (or double-click)."),
        }
    }

    fn render_feed(
        &self,
        frame: &mut UiFrame<'_>,
        area: Rect,
        tiles: &[Tile],
        caption: &str,
        text: Style,
    ) {
        frame.fill(area, Style::default().bg(Color::Black));
        if area.width == 0 || area.height == 0 {
            return;
        }
        for tile in tiles {
            let scale = |v: u8, span: u16| (v as u32 * span as u32 / 256) as u16;
            let x = area.x + scale(tile.x, area.width);
            let y = area.y + scale(tile.y, area.height);
            let w = scale(tile.w, area.width).max(1).min(area.right() - x);
            let h = scale(tile.h, area.height).max(1).min(area.bottom() - y);
            frame.fill(Rect::new(x, y, w, h), Style::default().bg(tile.color));
        }
        let caption = truncate_to_width(caption, area.width as usize);
        frame.set_string(area.x, area.y, &caption, text.bg(Color::Black));
    }
}

impl App for VideoCallApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 8 || area.width < SIDE_PANEL_WIDTH + 10 {
            return;
        }
        self.controls
            .set_label(0, if self.camera { "Stop Camera" } else { "Start Camera" });
        self.controls
            .set_label(1, if self.audio_muted { "Unmute Audio" } else { "Mute Audio" });
        self.controls
            .set_label(2, if self.video_muted { "Unmute Video" } else { "Mute Video" });

        let body_height = area.height - 2;
        let feeds_width = area.width - SIDE_PANEL_WIDTH - 1;
        let local_height = body_height / 2;
        let local = Rect::new(area.x, area.y, feeds_width, local_height);
        let remote = Rect::new(
            area.x,
            area.y + local_height,
            feeds_width,
            body_height - local_height,
        );
        let text = Style::default().fg(Color::White);
        if self.camera {
            self.render_feed(frame, local, &self.local_frame, "You (simulated)", text);
        } else {
            self.render_feed(frame, local, &[], "Local camera off", text);
        }
        match &self.call {
            Some(_) if self.video_muted => {
                self.render_feed(frame, remote, &[], "Remote video muted", text)
            }
            Some(call) => {
                let caption = format!("Remote (simulated): {}", call.target);
                self.render_feed(frame, remote, &self.remote_frame, &caption, text);
            }
            None => self.render_feed(frame, remote, &[], "No remote feed", text),
        }

        let side_x = area.right() - SIDE_PANEL_WIDTH;
        self.contacts
            .set_items(ctx.session.contacts.keys().cloned().collect());
        self.list_rect = Rect::new(side_x, area.y, SIDE_PANEL_WIDTH, body_height.saturating_sub(3));
        self.contacts
            .render(frame, self.list_rect, &ctx.component(true));
        let row = self.list_rect.bottom();
        self.contact_bar.render(
            frame,
            Rect::new(side_x, row, SIDE_PANEL_WIDTH, 1),
            &ctx.component(false),
        );
        self.call_bar
            .set_active(Some(if self.call.is_some() { 1 } else { 0 }));
        self.call_bar.render(
            frame,
            Rect::new(side_x, row + 1, SIDE_PANEL_WIDTH, 1),
            &ctx.component(false),
        );
        frame.set_string(side_x, row + 2, &format!("Call time: {}", self.elapsed), palette.text());

        let status = truncate_to_width(&self.status(), area.width as usize);
        frame.set_string(area.x, area.bottom() - 2, &status, palette.text());
        let bar = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        self.controls.render(frame, bar, &ctx.component(false));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        if let Some(index) = self.controls.clicked(event) {
            match index {
                0 => self.toggle_camera(ctx),
                1 => self.audio_muted = !self.audio_muted,
                _ => self.toggle_video(ctx),
            }
            return true;
        }
        if let Some(index) = self.contact_bar.clicked(event) {
            if index == 0 {
                ctx.request(ShellRequest::Launch(ids::CONTACTS.to_string()));
            } else {
                self.contacts
                    .set_items(ctx.session.contacts.keys().cloned().collect());
            }
            return true;
        }
        if let Some(index) = self.call_bar.clicked(event) {
            if index == 0 {
                self.call_selected(ctx);
            } else {
                self.end_call(ctx);
            }
            return true;
        }
        let inner = ComponentContext::default();
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Enter => {
                    self.call_selected(ctx);
                    true
                }
                KeyCode::Esc => {
                    self.end_call(ctx);
                    true
                }
                KeyCode::Char('c') => {
                    self.toggle_camera(ctx);
                    true
                }
                KeyCode::Char('m') => {
                    self.audio_muted = !self.audio_muted;
                    true
                }
                KeyCode::Char('v') => {
                    self.toggle_video(ctx);
                    true
                }
                _ => self.contacts.handle_event(event, &inner),
            },
            Event::Mouse(mouse) if rect_contains(self.list_rect, mouse.column, mouse.row) => {
                self.contacts.handle_event(event, &inner)
            }
            _ => false,
        }
    }

    fn on_timer(&mut self, task: TaskId, ctx: &mut AppContext<'_>) {
        let is = |guard: &Option<TaskGuard>| guard.as_ref().is_some_and(|g| g.id() == task);
        if is(&self.local_task) {
            self.local_frame = random_frame(&mut self.rng, LOCAL_TILES);
        } else if is(&self.remote_task) {
            self.remote_frame = random_frame(&mut self.rng, REMOTE_TILES);
        } else if is(&self.timer_task) {
            if let Some(call) = &self.call {
                let secs = ctx.now.saturating_duration_since(call.started).as_secs();
                self.elapsed = format!("{:02}:{:02}", secs / 60, secs % 60);
            }
        } else {
            tracing::debug!(?task, window_id = ?ctx.window, "stale video task");
            ctx.scheduler.cancel(task);
        }
    }

    fn on_close(&mut self, ctx: &mut AppContext<'_>) {
        if let Some(call) = self.call.take() {
            tracing::info!(contact = %call.target, "call dropped with window");
        }
        self.local_task = None;
        self.remote_task = None;
        self.timer_task = None;
        tracing::trace!(window_id = ?ctx.window, "video call closed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::apps::testing::Harness;
    use crate::window::WindowId;

    fn owner() -> TaskOwner {
        TaskOwner::Window(WindowId::new(1))
    }

    #[test]
    fn call_requires_known_contact_and_no_active_call() {
        let mut h = Harness::new();
        h.session.add_contact("Alice", "").unwrap();
        let mut app = VideoCallApp::new();
        let mut ctx = h.ctx();
        app.start_call("Mallory", &mut ctx);
        app.start_call("Alice", &mut ctx);
        app.start_call("Alice", &mut ctx);
        assert_eq!(app.in_call_with(), Some("Alice"));
        assert_eq!(
            h.notices(),
            vec![
                "Contact does not exist.",
                "Calling Alice (simulated)...",
                "Already on a call."
            ]
        );
    }

    #[test]
    fn status_line_tracks_toggles() {
        let mut h = Harness::new();
        h.session.add_contact("Bob", "").unwrap();
        let mut app = VideoCallApp::new();
        assert_eq!(app.status(), "Camera: Off | Audio: On | Video: On");
        let mut ctx = h.ctx();
        app.start_call("Bob", &mut ctx);
        drop(ctx);
        h.key(&mut app, KeyCode::Char('m'));
        h.key(&mut app, KeyCode::Char('v'));
        assert_eq!(
            app.status(),
            "On call with Bob | Camera: On | Audio: Muted | Video: Muted"
        );
    }

    #[test]
    fn timers_follow_the_call_lifecycle() {
        let mut h = Harness::new();
        h.session.add_contact("Alice", "").unwrap();
        let mut app = VideoCallApp::new();
        let t0 = h.now;
        let mut ctx = h.ctx();
        app.start_call("Alice", &mut ctx);
        drop(ctx);
        // call timer, remote feed and local camera
        assert_eq!(h.scheduler.count_for(owner()), 3);

        h.now = t0 + Duration::from_secs(65);
        let due = h.scheduler.due(h.now);
        assert_eq!(due.len(), 3);
        for (task, _) in due {
            let mut ctx = h.ctx();
            app.on_timer(task, &mut ctx);
        }
        assert_eq!(app.elapsed(), "01:05");

        let mut ctx = h.ctx();
        app.end_call(&mut ctx);
        assert_eq!(app.elapsed(), "00:00");
        assert_eq!(h.scheduler.count_for(owner()), 1);

        drop(app);
        assert_eq!(h.scheduler.count_for(owner()), 0);
    }

    #[test]
    fn add_contact_launches_contacts() {
        let mut h = Harness::new();
        let mut app = VideoCallApp::new();
        let buffer = h.render(&mut app, 80, 20);
        let (x, y) = crate::apps::testing::find(&buffer, "[ Add Contact ]").unwrap();
        h.click(&mut app, x + 1, y);
        assert_eq!(
            h.take_requests(),
            vec![ShellRequest::Launch(ids::CONTACTS.to_string())]
        );
        h.click(&mut app, 0, 0);
        assert!(h.take_requests().is_empty());
    }
}

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
};

use crate::constants::{DESKTOP_NAME, DOCK_HEIGHT, STATUS_BAR_HEIGHT, TASKBAR_HEIGHT};
use crate::dock::DockEntry;
use crate::taskbar::TaskbarEntry;
use crate::theme::Palette;
use crate::ui::{UiFrame, rect_contains, safe_set_string, truncate_to_width};
use crate::window::WindowId;

#[derive(Debug, Clone)]
struct DockHit {
    id: String,
    rect: Rect,
}

#[derive(Debug, Clone, Copy)]
struct TaskbarHit {
    id: WindowId,
    rect: Rect,
}

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelLayout {
    pub status: Rect,
    pub desktop: Rect,
    pub dock: Rect,
    pub taskbar: Rect,
}

/// What the status bar shows besides the brand.
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    pub user: &'a str,
    pub notice: Option<&'a str>,
    pub clock: &'a str,
}

/// The shell chrome around the desktop: status bar on top, dock and taskbar
/// at the bottom. Hit rects are recorded while drawing and reset every frame.
#[derive(Debug)]
pub struct Panel {
    fullscreen: bool,
    layout: PanelLayout,
    brand_rect: Option<Rect>,
    dock_hits: Vec<DockHit>,
    taskbar_hits: Vec<TaskbarHit>,
    hostname: Option<String>,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self {
            fullscreen: false,
            layout: PanelLayout::default(),
            brand_rect: None,
            dock_hits: Vec::new(),
            taskbar_hits: Vec::new(),
            hostname: None,
        }
    }

    pub fn begin_frame(&mut self) {
        self.brand_rect = None;
        self.dock_hits.clear();
        self.taskbar_hits.clear();
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn layout(&self) -> PanelLayout {
        self.layout
    }

    /// Split `area` into status bar, desktop, dock and taskbar rows.
    ///
    /// In fullscreen mode the bars get empty rects and the desktop covers the
    /// whole `area`.
    pub fn split_area(&mut self, area: Rect) -> PanelLayout {
        if self.fullscreen {
            self.layout = PanelLayout {
                desktop: area,
                ..PanelLayout::default()
            };
            return self.layout;
        }
        let status_h = STATUS_BAR_HEIGHT.min(area.height);
        let taskbar_h = TASKBAR_HEIGHT.min(area.height.saturating_sub(status_h));
        let dock_h = DOCK_HEIGHT.min(area.height.saturating_sub(status_h + taskbar_h));
        let desktop_h = area
            .height
            .saturating_sub(status_h)
            .saturating_sub(taskbar_h)
            .saturating_sub(dock_h);
        let status = Rect {
            height: status_h,
            ..area
        };
        let desktop = Rect {
            y: area.y.saturating_add(status_h),
            height: desktop_h,
            ..area
        };
        let dock = Rect {
            y: desktop.bottom(),
            height: dock_h,
            ..area
        };
        let taskbar = Rect {
            y: dock.bottom(),
            height: taskbar_h,
            ..area
        };
        self.layout = PanelLayout {
            status,
            desktop,
            dock,
            taskbar,
        };
        self.layout
    }

    fn hostname(&mut self) -> &str {
        // cached; the lookup is a syscall
        self.hostname.get_or_insert_with(|| {
            hostname::get()
                .ok()
                .and_then(|s| s.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string())
        })
    }

    pub fn render_status(
        &mut self,
        frame: &mut UiFrame<'_>,
        palette: &Palette,
        line: StatusLine<'_>,
    ) {
        let area = self.layout.status;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().fg(palette.fg).bg(palette.status_bar_bg);
        frame.fill(area, base);
        let host = self.hostname().to_string();
        let buffer = frame.buffer_mut();
        let max_x = area.right();
        let mut x = area.x;
        let y = area.y;

        let brand = format!(" ≡ {DESKTOP_NAME} ");
        let brand_width = brand.chars().count() as u16;
        safe_set_string(buffer, area, x, y, &brand, base.add_modifier(Modifier::BOLD));
        self.brand_rect = Some(Rect {
            x,
            y,
            width: brand_width.min(area.width),
            height: 1,
        });
        x = x.saturating_add(brand_width);

        let clock = format!(" {} ", line.clock);
        let clock_width = clock.chars().count() as u16;
        let clock_x = max_x.saturating_sub(clock_width).max(x);
        safe_set_string(buffer, area, clock_x, y, &clock, base);

        let who = format!("{}@{host}  ", line.user);
        safe_set_string(buffer, area, x, y, &who, base.fg(palette.titlebar_fg));
        x = x.saturating_add(who.chars().count() as u16);

        if let Some(notice) = line.notice {
            let available = clock_x.saturating_sub(x) as usize;
            let text = truncate_to_width(notice, available);
            safe_set_string(
                buffer,
                area,
                x,
                y,
                &text,
                base.fg(palette.warning).add_modifier(Modifier::BOLD),
            );
        }
    }

    /// Dock row: one ` icon label ` chunk per entry, or icons only when the
    /// labels do not fit.
    pub fn render_dock(
        &mut self,
        frame: &mut UiFrame<'_>,
        palette: &Palette,
        entries: &[DockEntry],
    ) {
        let area = self.layout.dock;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().fg(palette.fg).bg(palette.dock_bg);
        frame.fill(area, base);
        let labelled: Vec<String> = entries
            .iter()
            .map(|e| format!(" {} {} ", e.icon, e.label))
            .collect();
        let total: usize = labelled.iter().map(|c| c.chars().count() + 1).sum();
        let compact = total > area.width as usize;
        let buffer = frame.buffer_mut();
        let mut x = area.x.saturating_add(1);
        for (entry, chunk) in entries.iter().zip(labelled) {
            let chunk = if compact {
                format!(" {} ", entry.icon)
            } else {
                chunk
            };
            let width = chunk.chars().count() as u16;
            if x.saturating_add(width) > area.right() {
                break;
            }
            safe_set_string(buffer, area, x, area.y, &chunk, palette.button());
            self.dock_hits.push(DockHit {
                id: entry.id.clone(),
                rect: Rect::new(x, area.y, width, 1),
            });
            x = x.saturating_add(width + 1);
        }
    }

    /// Taskbar row: one `[ label ]` control per live registered window.
    pub fn render_taskbar(
        &mut self,
        frame: &mut UiFrame<'_>,
        palette: &Palette,
        entries: &[TaskbarEntry],
        focused: Option<WindowId>,
    ) {
        let area = self.layout.taskbar;
        if area.width == 0 || area.height == 0 {
            return;
        }
        let base = Style::default().fg(palette.fg).bg(palette.taskbar_bg);
        frame.fill(area, base);
        let buffer = frame.buffer_mut();
        let mut x = area.x.saturating_add(1);
        for entry in entries {
            let max_label = area.right().saturating_sub(x).saturating_sub(4) as usize;
            if max_label == 0 {
                break;
            }
            let label = truncate_to_width(&entry.label, max_label);
            let chunk = format!("[ {label} ]");
            let width = chunk.chars().count() as u16;
            let style = if Some(entry.id) == focused && !entry.minimized {
                palette.selected()
            } else if entry.minimized {
                palette.button().add_modifier(Modifier::DIM)
            } else {
                palette.button()
            };
            safe_set_string(buffer, area, x, area.y, &chunk, style);
            self.taskbar_hits.push(TaskbarHit {
                id: entry.id,
                rect: Rect::new(x, area.y, width, 1),
            });
            x = x.saturating_add(width + 1);
        }
    }

    /// Whether a cell belongs to one of the bars.
    pub fn contains(&self, column: u16, row: u16) -> bool {
        let l = self.layout;
        [l.status, l.dock, l.taskbar]
            .into_iter()
            .any(|rect| rect_contains(rect, column, row))
    }

    pub fn hit_test_brand(&self, event: &Event) -> bool {
        let Some((column, row)) = left_press(event) else {
            return false;
        };
        self.brand_rect
            .is_some_and(|rect| rect_contains(rect, column, row))
    }

    pub fn hit_test_dock(&self, event: &Event) -> Option<&str> {
        let (column, row) = left_press(event)?;
        self.dock_hits
            .iter()
            .find(|hit| rect_contains(hit.rect, column, row))
            .map(|hit| hit.id.as_str())
    }

    pub fn hit_test_taskbar(&self, event: &Event) -> Option<WindowId> {
        let (column, row) = left_press(event)?;
        self.taskbar_hits
            .iter()
            .find(|hit| rect_contains(hit.rect, column, row))
            .map(|hit| hit.id)
    }
}

fn left_press(event: &Event) -> Option<(u16, u16)> {
    match event {
        Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
            Some((mouse.column, mouse.row))
        }
        _ => None,
    }
}

pub mod decorator;

use std::fmt;

use ratatui::prelude::Rect;

use crate::constants::{
    DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MAXIMIZE_MARGIN, MIN_MAXIMIZED_HEIGHT,
    MIN_MAXIMIZED_WIDTH,
};

/// Opaque window identity handed out by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pointer position in screen cells. Signed so drags past the left/top edge
/// keep their arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn from_cell(column: u16, row: u16) -> Self {
        Self::new(i32::from(column), i32::from(row))
    }
}

/// Signed window origin with unsigned size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl Bounds {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + i32::from(self.width)
            && point.y < self.y + i32::from(self.height)
    }

    /// Portion of these bounds that lies inside `area`, as an unsigned rect.
    /// Returns an empty rect when there is no overlap.
    pub fn visible_in(&self, area: Rect) -> Rect {
        let left = self.x.max(i32::from(area.x));
        let top = self.y.max(i32::from(area.y));
        let right = (self.x + i32::from(self.width)).min(i32::from(area.right()));
        let bottom = (self.y + i32::from(self.height)).min(i32::from(area.bottom()));
        if right <= left || bottom <= top {
            return Rect::default();
        }
        Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        }
    }

    /// Area available to application content: everything inside the border
    /// and below the title bar.
    pub fn content(&self) -> Bounds {
        Bounds {
            x: self.x + 1,
            y: self.y + 1,
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Self::new(
            i32::from(rect.x),
            i32::from(rect.y),
            rect.width,
            rect.height,
        )
    }
}

/// Bounds a maximized window takes inside `desktop`: the whole area minus a
/// fixed margin on every side, never smaller than the minimum maximized size.
pub fn maximized_bounds(desktop: Rect) -> Bounds {
    let margin = MAXIMIZE_MARGIN;
    Bounds {
        x: i32::from(desktop.x) + i32::from(margin),
        y: i32::from(desktop.y) + i32::from(margin),
        width: desktop
            .width
            .saturating_sub(margin * 2)
            .max(MIN_MAXIMIZED_WIDTH),
        height: desktop
            .height
            .saturating_sub(margin * 2)
            .max(MIN_MAXIMIZED_HEIGHT),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Normal,
    Minimized,
    Maximized,
}

/// A single hosted window: identity, chrome labels, geometry and the
/// normal/minimized/maximized state machine.
///
/// Focus and stacking are not tracked here; the shell owns those because
/// they are relative to the other windows.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    title: String,
    icon: String,
    state: WindowState,
    bounds: Bounds,
    saved_bounds: Option<Bounds>,
    drag_offset: Option<Point>,
    closed: bool,
}

impl Window {
    /// A visible `Normal` window with the default size at `origin`.
    pub fn create(
        id: WindowId,
        title: impl Into<String>,
        icon: impl Into<String>,
        origin: Point,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            icon: icon.into(),
            state: WindowState::Normal,
            bounds: Bounds::new(
                origin.x,
                origin.y,
                DEFAULT_WINDOW_WIDTH,
                DEFAULT_WINDOW_HEIGHT,
            ),
            saved_bounds: None,
            drag_offset: None,
            closed: false,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_minimized(&self) -> bool {
        self.state == WindowState::Minimized
    }

    pub fn is_maximized(&self) -> bool {
        self.state == WindowState::Maximized
    }

    pub fn is_visible(&self) -> bool {
        !self.closed && self.state != WindowState::Minimized
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn saved_bounds(&self) -> Option<Bounds> {
        self.saved_bounds
    }

    /// Taskbar label: the title, suffixed while minimized.
    pub fn taskbar_label(&self) -> String {
        if self.is_minimized() {
            format!("{} (minimized)", self.title)
        } else {
            self.title.clone()
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    /// Remember where inside the window the pointer grabbed it.
    pub fn begin_drag(&mut self, pointer: Point) {
        if !self.is_visible() {
            return;
        }
        self.drag_offset = Some(Point::new(
            pointer.x - self.bounds.x,
            pointer.y - self.bounds.y,
        ));
    }

    /// Move the window so the grabbed point follows the pointer. Returns
    /// `false` when no drag is in progress.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(offset) = self.drag_offset else {
            return false;
        };
        self.bounds.x = pointer.x - offset.x;
        self.bounds.y = pointer.y - offset.y;
        true
    }

    pub fn end_drag(&mut self) {
        self.drag_offset = None;
    }

    /// Hide the window. Returns `true` if the state changed.
    pub fn minimize(&mut self) -> bool {
        if self.closed || self.state == WindowState::Minimized {
            return false;
        }
        self.drag_offset = None;
        self.state = WindowState::Minimized;
        true
    }

    /// Show a minimized window again. Always lands in `Normal`, even if the
    /// window was maximized before it was minimized. Bounds and
    /// `saved_bounds` are kept, so a restored maximized window stays at the
    /// maximized size until the next toggle saves that size.
    pub fn restore(&mut self) -> bool {
        if self.closed || self.state != WindowState::Minimized {
            return false;
        }
        self.state = WindowState::Normal;
        true
    }

    /// Switch between `Normal` and `Maximized` within `desktop`.
    pub fn toggle_maximize(&mut self, desktop: Rect) {
        if self.closed || self.state == WindowState::Minimized {
            return;
        }
        self.drag_offset = None;
        match (self.state, self.saved_bounds) {
            (WindowState::Maximized, Some(saved)) => {
                self.bounds = saved;
                self.state = WindowState::Normal;
            }
            _ => {
                self.saved_bounds = Some(self.bounds);
                self.bounds = maximized_bounds(desktop);
                self.state = WindowState::Maximized;
            }
        }
    }

    /// Mark the window closed. Returns `false` when it already was.
    pub fn close(&mut self) -> bool {
        if self.closed {
            return false;
        }
        self.closed = true;
        self.drag_offset = None;
        true
    }
}

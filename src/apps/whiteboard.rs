use crossterm::event::{Event, KeyCode, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use super::{App, AppContext, RenderContext, is_ctrl};
use crate::components::{ButtonBar, Component};
use crate::ui::{UiFrame, rect_contains};

const COLORS: [(&str, Color); 4] = [
    ("Black", Color::Rgb(0x00, 0x00, 0x00)),
    ("Red", Color::Rgb(0xe5, 0x39, 0x35)),
    ("Blue", Color::Rgb(0x1e, 0x88, 0xe5)),
    ("Green", Color::Rgb(0x43, 0xa0, 0x47)),
];
const CANVAS_BG: Color = Color::Rgb(0xff, 0xff, 0xff);
const MIN_BRUSH: u8 = 1;
const MAX_BRUSH: u8 = 10;
const DEFAULT_BRUSH: u8 = 3;

/// Cells on the line from `a` to `b`, both ends included (Bresenham).
pub fn line_points(a: (i32, i32), b: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x0, mut y0) = a;
    let (x1, y1) = b;
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let mut points = Vec::with_capacity((dx - dy + 1) as usize);
    loop {
        points.push((x0, y0));
        if x0 == x1 && y0 == y1 {
            return points;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// One mouse-move worth of ink, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: (i32, i32),
    pub to: (i32, i32),
    pub color: usize,
    pub size: u8,
}

impl Segment {
    /// Square brush footprint; sizes grow the stamp every four steps.
    fn radius(&self) -> i32 {
        (self.size.saturating_sub(1) / 4) as i32
    }
}

pub struct WhiteboardApp {
    segments: Vec<Segment>,
    color: usize,
    size: u8,
    last: Option<(i32, i32)>,
    canvas: Rect,
    palette_bar: ButtonBar,
    size_bar: ButtonBar,
    actions: ButtonBar,
}

impl Default for WhiteboardApp {
    fn default() -> Self {
        Self::new()
    }
}

impl WhiteboardApp {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            color: 0,
            size: DEFAULT_BRUSH,
            last: None,
            canvas: Rect::default(),
            palette_bar: ButtonBar::new(COLORS.iter().map(|(name, _)| *name)),
            size_bar: ButtonBar::new(["-", "+"]),
            actions: ButtonBar::new(["Undo", "Clear", "Save", "Load"]),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn brush_size(&self) -> u8 {
        self.size
    }

    fn resize_brush(&mut self, delta: i8) {
        self.size = self
            .size
            .saturating_add_signed(delta)
            .clamp(MIN_BRUSH, MAX_BRUSH);
    }

    fn undo(&mut self) {
        self.segments.pop();
    }

    fn run_action(&mut self, index: usize, ctx: &mut AppContext<'_>) {
        match index {
            0 => self.undo(),
            1 => {
                self.segments.clear();
                self.last = None;
            }
            2 => ctx.notify("Drawing saved (simulated)."),
            _ => ctx.notify("Loaded previous drawing (simulated)."),
        }
    }

    fn to_canvas(&self, column: u16, row: u16) -> (i32, i32) {
        (
            column as i32 - self.canvas.x as i32,
            row as i32 - self.canvas.y as i32,
        )
    }
}

impl App for WhiteboardApp {
    fn render(&mut self, frame: &mut UiFrame<'_>, area: Rect, ctx: &RenderContext<'_>) {
        let palette = ctx.palette;
        frame.fill(area, palette.text());
        if area.height < 4 || area.width < 8 {
            self.canvas = Rect::default();
            return;
        }
        self.palette_bar.set_active(Some(self.color));
        let toolbar = Rect::new(area.x, area.y, area.width, 1);
        self.palette_bar.render(frame, toolbar, &ctx.component(false));
        let size_x = area.x + self.palette_bar.width() + 2;
        if size_x < area.right() {
            let label = format!("Size: {:>2} ", self.size);
            frame.set_string(size_x, area.y, &label, palette.text());
            let bar_x = size_x + label.len() as u16;
            let rect = Rect::new(bar_x, area.y, area.right().saturating_sub(bar_x), 1);
            self.size_bar.render(frame, rect, &ctx.component(false));
        }

        self.canvas = Rect::new(area.x, area.y + 1, area.width, area.height - 2);
        frame.fill(self.canvas, Style::default().bg(CANVAS_BG));
        for segment in &self.segments {
            let ink = Style::default().bg(COLORS[segment.color].1);
            let r = segment.radius();
            for (px, py) in line_points(segment.from, segment.to) {
                for y in (py - r)..=(py + r) {
                    for x in (px - r)..=(px + r) {
                        if x < 0
                            || y < 0
                            || x >= self.canvas.width as i32
                            || y >= self.canvas.height as i32
                        {
                            continue;
                        }
                        let cell =
                            Rect::new(self.canvas.x + x as u16, self.canvas.y + y as u16, 1, 1);
                        frame.fill(cell, ink);
                    }
                }
            }
        }

        let bottom = Rect::new(area.x, area.bottom() - 1, area.width, 1);
        self.actions.render(frame, bottom, &ctx.component(false));
    }

    fn handle_event(&mut self, event: &Event, ctx: &mut AppContext<'_>) -> bool {
        if let Some(i) = self.palette_bar.clicked(event) {
            self.color = i;
            return true;
        }
        if let Some(i) = self.size_bar.clicked(event) {
            self.resize_brush(if i == 0 { -1 } else { 1 });
            return true;
        }
        if let Some(i) = self.actions.clicked(event) {
            self.run_action(i, ctx);
            return true;
        }
        match event {
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    if !rect_contains(self.canvas, mouse.column, mouse.row) {
                        return false;
                    }
                    self.last = Some(self.to_canvas(mouse.column, mouse.row));
                    true
                }
                MouseEventKind::Drag(MouseButton::Left) => {
                    let Some(from) = self.last else {
                        return false;
                    };
                    let to = self.to_canvas(mouse.column, mouse.row);
                    if to != from {
                        self.segments.push(Segment {
                            from,
                            to,
                            color: self.color,
                            size: self.size,
                        });
                        self.last = Some(to);
                    }
                    true
                }
                MouseEventKind::Up(_) => self.last.take().is_some(),
                _ => false,
            },
            Event::Key(key) => {
                if is_ctrl(key, 'z') {
                    self.undo();
                    return true;
                }
                match key.code {
                    KeyCode::Char(c @ '1'..='4') => self.color = c as usize - '1' as usize,
                    KeyCode::Char('+') | KeyCode::Char('=') => self.resize_brush(1),
                    KeyCode::Char('-') => self.resize_brush(-1),
                    _ => return false,
                }
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::testing::Harness;

    #[test]
    fn bresenham_covers_both_ends() {
        assert_eq!(
            line_points((0, 0), (3, 0)),
            vec![(0, 0), (1, 0), (2, 0), (3, 0)]
        );
        assert_eq!(line_points((2, 2), (0, 0)), vec![(2, 2), (1, 1), (0, 0)]);
        let steep = line_points((0, 0), (1, 4));
        assert_eq!(steep.len(), 5);
        assert_eq!(steep.first(), Some(&(0, 0)));
        assert_eq!(steep.last(), Some(&(1, 4)));
    }

    #[test]
    fn drag_paints_and_undo_removes_last_segment() {
        let mut h = Harness::new();
        let mut app = WhiteboardApp::new();
        let buffer = h.render(&mut app, 60, 12);
        assert_eq!(buffer[(5, 5)].bg, CANVAS_BG);

        h.click(&mut app, 5, 5);
        h.mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 9, 5);
        h.mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 9, 7);
        h.mouse(&mut app, MouseEventKind::Up(MouseButton::Left), 9, 7);
        assert_eq!(app.segments().len(), 2);
        assert_eq!(app.segments()[0].from, (5, 4));

        let buffer = h.render(&mut app, 60, 12);
        assert_eq!(buffer[(7, 5)].bg, COLORS[0].1);

        h.ctrl(&mut app, 'z');
        assert_eq!(app.segments().len(), 1);
        // moves after release do not paint
        h.mouse(&mut app, MouseEventKind::Drag(MouseButton::Left), 20, 8);
        assert_eq!(app.segments().len(), 1);
    }

    #[test]
    fn brush_size_is_clamped() {
        let mut h = Harness::new();
        let mut app = WhiteboardApp::new();
        for _ in 0..20 {
            h.key(&mut app, KeyCode::Char('+'));
        }
        assert_eq!(app.brush_size(), MAX_BRUSH);
        for _ in 0..20 {
            h.key(&mut app, KeyCode::Char('-'));
        }
        assert_eq!(app.brush_size(), MIN_BRUSH);
    }

    #[test]
    fn save_and_load_are_simulated() {
        let mut h = Harness::new();
        let mut app = WhiteboardApp::new();
        let mut ctx = h.ctx();
        app.run_action(2, &mut ctx);
        app.run_action(3, &mut ctx);
        assert_eq!(
            h.notices(),
            vec!["Drawing saved (simulated).", "Loaded previous drawing (simulated)."]
        );
    }
}

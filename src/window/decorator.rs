use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Modifier, Style};

use super::{Bounds, Point};
use crate::theme::Palette;
use crate::ui::{safe_set_string, truncate_to_width};

/// Width of one title bar control, in cells.
const BUTTON_WIDTH: u16 = 3;

/// What a press on the title bar row asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderAction {
    None,
    Minimize,
    Maximize,
    Close,
    Drag,
}

pub trait WindowDecorator: std::fmt::Debug {
    /// Paint the chrome into `buffer`, whose area is the window's own
    /// (origin-based) rect. The content area is left filled with the palette
    /// background for the application to draw over.
    fn render_window(
        &self,
        buffer: &mut Buffer,
        title: &str,
        icon: &str,
        focused: bool,
        palette: &Palette,
    );

    /// Classify a pointer position against a window's screen bounds.
    fn hit_test(&self, bounds: Bounds, point: Point) -> HeaderAction;
}

#[derive(Debug, Default)]
pub struct DesktopDecorator;

impl DesktopDecorator {
    /// Left edge (relative to the window) of the control slot `index`,
    /// counted from the right: 0 = close, 1 = maximize, 2 = minimize.
    fn slot_x(width: u16, index: u16) -> Option<u16> {
        width.checked_sub(BUTTON_WIDTH * (index + 1))
    }
}

impl WindowDecorator for DesktopDecorator {
    fn render_window(
        &self,
        buffer: &mut Buffer,
        title: &str,
        icon: &str,
        focused: bool,
        palette: &Palette,
    ) {
        let rect = buffer.area;
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let header_bg = if focused {
            palette.titlebar_focused_bg
        } else {
            palette.titlebar_bg
        };
        let header_style = Style::default().bg(header_bg).fg(palette.titlebar_fg);
        let border_style = Style::default().fg(palette.border).bg(palette.bg);
        let body_style = Style::default().fg(palette.fg).bg(palette.bg);

        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.reset();
                    cell.set_symbol(" ");
                    cell.set_style(if y == rect.y { header_style } else { body_style });
                }
            }
        }

        // Header
        let controls_width = (BUTTON_WIDTH * 3).min(rect.width);
        let title_room = rect.width.saturating_sub(controls_width + 1) as usize;
        let label = if icon.is_empty() {
            title.to_string()
        } else {
            format!("{icon} {title}")
        };
        let label_style = if focused {
            header_style.add_modifier(Modifier::BOLD)
        } else {
            header_style
        };
        safe_set_string(
            buffer,
            rect,
            rect.x + 1,
            rect.y,
            &truncate_to_width(&label, title_room),
            label_style,
        );
        let controls = [
            (palette.close, "●"),
            (palette.maximize, "●"),
            (palette.minimize, "●"),
        ];
        for (index, (color, glyph)) in controls.iter().enumerate() {
            if let Some(slot) = Self::slot_x(rect.width, index as u16) {
                let style = Style::default().bg(header_bg).fg(*color);
                safe_set_string(buffer, rect, rect.x + slot + 1, rect.y, glyph, style);
            }
        }

        if rect.height < 2 {
            return;
        }
        let left = rect.x;
        let right = rect.right().saturating_sub(1);
        let bottom = rect.bottom().saturating_sub(1);
        // Sides
        for y in rect.y + 1..bottom {
            for x in [left, right] {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_symbol("│");
                    cell.set_style(border_style);
                }
            }
        }
        // Bottom
        for x in left..=right {
            if let Some(cell) = buffer.cell_mut((x, bottom)) {
                let symbol = if x == left {
                    "└"
                } else if x == right {
                    "┘"
                } else {
                    "─"
                };
                cell.set_symbol(symbol);
                cell.set_style(border_style);
            }
        }
    }

    fn hit_test(&self, bounds: Bounds, point: Point) -> HeaderAction {
        if !bounds.contains(point) || point.y != bounds.y {
            return HeaderAction::None;
        }
        let rel = (point.x - bounds.x) as u16;
        let actions = [
            HeaderAction::Close,
            HeaderAction::Maximize,
            HeaderAction::Minimize,
        ];
        for (index, action) in actions.into_iter().enumerate() {
            if let Some(slot) = Self::slot_x(bounds.width, index as u16)
                && rel >= slot
                && rel < slot + BUTTON_WIDTH
            {
                return action;
            }
        }
        HeaderAction::Drag
    }
}

/// Area (relative to the window origin) that the application draws into.
pub fn content_rect(width: u16, height: u16) -> Rect {
    Rect {
        x: 1,
        y: 1,
        width: width.saturating_sub(2),
        height: height.saturating_sub(2),
    }
}

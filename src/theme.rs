use clap::ValueEnum;
use ratatui::style::{Color, Modifier, Style};

/// Desktop background choice. Window chrome keeps the same palette for every
/// variant; only the surface behind the windows changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeKind {
    #[default]
    Gradient,
    Light,
    Dark,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 3] = [ThemeKind::Gradient, ThemeKind::Light, ThemeKind::Dark];

    pub fn label(self) -> &'static str {
        match self {
            ThemeKind::Gradient => "Gradient",
            ThemeKind::Light => "Light",
            ThemeKind::Dark => "Dark",
        }
    }
}

pub const GRADIENT_TOP_RGB: (u8, u8, u8) = (0xFF, 0x98, 0x00);
pub const GRADIENT_BOTTOM_RGB: (u8, u8, u8) = (0xBC, 0x46, 0x64);

const fn rgb(value: (u8, u8, u8)) -> Color {
    Color::Rgb(value.0, value.1, value.2)
}

/// Colors used by the shell chrome and by hosted applications.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub kind: ThemeKind,
    pub bg: Color,
    pub fg: Color,
    pub button_bg: Color,
    pub button_fg: Color,
    pub active_bg: Color,
    pub entry_bg: Color,
    pub entry_fg: Color,
    pub titlebar_bg: Color,
    pub titlebar_focused_bg: Color,
    pub titlebar_fg: Color,
    pub border: Color,
    pub status_bar_bg: Color,
    pub dock_bg: Color,
    pub taskbar_bg: Color,
    pub close: Color,
    pub maximize: Color,
    pub minimize: Color,
    pub warning: Color,
    pub success: Color,
}

impl Palette {
    pub fn new(kind: ThemeKind) -> Self {
        Self {
            kind,
            bg: rgb((0x1e, 0x1e, 0x2f)),
            fg: rgb((0xe0, 0xe0, 0xe0)),
            button_bg: rgb((0x2c, 0x2c, 0x44)),
            button_fg: rgb((0xcf, 0xcf, 0xcf)),
            active_bg: rgb((0x3a, 0x3a, 0x60)),
            entry_bg: rgb((0x30, 0x30, 0x4a)),
            entry_fg: rgb((0xf0, 0xf0, 0xf0)),
            titlebar_bg: rgb((0x2a, 0x2a, 0x44)),
            titlebar_focused_bg: rgb((0x45, 0x4a, 0x73)),
            titlebar_fg: rgb((0xdd, 0xdd, 0xdd)),
            border: rgb((0x44, 0x44, 0x66)),
            status_bar_bg: rgb((0x2e, 0x2e, 0x2e)),
            dock_bg: rgb((0x1a, 0x1a, 0x1a)),
            taskbar_bg: rgb((0x16, 0x16, 0x22)),
            close: rgb((0xff, 0x5f, 0x56)),
            maximize: rgb((0xff, 0xbd, 0x2e)),
            minimize: rgb((0x27, 0xc9, 0x3f)),
            warning: rgb((0xff, 0xbd, 0x2e)),
            success: rgb((0x27, 0xc9, 0x3f)),
        }
    }

    /// Desktop background for `row` out of `rows` total desktop rows.
    pub fn desktop_bg(&self, row: u16, rows: u16) -> Color {
        match self.kind {
            ThemeKind::Light => Color::Rgb(0xff, 0xff, 0xff),
            ThemeKind::Dark => Color::Rgb(0x12, 0x12, 0x12),
            ThemeKind::Gradient => gradient(GRADIENT_TOP_RGB, GRADIENT_BOTTOM_RGB, row, rows),
        }
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn entry(&self, focused: bool) -> Style {
        let style = Style::default().fg(self.entry_fg).bg(self.entry_bg);
        if focused {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn button(&self) -> Style {
        Style::default().fg(self.button_fg).bg(self.button_bg)
    }

    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.entry_fg)
            .bg(self.active_bg)
            .add_modifier(Modifier::BOLD)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(ThemeKind::default())
    }
}

/// Linear interpolation between two RGB colors, one step per row.
pub fn gradient(top: (u8, u8, u8), bottom: (u8, u8, u8), row: u16, rows: u16) -> Color {
    let span = rows.saturating_sub(1).max(1) as i32;
    let row = (row as i32).min(span);
    let mix = |a: u8, b: u8| -> u8 {
        let a = a as i32;
        let b = b as i32;
        (a + (b - a) * row / span) as u8
    };
    Color::Rgb(
        mix(top.0, bottom.0),
        mix(top.1, bottom.1),
        mix(top.2, bottom.2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_hits_both_endpoints() {
        assert_eq!(
            gradient(GRADIENT_TOP_RGB, GRADIENT_BOTTOM_RGB, 0, 10),
            Color::Rgb(0xFF, 0x98, 0x00)
        );
        assert_eq!(
            gradient(GRADIENT_TOP_RGB, GRADIENT_BOTTOM_RGB, 9, 10),
            Color::Rgb(0xBC, 0x46, 0x64)
        );
    }

    #[test]
    fn single_row_gradient_does_not_divide_by_zero() {
        let _ = gradient(GRADIENT_TOP_RGB, GRADIENT_BOTTOM_RGB, 0, 1);
        let _ = gradient(GRADIENT_TOP_RGB, GRADIENT_BOTTOM_RGB, 5, 0);
    }

    #[test]
    fn flat_themes_ignore_row() {
        let light = Palette::new(ThemeKind::Light);
        assert_eq!(light.desktop_bg(0, 20), light.desktop_bg(19, 20));
        let dark = Palette::new(ThemeKind::Dark);
        assert_eq!(dark.desktop_bg(3, 20), Color::Rgb(0x12, 0x12, 0x12));
    }
}

//! Shared component rendering context
//!
//! `ComponentContext` carries the UI state a component needs while drawing or
//! handling input, so the `Component` trait does not grow ad-hoc parameters.

use crate::theme::Palette;

#[derive(Debug, Clone, Copy)]
pub struct ComponentContext {
    focused: bool,
    overlay: bool,
    palette: Palette,
}

impl ComponentContext {
    pub fn new(focused: bool) -> Self {
        Self {
            focused,
            overlay: false,
            palette: Palette::default(),
        }
    }

    pub const fn focused(&self) -> bool {
        self.focused
    }

    /// Whether the component is drawn above everything else (e.g. a dialog).
    pub const fn overlay(&self) -> bool {
        self.overlay
    }

    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    pub const fn with_focus(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub const fn with_overlay(mut self, overlay: bool) -> Self {
        self.overlay = overlay;
        self
    }

    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

impl Default for ComponentContext {
    fn default() -> Self {
        Self::new(false)
    }
}

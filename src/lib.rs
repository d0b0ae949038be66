//! term-desk: a simulated desktop shell for the terminal.
//!
//! [`shell::DesktopShell`] owns the windows, the taskbar registry and the
//! launcher; [`runner`] drives it from an input driver and draws it with
//! ratatui.

pub mod apps;
pub mod catalog;
pub mod component_context;
pub mod components;
pub mod config;
pub mod constants;
pub mod dock;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod launcher;
pub mod log_buffer;
pub mod login;
pub mod panel;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod shell;
pub mod taskbar;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
pub mod vfs;
pub mod window;

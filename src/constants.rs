//! Shared crate-wide constants.

use std::time::Duration;

/// Display name shown at the left of the status bar.
pub const DESKTOP_NAME: &str = "term-desk";

/// Rows reserved at the top of the screen for the status bar.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Rows reserved at the bottom of the screen for the dock.
pub const DOCK_HEIGHT: u16 = 1;

/// Rows reserved at the very bottom of the screen for the taskbar.
pub const TASKBAR_HEIGHT: u16 = 1;

/// Gap (in cells) left on every side of a maximized window.
///
/// Units: terminal cells. A maximized window fills the desktop area minus
/// this margin so the desktop background stays visible as a frame.
pub const MAXIMIZE_MARGIN: u16 = 1;

/// Lower bound for the width of a maximized window, in columns.
pub const MIN_MAXIMIZED_WIDTH: u16 = 20;

/// Lower bound for the height of a maximized window, in rows.
pub const MIN_MAXIMIZED_HEIGHT: u16 = 6;

/// Size given to freshly created windows.
pub const DEFAULT_WINDOW_WIDTH: u16 = 60;
pub const DEFAULT_WINDOW_HEIGHT: u16 = 18;

/// Offset applied to each new window so consecutive windows do not stack
/// exactly on top of each other. The cascade wraps after
/// `CASCADE_SLOTS` windows.
pub const CASCADE_STEP: (i32, i32) = (3, 1);
pub const CASCADE_SLOTS: usize = 8;

/// Two presses on the same title bar within this window toggle maximize.
pub const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);

/// Interval of the status bar clock refresh.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// How long a status bar notice stays visible.
pub const NOTICE_DURATION: Duration = Duration::from_secs(4);

/// Repaint intervals of the simulated video feeds and the call timer.
pub const LOCAL_FEED_INTERVAL: Duration = Duration::from_millis(450);
pub const REMOTE_FEED_INTERVAL: Duration = Duration::from_millis(650);
pub const CALL_TIMER_INTERVAL: Duration = Duration::from_secs(1);

/// Number of lines kept by the in-memory log buffer.
pub const LOG_BUFFER_LINES: usize = 2000;

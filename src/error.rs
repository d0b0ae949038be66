use std::io;

use thiserror::Error;

/// Failures that end the desktop session.
#[derive(Debug, Error)]
pub enum DeskError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("unknown log level '{0}' (expected trace, debug, info, warn or error)")]
    LogLevel(String),
}

pub type Result<T, E = DeskError> = std::result::Result<T, E>;

//! In-memory log ring buffer.
//!
//! While the desktop owns the terminal, writing log lines to stderr would
//! scribble over the alternate screen. The tracing subscriber writes into
//! this buffer instead and the System Log application reads it back.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

static GLOBAL_LOG: OnceLock<LogHandle> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

/// Install `handle` as the process-wide log sink. Only the first call wins.
pub fn set_global(handle: LogHandle) -> bool {
    GLOBAL_LOG.set(handle).is_ok()
}

pub fn global() -> Option<LogHandle> {
    GLOBAL_LOG.get().cloned()
}

/// Copy panic location and message into the global buffer before the
/// previous hook runs.
pub fn install_panic_hook() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(handle) = GLOBAL_LOG.get() {
            handle.push("=== PANIC ===");
            if let Some(location) = info.location() {
                handle.push(format!(
                    "{}:{}:{}",
                    location.file(),
                    location.line(),
                    location.column()
                ));
            }
            if let Some(msg) = info.payload().downcast_ref::<&str>() {
                handle.push(format!("message: {msg}"));
            } else if let Some(msg) = info.payload().downcast_ref::<String>() {
                handle.push(format!("message: {msg}"));
            } else {
                handle.push("message: <non-string panic>");
            }
        }
        prev(info);
    }));
}

#[derive(Debug)]
struct LogBuffer {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl LogBuffer {
    fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.max(1),
        }
    }

    fn push_line(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

#[derive(Clone, Debug)]
pub struct LogHandle {
    inner: Arc<Mutex<LogBuffer>>,
}

impl LogHandle {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LogBuffer::new(max_lines))),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.push_line(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|b| b.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the buffered lines, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .map(|b| b.lines.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn writer(&self) -> LogWriter {
        LogWriter::new(self.clone())
    }
}

/// `io::Write` adapter that splits incoming bytes into lines.
#[derive(Debug)]
pub struct LogWriter {
    handle: LogHandle,
    pending: Vec<u8>,
}

impl LogWriter {
    pub fn new(handle: LogHandle) -> Self {
        Self {
            handle,
            pending: Vec::new(),
        }
    }

    fn flush_pending(&mut self, force: bool) {
        if self.pending.is_empty() {
            return;
        }
        let end = if force {
            self.pending.len()
        } else {
            match self.pending.iter().rposition(|b| *b == b'\n') {
                Some(pos) => pos + 1,
                None => return,
            }
        };
        let drained: Vec<u8> = self.pending.drain(..end).collect();
        let text = String::from_utf8_lossy(&drained);
        for line in text.split('\n') {
            if !line.is_empty() {
                self.handle.push(line.to_string());
            }
        }
    }
}

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.flush_pending(false);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_pending(true);
        Ok(())
    }
}

impl Drop for LogWriter {
    fn drop(&mut self) {
        self.flush_pending(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_drops_oldest_lines() {
        let handle = LogHandle::new(2);
        handle.push("a");
        handle.push("b");
        handle.push("c");
        assert_eq!(handle.snapshot(), vec!["b", "c"]);
    }

    #[test]
    fn writer_splits_on_newlines_and_keeps_partial() {
        let handle = LogHandle::new(10);
        let mut w = handle.writer();
        w.write_all(b"first\nsec").unwrap();
        assert_eq!(handle.snapshot(), vec!["first"]);
        w.write_all(b"ond\n").unwrap();
        assert_eq!(handle.snapshot(), vec!["first", "second"]);
        w.write_all(b"tail").unwrap();
        w.flush().unwrap();
        assert_eq!(handle.len(), 3);
    }

    #[test]
    fn dropping_writer_flushes_partial_line() {
        let handle = LogHandle::new(10);
        {
            let mut w = handle.writer();
            w.write_all(b"no newline").unwrap();
        }
        assert_eq!(handle.snapshot(), vec!["no newline"]);
    }
}

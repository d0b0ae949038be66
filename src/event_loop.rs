use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The desktop's single UI loop.
///
/// Owns the input driver and is the only place that polls it. Every pass
/// calls the handler once with `None` (timers and drawing), then drains
/// whatever input is pending, calling the handler with `Some(event)` for
/// each. Timers run on this thread too, so no handler ever races another.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Run until the handler returns [`ControlFlow::Quit`].
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (drags, wheel) before the next frame.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn drains_pending_events_between_frames() {
        let driver = ScriptedDriver::new(vec![key('a'), key('b'), key('c')]);
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        let mut frames = 0;
        let mut seen = Vec::new();
        event_loop
            .run(|driver, event| {
                match event {
                    Some(Event::Key(k)) => seen.push(k.code),
                    Some(_) => {}
                    None => {
                        frames += 1;
                        if driver.is_exhausted() && frames > 1 {
                            return Ok(ControlFlow::Quit);
                        }
                    }
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![KeyCode::Char('a'), KeyCode::Char('b'), KeyCode::Char('c')]
        );
        // one frame before input, one after the drained burst
        assert_eq!(frames, 2);
    }

    #[test]
    fn quit_from_event_stops_immediately() {
        let driver = ScriptedDriver::new(vec![key('q'), key('x')]);
        let mut event_loop = EventLoop::new(driver, Duration::from_millis(0));
        let mut seen = 0;
        event_loop
            .run(|_, event| {
                if event.is_some() {
                    seen += 1;
                    return Ok(ControlFlow::Quit);
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, 1);
        assert!(!event_loop.driver().is_exhausted());
    }
}

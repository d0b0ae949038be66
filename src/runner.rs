use std::io;
use std::time::{Duration, Instant};

use crate::drivers::{InputDriver, OutputDriver};
use crate::event_loop::{ControlFlow, EventLoop};
use crate::shell::DesktopShell;

/// Drive `shell` until it asks to quit.
///
/// Idle passes fire timers and redraw; every input event goes to
/// [`DesktopShell::handle_event`]. `clock` supplies the current instant so
/// headless runs can be deterministic.
pub fn run_desktop<O, D, C>(
    output: &mut O,
    driver: D,
    shell: &mut DesktopShell,
    poll_interval: Duration,
    mouse_capture: bool,
    mut clock: C,
) -> io::Result<()>
where
    O: OutputDriver,
    D: InputDriver,
    C: FnMut() -> Instant,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(mouse_capture)?;

    event_loop.run(|_driver, event| {
        let now = clock();
        if let Some(evt) = event {
            shell.handle_event(&evt, now);
            if shell.should_quit() {
                return Ok(ControlFlow::Quit);
            }
            return Ok(ControlFlow::Continue);
        }
        shell.tick(now);
        if shell.should_quit() {
            return Ok(ControlFlow::Quit);
        }
        output.draw(|mut frame| shell.render(&mut frame))?;
        Ok(ControlFlow::Continue)
    })
}

/// Enter the terminal, run the desktop, and always leave the terminal again.
pub fn run<O, D>(
    output: &mut O,
    driver: D,
    shell: &mut DesktopShell,
    poll_interval: Duration,
    mouse_capture: bool,
) -> io::Result<()>
where
    O: OutputDriver,
    D: InputDriver,
{
    output.enter()?;
    let result = run_desktop(output, driver, shell, poll_interval, mouse_capture, Instant::now);
    let exit = output.exit();
    result.and(exit)
}

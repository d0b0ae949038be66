use std::time::Instant;

use clap::Parser;
use ratatui::layout::Rect;

use term_desk::config::{Cli, Config, StartupLogin};
use term_desk::constants::LOG_BUFFER_LINES;
use term_desk::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use term_desk::error::Result;
use term_desk::log_buffer::{self, LogHandle};
use term_desk::runner;
use term_desk::session::Session;
use term_desk::shell::DesktopShell;
use term_desk::tracing_sub;

fn main() -> Result<()> {
    let config = Config::try_from(Cli::parse())?;

    log_buffer::set_global(LogHandle::new(LOG_BUFFER_LINES));
    log_buffer::install_panic_hook();
    tracing_sub::init(config.log_level);

    let mut session = match &config.login {
        StartupLogin::Prompt => Session::new(),
        StartupLogin::Guest => {
            let mut session = Session::new();
            session.login_as_guest();
            session
        }
        StartupLogin::User(name) => Session::with_user(name.clone()),
    };
    session.theme = config.theme;

    let mut output = ConsoleOutputDriver::new()?;
    let size = output.size()?;
    let area = Rect::new(0, 0, size.width, size.height);
    let mut shell = DesktopShell::new(session, area, Instant::now());

    runner::run(
        &mut output,
        ConsoleInputDriver::new(),
        &mut shell,
        config.poll_interval,
        config.mouse_capture,
    )?;
    tracing::info!("desktop closed");
    Ok(())
}

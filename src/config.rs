//! Command line options and the runtime configuration derived from them.

use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tracing::Level;

use crate::error::DeskError;
use crate::theme::ThemeKind;

#[derive(Debug, Parser)]
#[command(version, about = "A simulated desktop shell for your terminal")]
pub struct Cli {
    /// Log in as this user without showing the login screen.
    #[arg(long, value_name = "NAME")]
    pub user: Option<String>,

    /// Start a Guest session without showing the login screen.
    #[arg(long, conflicts_with = "user")]
    pub skip_login: bool,

    /// Desktop background.
    #[arg(long, value_enum, default_value_t = ThemeKind::Gradient)]
    pub theme: ThemeKind,

    /// Input poll interval in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 16)]
    pub poll_ms: u64,

    /// Leave mouse capture off.
    #[arg(long)]
    pub no_mouse: bool,

    /// Maximum level written to the System Log.
    #[arg(long, value_name = "LEVEL", default_value = "debug")]
    pub log_level: String,
}

/// How the desktop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupLogin {
    Prompt,
    Guest,
    User(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub login: StartupLogin,
    pub theme: ThemeKind,
    pub poll_interval: Duration,
    pub mouse_capture: bool,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            login: StartupLogin::Prompt,
            theme: ThemeKind::default(),
            poll_interval: Duration::from_millis(16),
            mouse_capture: true,
            log_level: Level::DEBUG,
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = DeskError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let log_level = Level::from_str(&cli.log_level)
            .map_err(|_| DeskError::LogLevel(cli.log_level.clone()))?;
        let login = match (cli.user, cli.skip_login) {
            (Some(user), _) => StartupLogin::User(user),
            (None, true) => StartupLogin::Guest,
            (None, false) => StartupLogin::Prompt,
        };
        Ok(Self {
            login,
            theme: cli.theme,
            poll_interval: Duration::from_millis(cli.poll_ms.max(1)),
            mouse_capture: !cli.no_mouse,
            log_level,
        })
    }
}

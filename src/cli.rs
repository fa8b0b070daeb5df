use clap::{ArgGroup, Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_DB_PATH};
use crate::logging::LoggingConfig;

pub const DEFAULT_RECENT_ATTEMPTS: u32 = 5;

/// Log in to a captive portal and keep a record of every attempt.
///
/// Without an action flag, performs a login and then shows the most recent
/// attempts.
#[derive(Parser, Debug)]
#[command(name = "portal-autologin", version, about)]
#[command(group(
    ArgGroup::new("action")
        .args(["login", "setup", "test", "clear_logs", "prune_logs", "view_logs"])
        .multiple(false)
))]
pub struct Cli {
    /// Perform a login and print the outcome
    #[arg(long)]
    pub login: bool,

    /// Interactively create the config file
    #[arg(long)]
    pub setup: bool,

    /// Check that the login endpoint is reachable
    #[arg(long)]
    pub test: bool,

    /// Delete every recorded login attempt
    #[arg(long)]
    pub clear_logs: bool,

    /// Delete recorded attempts older than DAYS days
    #[arg(long, value_name = "DAYS")]
    pub prune_logs: Option<u32>,

    /// Show the N most recent login attempts
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub view_logs: Option<u32>,

    /// Number of recent attempts shown after a login
    #[arg(long, value_name = "N", default_value_t = DEFAULT_RECENT_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: u32,

    /// Use the credentials stored under this network name
    #[arg(long, value_name = "NAME")]
    pub network: Option<String>,

    /// Path of the JSON config file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Path of the attempt database
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DB_PATH)]
    pub db: PathBuf,

    /// Overall log level
    #[arg(long, value_enum, ignore_case = true)]
    pub log_level: Option<LogLevel>,

    /// Write logs to the rotating log file
    #[arg(long, overrides_with = "no_log_file")]
    pub log_file: bool,

    /// Do not write a log file
    #[arg(long, overrides_with = "log_file")]
    pub no_log_file: bool,

    /// Directory for the log file
    #[arg(long, value_name = "PATH")]
    pub log_dir: Option<PathBuf>,

    /// Log to the console
    #[arg(long, overrides_with = "no_console_logging")]
    pub console_logging: bool,

    /// Do not log to the console
    #[arg(long, overrides_with = "console_logging")]
    pub no_console_logging: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARNING")]
    Warning,
    #[value(name = "ERROR")]
    Error,
    #[value(name = "CRITICAL")]
    Critical,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Setup,
    Test,
    ClearLogs,
    PruneLogs(u32),
    ViewLogs(u32),
    Login,
    LoginAndShow(u32),
}

fn flag_pair(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.setup {
            Action::Setup
        } else if self.test {
            Action::Test
        } else if self.clear_logs {
            Action::ClearLogs
        } else if let Some(days) = self.prune_logs {
            Action::PruneLogs(days)
        } else if let Some(limit) = self.view_logs {
            Action::ViewLogs(limit)
        } else if self.login {
            Action::Login
        } else {
            Action::LoginAndShow(self.max_attempts)
        }
    }

    /// Applies the logging flags on top of `base`; flags that were not given
    /// leave the environment value in place.
    pub fn logging_config(&self, base: LoggingConfig) -> LoggingConfig {
        let mut config = base;

        if let Some(level) = self.log_level {
            config.level = level.into();
        }
        if let Some(enabled) = flag_pair(self.log_file, self.no_log_file) {
            config.file_enabled = enabled;
        }
        if let Some(dir) = &self.log_dir {
            config.dir = dir.clone();
        }
        if let Some(enabled) = flag_pair(self.console_logging, self.no_console_logging) {
            config.console_enabled = enabled;
        }

        config
    }

    pub fn app_config(&self, logging: LoggingConfig) -> AppConfig {
        AppConfig {
            config_path: self.config.clone(),
            db_path: self.db.clone(),
            logging: self.logging_config(logging),
        }
    }
}

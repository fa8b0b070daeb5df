//! Process-wide logging.
//!
//! Records go through the `log` facade into a [`Dispatcher`] that fans out to a
//! console sink (pretty_env_logger on stdout) and a size-rotated log file.
//! The dispatcher is installed once; calling [`init`] again swaps the sinks in
//! place, which is how CLI flags take over from the environment defaults.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock, RwLock};

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

pub const LOG_FILE_NAME: &str = "wifi_auto_auth.log";
const DEFAULT_LOG_DIR: &str = "./logs";
const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_BACKUP_COUNT: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to open log file {0}: {1}")]
    File(PathBuf, #[source] io::Error),
    #[error("Another logger is already installed")]
    AlreadyInstalled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    /// Explicit console threshold; falls back to `level` when unset.
    pub console_level: Option<LevelFilter>,
    pub console_enabled: bool,
    pub file_enabled: bool,
    pub dir: PathBuf,
    pub max_bytes: u64,
    pub backup_count: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            console_level: None,
            console_enabled: true,
            file_enabled: true,
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            max_bytes: DEFAULT_MAX_BYTES,
            backup_count: DEFAULT_BACKUP_COUNT,
        }
    }
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `LOG_LEVEL`, `CONSOLE_LOG_LEVEL`,
    /// `CONSOLE_LOGGING_ENABLED`, `LOG_FILE_ENABLED`, `LOG_DIR`,
    /// `LOG_MAX_BYTES` and `LOG_BACKUP_COUNT` as returned by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            level: lookup("LOG_LEVEL").map(|v| parse_level(&v)).unwrap_or(defaults.level),
            console_level: lookup("CONSOLE_LOG_LEVEL").map(|v| parse_level(&v)),
            console_enabled: parse_flag(lookup("CONSOLE_LOGGING_ENABLED"), defaults.console_enabled),
            file_enabled: parse_flag(lookup("LOG_FILE_ENABLED"), defaults.file_enabled),
            dir: lookup("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.dir),
            max_bytes: lookup("LOG_MAX_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_bytes),
            backup_count: lookup("LOG_BACKUP_COUNT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.backup_count),
        }
    }

    /// The console never shows more than the overall level lets through.
    pub fn effective_console_level(&self) -> LevelFilter {
        self.console_level.map_or(self.level, |console| console.min(self.level))
    }

    pub fn file_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}

/// Maps the level names used by the CLI and environment onto `log` levels.
/// Unknown names fall back to INFO.
pub fn parse_level(name: &str) -> LevelFilter {
    match name.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARNING" | "WARN" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    value.map_or(default, |v| v.eq_ignore_ascii_case("true"))
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Append-only log file that rolls over to `<name>.1` .. `<name>.N` once the
/// next line would reach `max_bytes`. Rollover is off when either limit is 0.
pub struct RotatingFile {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
    backup_count: usize,
}

impl RotatingFile {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();

        Ok(Self {
            path,
            file,
            written,
            max_bytes,
            backup_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    pub fn write_line(&mut self, line: &str) -> io::Result<()> {
        let incoming = line.len() as u64 + 1;
        if self.should_roll_over(incoming) {
            self.roll_over()?;
        }

        writeln!(self.file, "{line}")?;
        self.written += incoming;
        Ok(())
    }

    fn should_roll_over(&self, incoming: u64) -> bool {
        self.max_bytes > 0 && self.backup_count > 0 && self.written > 0 && self.written + incoming >= self.max_bytes
    }

    fn roll_over(&mut self) -> io::Result<()> {
        self.file.flush()?;

        for index in (1..self.backup_count).rev() {
            let source = self.backup_path(index);
            if source.exists() {
                let target = self.backup_path(index + 1);
                if target.exists() {
                    fs::remove_file(&target)?;
                }
                fs::rename(&source, &target)?;
            }
        }

        let first = self.backup_path(1);
        if first.exists() {
            fs::remove_file(&first)?;
        }
        fs::rename(&self.path, &first)?;

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

struct Sinks {
    level: LevelFilter,
    console: Option<env_logger::Logger>,
    file: Option<Mutex<RotatingFile>>,
}

impl Sinks {
    fn build(config: &LoggingConfig) -> Result<Self, LoggingError> {
        let console = config.console_enabled.then(|| {
            pretty_env_logger::formatted_timed_builder()
                .filter_level(config.effective_console_level())
                .target(env_logger::Target::Stdout)
                .build()
        });

        let file = if config.file_enabled {
            let path = config.file_path();
            fs::create_dir_all(&config.dir).map_err(|e| LoggingError::File(path.clone(), e))?;
            let file = RotatingFile::open(&path, config.max_bytes, config.backup_count)
                .map_err(|e| LoggingError::File(path, e))?;
            Some(Mutex::new(file))
        } else {
            None
        };

        Ok(Self {
            level: config.level,
            console,
            file,
        })
    }
}

struct Dispatcher {
    sinks: RwLock<Sinks>,
}

static DISPATCHER: Dispatcher = Dispatcher {
    sinks: RwLock::new(Sinks {
        level: LevelFilter::Off,
        console: None,
        file: None,
    }),
};

/// Outcome of the one `log::set_logger` call this process makes.
static INSTALLED: OnceLock<bool> = OnceLock::new();

impl Log for Dispatcher {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.sinks
            .read()
            .map(|sinks| metadata.level() <= sinks.level)
            .unwrap_or(false)
    }

    fn log(&self, record: &Record) {
        let Ok(sinks) = self.sinks.read() else {
            return;
        };
        if record.level() > sinks.level {
            return;
        }

        if let Some(console) = &sinks.console {
            console.log(record);
        }

        if let Some(file) = &sinks.file {
            let line = format!(
                "{} [{}] [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                level_label(record.level()),
                record.target(),
                record.line().unwrap_or(0),
                record.args()
            );
            if let Ok(mut file) = file.lock() {
                // Nowhere left to report a failing log write.
                let _ = file.write_line(&line);
            }
        }
    }

    fn flush(&self) {
        if let Ok(sinks) = self.sinks.read() {
            if let Some(console) = &sinks.console {
                console.flush();
            }
            if let Some(file) = &sinks.file {
                if let Ok(mut file) = file.lock() {
                    let _ = file.file.flush();
                }
            }
        }
    }
}

/// Runs `install` at most once per `state`; a failed install stays failed.
fn ensure_installed(state: &OnceLock<bool>, install: impl FnOnce() -> bool) -> Result<(), LoggingError> {
    if *state.get_or_init(install) {
        Ok(())
    } else {
        Err(LoggingError::AlreadyInstalled)
    }
}

/// Installs the process logger, or reconfigures it if already installed.
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let sinks = Sinks::build(config)?;
    ensure_installed(&INSTALLED, || log::set_logger(&DISPATCHER).is_ok())?;

    if let Ok(mut current) = DISPATCHER.sinks.write() {
        *current = sinks;
    }

    log::set_max_level(config.level);
    Ok(())
}

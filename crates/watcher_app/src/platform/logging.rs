//! Logger setup for the watcher binary: terminal, an append-only log file, or both.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

pub const DEFAULT_LOG_FILE: &str = "watcher.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogDestination {
    File,
    Terminal,
    #[default]
    Both,
}

impl LogDestination {
    fn writes_terminal(self) -> bool {
        matches!(self, LogDestination::Terminal | LogDestination::Both)
    }

    fn writes_file(self) -> bool {
        matches!(self, LogDestination::File | LogDestination::Both)
    }
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub destination: LogDestination,
    pub verbose: bool,
    /// Appended to across runs; parent directories are created.
    pub file: PathBuf,
}

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. A log file that cannot be opened is reported on
/// stderr and skipped; the terminal logger, if requested, still works.
pub fn initialize(settings: &LogSettings) {
    let (loggers, file_error) = build_loggers(settings);
    if let Some(err) = file_error {
        eprintln!("Warning: cannot log to {:?}: {}", settings.file, err);
    }
    if !loggers.is_empty() {
        let _ = CombinedLogger::init(loggers);
    }
}

fn build_loggers(settings: &LogSettings) -> (Vec<Box<dyn SharedLogger>>, Option<io::Error>) {
    let level = level_for(settings.verbose);
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    let mut file_error = None;

    if settings.destination.writes_terminal() {
        loggers.push(TermLogger::new(
            level,
            line_format(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
    }
    if settings.destination.writes_file() {
        match open_log_file(&settings.file) {
            Ok(file) => loggers.push(WriteLogger::new(level, line_format(), file)),
            Err(err) => file_error = Some(err),
        }
    }
    (loggers, file_error)
}

fn line_format() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

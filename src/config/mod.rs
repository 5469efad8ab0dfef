//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub use defaults::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_LAUNCHER, DEFAULT_POLL_MS, DEFAULT_TITLE,
    EMUBIN_DIR_NAME, MAX_FRAME_DIM, MAX_POLL_MS, MIN_POLL_MS,
};

/// CLI options for the emuface harness window.
#[derive(Debug, Parser, Clone)]
#[command(about = "emuface: embed an emulator window and relay its controls", author, version)]
pub struct AppConfig {
    /// Launcher command line; the harness window id is appended as the last argument
    #[arg(long, env = "EMUFACE_LAUNCHER", default_value = DEFAULT_LAUNCHER)]
    pub launcher: String,

    /// Auxiliary binary directory prepended to PATH and PYTHONPATH
    /// (defaults to `emubin` next to the executable)
    #[arg(long, env = "EMUFACE_EMUBIN")]
    pub emubin: Option<PathBuf>,

    /// Emulator framebuffer width in pixels
    #[arg(long, default_value_t = DEFAULT_FRAME_WIDTH)]
    pub width: u16,

    /// Emulator framebuffer height in pixels
    #[arg(long, default_value_t = DEFAULT_FRAME_HEIGHT)]
    pub height: u16,

    /// Interval between frame polls (milliseconds)
    #[arg(long = "poll-ms", default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,

    /// Window title, also shown in the status strip until the child starts
    #[arg(long, default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Hide the simulated control panel and disable signal relay
    #[arg(long = "no-controls", default_value_t = false)]
    pub no_controls: bool,

    /// Do not overlay the wall-clock timestamp on captured frames
    #[arg(long = "no-clock", default_value_t = false)]
    pub no_clock: bool,

    /// Console log verbosity
    #[arg(
        long = "log-level",
        env = "EMUFACE_LOG_LEVEL",
        value_enum,
        default_value_t = LogLevel::Debug
    )]
    pub log_level: LogLevel,

    /// Also write a JSON trace log
    #[arg(long = "logs", env = "EMUFACE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// JSON trace log location
    #[arg(long = "log-file", env = "EMUFACE_TRACE_LOG")]
    pub log_file: Option<PathBuf>,

    /// Disable all logging (overrides --logs and --log-level)
    #[arg(long = "no-logs", env = "EMUFACE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

/// Console verbosity levels exposed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#![deny(missing_docs)]
//! Shared logging utilities for the report workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! logger initialization for the binary and a minimal test initializer.
//!
//! Every macro accepts an optional `task = <id>;` prefix which tags the
//! message with the server task it belongs to:
//!
//! ```ignore
//! engine_info!(task = task_id; "snapshot percent={}", percent);
//! ```

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    (task = $task:expr; $($arg:tt)*) => {{
        log::trace!("[task {}] {}", $task, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    (task = $task:expr; $($arg:tt)*) => {{
        log::info!("[task {}] {}", $task, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    (task = $task:expr; $($arg:tt)*) => {{
        log::debug!("[task {}] {}", $task, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    (task = $task:expr; $($arg:tt)*) => {{
        log::warn!("[task {}] {}", $task, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    (task = $task:expr; $($arg:tt)*) => {{
        log::error!("[task {}] {}", $task, format_args!($($arg)*));
    }};
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Destination for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDestination {
    /// Write to a log file only.
    File,
    /// Write to the terminal (stderr for warnings and errors).
    Terminal,
    /// Write to both file and terminal.
    Both,
    /// Install no logger.
    Off,
}

/// Initialize the global logger.
///
/// `log_file` is only used for `File` and `Both`; if it cannot be created the
/// file logger is skipped with a warning on stderr. Calling this twice is
/// harmless, the second call leaves the first logger in place.
pub fn initialize(destination: LogDestination, level: LevelFilter, log_file: &Path) {
    let loggers: Vec<Box<dyn SharedLogger>> = match destination {
        LogDestination::Off => return,
        LogDestination::File => create_file_logger(level, build_config(), log_file)
            .into_iter()
            .collect(),
        LogDestination::Terminal => vec![TermLogger::new(
            level,
            build_config(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )],
        LogDestination::Both => {
            let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
                level,
                build_config(),
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )];
            loggers.extend(create_file_logger(level, build_config(), log_file));
            loggers
        }
    };

    if loggers.is_empty() {
        return;
    }
    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    log_file: &Path,
) -> Option<Box<dyn SharedLogger>> {
    match File::create(log_file) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!(
                "Warning: Could not create log file at {:?}: {}",
                log_file, err
            );
            None
        }
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

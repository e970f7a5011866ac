//! Logging setup
//!
//! Log records go both to stdout and to the session's log file, prefixed by
//! the seconds elapsed since the session was opened and a short level tag:
//!
//! ```text
//!     [  1.234567 INF] Drawing session started at (120, 80) px
//!     [  1.301122 DBG] traj_lib::sampler: Waypoint 0 at (1.250, 0.800) m
//! ```
//!
//! Debug and trace records also carry their target module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("The log level must let at least info records through, found `{0}`")]
    LevelTooLow(LevelFilter),

    #[error("Cannot open the log file: {0}")]
    LogFileError(std::io::Error),

    #[error("A logger has already been set: {0}")]
    AlreadySet(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the global logger for the given session.
///
/// `min_level` must be `Info` or more verbose. Can only be called once per
/// process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::LevelTooLow(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {}] {}{}",
                session::get_elapsed_seconds(),
                level_tag(record.level()),
                target_prefix(record),
                message
            ))
        })
        .level(min_level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::AlreadySet)?;

    info!("Logger initialised at {:?}", min_level);
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log file: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Three letter tag for a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERR".red().bold(),
        Level::Warn => "WRN".yellow(),
        Level::Info => "INF".normal(),
        Level::Debug => "DBG".dimmed(),
        Level::Trace => "TRC".dimmed().italic(),
    }
}

/// `"<target>: "` for debug and trace records, empty otherwise
fn target_prefix(record: &Record) -> String {
    if record.level() > Level::Info {
        format!("{}: ", record.target())
    } else {
        String::new()
    }
}

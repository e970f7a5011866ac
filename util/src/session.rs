//! Execution sessions
//!
//! Every run of an executable gets its own session directory holding the log
//! file and the archives written during the run:
//!
//! ```text
//!     <sessions_dir>/<exec_name>_<YYYYmmdd_HHMMSS>/
//!         <exec_name>.log
//!         arch/
//! ```
//!
//! The time the session was opened is the epoch used to timestamp log
//! messages. Only one session can be opened per process.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal imports
use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// `strftime` format of the timestamp in session directory names.
const DIR_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Name of the archive directory inside a session.
const ARCH_DIR_NAME: &str = "arch";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Paths belonging to the current session
#[derive(Clone, Debug)]
pub struct Session {
    /// Session directory
    pub session_root: PathBuf,

    /// Directory archives are written into
    pub arch_root: PathBuf,

    pub log_file_path: PathBuf,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Cannot create session directory {0:?}: {1}")]
    CannotCreateDir(PathBuf, std::io::Error),

    #[error("A session has already been opened in this process ({0})")]
    AlreadyOpen(conquer_once::TryInitError),

    #[error("The session epoch is not set")]
    NoEpoch,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Open a new session for `exec_name` inside `sessions_dir`.
    pub fn new<P: AsRef<Path>>(exec_name: &str, sessions_dir: P) -> Result<Self, SessionError> {
        EPOCH
            .try_init_once(Utc::now)
            .map_err(SessionError::AlreadyOpen)?;
        let epoch = get_epoch().ok_or(SessionError::NoEpoch)?;

        let session_root = sessions_dir.as_ref().join(format!(
            "{}_{}",
            exec_name,
            epoch.format(DIR_TIMESTAMP_FORMAT)
        ));
        let arch_root = session_root.join(ARCH_DIR_NAME);
        create_dir(&arch_root)?;

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            arch_root,
        })
    }

    /// Get a subdirectory of the archive directory, creating it if needed.
    pub fn arch_subdir(&self, name: &str) -> Result<PathBuf, SessionError> {
        let dir = self.arch_root.join(name);
        create_dir(&dir)?;
        Ok(dir)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds since the session was opened, `NAN` before that.
pub fn get_elapsed_seconds() -> f64 {
    get_epoch()
        .and_then(|e| time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(std::f64::NAN)
}

/// Time the session was opened, or `None` if no session is open.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    EPOCH.get()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn create_dir(path: &Path) -> Result<(), SessionError> {
    fs::create_dir_all(path).map_err(|e| SessionError::CannotCreateDir(path.to_path_buf(), e))
}

#[cfg(test)]
mod test {
    use super::*;

    // The epoch is global, so this is the only test which opens a session
    #[test]
    fn test_open_session() {
        let sessions_dir =
            std::env::temp_dir().join(format!("util_session_test_{}", std::process::id()));

        assert!(get_elapsed_seconds().is_nan());

        let session = Session::new("test_exec", &sessions_dir).unwrap();
        assert!(session.session_root.starts_with(&sessions_dir));
        assert!(session.arch_root.is_dir());
        assert_eq!(
            session.log_file_path.file_name().unwrap().to_str(),
            Some("test_exec.log")
        );
        assert!(get_elapsed_seconds() >= 0.0);

        let sub = session.arch_subdir("module").unwrap();
        assert!(sub.is_dir());
        assert_eq!(sub.parent(), Some(session.arch_root.as_path()));

        assert!(matches!(
            Session::new("test_exec", &sessions_dir),
            Err(SessionError::AlreadyOpen(_))
        ));

        fs::remove_dir_all(&sessions_dir).unwrap();
    }
}

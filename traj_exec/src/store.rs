//! # Trajectory store
//!
//! Committed trajectories are kept under increasing integer identifiers. The
//! directory store writes the command file of trajectory `N` to
//! `trajectoryN.txt` and its point log to `pointsN.txt`, with identifiers
//! starting at 1.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    commit::CommitRecord,
    emitter::{parse_point_log, CommandFile, ParseError},
    points::RawPoint,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Keyed store of committed trajectories.
pub trait TrajectoryStore {
    /// Store a committed trajectory, returning its identifier.
    fn put(&mut self, record: &CommitRecord) -> Result<u32, StoreError>;

    /// Get the command file of a stored trajectory.
    fn commands(&self, id: u32) -> Result<CommandFile, StoreError>;

    /// Get the raw points of a stored trajectory.
    fn points(&self, id: u32) -> Result<Vec<RawPoint>, StoreError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Store writing each trajectory as a pair of text files in one directory.
#[derive(Debug)]
pub struct DirStore {
    root: PathBuf,
    next_id: u32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot create the store directory {0:?}: {1}")]
    CreateError(PathBuf, std::io::Error),

    #[error("Cannot write {0:?}: {1}")]
    WriteError(PathBuf, std::io::Error),

    #[error("Cannot read {0:?}: {1}")]
    ReadError(PathBuf, std::io::Error),

    #[error("No trajectory with id {0}")]
    NotFound(u32),

    #[error("Stored trajectory is malformed: {0}")]
    ParseError(#[from] ParseError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DirStore {
    /// Open the store in the given directory, creating it if needed.
    ///
    /// Numbering continues after the highest identifier already in the
    /// directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| StoreError::CreateError(root.clone(), e))?;

        let re = Regex::new(r"^trajectory(\d+)\.txt$").map_err(|e| {
            StoreError::CreateError(
                root.clone(),
                std::io::Error::new(std::io::ErrorKind::Other, e),
            )
        })?;

        let last_id = fs::read_dir(&root)
            .map_err(|e| StoreError::ReadError(root.clone(), e))?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                re.captures(name.to_str()?)?.get(1)?.as_str().parse::<u32>().ok()
            })
            .max()
            .unwrap_or(0);

        info!(
            "Trajectory store opened at {:?}, next id is {}",
            root,
            last_id + 1
        );

        Ok(Self {
            root,
            next_id: last_id + 1,
        })
    }

    /// Path to the command file of the given trajectory.
    pub fn commands_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("trajectory{}.txt", id))
    }

    /// Path to the point log of the given trajectory.
    pub fn points_path(&self, id: u32) -> PathBuf {
        self.root.join(format!("points{}.txt", id))
    }

    /// Identifier the next stored trajectory will get.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    fn read(&self, id: u32, path: PathBuf) -> Result<String, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(id));
        }
        fs::read_to_string(&path).map_err(|e| StoreError::ReadError(path, e))
    }
}

impl TrajectoryStore for DirStore {
    fn put(&mut self, record: &CommitRecord) -> Result<u32, StoreError> {
        let id = self.next_id;

        let commands_path = self.commands_path(id);
        write_whole(&commands_path, &record.commands)?;

        // Leave no half stored trajectory behind
        if let Err(e) = write_whole(&self.points_path(id), &record.points) {
            let _ = fs::remove_file(&commands_path);
            return Err(e);
        }

        self.next_id += 1;
        debug!("Stored trajectory {} in {:?}", id, self.root);

        Ok(id)
    }

    fn commands(&self, id: u32) -> Result<CommandFile, StoreError> {
        Ok(self.read(id, self.commands_path(id))?.parse::<CommandFile>()?)
    }

    fn points(&self, id: u32) -> Result<Vec<RawPoint>, StoreError> {
        Ok(parse_point_log(&self.read(id, self.points_path(id))?)?)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Write the whole file next to its destination then move it into place, so
/// that a failed write never leaves a truncated file behind.
fn write_whole(path: &Path, contents: &str) -> Result<(), StoreError> {
    let tmp = path.with_extension("txt.tmp");

    fs::write(&tmp, contents).map_err(|e| StoreError::WriteError(tmp.clone(), e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::WriteError(path.to_path_buf(), e)
    })
}

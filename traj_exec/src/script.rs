//! # Event script interpreter
//!
//! Replays host events from a text script, one event per line:
//!
//! ```text
//!     # Comments start with a hash
//!     down
//!     move 120,340
//!     up
//!     commit
//!     load 1
//!     reset
//! ```
//!
//! This lets the pipeline be driven without an interactive host.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

// Internal
use crate::{draw_ctrl::DrawInput, points::RawPoint};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A script interpreter.
///
/// Events are read in order with [`EventScript::next_event`].
#[derive(Debug, Clone)]
pub struct EventScript {
    events: VecDeque<ScriptEvent>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A single scripted event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptEvent {
    /// Pointer input forwarded to the drawing controller
    Input(DrawInput),

    /// Commit the current path
    Commit,

    /// Load a stored trajectory by id
    Load(u32),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script contains no events")]
    ScriptEmpty,

    #[error("Line {0}: cannot understand {1:?}")]
    InvalidEvent(usize, String),

    #[error("Line {0}: {1:?} is not a valid number")]
    InvalidNumber(usize, String),

    #[error("Invalid script pattern: {0}")]
    PatternError(#[from] regex::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl EventScript {
    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path.to_path_buf()));
        }

        fs::read_to_string(path)
            .map_err(ScriptError::ScriptLoadError)?
            .parse()
    }

    /// Pop the next event, or `None` at the end of the script.
    pub fn next_event(&mut self) -> Option<ScriptEvent> {
        self.events.pop_front()
    }

    /// Number of events left in the script
    pub fn num_events(&self) -> usize {
        self.events.len()
    }
}

impl FromStr for EventScript {
    type Err = ScriptError;

    fn from_str(script: &str) -> Result<Self, Self::Err> {
        let re = RegexBuilder::new(
            r"^(?:(?P<word>down|up|reset|commit)|move\s+(?P<x>-?\d+)\s*,\s*(?P<y>-?\d+)|load\s+(?P<id>\d+))$",
        )
        .case_insensitive(true)
        .build()?;

        let mut events = VecDeque::new();

        for (i, line) in script.lines().enumerate() {
            let line_num = i + 1;

            // Strip comments and surrounding whitespace
            let text = line.split('#').next().unwrap_or("").trim();
            if text.is_empty() {
                continue;
            }

            let cap = re
                .captures(text)
                .ok_or_else(|| ScriptError::InvalidEvent(line_num, text.to_string()))?;

            let number = |name: &str| -> Result<i64, ScriptError> {
                let s = cap.name(name).map(|m| m.as_str()).unwrap_or("");
                s.parse()
                    .map_err(|_| ScriptError::InvalidNumber(line_num, s.to_string()))
            };

            let event = if let Some(word) = cap.name("word") {
                match word.as_str().to_lowercase().as_str() {
                    "down" => ScriptEvent::Input(DrawInput::PointerDown),
                    "up" => ScriptEvent::Input(DrawInput::PointerUp),
                    "reset" => ScriptEvent::Input(DrawInput::Reset),
                    _ => ScriptEvent::Commit,
                }
            } else if cap.name("id").is_some() {
                let id = number("id")?;
                ScriptEvent::Load(to_num(line_num, id)?)
            } else {
                let x = to_num(line_num, number("x")?)?;
                let y = to_num(line_num, number("y")?)?;
                ScriptEvent::Input(DrawInput::PointerMove(RawPoint::new(x, y)))
            };

            events.push_back(event);
        }

        if events.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(Self { events })
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn to_num<T: std::convert::TryFrom<i64>>(line_num: usize, value: i64) -> Result<T, ScriptError> {
    T::try_from(value).map_err(|_| ScriptError::InvalidNumber(line_num, value.to_string()))
}

//! Drawing control module
//!
//! Consumes the pointer events delivered by the host and drives the path
//! sampler for the current drawing session. Once the host is happy with the
//! path it calls [`DrawCtrl::commit`] to run the commit pipeline.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use state::*;

use crate::{commit::CommitError, params::ParamsError, points::RawPoint};
use util::{archive::ArchiveError, session::SessionError};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A pointer event from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawInput {
    /// The pointer button was pressed.
    PointerDown,

    /// The pointer moved to the given pixel.
    PointerMove(RawPoint),

    /// The pointer button was released.
    PointerUp,

    /// Discard the current drawing.
    Reset,
}

/// Possible errors that can occur during DrawCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DrawCtrlError {
    #[error("DrawCtrl has not been initialised")]
    NotInitialised,

    #[error("Invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("Commit failed: {0}")]
    Commit(#[from] CommitError),

    #[error("Cannot create the archive directory: {0}")]
    Session(#[from] SessionError),

    #[error("Cannot archive the status report: {0}")]
    Archive(#[from] ArchiveError),
}

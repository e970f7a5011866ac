//! Implementations for the DrawCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, warn};
use serde::Serialize;
use std::rc::Rc;

// Internal
use super::{DrawCtrlError, DrawInput};
use crate::{
    boundary::BoundaryOracle,
    commit::{self, CommitRecord},
    params::Params,
    sampler::{DrawSession, PathSampler, SampleOutcome},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drawing control module state
#[derive(Default)]
pub struct DrawCtrl {
    pub(crate) params: Params,

    sampler: Option<PathSampler>,
    oracle: Option<Rc<dyn BoundaryOracle>>,

    pub(crate) session: DrawSession,

    /// True while the pointer button is held down
    pointer_held: bool,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Initialisation data for DrawCtrl.
pub struct InitData {
    pub params: Params,

    /// Terrain classification of the track being drawn on
    pub oracle: Rc<dyn BoundaryOracle>,
}

/// Status report for DrawCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    pub started: bool,
    pub valid: bool,
    pub pointer_held: bool,
    pub num_waypoints: usize,
    pub num_points: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DrawCtrl {
    type InitData = InitData;
    type InitError = DrawCtrlError;

    type InputData = DrawInput;
    type OutputData = Option<SampleOutcome>;
    type StatusReport = StatusReport;
    type ProcError = DrawCtrlError;

    /// Initialise the DrawCtrl module.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.params.validate()?;

        self.sampler = Some(PathSampler::new(&init_data.params));
        self.oracle = Some(init_data.oracle);
        self.params = init_data.params;
        self.session.reset();
        self.pointer_held = false;
        self.update_report();

        Ok(())
    }

    /// Process a single pointer event.
    ///
    /// Only pointer moves produce a sample outcome.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let (sampler, oracle) = match (&self.sampler, &self.oracle) {
            (Some(s), Some(o)) => (s, o),
            _ => return Err(DrawCtrlError::NotInitialised),
        };

        let output = match input_data {
            DrawInput::PointerDown => {
                self.pointer_held = true;
                None
            }
            DrawInput::PointerMove(raw) => {
                if self.pointer_held {
                    let is_first = !self.session.is_started();
                    let outcome =
                        sampler.on_point(&mut self.session, oracle.as_ref(), *raw, is_first);

                    // Stop drawing as soon as the path leaves the terrain
                    if outcome == SampleOutcome::Rejected {
                        self.pointer_held = false;
                    }

                    Some(outcome)
                } else {
                    Some(SampleOutcome::Ignored)
                }
            }
            DrawInput::PointerUp => {
                self.pointer_held = false;
                None
            }
            DrawInput::Reset => {
                debug!("Drawing reset");
                self.session.reset();
                self.pointer_held = false;
                None
            }
        };

        self.update_report();

        Ok((output, self.report))
    }
}

impl DrawCtrl {
    /// Archive the status report into the given session.
    pub fn init_archive(&mut self, session: &Session) -> Result<(), DrawCtrlError> {
        let dir = session.arch_subdir("draw_ctrl")?;
        self.arch_report = Archiver::from_abs_path(dir.join("status_report.csv"))?;
        Ok(())
    }

    /// Run the commit pipeline over the current session.
    ///
    /// On success the session is cleared ready for the next path. On failure
    /// it is kept so the host can show the path before resetting it.
    pub fn commit(&mut self) -> Result<CommitRecord, DrawCtrlError> {
        if self.sampler.is_none() {
            return Err(DrawCtrlError::NotInitialised);
        }

        match commit::commit(&self.session, &self.params) {
            Ok(record) => {
                self.session.reset();
                self.pointer_held = false;
                self.update_report();
                Ok(record)
            }
            Err(e) => {
                warn!("Commit failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// The current drawing session.
    pub fn session(&self) -> &DrawSession {
        &self.session
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn report(&self) -> StatusReport {
        self.report
    }

    fn update_report(&mut self) {
        let report = StatusReport {
            started: self.session.is_started(),
            valid: self.session.is_valid(),
            pointer_held: self.pointer_held,
            num_waypoints: self.session.waypoints().len(),
            num_points: self.session.all_points().len(),
        };

        if self.report.valid && !report.valid && report.started {
            info!("Path invalidated after {} points", report.num_points);
        }

        self.report = report;
    }
}

impl Archived for DrawCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

//! Main trajectory executable entry point.
//!
//! # Architecture
//!
//! The executable replays a script of host events against a track mask:
//!
//!     - Initialise the session, logging and parameters
//!     - Load the track mask and initialise DrawCtrl
//!     - Main loop, one script event per iteration:
//!         - Pointer events are processed by DrawCtrl
//!         - Commits run the commit pipeline and store the trajectory
//!         - Loads read a stored trajectory back from the store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::rc::Rc;
use structopt::StructOpt;

// Internal
use traj_lib::{
    boundary::TerrainMask,
    commit::CommitRecord,
    draw_ctrl::{DrawCtrl, InitData},
    params::Params,
    script::{EventScript, ScriptEvent},
    store::{DirStore, TrajectoryStore},
};
use util::{
    archive::{Archived, Archiver},
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Replay a script of pointer events over a track and store the committed
/// trajectories.
#[derive(Debug, StructOpt)]
#[structopt(name = "traj_exec")]
struct Opt {
    /// Path to the event script
    #[structopt(parse(from_os_str))]
    script: PathBuf,

    /// Path to the precomputed track mask image
    #[structopt(short, long, parse(from_os_str))]
    mask: PathBuf,

    /// Parameter file, relative paths are searched for in
    /// `$TRAJ_SW_ROOT/params`. Defaults are used if not given.
    #[structopt(short, long, parse(from_os_str))]
    params: Option<PathBuf>,

    /// Directory the trajectories are stored in. Defaults to a `trajectories`
    /// directory inside the session.
    #[structopt(short, long, parse(from_os_str))]
    out: Option<PathBuf>,

    /// Directory new sessions are created in
    #[structopt(long, default_value = "sessions", parse(from_os_str))]
    sessions_dir: PathBuf,

    /// Log debug messages, repeat for trace
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

/// Archived summary of a stored trajectory.
#[derive(Debug, Serialize)]
struct CommitSummary {
    id: u32,
    num_waypoints: usize,
    num_points: usize,
    x_m: f64,
    y_m: f64,
    heading_rad: f64,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("traj_exec", &opt.sessions_dir).wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match opt.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: Params = match opt.params {
        Some(ref path) => util::params::load(path)
            .wrap_err_with(|| format!("Could not load parameters from {:?}", path))?,
        None => {
            info!("No parameter file given, using the default parameters");
            Params::default()
        }
    };
    debug!("Parameters: {:#?}", params);

    // ---- INITIALISE MODULES ----

    let mask = TerrainMask::load(&opt.mask, params.mask_threshold)
        .wrap_err_with(|| format!("Could not load the track mask from {:?}", opt.mask))?;
    info!(
        "Track mask loaded: {}x{} px (eroded by {} px)",
        mask.width(),
        mask.height(),
        params.dilation_radius_px
    );

    let mut draw_ctrl = DrawCtrl::default();
    draw_ctrl
        .init(InitData {
            params,
            oracle: Rc::new(mask),
        })
        .wrap_err("Failed to initialise DrawCtrl")?;
    draw_ctrl
        .init_archive(&session)
        .wrap_err("Failed to initialise the DrawCtrl archive")?;

    let out_dir = opt
        .out
        .clone()
        .unwrap_or_else(|| session.session_root.join("trajectories"));
    let mut store = DirStore::new(&out_dir).wrap_err("Failed to open the trajectory store")?;

    let mut arch_commits =
        Archiver::from_path(&session, "commits.csv").wrap_err("Failed to create the commit archive")?;

    let mut script = EventScript::new(&opt.script).wrap_err("Failed to load script")?;
    info!(
        "Script {:?} loaded with {} events",
        opt.script,
        script.num_events()
    );

    info!("Initialisation complete\n");

    // ---- MAIN LOOP ----

    let mut num_stored = 0;
    let mut num_failed = 0;

    while let Some(event) = script.next_event() {
        match event {
            ScriptEvent::Input(input) => {
                let (outcome, report) = draw_ctrl
                    .proc(&input)
                    .wrap_err("Error during DrawCtrl processing")?;
                debug!("{:?} -> {:?}, {:?}", input, outcome, report);

                draw_ctrl
                    .write()
                    .wrap_err("Failed to archive the DrawCtrl status report")?;
            }
            ScriptEvent::Commit => match draw_ctrl.commit() {
                Ok(record) => {
                    let id = store.put(&record).wrap_err("Failed to store the trajectory")?;
                    info!("Trajectory {} stored in {:?}", id, out_dir);

                    arch_commits
                        .serialise(CommitSummary::new(id, &record))
                        .wrap_err("Failed to archive the commit")?;
                    num_stored += 1;
                }
                // DrawCtrl has already reported the cause
                Err(_) => num_failed += 1,
            },
            ScriptEvent::Load(id) => match (store.commands(id), store.points(id)) {
                (Ok(file), Ok(points)) => info!(
                    "Trajectory {}: start ({:.3}, {:.3}) m, heading {:.4} rad, {} commands, {} points",
                    id,
                    file.pose.position_m.x,
                    file.pose.position_m.y,
                    file.pose.heading_rad,
                    file.commands.len(),
                    points.len()
                ),
                (Err(e), _) | (_, Err(e)) => warn!("Cannot load trajectory {}: {}", id, e),
            },
        }
    }

    info!(
        "End of script: {} trajectories stored, {} commits failed",
        num_stored, num_failed
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommitSummary {
    fn new(id: u32, record: &CommitRecord) -> Self {
        Self {
            id,
            num_waypoints: record.num_waypoints,
            num_points: record.num_points,
            x_m: record.pose.position_m.x,
            y_m: record.pose.position_m.y,
            heading_rad: record.pose.heading_rad,
        }
    }
}

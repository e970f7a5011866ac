//! # Trajectory library.
//!
//! Converts a freehand path drawn over a track image into the command file
//! consumed by the vehicle simulator. The pipeline, leaves first:
//!
//! - [`boundary`] - drivable terrain classification of pixels
//! - [`sampler`] - turns the raw pointer stream into metric waypoints
//! - [`curvature`] - numerical curvature and speed along the waypoints
//! - [`steering`] - bicycle model steering angle from curvature
//! - [`pose`] - initial pose of the vehicle
//! - [`emitter`] - command file and point log formats
//!
//! [`draw_ctrl`] ties these together behind the host's pointer events, and
//! [`commit`] runs the pipeline once a path is finished.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Terrain classification of pixels from a precomputed track mask
pub mod boundary;

/// Commit pipeline - turns a finished drawing session into command and point files
pub mod commit;

/// Curvature estimation over the waypoint sequence
pub mod curvature;

/// Drawing control module - consumes host pointer events
pub mod draw_ctrl;

/// Command file and point log formats
pub mod emitter;

/// Calibration parameters
pub mod params;

/// Raw and metric point types and the waypoint sequence
pub mod points;

/// Initial pose estimation
pub mod pose;

/// Path sampler - down-samples the raw pointer stream into waypoints
pub mod sampler;

/// Event script interpreter used to replay host events
pub mod script;

/// Steering model - curvature to steering angle
pub mod steering;

/// Keyed store of committed trajectories
pub mod store;

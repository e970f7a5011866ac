//! # Commit pipeline
//!
//! Runs the curvature, steering, pose and emitter stages over a finished
//! drawing session, producing the command file and point log bytes for one
//! trajectory. The session itself is only read: the caller decides whether
//! to clear it afterwards.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

use crate::{
    curvature::{self, CurvatureError},
    emitter::{emit_commands, emit_point_log, EmitError},
    params::Params,
    pose::{estimate_pose, Pose, PoseError, MIN_POSE_WAYPOINTS},
    sampler::DrawSession,
    steering::{SteeringError, SteeringModel},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Output of a successful commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRecord {
    /// Initial pose written on the first line of the command file
    pub pose: Pose,

    /// Contents of the command file
    pub commands: String,

    /// Contents of the point log
    pub points: String,

    pub num_waypoints: usize,
    pub num_points: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommitError {
    #[error("No path has been drawn")]
    NoSession,

    #[error("The path left the start terrain, reset the drawing and try again")]
    InvalidPath,

    #[error("The path has {found} waypoints, at least {required} are needed")]
    InsufficientSamples { found: usize, required: usize },

    #[error("Waypoint {index} coincides with its neighbours, curvature is undefined")]
    DivisionSingularity { index: usize },

    #[error("Steering angle undefined at waypoint {index} (wheelbase * curvature = {argument:.4})")]
    AngleOutOfDomain { index: usize, argument: f64 },

    #[error("Curvature estimation failed: {0}")]
    Curvature(CurvatureError),

    #[error("Cannot build the command file: {0}")]
    Emit(#[from] EmitError),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run the full pipeline over the given session.
pub fn commit(session: &DrawSession, params: &Params) -> Result<CommitRecord, CommitError> {
    if !session.is_started() {
        return Err(CommitError::NoSession);
    }
    if !session.is_valid() {
        warn!("Commit refused, the path is invalid");
        return Err(CommitError::InvalidPath);
    }

    let waypoints = session.waypoints();
    if waypoints.len() < MIN_POSE_WAYPOINTS {
        return Err(CommitError::InsufficientSamples {
            found: waypoints.len(),
            required: MIN_POSE_WAYPOINTS,
        });
    }

    let profile = curvature::estimate(waypoints.xpos_m(), waypoints.ypos_m())?;
    let angles = SteeringModel::new(params).angles(profile.curvature_m.iter())?;

    let start_m = session
        .start_m(params.distance_ratio_px_m)
        .ok_or(CommitError::NoSession)?;
    let pose = estimate_pose(&start_m, waypoints, params.world_height_m)?;

    let commands = emit_commands(&pose, &profile.speed.to_vec(), &angles)?;
    let points = emit_point_log(session.all_points());

    info!(
        "Committed path: {} waypoints, {} points, start ({:.3}, {:.3}) m, heading {:.4} rad",
        waypoints.len(),
        session.all_points().len(),
        pose.position_m.x,
        pose.position_m.y,
        pose.heading_rad
    );

    Ok(CommitRecord {
        pose,
        commands,
        points,
        num_waypoints: waypoints.len(),
        num_points: session.all_points().len(),
    })
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl From<CurvatureError> for CommitError {
    fn from(e: CurvatureError) -> Self {
        match e {
            CurvatureError::DivisionSingularity { index } => {
                CommitError::DivisionSingularity { index }
            }
            CurvatureError::TooFewSamples(found) => CommitError::InsufficientSamples {
                found,
                required: MIN_POSE_WAYPOINTS,
            },
            e => CommitError::Curvature(e),
        }
    }
}

impl From<SteeringError> for CommitError {
    fn from(e: SteeringError) -> Self {
        match e {
            SteeringError::AngleOutOfDomain { index, argument } => {
                CommitError::AngleOutOfDomain { index, argument }
            }
        }
    }
}

impl From<PoseError> for CommitError {
    fn from(e: PoseError) -> Self {
        match e {
            PoseError::InsufficientWaypoints(found) => CommitError::InsufficientSamples {
                found,
                required: MIN_POSE_WAYPOINTS,
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        boundary::BoundaryOracle,
        emitter::CommandFile,
        params::AnglePolicy,
        points::RawPoint,
        sampler::PathSampler,
    };
    use std::f64::consts::FRAC_PI_4;

    fn everywhere(_x: i32, _y: i32) -> bool {
        true
    }

    /// Params capturing every accepted point as a waypoint
    fn dense_params() -> Params {
        let mut params = Params::default();
        params.sample_interval = 1;
        params
    }

    fn draw<O: BoundaryOracle>(params: &Params, oracle: &O, points: &[(i32, i32)]) -> DrawSession {
        let sampler = PathSampler::new(params);
        let mut session = DrawSession::new();
        for (i, (x, y)) in points.iter().enumerate() {
            sampler.on_point(&mut session, oracle, RawPoint::new(*x, *y), i == 0);
        }
        session
    }

    #[test]
    fn test_straight_line() {
        let params = dense_params();
        let session = draw(
            &params,
            &everywhere,
            &[(100, 100), (110, 100), (120, 100), (130, 100), (140, 100)],
        );

        let record = commit(&session, &params).unwrap();
        assert_eq!(record.num_waypoints, 4);
        assert_eq!(record.num_points, 4);
        assert_eq!(record.points, "110,100\n120,100\n130,100\n140,100");
        assert!(record.commands.starts_with("1.000,3.670,0.00000000\n"));

        let file: CommandFile = record.commands.parse().unwrap();
        assert!((file.pose.position_m - record.pose.position_m).norm() < 1e-9);
        assert_eq!(file.pose.heading_rad, record.pose.heading_rad);
        assert_eq!(file.commands.len(), 4);
        for c in &file.commands {
            assert!((c.speed - 0.1).abs() < 1e-8);
            assert!(c.steer_angle_rad.abs() < 1e-8);
        }
    }

    #[test]
    fn test_commit_is_idempotent() {
        let params = Params::default();
        let points: Vec<(i32, i32)> = (0..200)
            .map(|i| {
                let t = i as f64 / 60.0;
                ((300.0 + 150.0 * t.cos()) as i32, (300.0 - 150.0 * t.sin()) as i32)
            })
            .collect();
        let session = draw(&params, &everywhere, &points);

        let a = commit(&session, &params).unwrap();
        let b = commit(&session, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.num_waypoints, 7);
    }

    #[test]
    fn test_session_errors() {
        let params = dense_params();

        assert_eq!(
            commit(&DrawSession::new(), &params),
            Err(CommitError::NoSession)
        );

        let session = draw(&params, &everywhere, &[(100, 100), (110, 100), (120, 100)]);
        assert_eq!(
            commit(&session, &params),
            Err(CommitError::InsufficientSamples {
                found: 2,
                required: 3
            })
        );

        let track = |x: i32, _y: i32| x < 150;
        let session = draw(
            &params,
            &track,
            &[(100, 100), (110, 100), (120, 100), (200, 100), (130, 100)],
        );
        assert_eq!(commit(&session, &params), Err(CommitError::InvalidPath));
    }

    #[test]
    fn test_coincident_waypoints() {
        let params = dense_params();
        let session = draw(
            &params,
            &everywhere,
            &[(100, 100), (110, 100), (110, 100), (120, 100)],
        );
        assert_eq!(
            commit(&session, &params),
            Err(CommitError::DivisionSingularity { index: 0 })
        );
    }

    #[test]
    fn test_sharp_turn_follows_angle_policy() {
        // A 10 cm square turn, far tighter than the vehicle can steer
        let corner = [(100, 100), (110, 100), (110, 110), (100, 110), (100, 100)];

        let mut params = dense_params();
        let session = draw(&params, &everywhere, &corner);

        match commit(&session, &params) {
            Err(CommitError::AngleOutOfDomain { index, argument }) => {
                assert_eq!(index, 0);
                assert!(argument < -1.0);
            }
            r => panic!("Expected AngleOutOfDomain, got {:?}", r),
        }

        params.angle_policy = AnglePolicy::Clamp;
        let record = commit(&session, &params).unwrap();
        let file: CommandFile = record.commands.parse().unwrap();
        assert!((file.commands[0].steer_angle_rad + FRAC_PI_4).abs() < 1e-8);
        for c in &file.commands {
            assert!(c.steer_angle_rad.abs() <= FRAC_PI_4 + 1e-8);
        }
    }
}

//! # Pose estimation
//!
//! The initial pose of the vehicle is the start point of the drawn path with
//! a heading estimated from the first waypoints. Positions are converted from
//! the screen frame (Y down) to the simulator frame (Y up) by flipping Y about
//! the height of the world shown in the track image.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::PI;

use crate::points::{MetricPoint, WaypointSequence};
use util::maths::mean;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of waypoints needed to estimate a pose.
pub const MIN_POSE_WAYPOINTS: usize = 3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Initial pose of the vehicle in the simulator frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pose {
    /// Position in the simulator frame.
    ///
    /// Units: meters
    pub position_m: Vector2<f64>,

    /// Angle to the positive X axis, counter clockwise in the simulator
    /// frame.
    ///
    /// Units: radians
    pub heading_rad: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PoseError {
    #[error("At least 3 waypoints are needed to estimate the pose, found {0}")]
    InsufficientWaypoints(usize),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the initial pose from the start of the path and its waypoints.
///
/// Waypoint 0 is captured on the very first sample after the start and
/// carries mostly pointer jitter, so the heading is the mean slope of the
/// three segments joining the start, waypoint 1 and waypoint 2.
pub fn estimate_pose(
    start_m: &MetricPoint,
    waypoints: &WaypointSequence,
    world_height_m: f64,
) -> Result<Pose, PoseError> {
    let (w1, w2) = match (waypoints.get(1), waypoints.get(2)) {
        (Some(w1), Some(w2)) => (w1, w2),
        _ => return Err(PoseError::InsufficientWaypoints(waypoints.len())),
    };

    let slopes = [slope(start_m, &w1), slope(start_m, &w2), slope(&w1, &w2)];
    let mean_slope = mean(&slopes).unwrap_or(0.0);

    // atan only covers half the circle, moving towards -X is the other half
    let heading_rad = if w1.x - start_m.x > 0.0 {
        mean_slope.atan()
    } else {
        PI + mean_slope.atan()
    };

    Ok(Pose {
        position_m: Vector2::new(start_m.x, world_height_m - start_m.y),
        heading_rad,
    })
}

/// Slope of the segment from `a` to `b`, as seen in the simulator frame.
///
/// The points are in the screen frame, so the Y difference is reversed.
/// Vertical segments have a slope of 0.
pub fn slope(a: &MetricPoint, b: &MetricPoint) -> f64 {
    if a.x != b.x {
        (a.y - b.y) / (b.x - a.x)
    } else {
        0.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    const EPS: f64 = 1e-12;

    fn seq(points: &[(f64, f64)]) -> WaypointSequence {
        points.iter().map(|(x, y)| MetricPoint::new(*x, *y)).collect()
    }

    #[test]
    fn test_slope() {
        let o = MetricPoint::new(0.0, 0.0);
        assert_eq!(slope(&o, &MetricPoint::new(10.0, 0.0)), 0.0);
        // Up the screen is up in the simulator
        assert_eq!(slope(&o, &MetricPoint::new(1.0, -1.0)), 1.0);
        assert_eq!(slope(&o, &MetricPoint::new(1.0, 2.0)), -2.0);
        // Vertical
        assert_eq!(slope(&o, &MetricPoint::new(0.0, 5.0)), 0.0);
    }

    #[test]
    fn test_heading_to_the_right() {
        let start = MetricPoint::new(1.0, 2.0);
        let wps = seq(&[(1.05, 2.0), (2.0, 2.0), (3.0, 2.0)]);
        let pose = estimate_pose(&start, &wps, 4.67).unwrap();

        assert_eq!(pose.heading_rad, 0.0);
        assert_eq!(pose.position_m.x, 1.0);
        assert!((pose.position_m.y - 2.67).abs() < EPS);
    }

    #[test]
    fn test_heading_to_the_left() {
        let start = MetricPoint::new(3.0, 1.0);
        let wps = seq(&[(2.95, 1.0), (2.0, 1.0), (1.0, 1.0)]);
        let pose = estimate_pose(&start, &wps, 4.67).unwrap();

        assert_eq!(pose.heading_rad, PI);
    }

    #[test]
    fn test_diagonal_headings() {
        let start = MetricPoint::new(1.0, 3.0);

        // Up and right on screen
        let wps = seq(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]);
        let pose = estimate_pose(&start, &wps, 4.67).unwrap();
        assert!((pose.heading_rad - FRAC_PI_4).abs() < EPS);

        // Down and left on screen
        let wps = seq(&[(1.0, 3.0), (0.5, 3.5), (0.0, 4.0)]);
        let pose = estimate_pose(&start, &wps, 4.67).unwrap();
        assert!((pose.heading_rad - (PI + FRAC_PI_4)).abs() < EPS);
    }

    #[test]
    fn test_vertical_start() {
        // Straight up the screen: every slope is 0 and the X displacement is
        // not positive, giving a heading of pi
        let start = MetricPoint::new(1.0, 3.0);
        let wps = seq(&[(1.0, 2.95), (1.0, 2.0), (1.0, 1.0)]);
        let pose = estimate_pose(&start, &wps, 4.67).unwrap();
        assert_eq!(pose.heading_rad, PI);
    }

    #[test]
    fn test_world_height_is_used() {
        let start = MetricPoint::new(0.5, 1.0);
        let wps = seq(&[(0.6, 1.0), (1.0, 1.0), (1.5, 1.0)]);
        let pose = estimate_pose(&start, &wps, 10.0).unwrap();
        assert_eq!(pose.position_m, Vector2::new(0.5, 9.0));
    }

    #[test]
    fn test_insufficient_waypoints() {
        let start = MetricPoint::new(0.0, 0.0);
        assert_eq!(
            estimate_pose(&start, &seq(&[(1.0, 0.0), (2.0, 0.0)]), 4.67),
            Err(PoseError::InsufficientWaypoints(2))
        );
    }
}

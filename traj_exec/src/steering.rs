//! # Steering model
//!
//! Bicycle model approximation of the front wheel angle needed to follow a
//! given curvature. The turn radius is `R = 1/c`, so for a wheelbase `L` the
//! steering angle is `atan(L/R) = atan(L c)`.
//!
//! The model is only used while `|L c| < 1`. Outside of that range the angle
//! is undefined and the configured [`AnglePolicy`] decides what happens.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use util::maths::clamp;

use crate::params::{AnglePolicy, Params};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest steering angle magnitude the model can produce, `atan(1)`.
///
/// Units: radians
pub const MAX_STEER_ANGLE_RAD: f64 = std::f64::consts::FRAC_PI_4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts curvatures into steering angles.
#[derive(Debug, Clone, Copy)]
pub struct SteeringModel {
    wheelbase_m: f64,
    policy: AnglePolicy,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SteeringError {
    #[error(
        "Steering angle undefined at waypoint {index}: wheelbase * curvature = {argument:.4} \
         is outside (-1, 1)"
    )]
    AngleOutOfDomain { index: usize, argument: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringModel {
    pub fn new(params: &Params) -> Self {
        Self {
            wheelbase_m: params.wheelbase_m,
            policy: params.angle_policy,
        }
    }

    /// Steering angle for the curvature at the given waypoint index.
    pub fn angle(&self, index: usize, curv_m: f64) -> Result<f64, SteeringError> {
        if let Some(angle_rad) = curvature_to_angle(curv_m, self.wheelbase_m) {
            return Ok(angle_rad);
        }

        let argument = self.wheelbase_m * curv_m;

        match self.policy {
            AnglePolicy::Clamp if !argument.is_nan() => {
                // |L c| >= 1 here, so the clamped argument is exactly ±1
                let angle_rad = clamp(&argument, &-1.0, &1.0) * MAX_STEER_ANGLE_RAD;
                warn!(
                    "Steering angle at waypoint {} saturated to {:.4} rad (L*c = {:.4})",
                    index, angle_rad, argument
                );
                Ok(angle_rad)
            }
            _ => Err(SteeringError::AngleOutOfDomain { index, argument }),
        }
    }

    /// Steering angles for a whole curvature sequence.
    pub fn angles<'a, I>(&self, curvature_m: I) -> Result<Vec<f64>, SteeringError>
    where
        I: IntoIterator<Item = &'a f64>,
    {
        curvature_m
            .into_iter()
            .enumerate()
            .map(|(i, c)| self.angle(i, *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Steering angle for the given curvature, or `None` if `|L c| >= 1`.
pub fn curvature_to_angle(curv_m: f64, wheelbase_m: f64) -> Option<f64> {
    let argument = wheelbase_m * curv_m;

    if -1.0 < argument && argument < 1.0 {
        Some(argument.atan())
    } else {
        None
    }
}

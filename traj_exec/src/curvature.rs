//! # Curvature estimation
//!
//! Curvature of the path is estimated from the waypoint positions by
//! numerical differentiation with respect to the waypoint index. Since the
//! waypoints are sampled at a fixed cadence the first derivative magnitude is
//! also used as the speed of the vehicle along the path.
//!
//! For a path `(x(t), y(t))`:
//!
//! ```text
//!     speed = sqrt(x'^2 + y'^2)
//!     curv  = (x'' y' - x' y'') / speed^3
//! ```
//!
//! The sign is that of the screen frame, where Y grows downwards.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use ndarray::{s, Array1, ArrayView1};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Curvature and speed at each waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureProfile {
    /// Curvature at each waypoint.
    ///
    /// Units: 1/meters
    pub curvature_m: Array1<f64>,

    /// Magnitude of the first derivative of position at each waypoint.
    ///
    /// Units: meters/sample
    pub speed: Array1<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurvatureError {
    #[error("X and Y sequences have different lengths ({x} and {y})")]
    LengthMismatch { x: usize, y: usize },

    #[error("At least 2 samples are needed to differentiate, found {0}")]
    TooFewSamples(usize),

    #[error("Speed is zero at waypoint {index}, curvature is undefined (coincident waypoints)")]
    DivisionSingularity { index: usize },
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the curvature and speed of the path through the given points.
pub fn estimate(xpos_m: &[f64], ypos_m: &[f64]) -> Result<CurvatureProfile, CurvatureError> {
    if xpos_m.len() != ypos_m.len() {
        return Err(CurvatureError::LengthMismatch {
            x: xpos_m.len(),
            y: ypos_m.len(),
        });
    }

    let x_t = gradient(ArrayView1::from(xpos_m))?;
    let y_t = gradient(ArrayView1::from(ypos_m))?;
    let xx_t = gradient(x_t.view())?;
    let yy_t = gradient(y_t.view())?;

    let speed = (&x_t * &x_t + &y_t * &y_t).mapv(f64::sqrt);

    // A stationary sample makes the denominator vanish
    if let Some(index) = speed.iter().position(|s| *s == 0.0) {
        return Err(CurvatureError::DivisionSingularity { index });
    }

    let curvature_m = (&xx_t * &y_t - &x_t * &yy_t) / speed.mapv(|s| s.powi(3));

    Ok(CurvatureProfile { curvature_m, speed })
}

/// Numerical gradient of uniformly spaced samples.
///
/// Interior points use the centred difference `(f[i+1] - f[i-1]) / 2`, the
/// two end points use one-sided first differences.
pub fn gradient(values: ArrayView1<f64>) -> Result<Array1<f64>, CurvatureError> {
    let n = values.len();
    if n < 2 {
        return Err(CurvatureError::TooFewSamples(n));
    }

    let mut grad = Array1::zeros(n);

    grad[0] = values[1] - values[0];
    grad[n - 1] = values[n - 1] - values[n - 2];

    if n > 2 {
        let interior = (&values.slice(s![2..]) - &values.slice(s![..n - 2])) / 2.0;
        grad.slice_mut(s![1..n - 1]).assign(&interior);
    }

    Ok(grad)
}

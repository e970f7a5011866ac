//! Calibration parameters for the trajectory pipeline

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory pipeline.
///
/// Every field has a default matching the reference track, so a parameter
/// file only needs to list the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- CALIBRATION ----
    /// Screen to world scale.
    ///
    /// Units: pixels/meter
    pub distance_ratio_px_m: f64,

    /// Height of the world shown by the track image, used to flip the screen
    /// Y axis into the simulator frame.
    ///
    /// Units: meters
    pub world_height_m: f64,

    // ---- SAMPLING ----
    /// Number of accepted raw points between two waypoints.
    pub sample_interval: u32,

    // ---- VEHICLE ----
    /// Distance between the front and rear axles of the vehicle.
    ///
    /// Units: meters
    pub wheelbase_m: f64,

    /// What to do with a curvature whose steering angle is undefined.
    pub angle_policy: AnglePolicy,

    // ---- TRACK MASK ----
    /// Radius of the disk the track mask was eroded with. Only recorded here
    /// so that the mask and the commands can be traced back to the same
    /// calibration.
    ///
    /// Units: pixels
    pub dilation_radius_px: u32,

    /// Fraction of full scale above which a mask pixel is drivable.
    pub mask_threshold: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Resolution applied when `|wheelbase * curvature| >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnglePolicy {
    /// Refuse the whole commit.
    Abort,

    /// Substitute the bound of the valid range, `±atan(1)`, keeping the sign
    /// of the curvature.
    Clamp,
}

/// Invalid parameter values.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("distance_ratio_px_m must be positive and finite, found {0}")]
    InvalidDistanceRatio(f64),

    #[error("sample_interval must be at least 1")]
    ZeroSampleInterval,

    #[error("wheelbase_m must be positive and finite, found {0}")]
    InvalidWheelbase(f64),

    #[error("mask_threshold must be within [0, 1], found {0}")]
    InvalidMaskThreshold(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            distance_ratio_px_m: 100.0,
            world_height_m: 4.67,
            sample_interval: 30,
            wheelbase_m: 0.3355,
            angle_policy: AnglePolicy::default(),
            dilation_radius_px: 10,
            mask_threshold: 0.5,
        }
    }
}

impl Default for AnglePolicy {
    fn default() -> Self {
        AnglePolicy::Abort
    }
}

impl Params {
    /// Check that the parameters can be used by the pipeline.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.distance_ratio_px_m.is_finite() && self.distance_ratio_px_m > 0.0) {
            return Err(ParamsError::InvalidDistanceRatio(self.distance_ratio_px_m));
        }
        if self.sample_interval == 0 {
            return Err(ParamsError::ZeroSampleInterval);
        }
        if !(self.wheelbase_m.is_finite() && self.wheelbase_m > 0.0) {
            return Err(ParamsError::InvalidWheelbase(self.wheelbase_m));
        }
        if !(0.0..=1.0).contains(&self.mask_threshold) {
            return Err(ParamsError::InvalidMaskThreshold(self.mask_threshold));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let params: Params = util::params::from_str(
            r#"
            wheelbase_m = 0.25
            angle_policy = "clamp"
            "#,
        )
        .unwrap();

        assert_eq!(params.wheelbase_m, 0.25);
        assert_eq!(params.angle_policy, AnglePolicy::Clamp);
        assert_eq!(params.distance_ratio_px_m, 100.0);
        assert_eq!(params.sample_interval, 30);
        assert_eq!(params.world_height_m, 4.67);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let mut params = Params::default();
        params.sample_interval = 0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::ZeroSampleInterval)
        ));

        let mut params = Params::default();
        params.distance_ratio_px_m = 0.0;
        assert!(matches!(
            params.validate(),
            Err(ParamsError::InvalidDistanceRatio(_))
        ));
    }
}

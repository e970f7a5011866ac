//! # Points
//!
//! Pixel and metric point types, and the down-sampled waypoint sequence.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};
use serde::Serialize;

// ---------------------------------------------------------------------------
// TYPES
// ---------------------------------------------------------------------------

/// A pointer position in screen pixels. Screen Y grows downwards.
pub type RawPoint = Point2<i32>;

/// A position in meters, in the screen orientation (Y grows downwards).
pub type MetricPoint = Vector2<f64>;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Ordered waypoints of a drawn path, stored as parallel X and Y sequences.
///
/// The sequence is append-only, so both sequences always have the same
/// length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaypointSequence {
    xpos_m: Vec<f64>,
    ypos_m: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WaypointSequence {
    /// Create a new empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a waypoint to the end of the sequence.
    pub fn push(&mut self, point_m: MetricPoint) {
        self.xpos_m.push(point_m.x);
        self.ypos_m.push(point_m.y);
    }

    /// Get the waypoint at `index`, or `None` if it is out of range.
    pub fn get(&self, index: usize) -> Option<MetricPoint> {
        Some(MetricPoint::new(
            *self.xpos_m.get(index)?,
            *self.ypos_m.get(index)?,
        ))
    }

    pub fn xpos_m(&self) -> &[f64] {
        &self.xpos_m
    }

    pub fn ypos_m(&self) -> &[f64] {
        &self.ypos_m
    }

    pub fn len(&self) -> usize {
        self.xpos_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xpos_m.is_empty()
    }

    /// Remove all waypoints.
    pub fn clear(&mut self) {
        self.xpos_m.clear();
        self.ypos_m.clear();
    }
}

impl std::iter::FromIterator<MetricPoint> for WaypointSequence {
    fn from_iter<I: IntoIterator<Item = MetricPoint>>(iter: I) -> Self {
        let mut seq = Self::new();
        for p in iter {
            seq.push(p);
        }
        seq
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert a pixel position into meters using the screen to world ratio.
pub fn px_to_m(point_px: &RawPoint, distance_ratio_px_m: f64) -> MetricPoint {
    MetricPoint::new(
        point_px.x as f64 / distance_ratio_px_m,
        point_px.y as f64 / distance_ratio_px_m,
    )
}

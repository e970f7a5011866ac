//! # Path sampler
//!
//! The path sampler consumes the raw pointer positions of a drawing session
//! and down-samples them into metric waypoints at a fixed cadence. Every
//! accepted point is also kept in the session's point log so the path can be
//! redrawn later.
//!
//! A point is accepted only if it lies on the same class of terrain as the
//! start of the path. The first point that does not invalidates the whole
//! session: nothing more is sampled until the session is reset.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info, trace, warn};

use crate::{
    boundary::{BoundaryOracle, Terrain},
    params::Params,
    points::{px_to_m, MetricPoint, RawPoint, WaypointSequence},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Converts raw pointer positions into waypoints.
#[derive(Debug, Clone, Copy)]
pub struct PathSampler {
    distance_ratio_px_m: f64,
    sample_interval: u32,
}

/// State of one drawing session, from the first pointer sample until a reset
/// or a commit.
#[derive(Debug, Clone, Default)]
pub struct DrawSession {
    /// First point of the session
    start_px: Option<RawPoint>,

    /// Terrain under the first point, `None` if it was outside the mask
    start_terrain: Option<Terrain>,

    /// Last accepted point
    prev_px: Option<RawPoint>,

    /// Number of points accepted since the last waypoint
    current_interval: u32,

    /// Displacement accumulated since the last waypoint
    current_distance_m: MetricPoint,

    waypoints: WaypointSequence,

    /// Every accepted point, plus the point which invalidated the session
    all_points: Vec<RawPoint>,

    valid: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Result of feeding one pointer sample to the sampler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleOutcome {
    /// The sample started a new session.
    Started,

    /// The sample was accepted but did not complete an interval.
    Accepted,

    /// The sample was accepted and captured as a waypoint.
    Waypoint(MetricPoint),

    /// The sample left the start terrain, the session is now invalid.
    Rejected,

    /// The sample was not used.
    Ignored,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSampler {
    pub fn new(params: &Params) -> Self {
        Self {
            distance_ratio_px_m: params.distance_ratio_px_m,
            sample_interval: params.sample_interval,
        }
    }

    /// Process one raw pointer sample for the given session.
    ///
    /// `is_first` marks the first sample of a session, which only sets the
    /// start point. The cadence counter starts one short of the interval so
    /// that the first sample after the start is always captured as a
    /// waypoint.
    pub fn on_point<O>(
        &self,
        session: &mut DrawSession,
        oracle: &O,
        raw: RawPoint,
        is_first: bool,
    ) -> SampleOutcome
    where
        O: BoundaryOracle + ?Sized,
    {
        if is_first {
            let start_terrain = oracle.terrain_at(&raw);
            *session = DrawSession {
                start_px: Some(raw),
                start_terrain,
                prev_px: Some(raw),
                current_interval: self.sample_interval.saturating_sub(1),
                valid: true,
                ..DrawSession::default()
            };

            let start_m = px_to_m(&raw, self.distance_ratio_px_m);
            info!(
                "Drawing session started at ({}, {}) px, ({:.2}, {:.2}) m",
                raw.x, raw.y, start_m.x, start_m.y
            );
            if start_terrain != Some(Terrain::Track) {
                warn!("Drawing session started outside of the track ({:?})", start_terrain);
            }

            return SampleOutcome::Started;
        }

        let prev_px = match (session.valid, session.prev_px) {
            (true, Some(p)) => p,
            _ => return SampleOutcome::Ignored,
        };

        // Reject points which are not on the same terrain as the start
        let terrain = oracle.terrain_at(&raw);
        if terrain.is_none() || terrain != session.start_terrain {
            warn!(
                "Point ({}, {}) left the start terrain ({:?} -> {:?}), path is now invalid",
                raw.x, raw.y, session.start_terrain, terrain
            );
            session.valid = false;
            session.all_points.push(raw);
            return SampleOutcome::Rejected;
        }

        session.all_points.push(raw);

        session.current_distance_m += MetricPoint::new(
            (raw.x - prev_px.x) as f64 / self.distance_ratio_px_m,
            (raw.y - prev_px.y) as f64 / self.distance_ratio_px_m,
        );
        session.prev_px = Some(raw);
        session.current_interval += 1;

        trace!(
            "Accepted ({}, {}), interval {}/{}",
            raw.x,
            raw.y,
            session.current_interval,
            self.sample_interval
        );

        if session.current_interval < self.sample_interval {
            return SampleOutcome::Accepted;
        }

        // Interval complete, capture the current point
        let waypoint_m = px_to_m(&raw, self.distance_ratio_px_m);
        debug!(
            "Waypoint {} at ({:.3}, {:.3}) m, interval chord {:.3} m",
            session.waypoints.len(),
            waypoint_m.x,
            waypoint_m.y,
            session.current_distance_m.norm()
        );
        session.waypoints.push(waypoint_m);
        session.current_interval = 0;
        session.current_distance_m = MetricPoint::zeros();

        SampleOutcome::Waypoint(waypoint_m)
    }
}

impl DrawSession {
    /// Create an empty session which has not started yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every sequence and the validity flag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True once the first point has been received.
    pub fn is_started(&self) -> bool {
        self.start_px.is_some()
    }

    /// True while every sample has stayed on the start terrain. A session
    /// which has not started is not valid.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn start_px(&self) -> Option<RawPoint> {
        self.start_px
    }

    /// Start point in meters, screen orientation.
    pub fn start_m(&self, distance_ratio_px_m: f64) -> Option<MetricPoint> {
        self.start_px
            .map(|p| px_to_m(&p, distance_ratio_px_m))
    }

    pub fn waypoints(&self) -> &WaypointSequence {
        &self.waypoints
    }

    pub fn all_points(&self) -> &[RawPoint] {
        &self.all_points
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::boundary::TerrainMask;
    use image::{GrayImage, Luma};

    fn everywhere(_x: i32, _y: i32) -> bool {
        true
    }

    fn sampler() -> PathSampler {
        PathSampler::new(&Params::default())
    }

    /// Feed a horizontal line of `n` points after a start at the origin,
    /// `dx` pixels apart.
    fn draw_line<O: BoundaryOracle>(
        sampler: &PathSampler,
        session: &mut DrawSession,
        oracle: &O,
        n: i32,
        dx: i32,
    ) -> Vec<SampleOutcome> {
        let mut outcomes = vec![sampler.on_point(session, oracle, RawPoint::new(0, 0), true)];
        for i in 1..=n {
            outcomes.push(sampler.on_point(session, oracle, RawPoint::new(i * dx, 0), false));
        }
        outcomes
    }

    #[test]
    fn test_first_point_starts_session() {
        let s = sampler();
        let mut session = DrawSession::new();
        assert!(!session.is_started());
        assert!(!session.is_valid());

        let outcome = s.on_point(&mut session, &everywhere, RawPoint::new(120, 80), true);

        assert_eq!(outcome, SampleOutcome::Started);
        assert!(session.is_started());
        assert!(session.is_valid());
        assert_eq!(session.start_px(), Some(RawPoint::new(120, 80)));
        assert_eq!(session.start_m(100.0), Some(MetricPoint::new(1.2, 0.8)));
        assert!(session.waypoints().is_empty());
        assert!(session.all_points().is_empty());
    }

    #[test]
    fn test_first_sample_after_start_is_a_waypoint() {
        let s = sampler();
        let mut session = DrawSession::new();
        let outcomes = draw_line(&s, &mut session, &everywhere, 31, 5);

        assert_eq!(outcomes[1], SampleOutcome::Waypoint(MetricPoint::new(0.05, 0.0)));
        for o in &outcomes[2..31] {
            assert_eq!(*o, SampleOutcome::Accepted);
        }
        assert_eq!(outcomes[31], SampleOutcome::Waypoint(MetricPoint::new(1.55, 0.0)));

        // The second waypoint closes an interval of 30 points, 5 px apart
        let wps = session.waypoints();
        let chord = (wps.get(1).unwrap() - wps.get(0).unwrap()).norm();
        assert!((chord - 1.5).abs() < 1e-12);
        assert_eq!(session.all_points().len(), 31);
    }

    #[test]
    fn test_cadence_count() {
        let s = sampler();
        for k in 0..4 {
            let mut session = DrawSession::new();
            draw_line(&s, &mut session, &everywhere, k * 30 + 1, 1);
            assert_eq!(session.waypoints().len(), (k + 1) as usize);
            assert_eq!(session.all_points().len(), (k * 30 + 1) as usize);
        }

        // One point short of the next interval gives no extra waypoint
        let mut session = DrawSession::new();
        draw_line(&s, &mut session, &everywhere, 30, 1);
        assert_eq!(session.waypoints().len(), 1);
    }

    #[test]
    fn test_custom_interval() {
        let mut params = Params::default();
        params.sample_interval = 2;
        let s = PathSampler::new(&params);
        let mut session = DrawSession::new();
        draw_line(&s, &mut session, &everywhere, 5, 10);

        // Captured at points 1, 3 and 5
        assert_eq!(session.waypoints().xpos_m(), &[0.1, 0.3, 0.5]);
    }

    #[test]
    fn test_violation_is_sticky() {
        let s = sampler();
        let mut session = DrawSession::new();
        let track = |x: i32, _y: i32| x < 50;

        let outcomes = draw_line(&s, &mut session, &track, 12, 5);

        // 45 is the last point on the track, 50 leaves it
        assert_eq!(outcomes[9], SampleOutcome::Accepted);
        assert_eq!(outcomes[10], SampleOutcome::Rejected);
        assert_eq!(outcomes[11], SampleOutcome::Ignored);
        assert!(!session.is_valid());

        // Coming back onto the track does not restore validity
        let back = s.on_point(&mut session, &track, RawPoint::new(10, 0), false);
        assert_eq!(back, SampleOutcome::Ignored);
        assert!(!session.is_valid());

        // The offending point is logged, later ones are not
        assert_eq!(session.all_points().len(), 10);
        assert_eq!(session.all_points().last(), Some(&RawPoint::new(50, 0)));
        assert_eq!(session.waypoints().len(), 1);

        // Reset clears everything
        session.reset();
        assert!(!session.is_started());
        assert!(session.all_points().is_empty());
        assert!(session.waypoints().is_empty());
    }

    #[test]
    fn test_start_off_track_compares_against_start_class() {
        let s = sampler();
        let mut session = DrawSession::new();
        let track = |x: i32, _y: i32| x > 100;

        // Start and points all off the track: same class, so still valid
        draw_line(&s, &mut session, &track, 10, 5);
        assert!(session.is_valid());

        // Crossing onto the track changes class
        let outcome = s.on_point(&mut session, &track, RawPoint::new(150, 0), false);
        assert_eq!(outcome, SampleOutcome::Rejected);
        assert!(!session.is_valid());
    }

    #[test]
    fn test_zero_interval_captures_every_point() {
        let mut params = Params::default();
        params.sample_interval = 0;
        let s = PathSampler::new(&params);
        let mut session = DrawSession::new();
        let outcomes = draw_line(&s, &mut session, &everywhere, 3, 10);

        assert_eq!(outcomes[0], SampleOutcome::Started);
        assert_eq!(session.waypoints().xpos_m(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_start_outside_mask_rejects_everything() {
        let img = GrayImage::from_pixel(10, 10, Luma([255]));
        let mask = TerrainMask::from_image(&img, 0.5).unwrap();
        let s = sampler();
        let mut session = DrawSession::new();

        let start = s.on_point(&mut session, &mask, RawPoint::new(-1, 0), true);
        assert_eq!(start, SampleOutcome::Started);
        assert!(session.is_valid());

        // Also outside the mask, but unknown terrain never matches
        let outcome = s.on_point(&mut session, &mask, RawPoint::new(-2, 0), false);
        assert_eq!(outcome, SampleOutcome::Rejected);
        assert!(!session.is_valid());
        assert_eq!(session.all_points(), &[RawPoint::new(-2, 0)]);

        let outcome = s.on_point(&mut session, &mask, RawPoint::new(5, 5), false);
        assert_eq!(outcome, SampleOutcome::Ignored);
    }

    #[test]
    fn test_not_started_ignores_points() {
        let s = sampler();
        let mut session = DrawSession::new();
        let outcome = s.on_point(&mut session, &everywhere, RawPoint::new(1, 1), false);
        assert_eq!(outcome, SampleOutcome::Ignored);
        assert!(session.all_points().is_empty());
    }
}

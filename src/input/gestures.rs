//! Touch gesture recognizers.
//!
//! Each recognizer matches one atomic pattern on the shared touch stream. They
//! keep only in-flight counters between events and are reset, never recreated,
//! between gesture attempts.

use crate::{
    core::{
        constants::{MAX_TAP_DISTANCE, MAX_TAP_INTERVAL_MS, MAX_TOUCH_TIME_MS},
        geo::Point,
    },
    input::events::{TouchEvent, TouchPoint},
    prelude::{Duration, HashMap, Instant},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Touch and tap counts a `TapRecognizer` matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TapConfig {
    /// Simultaneous touches per tap
    pub num_touches: usize,
    /// Consecutive taps
    pub num_taps: u32,
}

impl TapConfig {
    pub fn new(num_touches: usize, num_taps: u32) -> Self {
        Self {
            num_touches,
            num_taps,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_touches == 0 || self.num_taps == 0 {
            return Err(MapError::InvalidConfiguration(format!(
                "tap gesture needs at least one touch and one tap, got {}x{}",
                self.num_touches, self.num_taps
            )));
        }
        Ok(())
    }
}

/// Timing and distance bounds shared by tap recognizers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureTolerances {
    /// Maximum time between the ends of two consecutive taps
    pub max_tap_interval_ms: u64,
    /// Maximum time a single tap may stay down
    pub max_touch_time_ms: u64,
    /// Maximum travel of a touch (and between consecutive taps) in pixels
    pub max_distance: f64,
}

impl GestureTolerances {
    pub fn max_tap_interval(&self) -> Duration {
        Duration::from_millis(self.max_tap_interval_ms)
    }

    pub fn max_touch_time(&self) -> Duration {
        Duration::from_millis(self.max_touch_time_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(MapError::InvalidConfiguration(format!(
                "max_distance must be a non-negative number, got {}",
                self.max_distance
            )));
        }
        Ok(())
    }
}

impl Default for GestureTolerances {
    fn default() -> Self {
        Self {
            max_tap_interval_ms: MAX_TAP_INTERVAL_MS,
            max_touch_time_ms: MAX_TOUCH_TIME_MS,
            max_distance: MAX_TAP_DISTANCE,
        }
    }
}

/// State of a `TapRecognizer`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerState {
    /// No tap in progress. Earlier taps of a multi-tap may still be pending.
    Empty,
    /// Touches of the current tap are down
    Accumulating,
    /// The full pattern was seen; stays here until reset or the next attempt
    Matched,
    /// The attempt was invalidated (over-touch, movement, timeout)
    Failed,
}

/// Matches `num_taps` consecutive taps made with `num_touches` touches each.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    config: TapConfig,
    tolerances: GestureTolerances,
    state: RecognizerState,
    /// Touches on the surface as of the last event
    active: usize,
    /// Most simultaneous touches seen during the current tap
    max_touches: usize,
    tap_start: Option<Instant>,
    start_positions: HashMap<u64, Point>,
    centroid: Option<Point>,
    taps: u32,
    last_tap: Option<(Point, Instant)>,
}

impl TapRecognizer {
    pub fn new(config: TapConfig) -> Result<Self> {
        Self::with_tolerances(config, GestureTolerances::default())
    }

    pub fn with_tolerances(config: TapConfig, tolerances: GestureTolerances) -> Result<Self> {
        config.validate()?;
        tolerances.validate()?;
        Ok(Self {
            config,
            tolerances,
            state: RecognizerState::Empty,
            active: 0,
            max_touches: 0,
            tap_start: None,
            start_positions: HashMap::default(),
            centroid: None,
            taps: 0,
            last_tap: None,
        })
    }

    pub fn config(&self) -> TapConfig {
        self.config
    }

    pub fn state(&self) -> RecognizerState {
        self.state
    }

    /// Completed taps counted towards the current pattern
    pub fn tap_count(&self) -> u32 {
        self.taps
    }

    /// Touches on the surface as of the last event
    pub fn active_touches(&self) -> usize {
        self.active
    }

    pub fn touchstart(&mut self, e: &TouchEvent) {
        if e.touches.is_empty() {
            return;
        }

        match self.state {
            RecognizerState::Failed | RecognizerState::Matched if self.active == 0 => {
                self.restart();
            }
            RecognizerState::Failed | RecognizerState::Matched => {
                self.active = e.touches.len();
                return;
            }
            RecognizerState::Empty => {
                if let Some((_, at)) = self.last_tap {
                    if e.time.duration_since(at) > self.tolerances.max_tap_interval() {
                        log::trace!("{:?}: tap interval expired, counting from scratch", self.config);
                        self.restart();
                    }
                }
            }
            RecognizerState::Accumulating => {}
        }

        self.active = e.touches.len();
        self.state = RecognizerState::Accumulating;
        self.tap_start.get_or_insert(e.time);

        if e.touches.len() > self.config.num_touches {
            self.fail("too many touches");
            return;
        }

        self.max_touches = self.max_touches.max(e.touches.len());
        for touch in &e.touches {
            self.start_positions.entry(touch.id).or_insert(touch.position);
        }
        if e.touches.len() == self.config.num_touches {
            self.centroid = centroid_of(&e.touches);
        }
    }

    pub fn touchmove(&mut self, e: &TouchEvent) {
        if self.state != RecognizerState::Accumulating {
            return;
        }

        // Every tracked touch must still be down and near where it started.
        let broken = self.start_positions.iter().any(|(id, start)| {
            e.touches
                .iter()
                .find(|touch| touch.id == *id)
                .map_or(true, |touch| touch.position.distance_to(start) > self.tolerances.max_distance)
        });
        if broken {
            self.fail("touch moved beyond tolerance or vanished");
        }
    }

    /// Returns the tap location once, when the final tap of the pattern ends
    pub fn touchend(&mut self, e: &TouchEvent) -> Option<Point> {
        self.active = e.touches.len();

        match self.state {
            RecognizerState::Accumulating => {}
            RecognizerState::Failed => {
                if self.active == 0 {
                    self.clear_tap();
                }
                return None;
            }
            RecognizerState::Empty | RecognizerState::Matched => return None,
        }

        let held_too_long = self
            .tap_start
            .map_or(false, |start| e.time.duration_since(start) > self.tolerances.max_touch_time());
        if held_too_long {
            self.fail("tap held too long");
            if self.active == 0 {
                self.clear_tap();
            }
            return None;
        }

        if self.active > 0 {
            // Lifted touches are no longer tracked for movement.
            for touch in &e.changed {
                self.start_positions.remove(&touch.id);
            }
            return None;
        }

        let centroid = match self.centroid {
            Some(centroid) if self.max_touches == self.config.num_touches => centroid,
            _ => {
                self.fail("wrong number of touches");
                self.clear_tap();
                return None;
            }
        };
        self.clear_tap();

        if let Some((last_position, last_time)) = self.last_tap {
            let soon_enough = e.time.duration_since(last_time) < self.tolerances.max_tap_interval();
            let close_enough = last_position.distance_to(&centroid) < self.tolerances.max_distance;
            if !soon_enough || !close_enough {
                self.taps = 0;
            }
        }

        self.taps += 1;
        self.last_tap = Some((centroid, e.time));

        if self.taps >= self.config.num_taps {
            log::debug!("{:?} matched at ({:.1}, {:.1})", self.config, centroid.x, centroid.y);
            self.state = RecognizerState::Matched;
            Some(centroid)
        } else {
            self.state = RecognizerState::Empty;
            None
        }
    }

    /// Fails a pattern whose timing window has closed by `now`
    pub fn expire(&mut self, now: Instant) {
        let expired = match self.state {
            RecognizerState::Empty => self.last_tap.map_or(false, |(_, at)| {
                now.duration_since(at) > self.tolerances.max_tap_interval()
            }),
            RecognizerState::Accumulating => self.tap_start.map_or(false, |start| {
                now.duration_since(start) > self.tolerances.max_touch_time()
            }),
            RecognizerState::Matched | RecognizerState::Failed => false,
        };
        if expired {
            self.fail("timed out");
            if self.active == 0 {
                self.clear_tap();
            }
        }
    }

    /// Unconditionally returns to `Empty`
    pub fn reset(&mut self) {
        self.restart();
        self.active = 0;
    }

    fn fail(&mut self, reason: &str) {
        log::trace!("{:?} failed: {}", self.config, reason);
        self.state = RecognizerState::Failed;
        self.taps = 0;
        self.last_tap = None;
    }

    fn restart(&mut self) {
        self.clear_tap();
        self.taps = 0;
        self.last_tap = None;
        self.state = RecognizerState::Empty;
    }

    fn clear_tap(&mut self) {
        self.max_touches = 0;
        self.tap_start = None;
        self.start_positions.clear();
        self.centroid = None;
    }
}

/// Single-touch drag detection
#[derive(Debug, Clone, Default)]
pub struct PanRecognizer {
    threshold: f64,
    tracked: Option<u64>,
    start_position: Option<Point>,
    last_position: Option<Point>,
    panning: bool,
}

impl PanRecognizer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    pub fn touchstart(&mut self, e: &TouchEvent) {
        match e.touches.as_slice() {
            [touch] => {
                self.reset();
                self.tracked = Some(touch.id);
                self.start_position = Some(touch.position);
                self.last_position = Some(touch.position);
            }
            // A second finger hands the gesture over to pinch
            _ => self.reset(),
        }
    }

    /// Pixel delta since the previous move once the drag threshold is crossed
    pub fn touchmove(&mut self, e: &TouchEvent) -> Option<Point> {
        let touch = match e.touches.as_slice() {
            [touch] if Some(touch.id) == self.tracked => touch,
            _ => return None,
        };
        let start = self.start_position?;
        let last = self.last_position?;

        if !self.panning {
            if touch.position.distance_to(&start) <= self.threshold {
                return None;
            }
            self.panning = true;
            log::trace!("pan started at ({:.1}, {:.1})", start.x, start.y);
        }

        self.last_position = Some(touch.position);
        let delta = touch.position.subtract(&last);
        (delta != Point::default()).then_some(delta)
    }

    pub fn touchend(&mut self, e: &TouchEvent) {
        if e.touches.is_empty() || !e.touches.iter().any(|t| Some(t.id) == self.tracked) {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.tracked = None;
        self.start_position = None;
        self.last_position = None;
        self.panning = false;
    }
}

/// Two-finger pinch detection
#[derive(Debug, Clone, Default)]
pub struct PinchRecognizer {
    threshold: f64,
    initial_distance: Option<f64>,
    last_distance: Option<f64>,
    pinching: bool,
}

impl PinchRecognizer {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    pub fn is_pinching(&self) -> bool {
        self.pinching
    }

    pub fn touchstart(&mut self, e: &TouchEvent) {
        self.reset();
        if let Some((_, distance)) = two_finger_geometry(&e.touches) {
            self.initial_distance = Some(distance);
            self.last_distance = Some(distance);
        }
    }

    /// Centroid and incremental scale once the distance change crosses the threshold
    pub fn touchmove(&mut self, e: &TouchEvent) -> Option<(Point, f64)> {
        let (center, current_distance) = two_finger_geometry(&e.touches)?;
        let initial_distance = self.initial_distance?;
        let last_distance = self.last_distance?;

        if !self.pinching {
            if (current_distance - initial_distance).abs() <= self.threshold {
                return None;
            }
            self.pinching = true;
        }

        self.last_distance = Some(current_distance);
        if last_distance <= f64::EPSILON || current_distance <= f64::EPSILON {
            return None;
        }
        Some((center, current_distance / last_distance))
    }

    pub fn touchend(&mut self, e: &TouchEvent) {
        if e.touches.len() != 2 {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.initial_distance = None;
        self.last_distance = None;
        self.pinching = false;
    }
}

fn centroid_of(touches: &[TouchPoint]) -> Option<Point> {
    Point::centroid(touches.iter().map(|t| &t.position))
}

/// Returns (midpoint, distance) for exactly two touches
fn two_finger_geometry(touches: &[TouchPoint]) -> Option<(Point, f64)> {
    match touches {
        [a, b] => Some((
            centroid_of(touches)?,
            a.position.distance_to(&b.position),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, ms: u64) -> Instant {
        base + Duration::from_millis(ms)
    }

    fn tap(recognizer: &mut TapRecognizer, base: Instant, start_ms: u64, touches: &[TouchPoint]) -> Option<Point> {
        recognizer.touchstart(&TouchEvent::start(at(base, start_ms), touches.to_vec(), touches.to_vec()));
        recognizer.touchend(&TouchEvent::end(at(base, start_ms + 50), Vec::new(), touches.to_vec()))
    }

    fn one_finger() -> Vec<TouchPoint> {
        vec![TouchPoint::new(1, 100.0, 100.0)]
    }

    fn two_fingers() -> Vec<TouchPoint> {
        vec![TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 140.0, 100.0)]
    }

    #[test]
    fn test_rejects_zero_counts() {
        assert!(TapRecognizer::new(TapConfig::new(0, 1)).is_err());
        assert!(TapRecognizer::new(TapConfig::new(1, 0)).is_err());
    }

    #[test]
    fn test_double_tap_matches_on_second_touchend() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();

        assert_eq!(tap(&mut recognizer, base, 0, &one_finger()), None);
        assert_eq!(recognizer.state(), RecognizerState::Empty);
        assert_eq!(recognizer.tap_count(), 1);

        let matched = tap(&mut recognizer, base, 200, &one_finger());
        assert_eq!(matched, Some(Point::new(100.0, 100.0)));
        assert_eq!(recognizer.state(), RecognizerState::Matched);
    }

    #[test]
    fn test_match_is_reported_once() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        assert!(tap(&mut recognizer, base, 0, &one_finger()).is_some());

        // A stray end event while matched reports nothing.
        let stray = TouchEvent::end(at(base, 60), Vec::new(), one_finger());
        assert_eq!(recognizer.touchend(&stray), None);
    }

    #[test]
    fn test_single_tap_waits_then_expires() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();
        tap(&mut recognizer, base, 0, &one_finger());

        recognizer.expire(at(base, 300));
        assert_eq!(recognizer.state(), RecognizerState::Empty);

        recognizer.expire(at(base, 1000));
        assert_eq!(recognizer.state(), RecognizerState::Failed);
        assert_eq!(recognizer.tap_count(), 0);
    }

    #[test]
    fn test_held_tap_expires_without_touchend() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));

        recognizer.expire(at(base, 200));
        assert_eq!(recognizer.state(), RecognizerState::Accumulating);

        recognizer.expire(at(base, 900));
        assert_eq!(recognizer.state(), RecognizerState::Failed);

        // Lifting the finger afterwards reports nothing.
        let end = TouchEvent::end(at(base, 950), Vec::new(), one_finger());
        assert_eq!(recognizer.touchend(&end), None);
        assert_eq!(recognizer.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_slow_second_tap_starts_over() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();
        tap(&mut recognizer, base, 0, &one_finger());

        assert_eq!(tap(&mut recognizer, base, 900, &one_finger()), None);
        assert_eq!(recognizer.tap_count(), 1);
        assert!(tap(&mut recognizer, base, 1100, &one_finger()).is_some());
    }

    #[test]
    fn test_distant_second_tap_starts_over() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();
        tap(&mut recognizer, base, 0, &one_finger());

        let far = vec![TouchPoint::new(3, 300.0, 300.0)];
        assert_eq!(tap(&mut recognizer, base, 150, &far), None);
        assert_eq!(recognizer.tap_count(), 1);
    }

    #[test]
    fn test_overtouch_fails() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();
        let fingers = two_fingers();
        recognizer.touchstart(&TouchEvent::start(base, fingers.clone(), fingers.clone()));
        assert_eq!(recognizer.state(), RecognizerState::Failed);

        let end = TouchEvent::end(at(base, 40), Vec::new(), fingers);
        assert_eq!(recognizer.touchend(&end), None);
    }

    #[test]
    fn test_movement_forces_failure() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));
        recognizer.touchmove(&TouchEvent::moved(at(base, 10), vec![TouchPoint::new(1, 180.0, 100.0)]));
        assert_eq!(recognizer.state(), RecognizerState::Failed);

        // Well-timed release does not revive the attempt.
        let end = TouchEvent::end(at(base, 30), Vec::new(), one_finger());
        assert_eq!(recognizer.touchend(&end), None);
        assert_eq!(recognizer.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_vanished_touch_fails() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));
        recognizer.touchmove(&TouchEvent::moved(at(base, 10), vec![TouchPoint::new(9, 500.0, 500.0)]));
        assert_eq!(recognizer.state(), RecognizerState::Failed);

        let end = TouchEvent::end(at(base, 30), Vec::new(), one_finger());
        assert_eq!(recognizer.touchend(&end), None);
    }

    #[test]
    fn test_small_jitter_still_taps() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));
        recognizer.touchmove(&TouchEvent::moved(at(base, 10), vec![TouchPoint::new(1, 105.0, 103.0)]));
        let end = TouchEvent::end(at(base, 30), Vec::new(), one_finger());
        assert!(recognizer.touchend(&end).is_some());
    }

    #[test]
    fn test_failed_attempt_recovers_on_next_gesture() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        let fingers = two_fingers();
        recognizer.touchstart(&TouchEvent::start(base, fingers.clone(), fingers.clone()));
        recognizer.touchend(&TouchEvent::end(at(base, 40), Vec::new(), fingers));
        assert_eq!(recognizer.state(), RecognizerState::Failed);

        assert!(tap(&mut recognizer, base, 100, &one_finger()).is_some());
    }

    #[test]
    fn test_long_press_is_not_a_tap() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));
        let end = TouchEvent::end(at(base, 800), Vec::new(), one_finger());
        assert_eq!(recognizer.touchend(&end), None);
        assert_eq!(recognizer.state(), RecognizerState::Failed);
    }

    #[test]
    fn test_two_finger_tap_with_staggered_start() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(2, 1)).unwrap();
        let base = Instant::now();
        let [a, b] = [TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 140.0, 100.0)];

        recognizer.touchstart(&TouchEvent::start(base, vec![a], vec![a]));
        recognizer.touchstart(&TouchEvent::start(at(base, 20), vec![a, b], vec![b]));
        assert_eq!(recognizer.touchend(&TouchEvent::end(at(base, 60), vec![b], vec![a])), None);
        recognizer.touchmove(&TouchEvent::moved(at(base, 65), vec![TouchPoint::new(2, 142.0, 101.0)]));
        let matched = recognizer.touchend(&TouchEvent::end(at(base, 70), Vec::new(), vec![b]));
        assert_eq!(matched, Some(Point::new(120.0, 100.0)));
    }

    #[test]
    fn test_empty_touch_list_is_noop() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 1)).unwrap();
        recognizer.touchstart(&TouchEvent::start(Instant::now(), Vec::new(), Vec::new()));
        assert_eq!(recognizer.state(), RecognizerState::Empty);
        assert_eq!(recognizer.touchend(&TouchEvent::end(Instant::now(), Vec::new(), Vec::new())), None);
    }

    #[test]
    fn test_reset_from_any_state() {
        let mut recognizer = TapRecognizer::new(TapConfig::new(1, 2)).unwrap();
        let base = Instant::now();
        recognizer.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));
        assert_eq!(recognizer.state(), RecognizerState::Accumulating);
        recognizer.reset();
        assert_eq!(recognizer.state(), RecognizerState::Empty);
        assert_eq!(recognizer.active_touches(), 0);
    }

    #[test]
    fn test_pan_threshold() {
        let mut pan = PanRecognizer::new(10.0);
        let base = Instant::now();
        pan.touchstart(&TouchEvent::start(base, one_finger(), one_finger()));

        let small = TouchEvent::moved(at(base, 10), vec![TouchPoint::new(1, 105.0, 105.0)]);
        assert_eq!(pan.touchmove(&small), None);
        assert!(!pan.is_panning());

        let big = TouchEvent::moved(at(base, 20), vec![TouchPoint::new(1, 130.0, 100.0)]);
        assert_eq!(pan.touchmove(&big), Some(Point::new(30.0, 0.0)));

        let more = TouchEvent::moved(at(base, 30), vec![TouchPoint::new(1, 140.0, 90.0)]);
        assert_eq!(pan.touchmove(&more), Some(Point::new(10.0, -10.0)));
    }

    #[test]
    fn test_pinch_scale() {
        let mut pinch = PinchRecognizer::new(10.0);
        let base = Instant::now();
        let start = vec![TouchPoint::new(1, 100.0, 100.0), TouchPoint::new(2, 200.0, 100.0)];
        pinch.touchstart(&TouchEvent::start(base, start.clone(), start));

        let spread = vec![TouchPoint::new(1, 50.0, 100.0), TouchPoint::new(2, 250.0, 100.0)];
        let (center, scale) = pinch.touchmove(&TouchEvent::moved(at(base, 10), spread)).unwrap();
        assert_eq!(center, Point::new(150.0, 100.0));
        assert!((scale - 2.0).abs() < 1e-9);
        assert!(pinch.is_pinching());
    }
}

use crate::core::geo::Point;
use crate::prelude::Instant;
use serde::{Deserialize, Serialize};

/// Types of touch events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TouchEventType {
    Start,
    Move,
    End,
    Cancel,
}

/// Individual touch point in container pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// A normalized touch event as delivered by the touch source.
///
/// `touches` lists every touch still on the map surface after the event
/// (so it excludes the lifted ones on `End`), `changed` lists the touches this
/// event is about.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub event_type: TouchEventType,
    pub time: Instant,
    pub touches: Vec<TouchPoint>,
    pub changed: Vec<TouchPoint>,
    default_prevented: bool,
}

impl TouchEvent {
    pub fn new(
        event_type: TouchEventType,
        time: Instant,
        touches: Vec<TouchPoint>,
        changed: Vec<TouchPoint>,
    ) -> Self {
        Self {
            event_type,
            time,
            touches,
            changed,
            default_prevented: false,
        }
    }

    pub fn start(time: Instant, touches: Vec<TouchPoint>, changed: Vec<TouchPoint>) -> Self {
        Self::new(TouchEventType::Start, time, touches, changed)
    }

    pub fn moved(time: Instant, touches: Vec<TouchPoint>) -> Self {
        let changed = touches.clone();
        Self::new(TouchEventType::Move, time, touches, changed)
    }

    pub fn end(time: Instant, touches: Vec<TouchPoint>, changed: Vec<TouchPoint>) -> Self {
        Self::new(TouchEventType::End, time, touches, changed)
    }

    pub fn cancel(time: Instant) -> Self {
        Self::new(TouchEventType::Cancel, time, Vec::new(), Vec::new())
    }

    /// Asks the host to suppress the platform's default handling (e.g. a synthetic click)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Camera transition requested by a gesture, executed by `MapService::apply_command`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraCommand {
    /// Change zoom by `delta` keeping the container pixel `around` fixed
    Zoom { delta: f64, around: Point },
    /// Move the map content by a container pixel offset
    PanBy { offset: Point },
}

use crate::{
    core::config::{GestureConfig, TapZoomBinding},
    input::{
        events::{CameraCommand, TouchEvent},
        gestures::{GestureTolerances, PanRecognizer, PinchRecognizer, TapRecognizer},
    },
    prelude::Instant,
    MapError, Result,
};

/// A touch handler turning part of the touch stream into camera commands.
///
/// Handlers receive every event of the touch stream in arrival order. A
/// handler that returns a command becomes active until the dispatcher runs
/// its deferred `reset` on the next scheduling turn.
pub trait GestureHandler {
    fn name(&self) -> &'static str;

    fn touchstart(&mut self, e: &mut TouchEvent) -> Option<CameraCommand>;

    fn touchmove(&mut self, e: &mut TouchEvent) -> Option<CameraCommand>;

    fn touchend(&mut self, e: &mut TouchEvent) -> Option<CameraCommand>;

    fn touchcancel(&mut self) {
        self.reset();
    }

    /// Lets time-bounded recognizers notice an expired window without new input
    fn expire(&mut self, _now: Instant) {}

    fn reset(&mut self);

    fn enable(&mut self);

    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    fn is_active(&self) -> bool;

    /// Whether the handler asked for a reset after the current turn
    fn wants_deferred_reset(&self) -> bool {
        false
    }
}

/// Tap patterns mapped to zoom steps, e.g. double tap to zoom in and two-finger
/// tap to zoom out.
///
/// All recognizers see the same touch stream; their touch/tap counts are
/// pairwise distinct so at most one of them matches a physical sequence.
#[derive(Debug)]
pub struct TapZoomHandler {
    enabled: bool,
    active: bool,
    reset_pending: bool,
    recognizers: Vec<(TapRecognizer, f64)>,
}

impl TapZoomHandler {
    /// Builds a handler from at least two bindings, evaluated in order
    pub fn new(bindings: &[TapZoomBinding], tolerances: GestureTolerances) -> Result<Self> {
        if bindings.len() < 2 {
            return Err(MapError::InvalidConfiguration(format!(
                "tap zoom needs at least two exclusive tap patterns, got {}",
                bindings.len()
            )));
        }

        let mut recognizers: Vec<(TapRecognizer, f64)> = Vec::with_capacity(bindings.len());
        for binding in bindings {
            if recognizers.iter().any(|(r, _)| r.config() == binding.tap) {
                return Err(MapError::ConfigurationConflict(format!(
                    "tap pattern {} touches x {} taps is bound twice",
                    binding.tap.num_touches, binding.tap.num_taps
                )));
            }
            recognizers.push((
                TapRecognizer::with_tolerances(binding.tap, tolerances)?,
                binding.zoom_delta,
            ));
        }

        Ok(Self {
            enabled: true,
            active: false,
            reset_pending: false,
            recognizers,
        })
    }

    pub fn from_config(config: &GestureConfig) -> Result<Self> {
        let mut handler = Self::new(&config.tap_zoom, config.tolerances)?;
        if !config.tap_zoom_enabled {
            handler.disable();
        }
        Ok(handler)
    }

    pub fn recognizers(&self) -> impl Iterator<Item = &TapRecognizer> {
        self.recognizers.iter().map(|(r, _)| r)
    }
}

impl GestureHandler for TapZoomHandler {
    fn name(&self) -> &'static str {
        "tap_zoom"
    }

    fn touchstart(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            for (recognizer, _) in &mut self.recognizers {
                recognizer.touchstart(e);
            }
        }
        None
    }

    fn touchmove(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            for (recognizer, _) in &mut self.recognizers {
                recognizer.touchmove(e);
            }
        }
        None
    }

    fn touchend(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if !self.enabled {
            return None;
        }

        // Every recognizer sees the end event before the winner is picked.
        let results: Vec<_> = self
            .recognizers
            .iter_mut()
            .map(|(recognizer, delta)| recognizer.touchend(e).map(|point| (point, *delta)))
            .collect();

        let (around, delta) = results.into_iter().flatten().next()?;
        self.active = true;
        self.reset_pending = true;
        e.prevent_default();
        log::debug!("tap zoom {:+} around ({:.1}, {:.1})", delta, around.x, around.y);
        Some(CameraCommand::Zoom { delta, around })
    }

    fn expire(&mut self, now: Instant) {
        for (recognizer, _) in &mut self.recognizers {
            recognizer.expire(now);
        }
    }

    fn reset(&mut self) {
        self.active = false;
        self.reset_pending = false;
        for (recognizer, _) in &mut self.recognizers {
            recognizer.reset();
        }
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.reset();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn wants_deferred_reset(&self) -> bool {
        self.reset_pending
    }
}

/// One-finger drag panning
#[derive(Debug)]
pub struct TouchPanHandler {
    enabled: bool,
    recognizer: PanRecognizer,
}

impl TouchPanHandler {
    pub fn new(threshold: f64) -> Self {
        Self {
            enabled: true,
            recognizer: PanRecognizer::new(threshold),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        let mut handler = Self::new(config.pan_threshold);
        if !config.pan_enabled {
            handler.disable();
        }
        handler
    }
}

impl GestureHandler for TouchPanHandler {
    fn name(&self) -> &'static str {
        "touch_pan"
    }

    fn touchstart(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            self.recognizer.touchstart(e);
        }
        None
    }

    fn touchmove(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if !self.enabled {
            return None;
        }
        let offset = self.recognizer.touchmove(e)?;
        e.prevent_default();
        Some(CameraCommand::PanBy { offset })
    }

    fn touchend(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            self.recognizer.touchend(e);
        }
        None
    }

    fn reset(&mut self) {
        self.recognizer.reset();
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.reset();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_active(&self) -> bool {
        self.recognizer.is_panning()
    }
}

/// Two-finger pinch zooming around the finger midpoint
#[derive(Debug)]
pub struct TouchPinchHandler {
    enabled: bool,
    recognizer: PinchRecognizer,
}

impl TouchPinchHandler {
    pub fn new(threshold: f64) -> Self {
        Self {
            enabled: true,
            recognizer: PinchRecognizer::new(threshold),
        }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        let mut handler = Self::new(config.pinch_threshold);
        if !config.pinch_enabled {
            handler.disable();
        }
        handler
    }
}

impl GestureHandler for TouchPinchHandler {
    fn name(&self) -> &'static str {
        "touch_pinch"
    }

    fn touchstart(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            self.recognizer.touchstart(e);
        }
        None
    }

    fn touchmove(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if !self.enabled {
            return None;
        }
        let (around, scale) = self.recognizer.touchmove(e)?;
        e.prevent_default();
        Some(CameraCommand::Zoom {
            delta: scale.log2(),
            around,
        })
    }

    fn touchend(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        if self.enabled {
            self.recognizer.touchend(e);
        }
        None
    }

    fn reset(&mut self) {
        self.recognizer.reset();
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.reset();
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn is_active(&self) -> bool {
        self.recognizer.is_pinching()
    }
}

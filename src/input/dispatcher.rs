use crate::{
    core::config::GestureConfig,
    input::{
        events::{CameraCommand, TouchEvent, TouchEventType},
        handler::{GestureHandler, TapZoomHandler, TouchPanHandler, TouchPinchHandler},
    },
    prelude::{Instant, VecDeque},
    Result,
};

/// Routes touch events to every gesture handler of one interactive surface.
///
/// Resets requested by a matching handler are queued and run at the start of
/// the next scheduling turn (the next `dispatch` or an explicit
/// `run_pending`), so the match stays observable for the rest of the current
/// one.
#[derive(Default)]
pub struct TouchDispatcher {
    handlers: Vec<Box<dyn GestureHandler>>,
    deferred_resets: VecDeque<usize>,
}

impl TouchDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with the standard tap-zoom, pan and pinch handlers
    pub fn from_config(config: &GestureConfig) -> Result<Self> {
        let mut dispatcher = Self::new();
        dispatcher.add_handler(Box::new(TapZoomHandler::from_config(config)?));
        dispatcher.add_handler(Box::new(TouchPanHandler::from_config(config)));
        dispatcher.add_handler(Box::new(TouchPinchHandler::from_config(config)));
        Ok(dispatcher)
    }

    pub fn add_handler(&mut self, handler: Box<dyn GestureHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler(&self, name: &str) -> Option<&dyn GestureHandler> {
        self.handlers
            .iter()
            .find(|h| h.name() == name)
            .map(|h| h.as_ref())
    }

    pub fn handler_mut(&mut self, name: &str) -> Option<&mut (dyn GestureHandler + 'static)> {
        self.handlers
            .iter_mut()
            .find(|h| h.name() == name)
            .map(|h| h.as_mut())
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Forwards one event to all enabled handlers and returns the first command
    pub fn dispatch(&mut self, e: &mut TouchEvent) -> Option<CameraCommand> {
        self.run_pending();

        if e.event_type == TouchEventType::Cancel {
            self.cancel();
            return None;
        }

        let mut command = None;
        for (index, handler) in self.handlers.iter_mut().enumerate() {
            if !handler.is_enabled() {
                continue;
            }
            let result = match e.event_type {
                TouchEventType::Start => handler.touchstart(e),
                TouchEventType::Move => handler.touchmove(e),
                TouchEventType::End => handler.touchend(e),
                TouchEventType::Cancel => None,
            };
            if handler.wants_deferred_reset() && !self.deferred_resets.contains(&index) {
                self.deferred_resets.push_back(index);
            }
            if command.is_none() {
                command = result;
            }
        }

        if let Some(command) = &command {
            log::trace!("touch {:?} -> {:?}", e.event_type, command);
        }
        command
    }

    /// Runs the resets deferred from the previous turn
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while let Some(index) = self.deferred_resets.pop_front() {
            if let Some(handler) = self.handlers.get_mut(index) {
                handler.reset();
                count += 1;
            }
        }
        count
    }

    pub fn pending_resets(&self) -> usize {
        self.deferred_resets.len()
    }

    /// Lets every handler notice timing windows that closed by `now`
    pub fn expire(&mut self, now: Instant) {
        for handler in &mut self.handlers {
            handler.expire(now);
        }
    }

    pub fn cancel(&mut self) {
        self.deferred_resets.clear();
        for handler in &mut self.handlers {
            handler.touchcancel();
        }
    }
}

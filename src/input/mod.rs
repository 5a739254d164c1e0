pub mod dispatcher;
pub mod events;
pub mod gestures;
pub mod handler;

// Re-export the essential types
pub use dispatcher::TouchDispatcher;
pub use events::{CameraCommand, TouchEvent, TouchEventType, TouchPoint};
pub use gestures::{
    GestureTolerances, PanRecognizer, PinchRecognizer, RecognizerState, TapConfig, TapRecognizer,
};
pub use handler::{GestureHandler, TapZoomHandler, TouchPanHandler, TouchPinchHandler};

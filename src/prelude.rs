//! Prelude module for common mapsync types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapsync::prelude::*;`

pub use crate::core::{
    bounds::LngLatBounds,
    config::{
        GestureConfig, MapConfig, ProviderKind, ProviderOptions, ProviderProfile,
        RotationConvention, TapZoomBinding,
    },
    coordinates::{CoordinateSystem, CoordinateSystemService},
    geo::{LngLat, Point},
    map::{MapService, SessionState},
    viewport::{CameraParams, Viewport},
};

pub use crate::input::{
    dispatcher::TouchDispatcher,
    events::{CameraCommand, TouchEvent, TouchEventType, TouchPoint},
    gestures::{GestureTolerances, RecognizerState, TapConfig, TapRecognizer},
    handler::{GestureHandler, TapZoomHandler, TouchPanHandler, TouchPinchHandler},
};

pub use crate::providers::{CameraEvent, HeadlessProvider, ProviderBinding};

pub use crate::{MapError, Result};

pub use instant::Instant;
pub use std::{collections::VecDeque, time::Duration};

pub use fxhash::FxHashMap as HashMap;

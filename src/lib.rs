//! # mapsync
//!
//! Provider-independent camera state and touch gestures for interactive maps.
//!
//! A `MapService` wraps one map provider (AMap, Mapbox, ...) behind the
//! `ProviderBinding` trait and normalizes every camera change into a canonical
//! `Viewport`: zoom numbering and rotation handedness are corrected at that
//! boundary, and the session's `CoordinateSystem` is switched to offset
//! coordinates at high zoom. Touch input runs through a `TouchDispatcher`
//! whose gesture handlers turn taps, drags and pinches into `CameraCommand`s.

pub mod core;
pub mod input;
pub mod prelude;
pub mod providers;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    bounds::LngLatBounds,
    config::{MapConfig, ProviderKind, ProviderProfile},
    coordinates::{CoordinateSystem, CoordinateSystemService},
    geo::{LngLat, Point},
    map::{MapService, SessionState},
    viewport::{CameraParams, Viewport},
};

pub use crate::input::{
    dispatcher::TouchDispatcher,
    events::{CameraCommand, TouchEvent, TouchPoint},
    gestures::TapRecognizer,
    handler::{GestureHandler, TapZoomHandler},
};

pub use crate::providers::{CameraEvent, HeadlessProvider, ProviderBinding};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// The provider SDK could not be loaded or the map not created
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Invalid camera payload: {0}")]
    InvalidCameraPayload(String),

    /// The session has not completed `init` yet
    #[error("Map session not ready")]
    SessionNotReady,

    #[error("Configuration conflict: {0}")]
    ConfigurationConflict(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;

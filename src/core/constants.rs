//! Engine-wide defaults for camera normalization and touch gestures.
//! Every value here is only a default: `MapConfig` carries the tunable copy.

/// Zoom above which renderers switch to zoom-localized offset coordinates.
pub const COORDINATE_SYSTEM_ZOOM_THRESHOLD: f64 = 12.0;

/// AMap numbers its zoom levels one above the canonical (Mapbox) scale.
pub const AMAP_ZOOM_OFFSET: f64 = 1.0;

/// Mapbox zoom levels are canonical.
pub const MAPBOX_ZOOM_OFFSET: f64 = 0.0;

/// AMap JS API version requested at load time.
pub const AMAP_VERSION: &str = "1.4.8";

/// Square tile size in pixels used by the headless Web Mercator provider.
pub const TILE_SIZE: f64 = 512.0;

/// Maximum time between consecutive taps of a multi-tap gesture (ms).
pub const MAX_TAP_INTERVAL_MS: u64 = 500;

/// Maximum time a tap may be held down before it stops counting (ms).
pub const MAX_TOUCH_TIME_MS: u64 = 500;

/// Maximum travel of a touch, in pixels, for it to still count as a tap.
pub const MAX_TAP_DISTANCE: f64 = 30.0;

/// Single-touch travel, in pixels, before a drag becomes a pan.
pub const PAN_THRESHOLD: f64 = 10.0;

/// Change in finger distance, in pixels, before two touches become a pinch.
pub const PINCH_THRESHOLD: f64 = 10.0;

/// Zoom step applied by tap-zoom gestures.
pub const TAP_ZOOM_DELTA: f64 = 1.0;

/// Default camera vertical field of view in degrees.
pub const DEFAULT_FOV: f64 = 36.87;

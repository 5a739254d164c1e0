//! Configuration for map sessions
//!
//! Every convention that differs between providers (zoom numbering, rotation
//! handedness, credentials) and every gesture tolerance is carried here rather
//! than hard-coded. Configurations can be built from a provider preset or
//! loaded from JSON; missing fields fall back to the preset defaults.

use crate::{
    core::{
        constants::{
            AMAP_VERSION, AMAP_ZOOM_OFFSET, COORDINATE_SYSTEM_ZOOM_THRESHOLD, MAPBOX_ZOOM_OFFSET,
            PAN_THRESHOLD, PINCH_THRESHOLD, TAP_ZOOM_DELTA,
        },
        geo::LngLat,
    },
    input::gestures::{GestureTolerances, TapConfig},
    MapError, Result,
};
use serde::{Deserialize, Serialize};

/// Map engines a session can be backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    AMap,
    Mapbox,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Mapbox
    }
}

/// Direction in which a provider measures positive rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationConvention {
    Clockwise,
    CounterClockwise,
}

/// Per-provider normalization rules applied at the MapService boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProviderProfile {
    /// Constant k such that `canonical_zoom = provider_zoom - k`
    pub zoom_offset: f64,
    pub rotation: RotationConvention,
}

impl ProviderProfile {
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::AMap => Self {
                zoom_offset: AMAP_ZOOM_OFFSET,
                rotation: RotationConvention::Clockwise,
            },
            ProviderKind::Mapbox => Self {
                zoom_offset: MAPBOX_ZOOM_OFFSET,
                rotation: RotationConvention::CounterClockwise,
            },
        }
    }

    pub fn to_canonical_zoom(&self, provider_zoom: f64) -> f64 {
        provider_zoom - self.zoom_offset
    }

    pub fn to_provider_zoom(&self, canonical_zoom: f64) -> f64 {
        canonical_zoom + self.zoom_offset
    }

    /// Canonical bearing in `[0, 360)`, counterclockwise-positive
    pub fn to_canonical_bearing(&self, provider_rotation: f64) -> f64 {
        match self.rotation {
            RotationConvention::Clockwise => (360.0 - provider_rotation).rem_euclid(360.0),
            RotationConvention::CounterClockwise => provider_rotation.rem_euclid(360.0),
        }
    }

    /// Provider-native rotation for a canonical bearing
    pub fn to_provider_rotation(&self, bearing: f64) -> f64 {
        // The clockwise mapping is its own inverse.
        self.to_canonical_bearing(bearing)
    }
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self::for_kind(ProviderKind::default())
    }
}

/// What the provider binding needs to load and create its map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    pub kind: ProviderKind,
    /// DOM id or native handle name of the map container
    pub container_id: String,
    pub api_key: Option<String>,
    pub version: Option<String>,
    pub style: Option<String>,
    pub center: Option<LngLat>,
    /// Initial zoom in provider numbering
    pub zoom: Option<f64>,
    pub pitch: Option<f64>,
}

impl ProviderOptions {
    pub fn for_kind(kind: ProviderKind) -> Self {
        Self {
            kind,
            container_id: "map".to_string(),
            api_key: None,
            version: match kind {
                ProviderKind::AMap => Some(AMAP_VERSION.to_string()),
                ProviderKind::Mapbox => None,
            },
            style: None,
            center: None,
            zoom: None,
            pitch: None,
        }
    }
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::for_kind(ProviderKind::default())
    }
}

/// One tap pattern of the tap-zoom handler and the zoom step it triggers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapZoomBinding {
    #[serde(flatten)]
    pub tap: TapConfig,
    pub zoom_delta: f64,
}

/// Touch gesture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub tolerances: GestureTolerances,
    /// Evaluated in order: the first matching binding wins
    pub tap_zoom: Vec<TapZoomBinding>,
    pub pan_threshold: f64,
    pub pinch_threshold: f64,
    pub tap_zoom_enabled: bool,
    pub pan_enabled: bool,
    pub pinch_enabled: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tolerances: GestureTolerances::default(),
            tap_zoom: vec![
                TapZoomBinding {
                    tap: TapConfig::new(1, 2),
                    zoom_delta: TAP_ZOOM_DELTA,
                },
                TapZoomBinding {
                    tap: TapConfig::new(2, 1),
                    zoom_delta: -TAP_ZOOM_DELTA,
                },
            ],
            pan_threshold: PAN_THRESHOLD,
            pinch_threshold: PINCH_THRESHOLD,
            tap_zoom_enabled: true,
            pan_enabled: true,
            pinch_enabled: true,
        }
    }
}

/// Complete configuration of one map session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub provider: ProviderOptions,
    /// Normalization rules; defaults to the preset of `provider.kind`
    pub profile: Option<ProviderProfile>,
    pub coordinate_threshold: f64,
    pub gestures: GestureConfig,
}

impl MapConfig {
    /// Preset for a provider with its documented conventions
    pub fn for_provider(kind: ProviderKind) -> Self {
        Self {
            provider: ProviderOptions::for_kind(kind),
            profile: None,
            coordinate_threshold: COORDINATE_SYSTEM_ZOOM_THRESHOLD,
            gestures: GestureConfig::default(),
        }
    }

    /// Loads and validates a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// The normalization profile in effect
    pub fn resolved_profile(&self) -> ProviderProfile {
        self.profile
            .unwrap_or_else(|| ProviderProfile::for_kind(self.provider.kind))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.coordinate_threshold.is_finite() {
            return Err(MapError::InvalidConfiguration(
                "coordinate_threshold must be finite".to_string(),
            ));
        }
        if !self.resolved_profile().zoom_offset.is_finite() {
            return Err(MapError::InvalidConfiguration(
                "zoom_offset must be finite".to_string(),
            ));
        }
        for binding in &self.gestures.tap_zoom {
            binding.tap.validate()?;
        }
        self.gestures.tolerances.validate()
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::for_provider(ProviderKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_presets() {
        let amap = ProviderProfile::for_kind(ProviderKind::AMap);
        assert_eq!(amap.zoom_offset, 1.0);
        assert_eq!(amap.rotation, RotationConvention::Clockwise);

        let mapbox = ProviderProfile::for_kind(ProviderKind::Mapbox);
        assert_eq!(mapbox.zoom_offset, 0.0);
        assert_eq!(mapbox.rotation, RotationConvention::CounterClockwise);
    }

    #[test]
    fn test_clockwise_bearing_normalization() {
        let amap = ProviderProfile::for_kind(ProviderKind::AMap);
        assert_eq!(amap.to_canonical_bearing(90.0), 270.0);
        assert_eq!(amap.to_canonical_bearing(0.0), 0.0);
        assert_eq!(amap.to_canonical_bearing(360.0), 0.0);
        assert_eq!(amap.to_provider_rotation(270.0), 90.0);
    }

    #[test]
    fn test_counterclockwise_bearing_passes_through() {
        let mapbox = ProviderProfile::for_kind(ProviderKind::Mapbox);
        assert_eq!(mapbox.to_canonical_bearing(90.0), 90.0);
        assert_eq!(mapbox.to_canonical_bearing(-90.0), 270.0);
    }

    #[test]
    fn test_zoom_offset_round_trip() {
        let amap = ProviderProfile::for_kind(ProviderKind::AMap);
        assert_eq!(amap.to_canonical_zoom(15.0), 14.0);
        assert_eq!(amap.to_provider_zoom(14.0), 15.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = MapConfig::from_json_str(
            r#"{
                "provider": { "kind": "amap", "api_key": "secret", "center": { "lng": 121.4, "lat": 31.25 } },
                "coordinate_threshold": 10.0
            }"#,
        )
        .unwrap();

        assert_eq!(config.provider.kind, ProviderKind::AMap);
        assert_eq!(config.provider.api_key.as_deref(), Some("secret"));
        assert_eq!(config.coordinate_threshold, 10.0);
        assert_eq!(config.gestures, GestureConfig::default());
        // A profile is only implied by the provider kind when not given.
        assert_eq!(config.resolved_profile().zoom_offset, 1.0);
    }

    #[test]
    fn test_profile_override() {
        let config = MapConfig::from_json_str(
            r#"{ "profile": { "zoom_offset": 2.0, "rotation": "clockwise" } }"#,
        )
        .unwrap();
        assert_eq!(config.resolved_profile().zoom_offset, 2.0);
    }

    #[test]
    fn test_invalid_tap_binding_rejected() {
        let result = MapConfig::from_json_str(
            r#"{ "gestures": { "tap_zoom": [ { "num_touches": 0, "num_taps": 1, "zoom_delta": 1.0 } ] } }"#,
        );
        assert!(matches!(result, Err(MapError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        let result = MapConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(MapError::Serialization(_))));
    }
}

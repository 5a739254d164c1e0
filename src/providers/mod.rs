//! Provider bindings: the capability set a map engine must offer to back a
//! `MapService`.
//!
//! Concrete SDK bindings (AMap, Mapbox, ...) live with the host application.
//! This crate ships `HeadlessProvider`, a Web Mercator simulation that follows
//! either provider's conventions.

pub mod headless;

pub use headless::HeadlessProvider;

use crate::{
    core::{
        bounds::LngLatBounds,
        config::{ProviderKind, ProviderOptions},
        geo::{LngLat, Point},
    },
    Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Raw camera payload of a provider camera-change notification.
///
/// Units are the provider's own: `rotation` follows its handedness and the
/// matching zoom is queried separately through `ProviderBinding::zoom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraEvent {
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub height: f64,
    pub pitch: f64,
    pub rotation: f64,
    pub aspect: f64,
    pub position: Point,
}

/// Primitive camera operations and queries of one provider map instance.
///
/// Zoom values are in the provider's native numbering and rotations in its
/// native handedness; `MapService` converts at the boundary.
#[async_trait]
pub trait ProviderBinding: Send {
    fn kind(&self) -> ProviderKind;

    /// Loads the provider SDK and creates the map. The only suspending operation.
    async fn load(&mut self, options: &ProviderOptions) -> Result<()>;

    /// Next queued camera-change notification, in arrival order
    fn poll_camera_event(&mut self) -> Option<CameraEvent>;

    fn zoom(&self) -> f64;

    fn center(&self) -> LngLat;

    fn pitch(&self) -> f64;

    fn rotation(&self) -> f64;

    fn bounds(&self) -> LngLatBounds;

    fn set_rotation(&mut self, rotation: f64);

    fn set_map_style(&mut self, style: &str);

    fn zoom_in(&mut self);

    fn zoom_out(&mut self);

    fn pan_to(&mut self, center: LngLat);

    /// Moves the map content by a container pixel offset
    fn pan_by(&mut self, offset: Point);

    fn fit_bounds(&mut self, bounds: LngLatBounds);

    fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat);

    /// World pixel at the current zoom to geographic coordinate
    fn pixel_to_lng_lat(&self, pixel: Point) -> LngLat;

    fn lng_lat_to_pixel(&self, lng_lat: LngLat) -> Point;

    /// Container (screen) pixel to geographic coordinate
    fn container_to_lng_lat(&self, pixel: Point) -> LngLat;

    fn lng_lat_to_container(&self, lng_lat: LngLat) -> Point;
}

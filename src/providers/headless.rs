use crate::{
    core::{
        bounds::LngLatBounds,
        config::{ProviderKind, ProviderOptions, ProviderProfile},
        constants::{DEFAULT_FOV, TILE_SIZE},
        geo::{LngLat, Point, EARTH_RADIUS},
    },
    prelude::VecDeque,
    providers::{CameraEvent, ProviderBinding},
    MapError, Result,
};
use async_trait::async_trait;
use std::f64::consts::PI;

const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 22.0;

/// A provider without any SDK behind it.
///
/// Simulates a flat, north-up Web Mercator map of a fixed container size while
/// reporting zoom and rotation in the native conventions of `kind`. Every
/// camera change queues a `CameraEvent` the way a real SDK fires its
/// camera-change callback.
#[derive(Debug, Clone)]
pub struct HeadlessProvider {
    kind: ProviderKind,
    profile: ProviderProfile,
    size: Point,
    center: LngLat,
    /// Native zoom
    zoom: f64,
    pitch: f64,
    /// Native rotation
    rotation: f64,
    fov: f64,
    style: Option<String>,
    loaded: bool,
    load_error: Option<String>,
    events: VecDeque<CameraEvent>,
}

impl HeadlessProvider {
    pub fn new(kind: ProviderKind, size: Point) -> Self {
        let profile = ProviderProfile::for_kind(kind);
        Self {
            kind,
            profile,
            size,
            center: LngLat::default(),
            zoom: profile.to_provider_zoom(MIN_ZOOM),
            pitch: 0.0,
            rotation: 0.0,
            fov: DEFAULT_FOV,
            style: None,
            loaded: false,
            load_error: None,
            events: VecDeque::new(),
        }
    }

    /// A provider whose SDK never loads
    pub fn failing(kind: ProviderKind, reason: impl Into<String>) -> Self {
        let mut provider = Self::new(kind, Point::new(800.0, 600.0));
        provider.load_error = Some(reason.into());
        provider
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// Queues an arbitrary payload, e.g. a malformed one
    pub fn push_camera_event(&mut self, event: CameraEvent) {
        self.events.push_back(event);
    }

    /// Payload describing the current camera
    pub fn camera_event(&self) -> CameraEvent {
        let half_fov = (self.fov / 2.0).to_radians();
        CameraEvent {
            fov: self.fov,
            near: 0.1,
            far: 10_000.0,
            height: (self.size.y / 2.0) / half_fov.tan(),
            pitch: self.pitch,
            rotation: self.rotation,
            aspect: self.size.x / self.size.y,
            position: self.project(self.center, self.canonical_zoom()),
        }
    }

    fn canonical_zoom(&self) -> f64 {
        self.profile.to_canonical_zoom(self.zoom)
    }

    fn set_native_zoom(&mut self, zoom: f64) {
        let min = self.profile.to_provider_zoom(MIN_ZOOM);
        let max = self.profile.to_provider_zoom(MAX_ZOOM);
        self.zoom = zoom.clamp(min, max);
    }

    fn camera_changed(&mut self) {
        if self.loaded {
            let event = self.camera_event();
            self.events.push_back(event);
        }
    }

    fn world_size(zoom: f64) -> f64 {
        TILE_SIZE * 2_f64.powf(zoom)
    }

    /// Projects to world pixel coordinates at a canonical zoom (EPSG:3857)
    fn project(&self, lng_lat: LngLat, zoom: f64) -> Point {
        let scale = Self::world_size(zoom);
        let mercator = lng_lat.to_mercator();
        Point::new(
            (mercator.x + PI * EARTH_RADIUS) / (2.0 * PI * EARTH_RADIUS) * scale,
            (PI * EARTH_RADIUS - mercator.y) / (2.0 * PI * EARTH_RADIUS) * scale,
        )
    }

    fn unproject(&self, pixel: Point, zoom: f64) -> LngLat {
        let scale = Self::world_size(zoom);
        let x = (pixel.x / scale) * (2.0 * PI * EARTH_RADIUS) - PI * EARTH_RADIUS;
        let y = PI * EARTH_RADIUS - (pixel.y / scale) * (2.0 * PI * EARTH_RADIUS);
        LngLat::from_mercator(Point::new(x, y))
    }

    fn half_size(&self) -> Point {
        self.size.multiply(0.5)
    }
}

#[async_trait]
impl ProviderBinding for HeadlessProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn load(&mut self, options: &ProviderOptions) -> Result<()> {
        if let Some(reason) = &self.load_error {
            return Err(MapError::ProviderUnavailable(reason.clone()));
        }

        if let Some(center) = options.center {
            self.center = center;
        }
        if let Some(zoom) = options.zoom {
            self.set_native_zoom(zoom);
        }
        if let Some(pitch) = options.pitch {
            self.pitch = pitch;
        }
        self.style = options.style.clone();
        self.loaded = true;
        log::debug!(
            "headless {:?} map '{}' loaded at zoom {}",
            self.kind,
            options.container_id,
            self.zoom
        );
        self.camera_changed();
        Ok(())
    }

    fn poll_camera_event(&mut self) -> Option<CameraEvent> {
        self.events.pop_front()
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn pitch(&self) -> f64 {
        self.pitch
    }

    fn rotation(&self) -> f64 {
        self.rotation
    }

    fn bounds(&self) -> LngLatBounds {
        let north_west = self.container_to_lng_lat(Point::new(0.0, 0.0));
        let south_east = self.container_to_lng_lat(self.size);
        LngLatBounds::from_corners(north_west, south_east)
    }

    fn set_rotation(&mut self, rotation: f64) {
        self.rotation = rotation.rem_euclid(360.0);
        self.camera_changed();
    }

    fn set_map_style(&mut self, style: &str) {
        self.style = Some(style.to_string());
    }

    fn zoom_in(&mut self) {
        self.set_native_zoom(self.zoom + 1.0);
        self.camera_changed();
    }

    fn zoom_out(&mut self) {
        self.set_native_zoom(self.zoom - 1.0);
        self.camera_changed();
    }

    fn pan_to(&mut self, center: LngLat) {
        self.center = center;
        self.camera_changed();
    }

    fn pan_by(&mut self, offset: Point) {
        // Content follows the finger, so the view center moves the other way.
        self.center = self.container_to_lng_lat(self.half_size().subtract(&offset));
        self.camera_changed();
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds) {
        let north_west = self.project(
            LngLat::new(bounds.south_west.lng, bounds.north_east.lat),
            0.0,
        );
        let south_east = self.project(
            LngLat::new(bounds.north_east.lng, bounds.south_west.lat),
            0.0,
        );
        let width = (south_east.x - north_west.x).abs().max(f64::EPSILON);
        let height = (south_east.y - north_west.y).abs().max(f64::EPSILON);
        let zoom = (self.size.x / width).log2().min((self.size.y / height).log2());

        self.center = bounds.center();
        self.set_native_zoom(self.profile.to_provider_zoom(zoom));
        self.camera_changed();
    }

    fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat) {
        self.center = center;
        self.set_native_zoom(zoom);
        self.camera_changed();
    }

    fn pixel_to_lng_lat(&self, pixel: Point) -> LngLat {
        self.unproject(pixel, self.canonical_zoom())
    }

    fn lng_lat_to_pixel(&self, lng_lat: LngLat) -> Point {
        self.project(lng_lat, self.canonical_zoom())
    }

    fn container_to_lng_lat(&self, pixel: Point) -> LngLat {
        let zoom = self.canonical_zoom();
        let origin = self.project(self.center, zoom).subtract(&self.half_size());
        self.unproject(origin.add(&pixel), zoom)
    }

    fn lng_lat_to_container(&self, lng_lat: LngLat) -> Point {
        let zoom = self.canonical_zoom();
        let origin = self.project(self.center, zoom).subtract(&self.half_size());
        self.project(lng_lat, zoom).subtract(&origin)
    }
}

use crate::{
    core::{
        bounds::LngLatBounds,
        config::{MapConfig, ProviderProfile},
        coordinates::{CoordinateSystem, CoordinateSystemService},
        geo::{LngLat, Point},
        viewport::{CameraParams, Viewport},
    },
    input::events::CameraCommand,
    providers::{CameraEvent, ProviderBinding},
    MapError, Result,
};

/// Lifecycle of a map session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Constructed, provider not loaded yet
    Created,
    Ready,
    /// The last load attempt failed; `init` may be retried
    Unavailable,
}

type CameraListener = Box<dyn Fn(&Viewport) + Send + Sync>;

/// One map session over a concrete provider.
///
/// Owns the provider binding together with the session's `Viewport` and
/// `CoordinateSystemService`. Provider camera notifications are normalized
/// here (zoom offset, rotation handedness) so that nothing downstream ever
/// sees provider conventions.
pub struct MapService<B: ProviderBinding> {
    binding: B,
    config: MapConfig,
    profile: ProviderProfile,
    viewport: Viewport,
    coordinates: CoordinateSystemService,
    state: SessionState,
    listeners: Vec<CameraListener>,
}

impl<B: ProviderBinding> MapService<B> {
    pub fn new(binding: B, config: MapConfig) -> Result<Self> {
        let viewport = Viewport::with_threshold(config.coordinate_threshold);
        Self::with_parts(binding, config, viewport, CoordinateSystemService::new())
    }

    /// Builds a session from explicitly supplied collaborators
    pub fn with_parts(
        binding: B,
        config: MapConfig,
        viewport: Viewport,
        coordinates: CoordinateSystemService,
    ) -> Result<Self> {
        config.validate()?;
        if binding.kind() != config.provider.kind {
            return Err(MapError::InvalidConfiguration(format!(
                "binding is {:?} but configuration targets {:?}",
                binding.kind(),
                config.provider.kind
            )));
        }

        let profile = config.resolved_profile();
        Ok(Self {
            binding,
            config,
            profile,
            viewport,
            coordinates,
            state: SessionState::Created,
            listeners: Vec::new(),
        })
    }

    /// Loads the provider and applies the initial camera.
    ///
    /// On failure the session stays not-ready and no viewport state is
    /// produced.
    pub async fn init(&mut self) -> Result<()> {
        if self.state == SessionState::Ready {
            return Ok(());
        }

        let options = self.config.provider.clone();
        if let Err(err) = self.binding.load(&options).await {
            self.state = SessionState::Unavailable;
            log::warn!("{:?} provider failed to load: {}", options.kind, err);
            return Err(match err {
                MapError::ProviderUnavailable(_) => err,
                other => MapError::ProviderUnavailable(other.to_string()),
            });
        }

        self.state = SessionState::Ready;
        log::debug!("{:?} session ready", options.kind);
        self.process_provider_events()?;
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(MapError::SessionNotReady)
        }
    }

    /// Normalizes one provider camera notification and syncs the viewport
    pub fn handle_camera_changed(&mut self, event: CameraEvent) -> Result<()> {
        self.ensure_ready()?;

        let params = CameraParams {
            center: self.binding.center(),
            zoom: self.profile.to_canonical_zoom(self.binding.zoom()),
            bearing: self.profile.to_canonical_bearing(event.rotation),
            pitch: event.pitch,
            fov: event.fov,
            near: event.near,
            far: event.far,
            camera_height: event.height,
            aspect: event.aspect,
            offset_origin: event.position,
        };

        if !params.is_valid() {
            log::warn!("dropping malformed camera event: {:?}", event);
            return Err(MapError::InvalidCameraPayload(format!("{:?}", event)));
        }

        self.viewport.sync_with_camera(params, &mut self.coordinates);
        for listener in &self.listeners {
            listener(&self.viewport);
        }
        Ok(())
    }

    /// Drains queued provider notifications in arrival order.
    ///
    /// Malformed payloads are dropped; returns how many were applied.
    pub fn process_provider_events(&mut self) -> Result<usize> {
        let mut applied = 0;
        while let Some(event) = self.binding.poll_camera_event() {
            match self.handle_camera_changed(event) {
                Ok(()) => applied += 1,
                Err(MapError::InvalidCameraPayload(_)) => {}
                Err(err) => return Err(err),
            }
        }
        Ok(applied)
    }

    /// Registers a callback run after every successful viewport sync
    pub fn on_camera_changed<F>(&mut self, listener: F)
    where
        F: Fn(&Viewport) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn zoom_in(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.binding.zoom_in();
        self.process_provider_events().map(|_| ())
    }

    pub fn zoom_out(&mut self) -> Result<()> {
        self.ensure_ready()?;
        self.binding.zoom_out();
        self.process_provider_events().map(|_| ())
    }

    pub fn pan_to(&mut self, center: LngLat) -> Result<()> {
        self.ensure_ready()?;
        self.binding.pan_to(center);
        self.process_provider_events().map(|_| ())
    }

    /// Centers the map on a container pixel
    pub fn pan_to_pixel(&mut self, pixel: Point) -> Result<()> {
        let center = self.container_to_lng_lat(pixel)?;
        self.pan_to(center)
    }

    pub fn pan_by(&mut self, offset: Point) -> Result<()> {
        self.ensure_ready()?;
        self.binding.pan_by(offset);
        self.process_provider_events().map(|_| ())
    }

    pub fn fit_bounds(&mut self, bounds: LngLatBounds) -> Result<()> {
        self.ensure_ready()?;
        self.binding.fit_bounds(bounds);
        self.process_provider_events().map(|_| ())
    }

    /// Moves the camera to a canonical zoom and center
    pub fn set_zoom_and_center(&mut self, zoom: f64, center: LngLat) -> Result<()> {
        self.ensure_ready()?;
        self.binding
            .set_zoom_and_center(self.profile.to_provider_zoom(zoom), center);
        self.process_provider_events().map(|_| ())
    }

    /// Rotates to a canonical (counterclockwise) bearing
    pub fn set_rotation(&mut self, bearing: f64) -> Result<()> {
        self.ensure_ready()?;
        self.binding
            .set_rotation(self.profile.to_provider_rotation(bearing));
        self.process_provider_events().map(|_| ())
    }

    pub fn set_map_style(&mut self, style: &str) -> Result<()> {
        self.ensure_ready()?;
        self.binding.set_map_style(style);
        self.process_provider_events().map(|_| ())
    }

    /// Executes the outcome of a recognized gesture
    pub fn apply_command(&mut self, command: CameraCommand) -> Result<()> {
        match command {
            CameraCommand::Zoom { delta, around } => {
                let zoom = self.zoom()?;
                let center = self.lng_lat_to_container(self.binding.center())?;
                // Keep the geographic point under `around` fixed on screen.
                let scale = 2_f64.powf(delta);
                let pivot = around.add(&center.subtract(&around).multiply(1.0 / scale));
                let new_center = self.container_to_lng_lat(pivot)?;
                log::trace!("zoom {:+} around {:?}", delta, around);
                self.set_zoom_and_center(zoom + delta, new_center)
            }
            CameraCommand::PanBy { offset } => self.pan_by(offset),
        }
    }

    pub fn pixel_to_lng_lat(&self, pixel: Point) -> Result<LngLat> {
        self.ensure_ready()?;
        Ok(self.binding.pixel_to_lng_lat(pixel))
    }

    pub fn lng_lat_to_pixel(&self, lng_lat: LngLat) -> Result<Point> {
        self.ensure_ready()?;
        Ok(self.binding.lng_lat_to_pixel(lng_lat))
    }

    pub fn container_to_lng_lat(&self, pixel: Point) -> Result<LngLat> {
        self.ensure_ready()?;
        Ok(self.binding.container_to_lng_lat(pixel))
    }

    pub fn lng_lat_to_container(&self, lng_lat: LngLat) -> Result<Point> {
        self.ensure_ready()?;
        Ok(self.binding.lng_lat_to_container(lng_lat))
    }

    /// Current canonical zoom, read live from the provider
    pub fn zoom(&self) -> Result<f64> {
        self.ensure_ready()?;
        Ok(self.profile.to_canonical_zoom(self.binding.zoom()))
    }

    pub fn center(&self) -> Result<LngLat> {
        self.ensure_ready()?;
        Ok(self.binding.center())
    }

    pub fn pitch(&self) -> Result<f64> {
        self.ensure_ready()?;
        Ok(self.binding.pitch())
    }

    /// Rotation in the provider's own handedness
    pub fn rotation(&self) -> Result<f64> {
        self.ensure_ready()?;
        Ok(self.binding.rotation())
    }

    pub fn bearing(&self) -> Result<f64> {
        Ok(self.profile.to_canonical_bearing(self.rotation()?))
    }

    pub fn bounds(&self) -> Result<LngLatBounds> {
        self.ensure_ready()?;
        Ok(self.binding.bounds())
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinates.coordinate_system()
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn profile(&self) -> ProviderProfile {
        self.profile
    }

    pub fn binding(&self) -> &B {
        &self.binding
    }

    pub fn binding_mut(&mut self) -> &mut B {
        &mut self.binding
    }
}

use crate::core::{
    constants::{COORDINATE_SYSTEM_ZOOM_THRESHOLD, DEFAULT_FOV},
    coordinates::{CoordinateSystem, CoordinateSystemService},
    geo::{LngLat, Point},
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Normalized camera parameters handed to `Viewport::sync_with_camera`.
///
/// Zoom is already in canonical numbering and bearing is already
/// counterclockwise-positive. All fields must be finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    pub center: LngLat,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
    pub fov: f64,
    pub near: f64,
    pub far: f64,
    pub camera_height: f64,
    pub aspect: f64,
    pub offset_origin: Point,
}

impl CameraParams {
    /// True when every numeric field is finite
    pub fn is_finite(&self) -> bool {
        self.center.is_finite()
            && self.offset_origin.is_finite()
            && [
                self.zoom,
                self.bearing,
                self.pitch,
                self.fov,
                self.near,
                self.far,
                self.camera_height,
                self.aspect,
            ]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Finite, with a usable frustum: positive aspect, `0 < near < far` and
    /// a field of view strictly between 0 and 180 degrees
    pub fn is_valid(&self) -> bool {
        self.is_finite()
            && self.aspect > 0.0
            && self.near > 0.0
            && self.far > self.near
            && self.fov > 0.0
            && self.fov < 180.0
    }
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            center: LngLat::default(),
            zoom: 0.0,
            bearing: 0.0,
            pitch: 0.0,
            fov: DEFAULT_FOV,
            near: 0.1,
            far: 1000.0,
            camera_height: 1.0,
            aspect: 1.0,
            offset_origin: Point::default(),
        }
    }
}

/// Canonical camera state of one map session.
///
/// The whole camera is replaced in one assignment on every sync, so readers
/// never see fields from two different camera events. Before the first sync
/// every accessor fails with `MapError::SessionNotReady`.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    camera: Option<CameraParams>,
    /// Zoom above which the session switches to offset coordinates
    threshold: f64,
}

impl Viewport {
    /// Creates an uninitialized viewport with the default switch threshold
    pub fn new() -> Self {
        Self::with_threshold(COORDINATE_SYSTEM_ZOOM_THRESHOLD)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            camera: None,
            threshold,
        }
    }

    /// Replaces the camera and recomputes the session's coordinate system.
    ///
    /// Precondition: `params.is_finite()`. Callers drop malformed payloads
    /// before they get here.
    pub fn sync_with_camera(
        &mut self,
        params: CameraParams,
        coordinates: &mut CoordinateSystemService,
    ) {
        debug_assert!(params.is_finite(), "non-finite camera payload reached the viewport");
        self.camera = Some(params);
        coordinates.set_coordinate_system(CoordinateSystem::for_zoom(params.zoom, self.threshold));
    }

    pub fn is_ready(&self) -> bool {
        self.camera.is_some()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// The full canonical camera as of the last sync
    pub fn camera(&self) -> Result<&CameraParams> {
        self.camera.as_ref().ok_or(MapError::SessionNotReady)
    }

    pub fn center(&self) -> Result<LngLat> {
        Ok(self.camera()?.center)
    }

    pub fn zoom(&self) -> Result<f64> {
        Ok(self.camera()?.zoom)
    }

    pub fn bearing(&self) -> Result<f64> {
        Ok(self.camera()?.bearing)
    }

    pub fn pitch(&self) -> Result<f64> {
        Ok(self.camera()?.pitch)
    }

    pub fn fov(&self) -> Result<f64> {
        Ok(self.camera()?.fov)
    }

    pub fn near(&self) -> Result<f64> {
        Ok(self.camera()?.near)
    }

    pub fn far(&self) -> Result<f64> {
        Ok(self.camera()?.far)
    }

    pub fn camera_height(&self) -> Result<f64> {
        Ok(self.camera()?.camera_height)
    }

    pub fn aspect(&self) -> Result<f64> {
        Ok(self.camera()?.aspect)
    }

    pub fn offset_origin(&self) -> Result<Point> {
        Ok(self.camera()?.offset_origin)
    }

    /// Gets the scale factor for the current zoom level
    pub fn scale(&self) -> Result<f64> {
        Ok(2_f64.powf(self.zoom()?))
    }

    /// Perspective projection built from fov, aspect and the clip planes
    #[cfg(feature = "render")]
    pub fn projection_matrix(&self) -> Result<nalgebra::Matrix4<f64>> {
        let camera = self.camera()?;
        if !camera.is_valid() {
            return Err(MapError::InvalidCameraPayload(format!(
                "no perspective for aspect {} fov {} near {} far {}",
                camera.aspect, camera.fov, camera.near, camera.far
            )));
        }
        let projection = nalgebra::Perspective3::new(
            camera.aspect,
            camera.fov.to_radians(),
            camera.near,
            camera.far,
        );
        Ok(projection.to_homogeneous())
    }

    /// View matrix of a camera orbiting the offset origin.
    ///
    /// The eye sits `camera_height` above the ground, tilted by pitch and
    /// turned counterclockwise by bearing.
    #[cfg(feature = "render")]
    pub fn view_matrix(&self) -> Result<nalgebra::Matrix4<f64>> {
        use nalgebra::{Point3, Rotation3, Vector3};

        let camera = self.camera()?;
        let target = Point3::new(camera.offset_origin.x, camera.offset_origin.y, 0.0);
        let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), camera.pitch.to_radians());
        let turn = Rotation3::from_axis_angle(&Vector3::z_axis(), camera.bearing.to_radians());
        let offset = turn * tilt * Vector3::new(0.0, 0.0, camera.camera_height);
        let up = turn * Vector3::y();

        Ok(nalgebra::Matrix4::look_at_rh(&(target + offset), &target, &up))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

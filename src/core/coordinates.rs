//! Coordinate system policy shared by the viewport and the renderer.
//!
//! At low zoom levels renderers can work directly in double precision
//! geographic coordinates. Past the switch threshold the numbers no longer fit
//! single precision GPU math, so geometry is expressed as offsets from a
//! zoom-localized origin instead.

use serde::{Deserialize, Serialize};

/// Numeric representation the renderer should use for positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CoordinateSystem {
    /// Raw geographic coordinates
    #[default]
    Base,
    /// Single precision offsets from the viewport's offset origin
    Offset,
}

impl CoordinateSystem {
    /// Selection rule: strictly above the threshold switches to offsets
    pub fn for_zoom(zoom: f64, threshold: f64) -> Self {
        if zoom > threshold {
            Self::Offset
        } else {
            Self::Base
        }
    }

    pub fn is_offset(&self) -> bool {
        matches!(self, Self::Offset)
    }
}

/// Holds the active coordinate system for one map session.
///
/// The mode is written by `Viewport::sync_with_camera` and read by the
/// renderer before each frame.
#[derive(Debug, Clone, Default)]
pub struct CoordinateSystemService {
    current: CoordinateSystem,
}

impl CoordinateSystemService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditionally replaces the active mode
    pub fn set_coordinate_system(&mut self, mode: CoordinateSystem) {
        if self.current != mode {
            log::debug!("coordinate system {:?} -> {:?}", self.current, mode);
        }
        self.current = mode;
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.current
    }
}

use crate::core::geo::LngLat;
use serde::{Deserialize, Serialize};

/// Geographic bounding box exchanged with map providers.
///
/// Serialized in the provider wire order `[[ne_lng, ne_lat], [sw_lng, sw_lat]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct LngLatBounds {
    pub north_east: LngLat,
    pub south_west: LngLat,
}

impl LngLatBounds {
    /// Creates bounds from the north-east and south-west corners
    pub fn new(north_east: LngLat, south_west: LngLat) -> Self {
        Self {
            north_east,
            south_west,
        }
    }

    /// Creates bounds from any two opposite corners
    pub fn from_corners(a: LngLat, b: LngLat) -> Self {
        Self::new(
            LngLat::new(a.lng.max(b.lng), a.lat.max(b.lat)),
            LngLat::new(a.lng.min(b.lng), a.lat.min(b.lat)),
        )
    }

    /// Gets the center of the bounds
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.north_east.lng + self.south_west.lng) / 2.0,
            (self.north_east.lat + self.south_west.lat) / 2.0,
        )
    }

    /// Checks if the bounds contain a coordinate
    pub fn contains(&self, point: &LngLat) -> bool {
        point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
            && point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
    }

    /// Converts into the provider array layout
    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.north_east.into(), self.south_west.into()]
    }
}

impl From<[[f64; 2]; 2]> for LngLatBounds {
    fn from(extent: [[f64; 2]; 2]) -> Self {
        Self::new(extent[0].into(), extent[1].into())
    }
}

impl From<LngLatBounds> for [[f64; 2]; 2] {
    fn from(bounds: LngLatBounds) -> Self {
        bounds.to_array()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_array_layout() {
        let bounds = LngLatBounds::from([[122.0, 32.0], [120.0, 30.0]]);
        assert_eq!(bounds.north_east, LngLat::new(122.0, 32.0));
        assert_eq!(bounds.south_west, LngLat::new(120.0, 30.0));
        assert_eq!(bounds.to_array(), [[122.0, 32.0], [120.0, 30.0]]);
    }

    #[test]
    fn test_bounds_json_is_nested_arrays() {
        let bounds = LngLatBounds::new(LngLat::new(1.0, 2.0), LngLat::new(-1.0, -2.0));
        let json = serde_json::to_string(&bounds).unwrap();
        assert_eq!(json, "[[1.0,2.0],[-1.0,-2.0]]");
    }

    #[test]
    fn test_from_corners_and_contains() {
        let bounds = LngLatBounds::from_corners(LngLat::new(10.0, -5.0), LngLat::new(-10.0, 5.0));
        assert_eq!(bounds.north_east, LngLat::new(10.0, 5.0));
        assert!(bounds.contains(&LngLat::new(0.0, 0.0)));
        assert!(!bounds.contains(&LngLat::new(11.0, 0.0)));
        assert_eq!(bounds.center(), LngLat::new(0.0, 0.0));
    }
}

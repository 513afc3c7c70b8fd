//! Geographic value objects used to scope discovery and prefetch queries.
//!
//! Distances are small (a few kilometres), so the bounding box uses the
//! equirectangular approximation: one degree of latitude is 111.32 km and a
//! degree of longitude shrinks with `cos(latitude)`.

use serde::{Deserialize, Serialize};

/// Metres spanned by one degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Build a point from latitude and longitude.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance in metres (haversine).
    #[must_use]
    pub fn distance_m(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
    }
}

/// Latitude/longitude rectangle.
///
/// # Examples
/// ```
/// use placy::domain::geo::{BoundingBox, Coordinates};
///
/// let center = Coordinates::new(63.4305, 10.3951);
/// let bbox = BoundingBox::around(center, 1_000.0);
/// assert!(bbox.contains(center));
/// assert!(bbox.max_lng - bbox.min_lng > bbox.max_lat - bbox.min_lat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lng: f64,
    /// Eastern edge.
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box with half-extent `radius_m` around `center`.
    #[must_use]
    pub fn around(center: Coordinates, radius_m: f64) -> Self {
        let lat_delta = radius_m / METERS_PER_DEGREE_LAT;
        let lng_delta = radius_m / (METERS_PER_DEGREE_LAT * center.lat.to_radians().cos());
        Self {
            min_lat: center.lat - lat_delta,
            max_lat: center.lat + lat_delta,
            min_lng: center.lng - lng_delta,
            max_lng: center.lng + lng_delta,
        }
    }

    /// Inclusive containment test.
    #[must_use]
    pub fn contains(&self, point: Coordinates) -> bool {
        point.is_finite()
            && (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

/// Rectangle import centers must fall within.
pub const NORWAY_BOUNDS: BoundingBox = BoundingBox {
    min_lat: 57.0,
    max_lat: 72.0,
    min_lng: 4.0,
    max_lng: 32.0,
};

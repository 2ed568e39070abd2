//! Geographic helper types

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the Haversine formula
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Meters spanned by one degree of latitude
const METERS_PER_DEGREE: f64 = 111_320.0;

/// A WGS84 point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting values outside the valid ranges
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let coordinate = Self { latitude, longitude };
        coordinate.is_valid().then_some(coordinate)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Calculate distance to another coordinate (in meters)
    /// Using Haversine formula
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Rectangle that fully contains the circle of `radius_m` around this
    /// point. Used to prefilter candidates before exact distance checks.
    ///
    /// Near the antimeridian the longitude range wraps, leaving
    /// `min_longitude > max_longitude`. A circle reaching a pole spans
    /// every longitude.
    pub fn bounding_box(&self, radius_m: f64) -> BoundingBox {
        let lat_delta = radius_m / METERS_PER_DEGREE;
        let min_latitude = self.latitude - lat_delta;
        let max_latitude = self.latitude + lat_delta;

        let cos_lat = self.latitude.to_radians().cos().abs();
        let lng_delta = if cos_lat < 1e-6 {
            180.0
        } else {
            radius_m / (METERS_PER_DEGREE * cos_lat)
        };

        let (min_longitude, max_longitude) =
            if lng_delta >= 180.0 || min_latitude <= -90.0 || max_latitude >= 90.0 {
                (-180.0, 180.0)
            } else {
                (
                    wrap_longitude(self.longitude - lng_delta),
                    wrap_longitude(self.longitude + lng_delta),
                )
            };

        BoundingBox {
            min_latitude: min_latitude.max(-90.0),
            max_latitude: max_latitude.min(90.0),
            min_longitude,
            max_longitude,
        }
    }
}

/// Bring a longitude back into [-180, 180]
fn wrap_longitude(longitude: f64) -> f64 {
    if longitude < -180.0 {
        longitude + 360.0
    } else if longitude > 180.0 {
        longitude - 360.0
    } else {
        longitude
    }
}

/// Latitude/longitude rectangle; see [`BoundingBox::crosses_antimeridian`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// True when the longitude range wraps past ±180, so it covers
    /// `[min_longitude, 180]` and `[-180, max_longitude]`
    pub fn crosses_antimeridian(&self) -> bool {
        self.min_longitude > self.max_longitude
    }

    pub fn contains(&self, point: &Coordinate) -> bool {
        let longitude_inside = if self.crosses_antimeridian() {
            point.longitude >= self.min_longitude || point.longitude <= self.max_longitude
        } else {
            (self.min_longitude..=self.max_longitude).contains(&point.longitude)
        };
        (self.min_latitude..=self.max_latitude).contains(&point.latitude) && longitude_inside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(Coordinate::new(91.0, 0.0).is_none());
        assert!(Coordinate::new(0.0, -180.5).is_none());
        assert!(Coordinate::new(f64::NAN, 0.0).is_none());
        assert!(Coordinate::new(-23.55, -46.63).is_some());
    }

    #[test]
    fn test_distance_sao_paulo_to_rio() {
        let sao_paulo = Coordinate::new(-23.5505, -46.6333).unwrap();
        let rio = Coordinate::new(-22.9068, -43.1729).unwrap();
        let km = sao_paulo.distance_to(&rio) / 1000.0;
        assert!((355.0..365.0).contains(&km), "got {} km", km);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let point = Coordinate::new(10.0, 20.0).unwrap();
        assert!(point.distance_to(&point) < 1e-6);
    }

    #[test]
    fn test_bounding_box_contains_circle_edge() {
        let center = Coordinate::new(-23.5505, -46.6333).unwrap();
        let bbox = center.bounding_box(5_000.0);
        // roughly 4.9 km north and east
        let north = Coordinate::new(-23.5065, -46.6333).unwrap();
        let east = Coordinate::new(-23.5505, -46.5855).unwrap();
        assert!(bbox.contains(&north));
        assert!(bbox.contains(&east));
        assert!(!bbox.contains(&Coordinate::new(-22.9, -43.17).unwrap()));
    }

    #[test]
    fn test_bounding_box_wraps_antimeridian() {
        let center = Coordinate::new(0.0, 179.98).unwrap();
        let bbox = center.bounding_box(10_000.0);
        assert!(bbox.crosses_antimeridian());

        let across = Coordinate::new(0.0, -179.98).unwrap();
        assert!(center.distance_to(&across) < 10_000.0);
        assert!(bbox.contains(&across));
        assert!(bbox.contains(&Coordinate::new(0.0, 179.95).unwrap()));
        assert!(!bbox.contains(&Coordinate::new(0.0, 0.0).unwrap()));
        assert!(!bbox.contains(&Coordinate::new(0.0, -170.0).unwrap()));
    }

    #[test]
    fn test_bounding_box_near_pole_spans_all_longitudes() {
        let center = Coordinate::new(89.99, 10.0).unwrap();
        let bbox = center.bounding_box(5_000.0);
        assert!(!bbox.crosses_antimeridian());
        assert_eq!(bbox.min_longitude, -180.0);
        assert_eq!(bbox.max_longitude, 180.0);
        assert!(bbox.contains(&Coordinate::new(89.98, -170.0).unwrap()));
    }
}

//! Great-circle distance primitives.
//!
//! Distances are in statute miles throughout the crate; the feed and search
//! layers only ever ask two questions of this module: "how far apart are
//! these points" and "is this point inside that radius".

/// Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Haversine distance between two points in miles.
///
/// NaN inputs propagate to a NaN result; callers validate coordinates
/// upstream.
#[must_use]
pub fn haversine_miles(a: Point, b: Point) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Containment test used by the in-memory geographic filter path.
#[must_use]
pub fn within_radius(point: Point, center: Point, radius_miles: f64) -> bool {
    haversine_miles(point, center) <= radius_miles
}

/// Degrees of latitude/longitude spanning `radius_miles` around `center`.
///
/// Used as a coarse SQL prefilter before the exact haversine test; the box
/// always contains the circle. Longitude degrees shrink with latitude, so
/// the span is widened by `cos(latitude)` with a floor to stay finite near
/// the poles.
#[must_use]
pub fn bounding_box(center: Point, radius_miles: f64) -> BoundingBox {
    const MILES_PER_DEGREE: f64 = 69.0;

    let lat_delta = radius_miles / MILES_PER_DEGREE;
    let lon_scale = center.latitude.to_radians().cos().abs().max(0.01);
    let lon_delta = radius_miles / (MILES_PER_DEGREE * lon_scale);

    BoundingBox {
        min_lat: center.latitude - lat_delta,
        max_lat: center.latitude + lat_delta,
        min_lon: center.longitude - lon_delta,
        max_lon: center.longitude + lon_delta,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

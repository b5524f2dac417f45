//! Geometry calculations used to parameterise camera updates.
//!
//! Pure functions, no state. Distances are great-circle (haversine) in meters.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Lowest zoom a multi-point camera will produce.
pub const MIN_ZOOM: f64 = 2.0;
/// Highest zoom a multi-point (overview) camera will produce.
pub const MAX_OVERVIEW_ZOOM: f64 = 14.0;
/// Fraction of the span added on every side before fitting a zoom level.
pub const DEFAULT_BOUNDS_PADDING: f64 = 0.2;

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(self, other)
    }
}

/// Great-circle distance between two coordinates using the haversine formula.
///
/// Identical coordinates yield exactly `0.0`.
pub fn distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let sin_dlat = (delta_lat / 2.0).sin();
    let sin_dlng = (delta_lng / 2.0).sin();
    let a = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    // Rounding can push `a` a hair outside [0, 1] for near-antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Initial bearing (forward azimuth) from `from` to `to`, in degrees 0-360.
pub fn bearing_degrees(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let y = delta_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Axis-aligned box spanning a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl BoundingBox {
    /// Smallest box containing both points.
    pub fn from_pair(a: &Coordinate, b: &Coordinate) -> Self {
        Self {
            south_west: Coordinate::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: Coordinate::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn lat_span(&self) -> f64 {
        self.north_east.lat - self.south_west.lat
    }

    pub fn lng_span(&self) -> f64 {
        self.north_east.lng - self.south_west.lng
    }

    /// Grow the box by `fraction` of its span on every side.
    pub fn padded(&self, fraction: f64) -> Self {
        let dlat = self.lat_span() * fraction;
        let dlng = self.lng_span() * fraction;
        Self {
            south_west: Coordinate::new(
                (self.south_west.lat - dlat).max(-90.0),
                self.south_west.lng - dlng,
            ),
            north_east: Coordinate::new(
                (self.north_east.lat + dlat).min(90.0),
                self.north_east.lng + dlng,
            ),
        }
    }
}

/// Zoom level that fits a lat/lng span on screen, clamped to
/// `[MIN_ZOOM, MAX_OVERVIEW_ZOOM]`.
///
/// Uses the web-mercator tile relation: each zoom step halves the visible
/// span (360° of longitude / 180° of latitude at zoom 0).
pub fn zoom_for_span(lat_span: f64, lng_span: f64) -> f64 {
    let lat_zoom = if lat_span > 0.0 {
        (180.0 / lat_span).log2()
    } else {
        f64::INFINITY
    };
    let lng_zoom = if lng_span > 0.0 {
        (360.0 / lng_span).log2()
    } else {
        f64::INFINITY
    };

    let zoom = lat_zoom.min(lng_zoom);
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_OVERVIEW_ZOOM)
    } else {
        MAX_OVERVIEW_ZOOM
    }
}

/// Center, zoom and extent needed to frame two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteBounds {
    pub center: Coordinate,
    pub zoom: f64,
    pub bounds: BoundingBox,
    pub distance_m: f64,
}

/// Frame two points with the default padding.
pub fn calculate_bounds(a: &Coordinate, b: &Coordinate) -> RouteBounds {
    calculate_bounds_with_padding(a, b, DEFAULT_BOUNDS_PADDING)
}

pub fn calculate_bounds_with_padding(a: &Coordinate, b: &Coordinate, padding: f64) -> RouteBounds {
    let raw = BoundingBox::from_pair(a, b);
    let bounds = raw.padded(padding.max(0.0));
    RouteBounds {
        center: raw.center(),
        zoom: zoom_for_span(bounds.lat_span(), bounds.lng_span()),
        bounds,
        distance_m: distance_meters(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMES_SQUARE: Coordinate = Coordinate::new(40.7589, -73.9851);
    const LIBERTY: Coordinate = Coordinate::new(40.6892, -74.0445);

    #[test]
    fn test_identical_points_have_zero_distance() {
        assert_eq!(distance_meters(&TIMES_SQUARE, &TIMES_SQUARE), 0.0);
    }

    #[test]
    fn test_opposite_meridians_are_half_circumference_apart() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let half_circumference = std::f64::consts::PI * EARTH_RADIUS_M;
        let d = distance_meters(&a, &b);
        assert!((d - half_circumference).abs() / half_circumference < 0.01);
        assert!((d - 20_015_000.0).abs() < 200_000.0);

        let c = Coordinate::new(0.0, -180.0);
        assert!(distance_meters(&c, &a) > 19_800_000.0);
    }

    #[test]
    fn test_one_degree_of_latitude_is_about_111km() {
        let d = distance_meters(&Coordinate::new(35.0, 139.0), &Coordinate::new(36.0, 139.0));
        assert!((d - 111_000.0).abs() < 1_000.0);
    }

    #[test]
    fn test_manhattan_to_liberty_island() {
        let d = TIMES_SQUARE.distance_to(&LIBERTY);
        assert!(d > 8_500.0 && d < 9_500.0, "got {d}");
    }

    #[test]
    fn test_bearing_north_and_east() {
        let origin = Coordinate::new(0.0, 0.0);
        let north = bearing_degrees(&origin, &Coordinate::new(1.0, 0.0));
        let east = bearing_degrees(&origin, &Coordinate::new(0.0, 1.0));
        assert!(north.abs() < 1e-9 || (north - 360.0).abs() < 1e-9);
        assert!((east - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounds_frame_both_points() {
        let frame = calculate_bounds(&TIMES_SQUARE, &LIBERTY);
        assert!(frame.zoom <= MAX_OVERVIEW_ZOOM);
        assert!(frame.zoom >= MIN_ZOOM);
        assert!((frame.center.lat - 40.72405).abs() < 1e-9);
        assert!((frame.center.lng + 74.0148).abs() < 1e-9);
        assert!(frame.bounds.south_west.lat < LIBERTY.lat);
        assert!(frame.bounds.north_east.lat > TIMES_SQUARE.lat);
    }

    #[test]
    fn test_coincident_points_zoom_to_max() {
        let frame = calculate_bounds(&LIBERTY, &LIBERTY);
        assert_eq!(frame.zoom, MAX_OVERVIEW_ZOOM);
        assert_eq!(frame.distance_m, 0.0);
    }

    #[test]
    fn test_world_span_clamps_to_min_zoom() {
        assert_eq!(zoom_for_span(180.0, 360.0 * 8.0), MIN_ZOOM);
    }
}

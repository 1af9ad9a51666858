//! Map projections used to turn a center/zoom/container size into bounds.
//!
//! The rendering engine owns the projection; the viewport only borrows it
//! through the [`Projection`] trait so that bounds always agree with what the
//! engine draws.

use crate::core::constants::{EARTH_RADIUS, TILE_SIZE};
use crate::core::geo::{LatLng, Point};
use std::f64::consts::PI;

/// Trait for coordinate transformation between geographic and world pixel space
pub trait Projection: Send + Sync {
    /// Transform geographic coordinates to world pixel coordinates at `zoom`
    fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point;

    /// Transform world pixel coordinates back to geographic coordinates at `zoom`
    fn unproject(&self, point: &Point, zoom: f64) -> LatLng;

    /// Ground resolution in meters per pixel at the given latitude and zoom
    fn meters_per_pixel(&self, lat: f64, zoom: f64) -> f64;

    /// Projection code, e.g. `EPSG:3857`
    fn code(&self) -> &'static str;
}

/// Spherical Web Mercator (EPSG:3857) over square tiles of [`TILE_SIZE`] pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WebMercator;

impl WebMercator {
    /// World size in pixels at the given zoom level
    pub fn world_size(zoom: f64) -> f64 {
        TILE_SIZE as f64 * 2_f64.powf(zoom)
    }

    /// Projected meter bounds `(min_x, min_y, max_x, max_y)` of tile `x/y` at zoom `z`
    pub fn tile_bounds_meters(x: u32, y: u32, z: u8) -> (f64, f64, f64, f64) {
        let extent = PI * EARTH_RADIUS;
        let tile_span = 2.0 * extent / 2_f64.powi(z as i32);
        let min_x = -extent + x as f64 * tile_span;
        let max_y = extent - y as f64 * tile_span;
        (min_x, max_y - tile_span, min_x + tile_span, max_y)
    }
}

impl Projection for WebMercator {
    fn project(&self, lat_lng: &LatLng, zoom: f64) -> Point {
        let scale = Self::world_size(zoom);
        let lat_rad = LatLng::clamp_lat(lat_lng.lat).to_radians();

        let x = (lat_lng.lon + 180.0) / 360.0 * scale;
        let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * scale;
        Point::new(x, y)
    }

    fn unproject(&self, point: &Point, zoom: f64) -> LatLng {
        let scale = Self::world_size(zoom);

        let lon = point.x / scale * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * point.y / scale)).sinh().atan().to_degrees();
        LatLng::new(lat, lon)
    }

    fn meters_per_pixel(&self, lat: f64, zoom: f64) -> f64 {
        let circumference = 2.0 * PI * EARTH_RADIUS;
        circumference * LatLng::clamp_lat(lat).to_radians().cos() / Self::world_size(zoom)
    }

    fn code(&self) -> &'static str {
        "EPSG:3857"
    }
}

use crate::core::geo::{GeoBounds, LatLng, Point};
use crate::core::projection::Projection;
use std::sync::Arc;

/// Manages the current view of the map: center, zoom, container size and the
/// bounds derived from them.
///
/// `bounds` is never set directly. Every mutation that can move it (zoom,
/// center, container size, zoom limits) recomputes it through the engine's
/// projection before returning.
#[derive(Clone)]
pub struct ViewportState {
    center: LatLng,
    zoom: u8,
    min_zoom: u8,
    max_zoom: u8,
    /// The size of the mount point in pixels
    size: Point,
    bounds: GeoBounds,
    projection: Arc<dyn Projection>,
}

impl std::fmt::Debug for ViewportState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportState")
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("min_zoom", &self.min_zoom)
            .field("max_zoom", &self.max_zoom)
            .field("size", &self.size)
            .field("bounds", &self.bounds)
            .field("projection", &self.projection.code())
            .finish()
    }
}

/// Rounds a requested zoom to the nearest integer level (half away from zero)
/// and clamps it into `[min_zoom, max_zoom]`. Returns `None` for NaN.
fn snap_zoom(zoom: f64, min_zoom: u8, max_zoom: u8) -> Option<u8> {
    if zoom.is_nan() {
        return None;
    }
    Some(zoom.round().clamp(min_zoom as f64, max_zoom as f64) as u8)
}

impl ViewportState {
    /// Creates the viewport for a freshly mounted map.
    ///
    /// `zoom` is snapped into `[min_zoom, max_zoom]`; an inverted range is
    /// collapsed onto `min_zoom`.
    pub fn initialize(
        center: LatLng,
        zoom: f64,
        min_zoom: u8,
        max_zoom: u8,
        size: Point,
        projection: Arc<dyn Projection>,
    ) -> Self {
        let max_zoom = if max_zoom < min_zoom {
            log::warn!(
                "maxZoom {} is below minZoom {}, using {} for both",
                max_zoom,
                min_zoom,
                min_zoom
            );
            min_zoom
        } else {
            max_zoom
        };
        let zoom = snap_zoom(zoom, min_zoom, max_zoom).unwrap_or(min_zoom);
        let center = LatLng::new(LatLng::clamp_lat(center.lat), center.lon);

        let mut viewport = Self {
            center,
            zoom,
            min_zoom,
            max_zoom,
            size,
            bounds: GeoBounds::new(center, center),
            projection,
        };
        viewport.update_bounds();
        viewport
    }

    /// Sets the zoom level, snapping and clamping it to the allowed range.
    ///
    /// Bounds are recomputed even when the effective level does not change.
    /// Returns `true` if the effective zoom level changed.
    pub fn set_zoom_level(&mut self, zoom: f64) -> bool {
        let old_zoom = self.zoom;
        if let Some(zoom) = snap_zoom(zoom, self.min_zoom, self.max_zoom) {
            self.zoom = zoom;
        }
        self.update_bounds();
        self.zoom != old_zoom
    }

    /// Moves the center, keeping zoom and container size.
    /// Returns `true` if the center moved.
    pub fn set_center(&mut self, center: LatLng) -> bool {
        let center = LatLng::new(LatLng::clamp_lat(center.lat), center.lon);
        let moved = center != self.center;
        self.center = center;
        self.update_bounds();
        moved
    }

    /// Re-reads the container size. Center and zoom are invariant; the bounds
    /// grow or shrink with the container.
    pub fn resize(&mut self, size: Point) {
        self.size = size;
        self.update_bounds();
    }

    /// Sets the lower zoom limit, pushing the upper limit and current zoom along.
    /// Returns `true` if the effective zoom level changed.
    pub fn set_min_zoom(&mut self, min_zoom: u8) -> bool {
        self.min_zoom = min_zoom;
        self.max_zoom = self.max_zoom.max(min_zoom);
        self.reclamp()
    }

    /// Sets the upper zoom limit, pushing the lower limit and current zoom along.
    /// Returns `true` if the effective zoom level changed.
    pub fn set_max_zoom(&mut self, max_zoom: u8) -> bool {
        self.max_zoom = max_zoom;
        self.min_zoom = self.min_zoom.min(max_zoom);
        self.reclamp()
    }

    fn reclamp(&mut self) -> bool {
        let old_zoom = self.zoom;
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
        self.update_bounds();
        self.zoom != old_zoom
    }

    /// Derives the bounds from center, zoom and container size
    fn update_bounds(&mut self) {
        let zoom = self.zoom as f64;
        let center_px = self.projection.project(&self.center, zoom);
        let half = self.size.multiply(0.5);

        let top_left = self.projection.unproject(&center_px.subtract(&half), zoom);
        let bottom_right = self.projection.unproject(&center_px.add(&half), zoom);
        self.bounds = GeoBounds::new(top_left, bottom_right);
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn center(&self) -> LatLng {
        self.center
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom
    }

    pub fn min_zoom(&self) -> u8 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> u8 {
        self.max_zoom
    }

    pub fn size(&self) -> Point {
        self.size
    }

    /// Ground resolution at the current center and zoom
    pub fn meters_per_pixel(&self) -> f64 {
        self.projection
            .meters_per_pixel(self.center.lat, self.zoom as f64)
    }
}

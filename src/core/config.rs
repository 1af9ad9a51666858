//! Construction options for [`crate::KibanaMap`].
//!
//! Options deserialize from the same camelCase JSON the widget is configured
//! with on the embedding side, e.g.
//! `{"minZoom": 1, "maxZoom": 10, "center": [0, 0], "zoom": 3}`.

use crate::core::constants::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, DEFAULT_ZOOM};
use crate::core::geo::LatLng;
use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KibanaMapOptions {
    pub min_zoom: u8,
    pub max_zoom: u8,
    /// `[lat, lon]`
    pub center: Option<[f64; 2]>,
    pub zoom: Option<f64>,
}

impl Default for KibanaMapOptions {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
            center: None,
            zoom: None,
        }
    }
}

impl KibanaMapOptions {
    pub fn new(min_zoom: u8, max_zoom: u8, center: [f64; 2], zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            center: Some(center),
            zoom: Some(zoom),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Center to open the map at; `[0, 0]` when not configured.
    pub fn initial_center(&self) -> LatLng {
        self.center.map(LatLng::from).unwrap_or_default()
    }

    /// Zoom to open the map at, before clamping.
    ///
    /// A missing zoom and a zoom of `0` both mean "not configured" and fall
    /// back to [`DEFAULT_ZOOM`].
    pub fn initial_zoom(&self) -> f64 {
        match self.zoom {
            Some(zoom) if zoom != 0.0 => zoom,
            _ => DEFAULT_ZOOM,
        }
    }
}

//! Base layer configuration and the validated tile sources built from it.
//!
//! Configuration arrives loosely typed from the embedding application: every
//! option may be missing. [`BaseLayerConfig::validate`] turns it into a
//! [`BaseLayerSource`] only when all fields its variant needs are usable.

use crate::core::constants::{DEFAULT_SUBDOMAINS, DEFAULT_WMS_VERSION, TILE_SIZE};
use crate::core::projection::WebMercator;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Base layer settings as supplied by the caller,
/// e.g. `{"baseLayerType": "tms", "options": {"url": "..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "baseLayerType", content = "options", rename_all = "lowercase")]
pub enum BaseLayerConfig {
    Tms(TmsOptions),
    Wms(WmsOptions),
}

/// Options of an XYZ/TMS tile service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TmsOptions {
    /// URL template with `{z}`, `{x}`, `{y}` and optionally `{s}` placeholders
    pub url: Option<String>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
    pub attribution: Option<String>,
    /// Values substituted for `{s}`
    pub subdomains: Vec<String>,
}

/// Options of an OGC Web Map Service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WmsOptions {
    pub url: Option<String>,
    /// Comma-separated WMS layer names
    pub layers: Option<String>,
    /// Image MIME type, e.g. `image/png`
    pub format: Option<String>,
    pub styles: Option<String>,
    pub transparent: Option<bool>,
    pub version: Option<String>,
    pub attribution: Option<String>,
    pub min_zoom: Option<u8>,
    pub max_zoom: Option<u8>,
}

fn usable(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(layer_type: &'static str, reason: impl Into<String>) -> MapError {
    MapError::InvalidBaseLayer {
        layer_type,
        reason: reason.into(),
    }
}

fn zoom_range(
    layer_type: &'static str,
    min_zoom: Option<u8>,
    max_zoom: Option<u8>,
) -> Result<(u8, u8)> {
    let min_zoom = min_zoom.unwrap_or(0);
    let max_zoom = max_zoom.unwrap_or(18);
    if min_zoom > max_zoom {
        return Err(invalid(
            layer_type,
            format!("minZoom {} exceeds maxZoom {}", min_zoom, max_zoom),
        ));
    }
    Ok((min_zoom, max_zoom))
}

impl BaseLayerConfig {
    pub fn tms(options: TmsOptions) -> Self {
        Self::Tms(options)
    }

    pub fn wms(options: WmsOptions) -> Self {
        Self::Wms(options)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// `"tms"` or `"wms"`
    pub fn layer_type(&self) -> &'static str {
        match self {
            Self::Tms(_) => "tms",
            Self::Wms(_) => "wms",
        }
    }

    /// Checks the required fields of the variant and builds the source the
    /// engine will draw from. Nothing is applied on failure.
    pub fn validate(&self) -> Result<BaseLayerSource> {
        match self {
            Self::Tms(options) => options.validate().map(BaseLayerSource::Tms),
            Self::Wms(options) => options.validate().map(BaseLayerSource::Wms),
        }
    }
}

impl TmsOptions {
    fn validate(&self) -> Result<TmsSource> {
        let url = usable(&self.url).ok_or_else(|| invalid("tms", "missing url"))?;
        for placeholder in ["{z}", "{x}", "{y}"] {
            if !url.contains(placeholder) {
                return Err(invalid(
                    "tms",
                    format!("url template has no {} placeholder", placeholder),
                ));
            }
        }
        let (min_zoom, max_zoom) = zoom_range("tms", self.min_zoom, self.max_zoom)?;

        let subdomains = if self.subdomains.is_empty() {
            DEFAULT_SUBDOMAINS.iter().map(|s| s.to_string()).collect()
        } else {
            self.subdomains.clone()
        };

        Ok(TmsSource {
            url_template: url.to_string(),
            subdomains,
            attribution: usable(&self.attribution).map(str::to_string),
            min_zoom,
            max_zoom,
        })
    }
}

impl WmsOptions {
    fn validate(&self) -> Result<WmsSource> {
        let url = usable(&self.url).ok_or_else(|| invalid("wms", "missing url"))?;
        let layers = usable(&self.layers).ok_or_else(|| invalid("wms", "missing layers"))?;
        let format = usable(&self.format).ok_or_else(|| invalid("wms", "missing format"))?;
        let url = Url::parse(url).map_err(|e| invalid("wms", format!("bad url {}: {}", url, e)))?;
        let (min_zoom, max_zoom) = zoom_range("wms", self.min_zoom, self.max_zoom)?;

        Ok(WmsSource {
            url,
            layers: layers.to_string(),
            format: format.to_string(),
            styles: self.styles.clone().unwrap_or_default(),
            transparent: self.transparent.unwrap_or(false),
            version: usable(&self.version)
                .unwrap_or(DEFAULT_WMS_VERSION)
                .to_string(),
            attribution: usable(&self.attribution).map(str::to_string),
            min_zoom,
            max_zoom,
        })
    }
}

/// A validated base layer, ready to be attached to the rendering engine
#[derive(Debug, Clone, PartialEq)]
pub enum BaseLayerSource {
    Tms(TmsSource),
    Wms(WmsSource),
}

impl BaseLayerSource {
    /// Build the request URL for tile `x/y` at zoom `z`
    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> String {
        match self {
            Self::Tms(source) => source.tile_url(x, y, z),
            Self::Wms(source) => source.tile_url(x, y, z),
        }
    }

    pub fn attribution(&self) -> Option<&str> {
        match self {
            Self::Tms(source) => source.attribution.as_deref(),
            Self::Wms(source) => source.attribution.as_deref(),
        }
    }

    pub fn zoom_range(&self) -> (u8, u8) {
        match self {
            Self::Tms(source) => (source.min_zoom, source.max_zoom),
            Self::Wms(source) => (source.min_zoom, source.max_zoom),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TmsSource {
    pub url_template: String,
    pub subdomains: Vec<String>,
    pub attribution: Option<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl TmsSource {
    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string());

        if !self.subdomains.is_empty() {
            let idx = ((x as usize) + (y as usize)) % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[idx]);
        }
        url
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WmsSource {
    pub url: Url,
    pub layers: String,
    pub format: String,
    pub styles: String,
    pub transparent: bool,
    pub version: String,
    pub attribution: Option<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl WmsSource {
    /// GetMap request covering the tile's EPSG:3857 extent
    pub fn tile_url(&self, x: u32, y: u32, z: u8) -> String {
        let (min_x, min_y, max_x, max_y) = WebMercator::tile_bounds_meters(x, y, z);
        // WMS 1.3.0 renamed SRS to CRS
        let crs_param = if self.version.as_str() >= "1.3" { "CRS" } else { "SRS" };
        let size = TILE_SIZE.to_string();

        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair("SERVICE", "WMS")
            .append_pair("REQUEST", "GetMap")
            .append_pair("VERSION", &self.version)
            .append_pair("LAYERS", &self.layers)
            .append_pair("STYLES", &self.styles)
            .append_pair("FORMAT", &self.format)
            .append_pair("TRANSPARENT", if self.transparent { "TRUE" } else { "FALSE" })
            .append_pair(crs_param, "EPSG:3857")
            .append_pair("WIDTH", &size)
            .append_pair("HEIGHT", &size)
            .append_pair(
                "BBOX",
                &format!("{},{},{},{}", min_x, min_y, max_x, max_y),
            );
        url.into()
    }
}

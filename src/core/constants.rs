//! Core constants derived from Leaflet defaults and common web-map conventions.
//! Keeping them in a single place makes it easier to tweak engine-wide magic numbers.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude limit of the Web Mercator projection (EPSG:3857).
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Equatorial radius used by EPSG:3857, in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Zoom bounds used when the map options leave them out.
pub const DEFAULT_MIN_ZOOM: u8 = 0;
pub const DEFAULT_MAX_ZOOM: u8 = 18;

/// Initial zoom used when the map options leave it out.
pub const DEFAULT_ZOOM: f64 = 2.0;

/// WMS protocol version requested when the base layer options leave it out.
pub const DEFAULT_WMS_VERSION: &str = "1.3.0";

/// Substituted for `{s}` when a TMS layer configures no subdomains
pub const DEFAULT_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Separator placed between attribution fragments in the rendered text.
pub const ATTRIBUTION_SEPARATOR: &str = ", ";

/// Event names understood by [`crate::KibanaMap::on`].
pub const EVENT_BASE_LAYER_LOADED: &str = "baseLayer:loaded";
pub const EVENT_BASE_LAYER_LOADING: &str = "baseLayer:loading";
pub const EVENT_LAYERS_INVALIDATED: &str = "layers:invalidated";
pub const EVENT_ZOOM_CHANGE: &str = "zoomchange";
pub const EVENT_MOVE_END: &str = "moveend";

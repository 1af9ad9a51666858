//! # kibana-map
//!
//! Bookkeeping core of an embeddable tile map widget.
//!
//! The crate keeps viewport state (center, zoom, bounds), a stack of overlay
//! layers with their source attributions, and a single switchable base (tile)
//! layer consistent with each other, while the actual tile fetching and
//! drawing is delegated to an external [`engine::RenderEngine`].

pub mod core;
pub mod engine;
pub mod events;
pub mod layers;
pub mod prelude;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::KibanaMapOptions,
    geo::{GeoBounds, LatLng, Point},
    map::KibanaMap,
    projection::{Projection, WebMercator},
    viewport::ViewportState,
};

pub use engine::{headless::HeadlessEngine, EngineHandle, MountPoint, RenderEngine};

pub use events::{EventManager, MapEvent};

pub use layers::{
    attribution::AttributionRegistry,
    base::{MapLayer, OverlayLayer},
    manager::LayerStack,
};

pub use tiles::{
    controller::{BaseLayerController, BaseLayerState},
    source::{BaseLayerConfig, BaseLayerSource, TmsOptions, WmsOptions},
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Invalid {layer_type} base layer configuration: {reason}")]
    InvalidBaseLayer {
        layer_type: &'static str,
        reason: String,
    },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Map has been destroyed")]
    Destroyed,
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs an `env_logger` backend for the `log` facade.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}

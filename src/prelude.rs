//! Prelude module for common kibana-map types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use kibana_map::prelude::*;`

pub use crate::core::{
    config::KibanaMapOptions,
    geo::{GeoBounds, LatLng, Point},
    map::KibanaMap,
    projection::{Projection, WebMercator},
    viewport::ViewportState,
};

pub use crate::layers::{
    attribution::AttributionRegistry,
    base::{MapLayer, OverlayLayer},
    manager::LayerStack,
};

pub use crate::tiles::{
    controller::{BaseLayerController, BaseLayerState},
    source::{BaseLayerConfig, BaseLayerSource, TmsOptions, WmsOptions},
};

pub use crate::engine::{
    headless::{HeadlessEngine, LoadMode},
    EngineHandle, MountPoint, RenderEngine,
};

pub use crate::events::{EventManager, MapEvent};

// Re-export commonly used external types
pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
pub use std::collections::VecDeque;
pub use std::sync::Arc;

pub use crate::{Error as MapError, Result};

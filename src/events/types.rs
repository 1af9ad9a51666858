use crate::core::constants::{
    EVENT_BASE_LAYER_LOADED, EVENT_BASE_LAYER_LOADING, EVENT_LAYERS_INVALIDATED,
    EVENT_MOVE_END, EVENT_ZOOM_CHANGE,
};
use crate::core::geo::LatLng;

/// Events a map emits to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The current base layer finished loading its tiles
    BaseLayerLoaded { generation: u64 },
    /// A new base layer was attached and started loading
    BaseLayerLoading { generation: u64 },
    /// An overlay layer was added or removed
    LayersInvalidated,
    /// The effective zoom level changed
    ZoomChange { zoom: u8 },
    /// The center moved
    MoveEnd { center: LatLng },
}

impl MapEvent {
    /// Name subscribers register for with `on`
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::BaseLayerLoaded { .. } => EVENT_BASE_LAYER_LOADED,
            MapEvent::BaseLayerLoading { .. } => EVENT_BASE_LAYER_LOADING,
            MapEvent::LayersInvalidated => EVENT_LAYERS_INVALIDATED,
            MapEvent::ZoomChange { .. } => EVENT_ZOOM_CHANGE,
            MapEvent::MoveEnd { .. } => EVENT_MOVE_END,
        }
    }
}

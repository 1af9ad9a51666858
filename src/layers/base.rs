use crate::engine::EngineHandle;

/// An overlay drawn on top of the base layer.
///
/// The map needs very little from a layer: a stable id to remove it by, the
/// attribution text it contributes, and a slot for the engine handle of its
/// rendered representation.
pub trait MapLayer: Send + Sync {
    fn id(&self) -> &str;

    /// Comma- or pipe-separated attribution fragments, if any
    fn attribution(&self) -> Option<&str>;

    /// Handle assigned by the engine while the layer is on a map
    fn engine_handle(&self) -> Option<EngineHandle>;

    fn set_engine_handle(&mut self, handle: Option<EngineHandle>);
}

/// General purpose overlay layer
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer {
    id: String,
    attribution: Option<String>,
    handle: Option<EngineHandle>,
}

impl OverlayLayer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attribution: None,
            handle: None,
        }
    }

    pub fn with_attribution(mut self, attribution: impl Into<String>) -> Self {
        self.attribution = Some(attribution.into());
        self
    }
}

impl MapLayer for OverlayLayer {
    fn id(&self) -> &str {
        &self.id
    }

    fn attribution(&self) -> Option<&str> {
        self.attribution.as_deref()
    }

    fn engine_handle(&self) -> Option<EngineHandle> {
        self.handle
    }

    fn set_engine_handle(&mut self, handle: Option<EngineHandle>) {
        self.handle = handle;
    }
}

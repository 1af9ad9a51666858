use crate::layers::{attribution::AttributionRegistry, base::MapLayer};
use crate::{MapError, Result};

/// Ordered overlay layers plus the attribution they add up to.
///
/// Adding a layer extends the attribution incrementally. Removing one
/// recomputes it from every remaining layer, so a fragment survives exactly
/// as long as some layer still on the stack contributes it.
pub struct LayerStack {
    /// Layers in the order they were added
    layers: Vec<Box<dyn MapLayer>>,
    /// Attribution of the base layer, listed ahead of the overlays'
    base_attribution: Option<String>,
    attributions: AttributionRegistry,
}

impl LayerStack {
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            base_attribution: None,
            attributions: AttributionRegistry::new(),
        }
    }

    /// Appends a layer. Ids must be unique within the stack.
    pub fn add_layer(&mut self, layer: Box<dyn MapLayer>) -> Result<()> {
        if self.contains(layer.id()) {
            return Err(MapError::Layer(format!(
                "layer {} is already on the map",
                layer.id()
            )));
        }
        if let Some(attribution) = layer.attribution() {
            self.attributions.add(attribution);
        }
        self.layers.push(layer);
        Ok(())
    }

    /// Removes a layer by id, returning it if it was on the stack
    pub fn remove_layer(&mut self, layer_id: &str) -> Option<Box<dyn MapLayer>> {
        let idx = self.layers.iter().position(|l| l.id() == layer_id)?;
        let layer = self.layers.remove(idx);
        self.rebuild_attributions();
        Some(layer)
    }

    /// Replace the base layer's contribution to the attribution
    pub fn set_base_attribution(&mut self, attribution: Option<&str>) {
        if self.base_attribution.as_deref() == attribution {
            return;
        }
        self.base_attribution = attribution.map(str::to_string);
        self.rebuild_attributions();
    }

    fn rebuild_attributions(&mut self) {
        let base = self.base_attribution.as_deref();
        let overlays = self.layers.iter().filter_map(|l| l.attribution());
        self.attributions.rebuild(base.into_iter().chain(overlays));
    }

    /// Removes every layer, in reverse order of addition
    pub fn drain(&mut self) -> Vec<Box<dyn MapLayer>> {
        let mut layers: Vec<_> = self.layers.drain(..).collect();
        layers.reverse();
        self.base_attribution = None;
        self.attributions.clear();
        layers
    }

    pub fn contains(&self, layer_id: &str) -> bool {
        self.layers.iter().any(|l| l.id() == layer_id)
    }

    /// Gets a reference to a layer by ID
    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn MapLayer> {
        self.layers
            .iter()
            .find(|l| l.id() == layer_id)
            .map(|l| l.as_ref())
    }

    /// Lists all layer IDs in stack order
    pub fn list_layers(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id().to_string()).collect()
    }

    /// Text for the attribution region
    pub fn attribution_text(&self) -> String {
        self.attributions.render()
    }

    /// Gets the number of layers
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Checks if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

//! Ownership of the single active base (tile) layer.
//!
//! Each call to [`BaseLayerController::set_base_layer`] starts a new
//! generation. Load completions are reported by the engine through a
//! [`LoadNotifier`](super::loader::LoadNotifier) tagged with the generation it
//! was issued for, and only a completion matching the current generation can
//! move the controller to [`BaseLayerState::Loaded`]. A fast second call
//! therefore cannot be overtaken by the first one's late completion.

use super::loader::LoadQueue;
use super::source::{BaseLayerConfig, BaseLayerSource};
use crate::engine::{EngineHandle, RenderEngine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseLayerState {
    /// No base layer attached
    Empty,
    /// Checking a new configuration
    Validating,
    /// The last configuration was unusable; settles back to `Empty`
    Rejected,
    /// Attached, tiles not loaded yet
    Loading,
    Loaded,
}

/// What a call to [`BaseLayerController::set_base_layer`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseLayerUpdate {
    /// Same configuration as the active layer, nothing touched
    Unchanged,
    /// Previous layer (if any) removed, no replacement requested
    Removed,
    /// Configuration unusable, previous layer (if any) removed
    Rejected,
    /// New layer attached and loading
    Loading { generation: u64 },
}

#[derive(Debug)]
struct ActiveBaseLayer {
    generation: u64,
    handle: EngineHandle,
    config: BaseLayerConfig,
    source: BaseLayerSource,
}

pub struct BaseLayerController {
    generation: u64,
    state: BaseLayerState,
    active: Option<ActiveBaseLayer>,
    completions: LoadQueue,
}

impl BaseLayerController {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: BaseLayerState::Empty,
            active: None,
            completions: LoadQueue::new(),
        }
    }

    /// Replace the base layer.
    ///
    /// `None` removes it. An unusable configuration is logged and leaves no
    /// base layer behind; it never produces an error.
    pub fn set_base_layer(
        &mut self,
        engine: &mut dyn RenderEngine,
        config: Option<BaseLayerConfig>,
    ) -> BaseLayerUpdate {
        if let (Some(active), Some(config)) = (&self.active, &config) {
            if active.config == *config {
                return BaseLayerUpdate::Unchanged;
            }
        }

        self.generation += 1;
        self.teardown(engine);

        let Some(config) = config else {
            log::debug!("base layer removed (generation {})", self.generation);
            return BaseLayerUpdate::Removed;
        };

        self.transition(BaseLayerState::Validating);
        let source = match config.validate() {
            Ok(source) => source,
            Err(e) => {
                log::warn!("ignoring base layer configuration: {}", e);
                return self.reject();
            }
        };

        let notifier = self.completions.notifier(self.generation);
        let handle = match engine.add_base_layer(&source, notifier) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("engine refused {} base layer: {}", config.layer_type(), e);
                return self.reject();
            }
        };

        log::info!(
            "loading {} base layer (generation {})",
            config.layer_type(),
            self.generation
        );
        self.active = Some(ActiveBaseLayer {
            generation: self.generation,
            handle,
            config,
            source,
        });
        self.transition(BaseLayerState::Loading);
        BaseLayerUpdate::Loading {
            generation: self.generation,
        }
    }

    fn reject(&mut self) -> BaseLayerUpdate {
        self.transition(BaseLayerState::Rejected);
        self.transition(BaseLayerState::Empty);
        BaseLayerUpdate::Rejected
    }

    fn transition(&mut self, state: BaseLayerState) {
        log::trace!("base layer state {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Detach whatever base layer is active and return to `Empty`
    fn teardown(&mut self, engine: &mut dyn RenderEngine) {
        if let Some(active) = self.active.take() {
            engine.remove_base_layer(active.handle);
        }
        self.transition(BaseLayerState::Empty);
    }

    /// Apply load completions reported since the last call.
    ///
    /// Returns the generation that just finished loading, if the current
    /// layer did. Completions of superseded generations, and repeats for the
    /// current one, are dropped.
    pub fn process_completions(&mut self) -> Option<u64> {
        let mut loaded = None;
        let current = self.active.as_ref().map(|active| active.generation);
        for generation in self.completions.drain() {
            if current == Some(generation) && self.state == BaseLayerState::Loading {
                self.transition(BaseLayerState::Loaded);
                loaded = Some(generation);
            } else {
                log::debug!(
                    "dropping stale base layer completion (generation {}, current {})",
                    generation,
                    self.generation
                );
            }
        }
        loaded
    }

    /// Detach the active base layer, if any
    pub fn clear(&mut self, engine: &mut dyn RenderEngine) {
        self.generation += 1;
        self.teardown(engine);
    }

    /// Engine handle of the active base layer, `None` when there is none
    pub fn leaflet_base_layer(&self) -> Option<EngineHandle> {
        self.active.as_ref().map(|active| active.handle)
    }

    pub fn source(&self) -> Option<&BaseLayerSource> {
        self.active.as_ref().map(|active| &active.source)
    }

    pub fn attribution(&self) -> Option<&str> {
        self.source().and_then(BaseLayerSource::attribution)
    }

    pub fn state(&self) -> BaseLayerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Default for BaseLayerController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::headless::HeadlessEngine;
    use crate::tiles::source::{TmsOptions, WmsOptions};

    fn tms(url: &str) -> BaseLayerConfig {
        BaseLayerConfig::tms(TmsOptions {
            url: Some(url.to_string()),
            min_zoom: Some(0),
            max_zoom: Some(12),
            attribution: Some("tiles".to_string()),
            subdomains: Vec::new(),
        })
    }

    fn broken_wms() -> BaseLayerConfig {
        BaseLayerConfig::wms(WmsOptions {
            format: Some("image/png".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_load_lifecycle() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();
        assert_eq!(controller.state(), BaseLayerState::Empty);

        let update = controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        assert_eq!(update, BaseLayerUpdate::Loading { generation: 1 });
        assert_eq!(controller.state(), BaseLayerState::Loading);
        assert!(controller.leaflet_base_layer().is_some());
        assert_eq!(controller.process_completions(), None);

        engine.complete_loads();
        assert_eq!(controller.process_completions(), Some(1));
        assert_eq!(controller.state(), BaseLayerState::Loaded);
    }

    #[test]
    fn test_stale_completion_is_dropped() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        controller.set_base_layer(&mut engine, Some(tms("https://b/{z}/{x}/{y}.png")));
        assert_eq!(engine.base_layer_count(), 1);

        // Both the superseded and the current layer report in
        assert_eq!(engine.complete_loads(), 2);
        assert_eq!(controller.process_completions(), Some(2));
        assert_eq!(controller.state(), BaseLayerState::Loaded);
    }

    #[test]
    fn test_superseded_completion_alone_does_nothing() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        let first = engine.take_pending_loads();
        controller.set_base_layer(&mut engine, Some(tms("https://b/{z}/{x}/{y}.png")));

        for notifier in first {
            notifier.loaded();
        }
        assert_eq!(controller.process_completions(), None);
        assert_eq!(controller.state(), BaseLayerState::Loading);
    }

    #[test]
    fn test_repeat_completion_fires_once() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        let pending = engine.take_pending_loads();
        for notifier in pending.iter().chain(pending.iter()) {
            notifier.loaded();
        }

        assert_eq!(controller.process_completions(), Some(1));
        assert_eq!(controller.process_completions(), None);
    }

    #[test]
    fn test_invalid_config_clears_previous_layer() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        let update = controller.set_base_layer(&mut engine, Some(broken_wms()));

        assert_eq!(update, BaseLayerUpdate::Rejected);
        assert_eq!(controller.state(), BaseLayerState::Empty);
        assert_eq!(controller.leaflet_base_layer(), None);
        assert_eq!(engine.base_layer_count(), 0);

        engine.complete_loads();
        assert_eq!(controller.process_completions(), None);
    }

    #[test]
    fn test_same_config_is_noop() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        let handle = controller.leaflet_base_layer();

        let update = controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        assert_eq!(update, BaseLayerUpdate::Unchanged);
        assert_eq!(controller.leaflet_base_layer(), handle);
        assert_eq!(controller.generation(), 1);
        assert_eq!(engine.pending_loads(), 1);
    }

    #[test]
    fn test_remove_base_layer() {
        let mut engine = HeadlessEngine::new();
        let mut controller = BaseLayerController::new();

        controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        assert_eq!(controller.attribution(), Some("tiles"));

        assert_eq!(controller.set_base_layer(&mut engine, None), BaseLayerUpdate::Removed);
        assert_eq!(controller.leaflet_base_layer(), None);
        assert_eq!(controller.attribution(), None);
        assert_eq!(engine.base_layer_count(), 0);
    }

    #[test]
    fn test_engine_failure_is_rejection() {
        let mut engine = HeadlessEngine::new();
        engine.fail_base_layers(true);
        let mut controller = BaseLayerController::new();

        let update = controller.set_base_layer(&mut engine, Some(tms("https://a/{z}/{x}/{y}.png")));
        assert_eq!(update, BaseLayerUpdate::Rejected);
        assert_eq!(controller.leaflet_base_layer(), None);
    }
}

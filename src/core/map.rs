use crate::{
    core::{
        config::KibanaMapOptions,
        geo::{GeoBounds, LatLng, Point},
        viewport::ViewportState,
    },
    engine::{headless::HeadlessEngine, EngineHandle, MountPoint, RenderEngine},
    events::{EventManager, MapEvent},
    layers::{base::MapLayer, manager::LayerStack},
    tiles::{
        controller::{BaseLayerController, BaseLayerState, BaseLayerUpdate},
        source::BaseLayerConfig,
    },
    MapError, Result,
};

/// Map widget: viewport, overlay layers with their attributions, and one
/// switchable base layer, kept consistent on top of an external rendering
/// engine.
///
/// The map owns its mount point and engine until [`KibanaMap::destroy`] runs,
/// explicitly or on drop.
pub struct KibanaMap {
    mount: MountPoint,
    engine: Box<dyn RenderEngine>,
    viewport: ViewportState,
    layers: LayerStack,
    base_layer: BaseLayerController,
    event_manager: EventManager,
    options: KibanaMapOptions,
    destroyed: bool,
}

impl KibanaMap {
    /// Mount a new map into `mount`, rendering through `engine`.
    pub fn new(
        mount: MountPoint,
        mut engine: Box<dyn RenderEngine>,
        options: KibanaMapOptions,
    ) -> Result<Self> {
        mount.attach()?;
        if let Err(e) = engine.mount(&mount) {
            mount.detach();
            return Err(e);
        }

        let viewport = ViewportState::initialize(
            options.initial_center(),
            options.initial_zoom(),
            options.min_zoom,
            options.max_zoom,
            mount.size(),
            engine.projection(),
        );
        engine.set_view(viewport.center(), viewport.zoom_level());

        let layers = LayerStack::new();
        mount.set_attribution_text(&layers.attribution_text());

        log::debug!("map mounted: {:?}", viewport);
        Ok(Self {
            mount,
            engine,
            viewport,
            layers,
            base_layer: BaseLayerController::new(),
            event_manager: EventManager::new(),
            options,
            destroyed: false,
        })
    }

    /// Mount a new map backed by a [`HeadlessEngine`]
    pub fn headless(mount: MountPoint, options: KibanaMapOptions) -> Result<Self> {
        Self::new(mount, Box::new(HeadlessEngine::new()), options)
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            return Err(MapError::Destroyed);
        }
        Ok(())
    }

    fn redraw(&mut self) {
        self.engine
            .set_view(self.viewport.center(), self.viewport.zoom_level());
    }

    fn render_attribution(&self) {
        self.mount
            .set_attribution_text(&self.layers.attribution_text());
    }

    pub fn bounds(&self) -> GeoBounds {
        self.viewport.bounds()
    }

    pub fn center(&self) -> LatLng {
        self.viewport.center()
    }

    pub fn zoom_level(&self) -> u8 {
        self.viewport.zoom_level()
    }

    pub fn min_zoom(&self) -> u8 {
        self.viewport.min_zoom()
    }

    pub fn max_zoom(&self) -> u8 {
        self.viewport.max_zoom()
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.viewport.meters_per_pixel()
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn options(&self) -> &KibanaMapOptions {
        &self.options
    }

    /// Zoom around the unchanged center. Fractional levels round half away
    /// from zero; out-of-range levels are clamped.
    pub fn set_zoom_level(&mut self, zoom: f64) {
        if self.destroyed {
            return;
        }
        let changed = self.viewport.set_zoom_level(zoom);
        self.redraw();
        if changed {
            self.event_manager.emit(MapEvent::ZoomChange {
                zoom: self.viewport.zoom_level(),
            });
        }
    }

    pub fn set_center(&mut self, center: LatLng) {
        if self.destroyed {
            return;
        }
        if self.viewport.set_center(center) {
            self.redraw();
            self.event_manager.emit(MapEvent::MoveEnd {
                center: self.viewport.center(),
            });
        }
    }

    pub fn set_min_zoom(&mut self, min_zoom: u8) {
        if self.destroyed {
            return;
        }
        if self.viewport.set_min_zoom(min_zoom) {
            self.redraw();
            self.event_manager.emit(MapEvent::ZoomChange {
                zoom: self.viewport.zoom_level(),
            });
        }
    }

    pub fn set_max_zoom(&mut self, max_zoom: u8) {
        if self.destroyed {
            return;
        }
        if self.viewport.set_max_zoom(max_zoom) {
            self.redraw();
            self.event_manager.emit(MapEvent::ZoomChange {
                zoom: self.viewport.zoom_level(),
            });
        }
    }

    /// Pick up a change of the mount point's size. Must be called whenever
    /// the container is resized.
    pub fn resize(&mut self) {
        if self.destroyed {
            return;
        }
        let size: Point = self.mount.size();
        self.viewport.resize(size);
        self.engine.invalidate_size(size);
        self.redraw();
    }

    /// Put an overlay layer on the map
    pub fn add_layer(&mut self, mut layer: Box<dyn MapLayer>) -> Result<()> {
        self.ensure_alive()?;
        if self.layers.contains(layer.id()) {
            return Err(MapError::Layer(format!(
                "layer {} is already on the map",
                layer.id()
            )));
        }

        let handle = self.engine.add_overlay(layer.as_ref())?;
        layer.set_engine_handle(Some(handle));
        if let Err(e) = self.layers.add_layer(layer) {
            self.engine.remove_overlay(handle);
            return Err(e);
        }

        self.render_attribution();
        self.event_manager.emit(MapEvent::LayersInvalidated);
        Ok(())
    }

    /// Take an overlay layer off the map, handing it back to the caller
    pub fn remove_layer(&mut self, layer_id: &str) -> Result<Option<Box<dyn MapLayer>>> {
        self.ensure_alive()?;
        let Some(mut layer) = self.layers.remove_layer(layer_id) else {
            return Ok(None);
        };

        if let Some(handle) = layer.engine_handle() {
            self.engine.remove_overlay(handle);
        }
        layer.set_engine_handle(None);

        self.render_attribution();
        self.event_manager.emit(MapEvent::LayersInvalidated);
        Ok(Some(layer))
    }

    pub fn list_layers(&self) -> Vec<String> {
        self.layers.list_layers()
    }

    pub fn get_layer(&self, layer_id: &str) -> Option<&dyn MapLayer> {
        self.layers.get_layer(layer_id)
    }

    /// Text currently rendered in the attribution region
    pub fn attribution_text(&self) -> String {
        self.layers.attribution_text()
    }

    /// Replace the base layer; `None` removes it.
    ///
    /// Returns as soon as the layer is attached. `baseLayer:loaded` follows
    /// once the engine reports its tiles and [`KibanaMap::process_events`]
    /// runs. Unusable configurations leave the map without a base layer.
    pub fn set_base_layer(&mut self, config: Option<BaseLayerConfig>) {
        if self.destroyed {
            return;
        }
        match self.base_layer.set_base_layer(self.engine.as_mut(), config) {
            BaseLayerUpdate::Unchanged => return,
            BaseLayerUpdate::Loading { generation } => {
                self.event_manager
                    .emit(MapEvent::BaseLayerLoading { generation });
            }
            BaseLayerUpdate::Removed | BaseLayerUpdate::Rejected => {}
        }

        self.layers
            .set_base_attribution(self.base_layer.attribution());
        self.render_attribution();
    }

    /// Engine handle of the active base layer, `None` when there is none
    pub fn leaflet_base_layer(&self) -> Option<EngineHandle> {
        self.base_layer.leaflet_base_layer()
    }

    pub fn base_layer_state(&self) -> BaseLayerState {
        self.base_layer.state()
    }

    /// Subscribe to a map event, e.g. `"baseLayer:loaded"`
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.event_manager.on(event_type, callback);
    }

    /// Apply engine completions and dispatch queued events to subscribers.
    /// Returns the dispatched events.
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        if self.destroyed {
            return Vec::new();
        }
        if let Some(generation) = self.base_layer.process_completions() {
            log::info!("base layer loaded (generation {})", generation);
            self.event_manager
                .emit(MapEvent::BaseLayerLoaded { generation });
        }
        self.event_manager.process_events()
    }

    /// Release the base layer, every overlay, the engine bindings and the
    /// mount point. Runs at most once; also runs on drop.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;

        self.base_layer.clear(self.engine.as_mut());
        for layer in self.layers.drain() {
            if let Some(handle) = layer.engine_handle() {
                self.engine.remove_overlay(handle);
            }
        }
        self.engine.unmount();
        self.mount.detach();
        self.event_manager.clear();
        log::debug!("map destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Drop for KibanaMap {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::base::OverlayLayer;
    use crate::tiles::source::TmsOptions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn map_with_engine() -> (KibanaMap, HeadlessEngine, MountPoint) {
        let mount = MountPoint::new(512.0, 512.0);
        let engine = HeadlessEngine::new();
        let map = KibanaMap::new(
            mount.clone(),
            Box::new(engine.clone()),
            KibanaMapOptions::new(1, 10, [0.0, 0.0], 0.0),
        )
        .unwrap();
        (map, engine, mount)
    }

    fn count(map: &mut KibanaMap, event_type: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        map.on(event_type, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    fn tms() -> BaseLayerConfig {
        BaseLayerConfig::tms(TmsOptions {
            url: Some("https://tiles.example.com/{z}/{x}/{y}.png".to_string()),
            attribution: Some("Example Tiles".to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn test_construction_mounts_engine() {
        let (map, engine, mount) = map_with_engine();

        assert!(engine.is_mounted());
        assert!(mount.is_attached());
        assert_eq!(engine.view(), Some((LatLng::new(0.0, 0.0), 2)));
        assert_eq!(map.zoom_level(), 2);
        assert_eq!(map.min_zoom(), 1);
        assert_eq!(map.max_zoom(), 10);
    }

    #[test]
    fn test_zoom_events() {
        let (mut map, engine, _mount) = map_with_engine();
        let zooms = count(&mut map, "zoomchange");

        map.set_zoom_level(2.0);
        map.set_zoom_level(4.0);
        map.set_zoom_level(4.2);
        map.process_events();

        assert_eq!(zooms.load(Ordering::SeqCst), 1);
        assert_eq!(engine.view(), Some((LatLng::new(0.0, 0.0), 4)));
    }

    #[test]
    fn test_zoom_limits_follow_options() {
        let (mut map, _engine, _mount) = map_with_engine();

        map.set_max_zoom(1);
        assert_eq!(map.zoom_level(), 1);
        assert_eq!(
            map.process_events(),
            vec![MapEvent::ZoomChange { zoom: 1 }]
        );
    }

    #[test]
    fn test_set_center_emits_moveend() {
        let (mut map, _engine, _mount) = map_with_engine();

        map.set_center(LatLng::new(10.0, 20.0));
        map.set_center(LatLng::new(10.0, 20.0));

        let events = map.process_events();
        assert_eq!(
            events,
            vec![MapEvent::MoveEnd {
                center: LatLng::new(10.0, 20.0)
            }]
        );
    }

    #[test]
    fn test_add_layer_updates_mount_and_engine() {
        let (mut map, engine, mount) = map_with_engine();

        map.add_layer(Box::new(OverlayLayer::new("a").with_attribution("foo|bar")))
            .unwrap();
        assert_eq!(mount.attribution_text(), "foo, bar");
        assert_eq!(engine.overlay_ids(), vec!["a"]);
        assert!(map.get_layer("a").and_then(|l| l.engine_handle()).is_some());

        let removed = map.remove_layer("a").unwrap().unwrap();
        assert_eq!(removed.engine_handle(), None);
        assert_eq!(mount.attribution_text(), "");
        assert_eq!(engine.overlay_count(), 0);
        assert!(map.remove_layer("a").unwrap().is_none());

        assert_eq!(
            map.process_events(),
            vec![MapEvent::LayersInvalidated, MapEvent::LayersInvalidated]
        );
    }

    #[test]
    fn test_duplicate_layer_rejected_before_engine() {
        let (mut map, engine, _mount) = map_with_engine();
        map.add_layer(Box::new(OverlayLayer::new("a"))).unwrap();

        assert!(map.add_layer(Box::new(OverlayLayer::new("a"))).is_err());
        assert_eq!(engine.overlay_count(), 1);
    }

    #[test]
    fn test_base_layer_attribution_rendered() {
        let (mut map, _engine, mount) = map_with_engine();
        map.add_layer(Box::new(OverlayLayer::new("a").with_attribution("foo")))
            .unwrap();

        map.set_base_layer(Some(tms()));
        assert_eq!(mount.attribution_text(), "Example Tiles, foo");

        map.set_base_layer(None);
        assert_eq!(mount.attribution_text(), "foo");
        assert_eq!(map.leaflet_base_layer(), None);
    }

    #[test]
    fn test_base_layer_events() {
        let (mut map, engine, _mount) = map_with_engine();
        let loading = count(&mut map, "baseLayer:loading");
        let loaded = count(&mut map, "baseLayer:loaded");

        map.set_base_layer(Some(tms()));
        map.set_base_layer(Some(tms()));
        map.process_events();
        assert_eq!(loading.load(Ordering::SeqCst), 1);
        assert_eq!(loaded.load(Ordering::SeqCst), 0);
        assert_eq!(map.base_layer_state(), BaseLayerState::Loading);

        engine.complete_loads();
        map.process_events();
        assert_eq!(loaded.load(Ordering::SeqCst), 1);
        assert_eq!(map.base_layer_state(), BaseLayerState::Loaded);
    }

    #[test]
    fn test_destroy_releases_everything() {
        let (mut map, engine, mount) = map_with_engine();
        map.add_layer(Box::new(OverlayLayer::new("a").with_attribution("foo")))
            .unwrap();
        map.set_base_layer(Some(tms()));

        map.destroy();
        assert!(map.is_destroyed());
        assert!(!engine.is_mounted());
        assert_eq!(engine.overlay_count(), 0);
        assert_eq!(engine.base_layer_count(), 0);
        assert!(!mount.is_attached());
        assert_eq!(mount.attribution_text(), "");
        assert_eq!(map.leaflet_base_layer(), None);
        assert!(map.list_layers().is_empty());
    }

    #[test]
    fn test_destroyed_map_rejects_mutation() {
        let (mut map, engine, _mount) = map_with_engine();
        map.destroy();

        let err = map.add_layer(Box::new(OverlayLayer::new("a"))).unwrap_err();
        assert!(matches!(err, MapError::Destroyed));
        assert!(matches!(map.remove_layer("a"), Err(MapError::Destroyed)));

        map.set_base_layer(Some(tms()));
        assert_eq!(engine.base_layer_count(), 0);
        assert!(map.process_events().is_empty());
    }

    #[test]
    fn test_drop_unmounts() {
        let (map, engine, mount) = map_with_engine();
        drop(map);

        assert!(!engine.is_mounted());
        assert!(!mount.is_attached());
    }

    #[test]
    fn test_mount_point_hosts_one_map() {
        let mount = MountPoint::new(256.0, 256.0);
        let mut first = KibanaMap::headless(mount.clone(), KibanaMapOptions::default()).unwrap();
        first
            .add_layer(Box::new(OverlayLayer::new("a").with_attribution("foo")))
            .unwrap();

        let second_engine = HeadlessEngine::new();
        let second = KibanaMap::new(
            mount.clone(),
            Box::new(second_engine.clone()),
            KibanaMapOptions::default(),
        );
        assert!(matches!(second, Err(MapError::Engine(_))));
        assert!(!second_engine.is_mounted());
        assert!(mount.is_attached());
        assert_eq!(mount.attribution_text(), "foo");

        first.destroy();
        assert!(KibanaMap::headless(mount, KibanaMapOptions::default()).is_ok());
    }

    #[test]
    fn test_engine_mount_failure_releases_mount_point() {
        let engine = HeadlessEngine::new();
        let _first = KibanaMap::new(
            MountPoint::new(256.0, 256.0),
            Box::new(engine.clone()),
            KibanaMapOptions::default(),
        )
        .unwrap();

        let mount = MountPoint::new(256.0, 256.0);
        let second = KibanaMap::new(mount.clone(), Box::new(engine), KibanaMapOptions::default());
        assert!(matches!(second, Err(MapError::Engine(_))));
        assert!(!mount.is_attached());
    }
}

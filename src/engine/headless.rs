//! In-memory rendering engine.
//!
//! Draws nothing; it records what the map asks of it and lets the caller
//! decide when base layer tiles "finish loading". Useful for server-side
//! processing, tests and CLI tools.

use super::{EngineHandle, MountPoint, RenderEngine};
use crate::core::geo::{LatLng, Point};
use crate::core::projection::{Projection, WebMercator};
use crate::layers::base::MapLayer;
use crate::tiles::{loader::LoadNotifier, source::BaseLayerSource};
use crate::{MapError, Result};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(feature = "tokio-runtime")]
use std::time::Duration;

/// When base layer loads complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMode {
    /// Only when [`HeadlessEngine::complete_loads`] is called
    #[default]
    Manual,
    /// As soon as the layer is attached
    Immediate,
    /// After a delay, on the ambient tokio runtime
    #[cfg(feature = "tokio-runtime")]
    Delayed(Duration),
}

#[derive(Default)]
struct HeadlessState {
    mount: Option<MountPoint>,
    view: Option<(LatLng, u8)>,
    size: Point,
    redraws: usize,
    overlays: Vec<(EngineHandle, String)>,
    base_layers: Vec<(EngineHandle, BaseLayerSource)>,
    pending: Vec<LoadNotifier>,
    next_handle: u64,
    load_mode: LoadMode,
    fail_base_layers: bool,
}

impl HeadlessState {
    fn next_handle(&mut self) -> EngineHandle {
        self.next_handle += 1;
        EngineHandle(self.next_handle)
    }
}

/// Cloning yields another handle to the same engine, so a test can keep one
/// while the map owns the other.
#[derive(Clone, Default)]
pub struct HeadlessEngine {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_load_mode(load_mode: LoadMode) -> Self {
        let engine = Self::new();
        engine.lock().load_mode = load_mode;
        engine
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Report every outstanding base layer load as complete, including loads
    /// of layers that were removed in the meantime. Returns how many fired.
    pub fn complete_loads(&self) -> usize {
        let pending = self.take_pending_loads();
        for notifier in &pending {
            notifier.loaded();
        }
        pending.len()
    }

    /// Hand the outstanding load notifiers to the caller without firing them
    pub fn take_pending_loads(&self) -> Vec<LoadNotifier> {
        std::mem::take(&mut self.lock().pending)
    }

    pub fn pending_loads(&self) -> usize {
        self.lock().pending.len()
    }

    /// Make subsequent `add_base_layer` calls fail
    pub fn fail_base_layers(&self, fail: bool) {
        self.lock().fail_base_layers = fail;
    }

    pub fn base_layer_count(&self) -> usize {
        self.lock().base_layers.len()
    }

    /// Source of the most recently attached base layer still on the map
    pub fn current_base_layer(&self) -> Option<BaseLayerSource> {
        self.lock()
            .base_layers
            .last()
            .map(|(_, source)| source.clone())
    }

    pub fn overlay_count(&self) -> usize {
        self.lock().overlays.len()
    }

    /// Ids of the overlays on the map, in the order they were added
    pub fn overlay_ids(&self) -> Vec<String> {
        self.lock()
            .overlays
            .iter()
            .map(|(_, id)| id.clone())
            .collect()
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().mount.is_some()
    }

    /// Last view the map asked for
    pub fn view(&self) -> Option<(LatLng, u8)> {
        self.lock().view
    }

    pub fn size(&self) -> Point {
        self.lock().size
    }

    pub fn redraw_count(&self) -> usize {
        self.lock().redraws
    }
}

impl RenderEngine for HeadlessEngine {
    fn projection(&self) -> Arc<dyn Projection> {
        Arc::new(WebMercator)
    }

    fn mount(&mut self, mount: &MountPoint) -> Result<()> {
        let mut state = self.lock();
        if state.mount.is_some() {
            return Err(MapError::Engine("engine is already mounted".to_string()));
        }
        state.size = mount.size();
        state.mount = Some(mount.clone());
        Ok(())
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        let mut state = self.lock();
        state.view = Some((center, zoom));
        state.redraws += 1;
    }

    fn invalidate_size(&mut self, size: Point) {
        self.lock().size = size;
    }

    fn add_overlay(&mut self, layer: &dyn MapLayer) -> Result<EngineHandle> {
        let mut state = self.lock();
        let handle = state.next_handle();
        state.overlays.push((handle, layer.id().to_string()));
        log::debug!("headless engine: overlay {} -> {}", layer.id(), handle);
        Ok(handle)
    }

    fn remove_overlay(&mut self, handle: EngineHandle) {
        self.lock().overlays.retain(|(h, _)| *h != handle);
    }

    fn add_base_layer(
        &mut self,
        source: &BaseLayerSource,
        notifier: LoadNotifier,
    ) -> Result<EngineHandle> {
        let mut state = self.lock();
        if state.fail_base_layers {
            return Err(MapError::Engine("base layers disabled".to_string()));
        }
        let handle = state.next_handle();
        state.base_layers.push((handle, source.clone()));
        log::debug!(
            "headless engine: base layer {} (generation {})",
            handle,
            notifier.generation()
        );

        match state.load_mode {
            LoadMode::Manual => state.pending.push(notifier),
            LoadMode::Immediate => notifier.loaded(),
            #[cfg(feature = "tokio-runtime")]
            LoadMode::Delayed(delay) => spawn_delayed(notifier, delay),
        }
        Ok(handle)
    }

    fn remove_base_layer(&mut self, handle: EngineHandle) {
        self.lock().base_layers.retain(|(h, _)| *h != handle);
    }

    fn unmount(&mut self) {
        let mut state = self.lock();
        state.mount = None;
        state.overlays.clear();
        state.base_layers.clear();
        state.pending.clear();
    }
}

#[cfg(feature = "tokio-runtime")]
fn spawn_delayed(notifier: LoadNotifier, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                notifier.loaded();
            });
        }
        Err(_) => {
            log::debug!("no tokio runtime, completing load on a thread");
            std::thread::spawn(move || {
                std::thread::sleep(delay);
                notifier.loaded();
            });
        }
    }
}

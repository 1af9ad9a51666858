//! Seam between the widget's bookkeeping and the external rendering engine.
//!
//! The engine fetches and draws tiles, owns the projection, and reports base
//! layer load completion asynchronously. The widget only ever talks to it
//! through [`RenderEngine`].

pub mod headless;

use crate::core::geo::{LatLng, Point};
use crate::core::projection::Projection;
use crate::layers::base::MapLayer;
use crate::tiles::{loader::LoadNotifier, source::BaseLayerSource};
use crate::{MapError, Result};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Opaque reference to something the engine renders (a base layer or an overlay)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineHandle(pub u64);

impl std::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "engine-layer-{}", self.0)
    }
}

/// The external mapping engine a [`crate::KibanaMap`] delegates rendering to
pub trait RenderEngine: Send {
    /// Projection the engine draws with; bounds are derived through it
    fn projection(&self) -> Arc<dyn Projection>;

    /// Take over the mount point. Called once, at map construction.
    fn mount(&mut self, mount: &MountPoint) -> Result<()>;

    /// Redraw around `center` at `zoom`
    fn set_view(&mut self, center: LatLng, zoom: u8);

    /// The mount point changed size
    fn invalidate_size(&mut self, size: Point);

    fn add_overlay(&mut self, layer: &dyn MapLayer) -> Result<EngineHandle>;

    fn remove_overlay(&mut self, handle: EngineHandle);

    /// Start drawing a base layer. Must return without waiting for tiles;
    /// completion is reported through `notifier`.
    fn add_base_layer(
        &mut self,
        source: &BaseLayerSource,
        notifier: LoadNotifier,
    ) -> Result<EngineHandle>;

    fn remove_base_layer(&mut self, handle: EngineHandle);

    /// Release the mount point and every engine-side binding
    fn unmount(&mut self);
}

#[derive(Debug, Default)]
struct MountState {
    size: Point,
    attribution: String,
    attached: bool,
}

/// The rectangular region a map controls for its lifetime.
///
/// Cloning yields another handle to the same region, so the embedding
/// application can resize it and read the rendered attribution while the map
/// owns it.
#[derive(Debug, Clone, Default)]
pub struct MountPoint {
    state: Arc<RwLock<MountState>>,
}

impl MountPoint {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: Arc::new(RwLock::new(MountState {
                size: Point::new(width, height),
                ..Default::default()
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MountState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, MountState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Current pixel dimensions
    pub fn size(&self) -> Point {
        self.read().size
    }

    /// Change the pixel dimensions. The owning map picks the change up on its
    /// next `resize()`.
    pub fn set_size(&self, width: f64, height: f64) {
        self.write().size = Point::new(width, height);
    }

    /// Text currently shown in the attribution region
    pub fn attribution_text(&self) -> String {
        self.read().attribution.clone()
    }

    pub(crate) fn set_attribution_text(&self, text: &str) {
        self.write().attribution = text.to_string();
    }

    pub fn is_attached(&self) -> bool {
        self.read().attached
    }

    /// Claim the region for a map. A region hosts at most one map at a time.
    pub(crate) fn attach(&self) -> Result<()> {
        let mut state = self.write();
        if state.attached {
            return Err(MapError::Engine("mount point already in use".to_string()));
        }
        state.attached = true;
        Ok(())
    }

    /// Clear everything the map put into the region
    pub(crate) fn detach(&self) {
        let mut state = self.write();
        state.attached = false;
        state.attribution.clear();
    }
}

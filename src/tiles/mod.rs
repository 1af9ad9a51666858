pub mod controller;
pub mod loader;
pub mod source;

// Re-exports for convenience
pub use controller::{BaseLayerController, BaseLayerState, BaseLayerUpdate};
pub use loader::{LoadNotifier, LoadQueue};
pub use source::{BaseLayerConfig, BaseLayerSource, TmsOptions, WmsOptions};

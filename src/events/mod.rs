pub mod manager;
pub mod types;

// Re-export the essential types
pub use manager::{EventCallback, EventManager};
pub use types::MapEvent;

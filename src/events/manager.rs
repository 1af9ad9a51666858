use super::types::MapEvent;
use crate::prelude::{HashMap, VecDeque};

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Publish/subscribe channel owned by a single map.
///
/// Events are queued by `emit` and handed to listeners, in emission order,
/// when `process_events` runs.
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event name
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_type: &str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_type.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Drop every listener registered for `event_type`
    pub fn off(&mut self, event_type: &str) {
        self.listeners.remove(event_type);
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: MapEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.name()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Drop queued events and every listener
    pub fn clear(&mut self) {
        self.event_queue.clear();
        self.listeners.clear();
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners.get(event_type).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter(manager: &mut EventManager, event_type: &str) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        manager.on(event_type, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_dispatch_by_name() {
        let mut manager = EventManager::new();
        let loaded = counter(&mut manager, "baseLayer:loaded");
        let zoom = counter(&mut manager, "zoomchange");

        manager.emit(MapEvent::BaseLayerLoaded { generation: 1 });
        assert_eq!(loaded.load(Ordering::SeqCst), 0);
        assert_eq!(manager.pending_events(), 1);

        let events = manager.process_events();
        assert_eq!(events, vec![MapEvent::BaseLayerLoaded { generation: 1 }]);
        assert_eq!(loaded.load(Ordering::SeqCst), 1);
        assert_eq!(zoom.load(Ordering::SeqCst), 0);
        assert_eq!(manager.pending_events(), 0);
    }

    #[test]
    fn test_multiple_listeners() {
        let mut manager = EventManager::new();
        let first = counter(&mut manager, "layers:invalidated");
        let second = counter(&mut manager, "layers:invalidated");
        assert_eq!(manager.listener_count("layers:invalidated"), 2);

        manager.emit(MapEvent::LayersInvalidated);
        manager.emit(MapEvent::LayersInvalidated);
        manager.process_events();

        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_off_and_clear() {
        let mut manager = EventManager::new();
        let zoom = counter(&mut manager, "zoomchange");

        manager.off("zoomchange");
        manager.emit(MapEvent::ZoomChange { zoom: 4 });
        manager.process_events();
        assert_eq!(zoom.load(Ordering::SeqCst), 0);

        counter(&mut manager, "zoomchange");
        manager.emit(MapEvent::ZoomChange { zoom: 5 });
        manager.clear();
        assert_eq!(manager.pending_events(), 0);
        assert_eq!(manager.listener_count("zoomchange"), 0);
    }
}

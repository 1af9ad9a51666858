use crossbeam_channel::{unbounded, Receiver, Sender};

/// Handed to the rendering engine together with a new base layer. The engine
/// calls [`LoadNotifier::loaded`] once the layer's visible tiles have loaded,
/// from whatever thread or task finished the work.
///
/// The notifier only carries the generation it was issued for; whether the
/// completion still matters is decided later by the controller that drains
/// the [`LoadQueue`].
#[derive(Debug, Clone)]
pub struct LoadNotifier {
    generation: u64,
    tx: Sender<u64>,
}

impl LoadNotifier {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Report that the tiles of this generation's base layer have loaded.
    pub fn loaded(&self) {
        // The receiving map may already be gone
        if self.tx.send(self.generation).is_err() {
            log::debug!(
                "dropping load completion for generation {}, receiver closed",
                self.generation
            );
        }
    }
}

/// Completion channel between the rendering engine and the base layer
/// controller.
pub struct LoadQueue {
    tx: Sender<u64>,
    rx: Receiver<u64>,
}

impl LoadQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Issue a notifier for the given generation
    pub fn notifier(&self, generation: u64) -> LoadNotifier {
        LoadNotifier {
            generation,
            tx: self.tx.clone(),
        }
    }

    /// Drain every completion reported so far, in arrival order
    pub fn drain(&self) -> Vec<u64> {
        self.rx.try_iter().collect()
    }
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

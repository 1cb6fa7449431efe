//! Index change notification.
//!
//! Components that cache an index reader register here so they can drop it when the
//! index changes underneath them.

use std::sync::Arc;

use tracing::debug;

/// Receives notifications about index changes.
pub trait IndexChangeListener: Send + Sync {
    /// The index content changed; readers should be reopened.
    fn on_index_update(&self);

    /// The index was deleted or replaced; cached readers must be dropped entirely.
    fn on_index_reset(&self);
}

/// A set of listeners. Notifying an empty set does nothing.
#[derive(Clone, Default)]
pub struct Listeners {
    /// Registered listeners, notified in registration order.
    listeners: Vec<Arc<dyn IndexChangeListener>>,
}

impl Listeners {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn add(&mut self, listener: Arc<dyn IndexChangeListener>) {
        self.listeners.push(listener);
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Notifies every listener of an update.
    pub fn notify_update(&self) {
        debug!(listeners = self.listeners.len(), "index updated");
        for listener in &self.listeners {
            listener.on_index_update();
        }
    }

    /// Notifies every listener of a reset.
    pub fn notify_reset(&self) {
        debug!(listeners = self.listeners.len(), "index reset");
        for listener in &self.listeners {
            listener.on_index_reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    struct Counter {
        updates: AtomicUsize,
        resets: AtomicUsize,
    }

    impl IndexChangeListener for Counter {
        fn on_index_update(&self) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }

        fn on_index_reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn empty_set_is_harmless() {
        let listeners = Listeners::new();
        assert!(listeners.is_empty());
        listeners.notify_update();
        listeners.notify_reset();
    }

    #[test]
    fn all_listeners_are_notified() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let mut listeners = Listeners::new();
        listeners.add(a.clone());
        listeners.add(b.clone());

        listeners.notify_update();
        listeners.notify_reset();
        listeners.notify_reset();

        assert_eq!(listeners.len(), 2);
        for counter in [a, b] {
            assert_eq!(counter.updates.load(Ordering::SeqCst), 1);
            assert_eq!(counter.resets.load(Ordering::SeqCst), 2);
        }
    }
}

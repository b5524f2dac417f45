//! Bus - Typed Observer Registry
//!
//! Publish/subscribe for phase engine notifications. No string event names:
//! observers implement [`PhaseObserver`] and receive exactly the typed calls
//! it declares.
//!
//! Subscribing returns a [`Subscription`] handle; dropping it (or calling
//! [`Subscription::unsubscribe`]) removes the observer.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use wayphase_core::event::PhaseObserver;
use wayphase_core::outcome::{TransitionProgress, TransitionResult};
use wayphase_core::phase::NavigationPhase;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, Arc<dyn PhaseObserver>)>,
}

/// Fan-out of engine notifications to subscribed observers.
#[derive(Clone, Default)]
pub struct ObserverBus {
    registry: Arc<Mutex<Registry>>,
}

impl ObserverBus {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "dropping the Subscription unsubscribes the observer"]
    pub fn subscribe(&self, observer: Arc<dyn PhaseObserver>) -> Subscription {
        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.observers.push((id, observer));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn len(&self) -> usize {
        self.registry.lock().observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every observer. Outstanding handles become inert.
    pub fn clear(&self) {
        self.registry.lock().observers.clear();
    }

    // Observers are called outside the lock so they may subscribe/unsubscribe.
    fn observers(&self) -> Vec<Arc<dyn PhaseObserver>> {
        self.registry
            .lock()
            .observers
            .iter()
            .map(|(_, o)| o.clone())
            .collect()
    }

    pub fn phase_changed(&self, from: NavigationPhase, to: NavigationPhase) {
        for observer in self.observers() {
            observer.on_phase_change(from, to);
        }
    }

    pub fn transition_started(&self, from: NavigationPhase, to: NavigationPhase) {
        for observer in self.observers() {
            observer.on_transition_start(from, to);
        }
    }

    pub fn transition_progressed(&self, progress: TransitionProgress) {
        for observer in self.observers() {
            observer.on_transition_progress(progress);
        }
    }

    pub fn transition_completed(&self, result: &TransitionResult) {
        for observer in self.observers() {
            observer.on_transition_complete(result);
        }
    }

    pub fn transition_failed(&self, message: &str, result: &TransitionResult) {
        for observer in self.observers() {
            observer.on_transition_error(message, result);
        }
    }
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("observer_count", &self.len())
            .finish()
    }
}

/// Handle to one subscription.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }

    /// Whether the observer is still registered.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.lock().observers.iter().any(|(id, _)| *id == self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.lock().observers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayphase_test::{ObservedEvent, RecordingObserver};

    #[test]
    fn test_subscribe_and_publish() {
        let bus = ObserverBus::new();
        let observer = Arc::new(RecordingObserver::new());
        let _sub = bus.subscribe(observer.clone());

        bus.phase_changed(NavigationPhase::ToPickup, NavigationPhase::AtPickup);
        assert_eq!(
            observer.events(),
            vec![ObservedEvent::PhaseChange(
                NavigationPhase::ToPickup,
                NavigationPhase::AtPickup
            )]
        );
    }

    #[test]
    fn test_dropping_handle_unsubscribes() {
        let bus = ObserverBus::new();
        let observer = Arc::new(RecordingObserver::new());
        let sub = bus.subscribe(observer.clone());
        assert!(sub.is_active());
        assert_eq!(bus.len(), 1);

        sub.unsubscribe();
        assert!(bus.is_empty());

        bus.phase_changed(NavigationPhase::ToPickup, NavigationPhase::AtPickup);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_clear_makes_handles_inert() {
        let bus = ObserverBus::new();
        let sub = bus.subscribe(Arc::new(RecordingObserver::new()));
        bus.clear();
        assert!(!sub.is_active());
        drop(sub);
        assert!(bus.is_empty());
    }
}

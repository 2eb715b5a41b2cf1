//! Observer / Observable pattern.
//!
//! * An **Observable** notifies its registered **Observer**s whenever it
//!   changes state.
//! * Observers react in `update()`, typically by marking a cache dirty.
//!
//! Observers are held through `Weak` links, so an observable never keeps a
//! dependent object alive and dropped observers are pruned on the next
//! notification. The observer list sits behind a `Mutex` so observables can
//! be shared across threads.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// An object that can notify interested parties when it changes.
pub trait Observable {
    /// Register an observer to receive future change notifications.
    fn register_observer(&self, observer: Weak<dyn Observer>);

    /// Remove a previously registered observer.
    fn unregister_observer(&self, observer: &Weak<dyn Observer>);

    /// Notify all currently registered observers that this object has changed.
    fn notify_observers(&self);
}

/// An object that reacts to changes in [`Observable`]s it has subscribed to.
pub trait Observer: Send + Sync {
    /// Called by every observable this observer is registered with when that
    /// observable changes state.
    fn update(&self);
}

/// Standard observer-list bookkeeping, embedded in observable types.
#[derive(Default)]
pub struct ObservableImpl {
    observers: Mutex<Vec<Weak<dyn Observer>>>,
}

impl std::fmt::Debug for ObservableImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObservableImpl")
            .field("observers", &self.len())
            .finish()
    }
}

impl ObservableImpl {
    /// Create a new, empty observable implementation.
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self) -> MutexGuard<'_, Vec<Weak<dyn Observer>>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an observer. Registering the same observer twice is a no-op.
    pub fn register(&self, observer: Weak<dyn Observer>) {
        let mut list = self.list();
        if !list.iter().any(|o| Weak::ptr_eq(o, &observer)) {
            list.push(observer);
        }
    }

    /// Remove an observer (by pointer equality of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn Observer>) {
        self.list().retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Number of live registered observers.
    pub fn len(&self) -> usize {
        self.list().iter().filter(|w| w.strong_count() > 0).count()
    }

    /// `true` when no live observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify all live observers, removing dead `Weak` references as we go.
    ///
    /// The lock is released before any `update()` runs, so observers may
    /// register or notify in turn.
    pub fn notify(&self) {
        let live: Vec<Arc<dyn Observer>> = {
            let mut list = self.list();
            list.retain(|w| w.strong_count() > 0);
            list.iter().filter_map(Weak::upgrade).collect()
        };
        for obs in live {
            obs.update();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct CountingObserver {
        count: AtomicU32,
    }

    impl Observer for CountingObserver {
        fn update(&self) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn register_and_notify() {
        let obs = Arc::new(CountingObserver::default());
        let observable = ObservableImpl::new();
        observable.register(Arc::downgrade(&obs) as Weak<dyn Observer>);
        observable.notify();
        observable.notify();
        assert_eq!(obs.count.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn duplicate_registration_notifies_once() {
        let obs = Arc::new(CountingObserver::default());
        let weak = Arc::downgrade(&obs) as Weak<dyn Observer>;
        let observable = ObservableImpl::new();
        observable.register(weak.clone());
        observable.register(weak);
        observable.notify();
        assert_eq!(obs.count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn dead_observer_pruned() {
        let observable = ObservableImpl::new();
        {
            let obs = Arc::new(CountingObserver::default());
            observable.register(Arc::downgrade(&obs) as Weak<dyn Observer>);
            assert_eq!(observable.len(), 1);
        }
        observable.notify();
        assert!(observable.is_empty());
    }

    #[test]
    fn unregister() {
        let obs = Arc::new(CountingObserver::default());
        let weak = Arc::downgrade(&obs) as Weak<dyn Observer>;
        let observable = ObservableImpl::new();
        observable.register(weak.clone());
        observable.unregister(&weak);
        observable.notify();
        assert_eq!(obs.count.load(Ordering::Relaxed), 0);
    }
}

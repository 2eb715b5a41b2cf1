//! Lazy-object pattern.
//!
//! A lazy object caches an expensive computation and recomputes only when
//! one of its inputs reports a change. The bookkeeping lives in
//! [`LazyState`], which is itself an [`Observer`]: register it (through a
//! `Weak` link) with every observable input and it flips to dirty on
//! notification, forwarding the notification to its own observers.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Weak;

use super::observable::{Observable, ObservableImpl, Observer};
use crate::errors::Result;

/// Dirty flag, freeze counter and downstream observers of a lazy object.
#[derive(Debug, Default)]
pub struct LazyState {
    calculated: AtomicBool,
    freeze_count: AtomicU32,
    observers: ObservableImpl,
}

impl LazyState {
    /// A state whose cache is initially stale.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when the cached result is valid.
    pub fn is_calculated(&self) -> bool {
        self.calculated.load(Ordering::Acquire)
    }

    /// Mark the cache valid.
    pub fn set_calculated(&self) {
        self.calculated.store(true, Ordering::Release);
    }

    /// Mark the cache stale. Returns `true` if it was valid before.
    pub fn invalidate(&self) -> bool {
        self.calculated.swap(false, Ordering::AcqRel)
    }

    /// `true` while at least one [`freeze`](Self::freeze) is outstanding.
    pub fn is_frozen(&self) -> bool {
        self.freeze_count.load(Ordering::Acquire) > 0
    }

    /// Defer recalculation until a matching [`unfreeze`](Self::unfreeze).
    pub fn freeze(&self) {
        self.freeze_count.fetch_add(1, Ordering::AcqRel);
    }

    /// Undo one call to [`freeze`](Self::freeze).
    pub fn unfreeze(&self) {
        let _ = self
            .freeze_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

impl Observer for LazyState {
    fn update(&self) {
        if self.invalidate() {
            self.observers.notify();
        }
    }
}

impl Observable for LazyState {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observers.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observers.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observers.notify();
    }
}

/// Objects that lazily compute and cache their results.
///
/// Implementors provide [`perform_calculations`](Self::perform_calculations)
/// and access to their [`LazyState`]; the provided methods handle the
/// dirty flag and the freeze counter.
pub trait LazyObject {
    /// The bookkeeping state.
    fn lazy_state(&self) -> &LazyState;

    /// Perform the actual (expensive) calculation.
    fn perform_calculations(&self) -> Result<()>;

    /// Bring results up to date.
    ///
    /// The cache is marked valid only when the calculation succeeds, so a
    /// failed calculation is attempted again on the next call.
    fn calculate(&self) -> Result<()> {
        let state = self.lazy_state();
        if !state.is_calculated() && !state.is_frozen() {
            self.perform_calculations()?;
            state.set_calculated();
        }
        Ok(())
    }

    /// Force a calculation, even when frozen or already calculated.
    fn recalculate(&self) -> Result<()> {
        let state = self.lazy_state();
        state.invalidate();
        self.perform_calculations()?;
        state.set_calculated();
        state.notify_observers();
        Ok(())
    }

    /// Mark the cached result as stale and notify downstream observers.
    fn update(&self) {
        Observer::update(self.lazy_state());
    }

    /// Prevent automatic recalculation until unfrozen.
    fn freeze(&self) {
        self.lazy_state().freeze();
    }

    /// Undo one call to [`freeze`](Self::freeze).
    fn unfreeze(&self) {
        self.lazy_state().unfreeze();
    }

    /// `true` if the cache is currently valid.
    fn is_calculated(&self) -> bool {
        self.lazy_state().is_calculated()
    }

    /// `true` if recalculation is currently deferred.
    fn is_frozen(&self) -> bool {
        self.lazy_state().is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fail;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[derive(Default)]
    struct Counter {
        state: Arc<LazyState>,
        runs: AtomicUsize,
        broken: AtomicBool,
    }

    impl LazyObject for Counter {
        fn lazy_state(&self) -> &LazyState {
            &self.state
        }

        fn perform_calculations(&self) -> Result<()> {
            if self.broken.load(Ordering::Relaxed) {
                fail!("inputs unusable");
            }
            self.runs.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn calculates_once_until_updated() {
        let c = Counter::default();
        c.calculate().unwrap();
        c.calculate().unwrap();
        assert_eq!(c.runs.load(Ordering::Relaxed), 1);
        c.update();
        c.calculate().unwrap();
        assert_eq!(c.runs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn observer_notification_marks_dirty() {
        let c = Counter::default();
        let input = ObservableImpl::new();
        input.register(Arc::downgrade(&c.state) as Weak<dyn Observer>);
        c.calculate().unwrap();
        input.notify();
        assert!(!c.is_calculated());
        c.calculate().unwrap();
        assert_eq!(c.runs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn frozen_object_defers() {
        let c = Counter::default();
        c.calculate().unwrap();
        c.freeze();
        c.update();
        c.calculate().unwrap();
        assert_eq!(c.runs.load(Ordering::Relaxed), 1);
        c.unfreeze();
        c.calculate().unwrap();
        assert_eq!(c.runs.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn failure_leaves_cache_stale() {
        let c = Counter::default();
        c.broken.store(true, Ordering::Relaxed);
        assert!(c.calculate().is_err());
        assert!(!c.is_calculated());
        c.broken.store(false, Ordering::Relaxed);
        c.calculate().unwrap();
        assert!(c.is_calculated());
    }
}

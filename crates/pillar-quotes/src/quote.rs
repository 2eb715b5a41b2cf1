//! `Quote` trait and `SimpleQuote`.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use pillar_core::errors::{Error, Result};
use pillar_core::patterns::observable::{Observable, ObservableImpl, Observer};
use pillar_core::Real;

/// A market-observable value.
///
/// Implementors notify their observers whenever the value changes, so that
/// dependent curves can drop their cached state.
pub trait Quote: Observable + std::fmt::Debug + Send + Sync {
    /// The current value, or `None` if the quote is not set.
    fn value(&self) -> Option<Real>;

    /// `true` if the quote currently holds a value.
    fn is_valid(&self) -> bool {
        self.value().is_some()
    }

    /// The current value, or [`Error::InvalidQuote`] if unset.
    fn try_value(&self) -> Result<Real> {
        self.value()
            .ok_or_else(|| Error::InvalidQuote(format!("{self:?} has no value")))
    }
}

/// A mutable, shareable quote.
///
/// Setting a different value (or resetting a set one) notifies observers;
/// writing the value it already holds does not.
#[derive(Debug, Default)]
pub struct SimpleQuote {
    value: RwLock<Option<Real>>,
    observable: ObservableImpl,
}

impl SimpleQuote {
    /// A quote holding `value`.
    pub fn new(value: Real) -> Self {
        Self {
            value: RwLock::new(Some(value)),
            observable: ObservableImpl::new(),
        }
    }

    /// A quote holding no value.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shorthand for `Arc::new(SimpleQuote::new(value))`.
    pub fn shared(value: Real) -> Arc<Self> {
        Arc::new(Self::new(value))
    }

    /// Set a new value and return the previous one.
    pub fn set_value(&self, value: Real) -> Option<Real> {
        self.replace(Some(value))
    }

    /// Clear the value, making the quote invalid.
    pub fn reset(&self) {
        self.replace(None);
    }

    fn replace(&self, value: Option<Real>) -> Option<Real> {
        let previous = {
            let mut slot = self.value.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *slot, value)
        };
        if previous != value {
            self.observable.notify();
        }
        previous
    }
}

impl From<Real> for SimpleQuote {
    fn from(value: Real) -> Self {
        Self::new(value)
    }
}

impl Observable for SimpleQuote {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.observable.register(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.observable.unregister(observer);
    }

    fn notify_observers(&self) {
        self.observable.notify();
    }
}

impl Quote for SimpleQuote {
    fn value(&self) -> Option<Real> {
        *self.value.read().unwrap_or_else(PoisonError::into_inner)
    }
}

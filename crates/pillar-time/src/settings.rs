//! Evaluation-date setting.
//!
//! [`Settings`] holds the **evaluation date**, the "today" of every
//! calculation. Objects whose dates are defined relative to it (moving
//! curves, relative-date rate helpers) register as observers and are
//! notified when it changes.
//!
//! The setting is per thread: each thread starts with no explicit date
//! (meaning the system date) and its own observer list, so independent
//! computations on different threads cannot disturb each other.

use std::cell::Cell;
use std::sync::Weak;

use pillar_core::{ObservableImpl, Observer};

use crate::date::Date;

thread_local! {
    static EVALUATION_DATE: Cell<Option<Date>> = const { Cell::new(None) };
    static OBSERVERS: ObservableImpl = ObservableImpl::new();
}

/// Access to the per-thread evaluation date.
#[derive(Debug, Clone, Copy)]
pub struct Settings;

impl Settings {
    /// The evaluation date; today's date unless one has been set.
    pub fn evaluation_date() -> Date {
        EVALUATION_DATE
            .with(Cell::get)
            .unwrap_or_else(Date::todays_date)
    }

    /// `true` when an explicit evaluation date is set.
    pub fn has_evaluation_date() -> bool {
        EVALUATION_DATE.with(Cell::get).is_some()
    }

    /// Set the evaluation date, notifying observers if it changed.
    pub fn set_evaluation_date(date: Date) {
        Self::store(Some(date));
    }

    /// Go back to using the system date, notifying observers if that
    /// changes the effective date.
    pub fn reset_evaluation_date() {
        Self::store(None);
    }

    fn store(date: Option<Date>) {
        let before = Self::evaluation_date();
        EVALUATION_DATE.with(|d| d.set(date));
        if Self::evaluation_date() != before {
            OBSERVERS.with(ObservableImpl::notify);
        }
    }

    /// Register an observer of evaluation-date changes.
    pub fn register_observer(observer: Weak<dyn Observer>) {
        OBSERVERS.with(|o| o.register(observer));
    }

    /// Remove an observer of evaluation-date changes.
    pub fn unregister_observer(observer: &Weak<dyn Observer>) {
        OBSERVERS.with(|o| o.unregister(observer));
    }
}

/// Sets the evaluation date for a scope and restores the previous setting
/// on drop.
#[derive(Debug)]
#[must_use = "the previous evaluation date is restored when the guard is dropped"]
pub struct ScopedEvaluationDate {
    previous: Option<Date>,
}

impl ScopedEvaluationDate {
    /// Set `date` as evaluation date until the guard is dropped.
    pub fn new(date: Date) -> Self {
        let previous = EVALUATION_DATE.with(Cell::get);
        Settings::set_evaluation_date(date);
        Self { previous }
    }
}

impl Drop for ScopedEvaluationDate {
    fn drop(&mut self) {
        Settings::store(self.previous);
    }
}

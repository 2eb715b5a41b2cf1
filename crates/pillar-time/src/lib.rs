//! # pillar-time
//!
//! Date arithmetic and market conventions: dates, periods, calendars, day
//! counters, schedules, IMM dates, interest-rate conventions and the
//! evaluation-date setting.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Business-day adjustment conventions.
pub mod business_day_convention;

/// Calendar trait and built-in implementations.
pub mod calendar;

/// Concrete calendar implementations.
pub mod calendars;

/// `Date` type.
pub mod date;

/// `DayCounter` trait and built-in day-count conventions.
pub mod day_counter;

/// Payment / compounding frequency.
pub mod frequency;

/// IMM dates (third Wednesday of the quarterly months).
pub mod imm;

/// Interest rate with compounding conventions.
pub mod interest_rate;

/// `Period`: a time span in a `TimeUnit`.
pub mod period;

/// `Schedule`: an ordered sequence of dates.
pub mod schedule;

/// Evaluation-date setting.
pub mod settings;

/// `TimeUnit`: days, weeks, months, years.
pub mod time_unit;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use business_day_convention::BusinessDayConvention;
pub use calendar::{Calendar, NullCalendar, WeekendsOnly};
pub use calendars::target::Target;
pub use chrono::Weekday;
pub use date::Date;
pub use day_counter::{Actual360, Actual365Fixed, ActualActualIsda, DayCounter, Thirty360};
pub use frequency::Frequency;
pub use imm::Imm;
pub use interest_rate::InterestRate;
pub use period::Period;
pub use schedule::{DateGeneration, Schedule, ScheduleBuilder};
pub use settings::{ScopedEvaluationDate, Settings};
pub use time_unit::TimeUnit;

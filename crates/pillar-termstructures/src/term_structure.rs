//! `TermStructure`, the base trait for all term structures.
//!
//! Every term structure has a **reference date** (time zero), a **day
//! counter** converting dates to times and a **maximum date**.

use std::sync::Arc;

use pillar_core::errors::Result;
use pillar_core::Time;
use pillar_time::{Calendar, Date, DayCounter};

/// Base trait for all term structures.
pub trait TermStructure: std::fmt::Debug + Send + Sync {
    /// The date at which discount = 1.0 and from which time is measured.
    fn reference_date(&self) -> Date;

    /// The day counter used for date to time conversions.
    fn day_counter(&self) -> &Arc<dyn DayCounter>;

    /// The calendar used for date adjustments.
    fn calendar(&self) -> &dyn Calendar;

    /// The latest date covered by market data. Lazily built curves may need
    /// to calculate first, hence the `Result`.
    fn max_date(&self) -> Result<Date>;

    /// Time of [`max_date`](Self::max_date).
    fn max_time(&self) -> Result<Time> {
        Ok(self.time_from_reference(self.max_date()?))
    }

    /// Year fraction from the reference date to `date`.
    fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter().year_fraction(self.reference_date(), date)
    }
}

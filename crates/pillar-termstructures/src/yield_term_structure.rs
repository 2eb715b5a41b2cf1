//! `YieldTermStructure`: discount factors, zero rates and forward rates.
//!
//! Implementors provide [`discount_impl`](YieldTermStructure::discount_impl);
//! zero and forward rates follow from it. Every query returns `Result`
//! because curves built lazily from market quotes may fail to calculate.

use std::sync::Arc;

use pillar_core::errors::Result;
use pillar_core::{ensure, Compounding, DiscountFactor, Time};
use pillar_time::{Date, DayCounter, Frequency, InterestRate};

use crate::term_structure::TermStructure;

/// Step used where an instantaneous rate is needed.
const DT: Time = 1.0e-4;

/// A yield (interest-rate) term structure.
pub trait YieldTermStructure: TermStructure {
    /// Discount factor at time `t >= 0`.
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor>;

    /// Discount factor for a time, measured from the reference date.
    fn discount(&self, t: Time) -> Result<DiscountFactor> {
        ensure!(t >= 0.0, "negative time ({t}) given");
        self.discount_impl(t)
    }

    /// Discount factor for a date.
    fn discount_date(&self, date: Date) -> Result<DiscountFactor> {
        self.discount(self.time_from_reference(date))
    }

    /// Zero rate from the reference date to `date`, with time measured by
    /// `day_counter` and expressed under the given conventions.
    fn zero_rate(
        &self,
        date: Date,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        if date == self.reference_date() {
            let compound = 1.0 / self.discount(DT)?;
            return InterestRate::implied_rate_time(compound, day_counter, compounding, frequency, DT);
        }
        let t = day_counter.year_fraction(self.reference_date(), date);
        let compound = 1.0 / self.discount_date(date)?;
        InterestRate::implied_rate_time(compound, day_counter, compounding, frequency, t)
    }

    /// Zero rate for time `t` under the curve's own day counter.
    fn zero_rate_time(
        &self,
        t: Time,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        let t = if t == 0.0 { DT } else { t };
        let compound = 1.0 / self.discount(t)?;
        InterestRate::implied_rate_time(
            compound,
            Arc::clone(self.day_counter()),
            compounding,
            frequency,
            t,
        )
    }

    /// Forward rate between two dates, with the period measured by
    /// `day_counter`. Equal dates give the instantaneous forward.
    fn forward_rate(
        &self,
        d1: Date,
        d2: Date,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        ensure!(d1 <= d2, "forward start {d1} later than end {d2}");
        if d1 == d2 {
            let t = self.time_from_reference(d1);
            let (t1, t2) = instantaneous_window(t);
            let compound = self.discount(t1)? / self.discount(t2)?;
            return InterestRate::implied_rate_time(compound, day_counter, compounding, frequency, DT);
        }
        let compound = self.discount_date(d1)? / self.discount_date(d2)?;
        let tau = day_counter.year_fraction(d1, d2);
        InterestRate::implied_rate_time(compound, day_counter, compounding, frequency, tau)
    }

    /// Forward rate between two times; instantaneous when `t1 == t2`.
    fn forward_rate_time(
        &self,
        t1: Time,
        t2: Time,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<InterestRate> {
        ensure!(t1 <= t2, "forward start time {t1} later than end time {t2}");
        let (t1, t2) = if t1 == t2 { instantaneous_window(t1) } else { (t1, t2) };
        let compound = self.discount(t1)? / self.discount(t2)?;
        InterestRate::implied_rate_time(
            compound,
            Arc::clone(self.day_counter()),
            compounding,
            frequency,
            t2 - t1,
        )
    }
}

fn instantaneous_window(t: Time) -> (Time, Time) {
    let lo = (t - DT / 2.0).max(0.0);
    (lo, lo + DT)
}

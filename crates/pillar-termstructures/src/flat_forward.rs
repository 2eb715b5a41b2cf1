//! `FlatForward`: a yield term structure with a constant forward rate.
//!
//! Mostly used as a reference curve: quotes implied by a flat curve are a
//! consistent market that a bootstrapped curve must reproduce.

use std::sync::Arc;

use pillar_core::errors::Result;
use pillar_core::{Compounding, DiscountFactor, Rate, Time};
use pillar_time::{Calendar, Date, DayCounter, Frequency, InterestRate, NullCalendar};

use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// A flat (constant) forward-rate yield term structure.
///
/// Discount factors are `1 / compound_factor(t)` of the supplied rate, so a
/// rate given with annual compounding discounts as `(1 + r)^-t`.
#[derive(Debug)]
pub struct FlatForward {
    reference_date: Date,
    calendar: Arc<dyn Calendar>,
    day_counter: Arc<dyn DayCounter>,
    rate: InterestRate,
}

impl FlatForward {
    /// A flat curve from a rate and its compounding convention.
    pub fn new(
        reference_date: Date,
        rate: Rate,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<Self> {
        let rate = InterestRate::new(rate, Arc::clone(&day_counter), compounding, frequency)?;
        Ok(Self {
            reference_date,
            calendar: Arc::new(NullCalendar),
            day_counter,
            rate,
        })
    }

    /// A flat curve with a continuously-compounded rate.
    pub fn continuous(reference_date: Date, rate: Rate, day_counter: Arc<dyn DayCounter>) -> Result<Self> {
        Self::new(
            reference_date,
            rate,
            day_counter,
            Compounding::Continuous,
            Frequency::NoFrequency,
        )
    }

    /// Use `calendar` for date adjustments.
    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = calendar;
        self
    }

    /// The flat rate.
    pub fn rate(&self) -> &InterestRate {
        &self.rate
    }
}

impl TermStructure for FlatForward {
    fn reference_date(&self) -> Date {
        self.reference_date
    }

    fn day_counter(&self) -> &Arc<dyn DayCounter> {
        &self.day_counter
    }

    fn calendar(&self) -> &dyn Calendar {
        &*self.calendar
    }

    fn max_date(&self) -> Result<Date> {
        Ok(Date::MAX)
    }
}

impl YieldTermStructure for FlatForward {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        self.rate.discount_factor_time(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pillar_time::{Actual360, Actual365Fixed};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn continuous_discount() {
        let curve = FlatForward::continuous(date(2025, 1, 2), 0.05, Arc::new(Actual365Fixed)).unwrap();
        assert_abs_diff_eq!(curve.discount(0.0).unwrap(), 1.0);
        assert_abs_diff_eq!(curve.discount(1.0).unwrap(), (-0.05_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(curve.discount(10.0).unwrap(), (-0.5_f64).exp(), epsilon = 1e-15);
        assert!(curve.discount(-1.0).is_err());
    }

    #[test]
    fn annual_compounding() {
        let curve = FlatForward::new(
            date(2025, 1, 2),
            0.05,
            Arc::new(Actual365Fixed),
            Compounding::Compounded,
            Frequency::Annual,
        )
        .unwrap();
        assert_abs_diff_eq!(curve.discount(2.0).unwrap(), 1.05_f64.powi(-2), epsilon = 1e-15);
        let z = curve
            .zero_rate_time(3.0, Compounding::Continuous, Frequency::NoFrequency)
            .unwrap();
        assert_abs_diff_eq!(z.rate(), 1.05_f64.ln(), epsilon = 1e-14);
    }

    #[test]
    fn zero_and_forward_rates_are_flat() {
        let today = date(2025, 1, 2);
        let curve = FlatForward::continuous(today, 0.04, Arc::new(Actual365Fixed)).unwrap();
        let dc: Arc<dyn DayCounter> = Arc::new(Actual365Fixed);
        let z = curve
            .zero_rate(date(2027, 6, 30), Arc::clone(&dc), Compounding::Continuous, Frequency::NoFrequency)
            .unwrap();
        assert_abs_diff_eq!(z.rate(), 0.04, epsilon = 1e-14);
        let z0 = curve
            .zero_rate(today, Arc::clone(&dc), Compounding::Continuous, Frequency::NoFrequency)
            .unwrap();
        assert_abs_diff_eq!(z0.rate(), 0.04, epsilon = 1e-12);
        let f = curve
            .forward_rate_time(1.0, 1.0, Compounding::Continuous, Frequency::NoFrequency)
            .unwrap();
        // instantaneous forward over a 1e-4 window: rounding limits it to ~1e-12
        assert_abs_diff_eq!(f.rate(), 0.04, epsilon = 1e-10);
    }

    #[test]
    fn simple_forward_between_dates() {
        let today = date(2025, 1, 2);
        let curve = FlatForward::continuous(today, 0.03, Arc::new(Actual360)).unwrap();
        let (d1, d2) = (date(2025, 4, 2), date(2025, 7, 2));
        let fwd = curve
            .forward_rate(d1, d2, Arc::new(Actual360), Compounding::Simple, Frequency::Annual)
            .unwrap();
        let tau = Actual360.year_fraction(d1, d2);
        assert_abs_diff_eq!(fwd.rate(), ((0.03 * tau).exp() - 1.0) / tau, epsilon = 1e-14);
    }
}

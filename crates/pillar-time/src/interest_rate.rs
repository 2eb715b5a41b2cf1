//! Interest rate with compounding and day-counting conventions.
//!
//! An [`InterestRate`] bundles a rate with a day counter, a compounding rule
//! and a frequency, and converts between rates and compound factors.

use std::sync::Arc;

use pillar_core::errors::Result;
use pillar_core::{ensure, Compounding, Rate, Real, Time};

use crate::date::Date;
use crate::day_counter::DayCounter;
use crate::frequency::Frequency;

/// An interest rate with its conventions.
#[derive(Debug, Clone)]
pub struct InterestRate {
    rate: Rate,
    day_counter: Arc<dyn DayCounter>,
    compounding: Compounding,
    frequency: Frequency,
}

impl InterestRate {
    /// Create a rate. `frequency` is only read for compounded conventions,
    /// where it must have a positive number of periods per year.
    pub fn new(
        rate: Rate,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
    ) -> Result<Self> {
        if needs_frequency(compounding) {
            periods(frequency)?;
        }
        Ok(Self {
            rate,
            day_counter,
            compounding,
            frequency,
        })
    }

    /// The rate value.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// The day counter.
    pub fn day_counter(&self) -> &dyn DayCounter {
        &*self.day_counter
    }

    /// The compounding convention.
    pub fn compounding(&self) -> Compounding {
        self.compounding
    }

    /// The compounding frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Growth of one unit of currency over `t` years.
    pub fn compound_factor_time(&self, t: Time) -> Result<Real> {
        ensure!(t >= 0.0, "negative time ({t}) not allowed");
        let r = self.rate;
        let factor = match self.compounding {
            Compounding::Simple => 1.0 + r * t,
            Compounding::Continuous => (r * t).exp(),
            Compounding::Compounded => {
                let f = periods(self.frequency)?;
                (1.0 + r / f).powf(f * t)
            }
            Compounding::SimpleThenCompounded => {
                let f = periods(self.frequency)?;
                if t <= 1.0 / f {
                    1.0 + r * t
                } else {
                    (1.0 + r / f).powf(f * t)
                }
            }
            Compounding::CompoundedThenSimple => {
                let f = periods(self.frequency)?;
                if t <= 1.0 / f {
                    (1.0 + r / f).powf(f * t)
                } else {
                    1.0 + r * t
                }
            }
        };
        ensure!(factor > 0.0, "non-positive compound factor {factor} for rate {r} over {t}");
        Ok(factor)
    }

    /// Growth between two dates, measured with the rate's day counter.
    pub fn compound_factor(&self, d1: Date, d2: Date) -> Result<Real> {
        self.compound_factor_time(self.day_counter.year_fraction(d1, d2))
    }

    /// Discount factor over `t` years.
    pub fn discount_factor_time(&self, t: Time) -> Result<Real> {
        Ok(1.0 / self.compound_factor_time(t)?)
    }

    /// The rate under other conventions giving the same growth over `t`.
    pub fn equivalent_rate_time(
        &self,
        compounding: Compounding,
        frequency: Frequency,
        t: Time,
    ) -> Result<InterestRate> {
        Self::implied_rate_time(
            self.compound_factor_time(t)?,
            Arc::clone(&self.day_counter),
            compounding,
            frequency,
            t,
        )
    }

    /// The rate that grows one unit into `compound` over `t` years.
    pub fn implied_rate_time(
        compound: Real,
        day_counter: Arc<dyn DayCounter>,
        compounding: Compounding,
        frequency: Frequency,
        t: Time,
    ) -> Result<InterestRate> {
        ensure!(compound > 0.0, "positive compound factor required, got {compound}");
        ensure!(t > 0.0, "positive time required to imply a rate, got {t}");
        let rate = match compounding {
            Compounding::Simple => (compound - 1.0) / t,
            Compounding::Continuous => compound.ln() / t,
            Compounding::Compounded => {
                let f = periods(frequency)?;
                (compound.powf(1.0 / (f * t)) - 1.0) * f
            }
            Compounding::SimpleThenCompounded => {
                let f = periods(frequency)?;
                if t <= 1.0 / f {
                    (compound - 1.0) / t
                } else {
                    (compound.powf(1.0 / (f * t)) - 1.0) * f
                }
            }
            Compounding::CompoundedThenSimple => {
                let f = periods(frequency)?;
                if t <= 1.0 / f {
                    (compound.powf(1.0 / (f * t)) - 1.0) * f
                } else {
                    (compound - 1.0) / t
                }
            }
        };
        InterestRate::new(rate, day_counter, compounding, frequency)
    }
}

fn needs_frequency(c: Compounding) -> bool {
    !matches!(c, Compounding::Simple | Compounding::Continuous)
}

fn periods(frequency: Frequency) -> Result<Real> {
    match frequency.periods_per_year() {
        Some(n) if n > 0 => Ok(Real::from(n)),
        _ => Err(pillar_core::Error::InvalidArgument(format!(
            "{frequency} frequency not allowed for compounded rates"
        ))),
    }
}

impl std::fmt::Display for InterestRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {:?}",
            pillar_core::formatting::format_rate(self.rate),
            self.day_counter.name(),
            self.compounding,
        )?;
        if needs_frequency(self.compounding) {
            write!(f, " {}", self.frequency)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_counter::Actual365Fixed;
    use approx::assert_abs_diff_eq;

    fn rate(r: Rate, c: Compounding, f: Frequency) -> InterestRate {
        InterestRate::new(r, Arc::new(Actual365Fixed), c, f).unwrap()
    }

    #[test]
    fn compound_factors() {
        let t = 2.0;
        assert_abs_diff_eq!(
            rate(0.05, Compounding::Simple, Frequency::Annual).compound_factor_time(t).unwrap(),
            1.1
        );
        assert_abs_diff_eq!(
            rate(0.05, Compounding::Continuous, Frequency::Annual)
                .compound_factor_time(t)
                .unwrap(),
            (0.1_f64).exp()
        );
        assert_abs_diff_eq!(
            rate(0.05, Compounding::Compounded, Frequency::Semiannual)
                .compound_factor_time(t)
                .unwrap(),
            1.025_f64.powi(4),
            epsilon = 1e-15
        );
    }

    #[test]
    fn equivalent_rates_round_trip() {
        let r = rate(0.04, Compounding::Compounded, Frequency::Quarterly);
        let cont = r
            .equivalent_rate_time(Compounding::Continuous, Frequency::NoFrequency, 3.0)
            .unwrap();
        assert_abs_diff_eq!(cont.rate(), 4.0 * (1.01_f64).ln(), epsilon = 1e-14);
        let back = cont
            .equivalent_rate_time(Compounding::Compounded, Frequency::Quarterly, 3.0)
            .unwrap();
        assert_abs_diff_eq!(back.rate(), 0.04, epsilon = 1e-14);
    }

    #[test]
    fn invalid_inputs() {
        assert!(InterestRate::new(
            0.05,
            Arc::new(Actual365Fixed),
            Compounding::Compounded,
            Frequency::NoFrequency
        )
        .is_err());
        let r = rate(0.05, Compounding::Simple, Frequency::Annual);
        assert!(r.compound_factor_time(-1.0).is_err());
        assert!(rate(-2.0, Compounding::Simple, Frequency::Annual)
            .compound_factor_time(1.0)
            .is_err());
    }

    #[test]
    fn display() {
        let r = rate(0.05, Compounding::Continuous, Frequency::Annual);
        assert_eq!(r.to_string(), "5.000000 % Actual/365 (Fixed) Continuous");
    }
}

//! `Schedule`: accrual and payment dates of a leg.
//!
//! Dates are rolled from one end of the leg by whole multiples of the tenor
//! (so month-end clamping never accumulates), then adjusted on the
//! calendar. A stub, if any, sits at the end opposite to the roll.

use pillar_core::errors::{Error, Result};

use crate::business_day_convention::BusinessDayConvention;
use crate::calendar::Calendar;
use crate::date::Date;
use crate::period::Period;

/// Direction in which dates are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateGeneration {
    /// Roll back from the termination date; stub at the front.
    #[default]
    Backward,
    /// Roll forward from the effective date; stub at the back.
    Forward,
    /// Effective and termination dates only.
    Zero,
}

/// An ordered sequence of adjusted dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    dates: Vec<Date>,
}

impl Schedule {
    /// A schedule from explicit dates, which must be strictly increasing.
    pub fn from_dates(dates: Vec<Date>) -> Result<Self> {
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::InvalidArgument(
                "schedule dates must be strictly increasing".into(),
            ));
        }
        Ok(Self { dates })
    }

    /// All dates.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of dates.
    pub fn size(&self) -> usize {
        self.dates.len()
    }

    /// `true` if the schedule holds no date.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// First date.
    pub fn start_date(&self) -> Option<Date> {
        self.dates.first().copied()
    }

    /// Last date.
    pub fn end_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// Consecutive `(start, end)` accrual periods.
    pub fn periods(&self) -> impl Iterator<Item = (Date, Date)> + '_ {
        self.dates.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Builder for [`Schedule`].
#[derive(Debug)]
pub struct ScheduleBuilder<'a> {
    effective_date: Date,
    termination_date: Date,
    tenor: Period,
    calendar: &'a dyn Calendar,
    convention: BusinessDayConvention,
    termination_convention: BusinessDayConvention,
    rule: DateGeneration,
    end_of_month: bool,
}

impl<'a> ScheduleBuilder<'a> {
    /// Begin building a schedule; conventions default to modified following
    /// and generation to backward.
    pub fn new(
        effective_date: Date,
        termination_date: Date,
        tenor: Period,
        calendar: &'a dyn Calendar,
    ) -> Self {
        Self {
            effective_date,
            termination_date,
            tenor,
            calendar,
            convention: BusinessDayConvention::ModifiedFollowing,
            termination_convention: BusinessDayConvention::ModifiedFollowing,
            rule: DateGeneration::Backward,
            end_of_month: false,
        }
    }

    /// Business-day convention for all dates but the termination date.
    #[must_use]
    pub fn with_convention(mut self, c: BusinessDayConvention) -> Self {
        self.convention = c;
        self
    }

    /// Business-day convention for the termination date.
    #[must_use]
    pub fn with_termination_convention(mut self, c: BusinessDayConvention) -> Self {
        self.termination_convention = c;
        self
    }

    /// Date-generation rule.
    #[must_use]
    pub fn with_rule(mut self, rule: DateGeneration) -> Self {
        self.rule = rule;
        self
    }

    /// Snap rolled dates to month ends when the seed date is a month end.
    #[must_use]
    pub fn end_of_month(mut self, flag: bool) -> Self {
        self.end_of_month = flag;
        self
    }

    /// Build the schedule.
    pub fn build(self) -> Result<Schedule> {
        let (start, end) = (self.effective_date, self.termination_date);
        if start >= end {
            return Err(Error::InvalidArgument(format!(
                "effective date ({start}) must precede termination date ({end})"
            )));
        }
        if self.tenor.length < 0 {
            return Err(Error::InvalidArgument(format!(
                "negative tenor ({}) not allowed",
                self.tenor
            )));
        }

        let unadjusted = if self.tenor.length == 0 || self.rule == DateGeneration::Zero {
            vec![start, end]
        } else {
            self.roll(start, end)?
        };

        let last = unadjusted.len() - 1;
        let mut dates: Vec<Date> = Vec::with_capacity(unadjusted.len());
        for (i, d) in unadjusted.into_iter().enumerate() {
            let adjusted = if i == last {
                self.calendar.adjust(d, self.termination_convention)
            } else if i > 0 && self.snaps_to_month_end() {
                self.calendar.end_of_month(d)
            } else {
                self.calendar.adjust(d, self.convention)
            };
            // adjustment may collapse a short stub onto its neighbour
            if dates.last().map_or(true, |prev| adjusted > *prev) {
                dates.push(adjusted);
            }
        }
        if dates.len() < 2 {
            return Err(Error::InvalidArgument(format!(
                "degenerate schedule from {start} to {end}"
            )));
        }
        Ok(Schedule { dates })
    }

    fn snaps_to_month_end(&self) -> bool {
        let seed = match self.rule {
            DateGeneration::Forward => self.effective_date,
            DateGeneration::Backward | DateGeneration::Zero => self.termination_date,
        };
        self.end_of_month && self.tenor.months().is_some() && self.calendar.is_end_of_month(seed)
    }

    fn roll(&self, start: Date, end: Date) -> Result<Vec<Date>> {
        let mut dates = Vec::new();
        match self.rule {
            DateGeneration::Forward => {
                dates.push(start);
                for n in 1.. {
                    let next = start.advance_period(self.tenor * n)?;
                    if next >= end {
                        break;
                    }
                    dates.push(next);
                }
                dates.push(end);
            }
            DateGeneration::Backward | DateGeneration::Zero => {
                dates.push(end);
                for n in 1.. {
                    let prev = end.advance_period(self.tenor * -n)?;
                    if prev <= start {
                        break;
                    }
                    dates.push(prev);
                }
                dates.push(start);
                dates.reverse();
            }
        }
        Ok(dates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{NullCalendar, WeekendsOnly};
    use crate::time_unit::TimeUnit;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn backward_generation_puts_stub_in_front() {
        let s = ScheduleBuilder::new(
            date(2024, 2, 15),
            date(2025, 1, 15),
            Period::new(6, TimeUnit::Months),
            &NullCalendar,
        )
        .build()
        .unwrap();
        assert_eq!(s.dates(), &[date(2024, 2, 15), date(2024, 7, 15), date(2025, 1, 15)]);
    }

    #[test]
    fn forward_generation_puts_stub_at_back() {
        let s = ScheduleBuilder::new(
            date(2024, 2, 15),
            date(2025, 1, 15),
            Period::new(6, TimeUnit::Months),
            &NullCalendar,
        )
        .with_rule(DateGeneration::Forward)
        .build()
        .unwrap();
        assert_eq!(s.dates(), &[date(2024, 2, 15), date(2024, 8, 15), date(2025, 1, 15)]);
    }

    #[test]
    fn dates_are_adjusted() {
        // 15 June 2024 is a Saturday
        let s = ScheduleBuilder::new(
            date(2024, 3, 15),
            date(2024, 9, 16),
            Period::new(3, TimeUnit::Months),
            &WeekendsOnly,
        )
        .with_rule(DateGeneration::Forward)
        .build()
        .unwrap();
        assert_eq!(s.dates()[1], date(2024, 6, 17));
        assert_eq!(s.periods().count(), 2);
    }

    #[test]
    fn month_end_rolls_do_not_drift() {
        let s = ScheduleBuilder::new(
            date(2024, 1, 31),
            date(2024, 7, 31),
            Period::new(1, TimeUnit::Months),
            &NullCalendar,
        )
        .with_rule(DateGeneration::Forward)
        .end_of_month(true)
        .build()
        .unwrap();
        assert_eq!(s.dates()[1], date(2024, 2, 29));
        assert_eq!(s.dates()[2], date(2024, 3, 31));
        assert_eq!(s.end_date(), Some(date(2024, 7, 31)));
    }

    #[test]
    fn rejects_inverted_dates() {
        let r = ScheduleBuilder::new(
            date(2025, 1, 1),
            date(2024, 1, 1),
            Period::new(1, TimeUnit::Years),
            &NullCalendar,
        )
        .build();
        assert!(r.is_err());
    }
}

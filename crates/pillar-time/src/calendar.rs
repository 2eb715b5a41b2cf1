//! `Calendar` trait and the generic calendar implementations.
//!
//! A calendar knows which dates are business days, adjusts dates according
//! to a [`BusinessDayConvention`] and advances dates by business-day aware
//! periods.

use chrono::Weekday;
use pillar_core::errors::Result;

use crate::business_day_convention::BusinessDayConvention;
use crate::date::Date;
use crate::period::Period;
use crate::time_unit::TimeUnit;

/// A financial calendar.
pub trait Calendar: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"TARGET"`).
    fn name(&self) -> &str;

    /// `true` if `date` is a business day in this calendar.
    fn is_business_day(&self, date: Date) -> bool;

    /// `true` if `date` is a holiday (non-business) day.
    fn is_holiday(&self, date: Date) -> bool {
        !self.is_business_day(date)
    }

    /// `true` if `weekday` is part of the weekend.
    fn is_weekend(&self, weekday: Weekday) -> bool {
        matches!(weekday, Weekday::Sat | Weekday::Sun)
    }

    /// `true` if `date` is the last business day of its month.
    fn is_end_of_month(&self, date: Date) -> bool {
        date.month() != self.adjust(date + 1, BusinessDayConvention::Following).month()
    }

    /// Last business day of the month containing `date`.
    fn end_of_month(&self, date: Date) -> Date {
        self.adjust(date.end_of_month(), BusinessDayConvention::Preceding)
    }

    /// Adjust `date` according to the given business-day convention.
    fn adjust(&self, date: Date, convention: BusinessDayConvention) -> Date {
        match convention {
            BusinessDayConvention::Unadjusted => date,
            BusinessDayConvention::Following => {
                let mut d = date;
                while self.is_holiday(d) {
                    d += 1;
                }
                d
            }
            BusinessDayConvention::Preceding => {
                let mut d = date;
                while self.is_holiday(d) {
                    d -= 1;
                }
                d
            }
            BusinessDayConvention::ModifiedFollowing => {
                let adjusted = self.adjust(date, BusinessDayConvention::Following);
                if adjusted.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Preceding)
                } else {
                    adjusted
                }
            }
            BusinessDayConvention::ModifiedPreceding => {
                let adjusted = self.adjust(date, BusinessDayConvention::Preceding);
                if adjusted.month() != date.month() {
                    self.adjust(date, BusinessDayConvention::Following)
                } else {
                    adjusted
                }
            }
            BusinessDayConvention::Nearest => {
                if self.is_business_day(date) {
                    return date;
                }
                let fwd = self.adjust(date, BusinessDayConvention::Following);
                let bwd = self.adjust(date, BusinessDayConvention::Preceding);
                if fwd - date <= date - bwd {
                    fwd
                } else {
                    bwd
                }
            }
        }
    }

    /// Advance `date` by `n` business days.
    fn advance_business_days(&self, date: Date, n: i32) -> Date {
        let mut d = date;
        let step = if n >= 0 { 1 } else { -1 };
        let mut remaining = n.abs();
        while remaining > 0 {
            d += step;
            if self.is_business_day(d) {
                remaining -= 1;
            }
        }
        d
    }

    /// Advance `date` by `n` units and adjust the result.
    ///
    /// Day steps count business days. With `end_of_month` set, a date on
    /// the last business day of its month moved by months or years lands on
    /// the last business day of the target month.
    fn advance(
        &self,
        date: Date,
        n: i32,
        unit: TimeUnit,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> Result<Date> {
        if n == 0 {
            return Ok(self.adjust(date, convention));
        }
        match unit {
            TimeUnit::Days => Ok(self.advance_business_days(date, n)),
            TimeUnit::Weeks => Ok(self.adjust(date.advance(n, unit)?, convention)),
            TimeUnit::Months | TimeUnit::Years => {
                let d = date.advance(n, unit)?;
                if end_of_month && self.is_end_of_month(date) {
                    Ok(self.end_of_month(d))
                } else {
                    Ok(self.adjust(d, convention))
                }
            }
        }
    }

    /// Advance `date` by a period; see [`advance`](Self::advance).
    fn advance_period(
        &self,
        date: Date,
        period: Period,
        convention: BusinessDayConvention,
        end_of_month: bool,
    ) -> Result<Date> {
        self.advance(date, period.length, period.unit, convention, end_of_month)
    }

    /// Business days between `from` (inclusive) and `to` (exclusive);
    /// negative when `to` precedes `from`.
    fn business_days_between(&self, from: Date, to: Date) -> i64 {
        let (start, end, sign) = if from <= to { (from, to, 1) } else { (to, from, -1) };
        let mut count = 0;
        let mut d = start;
        while d < end {
            if self.is_business_day(d) {
                count += 1;
            }
            d += 1;
        }
        sign * count
    }
}

/// Every day is a business day.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCalendar;

impl Calendar for NullCalendar {
    fn name(&self) -> &str {
        "Null"
    }

    fn is_business_day(&self, _date: Date) -> bool {
        true
    }

    fn is_weekend(&self, _weekday: Weekday) -> bool {
        false
    }
}

/// Saturdays and Sundays are holidays; no other holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeekendsOnly;

impl Calendar for WeekendsOnly {
    fn name(&self) -> &str {
        "weekends only"
    }

    fn is_business_day(&self, date: Date) -> bool {
        !self.is_weekend(date.weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn null_calendar_never_adjusts() {
        let d = date(2023, 12, 30);
        assert_eq!(NullCalendar.adjust(d, BusinessDayConvention::Following), d);
    }

    #[test]
    fn modified_following_stays_in_month() {
        // Saturday 30 September 2023
        let d = date(2023, 9, 30);
        let cal = WeekendsOnly;
        assert_eq!(cal.adjust(d, BusinessDayConvention::Following), date(2023, 10, 2));
        assert_eq!(
            cal.adjust(d, BusinessDayConvention::ModifiedFollowing),
            date(2023, 9, 29)
        );
        assert_eq!(cal.adjust(d, BusinessDayConvention::Nearest), date(2023, 9, 29));
    }

    #[test]
    fn advance_business_days_skips_weekends() {
        // Thursday 5 January 2023 + 2 business days = Monday 9 January
        let cal = WeekendsOnly;
        assert_eq!(cal.advance_business_days(date(2023, 1, 5), 2), date(2023, 1, 9));
        assert_eq!(cal.advance_business_days(date(2023, 1, 9), -2), date(2023, 1, 5));
    }

    #[test]
    fn advance_end_of_month() {
        // 28 February 2023 is the last business day of February
        let cal = WeekendsOnly;
        let d = cal
            .advance(
                date(2023, 2, 28),
                1,
                TimeUnit::Months,
                BusinessDayConvention::ModifiedFollowing,
                true,
            )
            .unwrap();
        assert_eq!(d, date(2023, 3, 31));
    }

    #[test]
    fn business_days_between() {
        let cal = WeekendsOnly;
        assert_eq!(cal.business_days_between(date(2023, 1, 2), date(2023, 1, 9)), 5);
        assert_eq!(cal.business_days_between(date(2023, 1, 9), date(2023, 1, 2)), -5);
    }
}

//! Calendar dates.
//!
//! [`Date`] wraps a [`chrono::NaiveDate`] and adds the month-end aware
//! arithmetic market conventions need: advancing by periods clamps to the
//! end of the target month (31 January + 1M = 28/29 February).

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use pillar_core::errors::{Error, Result};

use crate::period::Period;
use crate::time_unit::TimeUnit;

/// A calendar date without time-of-day.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(NaiveDate);

impl Date {
    /// Earliest representable date.
    pub const MIN: Date = Date(NaiveDate::MIN);

    /// Latest representable date.
    pub const MAX: Date = Date(NaiveDate::MAX);

    /// Create a date from year, month (1–12) and day of month.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("invalid date {year}-{month:02}-{day:02}")))
    }

    /// Wrap a chrono date.
    pub fn from_naive(date: NaiveDate) -> Self {
        Date(date)
    }

    /// The underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Today's date in the local time zone.
    pub fn todays_date() -> Self {
        Date(chrono::Local::now().date_naive())
    }

    /// Year.
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month (1–12).
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of month (1–31).
    pub fn day_of_month(&self) -> u32 {
        self.0.day()
    }

    /// Day of year (1–366).
    pub fn day_of_year(&self) -> u32 {
        self.0.ordinal()
    }

    /// Day of the week.
    pub fn weekday(&self) -> Weekday {
        self.0.weekday()
    }

    /// Add `n` calendar days (negative `n` moves backwards).
    pub fn add_days(self, n: i64) -> Result<Self> {
        let shifted = if n >= 0 {
            self.0.checked_add_days(Days::new(n.unsigned_abs()))
        } else {
            self.0.checked_sub_days(Days::new(n.unsigned_abs()))
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} + {n} days is out of range")))
    }

    /// Advance by `n` units. Month and year steps clamp the day to the end
    /// of the target month.
    pub fn advance(self, n: i32, unit: TimeUnit) -> Result<Self> {
        match unit {
            TimeUnit::Days => self.add_days(i64::from(n)),
            TimeUnit::Weeks => self.add_days(7 * i64::from(n)),
            TimeUnit::Months => self.add_months(n),
            TimeUnit::Years => self.add_months(n.checked_mul(12).ok_or_else(|| {
                Error::Date(format!("{self} + {n} years is out of range"))
            })?),
        }
    }

    /// Advance by a [`Period`].
    pub fn advance_period(self, period: Period) -> Result<Self> {
        self.advance(period.length, period.unit)
    }

    fn add_months(self, n: i32) -> Result<Self> {
        let months = Months::new(n.unsigned_abs());
        let shifted = if n >= 0 {
            self.0.checked_add_months(months)
        } else {
            self.0.checked_sub_months(months)
        };
        shifted
            .map(Date)
            .ok_or_else(|| Error::Date(format!("{self} + {n} months is out of range")))
    }

    /// Number of days from `self` to `other` (positive when `other` is later).
    pub fn days_between(self, other: Date) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// Last calendar day of the month containing `self`.
    pub fn end_of_month(self) -> Self {
        let last = days_in_month(self.year(), self.month());
        Date(self.0.with_day(last).unwrap_or(self.0))
    }

    /// `true` if `self` is the last calendar day of its month.
    pub fn is_end_of_month(self) -> bool {
        self.day_of_month() == days_in_month(self.year(), self.month())
    }

    /// The `n`-th given weekday of a month (e.g. third Wednesday).
    pub fn nth_weekday(n: u32, weekday: Weekday, year: i32, month: u32) -> Result<Self> {
        let n = u8::try_from(n).map_err(|_| Error::Date(format!("no {n}th {weekday} in a month")))?;
        NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
            .map(Date)
            .ok_or_else(|| Error::Date(format!("no {n}th {weekday} in {year}-{month:02}")))
    }
}

/// `true` for Gregorian leap years.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

impl From<NaiveDate> for Date {
    fn from(d: NaiveDate) -> Self {
        Date(d)
    }
}

/// # Panics
/// Panics when the result falls outside the range chrono can represent.
impl std::ops::Add<i32> for Date {
    type Output = Date;
    fn add(self, n: i32) -> Date {
        if n >= 0 {
            Date(self.0 + Days::new(u64::from(n.unsigned_abs())))
        } else {
            Date(self.0 - Days::new(u64::from(n.unsigned_abs())))
        }
    }
}

/// # Panics
/// Panics when the result falls outside the range chrono can represent.
impl std::ops::Sub<i32> for Date {
    type Output = Date;
    fn sub(self, n: i32) -> Date {
        self + (-n)
    }
}

impl std::ops::Sub<Date> for Date {
    type Output = i64;
    fn sub(self, rhs: Date) -> i64 {
        rhs.days_between(self)
    }
}

impl std::ops::AddAssign<i32> for Date {
    fn add_assign(&mut self, n: i32) {
        *self = *self + n;
    }
}

impl std::ops::SubAssign<i32> for Date {
    fn sub_assign(&mut self, n: i32) {
        *self = *self - n;
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%-d %B %Y"))
    }
}

impl std::fmt::Debug for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Date({})", self.0)
    }
}

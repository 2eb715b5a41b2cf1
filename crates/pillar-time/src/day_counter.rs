//! Day-count conventions.
//!
//! A day counter turns a pair of dates into a day count and a year
//! fraction. Curves use one to map pillar dates onto times.

use pillar_core::{Real, Time};

use crate::date::{is_leap_year, Date};

/// A day-count convention.
pub trait DayCounter: std::fmt::Debug + Send + Sync {
    /// Human-readable name (e.g. `"Actual/360"`).
    fn name(&self) -> &str;

    /// Number of days between `d1` and `d2` under this convention.
    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        d1.days_between(d2)
    }

    /// Year fraction between `d1` and `d2`.
    fn year_fraction(&self, d1: Date, d2: Date) -> Time;
}

/// Actual/365 (Fixed).
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual365Fixed;

impl DayCounter for Actual365Fixed {
    fn name(&self) -> &str {
        "Actual/365 (Fixed)"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 365.0
    }
}

/// Actual/360.
#[derive(Debug, Clone, Copy, Default)]
pub struct Actual360;

impl DayCounter for Actual360 {
    fn name(&self) -> &str {
        "Actual/360"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// 30/360 (bond basis).
///
/// A 31st start day becomes the 30th; a 31st end day becomes the 30th when
/// the start day is the 30th or 31st.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thirty360;

impl DayCounter for Thirty360 {
    fn name(&self) -> &str {
        "30/360 (Bond Basis)"
    }

    fn day_count(&self, d1: Date, d2: Date) -> i64 {
        let dd1 = i64::from(d1.day_of_month().min(30));
        let mut dd2 = i64::from(d2.day_of_month());
        if dd2 == 31 && dd1 == 30 {
            dd2 = 30;
        }
        let years = i64::from(d2.year() - d1.year());
        let months = i64::from(d2.month()) - i64::from(d1.month());
        360 * years + 30 * months + (dd2 - dd1)
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        self.day_count(d1, d2) as Real / 360.0
    }
}

/// Actual/Actual (ISDA): days in each calendar year divided by that year's
/// length.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActualActualIsda;

impl DayCounter for ActualActualIsda {
    fn name(&self) -> &str {
        "Actual/Actual (ISDA)"
    }

    fn year_fraction(&self, d1: Date, d2: Date) -> Time {
        if d1 == d2 {
            return 0.0;
        }
        if d1 > d2 {
            return -self.year_fraction(d2, d1);
        }
        let year_length = |y: i32| if is_leap_year(y) { 366.0 } else { 365.0 };
        let (y1, y2) = (d1.year(), d2.year());
        let start_of = |y: i32| Date::from_ymd(y, 1, 1);
        match (start_of(y1 + 1), start_of(y2)) {
            (Ok(next_year), Ok(last_year)) if y1 != y2 => {
                d1.days_between(next_year) as Real / year_length(y1)
                    + Real::from(y2 - y1 - 1)
                    + last_year.days_between(d2) as Real / year_length(y2)
            }
            _ => d1.days_between(d2) as Real / year_length(y1),
        }
    }
}

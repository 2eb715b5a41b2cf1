//! TARGET, the settlement calendar of the euro area.

use chrono::{Datelike, NaiveDate};

use crate::calendar::Calendar;
use crate::date::Date;

/// TARGET calendar.
///
/// Holidays besides weekends: New Year's Day, Good Friday and Easter Monday
/// (from 2000), Labour Day (from 2000), Christmas, 26 December, and
/// 31 December in 1998, 1999 and 2001.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target;

impl Calendar for Target {
    fn name(&self) -> &str {
        "TARGET"
    }

    fn is_business_day(&self, date: Date) -> bool {
        if self.is_weekend(date.weekday()) {
            return false;
        }
        let (y, m, d) = (date.year(), date.month(), date.day_of_month());
        let easter = easter_sunday(y).map(|e| date.as_naive().signed_duration_since(e).num_days());
        let holiday = (m == 1 && d == 1)
            || (y >= 2000 && matches!(easter, Some(-2) | Some(1)))
            || (y >= 2000 && m == 5 && d == 1)
            || (m == 12 && (d == 25 || d == 26))
            || (m == 12 && d == 31 && matches!(y, 1998 | 1999 | 2001));
        !holiday
    }
}

/// Gregorian Easter Sunday (anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    let date = NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)?;
    debug_assert_eq!(date.weekday(), chrono::Weekday::Sun);
    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business_day_convention::BusinessDayConvention;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn easter_dates() {
        assert_eq!(easter_sunday(2023), NaiveDate::from_ymd_opt(2023, 4, 9));
        assert_eq!(easter_sunday(2024), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(easter_sunday(2025), NaiveDate::from_ymd_opt(2025, 4, 20));
    }

    #[test]
    fn fixed_holidays() {
        let cal = Target;
        assert!(cal.is_holiday(date(2023, 1, 1)));
        assert!(cal.is_holiday(date(2023, 5, 1)));
        assert!(cal.is_holiday(date(2023, 12, 25)));
        assert!(cal.is_holiday(date(2023, 12, 26)));
        assert!(cal.is_business_day(date(2023, 6, 15)));
    }

    #[test]
    fn easter_holidays() {
        let cal = Target;
        assert!(cal.is_holiday(date(2023, 4, 7)));
        assert!(cal.is_holiday(date(2023, 4, 10)));
        assert!(cal.is_business_day(date(2023, 4, 11)));
    }

    #[test]
    fn adjust_over_christmas() {
        // 25 and 26 December 2025 fall on Thursday and Friday
        let cal = Target;
        assert_eq!(
            cal.adjust(date(2025, 12, 25), BusinessDayConvention::Following),
            date(2025, 12, 29)
        );
    }
}

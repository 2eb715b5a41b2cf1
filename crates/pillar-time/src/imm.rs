//! IMM dates: the third Wednesday of March, June, September and December.

use chrono::Weekday;
use pillar_core::errors::Result;

use crate::date::Date;

/// IMM date utilities.
#[derive(Debug, Clone, Copy)]
pub struct Imm;

impl Imm {
    /// `true` if `date` is an IMM date.
    pub fn is_imm_date(date: Date) -> bool {
        matches!(date.month(), 3 | 6 | 9 | 12)
            && date.weekday() == Weekday::Wed
            && (15..=21).contains(&date.day_of_month())
    }

    /// The IMM date of the given quarterly month.
    pub fn date_of(year: i32, month: u32) -> Result<Date> {
        Date::nth_weekday(3, Weekday::Wed, year, month)
    }

    /// First IMM date on or after `date`, or strictly after it when
    /// `strict` is set.
    pub fn next_date(date: Date, strict: bool) -> Result<Date> {
        let (mut y, mut m) = (date.year(), date.month().div_ceil(3) * 3);
        loop {
            let candidate = Self::date_of(y, m)?;
            if candidate > date || (!strict && candidate == date) {
                return Ok(candidate);
            }
            m += 3;
            if m > 12 {
                m = 3;
                y += 1;
            }
        }
    }

    /// Two-character IMM code (`"H5"` for March 2025).
    pub fn code(date: Date) -> Option<String> {
        if !Self::is_imm_date(date) {
            return None;
        }
        let month = match date.month() {
            3 => 'H',
            6 => 'M',
            9 => 'U',
            _ => 'Z',
        };
        Some(format!("{month}{}", date.year().rem_euclid(10)))
    }
}

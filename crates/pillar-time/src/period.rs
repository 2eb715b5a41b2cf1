//! `Period`: a time span expressed in a [`TimeUnit`].

use std::str::FromStr;

use pillar_core::errors::{Error, Result};

use crate::frequency::Frequency;
use crate::time_unit::TimeUnit;

/// A time span made up of an integer length and a [`TimeUnit`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    /// Number of units.
    pub length: i32,
    /// The unit of time.
    pub unit: TimeUnit,
}

impl Period {
    /// Create a new period.
    pub fn new(length: i32, unit: TimeUnit) -> Self {
        Self { length, unit }
    }

    /// The period between two events of the given frequency.
    pub fn from_frequency(freq: Frequency) -> Result<Self> {
        match freq {
            Frequency::NoFrequency => Err(Error::InvalidArgument(format!(
                "cannot convert {freq} to a period"
            ))),
            Frequency::Once => Ok(Period::new(0, TimeUnit::Years)),
            Frequency::Annual => Ok(Period::new(1, TimeUnit::Years)),
            Frequency::Semiannual => Ok(Period::new(6, TimeUnit::Months)),
            Frequency::Quarterly => Ok(Period::new(3, TimeUnit::Months)),
            Frequency::Bimonthly => Ok(Period::new(2, TimeUnit::Months)),
            Frequency::Monthly => Ok(Period::new(1, TimeUnit::Months)),
            Frequency::Weekly => Ok(Period::new(1, TimeUnit::Weeks)),
            Frequency::Daily => Ok(Period::new(1, TimeUnit::Days)),
        }
    }

    /// The same span in the opposite direction.
    pub fn negated(self) -> Self {
        Self::new(-self.length, self.unit)
    }

    /// Length in months for month and year periods.
    pub fn months(self) -> Option<i32> {
        match self.unit {
            TimeUnit::Months => Some(self.length),
            TimeUnit::Years => Some(12 * self.length),
            TimeUnit::Days | TimeUnit::Weeks => None,
        }
    }
}

impl std::ops::Neg for Period {
    type Output = Self;
    fn neg(self) -> Self {
        self.negated()
    }
}

impl std::ops::Mul<i32> for Period {
    type Output = Self;
    fn mul(self, rhs: i32) -> Self {
        Self::new(self.length * rhs, self.unit)
    }
}

impl FromStr for Period {
    type Err = Error;

    /// Parse market notation such as `"3M"`, `"10Y"`, `"2W"` or `"1D"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((last, _)) = s.char_indices().last() else {
            return Err(Error::InvalidArgument("empty period".into()));
        };
        let (digits, unit) = s.split_at(last);
        let unit = match unit.to_ascii_uppercase().as_str() {
            "D" => TimeUnit::Days,
            "W" => TimeUnit::Weeks,
            "M" => TimeUnit::Months,
            "Y" => TimeUnit::Years,
            _ => return Err(Error::InvalidArgument(format!("unknown period unit in {s:?}"))),
        };
        let length = digits
            .parse::<i32>()
            .map_err(|_| Error::InvalidArgument(format!("invalid period length in {s:?}")))?;
        Ok(Period::new(length, unit))
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.length, self.unit)
    }
}

impl std::fmt::Debug for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Period({self})")
    }
}

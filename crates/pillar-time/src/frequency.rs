//! `Frequency`: how often events recur.

/// Payment or compounding frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Frequency {
    /// No frequency; only meaningful with simple or continuous compounding.
    NoFrequency,
    /// Once, at maturity.
    Once,
    /// Once a year.
    #[default]
    Annual,
    /// Twice a year.
    Semiannual,
    /// Four times a year.
    Quarterly,
    /// Six times a year.
    Bimonthly,
    /// Twelve times a year.
    Monthly,
    /// Fifty-two times a year.
    Weekly,
    /// Every day.
    Daily,
}

impl Frequency {
    /// Number of periods per year; `None` for `NoFrequency`.
    pub fn periods_per_year(&self) -> Option<u32> {
        match self {
            Frequency::NoFrequency => None,
            Frequency::Once => Some(0),
            Frequency::Annual => Some(1),
            Frequency::Semiannual => Some(2),
            Frequency::Quarterly => Some(4),
            Frequency::Bimonthly => Some(6),
            Frequency::Monthly => Some(12),
            Frequency::Weekly => Some(52),
            Frequency::Daily => Some(365),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::NoFrequency => "No-Frequency",
            Frequency::Once => "Once",
            Frequency::Annual => "Annual",
            Frequency::Semiannual => "Semiannual",
            Frequency::Quarterly => "Quarterly",
            Frequency::Bimonthly => "Bimonthly",
            Frequency::Monthly => "Monthly",
            Frequency::Weekly => "Weekly",
            Frequency::Daily => "Daily",
        };
        write!(f, "{s}")
    }
}

//! Business-day conventions.

/// How to adjust a date that falls on a non-business day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusinessDayConvention {
    /// First business day after the holiday.
    #[default]
    Following,
    /// First business day after the holiday unless it falls in the next
    /// month, in which case the first business day before it.
    ModifiedFollowing,
    /// First business day before the holiday.
    Preceding,
    /// First business day before the holiday unless it falls in the previous
    /// month, in which case the first business day after it.
    ModifiedPreceding,
    /// Keep the date as is.
    Unadjusted,
    /// Nearest business day; ties go forward.
    Nearest,
}

impl std::fmt::Display for BusinessDayConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BusinessDayConvention::Following => "Following",
            BusinessDayConvention::ModifiedFollowing => "Modified Following",
            BusinessDayConvention::Preceding => "Preceding",
            BusinessDayConvention::ModifiedPreceding => "Modified Preceding",
            BusinessDayConvention::Unadjusted => "Unadjusted",
            BusinessDayConvention::Nearest => "Nearest",
        };
        write!(f, "{s}")
    }
}

//! Property and integration tests for calendars, schedules and day counters.

use pillar_time::{
    Actual360, BusinessDayConvention, Calendar, Date, DayCounter, Period, ScheduleBuilder, Target,
    TimeUnit, WeekendsOnly,
};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> Date {
    Date::from_ymd(y, m, d).unwrap()
}

fn any_date() -> impl Strategy<Value = Date> {
    (0i32..20_000).prop_map(|n| date(2000, 1, 1) + n)
}

proptest! {
    #[test]
    fn following_lands_on_next_business_day(d in any_date()) {
        let cal = Target;
        let adjusted = cal.adjust(d, BusinessDayConvention::Following);
        prop_assert!(cal.is_business_day(adjusted));
        prop_assert!(adjusted >= d);
        prop_assert!(adjusted - d < 7);
    }

    #[test]
    fn modified_following_stays_in_month(d in any_date()) {
        let cal = Target;
        let adjusted = cal.adjust(d, BusinessDayConvention::ModifiedFollowing);
        prop_assert!(cal.is_business_day(adjusted));
        prop_assert_eq!(adjusted.month(), d.month());
    }

    #[test]
    fn schedules_are_strictly_increasing(d in any_date(), years in 1i32..30, months in prop::sample::select(vec![1, 3, 6, 12])) {
        let end = d.advance(years, TimeUnit::Years).unwrap();
        let s = ScheduleBuilder::new(d, end, Period::new(months, TimeUnit::Months), &Target)
            .build()
            .unwrap();
        prop_assert!(s.dates().windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(s.end_date(), Some(Target.adjust(end, BusinessDayConvention::ModifiedFollowing)));
    }
}

#[test]
fn spot_date_and_deposit_maturity() {
    // Thursday 28 March 2024, two TARGET days forward crosses Easter
    let today = date(2024, 3, 28);
    let spot = Target.advance_business_days(today, 2);
    assert_eq!(spot, date(2024, 4, 3));
    let maturity = Target
        .advance(spot, 3, TimeUnit::Months, BusinessDayConvention::ModifiedFollowing, false)
        .unwrap();
    assert_eq!(maturity, date(2024, 7, 3));
    assert_eq!(Actual360.day_count(spot, maturity), 91);
}

#[test]
fn weekends_only_end_of_month_roll() {
    // 30 June 2023 is a Friday and the last business day of June
    let d = WeekendsOnly
        .advance(date(2023, 6, 30), 3, TimeUnit::Months, BusinessDayConvention::Following, true)
        .unwrap();
    assert_eq!(d, date(2023, 9, 29));
}

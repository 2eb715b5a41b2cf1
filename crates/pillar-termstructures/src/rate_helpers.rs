//! Rate helpers for yield-curve bootstrapping.
//!
//! A *rate helper* wraps one market quote (deposit rate, FRA rate, futures
//! price, par swap rate) together with the conventions needed to price the
//! instrument off a curve. The bootstrap moves the curve value at each
//! helper's pillar date until the helper's implied quote matches the market
//! quote.
//!
//! Helpers built from explicit dates are fixed. Helpers built from a tenor
//! are defined relative to the evaluation date and recompute their dates in
//! [`RateHelper::initialize_dates`] whenever it moves.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use pillar_core::errors::Result;
use pillar_core::patterns::observable::Observer;
use pillar_core::{ensure, Natural, Real};
use pillar_quotes::Quote;
use pillar_time::{
    BusinessDayConvention, Calendar, Date, DateGeneration, DayCounter, Frequency, Imm, Period,
    Schedule, ScheduleBuilder, Settings, TimeUnit,
};

use crate::yield_term_structure::YieldTermStructure;

// ── RateHelper trait ──────────────────────────────────────────────────────────

/// A market instrument that constrains the yield curve at its pillar date.
pub trait RateHelper: std::fmt::Debug + Send + Sync {
    /// The quote the helper is calibrated to.
    fn quote(&self) -> &Arc<dyn Quote>;

    /// Current value of the quote; [`Error::InvalidQuote`] when unset.
    ///
    /// [`Error::InvalidQuote`]: pillar_core::Error::InvalidQuote
    fn market_quote(&self) -> Result<Real> {
        self.quote().try_value()
    }

    /// First date at which the curve is read.
    fn earliest_date(&self) -> Date;

    /// Last date at which the curve is read.
    fn latest_date(&self) -> Date;

    /// Date of the curve node this helper determines.
    fn pillar_date(&self) -> Date {
        self.latest_date()
    }

    /// The quote the instrument would have if priced off `curve`.
    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real>;

    /// `implied_quote - market_quote`.
    fn quote_error(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        Ok(self.implied_quote(curve)? - self.market_quote()?)
    }

    /// Recompute dates that depend on the evaluation date.
    fn initialize_dates(&self, _evaluation_date: Date) -> Result<()> {
        Ok(())
    }

    /// Subscribe `observer` to every input the helper reads.
    fn register_with(&self, observer: Weak<dyn Observer>) {
        self.quote().register_observer(observer);
    }
}

// ── Date bookkeeping ──────────────────────────────────────────────────────────

/// Dates of a helper, tagged with the evaluation date they were computed
/// for. Fixed helpers carry no evaluation date and never refresh.
#[derive(Debug)]
struct DateCell<D> {
    relative: bool,
    state: RwLock<(Option<Date>, D)>,
}

impl<D> DateCell<D> {
    fn fixed(dates: D) -> Self {
        Self {
            relative: false,
            state: RwLock::new((None, dates)),
        }
    }

    fn relative(evaluation_date: Date, dates: D) -> Self {
        Self {
            relative: true,
            state: RwLock::new((Some(evaluation_date), dates)),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard.1)
    }

    fn refresh(&self, evaluation_date: Date, compute: impl FnOnce(Date) -> Result<D>) -> Result<()> {
        if !self.relative {
            return Ok(());
        }
        {
            let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if guard.0 == Some(evaluation_date) {
                return Ok(());
            }
        }
        let dates = compute(evaluation_date)?;
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = (Some(evaluation_date), dates);
        Ok(())
    }

    fn register_with_settings(&self, observer: &Weak<dyn Observer>) {
        if self.relative {
            Settings::register_observer(observer.clone());
        }
    }
}

/// Start and end of a single accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: Date,
    end: Date,
}

impl Span {
    fn new(start: Date, end: Date) -> Result<Self> {
        ensure!(start < end, "start date {start} not before end date {end}");
        Ok(Self { start, end })
    }

    /// Simple forward rate over the span, with accrual under `day_counter`.
    fn forward(&self, curve: &dyn YieldTermStructure, day_counter: &dyn DayCounter) -> Result<Real> {
        let tau = day_counter.year_fraction(self.start, self.end);
        ensure!(tau > 0.0, "non-positive accrual from {} to {}", self.start, self.end);
        let compound = curve.discount_date(self.start)? / curve.discount_date(self.end)?;
        Ok((compound - 1.0) / tau)
    }
}

// ── DepositRateHelper ─────────────────────────────────────────────────────────

/// Conventions of a deposit quoted by tenor.
#[derive(Debug, Clone)]
struct DepositTerms {
    tenor: Period,
    fixing_days: Natural,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    end_of_month: bool,
}

impl DepositTerms {
    fn span(&self, evaluation_date: Date) -> Result<Span> {
        let today = self.calendar.adjust(evaluation_date, BusinessDayConvention::Following);
        let start = self.calendar.advance(
            today,
            self.fixing_days as i32,
            TimeUnit::Days,
            BusinessDayConvention::Following,
            false,
        )?;
        let end = self
            .calendar
            .advance_period(start, self.tenor, self.convention, self.end_of_month)?;
        Span::new(start, end)
    }
}

/// A money-market deposit: simple interest from start to maturity.
///
/// `implied = (P(start) / P(maturity) - 1) / τ(start, maturity)`.
#[derive(Debug)]
pub struct DepositRateHelper {
    quote: Arc<dyn Quote>,
    terms: Option<DepositTerms>,
    dates: DateCell<Span>,
    day_counter: Arc<dyn DayCounter>,
}

impl DepositRateHelper {
    /// A deposit with explicit start and maturity dates.
    pub fn new(
        quote: Arc<dyn Quote>,
        start: Date,
        maturity: Date,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Ok(Self {
            quote,
            terms: None,
            dates: DateCell::fixed(Span::new(start, maturity)?),
            day_counter,
        })
    }

    /// A deposit starting `fixing_days` business days after the evaluation
    /// date and maturing `tenor` later. Dates follow the evaluation date.
    #[allow(clippy::too_many_arguments)]
    pub fn from_tenor(
        quote: Arc<dyn Quote>,
        tenor: Period,
        fixing_days: Natural,
        calendar: Arc<dyn Calendar>,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(tenor.length > 0, "non-positive deposit tenor {tenor}");
        let terms = DepositTerms {
            tenor,
            fixing_days,
            calendar,
            convention,
            end_of_month,
        };
        let today = Settings::evaluation_date();
        let dates = DateCell::relative(today, terms.span(today)?);
        Ok(Self {
            quote,
            terms: Some(terms),
            dates,
            day_counter,
        })
    }

    /// Value date of the deposit.
    pub fn start_date(&self) -> Date {
        self.dates.with(|s| s.start)
    }

    /// Maturity of the deposit.
    pub fn maturity_date(&self) -> Date {
        self.dates.with(|s| s.end)
    }
}

impl RateHelper for DepositRateHelper {
    fn quote(&self) -> &Arc<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start_date()
    }

    fn latest_date(&self) -> Date {
        self.maturity_date()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let span = self.dates.with(|s| *s);
        span.forward(curve, &*self.day_counter)
    }

    fn initialize_dates(&self, evaluation_date: Date) -> Result<()> {
        match &self.terms {
            Some(terms) => self.dates.refresh(evaluation_date, |d| terms.span(d)),
            None => Ok(()),
        }
    }

    fn register_with(&self, observer: Weak<dyn Observer>) {
        self.dates.register_with_settings(&observer);
        self.quote.register_observer(observer);
    }
}

// ── FraRateHelper ─────────────────────────────────────────────────────────────

/// Conventions of an `m x n` FRA.
#[derive(Debug, Clone)]
struct FraTerms {
    months_to_start: Natural,
    months_to_end: Natural,
    fixing_days: Natural,
    calendar: Arc<dyn Calendar>,
    convention: BusinessDayConvention,
    end_of_month: bool,
}

impl FraTerms {
    fn span(&self, evaluation_date: Date) -> Result<Span> {
        let today = self.calendar.adjust(evaluation_date, BusinessDayConvention::Following);
        let spot = self.calendar.advance(
            today,
            self.fixing_days as i32,
            TimeUnit::Days,
            BusinessDayConvention::Following,
            false,
        )?;
        let start = self.calendar.advance(
            spot,
            self.months_to_start as i32,
            TimeUnit::Months,
            self.convention,
            self.end_of_month,
        )?;
        let end = self.calendar.advance(
            start,
            (self.months_to_end - self.months_to_start) as i32,
            TimeUnit::Months,
            self.convention,
            self.end_of_month,
        )?;
        Span::new(start, end)
    }
}

/// A forward rate agreement: simple forward over `[start, maturity]`.
#[derive(Debug)]
pub struct FraRateHelper {
    quote: Arc<dyn Quote>,
    terms: Option<FraTerms>,
    dates: DateCell<Span>,
    day_counter: Arc<dyn DayCounter>,
}

impl FraRateHelper {
    /// A FRA over explicit dates.
    pub fn new(
        quote: Arc<dyn Quote>,
        start: Date,
        maturity: Date,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Ok(Self {
            quote,
            terms: None,
            dates: DateCell::fixed(Span::new(start, maturity)?),
            day_counter,
        })
    }

    /// An `m x n` FRA: the forward period starts `months_to_start` months
    /// after spot and ends `months_to_end` months after spot.
    #[allow(clippy::too_many_arguments)]
    pub fn from_months(
        quote: Arc<dyn Quote>,
        months_to_start: Natural,
        months_to_end: Natural,
        fixing_days: Natural,
        calendar: Arc<dyn Calendar>,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(
            months_to_end > months_to_start,
            "FRA end ({months_to_end}M) must be after its start ({months_to_start}M)"
        );
        let terms = FraTerms {
            months_to_start,
            months_to_end,
            fixing_days,
            calendar,
            convention,
            end_of_month,
        };
        let today = Settings::evaluation_date();
        let dates = DateCell::relative(today, terms.span(today)?);
        Ok(Self {
            quote,
            terms: Some(terms),
            dates,
            day_counter,
        })
    }

    /// Start of the forward period.
    pub fn start_date(&self) -> Date {
        self.dates.with(|s| s.start)
    }

    /// End of the forward period.
    pub fn maturity_date(&self) -> Date {
        self.dates.with(|s| s.end)
    }
}

impl RateHelper for FraRateHelper {
    fn quote(&self) -> &Arc<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.start_date()
    }

    fn latest_date(&self) -> Date {
        self.maturity_date()
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let span = self.dates.with(|s| *s);
        span.forward(curve, &*self.day_counter)
    }

    fn initialize_dates(&self, evaluation_date: Date) -> Result<()> {
        match &self.terms {
            Some(terms) => self.dates.refresh(evaluation_date, |d| terms.span(d)),
            None => Ok(()),
        }
    }

    fn register_with(&self, observer: Weak<dyn Observer>) {
        self.dates.register_with_settings(&observer);
        self.quote.register_observer(observer);
    }
}

// ── FuturesRateHelper ─────────────────────────────────────────────────────────

/// An interest-rate future quoted as a price `100 * (1 - r)`.
///
/// The futures rate is the simple forward over the contract period plus a
/// convexity adjustment, which must not be negative.
#[derive(Debug)]
pub struct FuturesRateHelper {
    price: Arc<dyn Quote>,
    convexity: Option<Arc<dyn Quote>>,
    dates: Span,
    day_counter: Arc<dyn DayCounter>,
}

impl FuturesRateHelper {
    /// A future over explicit dates, without convexity adjustment.
    pub fn new(
        price: Arc<dyn Quote>,
        start: Date,
        end: Date,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Ok(Self {
            price,
            convexity: None,
            dates: Span::new(start, end)?,
            day_counter,
        })
    }

    /// A future starting on an IMM date and running `length_in_months`.
    pub fn imm(
        price: Arc<dyn Quote>,
        imm_date: Date,
        length_in_months: Natural,
        calendar: &dyn Calendar,
        convention: BusinessDayConvention,
        end_of_month: bool,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(Imm::is_imm_date(imm_date), "{imm_date} is not a valid IMM date");
        let end = calendar.advance(
            imm_date,
            length_in_months as i32,
            TimeUnit::Months,
            convention,
            end_of_month,
        )?;
        Self::new(price, imm_date, end, day_counter)
    }

    /// Add the convexity adjustment quote.
    #[must_use]
    pub fn with_convexity_adjustment(mut self, convexity: Arc<dyn Quote>) -> Self {
        self.convexity = Some(convexity);
        self
    }

    /// Current convexity adjustment; zero when none was given.
    pub fn convexity_adjustment(&self) -> Result<Real> {
        let Some(quote) = &self.convexity else {
            return Ok(0.0);
        };
        let adjustment = quote.try_value()?;
        ensure!(adjustment >= 0.0, "negative ({adjustment}) futures convexity adjustment");
        Ok(adjustment)
    }
}

impl RateHelper for FuturesRateHelper {
    fn quote(&self) -> &Arc<dyn Quote> {
        &self.price
    }

    fn earliest_date(&self) -> Date {
        self.dates.start
    }

    fn latest_date(&self) -> Date {
        self.dates.end
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        let forward = self.dates.forward(curve, &*self.day_counter)?;
        Ok(100.0 * (1.0 - (forward + self.convexity_adjustment()?)))
    }

    fn register_with(&self, observer: Weak<dyn Observer>) {
        if let Some(convexity) = &self.convexity {
            convexity.register_observer(observer.clone());
        }
        self.price.register_observer(observer);
    }
}

// ── SwapRateHelper ────────────────────────────────────────────────────────────

/// Conventions of a spot-starting swap quoted by tenor.
#[derive(Debug, Clone)]
struct SwapTerms {
    tenor: Period,
    settlement_days: Natural,
    calendar: Arc<dyn Calendar>,
    fixed_frequency: Frequency,
    fixed_convention: BusinessDayConvention,
}

impl SwapTerms {
    fn schedule(&self, evaluation_date: Date) -> Result<Schedule> {
        let today = self.calendar.adjust(evaluation_date, BusinessDayConvention::Following);
        let start = self.calendar.advance(
            today,
            self.settlement_days as i32,
            TimeUnit::Days,
            BusinessDayConvention::Following,
            false,
        )?;
        let end = start.advance_period(self.tenor)?;
        ScheduleBuilder::new(
            start,
            end,
            Period::from_frequency(self.fixed_frequency)?,
            &*self.calendar,
        )
        .with_convention(self.fixed_convention)
        .with_termination_convention(self.fixed_convention)
        .with_rule(DateGeneration::Backward)
        .build()
    }
}

/// Par rate of a fixed-vs-floating swap discounted and projected on the
/// same curve: `(P(start) - P(end)) / Σ τ_k P(t_k)` over the fixed leg.
#[derive(Debug)]
pub struct SwapRateHelper {
    quote: Arc<dyn Quote>,
    terms: Option<SwapTerms>,
    schedule: DateCell<Schedule>,
    fixed_day_counter: Arc<dyn DayCounter>,
}

fn checked(schedule: Schedule) -> Result<Schedule> {
    ensure!(schedule.size() >= 2, "swap schedule needs at least two dates");
    Ok(schedule)
}

impl SwapRateHelper {
    /// A swap over an explicit fixed-leg schedule.
    pub fn new(
        quote: Arc<dyn Quote>,
        fixed_schedule: Schedule,
        fixed_day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Ok(Self {
            quote,
            terms: None,
            schedule: DateCell::fixed(checked(fixed_schedule)?),
            fixed_day_counter,
        })
    }

    /// A spot-starting swap of the given tenor; the fixed schedule is
    /// generated backward from maturity and follows the evaluation date.
    #[allow(clippy::too_many_arguments)]
    pub fn from_tenor(
        quote: Arc<dyn Quote>,
        tenor: Period,
        settlement_days: Natural,
        calendar: Arc<dyn Calendar>,
        fixed_frequency: Frequency,
        fixed_convention: BusinessDayConvention,
        fixed_day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        ensure!(tenor.length > 0, "non-positive swap tenor {tenor}");
        let terms = SwapTerms {
            tenor,
            settlement_days,
            calendar,
            fixed_frequency,
            fixed_convention,
        };
        let today = Settings::evaluation_date();
        let schedule = DateCell::relative(today, checked(terms.schedule(today)?)?);
        Ok(Self {
            quote,
            terms: Some(terms),
            schedule,
            fixed_day_counter,
        })
    }

    /// Fixed-leg dates, start and maturity included.
    pub fn fixed_dates(&self) -> Vec<Date> {
        self.schedule.with(|s| s.dates().to_vec())
    }
}

impl RateHelper for SwapRateHelper {
    fn quote(&self) -> &Arc<dyn Quote> {
        &self.quote
    }

    fn earliest_date(&self) -> Date {
        self.schedule.with(|s| s.dates()[0])
    }

    fn latest_date(&self) -> Date {
        self.schedule.with(|s| s.dates()[s.size() - 1])
    }

    fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
        self.schedule.with(|schedule| -> Result<Real> {
            let dates = schedule.dates();
            let mut annuity = 0.0;
            for (start, end) in schedule.periods() {
                let tau = self.fixed_day_counter.year_fraction(start, end);
                annuity += tau * curve.discount_date(end)?;
            }
            ensure!(annuity > 0.0, "non-positive swap annuity ({annuity})");
            let floating = curve.discount_date(dates[0])? - curve.discount_date(dates[dates.len() - 1])?;
            Ok(floating / annuity)
        })
    }

    fn initialize_dates(&self, evaluation_date: Date) -> Result<()> {
        match &self.terms {
            Some(terms) => self
                .schedule
                .refresh(evaluation_date, |d| checked(terms.schedule(d)?)),
            None => Ok(()),
        }
    }

    fn register_with(&self, observer: Weak<dyn Observer>) {
        self.schedule.register_with_settings(&observer);
        self.quote.register_observer(observer);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_forward::FlatForward;
    use approx::assert_abs_diff_eq;
    use pillar_core::Error;
    use pillar_quotes::SimpleQuote;
    use pillar_time::{Actual360, Actual365Fixed, NullCalendar, ScopedEvaluationDate, Target, Thirty360};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn flat(today: Date, rate: Real) -> FlatForward {
        FlatForward::continuous(today, rate, Arc::new(Actual365Fixed)).unwrap()
    }

    fn quote(value: Real) -> Arc<dyn Quote> {
        SimpleQuote::shared(value)
    }

    #[test]
    fn deposit_prices_the_simple_forward() {
        let today = date(2025, 3, 3);
        let curve = flat(today, 0.03);
        let helper =
            DepositRateHelper::new(quote(0.02), today, date(2025, 9, 3), Arc::new(Actual360)).unwrap();
        let tau = Actual360.year_fraction(today, date(2025, 9, 3));
        let t = Actual365Fixed.year_fraction(today, date(2025, 9, 3));
        let expected = ((0.03 * t).exp() - 1.0) / tau;
        assert_abs_diff_eq!(helper.implied_quote(&curve).unwrap(), expected, epsilon = 1e-15);
        assert_abs_diff_eq!(
            helper.quote_error(&curve).unwrap(),
            expected - 0.02,
            epsilon = 1e-15
        );
        assert_eq!(helper.pillar_date(), date(2025, 9, 3));
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let d = date(2025, 3, 3);
        let err = DepositRateHelper::new(quote(0.02), d, d, Arc::new(Actual360)).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        let err = FraRateHelper::from_months(
            quote(0.02),
            6,
            3,
            2,
            Arc::new(Target),
            BusinessDayConvention::ModifiedFollowing,
            false,
            Arc::new(Actual360),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn empty_quote_surfaces_as_invalid_quote() {
        let today = date(2025, 3, 3);
        let helper = DepositRateHelper::new(
            Arc::new(SimpleQuote::empty()),
            today,
            date(2026, 3, 3),
            Arc::new(Actual360),
        )
        .unwrap();
        assert!(matches!(helper.market_quote(), Err(Error::InvalidQuote(_))));
        assert!(matches!(
            helper.quote_error(&flat(today, 0.01)),
            Err(Error::InvalidQuote(_))
        ));
    }

    #[test]
    fn relative_deposit_follows_the_evaluation_date() {
        let _guard = ScopedEvaluationDate::new(date(2025, 1, 6));
        let helper = DepositRateHelper::from_tenor(
            quote(0.02),
            Period::new(3, TimeUnit::Months),
            2,
            Arc::new(Target),
            BusinessDayConvention::ModifiedFollowing,
            false,
            Arc::new(Actual360),
        )
        .unwrap();
        assert_eq!(helper.start_date(), date(2025, 1, 8));
        assert_eq!(helper.maturity_date(), date(2025, 4, 8));

        // Saturday rolls to Monday before spot lag is added
        helper.initialize_dates(date(2025, 1, 11)).unwrap();
        assert_eq!(helper.start_date(), date(2025, 1, 15));
        assert_eq!(helper.maturity_date(), date(2025, 4, 15));
    }

    #[test]
    fn fixed_helpers_ignore_the_evaluation_date() {
        let helper = FraRateHelper::new(
            quote(0.02),
            date(2025, 6, 2),
            date(2025, 12, 2),
            Arc::new(Actual360),
        )
        .unwrap();
        helper.initialize_dates(date(2030, 1, 1)).unwrap();
        assert_eq!(helper.earliest_date(), date(2025, 6, 2));
        assert_eq!(helper.latest_date(), date(2025, 12, 2));
    }

    #[test]
    fn fra_spans_m_by_n_months() {
        let _guard = ScopedEvaluationDate::new(date(2025, 1, 6));
        let helper = FraRateHelper::from_months(
            quote(0.02),
            3,
            9,
            2,
            Arc::new(Target),
            BusinessDayConvention::ModifiedFollowing,
            false,
            Arc::new(Actual360),
        )
        .unwrap();
        assert_eq!(helper.start_date(), date(2025, 4, 8));
        assert_eq!(helper.maturity_date(), date(2025, 10, 8));
    }

    #[test]
    fn futures_price_includes_convexity() {
        let today = date(2025, 1, 2);
        let curve = flat(today, 0.03);
        let imm = date(2025, 3, 19);
        let convexity = SimpleQuote::shared(0.0005);
        let helper = FuturesRateHelper::imm(
            quote(97.0),
            imm,
            3,
            &NullCalendar,
            BusinessDayConvention::ModifiedFollowing,
            false,
            Arc::new(Actual360),
        )
        .unwrap()
        .with_convexity_adjustment(convexity.clone());
        assert_eq!(helper.latest_date(), date(2025, 6, 19));
        let forward = helper.dates.forward(&curve, &Actual360).unwrap();
        assert_abs_diff_eq!(
            helper.implied_quote(&curve).unwrap(),
            100.0 * (1.0 - forward - 0.0005),
            epsilon = 1e-12
        );

        convexity.set_value(-0.0001);
        assert!(matches!(helper.implied_quote(&curve), Err(Error::Precondition(_))));
    }

    #[test]
    fn futures_require_an_imm_date() {
        let err = FuturesRateHelper::imm(
            quote(97.0),
            date(2025, 3, 18),
            3,
            &NullCalendar,
            BusinessDayConvention::Following,
            false,
            Arc::new(Actual360),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn swap_par_rate_on_a_flat_curve() {
        let _guard = ScopedEvaluationDate::new(date(2025, 1, 6));
        let helper = SwapRateHelper::from_tenor(
            quote(0.03),
            Period::new(5, TimeUnit::Years),
            2,
            Arc::new(Target),
            Frequency::Annual,
            BusinessDayConvention::ModifiedFollowing,
            Arc::new(Thirty360),
        )
        .unwrap();
        let dates = helper.fixed_dates();
        assert_eq!(dates.len(), 6);
        assert_eq!(helper.earliest_date(), date(2025, 1, 8));
        assert_eq!(helper.latest_date(), date(2030, 1, 8));

        let curve = flat(date(2025, 1, 6), 0.03);
        let annuity: Real = dates
            .windows(2)
            .map(|w| Thirty360.year_fraction(w[0], w[1]) * curve.discount_date(w[1]).unwrap())
            .sum();
        let expected = (curve.discount_date(dates[0]).unwrap()
            - curve.discount_date(dates[5]).unwrap())
            / annuity;
        assert_abs_diff_eq!(helper.implied_quote(&curve).unwrap(), expected, epsilon = 1e-15);
    }

    #[derive(Default)]
    struct Hits(std::sync::atomic::AtomicUsize);

    impl Observer for Hits {
        fn update(&self) {
            self.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        }
    }

    #[test]
    fn helpers_register_every_quote() {
        let price = SimpleQuote::shared(97.0);
        let convexity = SimpleQuote::shared(0.0);
        let helper = FuturesRateHelper::new(
            price.clone(),
            date(2025, 3, 19),
            date(2025, 6, 19),
            Arc::new(Actual360),
        )
        .unwrap()
        .with_convexity_adjustment(convexity.clone());
        let hits = Arc::new(Hits::default());
        let weak: Weak<dyn Observer> = Arc::downgrade(&hits) as Weak<dyn Observer>;
        helper.register_with(weak);
        price.set_value(97.5);
        convexity.set_value(0.001);
        assert_eq!(hits.0.load(std::sync::atomic::Ordering::Relaxed), 2);
    }
}

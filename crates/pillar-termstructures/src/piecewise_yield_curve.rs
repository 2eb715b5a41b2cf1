//! `PiecewiseYieldCurve`: a yield curve bootstrapped from market instruments.
//!
//! The curve stores one value per instrument pillar (discount factor, zero
//! rate or instantaneous forward, depending on the bootstrap traits `T`) and
//! interpolates between them with `I`. Values are found by the bootstrap `B`
//! so that every helper reprices its quote.
//!
//! Calculation is lazy. The curve observes its helpers' quotes (and the
//! evaluation date when its dates depend on it); a notification marks it
//! dirty and the next query bootstraps again. A failed bootstrap leaves the
//! curve dirty, so every query keeps reporting the error until the inputs
//! are fixed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use pillar_math::LogLinear;
//! use pillar_quotes::SimpleQuote;
//! use pillar_termstructures::{
//!     Discount, DepositRateHelper, PiecewiseYieldCurve, RateHelper, YieldTermStructure,
//! };
//! use pillar_time::{Actual360, Actual365Fixed, Date};
//!
//! let today = Date::from_ymd(2025, 1, 2).unwrap();
//! let helpers: Vec<Arc<dyn RateHelper>> = vec![
//!     Arc::new(DepositRateHelper::new(
//!         SimpleQuote::shared(0.04),
//!         today,
//!         Date::from_ymd(2025, 7, 2).unwrap(),
//!         Arc::new(Actual360),
//!     ).unwrap()),
//!     Arc::new(DepositRateHelper::new(
//!         SimpleQuote::shared(0.045),
//!         today,
//!         Date::from_ymd(2026, 1, 2).unwrap(),
//!         Arc::new(Actual360),
//!     ).unwrap()),
//! ];
//! let curve = PiecewiseYieldCurve::<Discount, LogLinear>::new(
//!     today,
//!     helpers,
//!     Arc::new(Actual365Fixed),
//! ).unwrap();
//! assert!(curve.discount(0.5).unwrap() < 1.0);
//! ```

use std::sync::{Arc, PoisonError, RwLock, Weak};

use pillar_core::errors::{Error, Result};
use pillar_core::patterns::observable::{Observable, Observer};
use pillar_core::{ensure, DiscountFactor, LazyObject, LazyState, Natural, Real, Time};
use pillar_math::{Interpolator, Linear};
use pillar_quotes::Quote;
use pillar_time::{BusinessDayConvention, Calendar, Date, DayCounter, NullCalendar, Settings};
use tracing::debug;

use crate::bootstrap_curve::{CurveContext, CurveNodes};
use crate::bootstrap_traits::BootstrapTraits;
use crate::iterative_bootstrap::{Bootstrap, BootstrapInput, BootstrapReport, IterativeBootstrap};
use crate::rate_helpers::RateHelper;
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// Default absolute accuracy on every helper's quote error.
pub const DEFAULT_ACCURACY: Real = 1.0e-12;

/// How the reference date is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Fixed(Date),
    /// `settlement_days` business days after the evaluation date.
    Moving { settlement_days: Natural },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum JumpDates {
    /// December 31st of successive years, starting with the reference year.
    Default,
    Explicit(Vec<Date>),
}

/// Published result of a successful calculation.
#[derive(Debug)]
struct CurveState {
    context: CurveContext,
    nodes: CurveNodes,
    report: BootstrapReport,
}

/// A yield curve bootstrapped from rate helpers.
///
/// `T` selects the interpolated quantity ([`Discount`], [`ZeroYield`],
/// [`ForwardRate`]), `I` the interpolation scheme and `B` the bootstrap
/// algorithm.
///
/// [`Discount`]: crate::Discount
/// [`ZeroYield`]: crate::ZeroYield
/// [`ForwardRate`]: crate::ForwardRate
#[derive(Debug)]
pub struct PiecewiseYieldCurve<T, I = Linear, B = IterativeBootstrap> {
    anchor: Anchor,
    calendar: Arc<dyn Calendar>,
    day_counter: Arc<dyn DayCounter>,
    helpers: Vec<Arc<dyn RateHelper>>,
    interpolator: I,
    bootstrap: B,
    accuracy: Real,
    jumps: Vec<Arc<dyn Quote>>,
    jump_dates: JumpDates,
    lazy: Arc<LazyState>,
    state: RwLock<Option<Arc<CurveState>>>,
    _traits: std::marker::PhantomData<fn() -> T>,
}

/// Sort helpers by pillar and reject duplicated pillars.
fn sorted(mut helpers: Vec<Arc<dyn RateHelper>>) -> Result<Vec<Arc<dyn RateHelper>>> {
    ensure!(!helpers.is_empty(), "no instruments given");
    helpers.sort_by_key(|h| h.pillar_date());
    for pair in helpers.windows(2) {
        let pillar = pair[1].pillar_date();
        ensure!(
            pair[0].pillar_date() != pillar,
            "more than one instrument with pillar {pillar}"
        );
    }
    Ok(helpers)
}

impl<T: BootstrapTraits, I: Interpolator, B: Bootstrap> PiecewiseYieldCurve<T, I, B> {
    fn build(
        anchor: Anchor,
        calendar: Arc<dyn Calendar>,
        helpers: Vec<Arc<dyn RateHelper>>,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        let helpers = sorted(helpers)?;
        let interpolator = I::default();
        let bootstrap = B::default();
        bootstrap.setup(&helpers, &interpolator)?;

        let lazy = Arc::new(LazyState::new());
        let observer: Weak<dyn Observer> = Arc::downgrade(&lazy) as Weak<dyn Observer>;
        for helper in &helpers {
            helper.register_with(observer.clone());
        }
        if let Anchor::Moving { .. } = anchor {
            Settings::register_observer(observer);
        }
        Ok(Self {
            anchor,
            calendar,
            day_counter,
            helpers,
            interpolator,
            bootstrap,
            accuracy: DEFAULT_ACCURACY,
            jumps: Vec::new(),
            jump_dates: JumpDates::Default,
            lazy,
            state: RwLock::new(None),
            _traits: std::marker::PhantomData,
        })
    }

    /// A curve with a fixed reference date.
    pub fn new(
        reference_date: Date,
        helpers: Vec<Arc<dyn RateHelper>>,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Self::build(
            Anchor::Fixed(reference_date),
            Arc::new(NullCalendar),
            helpers,
            day_counter,
        )
    }

    /// A curve whose reference date is `settlement_days` business days
    /// after the evaluation date, following it as it changes.
    pub fn moving(
        settlement_days: Natural,
        calendar: Arc<dyn Calendar>,
        helpers: Vec<Arc<dyn RateHelper>>,
        day_counter: Arc<dyn DayCounter>,
    ) -> Result<Self> {
        Self::build(Anchor::Moving { settlement_days }, calendar, helpers, day_counter)
    }

    /// Absolute accuracy required of every helper.
    #[must_use]
    pub fn with_accuracy(mut self, accuracy: Real) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Use a configured interpolator instance.
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: I) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Use a configured bootstrap, checking it against the helpers.
    pub fn with_bootstrap(mut self, bootstrap: B) -> Result<Self> {
        bootstrap.setup(&self.helpers, &self.interpolator)?;
        self.bootstrap = bootstrap;
        Ok(self)
    }

    /// Discount-factor jumps. Each quote multiplies discount factors after
    /// its date. With no dates, jumps fall on December 31st of successive
    /// years starting with the reference year.
    pub fn with_jumps(mut self, quotes: Vec<Arc<dyn Quote>>, dates: Vec<Date>) -> Result<Self> {
        let jump_dates = if dates.is_empty() {
            JumpDates::Default
        } else {
            ensure!(
                dates.len() == quotes.len(),
                "mismatch between number of jumps ({}) and jump dates ({})",
                quotes.len(),
                dates.len()
            );
            for pair in dates.windows(2) {
                ensure!(
                    pair[0] < pair[1],
                    "jump dates not strictly increasing: {} then {}",
                    pair[0],
                    pair[1]
                );
            }
            JumpDates::Explicit(dates)
        };
        let observer: Weak<dyn Observer> = Arc::downgrade(&self.lazy) as Weak<dyn Observer>;
        for quote in &quotes {
            quote.register_observer(observer.clone());
        }
        self.jumps = quotes;
        self.jump_dates = jump_dates;
        self.lazy.update();
        Ok(self)
    }

    /// Use `calendar` for date adjustments and, for moving curves, to find
    /// the reference date.
    #[must_use]
    pub fn with_calendar(mut self, calendar: Arc<dyn Calendar>) -> Self {
        self.calendar = calendar;
        self
    }

    /// Absolute accuracy required of every helper.
    pub fn accuracy(&self) -> Real {
        self.accuracy
    }

    /// The helpers, sorted by pillar date.
    pub fn helpers(&self) -> &[Arc<dyn RateHelper>] {
        &self.helpers
    }

    /// The bootstrap algorithm.
    pub fn bootstrap(&self) -> &B {
        &self.bootstrap
    }

    /// Pillar dates, the reference date first.
    pub fn dates(&self) -> Result<Vec<Date>> {
        Ok(self.current()?.nodes.dates().to_vec())
    }

    /// Pillar times.
    pub fn times(&self) -> Result<Vec<Time>> {
        Ok(self.current()?.nodes.times().to_vec())
    }

    /// Pillar values of the interpolated quantity.
    pub fn data(&self) -> Result<Vec<Real>> {
        Ok(self.current()?.nodes.data().to_vec())
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Result<Vec<(Date, Real)>> {
        Ok(self.current()?.nodes.nodes())
    }

    /// How each pillar of the last calculation was resolved.
    pub fn bootstrap_report(&self) -> Result<BootstrapReport> {
        Ok(self.current()?.report.clone())
    }

    /// Mark the curve dirty and notify its observers.
    pub fn invalidate(&self) {
        LazyObject::update(self);
    }

    fn published(&self) -> Option<Arc<CurveState>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calculate if needed and return the published state.
    fn current(&self) -> Result<Arc<CurveState>> {
        self.calculate()?;
        self.published()
            .ok_or_else(|| Error::Runtime("curve is frozen and has never been calculated".into()))
    }

    fn jump_nodes(&self, reference_date: Date) -> Result<Vec<(Time, Real)>> {
        let dates = match &self.jump_dates {
            JumpDates::Explicit(dates) => dates.clone(),
            JumpDates::Default => (0..self.jumps.len())
                .map(|k| Date::from_ymd(reference_date.year() + k as i32, 12, 31))
                .collect::<Result<Vec<_>>>()?,
        };
        self.jumps
            .iter()
            .zip(dates)
            .map(|(quote, date)| {
                let value = quote.try_value()?;
                ensure!(value > 0.0, "non-positive jump value ({value}) on {date}");
                Ok((self.day_counter.year_fraction(reference_date, date), value))
            })
            .collect()
    }
}

impl<T: BootstrapTraits, I: Interpolator, B: Bootstrap> LazyObject for PiecewiseYieldCurve<T, I, B> {
    fn lazy_state(&self) -> &LazyState {
        &self.lazy
    }

    fn perform_calculations(&self) -> Result<()> {
        ensure!(self.accuracy > 0.0, "non-positive accuracy ({})", self.accuracy);
        let evaluation_date = Settings::evaluation_date();
        let mut helpers = self.helpers.clone();
        for helper in &helpers {
            helper.initialize_dates(evaluation_date)?;
        }
        helpers.sort_by_key(|h| h.pillar_date());

        let reference_date = self.reference_date();
        let context = CurveContext {
            reference_date,
            day_counter: Arc::clone(&self.day_counter),
            calendar: Arc::clone(&self.calendar),
            jumps: self.jump_nodes(reference_date)?,
        };
        let previous = self.published();
        let previous_nodes = previous
            .as_deref()
            .filter(|s| s.context.reference_date == reference_date)
            .map(|s| &s.nodes);
        let input = BootstrapInput {
            context: &context,
            helpers: &helpers,
            interpolator: &self.interpolator,
            accuracy: self.accuracy,
        };
        let outcome = self.bootstrap.calculate::<T, I>(&input, previous_nodes)?;
        debug!(
            traits = T::NAME,
            reference = %reference_date,
            pillars = outcome.nodes.len() - 1,
            "curve published"
        );
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(CurveState {
            context,
            nodes: outcome.nodes,
            report: outcome.report,
        }));
        Ok(())
    }
}

impl<T: BootstrapTraits, I: Interpolator, B: Bootstrap> TermStructure for PiecewiseYieldCurve<T, I, B> {
    fn reference_date(&self) -> Date {
        match self.anchor {
            Anchor::Fixed(date) => date,
            Anchor::Moving { settlement_days } => {
                let today = Settings::evaluation_date();
                if settlement_days == 0 {
                    self.calendar.adjust(today, BusinessDayConvention::Following)
                } else {
                    self.calendar
                        .advance_business_days(today, settlement_days as i32)
                }
            }
        }
    }

    fn day_counter(&self) -> &Arc<dyn DayCounter> {
        &self.day_counter
    }

    fn calendar(&self) -> &dyn Calendar {
        &*self.calendar
    }

    fn max_date(&self) -> Result<Date> {
        let state = self.current()?;
        let dates = state.nodes.dates();
        Ok(dates[dates.len() - 1])
    }
}

impl<T: BootstrapTraits, I: Interpolator, B: Bootstrap> YieldTermStructure
    for PiecewiseYieldCurve<T, I, B>
{
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        let state = self.current()?;
        state.nodes.view::<T>(&state.context)?.discount_impl(t)
    }
}

impl<T, I, B> Observable for PiecewiseYieldCurve<T, I, B> {
    fn register_observer(&self, observer: Weak<dyn Observer>) {
        self.lazy.register_observer(observer);
    }

    fn unregister_observer(&self, observer: &Weak<dyn Observer>) {
        self.lazy.unregister_observer(observer);
    }

    fn notify_observers(&self) {
        self.lazy.notify_observers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap_traits::Discount;
    use crate::rate_helpers::DepositRateHelper;
    use approx::assert_abs_diff_eq;
    use pillar_math::LogLinear;
    use pillar_quotes::SimpleQuote;
    use pillar_time::{Actual360, Actual365Fixed};

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn deposit(quote: Arc<SimpleQuote>, start: Date, end: Date) -> Arc<dyn RateHelper> {
        Arc::new(DepositRateHelper::new(quote, start, end, Arc::new(Actual360)).unwrap())
    }

    #[test]
    fn duplicate_pillars_are_rejected_before_solving() {
        let today = date(2025, 1, 2);
        let helpers = vec![
            deposit(SimpleQuote::shared(0.03), today, date(2026, 1, 2)),
            deposit(SimpleQuote::shared(0.04), date(2025, 1, 3), date(2026, 1, 2)),
        ];
        let err = PiecewiseYieldCurve::<Discount, LogLinear>::new(today, helpers, Arc::new(Actual365Fixed))
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn empty_helper_list_is_rejected() {
        let err = PiecewiseYieldCurve::<Discount, LogLinear>::new(
            date(2025, 1, 2),
            Vec::new(),
            Arc::new(Actual365Fixed),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn quote_changes_mark_the_curve_dirty() {
        let today = date(2025, 1, 2);
        let quote = SimpleQuote::shared(0.05);
        let curve = PiecewiseYieldCurve::<Discount, LogLinear>::new(
            today,
            vec![deposit(quote.clone(), today, date(2026, 1, 2))],
            Arc::new(Actual365Fixed),
        )
        .unwrap();
        assert!(!curve.is_calculated());
        let before = curve.discount(1.0).unwrap();
        assert!(curve.is_calculated());
        quote.set_value(0.06);
        assert!(!curve.is_calculated());
        let after = curve.discount(1.0).unwrap();
        assert_abs_diff_eq!(before, 1.0 / (1.0 + 0.05 * 365.0 / 360.0), epsilon = 1e-12);
        assert_abs_diff_eq!(after, 1.0 / (1.0 + 0.06 * 365.0 / 360.0), epsilon = 1e-12);
    }

    #[test]
    fn frozen_curve_without_results_reports_an_error() {
        let today = date(2025, 1, 2);
        let curve = PiecewiseYieldCurve::<Discount, LogLinear>::new(
            today,
            vec![deposit(SimpleQuote::shared(0.05), today, date(2026, 1, 2))],
            Arc::new(Actual365Fixed),
        )
        .unwrap();
        curve.freeze();
        assert!(matches!(curve.discount(0.5), Err(Error::Runtime(_))));
        curve.unfreeze();
        assert!(curve.discount(0.5).is_ok());
    }

    #[test]
    fn jump_arrays_are_checked() {
        let today = date(2025, 1, 2);
        let make = || {
            PiecewiseYieldCurve::<Discount, LogLinear>::new(
                today,
                vec![deposit(SimpleQuote::shared(0.05), today, date(2026, 1, 2))],
                Arc::new(Actual365Fixed),
            )
            .unwrap()
        };
        let jump: Arc<dyn Quote> = SimpleQuote::shared(0.99);
        let err = make()
            .with_jumps(vec![jump.clone()], vec![date(2025, 6, 30), date(2025, 12, 31)])
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
        let err = make()
            .with_jumps(
                vec![jump.clone(), jump.clone()],
                vec![date(2025, 12, 31), date(2025, 6, 30)],
            )
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn default_jump_dates_are_year_ends() {
        let today = date(2025, 3, 3);
        let jumps: Vec<Arc<dyn Quote>> = vec![SimpleQuote::shared(0.99), SimpleQuote::shared(0.98)];
        let curve = PiecewiseYieldCurve::<Discount, LogLinear>::new(
            today,
            vec![deposit(SimpleQuote::shared(0.05), today, date(2027, 3, 3))],
            Arc::new(Actual365Fixed),
        )
        .unwrap()
        .with_jumps(jumps, Vec::new())
        .unwrap();
        let jumps = curve.jump_nodes(today).unwrap();
        assert_eq!(jumps.len(), 2);
        assert_abs_diff_eq!(jumps[0].0, Actual365Fixed.year_fraction(today, date(2025, 12, 31)));
        assert_abs_diff_eq!(jumps[1].0, Actual365Fixed.year_fraction(today, date(2026, 12, 31)));
        assert_eq!(jumps[1].1, 0.98);
    }
}

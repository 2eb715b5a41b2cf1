//! Curve state shared by the bootstrap and the published curve.
//!
//! [`CurveNodes`] holds the pillar dates, times and values together with
//! the interpolation over them. [`CurveContext`] carries what does not
//! change during one calculation: reference date, conventions and jumps.
//! [`BootstrapCurve`] joins the two into a read-only yield term structure
//! that rate helpers price against.

use std::marker::PhantomData;
use std::sync::Arc;

use pillar_core::errors::{Error, Result};
use pillar_core::{DiscountFactor, Real, Time};
use pillar_math::{Interpolation1D, Interpolator, Linear};
use pillar_time::{Calendar, Date, DayCounter};

use crate::bootstrap_traits::{BootstrapTraits, RateBounds};
use crate::rate_helpers::RateHelper;
use crate::term_structure::TermStructure;
use crate::yield_term_structure::YieldTermStructure;

/// Conventions and jumps fixed for the length of one calculation.
#[derive(Debug, Clone)]
pub struct CurveContext {
    /// Date of time zero.
    pub reference_date: Date,
    /// Date to time conversion.
    pub day_counter: Arc<dyn DayCounter>,
    /// Calendar for date adjustments.
    pub calendar: Arc<dyn Calendar>,
    /// Jump times and factors, in increasing time order.
    pub jumps: Vec<(Time, Real)>,
}

impl CurveContext {
    /// Product of the jump factors strictly between time zero and `t`.
    pub fn jump_effect(&self, t: Time) -> Real {
        self.jumps
            .iter()
            .take_while(|(jt, _)| *jt < t)
            .filter(|(jt, _)| *jt > 0.0)
            .map(|(_, v)| v)
            .product()
    }

    /// Year fraction from the reference date to `date`.
    pub fn time_from_reference(&self, date: Date) -> Time {
        self.day_counter.year_fraction(self.reference_date, date)
    }
}

/// Pillars of a piecewise curve and the interpolation over them.
#[derive(Debug)]
pub struct CurveNodes {
    pub(crate) dates: Vec<Date>,
    pub(crate) times: Vec<Time>,
    pub(crate) data: Vec<Real>,
    pub(crate) interpolation: Option<Box<dyn Interpolation1D>>,
}

/// Which interpolation to rebuild the nodes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scheme {
    /// The curve's own interpolator.
    Target,
    /// Linear, used for partial curves of global schemes.
    Linear,
}

impl CurveNodes {
    /// Nodes at the given dates, all values set to `initial`.
    pub(crate) fn new(context: &CurveContext, dates: Vec<Date>, initial: Real) -> Self {
        let times = dates.iter().map(|d| context.time_from_reference(*d)).collect();
        let data = vec![initial; dates.len()];
        Self {
            dates,
            times,
            data,
            interpolation: None,
        }
    }

    /// Pillar dates, the first being the curve's initial date.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Pillar times.
    pub fn times(&self) -> &[Time] {
        &self.times
    }

    /// Pillar values.
    pub fn data(&self) -> &[Real] {
        &self.data
    }

    /// `(date, value)` pairs.
    pub fn nodes(&self) -> Vec<(Date, Real)> {
        self.dates.iter().copied().zip(self.data.iter().copied()).collect()
    }

    /// Number of pillars, including the initial node.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// `true` when there are no pillars at all.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Rebuild the interpolation over pillars `0..=last`.
    pub(crate) fn interpolate<I: Interpolator>(
        &mut self,
        interpolator: &I,
        scheme: Scheme,
        last: usize,
    ) -> Result<()> {
        let xs = &self.times[..=last];
        let ys = &self.data[..=last];
        self.interpolation = Some(match scheme {
            Scheme::Target => interpolator.build(xs, ys)?,
            Scheme::Linear => Linear.build(xs, ys)?,
        });
        Ok(())
    }

    /// A read-only yield curve over the current interpolation.
    pub(crate) fn view<'a, T: BootstrapTraits>(
        &'a self,
        context: &'a CurveContext,
    ) -> Result<BootstrapCurve<'a, T>> {
        let interpolation = self
            .interpolation
            .as_deref()
            .ok_or_else(|| Error::Runtime("curve nodes are not interpolated".into()))?;
        let last = self
            .times
            .iter()
            .rposition(|t| *t <= interpolation.x_max())
            .unwrap_or(0);
        Ok(BootstrapCurve {
            context,
            interpolation,
            max_date: self.dates[last],
            _traits: PhantomData,
        })
    }
}

/// Read-only yield term structure over interpolated pillars.
///
/// Beyond the last interpolated pillar discount factors are extrapolated
/// with a flat instantaneous forward; jumps multiply the result.
#[derive(Debug)]
pub struct BootstrapCurve<'a, T> {
    context: &'a CurveContext,
    interpolation: &'a dyn Interpolation1D,
    max_date: Date,
    _traits: PhantomData<fn() -> T>,
}

impl<T: BootstrapTraits> TermStructure for BootstrapCurve<'_, T> {
    fn reference_date(&self) -> Date {
        self.context.reference_date
    }

    fn day_counter(&self) -> &Arc<dyn DayCounter> {
        &self.context.day_counter
    }

    fn calendar(&self) -> &dyn Calendar {
        &*self.context.calendar
    }

    fn max_date(&self) -> Result<Date> {
        Ok(self.max_date)
    }
}

impl<T: BootstrapTraits> YieldTermStructure for BootstrapCurve<'_, T> {
    fn discount_impl(&self, t: Time) -> Result<DiscountFactor> {
        Ok(T::discount(self.interpolation, t) * self.context.jump_effect(t))
    }
}

/// Mutable curve owned by one bootstrap run.
///
/// Pillar `i >= 1` belongs to `helpers[i - 1]`. While `partial` is set the
/// interpolation only reaches the pillar being solved.
#[derive(Debug)]
pub(crate) struct WorkingCurve<'a, T, I> {
    pub context: &'a CurveContext,
    pub helpers: &'a [Arc<dyn RateHelper>],
    pub interpolator: &'a I,
    pub nodes: CurveNodes,
    pub scheme: Scheme,
    pub partial: bool,
    /// Values already stored are trusted as guesses (warm start or later
    /// passes of a global scheme).
    pub valid: bool,
    /// Tail values left by a penalty solve, reused as guesses.
    pub hinted: Vec<bool>,
    _traits: PhantomData<fn() -> T>,
}

impl<'a, T: BootstrapTraits, I: Interpolator> WorkingCurve<'a, T, I> {
    pub fn new(
        context: &'a CurveContext,
        helpers: &'a [Arc<dyn RateHelper>],
        interpolator: &'a I,
        nodes: CurveNodes,
    ) -> Self {
        let hinted = vec![false; nodes.len()];
        Self {
            context,
            helpers,
            interpolator,
            nodes,
            scheme: Scheme::Target,
            partial: true,
            valid: false,
            hinted,
            _traits: PhantomData,
        }
    }

    /// Index of the last pillar.
    pub fn last(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Store a value for pillar `i` without touching the interpolation.
    pub fn store(&mut self, i: usize, value: Real) {
        T::update_guess(&mut self.nodes.data, value, i);
    }

    /// Rebuild the interpolation as needed to price helper `i`.
    pub fn interpolate_for(&mut self, i: usize) -> Result<()> {
        let last = if self.partial { i } else { self.last() };
        self.interpolate_through(last)
    }

    /// Rebuild the interpolation over pillars `0..=last`.
    pub fn interpolate_through(&mut self, last: usize) -> Result<()> {
        self.nodes.interpolate(self.interpolator, self.scheme, last)
    }

    /// Quote error of helper `i` against the current interpolation.
    pub fn quote_error(&self, i: usize) -> Result<Real> {
        let view = self.nodes.view::<T>(self.context)?;
        self.helpers[i - 1].quote_error(&view)
    }

    /// Solver bounds for pillar `i` given the pillars before it.
    pub fn bounds(&self, i: usize, rates: &RateBounds) -> (Real, Real) {
        let (times, data) = (&self.nodes.times, &self.nodes.data);
        (
            T::min_value_after(i, times, data, rates),
            T::max_value_after(i, times, data, rates),
        )
    }

    /// Starting point for pillar `i`.
    pub fn guess(&self, i: usize) -> Real {
        T::guess(
            i,
            &self.nodes.times,
            &self.nodes.data,
            self.valid || self.hinted[i],
        )
    }
}

//! Iterative (pillar by pillar) bootstrap.
//!
//! Helpers are processed in pillar order. For each pillar a 1D solver finds
//! the value that makes the helper reprice its quote, given the pillars
//! already solved. A pillar that cannot be solved escalates through
//!
//!   `Solve → BracketRetry(1..=4) → Penalty → Failed`
//!
//! where bracket retries double the search interval around the guess and the
//! penalty stage minimises the errors of all remaining helpers together.
//! Only solver failures escalate; any other error aborts the calculation.
//!
//! Global interpolation schemes repeat the forward pass until the pillar
//! values stop moving.

use std::sync::Arc;

use pillar_core::errors::{Error, Result};
use pillar_core::{ensure, Real};
use pillar_math::{
    Bisection, Brent, EndCriteria, FiniteDifferenceNewtonSafe, Interpolator, LevenbergMarquardt,
    Solver1D,
};
use pillar_time::Date;
use tracing::{debug, trace, warn};

use crate::bootstrap_curve::{CurveContext, CurveNodes, Scheme, WorkingCurve};
use crate::bootstrap_error::BootstrapError;
use crate::bootstrap_traits::{BootstrapTraits, RateBounds};
use crate::penalty_function::PenaltyFunction;
use crate::rate_helpers::RateHelper;

/// Half-width of the first bracket, as a fraction of the bound range.
const INITIAL_BRACKET_FRACTION: Real = 1.0 / 16.0;
/// Factor applied to the half-width at each retry.
const BRACKET_GROWTH: Real = 2.0;
/// Retries before falling back to the penalty minimisation. The last one
/// spans the whole bound range.
const MAX_BRACKET_RETRIES: usize = 4;

// ── Bootstrap policy seam ─────────────────────────────────────────────────────

/// Everything a bootstrap needs from the curve for one calculation.
#[derive(Debug)]
pub struct BootstrapInput<'a, I> {
    /// Reference date, conventions and jumps.
    pub context: &'a CurveContext,
    /// Helpers sorted by pillar date.
    pub helpers: &'a [Arc<dyn RateHelper>],
    /// Interpolation scheme of the curve.
    pub interpolator: &'a I,
    /// Absolute tolerance on every quote error.
    pub accuracy: Real,
}

/// A bootstrap algorithm.
pub trait Bootstrap: std::fmt::Debug + Clone + Default + Send + Sync + 'static {
    /// Check a helper list before any calculation.
    fn setup<I: Interpolator>(&self, helpers: &[Arc<dyn RateHelper>], interpolator: &I) -> Result<()>;

    /// Run a full bootstrap. `previous` holds the last published nodes, if
    /// any, which may seed the solve.
    fn calculate<T: BootstrapTraits, I: Interpolator>(
        &self,
        input: &BootstrapInput<'_, I>,
        previous: Option<&CurveNodes>,
    ) -> Result<BootstrapOutcome>;
}

/// Result of a successful bootstrap.
#[derive(Debug)]
pub struct BootstrapOutcome {
    /// Solved pillars with their final interpolation.
    pub nodes: CurveNodes,
    /// How each pillar was resolved.
    pub report: BootstrapReport,
}

// ── Report ────────────────────────────────────────────────────────────────────

/// How a pillar was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Solved in the initial bracket.
    Direct,
    /// Solved after the given number of bracket widenings.
    BracketRetry(usize),
    /// Solved by the joint penalty minimisation.
    Penalty,
}

/// Outcome for one pillar.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarReport {
    /// Pillar date.
    pub pillar: Date,
    /// Stage at which the pillar was solved.
    pub resolution: Resolution,
    /// Absolute quote error left.
    pub error: Real,
}

/// Per-pillar outcome of a bootstrap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BootstrapReport {
    /// One entry per alive helper, in pillar order, from the final pass.
    pub pillars: Vec<PillarReport>,
    /// Forward passes performed.
    pub passes: usize,
    /// Whether the run started from previously converged values.
    pub warm_start: bool,
}

impl BootstrapReport {
    /// Largest absolute quote error left.
    pub fn max_error(&self) -> Real {
        self.pillars.iter().map(|p| p.error).fold(0.0, Real::max)
    }

    /// `true` if every pillar was solved in its initial bracket.
    pub fn all_direct(&self) -> bool {
        self.pillars.iter().all(|p| p.resolution == Resolution::Direct)
    }
}

// ── Solver choice ─────────────────────────────────────────────────────────────

/// Root finder used for each pillar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PillarSolver {
    /// Brent's method.
    Brent(Brent),
    /// Safeguarded Newton with finite-difference derivatives.
    NewtonSafe(FiniteDifferenceNewtonSafe),
    /// Plain bisection.
    Bisection(Bisection),
}

impl Default for PillarSolver {
    fn default() -> Self {
        PillarSolver::Brent(Brent::default())
    }
}

impl PillarSolver {
    fn with_max_evaluations(self, max_evaluations: usize) -> Self {
        match self {
            PillarSolver::Brent(_) => PillarSolver::Brent(Brent::with_max_evaluations(max_evaluations)),
            PillarSolver::NewtonSafe(_) => {
                PillarSolver::NewtonSafe(FiniteDifferenceNewtonSafe::with_max_evaluations(max_evaluations))
            }
            PillarSolver::Bisection(_) => {
                PillarSolver::Bisection(Bisection::with_max_evaluations(max_evaluations))
            }
        }
    }

    fn solve<F>(&self, f: F, accuracy: Real, guess: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        match self {
            PillarSolver::Brent(s) => s.solve(f, accuracy, guess, x_min, x_max),
            PillarSolver::NewtonSafe(s) => s.solve(f, accuracy, guess, x_min, x_max),
            PillarSolver::Bisection(s) => s.solve(f, accuracy, guess, x_min, x_max),
        }
    }
}

// ── Escalation ladder ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    Solve,
    BracketRetry(usize),
    Penalty,
    Failed { reason: String, residual: Real },
}

/// Outcome of one stage for the current pillar.
#[derive(Debug)]
enum Attempt {
    Solved(Real),
    Escalate { reason: String, residual: Real },
}

/// Smallest error magnitude a failed solve reported.
fn failure_residual(error: &Error) -> Real {
    match error {
        Error::NoSignChange { f_min, f_max, .. } => f_min.abs().min(f_max.abs()),
        Error::MaxEvaluations { residual, .. } => *residual,
        _ => Real::NAN,
    }
}

/// The default bootstrap: sequential per-pillar solves with bracket
/// widening and a joint penalty fallback.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IterativeBootstrap {
    solver: PillarSolver,
    bounds: RateBounds,
}

impl IterativeBootstrap {
    /// Brent, 100 evaluations, rates within ±100%.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `solver` for the per-pillar solves.
    #[must_use]
    pub fn with_solver(mut self, solver: PillarSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Cap the objective evaluations of each per-pillar solve.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.solver = self.solver.with_max_evaluations(max_evaluations);
        self
    }

    /// Largest absolute rate a pillar may imply.
    #[must_use]
    pub fn with_max_rate(mut self, max_rate: Real) -> Self {
        self.bounds.max_rate = max_rate;
        self
    }

    /// Whether negative rates are admissible.
    #[must_use]
    pub fn with_negative_rates(mut self, allow: bool) -> Self {
        self.bounds.allow_negative_rates = allow;
        self
    }

    /// The configured solver.
    pub fn solver(&self) -> PillarSolver {
        self.solver
    }

    /// The configured rate bounds.
    pub fn bounds(&self) -> RateBounds {
        self.bounds
    }

    /// Pillar dates (initial node first) and the helpers that are alive,
    /// with the number of expired helpers skipped in front.
    fn pillars<'h, T: BootstrapTraits, I: Interpolator>(
        input: &BootstrapInput<'h, I>,
    ) -> Result<(Vec<Date>, &'h [Arc<dyn RateHelper>], usize)> {
        let initial = T::initial_date(input.context.reference_date);
        let skipped = input
            .helpers
            .iter()
            .take_while(|h| h.pillar_date() <= initial)
            .count();
        let alive = &input.helpers[skipped..];
        let required = I::REQUIRED_POINTS.saturating_sub(1).max(1);
        ensure!(
            alive.len() >= required,
            "not enough alive instruments: {} provided, {required} required",
            alive.len()
        );
        let mut dates = Vec::with_capacity(alive.len() + 1);
        dates.push(initial);
        for helper in alive {
            let pillar = helper.pillar_date();
            let previous = dates[dates.len() - 1];
            ensure!(
                pillar > previous,
                "instruments with pillar dates {previous} and {pillar} are out of order or duplicated"
            );
            dates.push(pillar);
        }
        Ok((dates, alive, skipped))
    }

    fn run<T: BootstrapTraits, I: Interpolator>(
        &self,
        input: &BootstrapInput<'_, I>,
        dates: &[Date],
        alive: &[Arc<dyn RateHelper>],
        skipped: usize,
        warm: Option<&[Real]>,
    ) -> Result<BootstrapOutcome> {
        let mut nodes = CurveNodes::new(input.context, dates.to_vec(), T::initial_value());
        if let Some(times) = nodes.times.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::Precondition(format!(
                "pillar times not strictly increasing ({} then {})",
                times[0], times[1]
            )));
        }
        if let Some(seed) = warm {
            nodes.data.copy_from_slice(seed);
        }
        let mut curve = WorkingCurve::<T, I>::new(input.context, alive, input.interpolator, nodes);
        curve.valid = warm.is_some();

        let max_passes = if I::GLOBAL { T::max_iterations() } else { 1 };
        let mut change = Real::INFINITY;
        let mut worst = 1;
        for pass in 1..=max_passes {
            let measured = curve.valid;
            curve.partial = !curve.valid;
            curve.scheme = if I::GLOBAL && !curve.valid {
                Scheme::Linear
            } else {
                Scheme::Target
            };
            let before = curve.nodes.data.clone();
            let pillars = self.forward_pass(&mut curve, skipped, input.accuracy)?;
            curve.valid = true;

            (worst, change) = before
                .iter()
                .zip(&curve.nodes.data)
                .enumerate()
                .skip(1)
                .map(|(j, (b, a))| (j, (a - b).abs()))
                .fold((1, 0.0), |acc, x| if x.1 > acc.1 { x } else { acc });
            trace!(pass, change, "bootstrap pass done");

            if !I::GLOBAL || (measured && change <= input.accuracy) {
                let last = curve.last();
                let mut nodes = curve.nodes;
                nodes.interpolate(input.interpolator, Scheme::Target, last)?;
                return Ok(BootstrapOutcome {
                    nodes,
                    report: BootstrapReport {
                        pillars,
                        passes: pass,
                        warm_start: warm.is_some(),
                    },
                });
            }
        }
        Err(Error::Calibration {
            index: skipped + worst,
            pillar: dates[worst].to_string(),
            achieved: change,
            required: input.accuracy,
            reason: format!("global interpolation not converged after {max_passes} passes"),
        })
    }

    fn forward_pass<T: BootstrapTraits, I: Interpolator>(
        &self,
        curve: &mut WorkingCurve<'_, T, I>,
        skipped: usize,
        accuracy: Real,
    ) -> Result<Vec<PillarReport>> {
        let mut reports = Vec::with_capacity(curve.last());
        for i in 1..=curve.last() {
            let report = self.solve_pillar(curve, i, skipped, accuracy)?;
            debug!(
                pillar = %report.pillar,
                index = i,
                resolution = ?report.resolution,
                error = report.error,
                "pillar solved"
            );
            reports.push(report);
        }
        Ok(reports)
    }

    fn solve_pillar<T: BootstrapTraits, I: Interpolator>(
        &self,
        curve: &mut WorkingCurve<'_, T, I>,
        i: usize,
        skipped: usize,
        accuracy: Real,
    ) -> Result<PillarReport> {
        let pillar = curve.nodes.dates[i];
        let (min, max) = curve.bounds(i, &self.bounds);
        ensure!(min < max, "empty bounds [{min}, {max}] for pillar {pillar}");
        let mut guess = curve.guess(i);
        if !(guess > min && guess < max) {
            guess = if guess >= max {
                max - (max - min) / 5.0
            } else {
                min + (max - min) / 5.0
            };
        }

        let mut stage = Stage::Solve;
        loop {
            stage = match stage {
                Stage::Solve | Stage::BracketRetry(_) => {
                    let retry = match stage {
                        Stage::BracketRetry(k) => k,
                        _ => 0,
                    };
                    let (lo, hi) = bracket(guess, min, max, retry);
                    match self.attempt(curve, i, guess, lo, hi, accuracy)? {
                        Attempt::Solved(error) => {
                            let resolution = if retry == 0 {
                                Resolution::Direct
                            } else {
                                Resolution::BracketRetry(retry)
                            };
                            return Ok(PillarReport { pillar, resolution, error });
                        }
                        Attempt::Escalate { reason, residual } => {
                            if retry < MAX_BRACKET_RETRIES {
                                warn!(
                                    pillar = %pillar,
                                    index = i,
                                    retry = retry + 1,
                                    %reason,
                                    "widening bracket"
                                );
                                Stage::BracketRetry(retry + 1)
                            } else {
                                warn!(pillar = %pillar, index = i, %reason, residual, "falling back to penalty minimisation");
                                Stage::Penalty
                            }
                        }
                    }
                }
                Stage::Penalty => {
                    curve.store(i, guess);
                    match self.penalty(curve, i, accuracy)? {
                        Attempt::Solved(error) => {
                            return Ok(PillarReport {
                                pillar,
                                resolution: Resolution::Penalty,
                                error,
                            });
                        }
                        Attempt::Escalate { reason, residual } => Stage::Failed { reason, residual },
                    }
                }
                Stage::Failed { reason, residual } => {
                    return Err(Error::Calibration {
                        index: skipped + i,
                        pillar: pillar.to_string(),
                        achieved: residual.abs(),
                        required: accuracy,
                        reason,
                    });
                }
            };
        }
    }

    fn attempt<T: BootstrapTraits, I: Interpolator>(
        &self,
        curve: &mut WorkingCurve<'_, T, I>,
        i: usize,
        guess: Real,
        lo: Real,
        hi: Real,
        accuracy: Real,
    ) -> Result<Attempt> {
        trace!(index = i, guess, lo, hi, "solving pillar");
        let root = {
            let mut error = BootstrapError::new(&mut *curve, i);
            self.solver.solve(|x| error.value(x), accuracy, guess, lo, hi)
        };
        match root {
            Ok(x) => {
                // leave the curve at the root, whatever the solver probed last
                let residual = BootstrapError::new(curve, i).value(x)?;
                if residual.abs() <= accuracy {
                    Ok(Attempt::Solved(residual.abs()))
                } else {
                    Ok(Attempt::Escalate {
                        reason: format!("root {x} leaves error {residual:.3e}"),
                        residual,
                    })
                }
            }
            Err(e) if e.is_solver_failure() => Ok(Attempt::Escalate {
                residual: failure_residual(&e),
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    fn penalty<T: BootstrapTraits, I: Interpolator>(
        &self,
        curve: &mut WorkingCurve<'_, T, I>,
        i: usize,
        accuracy: Real,
    ) -> Result<Attempt> {
        let last = curve.last();
        // seed the unsolved tail
        for j in i + 1..=last {
            let value = curve.guess(j);
            curve.store(j, value);
        }
        let residuals = {
            let mut penalty = PenaltyFunction::new(&mut *curve, i, self.bounds);
            let x0 = penalty.initial_parameters();
            let criteria = EndCriteria::new(1000, 100, accuracy, 0.0, 0.0);
            let result = LevenbergMarquardt::default().minimize(&mut penalty, &x0, &criteria)?;
            // leave the curve at the minimum
            let residuals = pillar_math::CostFunction::values(&mut penalty, &result.x)?;
            trace!(index = i, iterations = result.iterations, end = ?result.end_type, "penalty minimisation done");
            residuals
        };
        for j in i + 1..=last {
            curve.hinted[j] = true;
        }
        curve.interpolate_for(i)?;
        let residual = residuals[0];
        if residual.abs() <= accuracy {
            Ok(Attempt::Solved(residual.abs()))
        } else {
            Ok(Attempt::Escalate {
                reason: "penalty minimisation did not reach the accuracy".into(),
                residual,
            })
        }
    }
}

/// Search interval for the given retry, clipped to the bounds.
fn bracket(guess: Real, min: Real, max: Real, retry: usize) -> (Real, Real) {
    if retry >= MAX_BRACKET_RETRIES {
        return (min, max);
    }
    let half = INITIAL_BRACKET_FRACTION * BRACKET_GROWTH.powi(retry as i32) * (max - min);
    ((guess - half).max(min), (guess + half).min(max))
}

impl Bootstrap for IterativeBootstrap {
    fn setup<I: Interpolator>(&self, helpers: &[Arc<dyn RateHelper>], _interpolator: &I) -> Result<()> {
        ensure!(!helpers.is_empty(), "no instruments given");
        let required = I::REQUIRED_POINTS.saturating_sub(1).max(1);
        ensure!(
            helpers.len() >= required,
            "not enough instruments: {} provided, {required} required",
            helpers.len()
        );
        ensure!(self.bounds.max_rate > 0.0, "non-positive maximum rate {}", self.bounds.max_rate);
        Ok(())
    }

    fn calculate<T: BootstrapTraits, I: Interpolator>(
        &self,
        input: &BootstrapInput<'_, I>,
        previous: Option<&CurveNodes>,
    ) -> Result<BootstrapOutcome> {
        let (dates, alive, skipped) = Self::pillars::<T, I>(input)?;
        debug!(
            traits = T::NAME,
            reference = %input.context.reference_date,
            instruments = alive.len(),
            skipped,
            accuracy = input.accuracy,
            "bootstrap started"
        );
        let warm = previous.filter(|p| p.dates == dates).map(|p| p.data.as_slice());
        let outcome = match warm {
            Some(seed) => match self.run::<T, I>(input, &dates, alive, skipped, Some(seed)) {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    warn!(error = %e, "warm-started bootstrap failed, retrying from cold seeds");
                    self.run::<T, I>(input, &dates, alive, skipped, None)
                }
            },
            None => self.run::<T, I>(input, &dates, alive, skipped, None),
        }?;
        debug!(
            passes = outcome.report.passes,
            warm_start = outcome.report.warm_start,
            max_error = outcome.report.max_error(),
            "bootstrap finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use pillar_math::{Linear, LogLinear};
    use pillar_quotes::{Quote, SimpleQuote};
    use pillar_time::{Actual360, Actual365Fixed, NullCalendar};

    use crate::bootstrap_traits::{Discount, ZeroYield};
    use crate::rate_helpers::DepositRateHelper;
    use crate::yield_term_structure::YieldTermStructure;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd(y, m, d).unwrap()
    }

    fn context(today: Date) -> CurveContext {
        CurveContext {
            reference_date: today,
            day_counter: Arc::new(Actual365Fixed),
            calendar: Arc::new(NullCalendar),
            jumps: Vec::new(),
        }
    }

    fn deposit(rate: Real, start: Date, end: Date) -> Arc<dyn RateHelper> {
        Arc::new(DepositRateHelper::new(SimpleQuote::shared(rate), start, end, Arc::new(Actual360)).unwrap())
    }

    /// Quote error `(df - target)^2`: touches zero without crossing it.
    #[derive(Debug)]
    struct Tangent {
        quote: Arc<dyn Quote>,
        pillar: Date,
        target: Real,
    }

    impl RateHelper for Tangent {
        fn quote(&self) -> &Arc<dyn Quote> {
            &self.quote
        }

        fn earliest_date(&self) -> Date {
            self.pillar
        }

        fn latest_date(&self) -> Date {
            self.pillar
        }

        fn implied_quote(&self, curve: &dyn YieldTermStructure) -> Result<Real> {
            let df = curve.discount_date(self.pillar)?;
            Ok(self.quote.try_value()? + (df - self.target).powi(2))
        }
    }

    #[test]
    fn bracket_widens_then_spans_the_bounds() {
        assert_eq!(bracket(0.5, 0.0, 1.0, 0), (0.4375, 0.5625));
        assert_eq!(bracket(0.5, 0.0, 1.0, 1), (0.375, 0.625));
        assert_eq!(bracket(0.75, 0.0, 1.0, 2), (0.5, 1.0));
        assert_eq!(bracket(0.9, 0.0, 1.0, MAX_BRACKET_RETRIES), (0.0, 1.0));
    }

    #[test]
    fn single_deposit_is_solved_directly() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers = vec![deposit(0.05, today, date(2026, 1, 2))];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let out = IterativeBootstrap::new().calculate::<Discount, _>(&input, None).unwrap();
        assert_abs_diff_eq!(out.nodes.data()[1], 1.0 / (1.0 + 0.05 * 365.0 / 360.0), epsilon = 1e-12);
        assert!(out.report.all_direct());
        assert_eq!(out.report.passes, 1);
        assert!(!out.report.warm_start);
    }

    #[test]
    fn distant_root_is_found_by_bracket_retries() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        // 80% deposit: discount factor 0.552, far below the 0.952 guess
        let helpers = vec![deposit(0.80, today, date(2026, 1, 2))];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let out = IterativeBootstrap::new().calculate::<Discount, _>(&input, None).unwrap();
        assert_eq!(out.report.pillars[0].resolution, Resolution::BracketRetry(2));
        assert_abs_diff_eq!(out.nodes.data()[1], 1.0 / (1.0 + 0.8 * 365.0 / 360.0), epsilon = 1e-12);
    }

    #[test]
    fn tangent_error_is_resolved_by_the_penalty() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers: Vec<Arc<dyn RateHelper>> = vec![Arc::new(Tangent {
            quote: SimpleQuote::shared(0.05),
            pillar: date(2026, 1, 2),
            target: 0.9,
        })];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let out = IterativeBootstrap::new().calculate::<Discount, _>(&input, None).unwrap();
        assert_eq!(out.report.pillars[0].resolution, Resolution::Penalty);
        assert!(out.report.pillars[0].error <= 1e-12);
        assert_abs_diff_eq!(out.nodes.data()[1], 0.9, epsilon = 1e-5);
    }

    fn assert_reprices<T: BootstrapTraits>(
        out: &BootstrapOutcome,
        ctx: &CurveContext,
        helpers: &[Arc<dyn RateHelper>],
        tolerance: Real,
    ) {
        let view = out.nodes.view::<T>(ctx).unwrap();
        for (k, helper) in helpers.iter().enumerate() {
            let error = helper.quote_error(&view).unwrap();
            assert!(error.abs() <= tolerance, "helper {k}: quote error {error:e}");
        }
    }

    #[test]
    fn penalty_solves_the_tail_jointly_and_later_pillars_follow() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers: Vec<Arc<dyn RateHelper>> = vec![
            Arc::new(Tangent {
                quote: SimpleQuote::shared(0.05),
                pillar: date(2025, 7, 2),
                target: 0.98,
            }),
            deposit(0.035, today, date(2026, 1, 2)),
            deposit(0.038, today, date(2027, 1, 4)),
        ];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let out = IterativeBootstrap::new().calculate::<Discount, _>(&input, None).unwrap();
        let resolutions: Vec<_> = out.report.pillars.iter().map(|p| p.resolution).collect();
        assert_eq!(resolutions[0], Resolution::Penalty);
        assert_eq!(resolutions.len(), 3);
        assert!(resolutions[1..].iter().all(|r| *r != Resolution::Penalty));
        assert!(out.report.pillars.iter().all(|p| p.error <= 1e-12));
        assert_reprices::<Discount>(&out, &ctx, &helpers, 1e-12);
    }

    #[test]
    fn alternative_solvers_reprice_within_tighter_rate_bounds() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers = vec![
            deposit(0.030, today, date(2025, 7, 2)),
            deposit(0.032, today, date(2026, 1, 2)),
            deposit(0.036, today, date(2027, 1, 4)),
        ];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &Linear,
            accuracy: 1e-12,
        };
        for solver in [
            PillarSolver::NewtonSafe(FiniteDifferenceNewtonSafe::default()),
            PillarSolver::Bisection(Bisection::default()),
        ] {
            let bootstrap = IterativeBootstrap::new()
                .with_solver(solver)
                .with_max_rate(0.5)
                .with_max_evaluations(200);
            assert_eq!(bootstrap.bounds().max_rate, 0.5);
            assert!(matches!(
                (bootstrap.solver(), solver),
                (PillarSolver::NewtonSafe(_), PillarSolver::NewtonSafe(_))
                    | (PillarSolver::Bisection(_), PillarSolver::Bisection(_))
            ));
            let out = bootstrap.calculate::<ZeroYield, _>(&input, None).unwrap();
            assert_eq!(out.nodes.len(), 4);
            assert_reprices::<ZeroYield>(&out, &ctx, &helpers, 1e-12);
        }
    }

    #[test]
    fn unreachable_quote_fails_with_calibration_error() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        // a 500% deposit needs a rate beyond the default bounds
        let helpers = vec![
            deposit(0.03, today, date(2025, 7, 2)),
            deposit(5.0, today, date(2026, 1, 2)),
        ];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let err = IterativeBootstrap::new()
            .with_negative_rates(false)
            .calculate::<Discount, _>(&input, None)
            .unwrap_err();
        match err {
            Error::Calibration { index, pillar, required, .. } => {
                assert_eq!(index, 2);
                assert_eq!(pillar, date(2026, 1, 2).to_string());
                assert_eq!(required, 1e-12);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn invalid_quotes_abort_without_escalation() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers: Vec<Arc<dyn RateHelper>> = vec![Arc::new(
            DepositRateHelper::new(
                Arc::new(SimpleQuote::empty()),
                today,
                date(2026, 1, 2),
                Arc::new(Actual360),
            )
            .unwrap(),
        )];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &Linear,
            accuracy: 1e-12,
        };
        let err = IterativeBootstrap::new().calculate::<ZeroYield, _>(&input, None).unwrap_err();
        assert!(matches!(err, Error::InvalidQuote(_)));
    }

    #[test]
    fn matching_previous_nodes_warm_start_the_run() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers = vec![
            deposit(0.03, today, date(2025, 7, 2)),
            deposit(0.035, today, date(2026, 1, 2)),
        ];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let bootstrap = IterativeBootstrap::new();
        let cold = bootstrap.calculate::<Discount, _>(&input, None).unwrap();
        let warm = bootstrap.calculate::<Discount, _>(&input, Some(&cold.nodes)).unwrap();
        assert!(warm.report.warm_start);
        for (a, b) in cold.nodes.data().iter().zip(warm.nodes.data()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn expired_helpers_are_skipped() {
        let today = date(2025, 1, 2);
        let ctx = context(today);
        let helpers = vec![
            deposit(0.03, date(2024, 7, 2), today),
            deposit(0.035, today, date(2026, 1, 2)),
        ];
        let input = BootstrapInput {
            context: &ctx,
            helpers: &helpers,
            interpolator: &LogLinear,
            accuracy: 1e-12,
        };
        let out = IterativeBootstrap::new().calculate::<Discount, _>(&input, None).unwrap();
        assert_eq!(out.nodes.dates(), &[today, date(2026, 1, 2)]);
    }

    #[test]
    fn setup_rejects_empty_helper_lists() {
        let err = IterativeBootstrap::new().setup(&[], &Linear).unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }
}

//! 1D root-finding solvers.
//!
//! Solvers look for `x` in a bracket `[x_min, x_max]` with `|f(x)| <=
//! accuracy`; the accuracy is on the function value, not on `x`. The
//! objective may fail (it returns `Result`), in which case the error is
//! passed through untouched. Solver failures are reported as
//! [`Error::NoSignChange`] when the bracket does not straddle a root and as
//! [`Error::MaxEvaluations`] when the evaluation budget runs out.

use pillar_core::errors::{Error, Result};
use pillar_core::Real;

/// Default cap on objective evaluations per solve.
pub const DEFAULT_MAX_EVALUATIONS: usize = 100;

/// A bracketing one-dimensional root finder.
pub trait Solver1D {
    /// Find a root of `f` in `[x_min, x_max]`, starting from `guess`.
    ///
    /// A `guess` strictly inside the bracket is evaluated first and used to
    /// shrink the bracket before iterating.
    fn solve<F>(&self, f: F, accuracy: Real, guess: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>;
}

/// Counts objective evaluations against a budget.
struct Counted<F> {
    f: F,
    evaluations: usize,
    max_evaluations: usize,
}

impl<F: FnMut(Real) -> Result<Real>> Counted<F> {
    fn new(f: F, max_evaluations: usize) -> Self {
        Self {
            f,
            evaluations: 0,
            max_evaluations,
        }
    }

    fn eval(&mut self, x: Real, best_residual: Real) -> Result<Real> {
        if self.evaluations >= self.max_evaluations {
            return Err(Error::MaxEvaluations {
                evaluations: self.evaluations,
                residual: best_residual,
            });
        }
        self.evaluations += 1;
        let y = (self.f)(x)?;
        if y.is_nan() {
            return Err(Error::Runtime(format!("objective returned NaN at {x}")));
        }
        Ok(y)
    }
}

/// Outcome of the bracket set-up.
enum Start {
    /// One of the probed points already satisfies the accuracy.
    Root(Real),
    /// A sign-changing bracket `[a, b]` with the function values at its ends.
    Bracket { a: Real, fa: Real, b: Real, fb: Real },
}

/// Evaluates the bracket ends and the guess, narrowing the bracket to the
/// side of the guess where the sign changes.
fn initial_bracket<F>(
    f: &mut Counted<F>,
    accuracy: Real,
    guess: Real,
    x_min: Real,
    x_max: Real,
) -> Result<Start>
where
    F: FnMut(Real) -> Result<Real>,
{
    if x_min.is_nan() || x_max.is_nan() || x_min >= x_max {
        return Err(Error::InvalidArgument(format!(
            "invalid bracket [{x_min}, {x_max}]"
        )));
    }
    let f_min = f.eval(x_min, Real::INFINITY)?;
    if f_min.abs() <= accuracy {
        return Ok(Start::Root(x_min));
    }
    let f_max = f.eval(x_max, f_min.abs())?;
    if f_max.abs() <= accuracy {
        return Ok(Start::Root(x_max));
    }
    if f_min * f_max > 0.0 {
        return Err(Error::NoSignChange {
            x_min,
            x_max,
            f_min,
            f_max,
        });
    }
    if guess > x_min && guess < x_max {
        let f_guess = f.eval(guess, f_min.abs().min(f_max.abs()))?;
        if f_guess.abs() <= accuracy {
            return Ok(Start::Root(guess));
        }
        if f_guess * f_min > 0.0 {
            return Ok(Start::Bracket { a: guess, fa: f_guess, b: x_max, fb: f_max });
        }
        return Ok(Start::Bracket { a: x_min, fa: f_min, b: guess, fb: f_guess });
    }
    Ok(Start::Bracket { a: x_min, fa: f_min, b: x_max, fb: f_max })
}

// ── Brent ─────────────────────────────────────────────────────────────────────

/// Brent's method: inverse quadratic interpolation and secant steps,
/// safeguarded by bisection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brent {
    /// Cap on objective evaluations.
    pub max_evaluations: usize,
}

impl Default for Brent {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl Brent {
    /// Brent with a custom evaluation budget.
    pub fn with_max_evaluations(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }
}

impl Solver1D for Brent {
    fn solve<F>(&self, f: F, accuracy: Real, guess: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        let mut f = Counted::new(f, self.max_evaluations);
        let (mut a, mut fa, mut b, mut fb) =
            match initial_bracket(&mut f, accuracy, guess, x_min, x_max)? {
                Start::Bracket { a, fa, b, fb } => (a, fa, b, fb),
                Start::Root(root) => return Ok(root),
            };

        let mut c = a;
        let mut fc = fa;
        let mut d = b - a;
        let mut e = d;

        loop {
            if fb * fc > 0.0 {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }
            // bracket collapsed to machine resolution
            let tol = 2.0 * Real::EPSILON * b.abs() + Real::MIN_POSITIVE;
            let xm = 0.5 * (c - b);
            if fb.abs() <= accuracy || xm.abs() <= tol {
                return Ok(b);
            }
            if e.abs() >= tol && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (p, q) = if a == c {
                    (2.0 * xm * s, 1.0 - s)
                } else {
                    let q = fa / fc;
                    let r = fb / fc;
                    (
                        s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                        (q - 1.0) * (r - 1.0) * (s - 1.0),
                    )
                };
                let (p, q) = if p > 0.0 { (p, -q) } else { (-p, q) };
                if 2.0 * p < (3.0 * xm * q - (tol * q).abs()).min((e * q).abs()) {
                    e = d;
                    d = p / q;
                } else {
                    d = xm;
                    e = d;
                }
            } else {
                d = xm;
                e = d;
            }
            a = b;
            fa = fb;
            b += if d.abs() > tol { d } else { tol.copysign(xm) };
            fb = f.eval(b, fb.abs().min(fa.abs()))?;
        }
    }
}

// ── Finite-difference Newton (safe) ──────────────────────────────────────────

/// Newton's method with the derivative estimated by a secant through the
/// last two iterates, falling back to bisection whenever the step would
/// leave the bracket or converge too slowly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiniteDifferenceNewtonSafe {
    /// Cap on objective evaluations.
    pub max_evaluations: usize,
}

impl Default for FiniteDifferenceNewtonSafe {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl FiniteDifferenceNewtonSafe {
    /// Newton-safe with a custom evaluation budget.
    pub fn with_max_evaluations(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }
}

impl Solver1D for FiniteDifferenceNewtonSafe {
    fn solve<F>(&self, f: F, accuracy: Real, guess: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        let mut f = Counted::new(f, self.max_evaluations);
        let (lo, f_lo, hi, f_hi) = match initial_bracket(&mut f, accuracy, guess, x_min, x_max)? {
            Start::Bracket { a, fa, b, fb } => (a, fa, b, fb),
            Start::Root(root) => return Ok(root),
        };

        // orient the bracket so that f(xl) < 0 < f(xh)
        let (mut xl, mut xh) = if f_lo < 0.0 { (lo, hi) } else { (hi, lo) };
        let (mut x_prev, mut f_prev) = if f_lo.abs() < f_hi.abs() { (hi, f_hi) } else { (lo, f_lo) };
        let mut x = if f_lo.abs() < f_hi.abs() { lo } else { hi };
        let mut fx = if f_lo.abs() < f_hi.abs() { f_lo } else { f_hi };
        let mut dx_old = (xh - xl).abs();
        let mut dx = dx_old;

        loop {
            let dfx = (fx - f_prev) / (x - x_prev);
            let newton_ok = dfx.is_finite()
                && dfx != 0.0
                && ((x - xh) * dfx - fx) * ((x - xl) * dfx - fx) < 0.0
                && (2.0 * fx).abs() <= (dx_old * dfx).abs();
            x_prev = x;
            f_prev = fx;
            dx_old = dx;
            if newton_ok {
                dx = fx / dfx;
                x -= dx;
            } else {
                dx = 0.5 * (xh - xl);
                x = xl + dx;
            }
            fx = f.eval(x, f_prev.abs())?;
            if fx.abs() <= accuracy || dx.abs() <= 2.0 * Real::EPSILON * x.abs() {
                return Ok(x);
            }
            if fx < 0.0 {
                xl = x;
            } else {
                xh = x;
            }
        }
    }
}

// ── Bisection ─────────────────────────────────────────────────────────────────

/// Plain bisection; slow but immune to badly behaved objectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bisection {
    /// Cap on objective evaluations.
    pub max_evaluations: usize,
}

impl Default for Bisection {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

impl Bisection {
    /// Bisection with a custom evaluation budget.
    pub fn with_max_evaluations(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }
}

impl Solver1D for Bisection {
    fn solve<F>(&self, f: F, accuracy: Real, guess: Real, x_min: Real, x_max: Real) -> Result<Real>
    where
        F: FnMut(Real) -> Result<Real>,
    {
        let mut f = Counted::new(f, self.max_evaluations);
        let (mut a, fa, mut b, fb) = match initial_bracket(&mut f, accuracy, guess, x_min, x_max)? {
            Start::Bracket { a, fa, b, fb } => (a, fa, b, fb),
            Start::Root(root) => return Ok(root),
        };
        let rising = fa < 0.0;
        let mut best = fa.abs().min(fb.abs());
        loop {
            let mid = 0.5 * (a + b);
            if mid <= a.min(b) || mid >= a.max(b) {
                return Ok(mid);
            }
            let fm = f.eval(mid, best)?;
            best = best.min(fm.abs());
            if fm.abs() <= accuracy {
                return Ok(mid);
            }
            if (fm < 0.0) == rising {
                a = mid;
            } else {
                b = mid;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn cubic(x: Real) -> Result<Real> {
        Ok(x * x * x - 2.0 * x - 5.0)
    }

    const ROOT: Real = 2.094_551_481_542_326_5;

    #[test]
    fn brent_finds_root_within_function_accuracy() {
        let x = Brent::default().solve(cubic, 1e-12, 2.0, 1.0, 3.0).unwrap();
        assert!(cubic(x).unwrap().abs() <= 1e-12);
        assert_abs_diff_eq!(x, ROOT, epsilon = 1e-12);
    }

    #[test]
    fn newton_safe_finds_root() {
        let x = FiniteDifferenceNewtonSafe::default()
            .solve(cubic, 1e-12, 2.5, 1.0, 3.0)
            .unwrap();
        assert_abs_diff_eq!(x, ROOT, epsilon = 1e-12);
    }

    #[test]
    fn bisection_finds_root() {
        let x = Bisection::default().solve(cubic, 1e-10, 2.0, 1.0, 3.0).unwrap();
        assert!(cubic(x).unwrap().abs() <= 1e-10);
    }

    #[test]
    fn unbracketed_root_reported() {
        let err = Brent::default()
            .solve(|x| Ok(x * x + 1.0), 1e-12, 0.5, -1.0, 2.0)
            .unwrap_err();
        assert!(matches!(err, Error::NoSignChange { .. }));
        assert!(err.is_solver_failure());
    }

    #[test]
    fn budget_exhaustion_reported() {
        let err = Brent::with_max_evaluations(4)
            .solve(|x| Ok(x.exp() - 2.0), 1e-15, 0.1, 0.0, 5.0)
            .unwrap_err();
        assert!(matches!(err, Error::MaxEvaluations { evaluations: 4, .. }));
    }

    #[test]
    fn objective_errors_pass_through() {
        let err = Brent::default()
            .solve(|_| Err(Error::InvalidQuote("stale".into())), 1e-12, 0.5, 0.0, 1.0)
            .unwrap_err();
        assert_eq!(err, Error::InvalidQuote("stale".into()));
    }

    #[test]
    fn evaluations_counted() {
        let mut calls = 0;
        Brent::default()
            .solve(
                |x| {
                    calls += 1;
                    Ok(x - 0.3)
                },
                1e-14,
                0.5,
                0.0,
                1.0,
            )
            .unwrap();
        assert!(calls <= 10, "{calls} evaluations for a linear function");
    }

    proptest::proptest! {
        #[test]
        fn any_guess_inside_the_bracket_converges(guess in 1.01f64..2.99) {
            let brent = Brent::default().solve(cubic, 1e-12, guess, 1.0, 3.0).unwrap();
            let newton = FiniteDifferenceNewtonSafe::default()
                .solve(cubic, 1e-12, guess, 1.0, 3.0)
                .unwrap();
            proptest::prop_assert!(cubic(brent).unwrap().abs() <= 1e-12);
            proptest::prop_assert!(cubic(newton).unwrap().abs() <= 1e-12);
        }
    }
}

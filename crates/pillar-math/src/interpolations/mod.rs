//! 1D interpolation.
//!
//! An [`Interpolation1D`] is built over sorted abscissae and answers the
//! value, the first derivative and the primitive (integral from the first
//! abscissa) at any point. Outside the node range every scheme extends its
//! first or last piece, which curves rely on while pillars are still being
//! solved.
//!
//! An [`Interpolator`] is the factory a curve is parameterised with.

use pillar_core::errors::Result;
use pillar_core::{ensure, Real};

mod backward_flat;
mod cubic;
mod linear;

pub use backward_flat::{BackwardFlat, BackwardFlatInterpolation};
pub use cubic::{Cubic, CubicNaturalSpline};
pub use linear::{Linear, LinearInterpolation, LogLinear, LogLinearInterpolation};

/// A 1D interpolation function defined by a set of nodes.
pub trait Interpolation1D: std::fmt::Debug + Send + Sync {
    /// Value at `x`.
    fn value(&self, x: Real) -> Real;

    /// First derivative at `x`.
    fn derivative(&self, x: Real) -> Real;

    /// Integral from [`x_min`](Self::x_min) to `x`.
    fn primitive(&self, x: Real) -> Real;

    /// First node.
    fn x_min(&self) -> Real;

    /// Last node.
    fn x_max(&self) -> Real;

    /// `true` if `x` lies within the node range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Factory for an interpolation scheme.
pub trait Interpolator: std::fmt::Debug + Clone + Default + Send + Sync + 'static {
    /// `true` when moving one node changes the interpolant away from that
    /// node's neighbouring intervals (e.g. splines).
    const GLOBAL: bool;

    /// Minimum number of nodes the scheme needs.
    const REQUIRED_POINTS: usize;

    /// Build the interpolation over `xs` (strictly increasing) and `ys`.
    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>>;
}

/// Shared input checks.
pub(crate) fn check_nodes(xs: &[Real], ys: &[Real], required: usize) -> Result<()> {
    ensure!(
        xs.len() == ys.len(),
        "{} abscissae but {} ordinates",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.len() >= required,
        "interpolation needs at least {required} points, {} given",
        xs.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[0] < w[1]),
        "abscissae must be strictly increasing"
    );
    Ok(())
}

/// Index `i` of the interval `[xs[i], xs[i+1]]` used for `x`, clamped to
/// the first and last intervals.
pub(crate) fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if n < 2 {
        return 0;
    }
    xs.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2)
}

/// Running integral at each node, given the integral over each interval.
pub(crate) fn cumulate(pieces: impl Iterator<Item = Real>) -> Vec<Real> {
    let mut out = vec![0.0];
    let mut acc = 0.0;
    for p in pieces {
        acc += p;
        out.push(acc);
    }
    out
}

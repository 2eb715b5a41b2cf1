//! Per-pillar objective of the iterative bootstrap.

use pillar_core::errors::Result;
use pillar_core::Real;
use pillar_math::Interpolator;

use crate::bootstrap_curve::WorkingCurve;
use crate::bootstrap_traits::BootstrapTraits;

/// Quote error of one helper as a function of its pillar value.
///
/// Each evaluation stores the trial value, rebuilds the interpolation and
/// reprices the helper, so the working curve always reflects the last
/// point evaluated.
#[derive(Debug)]
pub(crate) struct BootstrapError<'w, 'a, T, I> {
    curve: &'w mut WorkingCurve<'a, T, I>,
    pillar: usize,
}

impl<'w, 'a, T: BootstrapTraits, I: Interpolator> BootstrapError<'w, 'a, T, I> {
    pub fn new(curve: &'w mut WorkingCurve<'a, T, I>, pillar: usize) -> Self {
        Self { curve, pillar }
    }

    /// `implied_quote - market_quote` with the pillar set to `x`.
    pub fn value(&mut self, x: Real) -> Result<Real> {
        self.curve.store(self.pillar, x);
        self.curve.interpolate_for(self.pillar)?;
        self.curve.quote_error(self.pillar)
    }
}

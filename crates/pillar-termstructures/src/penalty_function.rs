//! Joint objective over the unsolved tail of a curve.
//!
//! When a pillar cannot be solved on its own, the bootstrap minimises the
//! quote errors of that pillar and of every later one together. Each pillar
//! value is kept inside its bootstrap bounds through the change of variables
//!
//!   `v = lo + (atan(x) + π/2) / π * (hi - lo)`
//!
//! so the minimiser works on unconstrained parameters.

use std::f64::consts::{FRAC_PI_2, PI};

use pillar_core::errors::Result;
use pillar_core::Real;
use pillar_math::{Array, CostFunction, Interpolator};

use crate::bootstrap_curve::WorkingCurve;
use crate::bootstrap_traits::{BootstrapTraits, RateBounds};

/// Fraction of the box kept clear of its ends when mapping a starting
/// value to a parameter.
const EDGE: Real = 0.01;

fn to_value(x: Real, lo: Real, hi: Real) -> Real {
    lo + (x.atan() + FRAC_PI_2) / PI * (hi - lo)
}

fn to_parameter(v: Real, lo: Real, hi: Real) -> Real {
    let u = ((v - lo) / (hi - lo)).clamp(EDGE, 1.0 - EDGE);
    (u * PI - FRAC_PI_2).tan()
}

/// Quote errors of helpers `first..=n` as a function of box-transformed
/// pillar values.
///
/// Bounds of pillar `j` are taken from the value just stored for `j - 1`,
/// so the box moves with the pillars before it.
#[derive(Debug)]
pub(crate) struct PenaltyFunction<'w, 'a, T, I> {
    curve: &'w mut WorkingCurve<'a, T, I>,
    first: usize,
    rates: RateBounds,
}

impl<'w, 'a, T: BootstrapTraits, I: Interpolator> PenaltyFunction<'w, 'a, T, I> {
    pub fn new(curve: &'w mut WorkingCurve<'a, T, I>, first: usize, rates: RateBounds) -> Self {
        Self { curve, first, rates }
    }

    /// Number of unknowns.
    pub fn size(&self) -> usize {
        self.curve.last() - self.first + 1
    }

    /// Parameters reproducing the values currently stored in the tail.
    pub fn initial_parameters(&mut self) -> Array {
        let mut x = Array::zeros(self.size());
        for (k, j) in (self.first..=self.curve.last()).enumerate() {
            let (lo, hi) = self.curve.bounds(j, &self.rates);
            x[k] = to_parameter(self.curve.nodes.data[j], lo, hi);
            // store the clamped value so later boxes see it
            self.curve.store(j, to_value(x[k], lo, hi));
        }
        x
    }
}

impl<T: BootstrapTraits, I: Interpolator> CostFunction for PenaltyFunction<'_, '_, T, I> {
    fn values(&mut self, x: &Array) -> Result<Array> {
        let last = self.curve.last();
        for (k, j) in (self.first..=last).enumerate() {
            let (lo, hi) = self.curve.bounds(j, &self.rates);
            self.curve.store(j, to_value(x[k], lo, hi));
        }
        self.curve.interpolate_through(last)?;
        let residuals = (self.first..=last)
            .map(|j| self.curve.quote_error(j))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array::from_vec(residuals))
    }
}

//! Least-squares optimisation.
//!
//! A [`CostFunction`] maps a parameter vector to a vector of residuals; the
//! optimiser drives `0.5 * Σ r²` down. The residual evaluation may fail, and
//! such failures abort the minimisation.

use nalgebra::DVector;
use pillar_core::errors::Result;
use pillar_core::Real;

mod levenberg_marquardt;

pub use levenberg_marquardt::LevenbergMarquardt;

/// Dense parameter and residual vectors.
pub type Array = DVector<Real>;

/// A multi-dimensional least-squares objective.
pub trait CostFunction {
    /// Residuals at `x`.
    fn values(&mut self, x: &Array) -> Result<Array>;

    /// `0.5 * Σ r²(x)`.
    fn value(&mut self, x: &Array) -> Result<Real> {
        Ok(0.5 * self.values(x)?.norm_squared())
    }
}

/// Criteria to stop an optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct EndCriteria {
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Maximum number of consecutive iterations without meaningful progress.
    pub max_stationary_state_iterations: usize,
    /// Stop once the largest absolute residual is at most this.
    pub root_epsilon: Real,
    /// Relative decrease of the cost below which an iteration is stationary.
    pub function_epsilon: Real,
    /// Stop once the gradient norm is at most this.
    pub gradient_norm_epsilon: Real,
}

impl EndCriteria {
    /// Create new end criteria.
    pub fn new(
        max_iterations: usize,
        max_stationary_state_iterations: usize,
        root_epsilon: Real,
        function_epsilon: Real,
        gradient_norm_epsilon: Real,
    ) -> Self {
        Self {
            max_iterations,
            max_stationary_state_iterations,
            root_epsilon,
            function_epsilon,
            gradient_norm_epsilon,
        }
    }
}

impl Default for EndCriteria {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            max_stationary_state_iterations: 100,
            root_epsilon: 1e-8,
            function_epsilon: 1e-8,
            gradient_norm_epsilon: 1e-8,
        }
    }
}

/// Why an optimisation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCriteriaType {
    /// Iteration cap reached.
    MaxIterations,
    /// Residuals below the root epsilon.
    RootEpsilon,
    /// Too many consecutive stationary iterations.
    StationaryPoint,
    /// Gradient norm below its epsilon.
    GradientNormEpsilon,
}

/// Outcome of an optimisation.
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final parameters.
    pub x: Array,
    /// Final cost `0.5 * Σ r²`.
    pub value: Real,
    /// Residuals at `x`.
    pub residuals: Array,
    /// Iterations performed.
    pub iterations: usize,
    /// Reason for stopping.
    pub end_type: EndCriteriaType,
}

impl OptimizationResult {
    /// Largest absolute residual.
    pub fn max_residual(&self) -> Real {
        self.residuals.amax()
    }
}

//! # pillar-math
//!
//! Numerical building blocks for curve construction: one-dimensional root
//! finders, one-dimensional interpolation schemes and a Levenberg-Marquardt
//! least-squares minimiser over `nalgebra` vectors.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// 1D interpolation schemes and their factories.
pub mod interpolations;

/// Least-squares optimisation.
pub mod optimization;

/// 1D root-finding solvers.
pub mod solvers1d;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use interpolations::{BackwardFlat, Cubic, Interpolation1D, Interpolator, Linear, LogLinear};
pub use optimization::{
    Array, CostFunction, EndCriteria, EndCriteriaType, LevenbergMarquardt, OptimizationResult,
};
pub use solvers1d::{Bisection, Brent, FiniteDifferenceNewtonSafe, Solver1D};

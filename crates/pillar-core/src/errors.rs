//! Error types for pillar.
//!
//! One `thiserror`-derived enum covers configuration mistakes, numerical
//! failures raised by the solvers and calibration failures raised by the
//! bootstrap. The `ensure!`, `ensure_post!` and `fail!` macros are the usual
//! way of producing the string-carrying variants.

use thiserror::Error;

use crate::formatting::ordinal;
use crate::Real;

/// The top-level error type used throughout pillar.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated, typically a configuration error.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Date-related error (invalid date, arithmetic out of range).
    #[error("date error: {0}")]
    Date(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A quote was read while it held no valid value.
    #[error("invalid quote: {0}")]
    InvalidQuote(String),

    /// A root solver was given a bracket whose ends have the same sign.
    #[error("root not bracketed: f[{x_min:.6e}, {x_max:.6e}] -> [{f_min:.6e}, {f_max:.6e}]")]
    NoSignChange {
        /// Lower end of the bracket.
        x_min: Real,
        /// Upper end of the bracket.
        x_max: Real,
        /// Function value at the lower end.
        f_min: Real,
        /// Function value at the upper end.
        f_max: Real,
    },

    /// A solver used up its evaluation budget without converging.
    #[error("maximum number of function evaluations ({evaluations}) exceeded, best residual {residual:.6e}")]
    MaxEvaluations {
        /// Evaluations performed.
        evaluations: usize,
        /// Absolute residual at the best point found.
        residual: Real,
    },

    /// The bootstrap could not reprice one of its instruments.
    #[error(
        "could not bootstrap the {} instrument, pillar {pillar}: {reason} \
         (error {achieved:.6e}, accuracy {required:.6e})",
        nth(.index)
    )]
    Calibration {
        /// One-based position of the instrument in the sorted helper list.
        index: usize,
        /// Pillar date of the instrument.
        pillar: String,
        /// Absolute pricing error reached.
        achieved: Real,
        /// Accuracy the curve was asked for.
        required: Real,
        /// What went wrong.
        reason: String,
    },
}

fn nth(index: &usize) -> String {
    ordinal(*index)
}

impl Error {
    /// `true` for the numerical failures a caller may recover from by
    /// changing the bracket or the method: no sign change, or an exhausted
    /// evaluation budget.
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, Error::NoSignChange { .. } | Error::MaxEvaluations { .. })
    }
}

/// Shorthand `Result` type used throughout pillar.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use pillar_core::{ensure, errors::Error};
/// fn positive(x: f64) -> pillar_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use pillar_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> pillar_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use pillar_core::{fail, errors::Error};
/// fn always_err() -> pillar_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

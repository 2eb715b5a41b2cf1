//! # pillar-termstructures
//!
//! Yield term structures and their construction from market instruments:
//! the piecewise curve, the iterative bootstrap behind it, the rate helpers
//! it calibrates to and the traits selecting which quantity is
//! interpolated.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// `TermStructure`: base trait for all term structures.
pub mod term_structure;

/// `YieldTermStructure`: discount factors, zero and forward rates.
pub mod yield_term_structure;

/// `FlatForward`: constant forward-rate yield curve.
pub mod flat_forward;

/// Bootstrap traits: `Discount`, `ZeroYield` and `ForwardRate`.
pub mod bootstrap_traits;

/// Pillar storage and the read-only curve view helpers price against.
pub mod bootstrap_curve;

/// Rate helpers: deposits, FRAs, futures and swaps.
pub mod rate_helpers;

/// `IterativeBootstrap` and the `Bootstrap` policy trait.
pub mod iterative_bootstrap;

/// `PiecewiseYieldCurve`: yield curve bootstrapped from rate helpers.
pub mod piecewise_yield_curve;

mod bootstrap_error;
mod penalty_function;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use bootstrap_curve::{BootstrapCurve, CurveContext, CurveNodes};
pub use bootstrap_traits::{BootstrapTraits, Discount, ForwardRate, RateBounds, ZeroYield};
pub use flat_forward::FlatForward;
pub use iterative_bootstrap::{
    Bootstrap, BootstrapInput, BootstrapOutcome, BootstrapReport, IterativeBootstrap,
    PillarReport, PillarSolver, Resolution,
};
pub use piecewise_yield_curve::{PiecewiseYieldCurve, DEFAULT_ACCURACY};
pub use rate_helpers::{
    DepositRateHelper, FraRateHelper, FuturesRateHelper, RateHelper, SwapRateHelper,
};
pub use term_structure::TermStructure;
pub use yield_term_structure::YieldTermStructure;

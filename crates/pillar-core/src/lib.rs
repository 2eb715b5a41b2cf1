//! # pillar-core
//!
//! Foundational building blocks shared by every crate in the workspace:
//! numeric type aliases, the error enum with its `ensure!` / `fail!`
//! macros, compounding conventions and the observer / lazy-object patterns
//! that drive curve invalidation.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Compounding conventions.
pub mod compounding;

/// Error types and the `ensure!` / `fail!` / `ensure_post!` macros.
pub mod errors;

/// Small formatting helpers used in diagnostics.
pub mod formatting;

/// Design patterns: observable, lazy object.
pub mod patterns;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Integer type used for signed day and period counts.
pub type Integer = i32;

/// Non-negative integer type.
pub type Natural = u32;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// A rate expressed as a decimal (e.g. 0.05 = 5 %).
pub type Rate = Real;

/// A spread over a reference rate.
pub type Spread = Real;

/// A discount factor, positive and usually at most one.
pub type DiscountFactor = Real;

/// A time measurement in years.
pub type Time = Real;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use compounding::Compounding;
pub use errors::{Error, Result};
pub use patterns::lazy_object::{LazyObject, LazyState};
pub use patterns::observable::{Observable, ObservableImpl, Observer};

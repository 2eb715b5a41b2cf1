//! # pillar
//!
//! Yield curves bootstrapped from market instruments.
//!
//! This crate is a **façade** re-exporting the workspace crates. Application
//! code should depend on it rather than on the individual `pillar-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use pillar::math::LogLinear;
//! use pillar::quotes::SimpleQuote;
//! use pillar::termstructures::{
//!     DepositRateHelper, Discount, PiecewiseYieldCurve, RateHelper, SwapRateHelper,
//!     YieldTermStructure,
//! };
//! use pillar::time::{Actual360, Actual365Fixed, Date, Schedule, Thirty360};
//!
//! let today = Date::from_ymd(2025, 1, 2)?;
//! let fixed_leg = Schedule::from_dates(vec![
//!     today,
//!     Date::from_ymd(2026, 1, 2)?,
//!     Date::from_ymd(2027, 1, 2)?,
//! ])?;
//! let helpers: Vec<Arc<dyn RateHelper>> = vec![
//!     Arc::new(DepositRateHelper::new(
//!         SimpleQuote::shared(0.040),
//!         today,
//!         Date::from_ymd(2025, 7, 2)?,
//!         Arc::new(Actual360),
//!     )?),
//!     Arc::new(SwapRateHelper::new(
//!         SimpleQuote::shared(0.042),
//!         fixed_leg,
//!         Arc::new(Thirty360),
//!     )?),
//! ];
//! let curve = PiecewiseYieldCurve::<Discount, LogLinear>::new(
//!     today,
//!     helpers,
//!     Arc::new(Actual365Fixed),
//! )?;
//! let df = curve.discount_date(Date::from_ymd(2027, 1, 2)?)?;
//! assert!(df > 0.9 && df < 1.0);
//! # Ok::<(), pillar::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, error definitions and observer patterns.
pub use pillar_core as core;

/// Date, calendar, day counter, schedule and interest-rate types.
pub use pillar_time as time;

/// Root finders, interpolation and least-squares optimisation.
pub use pillar_math as math;

/// Market quotes.
pub use pillar_quotes as quotes;

/// Yield term structures, rate helpers and the bootstrap.
pub use pillar_termstructures as termstructures;

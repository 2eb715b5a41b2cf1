//! # pillar-quotes
//!
//! Market quotes that notify their observers when their value changes.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// `Quote` trait and concrete implementations.
pub mod quote;

pub use quote::{Quote, SimpleQuote};

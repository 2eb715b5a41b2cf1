//! Compounding conventions.

/// How interest accrues over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compounding {
    /// Simple interest: `1 + r·t`
    Simple,
    /// Compounded interest: `(1 + r/f)^(f·t)`
    Compounded,
    /// Continuously compounded: `e^(r·t)`
    #[default]
    Continuous,
    /// Simple up to the first compounding period, compounded thereafter.
    SimpleThenCompounded,
    /// Compounded up to the last period, simple thereafter.
    CompoundedThenSimple,
}

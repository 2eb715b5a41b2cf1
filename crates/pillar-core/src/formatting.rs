//! Formatting helpers for diagnostics.

use crate::Rate;

/// English ordinal suffix for `n` (`1` → `"st"`, `12` → `"th"`).
pub fn ordinal_suffix(n: usize) -> &'static str {
    match n % 100 {
        11..=13 => "th",
        _ => match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// `n` followed by its ordinal suffix (`22` → `"22nd"`).
pub fn ordinal(n: usize) -> String {
    format!("{n}{}", ordinal_suffix(n))
}

/// A rate as a percentage with six decimals (`0.05` → `"5.000000 %"`).
pub fn format_rate(r: Rate) -> String {
    format!("{:.6} %", r * 100.0)
}

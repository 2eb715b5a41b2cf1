//! Bootstrap traits: what quantity a piecewise curve interpolates.
//!
//! A piecewise curve stores one value per pillar. [`Discount`] stores
//! discount factors, [`ZeroYield`] continuously-compounded zero rates and
//! [`ForwardRate`] instantaneous forward rates. Each trait supplies the seed
//! values, the solver guesses and bracket bounds for a pillar, and the way a
//! discount factor is read back from the interpolation, extrapolating with
//! a flat instantaneous forward beyond the last pillar.

use pillar_core::{DiscountFactor, Rate, Real, Time};
use pillar_math::Interpolation1D;
use pillar_time::Date;

/// Rate level used for first-pillar guesses and rate-type seeds.
pub const AVG_RATE: Rate = 0.05;

/// Bounds on the rates a bootstrap may explore.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBounds {
    /// Largest absolute rate a pillar may imply.
    pub max_rate: Rate,
    /// Whether rates below zero are admissible.
    pub allow_negative_rates: bool,
}

impl Default for RateBounds {
    fn default() -> Self {
        Self {
            max_rate: 1.0,
            allow_negative_rates: true,
        }
    }
}

/// Policy describing the interpolated quantity of a piecewise curve.
///
/// Slices passed to the methods cover every pillar, index 0 being the
/// synthetic node at the reference date; `i >= 1` is the pillar at hand.
pub trait BootstrapTraits:
    std::fmt::Debug + Clone + Copy + Default + Send + Sync + 'static
{
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Date of the synthetic first node.
    fn initial_date(reference_date: Date) -> Date {
        reference_date
    }

    /// Value of the synthetic first node.
    fn initial_value() -> Real;

    /// Starting point for pillar `i`. With `valid_data` the value already
    /// stored for the pillar (a previous solution) is reused.
    fn guess(i: usize, times: &[Time], data: &[Real], valid_data: bool) -> Real;

    /// Lower bound for pillar `i`, given the pillars before it.
    fn min_value_after(i: usize, times: &[Time], data: &[Real], bounds: &RateBounds) -> Real;

    /// Upper bound for pillar `i`, given the pillars before it.
    fn max_value_after(i: usize, times: &[Time], data: &[Real], bounds: &RateBounds) -> Real;

    /// Store a trial value for pillar `i`.
    fn update_guess(data: &mut [Real], value: Real, i: usize) {
        data[i] = value;
    }

    /// Cap on passes for global interpolation schemes.
    fn max_iterations() -> usize;

    /// Discount factor at `t` read from an interpolation of this quantity.
    fn discount(interpolation: &dyn Interpolation1D, t: Time) -> DiscountFactor;
}

/// Interpolates discount factors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discount;

impl BootstrapTraits for Discount {
    const NAME: &'static str = "discount";

    fn initial_value() -> Real {
        1.0
    }

    fn guess(i: usize, times: &[Time], data: &[Real], valid_data: bool) -> Real {
        if valid_data {
            return data[i];
        }
        if i == 1 {
            return 1.0 / (1.0 + AVG_RATE * times[1]);
        }
        let f = (data[i - 2] / data[i - 1]).ln() / (times[i - 1] - times[i - 2]);
        data[i - 1] * (-f * (times[i] - times[i - 1])).exp()
    }

    fn min_value_after(i: usize, times: &[Time], data: &[Real], bounds: &RateBounds) -> Real {
        let dt = times[i] - times[i - 1];
        data[i - 1] * (-bounds.max_rate * dt).exp()
    }

    fn max_value_after(i: usize, times: &[Time], data: &[Real], bounds: &RateBounds) -> Real {
        if bounds.allow_negative_rates {
            let dt = times[i] - times[i - 1];
            data[i - 1] * (bounds.max_rate * dt).exp()
        } else {
            data[i - 1]
        }
    }

    fn max_iterations() -> usize {
        100
    }

    fn discount(interpolation: &dyn Interpolation1D, t: Time) -> DiscountFactor {
        let t_max = interpolation.x_max();
        if t <= t_max {
            return interpolation.value(t);
        }
        let d_max = interpolation.value(t_max);
        let forward = -interpolation.derivative(t_max) / d_max;
        d_max * (-forward * (t - t_max)).exp()
    }
}

fn rate_min(bounds: &RateBounds) -> Real {
    if bounds.allow_negative_rates {
        -bounds.max_rate
    } else {
        0.0
    }
}

/// Interpolates continuously-compounded zero rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroYield;

impl BootstrapTraits for ZeroYield {
    const NAME: &'static str = "zero-yield";

    fn initial_value() -> Real {
        AVG_RATE
    }

    fn guess(i: usize, times: &[Time], data: &[Real], valid_data: bool) -> Real {
        if valid_data {
            return data[i];
        }
        if i == 1 {
            return AVG_RATE;
        }
        // extend the flat forward between the previous two pillars
        let (t1, t2) = (times[i - 2], times[i - 1]);
        let f = (data[i - 1] * t2 - data[i - 2] * t1) / (t2 - t1);
        (data[i - 1] * t2 + f * (times[i] - t2)) / times[i]
    }

    fn min_value_after(_i: usize, _times: &[Time], _data: &[Real], bounds: &RateBounds) -> Real {
        rate_min(bounds)
    }

    fn max_value_after(_i: usize, _times: &[Time], _data: &[Real], bounds: &RateBounds) -> Real {
        bounds.max_rate
    }

    fn update_guess(data: &mut [Real], value: Real, i: usize) {
        data[i] = value;
        if i == 1 {
            // the rate at time zero is taken equal to the first pillar's
            data[0] = value;
        }
    }

    fn max_iterations() -> usize {
        30
    }

    fn discount(interpolation: &dyn Interpolation1D, t: Time) -> DiscountFactor {
        if t == 0.0 {
            return 1.0;
        }
        let t_max = interpolation.x_max();
        let zero = if t <= t_max {
            interpolation.value(t)
        } else {
            let z_max = interpolation.value(t_max);
            let forward = z_max + t_max * interpolation.derivative(t_max);
            (z_max * t_max + forward * (t - t_max)) / t
        };
        (-zero * t).exp()
    }
}

/// Interpolates instantaneous forward rates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardRate;

impl BootstrapTraits for ForwardRate {
    const NAME: &'static str = "forward-rate";

    fn initial_value() -> Real {
        AVG_RATE
    }

    fn guess(i: usize, _times: &[Time], data: &[Real], valid_data: bool) -> Real {
        if valid_data {
            return data[i];
        }
        if i == 1 {
            return AVG_RATE;
        }
        data[i - 1]
    }

    fn min_value_after(_i: usize, _times: &[Time], _data: &[Real], bounds: &RateBounds) -> Real {
        rate_min(bounds)
    }

    fn max_value_after(_i: usize, _times: &[Time], _data: &[Real], bounds: &RateBounds) -> Real {
        bounds.max_rate
    }

    fn update_guess(data: &mut [Real], value: Real, i: usize) {
        data[i] = value;
        if i == 1 {
            data[0] = value;
        }
    }

    fn max_iterations() -> usize {
        30
    }

    fn discount(interpolation: &dyn Interpolation1D, t: Time) -> DiscountFactor {
        let t_max = interpolation.x_max();
        let integral = if t <= t_max {
            interpolation.primitive(t)
        } else {
            interpolation.primitive(t_max) + interpolation.value(t_max) * (t - t_max)
        };
        (-integral).exp()
    }
}

//! Linear and log-linear interpolation.

use pillar_core::errors::Result;
use pillar_core::{ensure, Real};

use super::{check_nodes, cumulate, locate, Interpolation1D, Interpolator};

/// Piecewise-linear interpolation.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    slopes: Vec<Real>,
    integrals: Vec<Real>,
}

impl LinearInterpolation {
    /// Build over strictly increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let slopes: Vec<Real> = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
            .collect();
        let integrals = cumulate(
            xs.windows(2)
                .zip(ys.windows(2))
                .map(|(x, y)| 0.5 * (x[1] - x[0]) * (y[0] + y[1])),
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            slopes,
            integrals,
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        self.ys[i] + (x - self.xs[i]) * self.slopes[i]
    }

    fn derivative(&self, x: Real) -> Real {
        self.slopes[locate(&self.xs, x)]
    }

    fn primitive(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.integrals[i] + dx * (self.ys[i] + 0.5 * dx * self.slopes[i])
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

/// Linear interpolation of `ln y`; all ordinates must be positive.
#[derive(Debug, Clone)]
pub struct LogLinearInterpolation {
    log: LinearInterpolation,
    integrals: Vec<Real>,
}

/// `∫_0^h exp(a + b s) ds`
fn exp_integral(a: Real, b: Real, h: Real) -> Real {
    let bh = b * h;
    if bh.abs() < 1e-8 {
        a.exp() * h * (1.0 + 0.5 * bh + bh * bh / 6.0)
    } else {
        a.exp() * bh.exp_m1() / b
    }
}

impl LogLinearInterpolation {
    /// Build over strictly increasing `xs` and positive `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        ensure!(
            ys.iter().all(|&y| y > 0.0),
            "log-linear interpolation needs positive values"
        );
        let logs: Vec<Real> = ys.iter().map(|y| y.ln()).collect();
        let log = LinearInterpolation::new(xs, &logs)?;
        let integrals = cumulate(
            xs.windows(2)
                .enumerate()
                .map(|(i, x)| exp_integral(logs[i], log.slopes[i], x[1] - x[0])),
        );
        Ok(Self { log, integrals })
    }
}

impl Interpolation1D for LogLinearInterpolation {
    fn value(&self, x: Real) -> Real {
        self.log.value(x).exp()
    }

    fn derivative(&self, x: Real) -> Real {
        self.value(x) * self.log.derivative(x)
    }

    fn primitive(&self, x: Real) -> Real {
        let i = locate(&self.log.xs, x);
        self.integrals[i] + exp_integral(self.log.ys[i], self.log.slopes[i], x - self.log.xs[i])
    }

    fn x_min(&self) -> Real {
        self.log.x_min()
    }

    fn x_max(&self) -> Real {
        self.log.x_max()
    }
}

/// Factory for [`LinearInterpolation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Interpolator for Linear {
    const GLOBAL: bool = false;
    const REQUIRED_POINTS: usize = 2;

    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>> {
        Ok(Box::new(LinearInterpolation::new(xs, ys)?))
    }
}

/// Factory for [`LogLinearInterpolation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLinear;

impl Interpolator for LogLinear {
    const GLOBAL: bool = false;
    const REQUIRED_POINTS: usize = 2;

    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>> {
        Ok(Box::new(LogLinearInterpolation::new(xs, ys)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn linear_values_and_extrapolation() {
        let li = LinearInterpolation::new(&[0.0, 1.0, 3.0], &[1.0, 3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(li.value(0.5), 2.0);
        assert_abs_diff_eq!(li.value(2.0), 3.5);
        assert_abs_diff_eq!(li.value(5.0), 5.0);
        assert_abs_diff_eq!(li.value(-1.0), -1.0);
        assert_abs_diff_eq!(li.derivative(2.0), 0.5);
    }

    #[test]
    fn linear_primitive() {
        let li = LinearInterpolation::new(&[0.0, 1.0, 3.0], &[1.0, 3.0, 4.0]).unwrap();
        assert_abs_diff_eq!(li.primitive(1.0), 2.0);
        assert_abs_diff_eq!(li.primitive(3.0), 9.0);
        assert_abs_diff_eq!(li.primitive(2.0), 2.0 + 3.25);
    }

    #[test]
    fn log_linear_is_exponential_between_nodes() {
        let xs = [0.0, 1.0, 2.0];
        let ys: Vec<Real> = xs.iter().map(|&x: &Real| (-0.05 * x).exp()).collect();
        let ll = LogLinearInterpolation::new(&xs, &ys).unwrap();
        assert_abs_diff_eq!(ll.value(1.5), (-0.075_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(ll.value(3.0), (-0.15_f64).exp(), epsilon = 1e-15);
        assert_abs_diff_eq!(ll.derivative(0.5), -0.05 * (-0.025_f64).exp(), epsilon = 1e-14);
        let exact = (1.0 - (-0.1_f64).exp()) / 0.05;
        assert_abs_diff_eq!(ll.primitive(2.0), exact, epsilon = 1e-13);
    }

    #[test]
    fn log_linear_rejects_non_positive_values() {
        assert!(LogLinearInterpolation::new(&[0.0, 1.0], &[1.0, 0.0]).is_err());
    }
}

//! Backward-flat (piecewise-constant) interpolation.

use pillar_core::errors::Result;
use pillar_core::Real;

use super::{check_nodes, cumulate, Interpolation1D, Interpolator};

/// On `(x[i], x[i+1]]` the value is `y[i+1]`; left of the first node it is
/// `y[0]`, right of the last node `y[n-1]`.
#[derive(Debug, Clone)]
pub struct BackwardFlatInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
    integrals: Vec<Real>,
}

impl BackwardFlatInterpolation {
    /// Build over strictly increasing `xs`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let integrals = cumulate(
            xs.windows(2)
                .zip(ys.iter().skip(1))
                .map(|(x, y)| (x[1] - x[0]) * y),
        );
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            integrals,
        })
    }

    fn index(&self, x: Real) -> usize {
        self.xs.partition_point(|&v| v < x).min(self.xs.len() - 1)
    }
}

impl Interpolation1D for BackwardFlatInterpolation {
    fn value(&self, x: Real) -> Real {
        self.ys[self.index(x)]
    }

    fn derivative(&self, _x: Real) -> Real {
        0.0
    }

    fn primitive(&self, x: Real) -> Real {
        let n = self.xs.len();
        if x <= self.xs[0] {
            return (x - self.xs[0]) * self.ys[0];
        }
        if x >= self.xs[n - 1] {
            return self.integrals[n - 1] + (x - self.xs[n - 1]) * self.ys[n - 1];
        }
        let j = self.index(x);
        self.integrals[j - 1] + (x - self.xs[j - 1]) * self.ys[j]
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

/// Factory for [`BackwardFlatInterpolation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardFlat;

impl Interpolator for BackwardFlat {
    const GLOBAL: bool = false;
    const REQUIRED_POINTS: usize = 2;

    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>> {
        Ok(Box::new(BackwardFlatInterpolation::new(xs, ys)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn steps_take_the_right_node() {
        let bf = BackwardFlatInterpolation::new(&[0.0, 1.0, 2.0], &[0.01, 0.02, 0.03]).unwrap();
        assert_abs_diff_eq!(bf.value(-1.0), 0.01);
        assert_abs_diff_eq!(bf.value(0.0), 0.01);
        assert_abs_diff_eq!(bf.value(0.5), 0.02);
        assert_abs_diff_eq!(bf.value(1.0), 0.02);
        assert_abs_diff_eq!(bf.value(1.0 + 1e-12), 0.03);
        assert_abs_diff_eq!(bf.value(7.0), 0.03);
    }

    #[test]
    fn primitive_accumulates_steps() {
        let bf = BackwardFlatInterpolation::new(&[0.0, 1.0, 2.0], &[0.01, 0.02, 0.03]).unwrap();
        assert_abs_diff_eq!(bf.primitive(0.0), 0.0);
        assert_abs_diff_eq!(bf.primitive(0.5), 0.01, epsilon = 1e-16);
        assert_abs_diff_eq!(bf.primitive(1.0), 0.02, epsilon = 1e-16);
        assert_abs_diff_eq!(bf.primitive(1.5), 0.035, epsilon = 1e-16);
        assert_abs_diff_eq!(bf.primitive(3.0), 0.08, epsilon = 1e-16);
    }
}

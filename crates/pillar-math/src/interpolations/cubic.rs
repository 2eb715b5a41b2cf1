//! Natural cubic spline.
//!
//! Second derivatives vanish at both ends. On each interval the spline is
//!
//!   `f(x) = y_i + dx*(a_i + dx*(b_i + dx*c_i))`,  `dx = x - x_i`
//!
//! and outside the node range the first and last polynomials are extended.
//! Every node influences every interval, so the scheme is global.

use pillar_core::errors::Result;
use pillar_core::Real;

use super::{check_nodes, cumulate, locate, Interpolation1D, Interpolator};

/// Natural cubic spline through the nodes.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
    integrals: Vec<Real>,
}

/// Second derivatives at the nodes with zero end conditions, by the Thomas
/// algorithm on the tridiagonal continuity system.
fn second_derivatives(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<Real> = ys.windows(2).zip(&h).map(|(y, h)| (y[1] - y[0]) / h).collect();

    // forward sweep over interior rows 1..n-1
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    for i in 1..n - 1 {
        diag[i] = 2.0 * (h[i - 1] + h[i]);
        rhs[i] = 6.0 * (s[i] - s[i - 1]);
        if i > 1 {
            let w = h[i - 1] / diag[i - 1];
            diag[i] -= w * h[i - 1];
            rhs[i] -= w * rhs[i - 1];
        }
    }
    for i in (1..n - 1).rev() {
        m[i] = (rhs[i] - h[i] * m[i + 1]) / diag[i];
    }
    m
}

impl CubicNaturalSpline {
    /// Build over strictly increasing `xs`; two nodes give a straight line.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_nodes(xs, ys, 2)?;
        let m = second_derivatives(xs, ys);
        let n = xs.len();
        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let h = xs[i + 1] - xs[i];
            a.push((ys[i + 1] - ys[i]) / h - h * (2.0 * m[i] + m[i + 1]) / 6.0);
            b.push(0.5 * m[i]);
            c.push((m[i + 1] - m[i]) / (6.0 * h));
        }
        let integrals = cumulate((0..n - 1).map(|i| {
            let h = xs[i + 1] - xs[i];
            h * (ys[i] + h * (a[i] / 2.0 + h * (b[i] / 3.0 + h * c[i] / 4.0)))
        }));
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
            integrals,
        })
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }

    fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * dx * self.c[i])
    }

    fn primitive(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.integrals[i]
            + dx * (self.ys[i]
                + dx * (self.a[i] / 2.0 + dx * (self.b[i] / 3.0 + dx * self.c[i] / 4.0)))
    }

    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }
}

/// Factory for [`CubicNaturalSpline`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Cubic;

impl Interpolator for Cubic {
    const GLOBAL: bool = true;
    const REQUIRED_POINTS: usize = 2;

    fn build(&self, xs: &[Real], ys: &[Real]) -> Result<Box<dyn Interpolation1D>> {
        Ok(Box::new(CubicNaturalSpline::new(xs, ys)?))
    }
}

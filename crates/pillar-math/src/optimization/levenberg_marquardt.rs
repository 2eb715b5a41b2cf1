//! Levenberg-Marquardt with a forward-difference Jacobian.

use nalgebra::DMatrix;
use pillar_core::errors::{Error, Result};
use pillar_core::Real;

use super::{Array, CostFunction, EndCriteria, EndCriteriaType, OptimizationResult};

/// Damped Gauss-Newton least-squares minimiser.
///
/// Each step solves `(JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr`. Accepted steps divide
/// `λ` by ten, rejected ones multiply it by ten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevenbergMarquardt {
    /// Starting damping.
    pub initial_lambda: Real,
    /// Damping above which the minimiser gives up on finding a descent step.
    pub max_lambda: Real,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            initial_lambda: 1e-3,
            max_lambda: 1e16,
        }
    }
}

fn jacobian<C: CostFunction + ?Sized>(cost: &mut C, x: &Array, r: &Array) -> Result<DMatrix<Real>> {
    let h0 = Real::EPSILON.sqrt();
    let mut jac = DMatrix::zeros(r.len(), x.len());
    let mut xp = x.clone();
    for j in 0..x.len() {
        let h = h0 * x[j].abs().max(1.0);
        xp[j] = x[j] + h;
        let rp = cost.values(&xp)?;
        xp[j] = x[j];
        jac.set_column(j, &((rp - r) / h));
    }
    Ok(jac)
}

fn done(x: Array, r: Array, iterations: usize, end_type: EndCriteriaType) -> Result<OptimizationResult> {
    Ok(OptimizationResult {
        x,
        value: 0.5 * r.norm_squared(),
        residuals: r,
        iterations,
        end_type,
    })
}

impl LevenbergMarquardt {
    /// Minimise `cost` starting from `x0`.
    pub fn minimize<C: CostFunction + ?Sized>(
        &self,
        cost: &mut C,
        x0: &Array,
        end_criteria: &EndCriteria,
    ) -> Result<OptimizationResult> {
        let mut x = x0.clone();
        let mut r = cost.values(&x)?;
        let mut value = 0.5 * r.norm_squared();
        if !value.is_finite() {
            return Err(Error::Runtime("non-finite residuals at the starting point".into()));
        }
        let mut lambda = self.initial_lambda;
        let mut stationary = 0;

        for iteration in 0..end_criteria.max_iterations {
            if r.amax() <= end_criteria.root_epsilon {
                return done(x, r, iteration, EndCriteriaType::RootEpsilon);
            }
            let jac = jacobian(cost, &x, &r)?;
            let jtj = jac.transpose() * &jac;
            let gradient = jac.transpose() * &r;
            if gradient.norm() <= end_criteria.gradient_norm_epsilon {
                return done(x, r, iteration, EndCriteriaType::GradientNormEpsilon);
            }

            // inner loop: raise the damping until the step lowers the cost
            let accepted = loop {
                let mut a = jtj.clone();
                for k in 0..a.nrows() {
                    a[(k, k)] += lambda * jtj[(k, k)].max(1e-12);
                }
                let step = a.lu().solve(&(-&gradient));
                if let Some(step) = step {
                    let candidate = &x + step;
                    let rc = cost.values(&candidate)?;
                    let vc = 0.5 * rc.norm_squared();
                    if vc.is_finite() && vc < value {
                        lambda = (lambda / 10.0).max(1e-20);
                        break Some((candidate, rc, vc));
                    }
                }
                lambda *= 10.0;
                if lambda > self.max_lambda {
                    break None;
                }
            };

            let Some((candidate, rc, vc)) = accepted else {
                return done(x, r, iteration + 1, EndCriteriaType::StationaryPoint);
            };
            let decrease = (value - vc) / value.max(Real::MIN_POSITIVE);
            x = candidate;
            r = rc;
            value = vc;
            if decrease < end_criteria.function_epsilon {
                stationary += 1;
                if stationary >= end_criteria.max_stationary_state_iterations {
                    return done(x, r, iteration + 1, EndCriteriaType::StationaryPoint);
                }
            } else {
                stationary = 0;
            }
        }
        if r.amax() <= end_criteria.root_epsilon {
            return done(x, r, end_criteria.max_iterations, EndCriteriaType::RootEpsilon);
        }
        done(x, r, end_criteria.max_iterations, EndCriteriaType::MaxIterations)
    }
}

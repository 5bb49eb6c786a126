//! Backtracking gradient descent over a [`FirstOrderProblem`].
//!
//! Steps along the negative gradient with accept/reject step control:
//! an improving trial is accepted and the step grows, a worsening trial is
//! rejected and the step shrinks. Stops on gradient tolerance, the
//! iteration limit, or when the step underflows `min_step`.

use log::{debug, trace};

use crate::config::DescentConfig;
use crate::error::Result;

use super::FirstOrderProblem;

/// Outcome of a descent run.
#[derive(Clone, Debug)]
pub struct DescentResult {
    /// Final parameter vector
    pub parameters: Vec<f64>,
    /// Final cost
    pub cost: f64,
    /// Step attempts performed (accepted and rejected)
    pub iterations: usize,
    /// Whether the gradient tolerance was reached
    pub converged: bool,
}

/// Minimize `problem` starting from `initial`.
///
/// Evaluation errors (`Cancelled`, `SmootherDiverged`) propagate unchanged.
pub fn minimize<P: FirstOrderProblem>(
    problem: &P,
    initial: &[f64],
    config: &DescentConfig,
) -> Result<DescentResult> {
    let n = problem.num_parameters();
    debug_assert_eq!(initial.len(), n);

    let mut parameters = initial.to_vec();
    let mut gradient = vec![0.0; n];
    let mut cost = 0.0;
    problem.evaluate(&parameters, &mut cost, &mut gradient)?;

    let mut trial = vec![0.0; n];
    let mut trial_gradient = vec![0.0; n];
    let mut step = config.initial_step;
    let mut iterations = 0;
    let mut converged = false;

    for iteration in 0..config.max_iterations {
        iterations = iteration + 1;

        let gradient_norm: f64 = gradient.iter().map(|g| g * g).sum::<f64>().sqrt();
        if gradient_norm < config.gradient_tolerance {
            converged = true;
            break;
        }

        for k in 0..n {
            trial[k] = parameters[k] - step * gradient[k];
        }
        let mut trial_cost = 0.0;
        problem.evaluate(&trial, &mut trial_cost, &mut trial_gradient)?;

        if trial_cost < cost {
            std::mem::swap(&mut parameters, &mut trial);
            std::mem::swap(&mut gradient, &mut trial_gradient);
            cost = trial_cost;
            step = (step * config.step_grow).min(config.max_step);
        } else {
            step *= config.step_shrink;
            if step < config.min_step {
                trace!("[descent] step underflow at iteration {}", iterations);
                break;
            }
        }
    }

    debug!(
        "[descent] finished: cost={:.6} iterations={} converged={}",
        cost, iterations, converged
    );

    Ok(DescentResult {
        parameters,
        cost,
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// f(x) = Σ (x_k − t_k)², minimized at t.
    struct Quadratic {
        target: Vec<f64>,
    }

    impl FirstOrderProblem for Quadratic {
        fn num_parameters(&self) -> usize {
            self.target.len()
        }

        fn evaluate(&self, parameters: &[f64], cost: &mut f64, gradient: &mut [f64]) -> Result<()> {
            *cost = 0.0;
            for k in 0..self.target.len() {
                let d = parameters[k] - self.target[k];
                *cost += d * d;
                gradient[k] = 2.0 * d;
            }
            Ok(())
        }
    }

    #[test]
    fn test_minimizes_quadratic() {
        let problem = Quadratic {
            target: vec![1.0, -2.0, 3.5],
        };
        let config = DescentConfig {
            max_iterations: 1000,
            ..Default::default()
        };
        let result = minimize(&problem, &[0.0, 0.0, 0.0], &config).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.parameters[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(result.parameters[1], -2.0, epsilon = 1e-5);
        assert_relative_eq!(result.parameters[2], 3.5, epsilon = 1e-5);
        assert!(result.cost < 1e-9);
    }

    #[test]
    fn test_stationary_start_converges_immediately() {
        let problem = Quadratic {
            target: vec![2.0, 2.0],
        };
        let result = minimize(&problem, &[2.0, 2.0], &DescentConfig::default()).unwrap();
        assert!(result.converged);
        assert_eq!(result.iterations, 1);
        assert_eq!(result.parameters, vec![2.0, 2.0]);
    }
}

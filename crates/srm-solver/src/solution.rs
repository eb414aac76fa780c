//! Solver output.

use srm_model::Problem;

/// Diagnostics from a sequential (signomial) solve.
#[derive(Clone, Debug, PartialEq)]
pub struct RelaxationReport {
    /// Convex sub-solves performed.
    pub iterations: usize,
    /// Largest slack at the final iterate (1 means no relaxation).
    pub max_slack: f64,
    /// Approximation gap after each sub-solve.
    pub residual_history: Vec<f64>,
}

impl RelaxationReport {
    pub fn final_residual(&self) -> f64 {
        self.residual_history.last().copied().unwrap_or(0.0)
    }
}

/// Optimal point of a `Problem`.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// One SI value per problem variable, in problem order.
    pub values: Vec<f64>,
    /// Objective value at `values`.
    pub objective: f64,
    /// Newton steps (geometric solve) or total Newton steps over all
    /// sub-solves (sequential solve).
    pub iterations: usize,
    pub relaxation: Option<RelaxationReport>,
}

impl Solution {
    /// Value of the variable called `name`.
    pub fn value(&self, problem: &Problem, name: &str) -> Option<f64> {
        problem.index_of(name).and_then(|i| self.values.get(i).copied())
    }

    /// Largest relative violation over the problem's constraints.
    pub fn max_residual(&self, problem: &Problem) -> f64 {
        problem
            .constraints
            .iter()
            .map(|c| c.residual(&self.values))
            .fold(0.0, f64::max)
    }
}

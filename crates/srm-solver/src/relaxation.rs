//! Sequential convexification for signomial programs.
//!
//! Each iteration freezes a local monomial approximation of every multi-term
//! side that would otherwise have to be a monomial, relaxes the approximated
//! constraints by slacks `s_i >= 1` that are penalised in the objective
//! (`objective · Π s_i^penalty`), and solves the resulting geometric program
//! with an inner solver. The approximations underestimate the posynomials
//! they replace, so every sub-problem with all slacks at 1 is a conservative
//! restriction of the signomial problem.

use crate::error::{SolverError, SolverResult};
use crate::solution::{RelaxationReport, Solution};
use crate::solver::Solver;
use srm_core::relative_change;
use srm_model::{CompiledConstraint, ConstraintForm, Posynomial, Problem, Term};

/// Upper limit on every slack. Keeps phase I of an infeasible sub-problem
/// from trading the violation for an unbounded slack.
const SLACK_CAP: f64 = 1e30;

/// Relaxation driver configuration.
#[derive(Clone, Debug)]
pub struct RelaxationConfig {
    /// Convex sub-solves before giving up
    pub max_iterations: usize,
    /// Converged when every variable changes by less than this (relative)
    pub rel_tol: f64,
    /// Converged when every slack is within this of 1
    pub slack_tol: f64,
    /// Exponent of each slack in the penalised objective
    pub penalty: f64,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            rel_tol: 1e-4,
            slack_tol: 1e-6,
            penalty: 200.0,
        }
    }
}

/// Bookkeeping for one sequential solve; discarded when the solve ends.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RelaxationState {
    pub iteration: usize,
    pub residual_history: Vec<f64>,
    pub max_slack: f64,
    pub max_change: f64,
}

impl RelaxationState {
    pub fn new() -> Self {
        Self {
            max_slack: 1.0,
            max_change: f64::INFINITY,
            ..Self::default()
        }
    }

    pub fn record(&mut self, residual: f64, max_slack: f64, max_change: f64) {
        self.iteration += 1;
        self.residual_history.push(residual);
        self.max_slack = max_slack;
        self.max_change = max_change;
    }

    pub fn residual(&self) -> f64 {
        self.residual_history.last().copied().unwrap_or(f64::INFINITY)
    }

    pub fn converged(&self, config: &RelaxationConfig) -> bool {
        self.max_change <= config.rel_tol && self.max_slack - 1.0 <= config.slack_tol
    }

    pub fn into_report(self) -> RelaxationReport {
        RelaxationReport {
            iterations: self.iteration,
            max_slack: self.max_slack,
            residual_history: self.residual_history,
        }
    }
}

/// Relaxation driver around a geometric-program solver.
///
/// Geometric problems are passed straight to the inner solver.
#[derive(Clone, Debug, Default)]
pub struct SequentialSolver<S: Solver> {
    pub inner: S,
    pub config: RelaxationConfig,
}

impl<S: Solver> SequentialSolver<S> {
    pub fn new(inner: S, config: RelaxationConfig) -> Self {
        Self { inner, config }
    }

    /// Geometric program approximating `problem` around `x`. Slack variables
    /// are appended after the problem's own variables and bounded to
    /// `1 <= s <= SLACK_CAP`.
    pub fn convexify(&self, problem: &Problem, x: &[f64]) -> Problem {
        let mut gp = Problem {
            name: format!("{} (convexified)", problem.name),
            variables: problem.variables.clone(),
            objective: Posynomial::default(),
            constraints: Vec::with_capacity(problem.constraints.len()),
        };
        let mut penalty = Term::constant(1.0);
        let mut slacks = Vec::new();

        for c in &problem.constraints {
            match c.form {
                ConstraintForm::MonomialEquality | ConstraintForm::PosynomialInequality => {
                    gp.constraints.push(c.clone());
                    continue;
                }
                ConstraintForm::SignomialInequality => {
                    let s = gp.add_variable(format!("slack[{}]", c.label));
                    let greater = c.greater.monomial_approximation(x);
                    gp.constraints.push(CompiledConstraint::posynomial_le(
                        c.label.clone(),
                        c.lesser.clone(),
                        greater.times(&Term::variable(s)),
                    ));
                    slacks.push((s, c.label.as_str()));
                }
                ConstraintForm::SignomialEquality => {
                    let s = gp.add_variable(format!("slack[{}]", c.label));
                    let lesser = c.lesser.monomial_approximation(x);
                    let greater = c.greater.monomial_approximation(x);
                    gp.constraints.push(CompiledConstraint::posynomial_le(
                        format!("{} (upper)", c.label),
                        c.lesser.clone(),
                        greater.times(&Term::variable(s)),
                    ));
                    gp.constraints.push(CompiledConstraint::posynomial_le(
                        format!("{} (lower)", c.label),
                        c.greater.clone(),
                        lesser.times(&Term::variable(s)),
                    ));
                    slacks.push((s, c.label.as_str()));
                }
            }
        }

        for (s, label) in slacks {
            gp.constraints.push(CompiledConstraint::posynomial_le(
                format!("slack[{label}] >= 1"),
                Posynomial::new(vec![Term::constant(1.0)]),
                Term::variable(s),
            ));
            gp.constraints.push(CompiledConstraint::posynomial_le(
                format!("slack[{label}] cap"),
                Posynomial::new(vec![Term::variable(s)]),
                Term::constant(SLACK_CAP),
            ));
            penalty = penalty.times(&Term {
                coeff: 1.0,
                exponents: vec![(s, self.config.penalty)],
            });
        }
        gp.objective = problem.objective.times(&penalty);
        gp
    }
}

/// Largest relative gap, at `next`, between each approximated side (frozen
/// at `current`) and the posynomial it stands for.
fn approximation_gap(problem: &Problem, current: &[f64], next: &[f64]) -> f64 {
    let gap = |p: &Posynomial| {
        let exact = p.eval(next);
        (p.monomial_approximation(current).eval(next) - exact).abs() / exact
    };
    problem
        .signomial_constraints()
        .map(|c| match c.form {
            ConstraintForm::SignomialEquality => gap(&c.lesser).max(gap(&c.greater)),
            _ => gap(&c.greater),
        })
        .fold(0.0, f64::max)
}

impl<S: Solver> Solver for SequentialSolver<S> {
    fn solve_from(&self, problem: &Problem, start: &[f64]) -> SolverResult<Solution> {
        if problem.is_geometric() {
            return self.inner.solve_from(problem, start);
        }

        let n = problem.variables.len();
        let mut x = start.to_vec();
        let mut state = RelaxationState::new();
        let mut newton_steps = 0;

        while state.iteration < self.config.max_iterations {
            let gp = self.convexify(problem, &x);
            let mut gp_start = x.clone();
            gp_start.resize(gp.variables.len(), 1.0);
            let sub = self.inner.solve_from(&gp, &gp_start)?;
            newton_steps += sub.iterations;

            let next = sub.values[..n].to_vec();
            let max_slack = sub.values[n..].iter().copied().fold(1.0, f64::max);
            let residual = approximation_gap(problem, &x, &next);
            let max_change = next
                .iter()
                .zip(&x)
                .map(|(&new, &old)| relative_change(new, old))
                .fold(0.0, f64::max);
            state.record(residual, max_slack, max_change);
            tracing::debug!(
                problem = %problem.name,
                iteration = state.iteration,
                residual,
                max_slack,
                max_change,
                "relaxation step"
            );
            x = next;

            if state.converged(&self.config) {
                let objective = problem.objective.eval(&x);
                tracing::info!(
                    problem = %problem.name,
                    iterations = state.iteration,
                    objective,
                    "signomial relaxation converged"
                );
                return Ok(Solution {
                    values: x,
                    objective,
                    iterations: newton_steps,
                    relaxation: Some(state.into_report()),
                });
            }
        }

        Err(SolverError::RelaxationNonConvergence {
            iterations: state.iteration,
            residual: state.residual(),
            max_slack: state.max_slack,
            last_iterate: problem
                .variables
                .iter()
                .map(|v| v.name.clone())
                .zip(x)
                .collect(),
        })
    }
}

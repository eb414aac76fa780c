//! Log-barrier interior-point solver for geometric programs.
//!
//! The problem is solved in log space (`y = ln x`), where posynomial
//! inequalities become convex log-sum-exp rows and monomial equalities
//! become linear equations `G·y = h`. The equalities are eliminated by
//! parametrising their solution set (`y = y0 + Z·z`, `Z` a null-space basis),
//! then a phase-I search finds a strictly feasible point and the barrier
//! method follows the central path to the optimum.

use crate::error::{SolverError, SolverResult};
use crate::lse::LogSumExp;
use crate::solution::Solution;
use crate::solver::Solver;
use nalgebra::{DMatrix, DVector};
use srm_model::{CompiledConstraint, ConstraintForm, Problem, Term};

/// Largest `|ln x|` before a variable counts as escaped (`e^709` overflows).
const MAX_LOG: f64 = 690.0;

/// Longest Newton step in any log coordinate.
const MAX_STEP: f64 = 10.0;

/// Barrier method configuration.
#[derive(Clone, Debug)]
pub struct BarrierConfig {
    /// Initial barrier weight
    pub t0: f64,
    /// Barrier weight growth per outer iteration
    pub mu: f64,
    /// Stop when `m / t` (duality gap bound, log objective) is below this
    pub gap_tol: f64,
    /// Newton decrement tolerance for centering
    pub newton_tol: f64,
    /// Maximum Newton steps per centering
    pub max_newton: usize,
    /// Maximum outer (barrier weight) iterations
    pub max_outer: usize,
    /// Armijo sufficient-decrease fraction
    pub armijo: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Allowed violation of monomial equalities, in log space
    pub equality_tol: f64,
}

impl Default for BarrierConfig {
    fn default() -> Self {
        Self {
            t0: 1.0,
            mu: 20.0,
            gap_tol: 1e-8,
            newton_tol: 1e-12,
            max_newton: 100,
            max_outer: 50,
            armijo: 0.25,
            line_search_beta: 0.5,
            max_line_search_iters: 60,
            equality_tol: 1e-8,
        }
    }
}

/// Interior-point GP solver. Rejects signomial constraints.
#[derive(Clone, Debug, Default)]
pub struct BarrierSolver {
    pub config: BarrierConfig,
}

impl BarrierSolver {
    pub fn new(config: BarrierConfig) -> Self {
        Self { config }
    }
}

/// Log-space form of a geometric program.
struct LogProblem<'a> {
    objective: LogSumExp,
    inequalities: Vec<(&'a str, LogSumExp)>,
    equalities: Vec<(&'a str, DVector<f64>, f64)>,
}

fn monomial_side(c: &CompiledConstraint) -> SolverResult<&Term> {
    c.greater
        .as_monomial()
        .ok_or_else(|| SolverError::NotGeometric {
            constraint: c.label.clone(),
        })
}

fn log_problem(problem: &Problem) -> SolverResult<LogProblem<'_>> {
    let n = problem.variables.len();
    let mut inequalities = Vec::new();
    let mut equalities = Vec::new();
    for c in &problem.constraints {
        match c.form {
            ConstraintForm::PosynomialInequality => {
                let g = monomial_side(c)?;
                inequalities.push((c.label.as_str(), LogSumExp::from_ratio(&c.lesser, g)));
            }
            ConstraintForm::MonomialEquality => {
                let g = monomial_side(c)?;
                let (row, offset) = LogSumExp::from_ratio(&c.lesser, g)
                    .affine_row(n)
                    .ok_or_else(|| SolverError::NotGeometric {
                        constraint: c.label.clone(),
                    })?;
                equalities.push((c.label.as_str(), row, -offset));
            }
            ConstraintForm::SignomialEquality | ConstraintForm::SignomialInequality => {
                return Err(SolverError::NotGeometric {
                    constraint: c.label.clone(),
                });
            }
        }
    }
    Ok(LogProblem {
        objective: LogSumExp::from_posynomial(&problem.objective),
        inequalities,
        equalities,
    })
}

/// Solution set of the equalities: `y = origin + basis·z`.
struct Subspace {
    origin: DVector<f64>,
    basis: DMatrix<f64>,
}

impl Subspace {
    fn dim(&self) -> usize {
        self.basis.ncols()
    }

    fn point(&self, z: &DVector<f64>) -> DVector<f64> {
        if self.dim() == 0 {
            return self.origin.clone();
        }
        &self.origin + &self.basis * z
    }
}

/// Project `start` onto the equality set and find a basis of its directions.
fn equality_subspace(
    equalities: &[(&str, DVector<f64>, f64)],
    start: DVector<f64>,
    tol: f64,
) -> SolverResult<Subspace> {
    let n = start.len();
    if equalities.is_empty() {
        return Ok(Subspace {
            origin: start,
            basis: DMatrix::identity(n, n),
        });
    }

    let p = equalities.len();
    let g = DMatrix::from_fn(p, n, |r, c| equalities[r].1[c]);
    let h = DVector::from_fn(p, |r, _| equalities[r].2);

    let correction = g
        .clone()
        .svd(true, true)
        .solve(&(&h - &g * &start), 1e-12)
        .map_err(|e| SolverError::Numeric {
            what: format!("equality projection failed: {e}"),
        })?;
    let origin = start + correction;

    let violation = &g * &origin - &h;
    let (row, worst) = violation
        .iter()
        .enumerate()
        .fold((0, 0.0_f64), |acc, (i, v)| {
            if v.abs() > acc.1 { (i, v.abs()) } else { acc }
        });
    if worst > tol * (1.0 + h.amax()) {
        return Err(SolverError::Infeasible {
            what: format!(
                "monomial equalities are inconsistent (worst: '{}', log residual {worst:.3e})",
                equalities[row].0
            ),
        });
    }

    let eig = (g.transpose() * &g).symmetric_eigen();
    let cutoff = 1e-9 * eig.eigenvalues.amax().max(f64::MIN_POSITIVE);
    let columns: Vec<DVector<f64>> = eig
        .eigenvalues
        .iter()
        .enumerate()
        .filter(|&(_, &lambda)| lambda <= cutoff)
        .map(|(i, _)| eig.eigenvectors.column(i).into_owned())
        .collect();
    let basis = if columns.is_empty() {
        DMatrix::zeros(n, 0)
    } else {
        DMatrix::from_columns(&columns)
    };
    Ok(Subspace { origin, basis })
}

/// Barrier function over `w = z` (phase II) or `w = (z, σ)` (phase I).
struct Barrier<'a> {
    space: &'a Subspace,
    objective: &'a LogSumExp,
    constraints: &'a [(&'a str, LogSumExp)],
    names: &'a [String],
    phase_one: bool,
}

impl Barrier<'_> {
    fn y(&self, w: &DVector<f64>) -> DVector<f64> {
        let z = w.rows(0, self.space.dim()).into_owned();
        self.space.point(&z)
    }

    fn sigma(&self, w: &DVector<f64>) -> f64 {
        if self.phase_one {
            w[self.space.dim()]
        } else {
            0.0
        }
    }

    /// Barrier value, `None` outside the strict interior.
    fn phi(&self, w: &DVector<f64>, t: f64) -> Option<f64> {
        let y = self.y(w);
        let sigma = self.sigma(w);
        let mut value = if self.phase_one {
            t * sigma
        } else {
            t * self.objective.value(&y)
        };
        for (_, c) in self.constraints {
            let slack = sigma - c.value(&y);
            if !(slack > 0.0) {
                return None;
            }
            value -= slack.ln();
        }
        value.is_finite().then_some(value)
    }

    fn derivatives(&self, w: &DVector<f64>, t: f64) -> (DVector<f64>, DMatrix<f64>) {
        let y = self.y(w);
        let n = y.len();
        let k = self.space.dim();
        let sigma = self.sigma(w);

        let mut grad_y = DVector::zeros(n);
        let mut hess_y = DMatrix::zeros(n, n);
        let mut grad_s = 0.0;
        let mut hess_ss = 0.0;
        let mut hess_ys = DVector::zeros(n);

        if self.phase_one {
            grad_s = t;
        } else {
            let (_, g, h) = self.objective.derivatives(&y);
            grad_y += g * t;
            hess_y += h * t;
        }
        for (_, c) in self.constraints {
            let (f, g, h) = c.derivatives(&y);
            let slack = sigma - f;
            let inv = 1.0 / slack;
            hess_y += h * inv + (&g * g.transpose()) * (inv * inv);
            if self.phase_one {
                grad_s -= inv;
                hess_ss += inv * inv;
                hess_ys -= &g * (inv * inv);
            }
            grad_y += g * inv;
        }

        let basis = &self.space.basis;
        let gz = basis.transpose() * grad_y;
        let hz = basis.transpose() * hess_y * basis;
        if !self.phase_one {
            return (gz, hz);
        }

        let hzs = basis.transpose() * hess_ys;
        let mut grad = DVector::zeros(k + 1);
        let mut hess = DMatrix::zeros(k + 1, k + 1);
        grad.rows_mut(0, k).copy_from(&gz);
        grad[k] = grad_s;
        hess.view_mut((0, 0), (k, k)).copy_from(&hz);
        for i in 0..k {
            hess[(i, k)] = hzs[i];
            hess[(k, i)] = hzs[i];
        }
        hess[(k, k)] = hess_ss;
        (grad, hess)
    }

    fn check_range(&self, w: &DVector<f64>) -> SolverResult<()> {
        let y = self.y(w);
        match y.iter().position(|v| !(v.abs() <= MAX_LOG)) {
            Some(i) => Err(SolverError::Unbounded {
                variable: self.names[i].clone(),
            }),
            None => Ok(()),
        }
    }

    /// Damped Newton minimisation of the barrier for fixed `t`.
    /// Returns `true` when `stop` fired.
    fn centre(
        &self,
        w: &mut DVector<f64>,
        t: f64,
        config: &BarrierConfig,
        steps: &mut usize,
        stop: &dyn Fn(&DVector<f64>) -> bool,
    ) -> SolverResult<bool> {
        for _ in 0..config.max_newton {
            let (g, mut h) = self.derivatives(w, t);
            let reg = 1e-10 * (1.0 + h.diagonal().amax());
            for i in 0..h.nrows() {
                h[(i, i)] += reg;
            }
            let mut dw = newton_step(h, &g)?;

            let decrement = -g.dot(&dw);
            if !decrement.is_finite() {
                return Err(SolverError::Numeric {
                    what: "non-finite Newton decrement".to_string(),
                });
            }
            if decrement <= 2.0 * config.newton_tol {
                // Inside the quadratic region a last full step is nearly free.
                let candidate = &*w + &dw;
                if self.phi(&candidate, t).is_some() {
                    *w = candidate;
                }
                return Ok(false);
            }
            let largest = dw.amax();
            if largest > MAX_STEP {
                dw *= MAX_STEP / largest;
            }
            let slope = g.dot(&dw);

            let phi0 = self.phi(w, t).ok_or_else(|| SolverError::Numeric {
                what: "iterate left the barrier domain".to_string(),
            })?;
            let mut step = 1.0;
            let mut accepted = None;
            for _ in 0..config.max_line_search_iters {
                let candidate = &*w + &dw * step;
                let decreased = self
                    .phi(&candidate, t)
                    .is_some_and(|v| v <= phi0 + config.armijo * step * slope);
                if decreased {
                    accepted = Some(candidate);
                    break;
                }
                step *= config.line_search_beta;
            }
            // No acceptable step: centred to working precision.
            let Some(candidate) = accepted else {
                return Ok(false);
            };

            *w = candidate;
            *steps += 1;
            if stop(w) {
                return Ok(true);
            }
            self.check_range(w)?;
        }
        tracing::debug!(t, "centering reached the Newton step limit");
        Ok(false)
    }

    /// Follow the central path. Returns `true` when `stop` fired.
    fn run(
        &self,
        w: &mut DVector<f64>,
        config: &BarrierConfig,
        steps: &mut usize,
        stop: &dyn Fn(&DVector<f64>) -> bool,
    ) -> SolverResult<bool> {
        let m = self.constraints.len() as f64;
        let mut t = config.t0;
        for _ in 0..config.max_outer {
            if self.centre(w, t, config, steps, stop)? {
                return Ok(true);
            }
            if self.constraints.is_empty() || m / t < config.gap_tol {
                return Ok(false);
            }
            t *= config.mu;
        }
        Err(SolverError::ConvergenceFailed {
            what: format!(
                "barrier weight {t:.3e} after {} outer iterations, gap bound {:.3e}",
                config.max_outer,
                m / t
            ),
        })
    }
}

fn newton_step(h: DMatrix<f64>, g: &DVector<f64>) -> SolverResult<DVector<f64>> {
    let rhs = -g.clone();
    if let Some(dx) = h.clone().lu().solve(&rhs) {
        if dx.iter().all(|v| v.is_finite()) {
            return Ok(dx);
        }
    }
    h.svd(true, true)
        .solve(&rhs, 1e-14)
        .map_err(|e| SolverError::Numeric {
            what: format!("Newton system solve failed: {e}"),
        })
}

fn worst_constraint<'a>(constraints: &[(&'a str, LogSumExp)], y: &DVector<f64>) -> (&'a str, f64) {
    constraints
        .iter()
        .map(|(label, c)| (*label, c.value(y)))
        .fold(("", f64::NEG_INFINITY), |acc, cur| {
            if cur.1 > acc.1 { cur } else { acc }
        })
}

impl Solver for BarrierSolver {
    fn solve_from(&self, problem: &Problem, start: &[f64]) -> SolverResult<Solution> {
        let config = &self.config;
        let n = problem.variables.len();
        if start.len() != n {
            return Err(SolverError::Numeric {
                what: format!("start point has {} values for {n} variables", start.len()),
            });
        }
        if let Some(i) = start.iter().position(|x| !(x.is_finite() && *x > 0.0)) {
            return Err(SolverError::Numeric {
                what: format!(
                    "start value for '{}' must be positive, got {}",
                    problem.variables[i].name, start[i]
                ),
            });
        }

        let lp = log_problem(problem)?;
        let names: Vec<String> = problem.variables.iter().map(|v| v.name.clone()).collect();
        let y_start = DVector::from_iterator(n, start.iter().map(|x| x.ln()));
        let space = equality_subspace(&lp.equalities, y_start, config.equality_tol)?;
        let k = space.dim();
        let mut steps = 0;

        let y = if k == 0 {
            let y = space.origin.clone();
            let (label, worst) = worst_constraint(&lp.inequalities, &y);
            if worst > config.equality_tol {
                return Err(SolverError::Infeasible {
                    what: format!("equalities fix every variable and violate '{label}'"),
                });
            }
            y
        } else {
            let mut z = DVector::zeros(k);
            let (_, worst) = worst_constraint(&lp.inequalities, &space.point(&z));
            if worst >= 0.0 {
                let phase_one = Barrier {
                    space: &space,
                    objective: &lp.objective,
                    constraints: &lp.inequalities,
                    names: &names,
                    phase_one: true,
                };
                let mut w = DVector::zeros(k + 1);
                w[k] = worst + 1.0;
                let feasible = phase_one.run(&mut w, config, &mut steps, &|w: &DVector<f64>| w[k] < 0.0)?;
                if !feasible {
                    let (label, _) = worst_constraint(&lp.inequalities, &phase_one.y(&w));
                    return Err(SolverError::Infeasible {
                        what: format!(
                            "no strictly feasible point (phase I margin {:.3e}, tightest '{label}')",
                            w[k]
                        ),
                    });
                }
                z = w.rows(0, k).into_owned();
                tracing::debug!(steps, "phase I found a strictly feasible point");
            }

            let phase_two = Barrier {
                space: &space,
                objective: &lp.objective,
                constraints: &lp.inequalities,
                names: &names,
                phase_one: false,
            };
            phase_two.run(&mut z, config, &mut steps, &|_: &DVector<f64>| false)?;
            space.point(&z)
        };

        let values: Vec<f64> = y.iter().map(|v| v.exp()).collect();
        let objective = problem.objective.eval(&values);
        tracing::debug!(
            problem = %problem.name,
            newton_steps = steps,
            objective,
            "geometric program solved"
        );
        Ok(Solution {
            values,
            objective,
            iterations: steps,
            relaxation: None,
        })
    }
}

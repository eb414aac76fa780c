//! Scenario harness: bind boundary conditions to a fresh section, solve, and
//! check the result.

use crate::error::{AppError, AppResult};
use crate::report::SectionState;
use serde::{Deserialize, Serialize};
use srm_core::Measured;
use srm_core::units::{Measure, cm, cm2, k, kgps, kpa, mps};
use srm_model::{Model, ModelError, ModelResult, Monomial, Objective, Problem, VariableBounds};
use srm_section::{BurnSection, SectionOptions, exit_momentum_objective};
use srm_solver::{BarrierSolver, DefaultSolver, RelaxationConfig, Solution, Solver};
use tracing::{debug, info, warn};

/// Relative violation accepted for any relation at a returned solution.
pub const RESIDUAL_TOL: f64 = 1e-5;

/// Objective of a scenario.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveSpec {
    /// Exit velocity times exit stagnation pressure.
    #[default]
    ExitMomentum,
    /// Minimise the product of the named quantities.
    Minimize(Vec<String>),
    /// Maximise the product of the named quantities.
    Maximize(Vec<String>),
}

impl ObjectiveSpec {
    fn build(&self, section: &BurnSection) -> ModelResult<Objective> {
        let product = |names: &[String]| -> ModelResult<Monomial> {
            names.iter().try_fold(Monomial::constant(1.0), |acc, name| {
                Ok(acc * section.registry().var(name)?)
            })
        };
        Ok(match self {
            ObjectiveSpec::ExitMomentum => exit_momentum_objective(section.vars()),
            ObjectiveSpec::Minimize(names) => {
                Objective::minimize(format!("minimize {}", names.join("*")), product(names)?)
            }
            ObjectiveSpec::Maximize(names) => {
                Objective::maximize(format!("maximize {}", names.join("*")), product(names)?)
            }
        })
    }
}

/// One runnable instance of a burn section.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: String,
    pub options: SectionOptions,
    /// Boundary conditions, applied in order.
    pub fixed: Vec<(String, Measured)>,
    pub objective: ObjectiveSpec,
    pub bounds: Option<VariableBounds>,
    /// Starting values for free quantities; the rest start at 1 (SI).
    pub initial_guess: Vec<(String, Measured)>,
    pub relaxation: RelaxationConfig,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: SectionOptions::default(),
            fixed: Vec::new(),
            objective: ObjectiveSpec::default(),
            bounds: Some(VariableBounds::default()),
            initial_guess: Vec::new(),
            relaxation: RelaxationConfig::default(),
        }
    }

    /// The standard section test: 1000 kPa, 1 cm, 700 K, 1 kg/s, 10 cm^2,
    /// 10 m/s at the inlet, exact balances, minimise exit momentum.
    pub fn reference() -> Self {
        let mut scenario = Self::new("reference");
        scenario.options = SectionOptions::exact_balances();
        scenario.fixed = vec![
            ("P_t_in".to_string(), kpa(1000.0).measured()),
            ("l".to_string(), cm(1.0).measured()),
            ("T_t_in".to_string(), k(700.0).measured()),
            ("mdot_in".to_string(), kgps(1.0).measured()),
            ("A_in".to_string(), cm2(10.0).measured()),
            ("u_in".to_string(), mps(10.0).measured()),
        ];
        scenario
    }

    /// Fix `name` to `value`, replacing an earlier entry for it.
    pub fn with_fixed(mut self, name: &str, value: Measured) -> Self {
        match self.fixed.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.fixed.push((name.to_string(), value)),
        }
        self
    }

    /// A new section with every substitution and the objective applied.
    pub fn build_section(&self) -> ModelResult<BurnSection> {
        let mut section = BurnSection::new(self.options)?;
        for (name, value) in &self.fixed {
            section.substitute(name, *value)?;
        }
        let objective = self.objective.build(&section)?;
        section.set_objective(objective)?;
        Ok(section)
    }
}

/// Solve one scenario and validate the result.
pub fn run_scenario(scenario: &Scenario) -> AppResult<SectionState> {
    let section = scenario.build_section()?;
    let model = section.model();

    let mut problem = model.assemble()?;
    if let Some(bounds) = scenario.bounds {
        problem.add_bounds(bounds);
    }
    let start = initial_point(model, &problem, &scenario.initial_guess)?;
    debug!(
        scenario = %scenario.name,
        variables = problem.variables.len(),
        constraints = problem.constraints.len(),
        "assembled scenario"
    );

    let solver = DefaultSolver::new(BarrierSolver::default(), scenario.relaxation.clone());
    let solution = solver.solve_from(&problem, &start)?;

    validate(model, &problem, &solution)?;
    let state = SectionState::from_solution(&scenario.name, model, &problem, &solution);
    info!(
        scenario = %scenario.name,
        objective = state.objective,
        iterations = solution.iterations,
        "scenario solved"
    );
    Ok(state)
}

/// Starting point in problem order. Guesses for quantities that are fixed or
/// not part of the problem are ignored.
fn initial_point(
    model: &Model,
    problem: &Problem,
    guesses: &[(String, Measured)],
) -> AppResult<Vec<f64>> {
    let mut start = vec![1.0; problem.variables.len()];
    for (name, guess) in guesses {
        let var = model.registry().var(name)?;
        let quantity = model.registry().quantity(var.id())?;
        if !quantity.dimension.approx_eq(&guess.dimension) {
            return Err(ModelError::DimensionMismatch {
                context: format!("initial guess for '{name}'"),
                expected: quantity.dimension,
                found: guess.dimension,
                term: format!("{}", guess.value),
            }
            .into());
        }
        if !(guess.value.is_finite() && guess.value > 0.0) {
            return Err(ModelError::NonPositive {
                name: name.clone(),
                value: guess.value,
            }
            .into());
        }
        match problem.index_of(name) {
            Some(i) => start[i] = guess.value,
            None => warn!(quantity = %name, "initial guess for a quantity that is not free; ignored"),
        }
    }
    Ok(start)
}

/// Fixed values must not reappear as variables, every relation must hold at
/// the solution, and every solved value must be a positive finite SI value of
/// the declared quantity its variable names.
fn validate(model: &Model, problem: &Problem, solution: &Solution) -> AppResult<()> {
    for var in &problem.variables {
        if let Some(id) = var.quantity {
            if model.fixed_value(id).is_some() {
                return Err(AppError::Validation(format!(
                    "fixed quantity '{}' was solved for",
                    var.name
                )));
            }
        }
    }

    let assignment = full_assignment(model, problem, solution);
    for (var, value) in problem.variables.iter().zip(&solution.values) {
        let Some(id) = var.quantity else { continue };
        let quantity = model.registry().quantity(id)?;
        if quantity.name != var.name {
            return Err(AppError::Validation(format!(
                "variable '{}' is bound to quantity '{}'",
                var.name, quantity.name
            )));
        }
        if !(value.is_finite() && *value > 0.0) {
            return Err(AppError::Validation(format!(
                "'{}' solved to {value}",
                var.name
            )));
        }
    }

    for c in model.constraints() {
        let residual = c
            .residual(&|id| assignment.get(id.index() as usize).copied().flatten())
            .ok_or_else(|| {
                AppError::Validation(format!("'{}' references an unsolved quantity", c.label()))
            })?;
        if residual > RESIDUAL_TOL {
            return Err(AppError::Validation(format!(
                "'{}' violated by {residual:.3e} at the solution",
                c.label()
            )));
        }
    }
    Ok(())
}

/// SI value per registry slot: substitutions first, then solved values.
pub(crate) fn full_assignment(
    model: &Model,
    problem: &Problem,
    solution: &Solution,
) -> Vec<Option<f64>> {
    let mut values = vec![None; model.registry().len()];
    for (id, &v) in model.substitutions() {
        if let Some(slot) = values.get_mut(id.index() as usize) {
            *slot = Some(v);
        }
    }
    for (var, &v) in problem.variables.iter().zip(&solution.values) {
        if let Some(id) = var.quantity {
            if let Some(slot) = values.get_mut(id.index() as usize) {
                *slot = Some(v);
            }
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use srm_core::Dimension;

    #[test]
    fn with_fixed_replaces_an_existing_entry() {
        let scenario = Scenario::reference().with_fixed("l", cm(2.0).measured());
        assert_eq!(scenario.fixed.len(), 6);
        let l = scenario.fixed.iter().find(|(n, _)| n == "l").unwrap().1;
        assert!((l.value - 0.02).abs() < 1e-15);

        let scenario = scenario.with_fixed("P_t_out", kpa(900.0).measured());
        assert_eq!(scenario.fixed.len(), 7);
    }

    #[test]
    fn reference_section_builds_with_objective() {
        let section = Scenario::reference().build_section().unwrap();
        assert!(section.model().objective().is_some());
        assert_eq!(
            section.model().fixed_value(section.vars().u_in.id()),
            Some(10.0)
        );
    }

    #[test]
    fn named_objective_is_a_product() {
        let mut scenario = Scenario::reference();
        scenario.objective = ObjectiveSpec::Minimize(vec!["u_out".into(), "A_out".into()]);
        let section = scenario.build_section().unwrap();
        let expr = section.model().objective().unwrap().expr();
        assert_eq!(expr.terms.len(), 1);
        assert_eq!(expr.terms[0].exponents.len(), 2);
    }

    #[test]
    fn unknown_objective_quantity_is_reported() {
        let mut scenario = Scenario::reference();
        scenario.objective = ObjectiveSpec::Maximize(vec!["thrust".into()]);
        assert!(matches!(
            scenario.build_section(),
            Err(ModelError::UnknownQuantity { ref name }) if name == "thrust"
        ));
    }

    #[test]
    fn continuity_balanced_by_fixed_flows_is_dropped() {
        // mdot_in + q >= mdot_out with both flows at 1 kg/s leaves 0 <= q.
        let mut scenario = Scenario::reference().with_fixed("mdot_out", kgps(1.0).measured());
        scenario.options = SectionOptions::default();
        let section = scenario.build_section().unwrap();
        let problem = section.model().assemble().unwrap();
        assert!(problem.constraints.iter().all(|c| c.label != "mass continuity"));
        assert!(problem.index_of("q").is_some());
    }

    #[test]
    fn validation_rejects_a_variable_bound_to_another_quantity() {
        let section = Scenario::reference().build_section().unwrap();
        let mut problem = section.model().assemble().unwrap();
        let solution = Solution {
            values: vec![1.0; problem.variables.len()],
            objective: 1.0,
            iterations: 0,
            relaxation: None,
        };
        problem.variables[0].name = "not a quantity".to_string();
        match validate(section.model(), &problem, &solution) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("not a quantity"), "{msg}"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn guesses_are_placed_and_checked() {
        let section = Scenario::reference().build_section().unwrap();
        let problem = section.model().assemble().unwrap();
        let guesses = vec![
            ("u_out".to_string(), mps(20.0).measured()),
            ("u_in".to_string(), mps(10.0).measured()),
        ];
        let start = initial_point(section.model(), &problem, &guesses).unwrap();
        let i = problem.index_of("u_out").unwrap();
        assert_eq!(start[i], 20.0);
        assert_eq!(start.iter().filter(|&&v| v != 1.0).count(), 1);

        let wrong = vec![("u_out".to_string(), Measured::new(1.0, Dimension::MASS))];
        assert!(matches!(
            initial_point(section.model(), &problem, &wrong),
            Err(AppError::Model(ModelError::DimensionMismatch { .. }))
        ));
    }
}

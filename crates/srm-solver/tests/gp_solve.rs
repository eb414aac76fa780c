//! End-to-end solves of small models through the public API.

use proptest::prelude::*;
use srm_core::{Dimension, Measured};
use srm_model::{
    Constraint, ConstraintForm, Model, Objective, Registry, Relation, Term, VariableBounds,
};
use srm_solver::{BarrierSolver, DefaultSolver, Solver, SolverError};

#[test]
fn rectangle_from_model() {
    let mut registry = Registry::new();
    let x = registry.declare("x", "m", None, "width").unwrap();
    let y = registry.declare("y", "m", None, "height").unwrap();
    let a = registry.declare("a", "m^2", None, "area").unwrap();
    let area = Constraint::new(
        ConstraintForm::MonomialEquality,
        "area",
        x * y,
        Relation::Eq,
        a,
        &registry,
    )
    .unwrap();
    let mut model = Model::new("rectangle", registry, vec![area]);
    model
        .substitute(a, Measured::new(9.0, Dimension::AREA))
        .unwrap();
    model
        .set_objective(Objective::minimize("half perimeter", x + y))
        .unwrap();
    let problem = model.assemble().unwrap();

    let sol = BarrierSolver::default().solve(&problem).unwrap();
    assert!((sol.objective - 6.0).abs() < 1e-8);
    assert!((sol.value(&problem, "x").unwrap() - 3.0).abs() < 1e-4);
}

#[test]
fn bounds_turn_an_unbounded_problem_into_a_bounded_one() {
    let mut registry = Registry::new();
    let x = registry.declare("x", "-", None, "").unwrap();
    let one = registry.declare("one", "-", Some(1.0), "").unwrap();
    let floor = Constraint::new(
        ConstraintForm::PosynomialInequality,
        "x >= 1",
        x,
        Relation::Ge,
        one,
        &registry,
    )
    .unwrap();
    let mut model = Model::new("escape", registry, vec![floor]);
    model
        .set_objective(Objective::minimize("1/x", 1.0 / x))
        .unwrap();

    let unbounded = model.assemble().unwrap();
    assert!(matches!(
        BarrierSolver::default().solve(&unbounded),
        Err(SolverError::Unbounded { .. })
    ));

    let mut bounded = model.assemble().unwrap();
    bounded.add_bounds(VariableBounds {
        lower: 1e-6,
        upper: 1e6,
    });
    let sol = DefaultSolver::default().solve(&bounded).unwrap();
    assert!((sol.values[0] / 1e6 - 1.0).abs() < 1e-6);
}

#[test]
fn signomial_model_is_solved_by_the_default_stack() {
    // min x s.t. x + c >= 3 with c = 2 declared as a free quantity bounded
    // above, so the relation stays signomial after assembly.
    let mut registry = Registry::new();
    let x = registry.declare("x", "-", None, "").unwrap();
    let c = registry.declare("c", "-", None, "").unwrap();
    let three = registry.declare("three", "-", Some(3.0), "").unwrap();
    let two = registry.declare("two", "-", Some(2.0), "").unwrap();
    let shifted = Constraint::new(
        ConstraintForm::SignomialInequality,
        "shifted",
        x + c,
        Relation::Ge,
        three,
        &registry,
    )
    .unwrap();
    let cap = Constraint::new(
        ConstraintForm::PosynomialInequality,
        "cap",
        c,
        Relation::Le,
        two,
        &registry,
    )
    .unwrap();
    let mut model = Model::new("shifted", registry, vec![shifted, cap]);
    model
        .set_objective(Objective::minimize("x", x))
        .unwrap();
    let problem = model.assemble().unwrap();
    assert!(!problem.is_geometric());

    let sol = DefaultSolver::default().solve(&problem).unwrap();
    assert!((sol.value(&problem, "x").unwrap() - 1.0).abs() < 1e-4);
    assert!((sol.value(&problem, "c").unwrap() - 2.0).abs() < 1e-4);
    assert!(sol.relaxation.is_some());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn balanced_sum_minimum(a in 0.01_f64..100.0) {
        // min x + a/x = 2√a
        let problem = srm_model::Problem {
            name: "balanced".to_string(),
            variables: vec![srm_model::ProblemVar { name: "x".to_string(), quantity: None }],
            objective: srm_model::Posynomial::new(vec![
                Term::variable(0),
                Term { coeff: a, exponents: vec![(0, -1.0)] },
            ]),
            constraints: vec![],
        };
        let sol = BarrierSolver::default().solve(&problem).unwrap();
        prop_assert!((sol.objective / (2.0 * a.sqrt()) - 1.0).abs() < 1e-8);
    }
}

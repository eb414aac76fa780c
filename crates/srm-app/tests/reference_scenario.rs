//! The standard burn-section scenario, end to end.

use srm_app::{AppError, ObjectiveSpec, Scenario, load_scenario, run_scenario, run_sweep};
use srm_core::units::{Measure, k, kpa, mps};
use srm_model::{ModelError, QuantityDecl};
use srm_section::{BurnSection, SECTION_TABLE, SectionOptions};
use srm_solver::SolverError;

/// Ambient temperature plus the temperature rise the heat of combustion can
/// give the products (`k_comb_p / c_p`).
const T_PRODUCTS_MAX: f64 = 273.0 + 1.23e6 / 1000.0;

#[test]
fn reference_scenario_solves() {
    let scenario = Scenario::reference();
    let state = run_scenario(&scenario).unwrap();

    for (name, value) in &scenario.fixed {
        let q = state.get(name).unwrap();
        assert!(q.fixed, "{name}");
        assert_eq!(q.si, value.value, "{name}");
    }
    assert_eq!(state.si("T_amb"), Some(273.0));

    let mdot_in = state.si("mdot_in").unwrap();
    let mdot_out = state.si("mdot_out").unwrap();
    assert!(mdot_out >= mdot_in * (1.0 - 1e-6), "{mdot_out}");

    let q = state.si("q").unwrap();
    assert!(((mdot_in + q) / mdot_out - 1.0).abs() < 1e-5);

    let t_t_out = state.si("T_t_out").unwrap();
    assert!(t_t_out >= 273.0, "{t_t_out}");
    assert!(t_t_out <= T_PRODUCTS_MAX * (1.0 + 1e-6), "{t_t_out}");

    let p_t_out = state.si("P_t_out").unwrap();
    let p_out = state.si("P_out").unwrap();
    assert!(p_t_out >= p_out * (1.0 - 1e-9));

    assert!(state.relaxation_iterations >= 1);
    assert!(state.max_slack - 1.0 <= 1e-6);
    assert!(state.get("V_fuel").is_none());
}

#[test]
fn reference_relaxation_gap_does_not_grow() {
    let state = run_scenario(&Scenario::reference()).unwrap();
    let history = &state.residual_history;
    assert_eq!(history.len(), state.relaxation_iterations);
    // Once the gap is at rounding level it may move by a few ulps.
    for pair in history.windows(2) {
        assert!(pair[1] <= pair[0] * (1.0 + 1e-6) + 1e-12, "{history:?}");
    }
}

#[test]
fn reference_report_serialises() {
    let state = run_scenario(&Scenario::reference()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&state.to_json().unwrap()).unwrap();
    assert_eq!(json["scenario"], "reference");
    assert!(json["quantities"].as_array().unwrap().len() > 20);
    assert!(state.render().contains("mdot_out"));
}

#[test]
fn duplicate_quantity_name_fails_before_solving() {
    let mut table = SECTION_TABLE.to_vec();
    table.push(QuantityDecl::free("u_out", "m/s", "velocity out, again"));
    let err: AppError = BurnSection::with_table(&table, SectionOptions::default())
        .unwrap_err()
        .into();
    assert!(matches!(
        err,
        AppError::Model(ModelError::DuplicateName { ref name }) if name == "u_out"
    ));
}

#[test]
fn fixing_a_quantity_twice() {
    let mut same = Scenario::reference();
    same.fixed.push(("T_t_in".to_string(), k(700.0).measured()));
    assert!(same.build_section().is_ok());

    let mut conflicting = Scenario::reference();
    conflicting
        .fixed
        .push(("T_t_in".to_string(), k(800.0).measured()));
    assert!(matches!(
        run_scenario(&conflicting),
        Err(AppError::Model(ModelError::ConflictingSubstitution { .. }))
    ));
}

#[test]
fn unknown_quantity_is_a_model_error() {
    let scenario = Scenario::reference().with_fixed("P_exit", kpa(100.0).measured());
    assert!(matches!(
        run_scenario(&scenario),
        Err(AppError::Model(ModelError::UnknownQuantity { .. }))
    ));
}

#[test]
fn impossible_inlet_dynamic_pressure_is_infeasible() {
    // ½ρu² = 500 kg/m^2/s · u exceeds the 1000 kPa inlet stagnation pressure.
    let scenario = Scenario::reference().with_fixed("u_in", mps(3000.0).measured());
    assert!(matches!(
        run_scenario(&scenario),
        Err(AppError::Solver(SolverError::Infeasible { .. }))
    ));
}

#[test]
fn missing_bounds_leave_the_reference_unbounded() {
    let mut scenario = Scenario::reference();
    scenario.bounds = None;
    // The exit velocity can shrink without limit; the barrier either leaves
    // the representable range or runs out of Newton steps chasing it.
    assert!(matches!(
        run_scenario(&scenario),
        Err(AppError::Solver(
            SolverError::Unbounded { .. } | SolverError::ConvergenceFailed { .. }
        ))
    ));
}

#[test]
fn relaxation_cap_is_reported() {
    let mut scenario = Scenario::reference();
    scenario.relaxation.max_iterations = 1;
    match run_scenario(&scenario) {
        Err(AppError::Solver(SolverError::RelaxationNonConvergence {
            iterations,
            last_iterate,
            ..
        })) => {
            assert_eq!(iterations, 1);
            assert!(last_iterate.iter().any(|(name, _)| name == "mdot_out"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn sweep_keeps_the_order_of_values() {
    let values: Vec<_> = [600.0, 700.0, 800.0]
        .iter()
        .map(|&t| k(t).measured())
        .collect();
    let points = run_sweep(&Scenario::reference(), "T_t_in", &values);
    assert_eq!(points.len(), 3);
    for (point, value) in points.iter().zip(&values) {
        assert_eq!(point.value, *value);
        let state = point.result.as_ref().unwrap();
        assert_eq!(state.si("T_t_in"), Some(value.value));
        assert!(state.si("T_t_out").unwrap() >= value.value * (1.0 - 1e-6));
    }
}

#[test]
fn scenario_file_loads_from_disk() {
    let path = std::env::temp_dir().join(format!("srm-app-scenario-{}.yaml", std::process::id()));
    std::fs::write(
        &path,
        "name: from-disk\nfixed:\n  u_in: 10 m/s\nobjective:\n  minimize: [u_out, P_t_out]\n",
    )
    .unwrap();
    let scenario = load_scenario(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(scenario.name, "from-disk");
    assert_eq!(scenario.fixed[0].1.value, 10.0);
    assert_eq!(
        scenario.objective,
        ObjectiveSpec::Minimize(vec!["u_out".to_string(), "P_t_out".to_string()])
    );
}

#[test]
fn missing_scenario_file_names_the_path() {
    let path = std::env::temp_dir().join("srm-app-no-such-scenario.yaml");
    match load_scenario(&path) {
        Err(AppError::ScenarioFileRead { path: p, .. }) => assert_eq!(p, path),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

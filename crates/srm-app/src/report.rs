//! Solved section state, as returned to callers and printed by the CLI.

use crate::scenario::full_assignment;
use serde::Serialize;
use srm_model::{Model, Problem};
use srm_solver::Solution;
use std::fmt::Write as _;

/// One quantity of a solved section.
#[derive(Clone, Debug, Serialize)]
pub struct QuantityValue {
    pub name: String,
    /// Value in SI base units.
    pub si: f64,
    /// Value in the declared unit.
    pub value: f64,
    pub unit: String,
    pub dimension: String,
    pub fixed: bool,
    pub description: String,
}

/// Result of one scenario.
#[derive(Clone, Debug, Serialize)]
pub struct SectionState {
    pub scenario: String,
    pub objective_label: String,
    /// Objective at the solution, SI.
    pub objective: f64,
    pub quantities: Vec<QuantityValue>,
    /// Newton steps over all convex sub-solves.
    pub newton_steps: usize,
    /// Convex sub-solves of the relaxation loop (0 for a pure GP).
    pub relaxation_iterations: usize,
    pub max_slack: f64,
    /// Approximation gap after each convex sub-solve.
    pub residual_history: Vec<f64>,
}

impl SectionState {
    /// Fixed quantities report their substituted value exactly; quantities
    /// with neither a fixed nor a solved value are omitted.
    pub fn from_solution(
        scenario: &str,
        model: &Model,
        problem: &Problem,
        solution: &Solution,
    ) -> Self {
        let values = full_assignment(model, problem, solution);
        let quantities = model
            .registry()
            .iter()
            .filter_map(|q| {
                let si = values.get(q.id.index() as usize).copied().flatten()?;
                Some(QuantityValue {
                    name: q.name.clone(),
                    si,
                    value: q.in_declared_unit(si),
                    unit: q.unit_label.clone(),
                    dimension: q.dimension.to_string(),
                    fixed: model.fixed_value(q.id).is_some(),
                    description: q.description.clone(),
                })
            })
            .collect();

        let (relaxation_iterations, max_slack, residual_history) = solution
            .relaxation
            .as_ref()
            .map(|r| (r.iterations, r.max_slack, r.residual_history.clone()))
            .unwrap_or((0, 1.0, Vec::new()));

        Self {
            scenario: scenario.to_string(),
            objective_label: model
                .objective()
                .map(|o| o.label().to_string())
                .unwrap_or_default(),
            objective: solution.objective,
            quantities,
            newton_steps: solution.iterations,
            relaxation_iterations,
            max_slack,
            residual_history,
        }
    }

    pub fn get(&self, name: &str) -> Option<&QuantityValue> {
        self.quantities.iter().find(|q| q.name == name)
    }

    /// SI value of `name`.
    pub fn si(&self, name: &str) -> Option<f64> {
        self.get(name).map(|q| q.si)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Plain-text table in declared units.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Scenario: {}", self.scenario);
        let _ = writeln!(out, "Objective ({}): {:.6e}", self.objective_label, self.objective);
        let _ = writeln!(
            out,
            "Relaxation iterations: {}  Newton steps: {}  Max slack: {:.6}",
            self.relaxation_iterations, self.newton_steps, self.max_slack
        );
        let _ = writeln!(out);
        let _ = writeln!(out, "{:<10} {:>14} {:<10} {}", "quantity", "value", "unit", "");
        for q in &self.quantities {
            let marker = if q.fixed { "fixed" } else { "" };
            let _ = writeln!(
                out,
                "{:<10} {:>14.6e} {:<10} {}",
                q.name, q.value, q.unit, marker
            );
        }
        out
    }
}

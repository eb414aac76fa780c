//! Model: constraints + substitutions + objective, and assembly into a
//! numeric `Problem`.

use crate::constraint::Constraint;
use crate::error::{ModelError, ModelResult};
use crate::expr::{Monomial, Signomial};
use crate::problem::{CompiledConstraint, Posynomial, Problem, ProblemVar, Term};
use crate::quantity::Var;
use crate::registry::Registry;
use srm_core::{Dimension, Measured, QuantityId, Tolerances, nearly_equal};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Relative violation accepted for constraints made constant by substitution.
const FIXED_RESIDUAL_TOL: f64 = 1e-9;

/// A scalar objective to be minimised.
#[derive(Clone, Debug, PartialEq)]
pub struct Objective {
    label: String,
    expr: Signomial,
}

impl Objective {
    pub fn minimize(label: impl Into<String>, expr: impl Into<Signomial>) -> Self {
        Self {
            label: label.into(),
            expr: expr.into().simplified(),
        }
    }

    /// Maximise a monomial by minimising its reciprocal.
    pub fn maximize(label: impl Into<String>, expr: impl Into<Monomial>) -> Self {
        Self::minimize(label, expr.into().pow(-1.0))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn expr(&self) -> &Signomial {
        &self.expr
    }

    fn validate(&self, registry: &Registry) -> ModelResult<Dimension> {
        if !self.expr.is_posynomial() {
            return Err(ModelError::NonPosynomialObjective {
                objective: self.label.clone(),
                reason: if self.expr.terms.is_empty() {
                    "expression is empty".to_string()
                } else {
                    format!("negative term in {}", self.expr.describe(registry))
                },
            });
        }
        let dimension = self
            .expr
            .common_dimension(registry, &format!("objective '{}'", self.label))?;
        Ok(dimension.unwrap_or(Dimension::DIMENSIONLESS))
    }
}

/// One solvable optimisation model over a registry.
///
/// Constraints are fixed at construction. Only substitutions and the
/// objective change afterwards, and each model owns its own substitution
/// map.
#[derive(Clone, Debug)]
pub struct Model {
    name: String,
    registry: Registry,
    constraints: Vec<Constraint>,
    substitutions: BTreeMap<QuantityId, f64>,
    objective: Option<Objective>,
}

impl Model {
    /// Create a model; declared constants become the initial substitutions.
    pub fn new(name: impl Into<String>, registry: Registry, constraints: Vec<Constraint>) -> Self {
        let substitutions = registry
            .iter()
            .filter_map(|q| q.value.map(|v| (q.id, v)))
            .collect();
        Self {
            name: name.into(),
            registry,
            constraints,
            substitutions,
            objective: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Fixed values in SI, declared constants included.
    pub fn substitutions(&self) -> &BTreeMap<QuantityId, f64> {
        &self.substitutions
    }

    pub fn fixed_value(&self, id: QuantityId) -> Option<f64> {
        self.substitutions.get(&id).copied()
    }

    /// Fix a quantity to an SI value carrying its dimension.
    ///
    /// Fixing a quantity again to the same value is a no-op; a different
    /// value fails and leaves the model unchanged.
    pub fn substitute(&mut self, var: Var, value: Measured) -> ModelResult<()> {
        let quantity = self.registry.quantity(var.id())?;
        if !quantity.dimension.approx_eq(&value.dimension) {
            return Err(ModelError::DimensionMismatch {
                context: format!("substitution for '{}'", quantity.name),
                expected: quantity.dimension,
                found: value.dimension,
                term: format!("{}", value.value),
            });
        }
        if !(value.value.is_finite() && value.value > 0.0) {
            return Err(ModelError::NonPositive {
                name: quantity.name.clone(),
                value: value.value,
            });
        }
        match self.substitutions.get(&var.id()) {
            Some(&existing) if nearly_equal(existing, value.value, Tolerances::default()) => {
                Ok(())
            }
            Some(&existing) => Err(ModelError::ConflictingSubstitution {
                name: quantity.name.clone(),
                existing,
                requested: value.value,
            }),
            None => {
                self.substitutions.insert(var.id(), value.value);
                Ok(())
            }
        }
    }

    pub fn substitute_named(&mut self, name: &str, value: Measured) -> ModelResult<()> {
        let var = self.registry.var(name)?;
        self.substitute(var, value)
    }

    /// Attach (or replace) the objective after checking it is a
    /// dimensionally homogeneous posynomial over declared quantities.
    pub fn set_objective(&mut self, objective: Objective) -> ModelResult<()> {
        objective.validate(&self.registry)?;
        self.objective = Some(objective);
        Ok(())
    }

    /// Fold substitutions into coefficients and produce the numeric problem.
    ///
    /// Declared quantities that no constraint or objective references are
    /// reported and left out. Constraints whose quantities are all fixed are
    /// checked against the fixed values and dropped.
    pub fn assemble(&self) -> ModelResult<Problem> {
        let objective = self
            .objective
            .as_ref()
            .ok_or_else(|| ModelError::MissingObjective {
                model: self.name.clone(),
            })?;

        let mut referenced: BTreeSet<QuantityId> = objective.expr.quantities().collect();
        for c in &self.constraints {
            referenced.extend(c.quantities());
        }
        for q in self.registry.iter() {
            if !referenced.contains(&q.id) {
                tracing::warn!(
                    model = %self.name,
                    quantity = %q.name,
                    "declared quantity is not referenced; excluded from the problem"
                );
            }
        }

        let free: Vec<QuantityId> = referenced
            .into_iter()
            .filter(|id| !self.substitutions.contains_key(id))
            .collect();
        if free.is_empty() {
            return Err(ModelError::Underconstrained {
                model: self.name.clone(),
            });
        }
        let index: HashMap<QuantityId, usize> =
            free.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let variables = free
            .iter()
            .map(|&id| ProblemVar {
                name: self.registry.name_of(id),
                quantity: Some(id),
            })
            .collect();

        let lookup = |id: QuantityId| self.substitutions.get(&id).copied();
        let mut constraints = Vec::with_capacity(self.constraints.len());
        for c in &self.constraints {
            if c.quantities().iter().all(|id| self.substitutions.contains_key(id)) {
                let residual = c.residual(&lookup).unwrap_or(f64::INFINITY);
                if residual > FIXED_RESIDUAL_TOL {
                    return Err(ModelError::ViolatedByFixedValues {
                        constraint: c.label().to_string(),
                        residual,
                    });
                }
                tracing::debug!(constraint = c.label(), "satisfied by fixed values; dropped");
                continue;
            }
            if let Some(compiled) = self.compile_constraint(c, &index)? {
                constraints.push(compiled);
            }
        }

        let objective = Posynomial::new(
            objective
                .expr
                .terms
                .iter()
                .map(|m| self.compile_monomial(m, &index))
                .collect(),
        )
        .merged();

        Ok(Problem {
            name: self.name.clone(),
            variables,
            objective,
            constraints,
        })
    }

    fn compile_monomial(&self, m: &Monomial, index: &HashMap<QuantityId, usize>) -> Term {
        let mut term = Term::constant(m.coeff);
        for (&id, &a) in &m.exponents {
            match (self.substitutions.get(&id), index.get(&id)) {
                (Some(&v), _) => term.coeff *= v.powf(a),
                (None, Some(&i)) => term.exponents.push((i, a)),
                (None, None) => {}
            }
        }
        term.exponents.sort_by_key(|&(i, _)| i);
        term
    }

    /// Substitute into both sides, then cancel like terms across the
    /// relation so that folded constants land on the correct side.
    ///
    /// Returns `None` for a relation that holds for every positive value of
    /// its free quantities (`0 <= p` or `0 = 0` after cancellation).
    fn compile_constraint(
        &self,
        c: &Constraint,
        index: &HashMap<QuantityId, usize>,
    ) -> ModelResult<Option<CompiledConstraint>> {
        let mut signed: Vec<Term> = c
            .lesser()
            .terms
            .iter()
            .map(|m| self.compile_monomial(m, index))
            .collect();
        signed.extend(c.greater().terms.iter().map(|m| {
            let mut t = self.compile_monomial(m, index);
            t.coeff = -t.coeff;
            t
        }));
        let merged = Posynomial::new(signed).merged();
        let scale = merged
            .terms
            .iter()
            .fold(0.0_f64, |acc, t| acc.max(t.coeff.abs()));

        let mut lesser = Vec::new();
        let mut greater = Vec::new();
        for mut t in merged.terms {
            if t.coeff.abs() <= 1e-14 * scale {
                continue;
            }
            if t.coeff > 0.0 {
                lesser.push(t);
            } else {
                t.coeff = -t.coeff;
                greater.push(t);
            }
        }
        // A positive posynomial is never <= 0, nor equal to it.
        let violated = (lesser.is_empty() && !greater.is_empty() && c.form().is_equality())
            || (greater.is_empty() && !lesser.is_empty());
        if violated {
            return Err(ModelError::ViolatedByFixedValues {
                constraint: c.label().to_string(),
                residual: 1.0,
            });
        }
        if lesser.is_empty() {
            tracing::debug!(
                constraint = c.label(),
                "holds for any free values after substitution; dropped"
            );
            return Ok(None);
        }

        Ok(Some(CompiledConstraint::new(
            c.label(),
            c.form().is_equality(),
            Posynomial::new(lesser),
            Posynomial::new(greater),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{ConstraintForm, Relation};

    struct Fixture {
        registry: Registry,
        x: Var,
        y: Var,
        a: Var,
        unused: Var,
    }

    fn fixture() -> Fixture {
        let mut registry = Registry::new();
        let x = registry.declare("x", "m", None, "").unwrap();
        let y = registry.declare("y", "m", None, "").unwrap();
        let a = registry.declare("a", "m^2", None, "").unwrap();
        let unused = registry.declare("unused", "s", None, "").unwrap();
        Fixture {
            registry,
            x,
            y,
            a,
            unused,
        }
    }

    fn area_model(f: &Fixture) -> Model {
        let c = Constraint::new(
            ConstraintForm::MonomialEquality,
            "area",
            f.x * f.y,
            Relation::Eq,
            f.a,
            &f.registry,
        )
        .unwrap();
        Model::new("rect", f.registry.clone(), vec![c])
    }

    #[test]
    fn missing_objective_is_reported_before_solving() {
        let f = fixture();
        let model = area_model(&f);
        assert_eq!(
            model.assemble().unwrap_err(),
            ModelError::MissingObjective {
                model: "rect".to_string()
            }
        );
    }

    #[test]
    fn fully_fixed_model_is_underconstrained() {
        let f = fixture();
        let mut model = area_model(&f);
        model.set_objective(Objective::minimize("x", f.x)).unwrap();
        let m = Dimension::LENGTH;
        model.substitute(f.x, Measured::new(2.0, m)).unwrap();
        model.substitute(f.y, Measured::new(2.0, m)).unwrap();
        model
            .substitute(f.a, Measured::new(4.0, Dimension::AREA))
            .unwrap();
        assert!(matches!(
            model.assemble(),
            Err(ModelError::Underconstrained { .. })
        ));
    }

    #[test]
    fn substitution_is_idempotent_and_rejects_conflicts() {
        let f = fixture();
        let mut model = area_model(&f);
        let four = Measured::new(4.0, Dimension::AREA);
        model.substitute(f.a, four).unwrap();
        model.substitute(f.a, four).unwrap();
        assert_eq!(model.fixed_value(f.a.id()), Some(4.0));

        let err = model
            .substitute(f.a, Measured::new(5.0, Dimension::AREA))
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::ConflictingSubstitution {
                name: "a".to_string(),
                existing: 4.0,
                requested: 5.0,
            }
        );
        assert_eq!(model.fixed_value(f.a.id()), Some(4.0));
    }

    #[test]
    fn substitution_checks_dimension_and_sign() {
        let f = fixture();
        let mut model = area_model(&f);
        assert!(matches!(
            model.substitute(f.a, Measured::new(4.0, Dimension::LENGTH)),
            Err(ModelError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            model.substitute(f.a, Measured::new(-4.0, Dimension::AREA)),
            Err(ModelError::NonPositive { .. })
        ));
        assert!(matches!(
            model.substitute_named("b", Measured::dimensionless(1.0)),
            Err(ModelError::UnknownQuantity { .. })
        ));
    }

    #[test]
    fn assembly_folds_fixed_values_and_skips_unreferenced() {
        let f = fixture();
        let mut model = area_model(&f);
        model
            .substitute(f.a, Measured::new(4.0, Dimension::AREA))
            .unwrap();
        model
            .set_objective(Objective::minimize("perimeter", f.x + f.y))
            .unwrap();
        let problem = model.assemble().unwrap();

        let names: Vec<_> = problem.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
        assert!(problem.index_of("unused").is_none());
        let _ = f.unused;

        let c = &problem.constraints[0];
        assert_eq!(c.form, ConstraintForm::MonomialEquality);
        assert_eq!(c.greater.terms[0], Term::constant(4.0));
        assert!((c.residual(&[2.0, 2.0])).abs() < 1e-12);
    }

    #[test]
    fn objective_must_be_posynomial() {
        let f = fixture();
        let mut model = area_model(&f);
        let err = model
            .set_objective(Objective::minimize("bad", f.x - f.y))
            .unwrap_err();
        assert!(matches!(err, ModelError::NonPosynomialObjective { .. }));
        let err = model
            .set_objective(Objective::minimize("mixed", f.x + f.a))
            .unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn maximize_inverts_a_monomial() {
        let f = fixture();
        let obj = Objective::maximize("area", f.x * f.y);
        let m = obj.expr().as_monomial().unwrap();
        assert_eq!(m.exponents.get(&f.x.id()), Some(&-1.0));
    }

    #[test]
    fn constant_constraints_are_checked() {
        let f = fixture();
        let c = Constraint::new(
            ConstraintForm::PosynomialInequality,
            "x below y",
            f.x,
            Relation::Le,
            f.y,
            &f.registry,
        )
        .unwrap();
        let mut model = Model::new("check", f.registry.clone(), vec![c]);
        model
            .set_objective(Objective::minimize("area", f.a))
            .unwrap();
        model
            .substitute(f.x, Measured::new(3.0, Dimension::LENGTH))
            .unwrap();
        model
            .substitute(f.y, Measured::new(2.0, Dimension::LENGTH))
            .unwrap();
        assert!(matches!(
            model.assemble(),
            Err(ModelError::ViolatedByFixedValues { .. })
        ));
    }

    #[test]
    fn folded_constants_cancel_across_sides() {
        let mut registry = Registry::new();
        let x = registry.declare("x", "-", None, "").unwrap();
        let c0 = registry.declare("c0", "-", Some(1.0), "").unwrap();
        let c1 = registry.declare("c1", "-", Some(3.0), "").unwrap();
        // x + c0 >= c1 reduces to x >= 2 once the constants are known.
        let c = Constraint::new(
            ConstraintForm::SignomialInequality,
            "shift",
            x + c0,
            Relation::Ge,
            c1,
            &registry,
        )
        .unwrap();
        let mut model = Model::new("shift", registry, vec![c]);
        model.set_objective(Objective::minimize("x", x)).unwrap();
        let problem = model.assemble().unwrap();
        let c = &problem.constraints[0];
        assert_eq!(c.form, ConstraintForm::PosynomialInequality);
        assert_eq!(c.lesser.terms, vec![Term::constant(2.0)]);
        assert_eq!(c.greater.terms, vec![Term::variable(0)]);
    }

    fn shifted(form: ConstraintForm, relation: Relation, c0: f64, c1: f64) -> ModelResult<Problem> {
        let mut registry = Registry::new();
        let x = registry.declare("x", "-", None, "").unwrap();
        let a = registry.declare("c0", "-", Some(c0), "").unwrap();
        let b = registry.declare("c1", "-", Some(c1), "").unwrap();
        let c = Constraint::new(form, "shift", x + a, relation, b, &registry).unwrap();
        let mut model = Model::new("shift", registry, vec![c]);
        model.set_objective(Objective::minimize("x", x)).unwrap();
        model.assemble()
    }

    #[test]
    fn relation_reduced_to_zero_below_a_posynomial_is_dropped() {
        // x + 1 >= 1 is 0 <= x, true for every positive x.
        let problem = shifted(ConstraintForm::SignomialInequality, Relation::Ge, 1.0, 1.0).unwrap();
        assert_eq!(problem.variables.len(), 1);
        assert!(problem.constraints.is_empty());
    }

    #[test]
    fn relation_with_an_empty_side_after_cancellation_is_violated() {
        // x + 1 = 1 would need x = 0.
        assert!(matches!(
            shifted(ConstraintForm::SignomialEquality, Relation::Eq, 1.0, 1.0),
            Err(ModelError::ViolatedByFixedValues { ref constraint, .. }) if constraint == "shift"
        ));
        // x + 3 <= 1 would need x <= -2.
        assert!(matches!(
            shifted(ConstraintForm::PosynomialInequality, Relation::Le, 3.0, 1.0),
            Err(ModelError::ViolatedByFixedValues { .. })
        ));
    }
}

//! A burn section: the quantity table, its relations, and the model built
//! from them.

use crate::options::SectionOptions;
use crate::table::SECTION_TABLE;
use crate::vars::SectionVars;
use crate::{constraints, relaxation};
use srm_core::Measured;
use srm_model::{Constraint, Model, ModelResult, Objective, QuantityDecl, Registry};

/// One instance of the burn-section model.
///
/// The relation set is fixed once built. A scenario only substitutes values
/// and sets the objective; a new scenario builds a new section.
#[derive(Clone, Debug)]
pub struct BurnSection {
    vars: SectionVars,
    options: SectionOptions,
    model: Model,
}

impl BurnSection {
    /// Build a section over the standard table.
    pub fn new(options: SectionOptions) -> ModelResult<Self> {
        Self::with_table(SECTION_TABLE, options)
    }

    /// Build a section over a custom table, e.g. one with different
    /// propellant constants. Fails before any relation is built if a name
    /// repeats or a unit does not parse, and on the first relation whose
    /// terms disagree in dimension.
    pub fn with_table(table: &[QuantityDecl], options: SectionOptions) -> ModelResult<Self> {
        let registry = Registry::from_table(table)?;
        let vars = SectionVars::resolve(&registry)?;

        let mut relations: Vec<Constraint> =
            constraints::build(&vars, &registry, options.erosive_burning)?;
        relations.extend(relaxation::build(
            &vars,
            &registry,
            options.mass_continuity,
            options.energy_balance,
        )?);

        tracing::debug!(
            quantities = registry.len(),
            constraints = relations.len(),
            "built burn section"
        );

        Ok(Self {
            vars,
            options,
            model: Model::new("burn section", registry, relations),
        })
    }

    pub fn vars(&self) -> &SectionVars {
        &self.vars
    }

    pub fn options(&self) -> SectionOptions {
        self.options
    }

    pub fn registry(&self) -> &Registry {
        self.model.registry()
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.model.constraints()
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// Fix a quantity by name. See [`Model::substitute`].
    pub fn substitute(&mut self, name: &str, value: Measured) -> ModelResult<()> {
        self.model.substitute_named(name, value)
    }

    pub fn set_objective(&mut self, objective: Objective) -> ModelResult<()> {
        self.model.set_objective(objective)
    }

    /// Minimise exit velocity times exit stagnation pressure.
    pub fn minimize_exit_momentum(&mut self) -> ModelResult<()> {
        let objective = exit_momentum_objective(&self.vars);
        self.model.set_objective(objective)
    }
}

/// `u_out · P_t_out`, the standard section objective.
pub fn exit_momentum_objective(vars: &SectionVars) -> Objective {
    Objective::minimize("exit velocity x exit stagnation pressure", vars.u_out * vars.p_t_out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{BalanceForm, ErosiveBurning};
    use srm_core::units::{Measure, kgps};
    use srm_model::{ConstraintForm, ModelError};

    #[test]
    fn default_section_has_eleven_builder_and_two_coupled_relations() {
        let section = BurnSection::new(SectionOptions::default()).unwrap();
        assert_eq!(section.constraints().len(), 13);
        let signomial: Vec<_> = section
            .constraints()
            .iter()
            .filter(|c| !c.form().is_geometric())
            .map(|c| c.label())
            .collect();
        assert_eq!(signomial, ["mass continuity", "energy balance"]);
    }

    #[test]
    fn options_select_the_relation_forms() {
        let options = SectionOptions {
            energy_balance: BalanceForm::Equality,
            mass_continuity: BalanceForm::Inequality,
            erosive_burning: ErosiveBurning::Linear,
        };
        let section = BurnSection::new(options).unwrap();
        let form = |label: &str| {
            section
                .constraints()
                .iter()
                .find(|c| c.label() == label)
                .map(|c| c.form())
        };
        assert_eq!(
            form("energy balance (exact)"),
            Some(ConstraintForm::SignomialEquality)
        );
        assert_eq!(
            form("mass continuity"),
            Some(ConstraintForm::SignomialInequality)
        );
        assert_eq!(
            form("burn rate (erosive)"),
            Some(ConstraintForm::SignomialEquality)
        );
        assert_eq!(form("burn rate"), None);
    }

    #[test]
    fn declared_constants_are_fixed_from_the_start() {
        let section = BurnSection::new(SectionOptions::default()).unwrap();
        let t_amb = section.vars().t_amb.id();
        assert_eq!(section.model().fixed_value(t_amb), Some(273.0));
        assert_eq!(section.model().fixed_value(section.vars().q.id()), None);
    }

    #[test]
    fn substitution_checks_dimension() {
        let mut section = BurnSection::new(SectionOptions::default()).unwrap();
        section.substitute("mdot_in", kgps(1.0).measured()).unwrap();
        let err = section
            .substitute("T_t_in", kgps(1.0).measured())
            .unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn objective_is_attached() {
        let mut section = BurnSection::new(SectionOptions::default()).unwrap();
        assert!(section.model().objective().is_none());
        section.minimize_exit_momentum().unwrap();
        let objective = section.model().objective().unwrap();
        assert_eq!(objective.expr().terms.len(), 1);
    }
}

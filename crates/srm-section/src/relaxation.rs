//! Coupled balances that are not geometric as written.
//!
//! Mass continuity and the stagnation-temperature energy balance both bound a
//! monomial by a posynomial. As inequalities they are signomial inequalities;
//! the physically exact balances are signomial equalities. Both are left for
//! the sequential solver to convexify.

use crate::options::BalanceForm;
use crate::vars::SectionVars;
use srm_model::{Constraint, ConstraintForm, ModelResult, Registry, Relation};

/// `mdot_in + q >= mdot_out`, or `= mdot_out` in equality form.
pub fn mass_continuity(
    v: &SectionVars,
    reg: &Registry,
    form: BalanceForm,
) -> ModelResult<Constraint> {
    let supplied = v.mdot_in + v.q;
    match form {
        BalanceForm::Inequality => Constraint::new(
            ConstraintForm::SignomialInequality,
            "mass continuity",
            supplied,
            Relation::Ge,
            v.mdot_out,
            reg,
        ),
        BalanceForm::Equality => Constraint::new(
            ConstraintForm::SignomialEquality,
            "mass continuity (exact)",
            supplied,
            Relation::Eq,
            v.mdot_out,
            reg,
        ),
    }
}

/// `T_t_out·mdot_out <= mdot_in·T_t_in + q·T_amb + q·k_comb_p/c_p`.
///
/// The right side is the enthalpy carried in plus the propellant's heat of
/// combustion released into the products generated in the section.
pub fn energy_balance(
    v: &SectionVars,
    reg: &Registry,
    form: BalanceForm,
) -> ModelResult<Constraint> {
    let carried_out = v.t_t_out * v.mdot_out;
    let supplied = v.mdot_in * v.t_t_in + v.q * v.t_amb + v.q * v.k_comb_p / v.c_p;
    match form {
        BalanceForm::Inequality => Constraint::new(
            ConstraintForm::SignomialInequality,
            "energy balance",
            carried_out,
            Relation::Le,
            supplied,
            reg,
        ),
        BalanceForm::Equality => Constraint::new(
            ConstraintForm::SignomialEquality,
            "energy balance (exact)",
            carried_out,
            Relation::Eq,
            supplied,
            reg,
        ),
    }
}

pub fn build(
    v: &SectionVars,
    reg: &Registry,
    continuity: BalanceForm,
    energy: BalanceForm,
) -> ModelResult<Vec<Constraint>> {
    Ok(vec![
        mass_continuity(v, reg, continuity)?,
        energy_balance(v, reg, energy)?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SECTION_TABLE;
    use srm_core::{Dimension, QuantityId};
    use std::collections::HashMap;

    fn setup() -> (Registry, SectionVars) {
        let reg = Registry::from_table(SECTION_TABLE).unwrap();
        let v = SectionVars::resolve(&reg).unwrap();
        (reg, v)
    }

    #[test]
    fn inequality_forms_are_signomial_inequalities() {
        let (reg, v) = setup();
        let continuity = mass_continuity(&v, &reg, BalanceForm::Inequality).unwrap();
        assert_eq!(continuity.form(), ConstraintForm::SignomialInequality);
        assert_eq!(continuity.lesser().terms.len(), 1);
        assert_eq!(continuity.greater().terms.len(), 2);
        assert!(continuity.dimension().approx_eq(&Dimension::MASS_RATE));

        let energy = energy_balance(&v, &reg, BalanceForm::Inequality).unwrap();
        assert_eq!(energy.form(), ConstraintForm::SignomialInequality);
        assert_eq!(energy.greater().terms.len(), 3);
        assert!(
            energy
                .dimension()
                .approx_eq(&(Dimension::MASS_RATE * Dimension::TEMPERATURE))
        );
    }

    #[test]
    fn equality_forms_are_signomial_equalities() {
        let (reg, v) = setup();
        let both = build(&v, &reg, BalanceForm::Equality, BalanceForm::Equality).unwrap();
        assert!(
            both.iter()
                .all(|c| c.form() == ConstraintForm::SignomialEquality)
        );
    }

    #[test]
    fn continuity_holds_only_when_mass_is_not_lost() {
        let (reg, v) = setup();
        let c = mass_continuity(&v, &reg, BalanceForm::Inequality).unwrap();
        let at = |mdot_out: f64| {
            let values: HashMap<QuantityId, f64> = [
                (v.mdot_in.id(), 1.0),
                (v.q.id(), 0.1),
                (v.mdot_out.id(), mdot_out),
            ]
            .into_iter()
            .collect();
            c.residual(&|id| values.get(&id).copied()).unwrap()
        };
        assert_eq!(at(1.05), 0.0);
        assert!(at(1.1) < 1e-12);
        assert!(at(1.2) > 0.0);
    }
}

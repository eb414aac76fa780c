//! Geometric-program relations of a burn section.
//!
//! Every relation here is a monomial equality or a posynomial inequality,
//! except the erosive burn-rate law, which is a signomial equality.

use crate::options::ErosiveBurning;
use crate::table::BURN_RATE_EXPONENT;
use crate::vars::SectionVars;
use srm_model::{Constraint, ConstraintForm, ModelResult, Registry, Relation};

use ConstraintForm::{MonomialEquality, PosynomialInequality, SignomialEquality};

/// Geometric means between inlet, outlet and the average state.
pub fn averaging(v: &SectionVars, reg: &Registry) -> ModelResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::new(
            MonomialEquality,
            "velocity average",
            v.u_in * v.u_out,
            Relation::Eq,
            v.u_avg.pow(2.0),
            reg,
        )?,
        Constraint::new(
            MonomialEquality,
            "area average",
            v.a_in * v.a_out,
            Relation::Eq,
            v.a_avg.pow(2.0),
            reg,
        )?,
    ])
}

/// Chamber volume, area ratio and burn area.
pub fn geometry(v: &SectionVars, reg: &Registry) -> ModelResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::new(
            MonomialEquality,
            "chamber volume",
            v.v_chamb,
            Relation::Eq,
            v.a_avg * v.l,
            reg,
        )?,
        Constraint::new(
            MonomialEquality,
            "area ratio",
            v.a_in / v.a_out,
            Relation::Eq,
            v.area_ratio,
            reg,
        )?,
        Constraint::new(
            MonomialEquality,
            "burn area",
            v.a_b,
            Relation::Eq,
            v.l_b * v.l,
            reg,
        )?,
    ])
}

/// `ρ·u·A = mdot` at both ends.
pub fn mass_flow(v: &SectionVars, reg: &Registry) -> ModelResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::new(
            MonomialEquality,
            "mass flow in",
            v.rho_in * v.u_in * v.a_in,
            Relation::Eq,
            v.mdot_in,
            reg,
        )?,
        Constraint::new(
            MonomialEquality,
            "mass flow out",
            v.rho_out * v.u_out * v.a_out,
            Relation::Eq,
            v.mdot_out,
            reg,
        )?,
    ])
}

/// Saint-Robert's law, optionally with the linear erosive correction.
pub fn burn_rate(
    v: &SectionVars,
    reg: &Registry,
    erosive: ErosiveBurning,
) -> ModelResult<Constraint> {
    let law = v.r_c * (v.p_chamb / v.p_ref).pow(BURN_RATE_EXPONENT);
    match erosive {
        ErosiveBurning::Neglected => {
            Constraint::new(MonomialEquality, "burn rate", v.r, Relation::Eq, law, reg)
        }
        ErosiveBurning::Linear => Constraint::new(
            SignomialEquality,
            "burn rate (erosive)",
            v.r,
            Relation::Eq,
            law.clone() + law * v.r_k * v.u_avg,
            reg,
        ),
    }
}

/// Mass generation rate of combustion products.
pub fn product_generation(v: &SectionVars, reg: &Registry) -> ModelResult<Constraint> {
    Constraint::new(
        MonomialEquality,
        "product generation",
        v.q,
        Relation::Eq,
        v.rho_p * v.a_b * v.r,
        reg,
    )
}

/// `P_t >= P + ½ρu²` at both ends.
pub fn stagnation(v: &SectionVars, reg: &Registry) -> ModelResult<Vec<Constraint>> {
    Ok(vec![
        Constraint::new(
            PosynomialInequality,
            "stagnation pressure out",
            v.p_t_out,
            Relation::Ge,
            v.p_out + 0.5 * v.rho_out * v.u_out.pow(2.0),
            reg,
        )?,
        Constraint::new(
            PosynomialInequality,
            "stagnation pressure in",
            v.p_t_in,
            Relation::Ge,
            v.p_in + 0.5 * v.rho_in * v.u_in.pow(2.0),
            reg,
        )?,
    ])
}

/// All relations of this module, in diagnostic order.
pub fn build(
    v: &SectionVars,
    reg: &Registry,
    erosive: ErosiveBurning,
) -> ModelResult<Vec<Constraint>> {
    let mut out = averaging(v, reg)?;
    out.extend(geometry(v, reg)?);
    out.extend(mass_flow(v, reg)?);
    out.push(burn_rate(v, reg, erosive)?);
    out.push(product_generation(v, reg)?);
    out.extend(stagnation(v, reg)?);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SECTION_TABLE;

    fn setup() -> (Registry, SectionVars) {
        let reg = Registry::from_table(SECTION_TABLE).unwrap();
        let v = SectionVars::resolve(&reg).unwrap();
        (reg, v)
    }

    #[test]
    fn monomial_closure() {
        let (reg, v) = setup();
        let mut monomial = averaging(&v, &reg).unwrap();
        monomial.extend(geometry(&v, &reg).unwrap());
        monomial.extend(mass_flow(&v, &reg).unwrap());
        monomial.push(burn_rate(&v, &reg, ErosiveBurning::Neglected).unwrap());
        monomial.push(product_generation(&v, &reg).unwrap());
        assert_eq!(monomial.len(), 9);
        for c in &monomial {
            assert_eq!(c.form(), MonomialEquality, "{}", c.label());
            assert_eq!(c.lesser().terms.len(), 1, "{}", c.label());
            assert_eq!(c.greater().terms.len(), 1, "{}", c.label());
        }
    }

    #[test]
    fn burn_rate_is_homogeneous_through_the_reference_pressure() {
        let (reg, v) = setup();
        let c = burn_rate(&v, &reg, ErosiveBurning::Neglected).unwrap();
        assert!(c.dimension().approx_eq(&srm_core::Dimension::VELOCITY));
        let exponent = c
            .greater()
            .terms
            .iter()
            .chain(&c.lesser().terms)
            .find_map(|m| m.exponents.get(&v.p_chamb.id()).copied());
        assert_eq!(exponent, Some(BURN_RATE_EXPONENT));
    }

    #[test]
    fn erosive_burning_is_a_signomial_equality() {
        let (reg, v) = setup();
        let c = burn_rate(&v, &reg, ErosiveBurning::Linear).unwrap();
        assert_eq!(c.form(), SignomialEquality);
        assert!(c.quantities().contains(&v.r_k.id()));
        assert!(c.quantities().contains(&v.u_avg.id()));
    }

    #[test]
    fn stagnation_keeps_the_total_on_the_greater_side() {
        let (reg, v) = setup();
        for c in stagnation(&v, &reg).unwrap() {
            assert_eq!(c.form(), PosynomialInequality);
            assert_eq!(c.greater().terms.len(), 1);
            let total = c.greater().terms[0].exponents.keys().next().copied();
            assert!(total == Some(v.p_t_in.id()) || total == Some(v.p_t_out.id()));
        }
    }
}

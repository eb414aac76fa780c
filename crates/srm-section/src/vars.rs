use srm_model::{ModelResult, Registry, Var};

/// Handles to every section quantity, resolved by name from a registry.
///
/// Resolution fails with `UnknownQuantity` if a custom table omits a row the
/// constraints need.
#[derive(Clone, Copy, Debug)]
pub struct SectionVars {
    pub area_ratio: Var,
    pub a_in: Var,
    pub a_out: Var,
    pub a_avg: Var,
    pub a_b: Var,
    pub l_b: Var,
    pub l: Var,
    pub mdot_in: Var,
    pub mdot_out: Var,
    pub rho_in: Var,
    pub rho_out: Var,
    pub p_t_in: Var,
    pub p_t_out: Var,
    pub p_in: Var,
    pub p_out: Var,
    pub p_chamb: Var,
    pub v_chamb: Var,
    pub t_t_in: Var,
    pub t_t_out: Var,
    pub u_in: Var,
    pub u_out: Var,
    pub u_avg: Var,
    pub r: Var,
    pub q: Var,
    pub t_amb: Var,
    pub r_c: Var,
    pub r_k: Var,
    pub rho_p: Var,
    pub k_comb_p: Var,
    pub c_p: Var,
    pub p_ref: Var,
}

impl SectionVars {
    pub fn resolve(registry: &Registry) -> ModelResult<Self> {
        let v = |name: &str| registry.var(name);
        Ok(Self {
            area_ratio: v("Aratio")?,
            a_in: v("A_in")?,
            a_out: v("A_out")?,
            a_avg: v("A_avg")?,
            a_b: v("A_b")?,
            l_b: v("l_b")?,
            l: v("l")?,
            mdot_in: v("mdot_in")?,
            mdot_out: v("mdot_out")?,
            rho_in: v("rho_in")?,
            rho_out: v("rho_out")?,
            p_t_in: v("P_t_in")?,
            p_t_out: v("P_t_out")?,
            p_in: v("P_in")?,
            p_out: v("P_out")?,
            p_chamb: v("P_chamb")?,
            v_chamb: v("V_chamb")?,
            t_t_in: v("T_t_in")?,
            t_t_out: v("T_t_out")?,
            u_in: v("u_in")?,
            u_out: v("u_out")?,
            u_avg: v("u_avg")?,
            r: v("r")?,
            q: v("q")?,
            t_amb: v("T_amb")?,
            r_c: v("r_c")?,
            r_k: v("r_k")?,
            rho_p: v("rho_p")?,
            k_comb_p: v("k_comb_p")?,
            c_p: v("c_p")?,
            p_ref: v("P_ref")?,
        })
    }
}

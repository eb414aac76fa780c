//! Declarative quantity table of one burn section.

use srm_model::QuantityDecl;

/// Saint-Robert burn-rate pressure exponent.
pub const BURN_RATE_EXPONENT: f64 = 0.35;

/// Every quantity of a burn section. Rows with a value are design constants.
pub const SECTION_TABLE: &[QuantityDecl] = &[
    QuantityDecl::free("Aratio", "-", "area ratio"),
    QuantityDecl::free("A_in", "m^2", "area in"),
    QuantityDecl::free("A_out", "m^2", "area out"),
    QuantityDecl::free("A_avg", "m^2", "average area"),
    QuantityDecl::free("A_b", "m^2", "burn area"),
    QuantityDecl::free("l_b", "m", "avg burn length"),
    QuantityDecl::free("l", "m", "section length"),
    QuantityDecl::free("mdot_in", "kg/s", "mass flow rate in"),
    QuantityDecl::free("mdot_out", "kg/s", "mass flow rate out"),
    QuantityDecl::free("rho_in", "kg/m^3", "density in"),
    QuantityDecl::free("rho_out", "kg/m^3", "density out"),
    QuantityDecl::free("P_t_in", "Pa", "stagnation pressure in"),
    QuantityDecl::free("P_t_out", "Pa", "stagnation pressure out"),
    QuantityDecl::free("P_in", "Pa", "static pressure at inlet"),
    QuantityDecl::free("P_out", "Pa", "static pressure at outlet"),
    QuantityDecl::free("P_chamb", "Pa", "chamber static pressure"),
    QuantityDecl::free("V_chamb", "m^3", "chamber volume"),
    QuantityDecl::free("V_fuel", "m^3", "fuel volume"),
    QuantityDecl::free("T_t_in", "K", "stagnation temperature in"),
    QuantityDecl::free("T_t_out", "K", "stagnation temperature out"),
    QuantityDecl::free("u_in", "m/s", "velocity in"),
    QuantityDecl::free("u_out", "m/s", "velocity out"),
    QuantityDecl::free("u_avg", "m/s", "average velocity"),
    QuantityDecl::free("r", "mm/s", "burn rate"),
    QuantityDecl::free("q", "kg/s", "rate of generation of products"),
    QuantityDecl::fixed("T_amb", 273.0, "K", "ambient temperature"),
    QuantityDecl::fixed("r_c", 5.606, "mm/s", "burn rate coefficient"),
    QuantityDecl::fixed("r_k", 0.05, "1/(m/s)", "erosive burn rate coefficient"),
    QuantityDecl::fixed("rho_p", 1700.0, "kg/m^3", "propellant density"),
    QuantityDecl::fixed(
        "k_comb_p",
        1.23e6,
        "J/kg",
        "propellant specific heat of combustion",
    ),
    QuantityDecl::fixed("c_p", 1000.0, "J/kg/K", "specific heat of combustion products"),
    QuantityDecl::fixed("P_ref", 1.0, "MPa", "burn rate reference pressure"),
];

//! Per-section modelling choices.

use serde::{Deserialize, Serialize};

/// How a physically exact balance is posed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceForm {
    /// Directional inequality; the objective pushes it tight.
    #[default]
    Inequality,
    /// Exact signomial equality, tightened by the relaxation driver.
    Equality,
}

/// Erosive correction to the burn-rate law.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErosiveBurning {
    /// Pure Saint-Robert law (monomial).
    #[default]
    Neglected,
    /// `r = r_c (P_chamb/P_ref)^n · (1 + r_k·u_avg)` (signomial equality).
    Linear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionOptions {
    /// Stagnation-temperature energy balance.
    pub energy_balance: BalanceForm,
    /// Mass continuity with product generation.
    pub mass_continuity: BalanceForm,
    pub erosive_burning: ErosiveBurning,
}

impl SectionOptions {
    /// Both coupled balances as exact equalities.
    pub fn exact_balances() -> Self {
        Self {
            energy_balance: BalanceForm::Equality,
            mass_continuity: BalanceForm::Equality,
            ..Self::default()
        }
    }
}

//! YAML scenario files.
//!
//! ```yaml
//! name: reference
//! options:
//!   energy_balance: equality
//!   mass_continuity: equality
//! fixed:
//!   P_t_in: 1000 kPa
//!   l: 1 cm
//!   T_t_in: 700 K
//!   mdot_in: 1 kg/s
//!   A_in: 10 cm^2
//!   u_in: 10 m/s
//! objective: exit_momentum
//! ```

use crate::error::{AppError, AppResult};
use crate::scenario::{ObjectiveSpec, Scenario};
use serde::{Deserialize, Serialize};
use srm_core::{Measured, parse_value};
use srm_model::VariableBounds;
use srm_section::SectionOptions;
use srm_solver::RelaxationConfig;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk form of a [`Scenario`]. Values are `"<number> <unit>"` strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub options: SectionOptions,
    #[serde(default)]
    pub fixed: BTreeMap<String, String>,
    /// `exit_momentum`, or a one-key map such as `minimize: [u_out, P_t_out]`.
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub objective: ObjectiveSpec,
    /// `~` disables bounds.
    #[serde(default = "default_bounds")]
    pub bounds: Option<BoundsFile>,
    #[serde(default)]
    pub initial_guess: BTreeMap<String, String>,
    #[serde(default)]
    pub relaxation: RelaxationFile,
}

/// SI bounds applied to every free quantity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoundsFile {
    pub lower: f64,
    pub upper: f64,
}

impl Default for BoundsFile {
    fn default() -> Self {
        let bounds = VariableBounds::default();
        Self {
            lower: bounds.lower,
            upper: bounds.upper,
        }
    }
}

fn default_bounds() -> Option<BoundsFile> {
    Some(BoundsFile::default())
}

/// Overrides of [`RelaxationConfig`]; omitted fields keep their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelaxationFile {
    pub max_iterations: Option<usize>,
    pub rel_tol: Option<f64>,
    pub slack_tol: Option<f64>,
    pub penalty: Option<f64>,
}

impl RelaxationFile {
    fn to_config(&self) -> AppResult<RelaxationConfig> {
        let defaults = RelaxationConfig::default();
        let config = RelaxationConfig {
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            rel_tol: self.rel_tol.unwrap_or(defaults.rel_tol),
            slack_tol: self.slack_tol.unwrap_or(defaults.slack_tol),
            penalty: self.penalty.unwrap_or(defaults.penalty),
        };
        if config.max_iterations == 0 {
            return Err(AppError::Validation(
                "relaxation.max_iterations must be at least 1".to_string(),
            ));
        }
        for (field, v) in [
            ("rel_tol", config.rel_tol),
            ("slack_tol", config.slack_tol),
            ("penalty", config.penalty),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(AppError::Validation(format!(
                    "relaxation.{field} must be positive, got {v}"
                )));
            }
        }
        Ok(config)
    }
}

impl ScenarioFile {
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml_string(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Parse every value and check the numeric settings.
    pub fn into_scenario(self) -> AppResult<Scenario> {
        let bounds = match self.bounds {
            Some(b) => {
                if !(b.lower > 0.0 && b.upper.is_finite() && b.lower < b.upper) {
                    return Err(AppError::Validation(format!(
                        "bounds must satisfy 0 < lower < upper, got {} .. {}",
                        b.lower, b.upper
                    )));
                }
                Some(VariableBounds {
                    lower: b.lower,
                    upper: b.upper,
                })
            }
            None => None,
        };

        Ok(Scenario {
            relaxation: self.relaxation.to_config()?,
            fixed: parse_values(&self.fixed)?,
            initial_guess: parse_values(&self.initial_guess)?,
            name: self.name,
            options: self.options,
            objective: self.objective,
            bounds,
        })
    }
}

fn parse_values(map: &BTreeMap<String, String>) -> AppResult<Vec<(String, Measured)>> {
    map.iter()
        .map(|(name, text)| {
            parse_value(text)
                .map(|m| (name.clone(), m))
                .map_err(|source| AppError::Value {
                    name: name.clone(),
                    source,
                })
        })
        .collect()
}

/// Load and parse a scenario file.
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::ScenarioFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    ScenarioFile::from_yaml_str(&content)?.into_scenario()
}

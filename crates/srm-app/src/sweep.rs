//! Parameter sweeps over independent scenarios.

use crate::error::AppResult;
use crate::report::SectionState;
use crate::scenario::{Scenario, run_scenario};
use rayon::prelude::*;
use srm_core::Measured;

/// Outcome of one point of a sweep.
#[derive(Debug)]
pub struct SweepPoint {
    pub value: Measured,
    pub result: AppResult<SectionState>,
}

/// Solve `base` once per value of `quantity`, in parallel.
///
/// Every point builds its own section, so points share nothing. Results come
/// back in the order of `values`; a failed point does not stop the others.
pub fn run_sweep(base: &Scenario, quantity: &str, values: &[Measured]) -> Vec<SweepPoint> {
    values
        .par_iter()
        .map(|&value| {
            let mut scenario = base.clone().with_fixed(quantity, value);
            scenario.name = format!("{}[{}={}]", base.name, quantity, value.value);
            let result = run_scenario(&scenario);
            if let Err(e) = &result {
                tracing::warn!(scenario = %scenario.name, error = %e, "sweep point failed");
            }
            SweepPoint { value, result }
        })
        .collect()
}

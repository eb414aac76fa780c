//! Scenario layer for srmflow.
//!
//! Binds boundary conditions and an objective to a fresh burn section,
//! solves it with the sequential signomial solver, validates the result and
//! reports it. Shared by the CLI and the integration tests.

pub mod config;
pub mod error;
pub mod report;
pub mod scenario;
pub mod sweep;

pub use config::{BoundsFile, RelaxationFile, ScenarioFile, load_scenario};
pub use error::{AppError, AppResult};
pub use report::{QuantityValue, SectionState};
pub use scenario::{ObjectiveSpec, RESIDUAL_TOL, Scenario, run_scenario};
pub use sweep::{SweepPoint, run_sweep};

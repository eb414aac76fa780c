//! Solvers for assembled `srm_model::Problem`s.
//!
//! `BarrierSolver` solves geometric programs globally with a log-space
//! interior-point method. `SequentialSolver` wraps any `Solver` and handles
//! signomial constraints by successive convexification, reporting iteration
//! count, final slack and the residual history.

pub mod barrier;
pub mod error;
mod lse;
pub mod relaxation;
pub mod solution;
pub mod solver;

pub use barrier::{BarrierConfig, BarrierSolver};
pub use error::{SolverError, SolverResult};
pub use relaxation::{RelaxationConfig, RelaxationState, SequentialSolver};
pub use solution::{RelaxationReport, Solution};
pub use solver::Solver;

/// Default solver stack: sequential convexification over the barrier method.
pub type DefaultSolver = SequentialSolver<BarrierSolver>;

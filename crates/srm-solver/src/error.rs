//! Error types for solver operations.

use thiserror::Error;

/// Errors that can occur while solving a problem.
///
/// These are surfaced unchanged to the caller; none of them is retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    /// No point satisfies every constraint.
    #[error("Problem is infeasible: {what}")]
    Infeasible { what: String },

    /// The objective decreases without bound.
    #[error("Problem is unbounded: '{variable}' left the representable range")]
    Unbounded { variable: String },

    /// The sequential relaxation hit its iteration cap.
    #[error(
        "Signomial relaxation did not converge after {iterations} iterations \
         (residual {residual:.3e}, max slack {max_slack:.6})"
    )]
    RelaxationNonConvergence {
        iterations: usize,
        residual: f64,
        max_slack: f64,
        /// Last iterate, model variables only, SI.
        last_iterate: Vec<(String, f64)>,
    },

    /// A geometric-program solver was handed a signomial constraint.
    #[error("Constraint '{constraint}' is not geometric; use a sequential solver")]
    NotGeometric { constraint: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

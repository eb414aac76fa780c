//! Model construction and assembly errors.

use crate::constraint::ConstraintForm;
use srm_core::{CoreError, Dimension};
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while declaring quantities, building constraints, binding
/// substitutions or assembling a model. All of them are detected before any
/// solve is attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Two quantities share a name within one model.
    #[error("Duplicate quantity name '{name}'")]
    DuplicateName { name: String },

    /// A declared unit or supplied value could not be parsed.
    #[error("Unit error for quantity '{name}': {source}")]
    Unit {
        name: String,
        #[source]
        source: CoreError,
    },

    #[error("Unknown quantity '{name}'")]
    UnknownQuantity { name: String },

    /// The registry has handed out every id it can represent.
    #[error("No quantity id left for '{name}'")]
    RegistryFull { name: String },

    /// Terms of one relation (or a substituted value) disagree on dimension.
    #[error("Dimension mismatch in {context}: expected [{expected}], found [{found}] in {term}")]
    DimensionMismatch {
        context: String,
        expected: Dimension,
        found: Dimension,
        term: String,
    },

    /// The declared form tag does not match the algebraic shape of the relation.
    #[error("Constraint '{constraint}' is declared {declared} but has the shape of a {actual}")]
    FormMismatch {
        constraint: String,
        declared: ConstraintForm,
        actual: ConstraintForm,
    },

    /// The relation cannot be put into any of the four supported forms.
    #[error("Constraint '{constraint}' is degenerate: {reason}")]
    Degenerate { constraint: String, reason: String },

    #[error("Objective '{objective}' must be a posynomial: {reason}")]
    NonPosynomialObjective { objective: String, reason: String },

    #[error("Model '{model}' has no objective")]
    MissingObjective { model: String },

    #[error("Model '{model}' has no free quantities to solve for")]
    Underconstrained { model: String },

    #[error("Quantity '{name}' is already fixed to {existing}, cannot fix it to {requested}")]
    ConflictingSubstitution {
        name: String,
        existing: f64,
        requested: f64,
    },

    #[error("Quantity '{name}' must be positive and finite, got {value}")]
    NonPositive { name: String, value: f64 },

    /// The fixed values break a constraint, either outright or by leaving a
    /// positive side bounded by zero.
    #[error("Fixed values violate constraint '{constraint}' (residual {residual:.3e})")]
    ViolatedByFixedValues { constraint: String, residual: f64 },
}


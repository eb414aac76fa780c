//! srm-model: symbolic model layer for srmflow.
//!
//! Provides:
//! - A variable registry built from a declarative quantity table
//! - Monomial / signomial expression algebra over registered quantities
//! - Typed constraints whose algebraic form is checked on construction
//! - `Model` (constraints + substitutions + objective) and its assembly
//!   into a numeric `Problem` for the solvers
//!
//! # Example
//!
//! ```
//! use srm_model::{Constraint, ConstraintForm, Model, Objective, Registry, Relation};
//! use srm_core::Measured;
//!
//! let mut registry = Registry::new();
//! let x = registry.declare("x", "m", None, "width").unwrap();
//! let y = registry.declare("y", "m", None, "height").unwrap();
//! let a = registry.declare("a", "m^2", Some(4.0), "area").unwrap();
//!
//! let area = Constraint::new(
//!     ConstraintForm::MonomialEquality,
//!     "area",
//!     x * y,
//!     Relation::Eq,
//!     a,
//!     &registry,
//! )
//! .unwrap();
//!
//! let mut model = Model::new("rectangle", registry, vec![area]);
//! model.set_objective(Objective::minimize("perimeter", x + y)).unwrap();
//! let problem = model.assemble().unwrap();
//! assert_eq!(problem.variables.len(), 2);
//! assert!(problem.is_geometric());
//! ```

pub mod constraint;
pub mod error;
pub mod expr;
pub mod model;
pub mod problem;
pub mod quantity;
pub mod registry;

// Re-exports for ergonomics
pub use constraint::{Constraint, ConstraintForm, Relation};
pub use error::{ModelError, ModelResult};
pub use expr::{Monomial, Signomial};
pub use model::{Model, Objective};
pub use problem::{CompiledConstraint, Posynomial, Problem, ProblemVar, Term, VariableBounds};
pub use quantity::{Quantity, QuantityDecl, Var};
pub use registry::Registry;

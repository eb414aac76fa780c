//! srm-core: stable foundation for srmflow.
//!
//! Contains:
//! - units (uom SI types + constructors, the `Measure` bridge)
//! - dimension (runtime dimension vectors with real exponents)
//! - unit_expr (parser for declared unit strings such as `J/kg/K`)
//! - numeric (tolerances + float comparison helpers)
//! - ids (compact quantity ids)
//! - error (shared error types)

pub mod dimension;
pub mod error;
pub mod ids;
pub mod numeric;
pub mod unit_expr;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use dimension::Dimension;
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use unit_expr::{Unit, parse_unit, parse_value};
pub use units::{Measure, Measured};

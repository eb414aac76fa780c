//! srm-section: the solid-rocket-motor burn-section model.
//!
//! Provides:
//! - The declarative quantity table of one section
//! - The geometric relations (averaging, geometry, mass flow, burn rate,
//!   product generation, stagnation pressure)
//! - The coupled signomial balances (mass continuity, energy)
//! - `BurnSection`, which assembles all of the above into one `Model`

pub mod constraints;
pub mod options;
pub mod relaxation;
pub mod section;
pub mod table;
pub mod vars;

pub use options::{BalanceForm, ErosiveBurning, SectionOptions};
pub use section::{BurnSection, exit_momentum_objective};
pub use table::{BURN_RATE_EXPONENT, SECTION_TABLE};
pub use vars::SectionVars;

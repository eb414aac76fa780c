//! Quantity declarations and handles.

use crate::expr::Monomial;
use srm_core::{Dimension, QuantityId, Unit};

/// One row of a declarative quantity table.
///
/// `value` is expressed in `unit`; rows with a value are design constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantityDecl {
    pub name: &'static str,
    pub unit: &'static str,
    pub value: Option<f64>,
    pub description: &'static str,
}

impl QuantityDecl {
    /// A free (decision) quantity.
    pub const fn free(name: &'static str, unit: &'static str, description: &'static str) -> Self {
        Self {
            name,
            unit,
            value: None,
            description,
        }
    }

    /// A constant with a declared value.
    pub const fn fixed(
        name: &'static str,
        value: f64,
        unit: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            unit,
            value: Some(value),
            description,
        }
    }
}

/// A declared physical quantity.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    pub id: QuantityId,
    pub name: String,
    /// Unit annotation as declared (e.g. `mm/s`), used for reporting.
    pub unit_label: String,
    pub unit: Unit,
    pub dimension: Dimension,
    /// Declared constant, in SI.
    pub value: Option<f64>,
    pub description: String,
}

impl Quantity {
    pub fn var(&self) -> Var {
        Var(self.id)
    }

    pub fn is_fixed(&self) -> bool {
        self.value.is_some()
    }

    /// Convert an SI value to the quantity's declared unit.
    pub fn in_declared_unit(&self, si_value: f64) -> f64 {
        self.unit.from_si(si_value)
    }
}

/// Lightweight handle to a registered quantity, used to write expressions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) QuantityId);

impl Var {
    pub fn id(self) -> QuantityId {
        self.0
    }

    pub fn pow(self, exponent: f64) -> Monomial {
        Monomial::from(self).pow(exponent)
    }
}

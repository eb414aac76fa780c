//! Variable registry: the set of quantities a model may reference.

use crate::error::{ModelError, ModelResult};
use crate::quantity::{Quantity, QuantityDecl, Var};
use srm_core::{Dimension, QuantityId, parse_unit};
use std::collections::HashMap;

/// Quantities of one model, unique by name.
///
/// Built once from a declarative table and then only read; constraints hold
/// `Var` handles into it.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    quantities: Vec<Quantity>,
    by_name: HashMap<String, QuantityId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare every row of `table`, failing on the first bad row.
    pub fn from_table(table: &[QuantityDecl]) -> ModelResult<Self> {
        let mut registry = Self::new();
        for decl in table {
            registry.declare(decl.name, decl.unit, decl.value, decl.description)?;
        }
        Ok(registry)
    }

    /// Declare a quantity. `value`, when given, is in `unit` and makes the
    /// quantity a constant.
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        unit: &str,
        value: Option<f64>,
        description: impl Into<String>,
    ) -> ModelResult<Var> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ModelError::DuplicateName { name });
        }

        let parsed = parse_unit(unit).map_err(|source| ModelError::Unit {
            name: name.clone(),
            source,
        })?;

        let value = match value {
            Some(v) => {
                let si = parsed.to_si(v);
                if !(si.is_finite() && si > 0.0) {
                    return Err(ModelError::NonPositive { name, value: v });
                }
                Some(si)
            }
            None => None,
        };

        let id = QuantityId::from_index(self.quantities.len())
            .ok_or_else(|| ModelError::RegistryFull { name: name.clone() })?;
        self.by_name.insert(name.clone(), id);
        self.quantities.push(Quantity {
            id,
            name,
            unit_label: unit.trim().to_string(),
            unit: parsed,
            dimension: parsed.dimension,
            value,
            description: description.into(),
        });
        Ok(Var(id))
    }

    /// Look up a quantity handle by name.
    pub fn var(&self, name: &str) -> ModelResult<Var> {
        self.by_name
            .get(name)
            .map(|&id| Var(id))
            .ok_or_else(|| ModelError::UnknownQuantity {
                name: name.to_string(),
            })
    }

    pub fn quantity(&self, id: QuantityId) -> ModelResult<&Quantity> {
        self.quantities
            .get(id.index() as usize)
            .ok_or_else(|| ModelError::UnknownQuantity {
                name: format!("#{id}"),
            })
    }

    pub fn dimension_of(&self, id: QuantityId) -> ModelResult<Dimension> {
        Ok(self.quantity(id)?.dimension)
    }

    /// Name for diagnostics; unknown ids render as `#index`.
    pub fn name_of(&self, id: QuantityId) -> String {
        self.quantity(id)
            .map(|q| q.name.clone())
            .unwrap_or_else(|_| format!("#{id}"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quantity> {
        self.quantities.iter()
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use srm_core::CoreError;

    const TABLE: &[QuantityDecl] = &[
        QuantityDecl::free("A_in", "m^2", "area in"),
        QuantityDecl::free("u_in", "m/s", "velocity in"),
        QuantityDecl::fixed("r_c", 5.606, "mm/s", "burn rate coefficient"),
    ];

    #[test]
    fn table_declares_in_order() {
        let registry = Registry::from_table(TABLE).unwrap();
        assert_eq!(registry.len(), 3);
        let names: Vec<_> = registry.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(names, ["A_in", "u_in", "r_c"]);
        assert_eq!(registry.var("u_in").unwrap().id().index(), 1);
    }

    #[test]
    fn declared_values_are_stored_in_si() {
        let registry = Registry::from_table(TABLE).unwrap();
        let r_c = registry.quantity(registry.var("r_c").unwrap().id()).unwrap();
        assert!(r_c.is_fixed());
        assert!((r_c.value.unwrap() - 5.606e-3).abs() < 1e-15);
        assert!((r_c.in_declared_unit(5.606e-3) - 5.606).abs() < 1e-12);
        assert!(r_c.dimension.approx_eq(&Dimension::VELOCITY));
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut registry = Registry::from_table(TABLE).unwrap();
        let err = registry.declare("A_in", "m^2", None, "again").unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateName {
                name: "A_in".to_string()
            }
        );
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn unparseable_unit_is_rejected() {
        let mut registry = Registry::new();
        let err = registry
            .declare("x", "parsecs/fortnight", None, "nonsense")
            .unwrap_err();
        assert!(matches!(
            err,
            ModelError::Unit {
                ref name,
                source: CoreError::UnknownUnit { .. }
            } if name == "x"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn non_positive_constants_are_rejected() {
        let mut registry = Registry::new();
        let err = registry.declare("T", "K", Some(-3.0), "temp").unwrap_err();
        assert!(matches!(err, ModelError::NonPositive { .. }));
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = Registry::from_table(TABLE).unwrap();
        assert!(matches!(
            registry.var("nope"),
            Err(ModelError::UnknownQuantity { .. })
        ));
    }
}

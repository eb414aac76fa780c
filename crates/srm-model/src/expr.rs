//! Monomial and signomial expressions over registered quantities.
//!
//! Coefficients are plain dimensionless numbers; any dimensional constant
//! (a reference pressure, a material property) must be a declared quantity so
//! that homogeneity can be checked term by term.

use crate::error::{ModelError, ModelResult};
use crate::quantity::Var;
use crate::registry::Registry;
use srm_core::{Dimension, QuantityId};
use std::collections::BTreeMap;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exponents closer to zero than this are dropped.
const EXPONENT_EPS: f64 = 1e-12;

/// `coeff · Π x_i^a_i`. The coefficient may be negative inside a signomial.
#[derive(Clone, Debug, PartialEq)]
pub struct Monomial {
    pub coeff: f64,
    pub exponents: BTreeMap<QuantityId, f64>,
}

impl Monomial {
    pub fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            exponents: BTreeMap::new(),
        }
    }

    pub fn pow(&self, e: f64) -> Monomial {
        let mut out = Monomial::constant(self.coeff.powf(e));
        for (&id, &a) in &self.exponents {
            out.add_exponent(id, a * e);
        }
        out
    }

    /// Same variables raised to the same powers (coefficients ignored).
    pub fn same_powers(&self, other: &Monomial) -> bool {
        self.exponents.len() == other.exponents.len()
            && self
                .exponents
                .iter()
                .zip(other.exponents.iter())
                .all(|((ia, a), (ib, b))| ia == ib && (a - b).abs() <= EXPONENT_EPS)
    }

    pub fn quantities(&self) -> impl Iterator<Item = QuantityId> + '_ {
        self.exponents.keys().copied()
    }

    pub fn dimension(&self, registry: &Registry) -> ModelResult<Dimension> {
        let mut dim = Dimension::DIMENSIONLESS;
        for (&id, &a) in &self.exponents {
            dim = dim * registry.dimension_of(id)?.powf(a);
        }
        Ok(dim)
    }

    /// Evaluate with a value lookup; `None` if any quantity has no value.
    pub fn eval(&self, value: &impl Fn(QuantityId) -> Option<f64>) -> Option<f64> {
        let mut v = self.coeff;
        for (&id, &a) in &self.exponents {
            v *= value(id)?.powf(a);
        }
        Some(v)
    }

    /// Human-readable form such as `0.5·rho_out·u_out^2`.
    pub fn describe(&self, registry: &Registry) -> String {
        let mut parts = Vec::new();
        if (self.coeff - 1.0).abs() > f64::EPSILON || self.exponents.is_empty() {
            parts.push(format!("{}", self.coeff));
        }
        for (&id, &a) in &self.exponents {
            let name = registry.name_of(id);
            if (a - 1.0).abs() <= EXPONENT_EPS {
                parts.push(name);
            } else {
                parts.push(format!("{name}^{a}"));
            }
        }
        parts.join("·")
    }

    fn add_exponent(&mut self, id: QuantityId, a: f64) {
        let e = self.exponents.entry(id).or_insert(0.0);
        *e += a;
        if e.abs() <= EXPONENT_EPS {
            self.exponents.remove(&id);
        }
    }

    fn times(mut self, rhs: &Monomial) -> Monomial {
        self.coeff *= rhs.coeff;
        for (&id, &a) in &rhs.exponents {
            self.add_exponent(id, a);
        }
        self
    }
}

impl From<Var> for Monomial {
    fn from(v: Var) -> Self {
        let mut m = Monomial::constant(1.0);
        m.exponents.insert(v.id(), 1.0);
        m
    }
}

impl From<f64> for Monomial {
    fn from(c: f64) -> Self {
        Monomial::constant(c)
    }
}

/// A sum of monomials with arbitrary-sign coefficients.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Signomial {
    pub terms: Vec<Monomial>,
}

impl Signomial {
    /// Merge like terms and drop zero coefficients. Term order follows first
    /// appearance.
    pub fn simplified(&self) -> Signomial {
        let mut merged: Vec<Monomial> = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match merged.iter_mut().find(|m| m.same_powers(term)) {
                Some(m) => m.coeff += term.coeff,
                None => merged.push(term.clone()),
            }
        }
        merged.retain(|m| m.coeff != 0.0);
        Signomial { terms: merged }
    }

    /// Non-empty with only positive coefficients.
    pub fn is_posynomial(&self) -> bool {
        !self.terms.is_empty() && self.terms.iter().all(|m| m.coeff > 0.0)
    }

    pub fn as_monomial(&self) -> Option<&Monomial> {
        match self.terms.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn quantities(&self) -> impl Iterator<Item = QuantityId> + '_ {
        self.terms.iter().flat_map(|m| m.quantities())
    }

    pub fn eval(&self, value: &impl Fn(QuantityId) -> Option<f64>) -> Option<f64> {
        self.terms.iter().map(|m| m.eval(value)).sum()
    }

    pub fn describe(&self, registry: &Registry) -> String {
        if self.terms.is_empty() {
            return "0".to_string();
        }
        self.terms
            .iter()
            .map(|m| m.describe(registry))
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// Check that every term has the same dimension and return it.
    pub fn common_dimension(
        &self,
        registry: &Registry,
        context: &str,
    ) -> ModelResult<Option<Dimension>> {
        let mut expected: Option<Dimension> = None;
        for term in &self.terms {
            let found = term.dimension(registry)?;
            let Some(exp) = expected else {
                expected = Some(found);
                continue;
            };
            if !exp.approx_eq(&found) {
                return Err(ModelError::DimensionMismatch {
                    context: context.to_string(),
                    expected: exp,
                    found,
                    term: term.describe(registry),
                });
            }
        }
        Ok(expected)
    }
}

impl From<Monomial> for Signomial {
    fn from(m: Monomial) -> Self {
        Signomial { terms: vec![m] }
    }
}

impl From<Var> for Signomial {
    fn from(v: Var) -> Self {
        Signomial::from(Monomial::from(v))
    }
}

impl From<f64> for Signomial {
    fn from(c: f64) -> Self {
        Signomial::from(Monomial::constant(c))
    }
}

// ---- multiplication / division (closed over monomials) ----

impl<T: Into<Monomial>> Mul<T> for Monomial {
    type Output = Monomial;

    fn mul(self, rhs: T) -> Monomial {
        self.times(&rhs.into())
    }
}

impl<T: Into<Monomial>> Div<T> for Monomial {
    type Output = Monomial;

    fn div(self, rhs: T) -> Monomial {
        self.times(&rhs.into().pow(-1.0))
    }
}

impl<T: Into<Monomial>> Mul<T> for Var {
    type Output = Monomial;

    fn mul(self, rhs: T) -> Monomial {
        Monomial::from(self) * rhs
    }
}

impl<T: Into<Monomial>> Div<T> for Var {
    type Output = Monomial;

    fn div(self, rhs: T) -> Monomial {
        Monomial::from(self) / rhs
    }
}

impl Mul<Var> for f64 {
    type Output = Monomial;

    fn mul(self, rhs: Var) -> Monomial {
        Monomial::constant(self) * rhs
    }
}

impl Mul<Monomial> for f64 {
    type Output = Monomial;

    fn mul(self, rhs: Monomial) -> Monomial {
        Monomial::constant(self) * rhs
    }
}

impl Div<Var> for f64 {
    type Output = Monomial;

    fn div(self, rhs: Var) -> Monomial {
        Monomial::constant(self) / rhs
    }
}

impl Div<Monomial> for f64 {
    type Output = Monomial;

    fn div(self, rhs: Monomial) -> Monomial {
        Monomial::constant(self) / rhs
    }
}

impl<T: Into<Monomial>> Mul<T> for Signomial {
    type Output = Signomial;

    fn mul(self, rhs: T) -> Signomial {
        let rhs = rhs.into();
        Signomial {
            terms: self.terms.into_iter().map(|m| m.times(&rhs)).collect(),
        }
    }
}

impl<T: Into<Monomial>> Div<T> for Signomial {
    type Output = Signomial;

    fn div(self, rhs: T) -> Signomial {
        self * rhs.into().pow(-1.0)
    }
}

// ---- addition / subtraction (produce signomials) ----

impl<T: Into<Signomial>> Add<T> for Signomial {
    type Output = Signomial;

    fn add(mut self, rhs: T) -> Signomial {
        self.terms.extend(rhs.into().terms);
        self
    }
}

impl<T: Into<Signomial>> Sub<T> for Signomial {
    type Output = Signomial;

    fn sub(self, rhs: T) -> Signomial {
        self + (-rhs.into())
    }
}

impl<T: Into<Signomial>> Add<T> for Monomial {
    type Output = Signomial;

    fn add(self, rhs: T) -> Signomial {
        Signomial::from(self) + rhs
    }
}

impl<T: Into<Signomial>> Sub<T> for Monomial {
    type Output = Signomial;

    fn sub(self, rhs: T) -> Signomial {
        Signomial::from(self) - rhs
    }
}

impl<T: Into<Signomial>> Add<T> for Var {
    type Output = Signomial;

    fn add(self, rhs: T) -> Signomial {
        Signomial::from(self) + rhs
    }
}

impl<T: Into<Signomial>> Sub<T> for Var {
    type Output = Signomial;

    fn sub(self, rhs: T) -> Signomial {
        Signomial::from(self) - rhs
    }
}

impl Neg for Monomial {
    type Output = Monomial;

    fn neg(mut self) -> Monomial {
        self.coeff = -self.coeff;
        self
    }
}

impl Neg for Signomial {
    type Output = Signomial;

    fn neg(self) -> Signomial {
        Signomial {
            terms: self.terms.into_iter().map(Neg::neg).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> (Registry, Var, Var, Var) {
        let mut r = Registry::new();
        let x = r.declare("x", "m", None, "").unwrap();
        let y = r.declare("y", "s", None, "").unwrap();
        let z = r.declare("z", "m/s", None, "").unwrap();
        (r, x, y, z)
    }

    #[test]
    fn products_collect_exponents() {
        let (_, x, y, _) = registry();
        let m = 2.0 * x * y / x.pow(3.0);
        assert_eq!(m.coeff, 2.0);
        assert_eq!(m.exponents.get(&x.id()), Some(&-2.0));
        assert_eq!(m.exponents.get(&y.id()), Some(&1.0));
    }

    #[test]
    fn cancelling_exponents_are_removed() {
        let (_, x, y, _) = registry();
        let m = x * y / x;
        assert!(!m.exponents.contains_key(&x.id()));
        assert_eq!(m.exponents.len(), 1);
    }

    #[test]
    fn simplify_merges_like_terms() {
        let (_, x, y, _) = registry();
        let s = (x * y + 2.0 * y * x - 3.0 * x * y + x).simplified();
        assert_eq!(s.terms.len(), 1);
        assert_eq!(s.terms[0], Monomial::from(x));
    }

    #[test]
    fn dimension_of_terms() {
        let (r, x, y, z) = registry();
        let ok = (x / y + z).common_dimension(&r, "test").unwrap();
        assert!(ok.unwrap().approx_eq(&Dimension::VELOCITY));

        let err = (x + z).common_dimension(&r, "bad").unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { .. }));
    }

    #[test]
    fn eval_and_describe() {
        let (r, x, y, _) = registry();
        let s = x * y + 0.5 * y.pow(2.0);
        let value = |id: QuantityId| {
            if id == x.id() {
                Some(2.0)
            } else if id == y.id() {
                Some(4.0)
            } else {
                None
            }
        };
        assert_eq!(s.eval(&value), Some(16.0));
        assert_eq!(s.describe(&r), "x·y + 0.5·y^2");
    }
}

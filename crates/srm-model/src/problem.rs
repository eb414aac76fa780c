//! Numeric problem handed to the solvers.
//!
//! Fixed quantities are folded into coefficients and free quantities are
//! renumbered densely (`0..variables.len()`), so a point is a plain `&[f64]`
//! in SI units.

use crate::constraint::ConstraintForm;
use srm_core::QuantityId;

/// `coeff · Π x[i]^a` with a positive coefficient.
#[derive(Clone, Debug, PartialEq)]
pub struct Term {
    pub coeff: f64,
    /// (variable index, exponent), sorted by index, no zero exponents.
    pub exponents: Vec<(usize, f64)>,
}

impl Term {
    pub fn constant(coeff: f64) -> Self {
        Self {
            coeff,
            exponents: Vec::new(),
        }
    }

    pub fn variable(index: usize) -> Self {
        Self {
            coeff: 1.0,
            exponents: vec![(index, 1.0)],
        }
    }

    pub fn eval(&self, x: &[f64]) -> f64 {
        self.exponents
            .iter()
            .fold(self.coeff, |acc, &(i, a)| acc * x[i].powf(a))
    }

    pub fn times(&self, other: &Term) -> Term {
        let mut exponents = self.exponents.clone();
        for &(i, a) in &other.exponents {
            match exponents.binary_search_by_key(&i, |&(j, _)| j) {
                Ok(pos) => exponents[pos].1 += a,
                Err(pos) => exponents.insert(pos, (i, a)),
            }
        }
        exponents.retain(|&(_, a)| a != 0.0);
        Term {
            coeff: self.coeff * other.coeff,
            exponents,
        }
    }

    pub fn recip(&self) -> Term {
        Term {
            coeff: 1.0 / self.coeff,
            exponents: self.exponents.iter().map(|&(i, a)| (i, -a)).collect(),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.exponents.is_empty()
    }

    fn same_powers(&self, other: &Term) -> bool {
        self.exponents.len() == other.exponents.len()
            && self
                .exponents
                .iter()
                .zip(&other.exponents)
                .all(|(&(i, a), &(j, b))| i == j && (a - b).abs() <= 1e-12)
    }
}

/// Sum of positive terms.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Posynomial {
    pub terms: Vec<Term>,
}

impl Posynomial {
    pub fn new(terms: Vec<Term>) -> Self {
        Self { terms }
    }

    /// Merge terms that have identical powers.
    pub fn merged(mut self) -> Self {
        let mut out: Vec<Term> = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            match out.iter_mut().find(|t| t.same_powers(&term)) {
                Some(t) => t.coeff += term.coeff,
                None => out.push(term),
            }
        }
        Self { terms: out }
    }

    pub fn eval(&self, x: &[f64]) -> f64 {
        self.terms.iter().map(|t| t.eval(x)).sum()
    }

    pub fn as_monomial(&self) -> Option<&Term> {
        match self.terms.as_slice() {
            [single] => Some(single),
            _ => None,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(Term::is_constant)
    }

    /// Every term multiplied by `factor`.
    pub fn times(&self, factor: &Term) -> Posynomial {
        Posynomial::new(self.terms.iter().map(|t| t.times(factor)).collect())
    }

    /// Best local monomial approximation at `x` (tangent in log space).
    ///
    /// By the arithmetic-geometric mean inequality the result never exceeds
    /// the posynomial and matches it exactly at `x`.
    pub fn monomial_approximation(&self, x: &[f64]) -> Term {
        if let Some(single) = self.as_monomial() {
            return single.clone();
        }
        let total = self.eval(x);
        let mut exponents: Vec<(usize, f64)> = Vec::new();
        for term in &self.terms {
            let weight = term.eval(x) / total;
            for &(i, a) in &term.exponents {
                match exponents.binary_search_by_key(&i, |&(j, _)| j) {
                    Ok(pos) => exponents[pos].1 += weight * a,
                    Err(pos) => exponents.insert(pos, (i, weight * a)),
                }
            }
        }
        exponents.retain(|&(_, a)| a != 0.0);
        let log_coeff = total.ln()
            - exponents
                .iter()
                .map(|&(i, a)| a * x[i].ln())
                .sum::<f64>();
        Term {
            coeff: log_coeff.exp(),
            exponents,
        }
    }
}

/// A constraint over problem variables: `lesser <= greater` or `lesser = greater`.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledConstraint {
    pub label: String,
    pub form: ConstraintForm,
    pub lesser: Posynomial,
    pub greater: Posynomial,
}

impl CompiledConstraint {
    /// Classify from the (merged) sides. Substitution can turn a signomial
    /// relation into a geometric one, so the form is recomputed here.
    pub fn new(
        label: impl Into<String>,
        equality: bool,
        lesser: Posynomial,
        greater: Posynomial,
    ) -> Self {
        let lesser = lesser.merged();
        let greater = greater.merged();
        let form =
            ConstraintForm::from_term_counts(equality, lesser.terms.len(), greater.terms.len());
        Self {
            label: label.into(),
            form,
            lesser,
            greater,
        }
    }

    /// `lesser <= greater` where `greater` is a monomial.
    pub fn posynomial_le(label: impl Into<String>, lesser: Posynomial, greater: Term) -> Self {
        Self::new(label, false, lesser, Posynomial::new(vec![greater]))
    }

    /// Relative violation, as for `Constraint::residual`.
    pub fn residual(&self, x: &[f64]) -> f64 {
        let ratio = self.lesser.eval(x) / self.greater.eval(x);
        if self.form.is_equality() {
            (ratio - 1.0).abs()
        } else {
            (ratio - 1.0).max(0.0)
        }
    }

    pub fn involves(&self, index: usize) -> bool {
        self.lesser
            .terms
            .iter()
            .chain(&self.greater.terms)
            .any(|t| t.exponents.iter().any(|&(i, _)| i == index))
    }
}

/// A decision variable of a `Problem`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemVar {
    pub name: String,
    /// Model quantity this variable stands for; `None` for solver-introduced
    /// variables such as relaxation slacks.
    pub quantity: Option<QuantityId>,
}

/// Box bounds in SI units applied to every model variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            lower: 1e-30,
            upper: 1e30,
        }
    }
}

/// Minimise a posynomial subject to typed constraints over positive variables.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    pub name: String,
    pub variables: Vec<ProblemVar>,
    pub objective: Posynomial,
    pub constraints: Vec<CompiledConstraint>,
}

impl Problem {
    /// True when no signomial constraint remains.
    pub fn is_geometric(&self) -> bool {
        self.constraints.iter().all(|c| c.form.is_geometric())
    }

    pub fn signomial_constraints(&self) -> impl Iterator<Item = &CompiledConstraint> {
        self.constraints.iter().filter(|c| !c.form.is_geometric())
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// Append a solver-introduced variable and return its index.
    pub fn add_variable(&mut self, name: impl Into<String>) -> usize {
        self.variables.push(ProblemVar {
            name: name.into(),
            quantity: None,
        });
        self.variables.len() - 1
    }

    /// Add `lower <= x <= upper` for every model variable.
    pub fn add_bounds(&mut self, bounds: VariableBounds) {
        for (i, var) in self.variables.iter().enumerate() {
            if var.quantity.is_none() {
                continue;
            }
            self.constraints.push(CompiledConstraint::posynomial_le(
                format!("lower bound on {}", var.name),
                Posynomial::new(vec![Term::constant(bounds.lower)]),
                Term::variable(i),
            ));
            self.constraints.push(CompiledConstraint::posynomial_le(
                format!("upper bound on {}", var.name),
                Posynomial::new(vec![Term::variable(i)]),
                Term::constant(bounds.upper),
            ));
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn approximation_never_exceeds_posynomial(
            c0 in 0.1_f64..10.0,
            c1 in 0.1_f64..10.0,
            a in -2.0_f64..2.0,
            x0 in 0.01_f64..100.0,
            probe in 0.01_f64..100.0,
        ) {
            let p = Posynomial::new(vec![
                Term::constant(c0),
                Term { coeff: c1, exponents: vec![(0, a)] },
            ]);
            let m = p.monomial_approximation(&[x0]);
            prop_assert!((m.eval(&[x0]) / p.eval(&[x0]) - 1.0).abs() < 1e-9);
            prop_assert!(m.eval(&[probe]) <= p.eval(&[probe]) * (1.0 + 1e-9));
        }
    }
}

//! Typed constraints.
//!
//! Every relation is normalised to `lesser (<= | =) greater` with both sides
//! posynomials, then classified by term counts:
//!
//! | relation | lesser   | greater  | form                    |
//! |----------|----------|----------|-------------------------|
//! | `=`      | 1 term   | 1 term   | monomial equality       |
//! | `=`      | any      | any      | signomial equality      |
//! | `<=`     | any      | 1 term   | posynomial inequality   |
//! | `<=`     | any      | 2+ terms | signomial inequality    |
//!
//! The caller states the form it expects; a mismatch is a modelling error.

use crate::error::{ModelError, ModelResult};
use crate::expr::{Monomial, Signomial};
use crate::registry::Registry;
use srm_core::{Dimension, QuantityId};
use std::collections::BTreeSet;
use std::fmt;

/// The four algebraic shapes a constraint may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstraintForm {
    MonomialEquality,
    PosynomialInequality,
    SignomialEquality,
    SignomialInequality,
}

impl ConstraintForm {
    /// Directly representable in a geometric program.
    pub fn is_geometric(self) -> bool {
        matches!(self, Self::MonomialEquality | Self::PosynomialInequality)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::MonomialEquality | Self::SignomialEquality)
    }

    /// Classify a normalised relation by the term counts of its sides.
    pub fn from_term_counts(equality: bool, lesser_terms: usize, greater_terms: usize) -> Self {
        match (equality, lesser_terms, greater_terms) {
            (true, 1, 1) => Self::MonomialEquality,
            (true, _, _) => Self::SignomialEquality,
            (false, _, 1) => Self::PosynomialInequality,
            (false, _, _) => Self::SignomialInequality,
        }
    }
}

impl fmt::Display for ConstraintForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MonomialEquality => "monomial equality",
            Self::PosynomialInequality => "posynomial inequality",
            Self::SignomialEquality => "signomial equality",
            Self::SignomialInequality => "signomial inequality",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    Eq,
    Le,
    Ge,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Eq => "=",
            Relation::Le => "<=",
            Relation::Ge => ">=",
        })
    }
}

/// A relation between quantities with a validated algebraic form.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    label: String,
    form: ConstraintForm,
    relation: Relation,
    lhs: Signomial,
    rhs: Signomial,
    lesser: Signomial,
    greater: Signomial,
    dimension: Dimension,
}

impl Constraint {
    /// Build a constraint, checking dimensional homogeneity of every term and
    /// that the relation really has the declared `form`.
    pub fn new(
        form: ConstraintForm,
        label: impl Into<String>,
        lhs: impl Into<Signomial>,
        relation: Relation,
        rhs: impl Into<Signomial>,
        registry: &Registry,
    ) -> ModelResult<Self> {
        let label = label.into();
        let lhs = lhs.into();
        let rhs = rhs.into();

        let all_terms = Signomial {
            terms: lhs.terms.iter().chain(rhs.terms.iter()).cloned().collect(),
        };
        let dimension = all_terms
            .common_dimension(registry, &format!("constraint '{label}'"))?
            .unwrap_or(Dimension::DIMENSIONLESS);

        let (lesser, greater) = normalise(&lhs, relation, &rhs);
        if lesser.terms.is_empty() {
            return Err(ModelError::Degenerate {
                constraint: label,
                reason: "no positive term bounded by the other side".to_string(),
            });
        }
        if greater.terms.is_empty() {
            return Err(ModelError::Degenerate {
                constraint: label,
                reason: "positive terms bounded above by zero".to_string(),
            });
        }

        let actual = ConstraintForm::from_term_counts(
            relation == Relation::Eq,
            lesser.terms.len(),
            greater.terms.len(),
        );
        if actual != form {
            return Err(ModelError::FormMismatch {
                constraint: label,
                declared: form,
                actual,
            });
        }

        Ok(Self {
            label,
            form,
            relation,
            lhs,
            rhs,
            lesser,
            greater,
            dimension,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn form(&self) -> ConstraintForm {
        self.form
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    /// Left-hand side as written.
    pub fn lhs(&self) -> &Signomial {
        &self.lhs
    }

    /// Right-hand side as written.
    pub fn rhs(&self) -> &Signomial {
        &self.rhs
    }

    /// Side that must not exceed the other (after normalisation).
    pub fn lesser(&self) -> &Signomial {
        &self.lesser
    }

    pub fn greater(&self) -> &Signomial {
        &self.greater
    }

    /// Common dimension of every term.
    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn quantities(&self) -> BTreeSet<QuantityId> {
        self.lesser
            .quantities()
            .chain(self.greater.quantities())
            .collect()
    }

    /// Relative violation at a point: `|lesser/greater - 1|` for equalities,
    /// `max(0, lesser/greater - 1)` for inequalities. `None` if a quantity
    /// has no value.
    pub fn residual(&self, value: &impl Fn(QuantityId) -> Option<f64>) -> Option<f64> {
        let ratio = self.lesser.eval(value)? / self.greater.eval(value)?;
        Some(if self.form.is_equality() {
            (ratio - 1.0).abs()
        } else {
            (ratio - 1.0).max(0.0)
        })
    }

    pub fn describe(&self, registry: &Registry) -> String {
        format!(
            "{}: {} {} {}",
            self.label,
            self.lhs.describe(registry),
            self.relation,
            self.rhs.describe(registry)
        )
    }
}

/// Move every term to the side where its coefficient is positive.
fn normalise(lhs: &Signomial, relation: Relation, rhs: &Signomial) -> (Signomial, Signomial) {
    let diff = match relation {
        Relation::Eq | Relation::Le => lhs.clone() - rhs.clone(),
        Relation::Ge => rhs.clone() - lhs.clone(),
    }
    .simplified();

    let (pos, neg): (Vec<Monomial>, Vec<Monomial>) =
        diff.terms.into_iter().partition(|m| m.coeff > 0.0);
    (
        Signomial { terms: pos },
        Signomial {
            terms: neg.into_iter().map(|m| -m).collect(),
        },
    )
}

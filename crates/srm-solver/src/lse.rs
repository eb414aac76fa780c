//! Log-sum-exp rows: posynomials in log space.
//!
//! With `y = ln x` a posynomial `Σ c_k Π x_i^a_ki` becomes
//! `F(y) = ln Σ exp(a_k·y + ln c_k)`, a smooth convex function.

use nalgebra::{DMatrix, DVector};
use srm_model::{Posynomial, Term};

#[derive(Clone, Debug)]
pub(crate) struct LogSumExp {
    /// (sparse exponent row, ln coefficient) per term.
    terms: Vec<(Vec<(usize, f64)>, f64)>,
}

impl LogSumExp {
    pub(crate) fn from_posynomial(p: &Posynomial) -> Self {
        Self {
            terms: p
                .terms
                .iter()
                .map(|t| (t.exponents.clone(), t.coeff.ln()))
                .collect(),
        }
    }

    /// `p / m ≤ 1` in log form.
    pub(crate) fn from_ratio(p: &Posynomial, m: &Term) -> Self {
        Self::from_posynomial(&p.times(&m.recip()))
    }

    fn exponents(&self, y: &DVector<f64>) -> Vec<f64> {
        self.terms
            .iter()
            .map(|(row, b)| b + row.iter().map(|&(i, a)| a * y[i]).sum::<f64>())
            .collect()
    }

    pub(crate) fn value(&self, y: &DVector<f64>) -> f64 {
        let v = self.exponents(y);
        let top = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !top.is_finite() {
            return top;
        }
        top + v.iter().map(|e| (e - top).exp()).sum::<f64>().ln()
    }

    /// Value, gradient and Hessian at `y`.
    pub(crate) fn derivatives(&self, y: &DVector<f64>) -> (f64, DVector<f64>, DMatrix<f64>) {
        let n = y.len();
        let v = self.exponents(y);
        let top = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = v.iter().map(|e| (e - top).exp()).collect();
        let total: f64 = weights.iter().sum();
        let value = top + total.ln();

        let mut grad = DVector::zeros(n);
        let mut hess = DMatrix::zeros(n, n);
        for ((row, _), w) in self.terms.iter().zip(&weights) {
            let w = w / total;
            for &(i, a) in row {
                grad[i] += w * a;
                for &(j, b) in row {
                    hess[(i, j)] += w * a * b;
                }
            }
        }
        hess -= &grad * grad.transpose();
        (value, grad, hess)
    }

    /// Exponent row and offset of a single-term row: `a·y + b`.
    pub(crate) fn affine_row(&self, n: usize) -> Option<(DVector<f64>, f64)> {
        match self.terms.as_slice() {
            [(row, b)] => {
                let mut a = DVector::zeros(n);
                for &(i, e) in row {
                    a[i] += e;
                }
                Some((a, *b))
            }
            _ => None,
        }
    }
}

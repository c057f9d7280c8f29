//! Weighted sums of Pauli strings.
//!
//! A [`SparsePauliOp`] is
//!
//!   O = Σ_k  c_k · P_k
//!
//! over a fixed register width, with real `c_k`. Terms are kept exactly as
//! they were accumulated; [`SparsePauliOp::simplify`] merges duplicate
//! labels and is what equality between operators is judged on.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult, ensure_finite};
use crate::pauli::{Pauli, PauliString};

/// Default absolute tolerance used when comparing coefficients.
pub const DEFAULT_ATOL: f64 = 1e-12;

/// Sum of real-weighted Pauli strings on a register of fixed width.
///
/// Deserialization goes through [`SparsePauliOp::from_terms`], so every
/// term is checked against the declared width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSparsePauliOp")]
pub struct SparsePauliOp {
    num_qubits: usize,
    terms: Vec<(PauliString, f64)>,
}

#[derive(Deserialize)]
struct RawSparsePauliOp {
    num_qubits: usize,
    terms: Vec<(PauliString, f64)>,
}

impl TryFrom<RawSparsePauliOp> for SparsePauliOp {
    type Error = OpsError;

    fn try_from(raw: RawSparsePauliOp) -> Result<Self, Self::Error> {
        Self::from_terms(raw.num_qubits, raw.terms)
    }
}

impl SparsePauliOp {
    /// The zero operator on `num_qubits` qubits (no terms).
    pub fn zero(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            terms: Vec::new(),
        }
    }

    /// A single string with coefficient 1.
    pub fn from_pauli(pauli: PauliString) -> Self {
        Self {
            num_qubits: pauli.num_qubits(),
            terms: vec![(pauli, 1.0)],
        }
    }

    /// A single-qubit operator with coefficient 1.
    pub fn single(pauli: Pauli) -> Self {
        Self::from_pauli(PauliString::from_paulis([pauli]))
    }

    /// Left-to-right tensor product of single-qubit factors.
    ///
    /// `from_factors(&[X, I, I])` is `X.tensor(I).tensor(I)`. The empty
    /// product is the scalar identity: one zero-width term with coefficient 1.
    pub fn from_factors(factors: &[Pauli]) -> Self {
        factors
            .iter()
            .map(|&p| Self::single(p))
            .fold(Self::from_pauli(PauliString::identity(0)), |acc, next| {
                acc.tensor(&next)
            })
    }

    /// Build from explicit terms; every string must have width `num_qubits`.
    pub fn from_terms(
        num_qubits: usize,
        terms: impl IntoIterator<Item = (PauliString, f64)>,
    ) -> OpsResult<Self> {
        let mut op = Self::zero(num_qubits);
        for (pauli, coeff) in terms {
            if pauli.num_qubits() != num_qubits {
                return Err(OpsError::WidthMismatch {
                    left: num_qubits,
                    right: pauli.num_qubits(),
                });
            }
            op.terms.push((pauli, ensure_finite("term", coeff)?));
        }
        Ok(op)
    }

    /// Build from `(label, coeff)` pairs such as `[("XI", 1.0), ("IZ", -0.5)]`.
    pub fn from_list<S: AsRef<str>>(list: &[(S, f64)]) -> OpsResult<Self> {
        let strings = list
            .iter()
            .map(|(label, coeff)| Ok((label.as_ref().parse::<PauliString>()?, *coeff)))
            .collect::<OpsResult<Vec<_>>>()?;
        let num_qubits = strings.first().map_or(0, |(p, _)| p.num_qubits());
        Self::from_terms(num_qubits, strings)
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of stored terms (before any simplification).
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// All stored terms.
    pub fn terms(&self) -> &[(PauliString, f64)] {
        &self.terms
    }

    /// Kronecker product `self ⊗ other`; coefficients multiply.
    pub fn tensor(&self, other: &Self) -> Self {
        let mut terms = Vec::with_capacity(self.terms.len() * other.terms.len());
        for (a, ca) in &self.terms {
            for (b, cb) in &other.terms {
                terms.push((a.tensor(b), ca * cb));
            }
        }
        Self {
            num_qubits: self.num_qubits + other.num_qubits,
            terms,
        }
    }

    /// Operator sum `self + other`. Terms are concatenated, not merged.
    pub fn add(&self, other: &Self) -> OpsResult<Self> {
        let mut out = self.clone();
        out.accumulate(other)?;
        Ok(out)
    }

    /// In-place `self += other`.
    pub fn accumulate(&mut self, other: &Self) -> OpsResult<()> {
        if self.num_qubits != other.num_qubits {
            return Err(OpsError::WidthMismatch {
                left: self.num_qubits,
                right: other.num_qubits,
            });
        }
        self.terms.extend(other.terms.iter().cloned());
        Ok(())
    }

    /// Multiply every coefficient by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self
                .terms
                .iter()
                .map(|(p, c)| (p.clone(), c * factor))
                .collect(),
        }
    }

    /// Relabel every term by a cyclic shift of `k` positions.
    pub fn rotate(&self, k: usize) -> Self {
        Self {
            num_qubits: self.num_qubits,
            terms: self
                .terms
                .iter()
                .map(|(p, c)| (p.rotate(k), *c))
                .collect(),
        }
    }

    /// Merge duplicate strings, drop coefficients with `|c| <= atol`, and
    /// order the remaining terms by label.
    pub fn simplify(&self, atol: f64) -> Self {
        let mut merged: BTreeMap<PauliString, f64> = BTreeMap::new();
        for (p, c) in &self.terms {
            *merged.entry(p.clone()).or_insert(0.0) += c;
        }
        Self {
            num_qubits: self.num_qubits,
            terms: merged.into_iter().filter(|(_, c)| c.abs() > atol).collect(),
        }
    }

    /// Equality as operators: same width and the same simplified terms,
    /// with coefficients agreeing to within `atol`.
    pub fn equiv(&self, other: &Self, atol: f64) -> bool {
        if self.num_qubits != other.num_qubits {
            return false;
        }
        let a = self.simplify(atol);
        let b = other.simplify(atol);
        a.terms.len() == b.terms.len()
            && a.terms
                .iter()
                .zip(&b.terms)
                .all(|((pa, ca), (pb, cb))| pa == pb && (ca - cb).abs() <= atol)
    }

    /// Summed coefficient of `pauli` across all stored terms.
    pub fn coefficient(&self, pauli: &PauliString) -> f64 {
        self.terms
            .iter()
            .filter(|(p, _)| p == pauli)
            .map(|(_, c)| c)
            .sum()
    }

    /// `(label, coeff)` pairs in storage order.
    pub fn to_list(&self) -> Vec<(String, f64)> {
        self.terms.iter().map(|(p, c)| (p.label(), *c)).collect()
    }
}

impl fmt::Display for SparsePauliOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "SparsePauliOp ({} terms, {} qubits):",
            self.num_terms(),
            self.num_qubits
        )?;
        for (p, c) in &self.terms {
            if *c >= 0.0 {
                writeln!(f, "  +{c:.4} {p}")?;
            } else {
                writeln!(f, "  {c:.4} {p}")?;
            }
        }
        Ok(())
    }
}

//! Dense matrix expansion of Pauli operators.
//!
//! Used as a reference when checking operator identities on small
//! registers; the matrix has `2^n × 2^n` entries, so the width is capped at
//! [`MAX_MATRIX_QUBITS`].

use ndarray::{Array2, arr2};
use num_complex::Complex64;

use crate::error::{OpsError, OpsResult};
use crate::operator::SparsePauliOp;
use crate::pauli::{Pauli, PauliString};

/// Largest register accepted by [`to_matrix`].
pub const MAX_MATRIX_QUBITS: usize = 10;

/// 2×2 matrix of a single-qubit Pauli.
pub fn pauli_matrix(p: Pauli) -> Array2<Complex64> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let i = Complex64::new(0.0, 1.0);
    match p {
        Pauli::I => arr2(&[[one, zero], [zero, one]]),
        Pauli::X => arr2(&[[zero, one], [one, zero]]),
        Pauli::Y => arr2(&[[zero, -i], [i, zero]]),
        Pauli::Z => arr2(&[[one, zero], [zero, -one]]),
    }
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (br, bc) = b.dim();
    let (ar, ac) = a.dim();
    let mut out = Array2::<Complex64>::zeros((ar * br, ac * bc));
    for ((i, j), av) in a.indexed_iter() {
        if av.norm_sqr() == 0.0 {
            continue;
        }
        for ((k, l), bv) in b.indexed_iter() {
            out[[i * br + k, j * bc + l]] = av * bv;
        }
    }
    out
}

/// Dense matrix of a Pauli string, leftmost factor most significant.
pub fn string_matrix(s: &PauliString) -> Array2<Complex64> {
    s.paulis()
        .iter()
        .map(|&p| pauli_matrix(p))
        .reduce(|acc, m| kron(&acc, &m))
        .unwrap_or_else(|| Array2::from_elem((1, 1), Complex64::new(1.0, 0.0)))
}

/// Dense matrix of a full operator.
pub fn to_matrix(op: &SparsePauliOp) -> OpsResult<Array2<Complex64>> {
    let n = op.num_qubits();
    if n > MAX_MATRIX_QUBITS {
        return Err(OpsError::TooLargeForMatrix {
            n_qubits: n,
            max: MAX_MATRIX_QUBITS,
        });
    }
    let dim = 1usize << n;
    let mut out = Array2::<Complex64>::zeros((dim, dim));
    for (p, c) in op.terms() {
        out.scaled_add(Complex64::new(*c, 0.0), &string_matrix(p));
    }
    Ok(out)
}

/// Largest entry-wise distance between two matrices of the same shape.
pub fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}

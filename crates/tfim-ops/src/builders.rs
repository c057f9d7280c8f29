//! Ring-symmetric operator builders.
//!
//! Every operator here is a *rotated sum*: a base pattern of Paulis on a
//! register of `n` qubits is tensored into one string, then cyclically
//! shifted `n − 1` times, and all `n` shifts are added. Qubit `n − 1`
//! therefore couples back to qubit `0`.
//!
//! The transverse-field Ising Hamiltonian on the ring is
//!
//!   H = −h · Σᵢ Xᵢ  −  J · Σᵢ Zᵢ Zᵢ₊₁  −  h_z · Σᵢ Zᵢ
//!
//! ```rust
//! use tfim_ops::builders::{Axis, ising_hamiltonian, magnetisation_operator};
//!
//! let h = ising_hamiltonian(4, 1.0, 0.1, 1.0).unwrap();
//! assert_eq!(h.num_terms(), 12);
//!
//! let mx = magnetisation_operator(4, Axis::X).unwrap();
//! assert_eq!(mx.num_terms(), 4);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult, ensure_finite};
use crate::operator::SparsePauliOp;
use crate::pauli::Pauli;

/// Axis of a magnetisation observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Total X magnetisation.
    X,
    /// Total Z magnetisation.
    Z,
}

impl Axis {
    /// Pauli measured along this axis.
    pub fn pauli(self) -> Pauli {
        match self {
            Axis::X => Pauli::X,
            Axis::Z => Pauli::Z,
        }
    }

    /// Short name used for auxiliary-operator keys (`x_mag`, `z_mag`).
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "z" => Ok(Axis::Z),
            _ => Err(OpsError::InvalidAxis(s.to_string())),
        }
    }
}

/// Model parameters of the ring Ising Hamiltonian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsingParams {
    /// Transverse field strength.
    pub h: f64,
    /// Longitudinal bias.
    #[serde(default)]
    pub h_z: f64,
    /// Nearest-neighbour coupling.
    #[serde(default = "default_coupling")]
    pub j: f64,
}

fn default_coupling() -> f64 {
    1.0
}

impl IsingParams {
    /// Field `h` with no bias and unit coupling.
    pub fn new(h: f64) -> Self {
        Self {
            h,
            h_z: 0.0,
            j: default_coupling(),
        }
    }

    /// Set the longitudinal bias.
    pub fn with_bias(mut self, h_z: f64) -> Self {
        self.h_z = h_z;
        self
    }

    /// Set the coupling strength.
    pub fn with_coupling(mut self, j: f64) -> Self {
        self.j = j;
        self
    }

    /// Build the Hamiltonian on a ring of `n_qubits`.
    pub fn build(&self, n_qubits: usize) -> OpsResult<SparsePauliOp> {
        ising_hamiltonian(n_qubits, self.h, self.h_z, self.j)
    }
}

/// Sum of all `n` cyclic shifts of a pattern.
///
/// `placed` lists the non-identity `(position, op)` pairs of the base
/// pattern; every other position is the identity.
pub fn rotated_sum(n_qubits: usize, placed: &[(usize, Pauli)]) -> OpsResult<SparsePauliOp> {
    let mut factors = vec![Pauli::I; n_qubits];
    for &(position, op) in placed {
        let slot = factors
            .get_mut(position)
            .ok_or(OpsError::PositionOutOfRange { position, n_qubits })?;
        *slot = op;
    }

    let mut sum = SparsePauliOp::from_factors(&factors);
    for _ in 1..n_qubits {
        factors.rotate_right(1);
        sum.accumulate(&SparsePauliOp::from_factors(&factors))?;
    }
    Ok(sum)
}

/// Transverse-field Ising Hamiltonian with periodic boundary.
///
/// Returns the unsimplified operator of `3 · n_qubits` terms: the X block,
/// then the ZZ block, then the Z block. The Z block is present even when
/// `h_z == 0`.
pub fn ising_hamiltonian(n_qubits: usize, h: f64, h_z: f64, j: f64) -> OpsResult<SparsePauliOp> {
    if n_qubits < 2 {
        return Err(OpsError::TooFewQubits { n_qubits, min: 2 });
    }
    let h = ensure_finite("h", h)?;
    let h_z = ensure_finite("h_z", h_z)?;
    let j = ensure_finite("J", j)?;

    let transverse = rotated_sum(n_qubits, &[(0, Pauli::X)])?;
    let coupling = rotated_sum(n_qubits, &[(0, Pauli::Z), (1, Pauli::Z)])?;
    let bias = rotated_sum(n_qubits, &[(0, Pauli::Z)])?;

    let mut hamiltonian = transverse.scale(-h);
    hamiltonian.accumulate(&coupling.scale(-j))?;
    hamiltonian.accumulate(&bias.scale(-h_z))?;

    tracing::trace!(n_qubits, h, h_z, j, "built ising hamiltonian");
    Ok(hamiltonian)
}

/// Total magnetisation along `axis`: `Σᵢ Pᵢ` with `P ∈ {X, Z}`.
pub fn magnetisation_operator(n_qubits: usize, axis: Axis) -> OpsResult<SparsePauliOp> {
    if n_qubits == 0 {
        return Err(OpsError::TooFewQubits { n_qubits, min: 1 });
    }
    rotated_sum(n_qubits, &[(0, axis.pauli())])
}

/// [`magnetisation_operator`] with the axis given by name.
pub fn magnetisation_operator_named(n_qubits: usize, axis: &str) -> OpsResult<SparsePauliOp> {
    magnetisation_operator(n_qubits, axis.parse()?)
}

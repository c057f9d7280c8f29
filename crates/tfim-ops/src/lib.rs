//! `tfim-ops` — Pauli operator algebra for ring Ising models.
//!
//! Provides a small value type for weighted Pauli sums with explicit
//! `tensor` and `add`, plus the two builders used by the VQE field sweep:
//!
//! - [`ising_hamiltonian`] — `−h ΣX − J ΣZZ − h_z ΣZ` on a ring
//! - [`magnetisation_operator`] — `ΣX` or `ΣZ` on a ring
//!
//! # Quick start
//!
//! ```rust
//! use tfim_ops::{Axis, SparsePauliOp, ising_hamiltonian, magnetisation_operator};
//! use tfim_ops::operator::DEFAULT_ATOL;
//!
//! let h = ising_hamiltonian(4, 1.0, 0.1, 1.0).unwrap();
//!
//! // Ring symmetry: relabelling the qubits by one position changes nothing.
//! assert!(h.rotate(1).equiv(&h, DEFAULT_ATOL));
//!
//! let mz = magnetisation_operator(4, Axis::Z).unwrap();
//! assert_eq!(mz.num_qubits(), 4);
//! ```

pub mod builders;
pub mod error;
pub mod matrix;
pub mod operator;
pub mod pauli;

pub use builders::{
    Axis, IsingParams, ising_hamiltonian, magnetisation_operator, magnetisation_operator_named,
    rotated_sum,
};
pub use error::{OpsError, OpsResult};
pub use operator::SparsePauliOp;
pub use pauli::{Pauli, PauliString};

//! Error types for the ops crate.

use thiserror::Error;

/// Errors produced while building or combining Pauli operators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OpsError {
    /// The register is too small for the requested operator.
    #[error("Operator needs at least {min} qubits, got {n_qubits}")]
    TooFewQubits {
        /// Requested register width.
        n_qubits: usize,
        /// Minimum width the builder supports.
        min: usize,
    },

    /// Magnetisation axis other than `x` or `z`.
    #[error("Invalid axis '{0}': expected 'x' or 'z'")]
    InvalidAxis(String),

    /// Two operators on registers of different width were combined.
    #[error("Operator width mismatch: {left} qubits vs {right} qubits")]
    WidthMismatch {
        /// Width of the left operand.
        left: usize,
        /// Width of the right operand.
        right: usize,
    },

    /// A pattern position lies outside the register.
    #[error("Position {position} is out of range for a {n_qubits}-qubit register")]
    PositionOutOfRange {
        /// The offending position.
        position: usize,
        /// Register width.
        n_qubits: usize,
    },

    /// A Pauli label contains something other than `I`, `X`, `Y`, `Z`.
    #[error("Invalid Pauli label '{0}'")]
    InvalidLabel(String),

    /// A coefficient or model parameter is NaN or infinite.
    #[error("Coefficient {name} is not finite: {value}")]
    NonFiniteCoefficient {
        /// Which parameter was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Dense expansion was requested for a register that is too wide.
    #[error("Dense expansion is limited to {max} qubits, operator has {n_qubits}")]
    TooLargeForMatrix {
        /// Register width of the operator.
        n_qubits: usize,
        /// Largest width accepted by `to_matrix`.
        max: usize,
    },
}

/// Result type for operator construction.
pub type OpsResult<T> = Result<T, OpsError>;

/// Reject NaN and infinite parameters before they reach an operator.
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> OpsResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OpsError::NonFiniteCoefficient { name, value })
    }
}

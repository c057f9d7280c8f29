//! Single-qubit Paulis and dense Pauli strings.
//!
//! A [`PauliString`] holds exactly one [`Pauli`] per register position, in
//! tensor order: position 0 is the leftmost factor of
//! `P₀ ⊗ P₁ ⊗ … ⊗ Pₙ₋₁`, and the label is read the same way (`"XIII"` is
//! `X ⊗ I ⊗ I ⊗ I`).
//!
//! ```rust
//! use tfim_ops::pauli::{Pauli, PauliString};
//!
//! let zz = PauliString::with_ops(4, [(0, Pauli::Z), (1, Pauli::Z)]).unwrap();
//! assert_eq!(zz.label(), "ZZII");
//! assert_eq!(zz.rotate(1).label(), "IZZI");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{OpsError, OpsResult};

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Label character of this operator.
    pub fn as_char(self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Parse a label character (case-insensitive).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }

    /// True for [`Pauli::I`].
    pub fn is_identity(self) -> bool {
        self == Pauli::I
    }
}

impl fmt::Display for Pauli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A tensor product of one Pauli per register position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PauliString {
    paulis: Vec<Pauli>,
}

impl PauliString {
    /// All-identity string on `n_qubits` positions.
    pub fn identity(n_qubits: usize) -> Self {
        Self {
            paulis: vec![Pauli::I; n_qubits],
        }
    }

    /// Build from the factors in tensor order.
    pub fn from_paulis(paulis: impl IntoIterator<Item = Pauli>) -> Self {
        Self {
            paulis: paulis.into_iter().collect(),
        }
    }

    /// Identity on `n_qubits` positions with the given `(position, op)` pairs
    /// placed on top. Later pairs overwrite earlier ones.
    pub fn with_ops(
        n_qubits: usize,
        ops: impl IntoIterator<Item = (usize, Pauli)>,
    ) -> OpsResult<Self> {
        let mut s = Self::identity(n_qubits);
        for (position, op) in ops {
            let slot = s
                .paulis
                .get_mut(position)
                .ok_or(OpsError::PositionOutOfRange { position, n_qubits })?;
            *slot = op;
        }
        Ok(s)
    }

    /// Register width.
    pub fn num_qubits(&self) -> usize {
        self.paulis.len()
    }

    /// The factors in tensor order.
    pub fn paulis(&self) -> &[Pauli] {
        &self.paulis
    }

    /// Pauli at `position`, if the position exists.
    pub fn get(&self, position: usize) -> Option<Pauli> {
        self.paulis.get(position).copied()
    }

    /// Non-identity `(position, op)` pairs, ascending by position.
    pub fn ops(&self) -> impl Iterator<Item = (usize, Pauli)> + '_ {
        self.paulis
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_identity())
            .map(|(i, p)| (i, *p))
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> usize {
        self.paulis.iter().filter(|p| !p.is_identity()).count()
    }

    /// True if every factor is the identity.
    pub fn is_identity(&self) -> bool {
        self.weight() == 0
    }

    /// Cyclic shift: the factor at position `p` moves to `(p + k) mod n`.
    pub fn rotate(&self, k: usize) -> Self {
        let mut paulis = self.paulis.clone();
        if !paulis.is_empty() {
            let shift = k % paulis.len();
            paulis.rotate_right(shift);
        }
        Self { paulis }
    }

    /// Kronecker product `self ⊗ other`.
    pub fn tensor(&self, other: &Self) -> Self {
        let mut paulis = Vec::with_capacity(self.paulis.len() + other.paulis.len());
        paulis.extend_from_slice(&self.paulis);
        paulis.extend_from_slice(&other.paulis);
        Self { paulis }
    }

    /// Label in tensor order, e.g. `"XIZI"`.
    pub fn label(&self) -> String {
        self.paulis.iter().map(|p| p.as_char()).collect()
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.paulis {
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl FromStr for PauliString {
    type Err = OpsError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let paulis = label
            .chars()
            .map(Pauli::from_char)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| OpsError::InvalidLabel(label.to_string()))?;
        if paulis.is_empty() {
            return Err(OpsError::InvalidLabel(label.to_string()));
        }
        Ok(Self { paulis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_ops_places_operators() {
        let s = PauliString::with_ops(4, [(0, Pauli::X)]).unwrap();
        assert_eq!(s.label(), "XIII");
        assert_eq!(s.weight(), 1);
    }

    #[test]
    fn test_with_ops_out_of_range() {
        let err = PauliString::with_ops(1, [(1, Pauli::Z)]).unwrap_err();
        assert!(matches!(
            err,
            OpsError::PositionOutOfRange {
                position: 1,
                n_qubits: 1
            }
        ));
    }

    #[test]
    fn test_rotate_wraps_around() {
        let s: PauliString = "IIZZ".parse().unwrap();
        assert_eq!(s.rotate(1).label(), "ZIIZ");
        assert_eq!(s.rotate(4), s);
        assert_eq!(s.rotate(5), s.rotate(1));
    }

    #[test]
    fn test_rotate_empty_is_noop() {
        let s = PauliString::identity(0);
        assert_eq!(s.rotate(3), s);
    }

    #[test]
    fn test_tensor_concatenates() {
        let a: PauliString = "XI".parse().unwrap();
        let b: PauliString = "Z".parse().unwrap();
        assert_eq!(a.tensor(&b).label(), "XIZ");
    }

    #[test]
    fn test_parse_rejects_bad_label() {
        assert!("XQ".parse::<PauliString>().is_err());
        assert!("".parse::<PauliString>().is_err());
        assert_eq!("xz".parse::<PauliString>().unwrap().label(), "XZ");
    }

    #[test]
    fn test_ops_skips_identity() {
        let s: PauliString = "IXIZ".parse().unwrap();
        let ops: Vec<_> = s.ops().collect();
        assert_eq!(ops, vec![(1, Pauli::X), (3, Pauli::Z)]);
    }
}

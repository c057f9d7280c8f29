//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod fields;
pub mod hamiltonian;
pub mod status;
pub mod sweep;
pub mod version;

//! Argument parsing and command implementations behind the `tfim-sweep`
//! binary.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};

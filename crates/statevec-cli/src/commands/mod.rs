//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod qasm;
pub mod run;
pub mod version;

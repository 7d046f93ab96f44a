//! CLI command implementations.

pub mod ores;
pub mod search;
pub mod versions;

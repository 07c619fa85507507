//! Subcommand implementations.

pub mod submit;
pub mod version;

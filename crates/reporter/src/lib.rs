//! BuildPulse test reporter
//!
//! Library half of the `test-reporter` binary: argument parsing, validation,
//! result discovery, tracing setup, and the `submit` and `version` commands.
//!
//! ```text
//! test-reporter submit test/reports --account-id 42 --repository-id 8675309
//! ```

pub mod cli;
pub mod commands;
pub mod discovery;
pub mod tracing;

pub use buildpulse_metadata::Env;

/// Snapshot of the process environment.
///
/// Variables whose name or value is not valid UTF-8 are skipped.
#[must_use]
pub fn process_env() -> Env {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

//! Build metadata for BuildPulse test result submissions.
//!
//! Given the process environment, this crate works out which CI service is
//! running the build, extracts that service's view of the build, enriches
//! it with commit details from git, and renders the result as the
//! `buildpulse.yml` document shipped alongside the test results.
//!
//! - [`provider`] - CI detection and per-provider extraction
//! - [`commit`] - commit lookup from a checkout or a static value
//! - [`metadata`] - the aggregated record and its YAML rendering
//!
//! # Example
//!
//! ```rust,ignore
//! use buildpulse_metadata::{Metadata, RepositoryCommitResolver, Version};
//!
//! let envs = std::env::vars().collect();
//! let resolver = RepositoryCommitResolver::new(".".as_ref())?;
//! let metadata = Metadata::new(&version, &envs, vec![], "", &resolver, chrono::Utc::now)?;
//! std::fs::write("buildpulse.yml", metadata.to_yaml()?)?;
//! ```

pub mod commit;
pub mod env;
pub mod error;
pub mod metadata;
pub mod provider;
pub mod version;

pub use commit::{Commit, CommitResolver, RepositoryCommitResolver, StaticCommitResolver};
pub use env::Env;
pub use error::{Error, Result};
pub use metadata::{CHECK_NAME_VARIABLE, Metadata};
pub use provider::{ProviderKind, ProviderMetadata, name_with_owner_from_git_url};
pub use version::Version;

//! Error types for build metadata resolution.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for metadata operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving build metadata.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// One or more environment variables were missing or malformed.
    ///
    /// Every problem found while binding a provider's variables is collected
    /// so the user can fix them all at once.
    #[error("env: {}", problems.join("; "))]
    #[diagnostic(
        code(buildpulse::metadata::env),
        help("Check the environment variables exported by your CI provider")
    )]
    Env {
        /// Individual problems, in the order the variables were declared
        problems: Vec<String>,
    },

    /// A variable the provider cannot work without was not set.
    #[error("missing required environment variable: {name}")]
    #[diagnostic(code(buildpulse::metadata::missing_variable))]
    MissingVariable {
        /// Name of the missing variable
        name: String,
    },

    /// A repository URL did not contain a recognizable owner/repo pair.
    #[error("unable to extract repository name-with-owner from URL: {url}")]
    #[diagnostic(
        code(buildpulse::metadata::malformed_url),
        help("Expected a URL like https://github.com/OWNER/REPO.git or git@github.com:OWNER/REPO.git")
    )]
    MalformedUrl {
        /// The URL that could not be parsed
        url: String,
    },

    /// No git repository could be discovered at or above a path.
    #[error("no repository found at {}", path.display())]
    #[diagnostic(
        code(buildpulse::metadata::repository_not_found),
        help("Pass --repository-dir pointing at a git checkout, or --tree with the tree SHA")
    )]
    RepositoryNotFound {
        /// The path that was searched
        path: PathBuf,
        /// Reason reported by git
        message: String,
    },

    /// A commit could not be resolved in the repository.
    #[error("unable to find commit with SHA `{sha}`: {message}")]
    #[diagnostic(code(buildpulse::metadata::commit_not_found))]
    CommitNotFound {
        /// The SHA that was requested
        sha: String,
        /// Reason reported by git
        message: String,
    },

    /// Wrapped YAML serialization error.
    #[error("YAML serialization error: {0}")]
    #[diagnostic(code(buildpulse::metadata::serialization))]
    Serialization(#[from] serde_yaml::Error),
}

impl Error {
    /// Create an aggregated environment error.
    #[must_use]
    pub fn env(problems: Vec<String>) -> Self {
        Self::Env { problems }
    }

    /// Create a missing variable error.
    #[must_use]
    pub fn missing_variable(name: impl Into<String>) -> Self {
        Self::MissingVariable { name: name.into() }
    }

    /// Create a malformed URL error.
    #[must_use]
    pub fn malformed_url(url: impl Into<String>) -> Self {
        Self::MalformedUrl { url: url.into() }
    }

    /// Create a repository-not-found error.
    #[must_use]
    pub fn repository_not_found(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::RepositoryNotFound {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a commit-not-found error.
    #[must_use]
    pub fn commit_not_found(sha: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommitNotFound {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

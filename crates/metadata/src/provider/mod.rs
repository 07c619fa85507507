//! CI provider detection and per-provider metadata extraction.
//!
//! Each supported CI service gets one struct describing the variables it
//! exports. [`ProviderKind::detect`] picks the service from the environment
//! in a fixed priority order, and [`ProviderMetadata`] holds the populated
//! struct for whichever service won.

mod azure;
mod bitbucket;
mod buildkite;
mod circleci;
mod codebuild;
mod custom;
mod github;
mod jenkins;
mod semaphore;
mod travis;
mod webappio;

pub use azure::AzurePipelinesMetadata;
pub use bitbucket::BitbucketMetadata;
pub use buildkite::BuildkiteMetadata;
pub use circleci::CircleCiMetadata;
pub use codebuild::AwsCodeBuildMetadata;
pub use custom::CustomMetadata;
pub use github::GithubActionsMetadata;
pub use jenkins::JenkinsMetadata;
pub use semaphore::SemaphoreMetadata;
pub use travis::TravisMetadata;
pub use webappio::WebappIoMetadata;

use crate::env::{self, Env, EnvVar};
use crate::error::{Error, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::info;

/// The CI services the reporter knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Buildkite
    Buildkite,
    /// CircleCI
    CircleCi,
    /// GitHub Actions
    GithubActions,
    /// Jenkins
    Jenkins,
    /// Semaphore
    Semaphore,
    /// Travis CI
    Travis,
    /// webapp.io
    WebappIo,
    /// AWS CodeBuild
    AwsCodeBuild,
    /// Bitbucket Pipelines
    Bitbucket,
    /// Azure Pipelines
    AzurePipelines,
    /// Fallback driven by generic variables when nothing else matches
    Custom,
}

/// How a provider announces itself in the environment.
enum Trigger {
    /// Variable set to exactly `"true"`.
    Flag(&'static str),
    /// Variable set to any non-empty value.
    Present(&'static str),
}

impl ProviderKind {
    /// Providers in the order they are checked. The first match wins.
    pub const DETECTION_ORDER: [Self; 10] = [
        Self::Buildkite,
        Self::CircleCi,
        Self::GithubActions,
        Self::Jenkins,
        Self::Semaphore,
        Self::Travis,
        Self::WebappIo,
        Self::AwsCodeBuild,
        Self::Bitbucket,
        Self::AzurePipelines,
    ];

    /// Tag identifying the provider in submitted metadata.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Buildkite => "buildkite",
            Self::CircleCi => "circleci",
            Self::GithubActions => "github-actions",
            Self::Jenkins => "jenkins",
            Self::Semaphore => "semaphore",
            Self::Travis => "travis-ci",
            Self::WebappIo => "webapp.io",
            Self::AwsCodeBuild => "aws-codebuild",
            Self::Bitbucket => "bitbucket.org",
            Self::AzurePipelines => "azure-pipelines",
            Self::Custom => "custom",
        }
    }

    const fn trigger(self) -> Option<Trigger> {
        match self {
            Self::Buildkite => Some(Trigger::Flag("BUILDKITE")),
            Self::CircleCi => Some(Trigger::Flag("CIRCLECI")),
            Self::GithubActions => Some(Trigger::Flag("GITHUB_ACTIONS")),
            Self::Jenkins => Some(Trigger::Present("JENKINS_HOME")),
            Self::Semaphore => Some(Trigger::Flag("SEMAPHORE")),
            Self::Travis => Some(Trigger::Flag("TRAVIS")),
            Self::WebappIo => Some(Trigger::Flag("WEBAPPIO")),
            Self::AwsCodeBuild => Some(Trigger::Present("CODEBUILD_BUILD_ID")),
            Self::Bitbucket => Some(Trigger::Present("BITBUCKET_BUILD_NUMBER")),
            Self::AzurePipelines => Some(Trigger::Present("BUILD_BUILDID")),
            Self::Custom => None,
        }
    }

    fn matches(self, envs: &Env) -> bool {
        match self.trigger() {
            Some(Trigger::Flag(name)) => env::lookup(envs, name) == "true",
            Some(Trigger::Present(name)) => !env::lookup(envs, name).is_empty(),
            None => false,
        }
    }

    /// Select the provider whose trigger variable is set, falling back to
    /// [`ProviderKind::Custom`].
    #[must_use]
    pub fn detect(envs: &Env) -> Self {
        Self::DETECTION_ORDER
            .into_iter()
            .find(|kind| kind.matches(envs))
            .unwrap_or(Self::Custom)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-provider extraction rules.
///
/// `ENV` is bound first, then `derive` computes anything that needs more
/// than a straight copy of one variable.
pub(crate) trait Extractor: Default + Sized + 'static {
    const KIND: ProviderKind;
    /// Variable holding the commit SHA under test.
    const COMMIT_VARIABLE: &'static str;
    const ENV: &'static [EnvVar<Self>];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        Ok(())
    }

    fn branch(&self) -> &str;
    fn build_url(&self) -> &str;
    fn commit_sha(&self) -> &str;
    fn repo_name_with_owner(&self) -> &str;
}

fn extract<P: Extractor>(envs: &Env) -> Result<P> {
    let mut provider: P = env::bind(envs, P::ENV)?;
    info!(
        provider = P::KIND.name(),
        "Using ${} environment variable as commit SHA: {}",
        P::COMMIT_VARIABLE,
        provider.commit_sha()
    );
    provider.derive(envs)?;
    Ok(provider)
}

/// Metadata for the detected CI provider.
///
/// Serializes to the provider's own fields only; the universal fields live
/// on [`crate::Metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
#[allow(missing_docs)]
pub enum ProviderMetadata {
    Buildkite(BuildkiteMetadata),
    CircleCi(CircleCiMetadata),
    GithubActions(GithubActionsMetadata),
    Jenkins(JenkinsMetadata),
    Semaphore(SemaphoreMetadata),
    Travis(TravisMetadata),
    WebappIo(WebappIoMetadata),
    AwsCodeBuild(AwsCodeBuildMetadata),
    Bitbucket(BitbucketMetadata),
    AzurePipelines(AzurePipelinesMetadata),
    Custom(CustomMetadata),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            ProviderMetadata::Buildkite($inner) => $body,
            ProviderMetadata::CircleCi($inner) => $body,
            ProviderMetadata::GithubActions($inner) => $body,
            ProviderMetadata::Jenkins($inner) => $body,
            ProviderMetadata::Semaphore($inner) => $body,
            ProviderMetadata::Travis($inner) => $body,
            ProviderMetadata::WebappIo($inner) => $body,
            ProviderMetadata::AwsCodeBuild($inner) => $body,
            ProviderMetadata::Bitbucket($inner) => $body,
            ProviderMetadata::AzurePipelines($inner) => $body,
            ProviderMetadata::Custom($inner) => $body,
        }
    };
}

impl ProviderMetadata {
    /// Detect the provider from `envs` and extract its metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if the detected provider's variables are missing or
    /// malformed. With no provider detected this means the custom fallback
    /// variables are incomplete.
    pub fn detect(envs: &Env) -> Result<Self> {
        let kind = ProviderKind::detect(envs);
        info!(provider = kind.name(), "Detected build environment: {}", kind);
        Self::extract(kind, envs)
    }

    /// Extract metadata for a specific provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider's variables are missing or malformed.
    pub fn extract(kind: ProviderKind, envs: &Env) -> Result<Self> {
        Ok(match kind {
            ProviderKind::Buildkite => Self::Buildkite(extract(envs)?),
            ProviderKind::CircleCi => Self::CircleCi(extract(envs)?),
            ProviderKind::GithubActions => Self::GithubActions(extract(envs)?),
            ProviderKind::Jenkins => Self::Jenkins(extract(envs)?),
            ProviderKind::Semaphore => Self::Semaphore(extract(envs)?),
            ProviderKind::Travis => Self::Travis(extract(envs)?),
            ProviderKind::WebappIo => Self::WebappIo(extract(envs)?),
            ProviderKind::AwsCodeBuild => Self::AwsCodeBuild(extract(envs)?),
            ProviderKind::Bitbucket => Self::Bitbucket(extract(envs)?),
            ProviderKind::AzurePipelines => Self::AzurePipelines(extract(envs)?),
            ProviderKind::Custom => Self::Custom(extract(envs)?),
        })
    }

    /// Which provider this metadata describes.
    #[must_use]
    pub fn kind(&self) -> ProviderKind {
        fn kind_of<P: Extractor>(_: &P) -> ProviderKind {
            P::KIND
        }
        dispatch!(self, m => kind_of(m))
    }

    /// Tag identifying the provider, e.g. `github-actions`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Branch under test, or empty when the build is not on a branch.
    #[must_use]
    pub fn branch(&self) -> &str {
        dispatch!(self, m => m.branch())
    }

    /// Link to the build in the provider's UI.
    #[must_use]
    pub fn build_url(&self) -> &str {
        dispatch!(self, m => m.build_url())
    }

    /// Commit SHA under test, as reported by the provider.
    #[must_use]
    pub fn commit_sha(&self) -> &str {
        dispatch!(self, m => m.commit_sha())
    }

    /// Repository identifier in `owner/repo` form.
    #[must_use]
    pub fn repo_name_with_owner(&self) -> &str {
        dispatch!(self, m => m.repo_name_with_owner())
    }
}

static GITHUB_REMOTE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"github.com[:/](.*)").ok());

/// Extract `owner/repo` from a GitHub remote URL.
///
/// Accepts both `https://github.com/OWNER/REPO.git` and
/// `git@github.com:OWNER/REPO.git`, with or without the `.git` suffix.
///
/// # Errors
///
/// Returns [`Error::MalformedUrl`] if the URL does not point at GitHub.
pub fn name_with_owner_from_git_url(url: &str) -> Result<String> {
    let nwo = GITHUB_REMOTE
        .as_ref()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::malformed_url(url))?;
    Ok(nwo.strip_suffix(".git").unwrap_or(nwo).to_string())
}

/// Parse a pull request number, treating anything unparsable as "no PR".
///
/// Providers report `false` or an empty string for non-PR builds.
pub(crate) fn parse_pull_request_number(raw: &str) -> u64 {
    if raw.starts_with('+') {
        return 0;
    }
    raw.parse().unwrap_or(0)
}

pub(crate) fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

use super::{
    Extractor, ProviderKind, is_zero, name_with_owner_from_git_url, parse_pull_request_number,
};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by Buildkite agents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildkiteMetadata {
    #[serde(skip)]
    branch: String,
    #[serde(rename = ":buildkite_build_id")]
    build_id: String,
    #[serde(rename = ":buildkite_build_number")]
    build_number: u64,
    #[serde(skip)]
    build_url: String,
    #[serde(skip)]
    commit: String,
    #[serde(rename = ":buildkite_job_id")]
    job_id: String,
    #[serde(rename = ":buildkite_label")]
    label: String,
    #[serde(rename = ":buildkite_organization_slug")]
    organization_slug: String,
    #[serde(rename = ":buildkite_pipeline_id")]
    pipeline_id: String,
    #[serde(rename = ":buildkite_pipeline_slug")]
    pipeline_slug: String,
    #[serde(rename = ":buildkite_project_slug")]
    project_slug: String,
    #[serde(skip)]
    pull_request: String,
    #[serde(
        rename = ":buildkite_pull_request_base_branch",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_base_branch: String,
    #[serde(
        rename = ":buildkite_pull_request_number",
        skip_serializing_if = "is_zero"
    )]
    pull_request_number: u64,
    #[serde(
        rename = ":buildkite_pull_request_repo",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_repo: String,
    #[serde(
        rename = ":buildkite_rebuilt_from_build_id",
        skip_serializing_if = "String::is_empty"
    )]
    rebuilt_from_build_id: String,
    #[serde(
        rename = ":buildkite_rebuilt_from_build_number",
        skip_serializing_if = "is_zero"
    )]
    rebuilt_from_build_number: u64,
    #[serde(skip)]
    repo_url: String,
    #[serde(rename = ":buildkite_retry_count")]
    retry_count: u32,
    #[serde(rename = ":buildkite_tag", skip_serializing_if = "String::is_empty")]
    tag: String,

    #[serde(skip)]
    nwo: String,
}

impl Extractor for BuildkiteMetadata {
    const KIND: ProviderKind = ProviderKind::Buildkite;
    const COMMIT_VARIABLE: &'static str = "BUILDKITE_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("BUILDKITE_BRANCH", |m: &mut Self| &mut m.branch),
        EnvVar::text("BUILDKITE_BUILD_ID", |m: &mut Self| &mut m.build_id),
        EnvVar::uint64("BUILDKITE_BUILD_NUMBER", |m: &mut Self| &mut m.build_number),
        EnvVar::text("BUILDKITE_BUILD_URL", |m: &mut Self| &mut m.build_url),
        EnvVar::text("BUILDKITE_COMMIT", |m: &mut Self| &mut m.commit),
        EnvVar::text("BUILDKITE_JOB_ID", |m: &mut Self| &mut m.job_id),
        EnvVar::text("BUILDKITE_LABEL", |m: &mut Self| &mut m.label),
        EnvVar::text("BUILDKITE_ORGANIZATION_SLUG", |m: &mut Self| {
            &mut m.organization_slug
        }),
        EnvVar::text("BUILDKITE_PIPELINE_ID", |m: &mut Self| &mut m.pipeline_id),
        EnvVar::text("BUILDKITE_PIPELINE_SLUG", |m: &mut Self| &mut m.pipeline_slug),
        EnvVar::text("BUILDKITE_PROJECT_SLUG", |m: &mut Self| &mut m.project_slug),
        EnvVar::text("BUILDKITE_PULL_REQUEST", |m: &mut Self| &mut m.pull_request),
        EnvVar::text("BUILDKITE_PULL_REQUEST_BASE_BRANCH", |m: &mut Self| {
            &mut m.pull_request_base_branch
        }),
        EnvVar::text("BUILDKITE_PULL_REQUEST_REPO", |m: &mut Self| {
            &mut m.pull_request_repo
        }),
        EnvVar::text("BUILDKITE_REBUILT_FROM_BUILD_ID", |m: &mut Self| {
            &mut m.rebuilt_from_build_id
        }),
        EnvVar::uint64("BUILDKITE_REBUILT_FROM_BUILD_NUMBER", |m: &mut Self| {
            &mut m.rebuilt_from_build_number
        }),
        EnvVar::text("BUILDKITE_REPO", |m: &mut Self| &mut m.repo_url),
        EnvVar::uint32("BUILDKITE_RETRY_COUNT", |m: &mut Self| &mut m.retry_count),
        EnvVar::text("BUILDKITE_TAG", |m: &mut Self| &mut m.tag),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.nwo = name_with_owner_from_git_url(&self.repo_url)?;
        self.pull_request_number = parse_pull_request_number(&self.pull_request);
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn build_url(&self) -> &str {
        &self.build_url
    }

    fn commit_sha(&self) -> &str {
        &self.commit
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.nwo
    }
}

use super::{Extractor, ProviderKind, is_zero};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by CircleCI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CircleCiMetadata {
    #[serde(skip)]
    branch: String,
    #[serde(rename = ":circle_build_num")]
    build_number: u64,
    #[serde(skip)]
    build_url: String,
    #[serde(rename = ":circle_job")]
    job: String,
    #[serde(skip)]
    project_reponame: String,
    #[serde(skip)]
    project_username: String,
    #[serde(rename = ":circle_pr_number", skip_serializing_if = "is_zero")]
    pull_request_number: u32,
    #[serde(rename = ":circle_pr_reponame", skip_serializing_if = "String::is_empty")]
    pull_request_reponame: String,
    #[serde(
        rename = ":circle_pull_request",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_url: String,
    #[serde(rename = ":circle_pr_username", skip_serializing_if = "String::is_empty")]
    pull_request_username: String,
    #[serde(rename = ":circle_repository_url")]
    repo_url: String,
    #[serde(skip)]
    sha1: String,
    #[serde(rename = ":circle_tag", skip_serializing_if = "String::is_empty")]
    tag: String,
    #[serde(rename = ":circle_username")]
    username: String,
    #[serde(rename = ":circle_workflow_id")]
    workflow_id: String,

    #[serde(skip)]
    nwo: String,
}

impl Extractor for CircleCiMetadata {
    const KIND: ProviderKind = ProviderKind::CircleCi;
    const COMMIT_VARIABLE: &'static str = "CIRCLE_SHA1";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("CIRCLE_BRANCH", |m: &mut Self| &mut m.branch),
        EnvVar::uint64("CIRCLE_BUILD_NUM", |m: &mut Self| &mut m.build_number),
        EnvVar::text("CIRCLE_BUILD_URL", |m: &mut Self| &mut m.build_url),
        EnvVar::text("CIRCLE_JOB", |m: &mut Self| &mut m.job),
        EnvVar::text("CIRCLE_PROJECT_REPONAME", |m: &mut Self| {
            &mut m.project_reponame
        }),
        EnvVar::text("CIRCLE_PROJECT_USERNAME", |m: &mut Self| {
            &mut m.project_username
        }),
        EnvVar::uint32("CIRCLE_PR_NUMBER", |m: &mut Self| &mut m.pull_request_number),
        EnvVar::text("CIRCLE_PR_REPONAME", |m: &mut Self| {
            &mut m.pull_request_reponame
        }),
        EnvVar::text("CIRCLE_PULL_REQUEST", |m: &mut Self| &mut m.pull_request_url),
        EnvVar::text("CIRCLE_PR_USERNAME", |m: &mut Self| {
            &mut m.pull_request_username
        }),
        EnvVar::text("CIRCLE_REPOSITORY_URL", |m: &mut Self| &mut m.repo_url),
        EnvVar::text("CIRCLE_SHA1", |m: &mut Self| &mut m.sha1),
        EnvVar::text("CIRCLE_TAG", |m: &mut Self| &mut m.tag),
        EnvVar::text("CIRCLE_USERNAME", |m: &mut Self| &mut m.username),
        EnvVar::text("CIRCLE_WORKFLOW_ID", |m: &mut Self| &mut m.workflow_id),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.nwo = format!("{}/{}", self.project_username, self.project_reponame);
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn build_url(&self) -> &str {
        &self.build_url
    }

    fn commit_sha(&self) -> &str {
        &self.sha1
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.nwo
    }
}

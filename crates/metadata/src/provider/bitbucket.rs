use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by Bitbucket Pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BitbucketMetadata {
    #[serde(rename = ":bitbucket_build_number")]
    build_number: u64,
    #[serde(rename = ":bitbucket_clone_dir", skip_serializing_if = "String::is_empty")]
    clone_dir: String,
    #[serde(rename = ":bitbucket_commit")]
    commit: String,
    #[serde(rename = ":bitbucket_workspace")]
    workspace: String,
    #[serde(rename = ":bitbucket_repo_slug")]
    repo_slug: String,
    #[serde(rename = ":bitbucket_repo_uuid", skip_serializing_if = "String::is_empty")]
    repo_uuid: String,
    #[serde(
        rename = ":bitbucket_repo_full_name",
        skip_serializing_if = "String::is_empty"
    )]
    repo_full_name: String,
    #[serde(rename = ":bitbucket_branch")]
    branch: String,
    #[serde(rename = ":bitbucket_tag", skip_serializing_if = "String::is_empty")]
    tag: String,
    #[serde(rename = ":bitbucket_bookmark", skip_serializing_if = "String::is_empty")]
    bookmark: String,
    #[serde(
        rename = ":bitbucket_parallel_step",
        skip_serializing_if = "String::is_empty"
    )]
    parallel_step: String,
    #[serde(
        rename = ":bitbucket_parallel_step_count",
        skip_serializing_if = "String::is_empty"
    )]
    parallel_step_count: String,
    #[serde(rename = ":bitbucket_pr_id", skip_serializing_if = "String::is_empty")]
    pr_id: String,
    #[serde(
        rename = ":bitbucket_pr_destination_branch",
        skip_serializing_if = "String::is_empty"
    )]
    pr_destination_branch: String,
    #[serde(rename = ":bitbucket_git_http_origin")]
    git_http_origin: String,
    #[serde(
        rename = ":bitbucket_git_ssh_origin",
        skip_serializing_if = "String::is_empty"
    )]
    git_ssh_origin: String,
    #[serde(rename = ":bitbucket_exit_code", skip_serializing_if = "String::is_empty")]
    exit_code: String,
    #[serde(rename = ":bitbucket_step_uuid", skip_serializing_if = "String::is_empty")]
    step_uuid: String,
    #[serde(
        rename = ":bitbucket_pipeline_uuid",
        skip_serializing_if = "String::is_empty"
    )]
    pipeline_uuid: String,
    #[serde(
        rename = ":bitbucket_deployment_environment",
        skip_serializing_if = "String::is_empty"
    )]
    deployment_environment: String,
    #[serde(
        rename = ":bitbucket_deployment_environment_uuid",
        skip_serializing_if = "String::is_empty"
    )]
    deployment_environment_uuid: String,
    #[serde(
        rename = ":bitbucket_project_key",
        skip_serializing_if = "String::is_empty"
    )]
    project_key: String,
    #[serde(
        rename = ":bitbucket_project_uuid",
        skip_serializing_if = "String::is_empty"
    )]
    project_uuid: String,
    #[serde(
        rename = ":bitbucket_step_triggerer_uuid",
        skip_serializing_if = "String::is_empty"
    )]
    step_triggerer_uuid: String,
    #[serde(
        rename = ":bitbucket_step_oidc_token",
        skip_serializing_if = "String::is_empty"
    )]
    step_oidc_token: String,
    #[serde(
        rename = ":bitbucket_ssh_key_file",
        skip_serializing_if = "String::is_empty"
    )]
    ssh_key_file: String,

    #[serde(skip)]
    build_url: String,
    #[serde(skip)]
    nwo: String,
}

impl Extractor for BitbucketMetadata {
    const KIND: ProviderKind = ProviderKind::Bitbucket;
    const COMMIT_VARIABLE: &'static str = "BITBUCKET_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::uint64("BITBUCKET_BUILD_NUMBER", |m: &mut Self| &mut m.build_number),
        EnvVar::text("BITBUCKET_CLONE_DIR", |m: &mut Self| &mut m.clone_dir),
        EnvVar::text("BITBUCKET_COMMIT", |m: &mut Self| &mut m.commit),
        EnvVar::text("BITBUCKET_WORKSPACE", |m: &mut Self| &mut m.workspace),
        EnvVar::text("BITBUCKET_REPO_SLUG", |m: &mut Self| &mut m.repo_slug),
        EnvVar::text("BITBUCKET_REPO_UUID", |m: &mut Self| &mut m.repo_uuid),
        EnvVar::text("BITBUCKET_REPO_FULL_NAME", |m: &mut Self| &mut m.repo_full_name),
        EnvVar::text("BITBUCKET_BRANCH", |m: &mut Self| &mut m.branch),
        EnvVar::text("BITBUCKET_TAG", |m: &mut Self| &mut m.tag),
        EnvVar::text("BITBUCKET_BOOKMARK", |m: &mut Self| &mut m.bookmark),
        EnvVar::text("BITBUCKET_PARALLEL_STEP", |m: &mut Self| &mut m.parallel_step),
        EnvVar::text("BITBUCKET_PARALLEL_STEP_COUNT", |m: &mut Self| {
            &mut m.parallel_step_count
        }),
        EnvVar::text("BITBUCKET_PR_ID", |m: &mut Self| &mut m.pr_id),
        EnvVar::text("BITBUCKET_PR_DESTINATION_BRANCH", |m: &mut Self| {
            &mut m.pr_destination_branch
        }),
        EnvVar::text("BITBUCKET_GIT_HTTP_ORIGIN", |m: &mut Self| {
            &mut m.git_http_origin
        }),
        EnvVar::text("BITBUCKET_GIT_SSH_ORIGIN", |m: &mut Self| &mut m.git_ssh_origin),
        EnvVar::text("BITBUCKET_EXIT_CODE", |m: &mut Self| &mut m.exit_code),
        EnvVar::text("BITBUCKET_STEP_UUID", |m: &mut Self| &mut m.step_uuid),
        EnvVar::text("BITBUCKET_PIPELINE_UUID", |m: &mut Self| &mut m.pipeline_uuid),
        EnvVar::text("BITBUCKET_DEPLOYMENT_ENVIRONMENT", |m: &mut Self| {
            &mut m.deployment_environment
        }),
        EnvVar::text("BITBUCKET_DEPLOYMENT_ENVIRONMENT_UUID", |m: &mut Self| {
            &mut m.deployment_environment_uuid
        }),
        EnvVar::text("BITBUCKET_PROJECT_KEY", |m: &mut Self| &mut m.project_key),
        EnvVar::text("BITBUCKET_PROJECT_UUID", |m: &mut Self| &mut m.project_uuid),
        EnvVar::text("BITBUCKET_STEP_TRIGGERER_UUID", |m: &mut Self| {
            &mut m.step_triggerer_uuid
        }),
        EnvVar::text("BITBUCKET_STEP_OIDC_TOKEN", |m: &mut Self| {
            &mut m.step_oidc_token
        }),
        EnvVar::text("BITBUCKET_SSH_KEY_FILE", |m: &mut Self| &mut m.ssh_key_file),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.build_url = format!(
            "{}/addon/pipelines/home#!/results/{}",
            self.git_http_origin, self.build_number
        );
        self.nwo = format!("{}/{}", self.workspace, self.repo_slug);
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

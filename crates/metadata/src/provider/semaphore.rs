use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by Semaphore 2.0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemaphoreMetadata {
    #[serde(rename = ":semaphore_agent_machine_environment_type")]
    agent_machine_environment_type: String,
    #[serde(rename = ":semaphore_agent_machine_os_image")]
    agent_machine_os_image: String,
    #[serde(rename = ":semaphore_agent_machine_type")]
    agent_machine_type: String,
    #[serde(skip)]
    git_branch: String,
    #[serde(rename = ":semaphore_git_commit_range")]
    git_commit_range: String,
    #[serde(rename = ":semaphore_git_dir")]
    git_dir: String,
    #[serde(rename = ":semaphore_git_ref")]
    git_ref: String,
    #[serde(rename = ":semaphore_git_ref_type")]
    git_ref_type: String,
    #[serde(skip)]
    git_repo_slug: String,
    #[serde(skip)]
    git_sha: String,
    #[serde(rename = ":semaphore_git_url")]
    git_url: String,
    #[serde(rename = ":semaphore_job_id")]
    job_id: String,
    #[serde(rename = ":semaphore_job_name")]
    job_name: String,
    #[serde(rename = ":semaphore_job_result")]
    job_result: String,
    #[serde(rename = ":semaphore_organization_url")]
    organization_url: String,
    #[serde(rename = ":semaphore_project_id")]
    project_id: String,
    #[serde(rename = ":semaphore_project_name")]
    project_name: String,
    #[serde(rename = ":semaphore_workflow_id")]
    workflow_id: String,
    #[serde(rename = ":semaphore_workflow_number")]
    workflow_number: u64,

    #[serde(skip)]
    build_url: String,
}

impl Extractor for SemaphoreMetadata {
    const KIND: ProviderKind = ProviderKind::Semaphore;
    const COMMIT_VARIABLE: &'static str = "SEMAPHORE_GIT_SHA";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("SEMAPHORE_AGENT_MACHINE_ENVIRONMENT_TYPE", |m: &mut Self| {
            &mut m.agent_machine_environment_type
        }),
        EnvVar::text("SEMAPHORE_AGENT_MACHINE_OS_IMAGE", |m: &mut Self| {
            &mut m.agent_machine_os_image
        }),
        EnvVar::text("SEMAPHORE_AGENT_MACHINE_TYPE", |m: &mut Self| {
            &mut m.agent_machine_type
        }),
        EnvVar::text("SEMAPHORE_GIT_BRANCH", |m: &mut Self| &mut m.git_branch),
        EnvVar::text("SEMAPHORE_GIT_COMMIT_RANGE", |m: &mut Self| {
            &mut m.git_commit_range
        }),
        EnvVar::text("SEMAPHORE_GIT_DIR", |m: &mut Self| &mut m.git_dir),
        EnvVar::text("SEMAPHORE_GIT_REF", |m: &mut Self| &mut m.git_ref),
        EnvVar::text("SEMAPHORE_GIT_REF_TYPE", |m: &mut Self| &mut m.git_ref_type),
        EnvVar::text("SEMAPHORE_GIT_REPO_SLUG", |m: &mut Self| &mut m.git_repo_slug),
        EnvVar::text("SEMAPHORE_GIT_SHA", |m: &mut Self| &mut m.git_sha),
        EnvVar::text("SEMAPHORE_GIT_URL", |m: &mut Self| &mut m.git_url),
        EnvVar::text("SEMAPHORE_JOB_ID", |m: &mut Self| &mut m.job_id),
        EnvVar::text("SEMAPHORE_JOB_NAME", |m: &mut Self| &mut m.job_name),
        EnvVar::text("SEMAPHORE_JOB_RESULT", |m: &mut Self| &mut m.job_result),
        EnvVar::text("SEMAPHORE_ORGANIZATION_URL", |m: &mut Self| {
            &mut m.organization_url
        }),
        EnvVar::text("SEMAPHORE_PROJECT_ID", |m: &mut Self| &mut m.project_id),
        EnvVar::text("SEMAPHORE_PROJECT_NAME", |m: &mut Self| &mut m.project_name),
        EnvVar::text("SEMAPHORE_WORKFLOW_ID", |m: &mut Self| &mut m.workflow_id),
        EnvVar::uint64("SEMAPHORE_WORKFLOW_NUMBER", |m: &mut Self| {
            &mut m.workflow_number
        }),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.build_url = format!("{}/workflows/{}", self.organization_url, self.workflow_id);
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.git_branch
    }

    fn build_url(&self) -> &str {
        &self.build_url
    }

    fn commit_sha(&self) -> &str {
        &self.git_sha
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.git_repo_slug
    }
}

use super::{Extractor, ProviderKind, name_with_owner_from_git_url};
use crate::env::{self, Env, EnvVar};
use crate::error::{Error, Result};
use serde::Serialize;

/// Build metadata exported by Jenkins with the git plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JenkinsMetadata {
    #[serde(skip)]
    git_branch: String,
    #[serde(skip)]
    git_commit: String,
    #[serde(skip)]
    git_url: String,
    #[serde(rename = ":jenkins_executor_number")]
    executor_number: u64,
    #[serde(rename = ":jenkins_job_name")]
    job_name: String,
    #[serde(rename = ":jenkins_job_url")]
    job_url: String,
    #[serde(rename = ":jenkins_node_name")]
    node_name: String,
    #[serde(rename = ":jenkins_workspace")]
    workspace: String,

    #[serde(skip)]
    build_url: String,
    #[serde(skip)]
    nwo: String,
}

impl Extractor for JenkinsMetadata {
    const KIND: ProviderKind = ProviderKind::Jenkins;
    const COMMIT_VARIABLE: &'static str = "GIT_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("GIT_BRANCH", |m: &mut Self| &mut m.git_branch),
        EnvVar::text("GIT_COMMIT", |m: &mut Self| &mut m.git_commit),
        EnvVar::text("GIT_URL", |m: &mut Self| &mut m.git_url),
        EnvVar::uint64("EXECUTOR_NUMBER", |m: &mut Self| &mut m.executor_number),
        EnvVar::text("JOB_NAME", |m: &mut Self| &mut m.job_name),
        EnvVar::text("JOB_URL", |m: &mut Self| &mut m.job_url),
        EnvVar::text("NODE_NAME", |m: &mut Self| &mut m.node_name),
        EnvVar::text("WORKSPACE", |m: &mut Self| &mut m.workspace),
    ];

    fn derive(&mut self, envs: &Env) -> Result<()> {
        let build_url = env::lookup(envs, "BUILD_URL");
        if build_url.is_empty() {
            return Err(Error::missing_variable("BUILD_URL"));
        }
        self.build_url = build_url.to_string();
        self.nwo = name_with_owner_from_git_url(&self.git_url)?;
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.git_branch
    }

    fn build_url(&self) -> &str {
        &self.build_url
    }

    fn commit_sha(&self) -> &str {
        &self.git_commit
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.nwo
    }
}

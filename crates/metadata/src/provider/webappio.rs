use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by webapp.io runners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebappIoMetadata {
    #[serde(skip)]
    git_branch: String,
    #[serde(skip)]
    git_commit: String,
    #[serde(skip)]
    job_id: u64,
    #[serde(rename = ":pull_request_url", skip_serializing_if = "String::is_empty")]
    pull_request_url: String,
    #[serde(skip)]
    organization_name: String,
    #[serde(skip)]
    repository_name: String,
    #[serde(skip)]
    repository_owner: String,
    #[serde(rename = ":retry_index")]
    retry_index: u32,
    #[serde(skip)]
    runner_id: String,

    #[serde(skip)]
    build_url: String,
    #[serde(skip)]
    nwo: String,
}

impl Extractor for WebappIoMetadata {
    const KIND: ProviderKind = ProviderKind::WebappIo;
    const COMMIT_VARIABLE: &'static str = "GIT_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("GIT_BRANCH", |m: &mut Self| &mut m.git_branch),
        EnvVar::text("GIT_COMMIT", |m: &mut Self| &mut m.git_commit),
        EnvVar::uint64("JOB_ID", |m: &mut Self| &mut m.job_id),
        EnvVar::text("PULL_REQUEST_URL", |m: &mut Self| &mut m.pull_request_url),
        EnvVar::text("ORGANIZATION_NAME", |m: &mut Self| &mut m.organization_name),
        EnvVar::text("REPOSITORY_NAME", |m: &mut Self| &mut m.repository_name),
        EnvVar::text("REPOSITORY_OWNER", |m: &mut Self| &mut m.repository_owner),
        EnvVar::uint32("RETRY_INDEX", |m: &mut Self| &mut m.retry_index),
        EnvVar::text("RUNNER_ID", |m: &mut Self| &mut m.runner_id),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.build_url = format!(
            "https://webapp.io/{}/{}/{}/{}-{}",
            self.organization_name,
            self.repository_name,
            self.job_id,
            self.runner_id,
            self.retry_index
        );
        self.nwo = format!("{}/{}", self.repository_owner, self.repository_name);
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

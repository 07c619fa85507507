use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Metadata for CI services without built-in support.
///
/// Every field must be exported explicitly by the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomMetadata {
    #[serde(rename = ":git_branch")]
    git_branch: String,
    #[serde(rename = ":git_commit")]
    git_commit: String,
    #[serde(rename = ":build_url")]
    build_url: String,
    #[serde(rename = ":organization_name")]
    organization_name: String,
    #[serde(rename = ":repository_name")]
    repository_name: String,

    #[serde(skip)]
    nwo: String,
}

impl Extractor for CustomMetadata {
    const KIND: ProviderKind = ProviderKind::Custom;
    const COMMIT_VARIABLE: &'static str = "GIT_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::required("GIT_BRANCH", |m: &mut Self| &mut m.git_branch),
        EnvVar::required("GIT_COMMIT", |m: &mut Self| &mut m.git_commit),
        EnvVar::required("BUILD_URL", |m: &mut Self| &mut m.build_url),
        EnvVar::required("ORGANIZATION_NAME", |m: &mut Self| {
            &mut m.organization_name
        }),
        EnvVar::required("REPOSITORY_NAME", |m: &mut Self| &mut m.repository_name),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.nwo = format!("{}/{}", self.organization_name, self.repository_name);
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

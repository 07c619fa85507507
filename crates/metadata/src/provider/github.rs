use super::{Extractor, ProviderKind};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Build metadata exported by GitHub Actions runners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GithubActionsMetadata {
    #[serde(rename = ":github_actor")]
    actor: String,
    #[serde(rename = ":github_base_ref")]
    base_ref: String,
    #[serde(rename = ":github_event_name")]
    event_name: String,
    #[serde(rename = ":github_head_ref")]
    head_ref: String,
    #[serde(rename = ":github_ref")]
    git_ref: String,
    #[serde(skip)]
    repository: String,
    #[serde(rename = ":github_repo_url")]
    repo_url: String,
    #[serde(rename = ":github_run_attempt")]
    run_attempt: u32,
    #[serde(rename = ":github_run_id")]
    run_id: u64,
    #[serde(rename = ":github_run_number")]
    run_number: u32,
    #[serde(skip)]
    server_url: String,
    #[serde(skip)]
    sha: String,
    #[serde(rename = ":github_workflow")]
    workflow: String,

    #[serde(skip)]
    branch: String,
    #[serde(skip)]
    build_url: String,
}

impl Extractor for GithubActionsMetadata {
    const KIND: ProviderKind = ProviderKind::GithubActions;
    const COMMIT_VARIABLE: &'static str = "GITHUB_SHA";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("GITHUB_ACTOR", |m: &mut Self| &mut m.actor),
        EnvVar::text("GITHUB_BASE_REF", |m: &mut Self| &mut m.base_ref),
        EnvVar::text("GITHUB_EVENT_NAME", |m: &mut Self| &mut m.event_name),
        EnvVar::text("GITHUB_HEAD_REF", |m: &mut Self| &mut m.head_ref),
        EnvVar::text("GITHUB_REF", |m: &mut Self| &mut m.git_ref),
        EnvVar::text("GITHUB_REPOSITORY", |m: &mut Self| &mut m.repository),
        EnvVar::uint32("GITHUB_RUN_ATTEMPT", |m: &mut Self| &mut m.run_attempt),
        EnvVar::uint64("GITHUB_RUN_ID", |m: &mut Self| &mut m.run_id),
        EnvVar::uint32("GITHUB_RUN_NUMBER", |m: &mut Self| &mut m.run_number),
        EnvVar::text("GITHUB_SERVER_URL", |m: &mut Self| &mut m.server_url),
        EnvVar::text("GITHUB_SHA", |m: &mut Self| &mut m.sha),
        EnvVar::text("GITHUB_WORKFLOW", |m: &mut Self| &mut m.workflow),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        if self.server_url.is_empty() {
            self.server_url = DEFAULT_SERVER_URL.to_string();
        }
        self.repo_url = format!("{}/{}", self.server_url, self.repository);
        self.build_url = format!(
            "{}/actions/runs/{}/attempts/{}",
            self.repo_url, self.run_id, self.run_attempt
        );

        // Pull request builds report the topic branch, even from forks.
        self.branch = if self.event_name == "pull_request" {
            self.head_ref.clone()
        } else {
            self.git_ref
                .strip_prefix("refs/heads/")
                .unwrap_or_default()
                .to_string()
        };
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn build_url(&self) -> &str {
        &self.build_url
    }

    fn commit_sha(&self) -> &str {
        &self.sha
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.repository
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::env::Env;
    use crate::provider::ProviderMetadata;

    fn detect(pairs: &[(&str, &str)]) -> ProviderMetadata {
        let mut envs: Env = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        envs.insert("GITHUB_ACTIONS".into(), "true".into());
        ProviderMetadata::detect(&envs).unwrap()
    }

    #[test]
    fn test_branch_from_push_to_branch() {
        let meta = detect(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/heads/some-feature"),
        ]);
        assert_eq!(meta.branch(), "some-feature");
    }

    #[test]
    fn test_branch_keeps_slashes_in_branch_name() {
        let meta = detect(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/heads/feature/nested/name"),
        ]);
        assert_eq!(meta.branch(), "feature/nested/name");
    }

    #[test]
    fn test_branch_from_pull_request_uses_head_ref() {
        let meta = detect(&[
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_HEAD_REF", "feature-x"),
            ("GITHUB_REF", "refs/pull/3/merge"),
        ]);
        assert_eq!(meta.branch(), "feature-x");
    }

    #[test]
    fn test_branch_from_tag_is_empty() {
        let meta = detect(&[
            ("GITHUB_EVENT_NAME", "push"),
            ("GITHUB_REF", "refs/tags/v1.0.0"),
        ]);
        assert_eq!(meta.branch(), "");
    }

    #[test]
    fn test_branch_without_ref_is_empty() {
        let meta = detect(&[]);
        assert_eq!(meta.branch(), "");
    }

    #[test]
    fn test_repo_url_defaults_server() {
        let meta = detect(&[
            ("GITHUB_REPOSITORY", "some-owner/some-repo"),
            ("GITHUB_RUN_ID", "8675309"),
            ("GITHUB_RUN_ATTEMPT", "2"),
        ]);
        assert_eq!(
            meta.build_url(),
            "https://github.com/some-owner/some-repo/actions/runs/8675309/attempts/2"
        );
        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert!(yaml.contains(":github_repo_url: https://github.com/some-owner/some-repo\n"));
    }

    #[test]
    fn test_repo_url_with_enterprise_server() {
        let meta = detect(&[
            ("GITHUB_REPOSITORY", "some-owner/some-repo"),
            ("GITHUB_SERVER_URL", "https://github.example.com"),
            ("GITHUB_RUN_ID", "1"),
            ("GITHUB_RUN_ATTEMPT", "1"),
        ]);
        assert_eq!(
            meta.build_url(),
            "https://github.example.com/some-owner/some-repo/actions/runs/1/attempts/1"
        );
        assert_eq!(meta.repo_name_with_owner(), "some-owner/some-repo");
    }
}

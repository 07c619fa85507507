use super::{Extractor, ProviderKind, is_zero, parse_pull_request_number};
use crate::env::{Env, EnvVar};
use crate::error::Result;
use serde::Serialize;

/// Build metadata exported by Travis CI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TravisMetadata {
    #[serde(skip)]
    branch: String,
    #[serde(rename = ":travis_build_dir")]
    build_dir: String,
    #[serde(rename = ":travis_build_id")]
    build_id: u64,
    #[serde(rename = ":travis_build_number")]
    build_number: u64,
    #[serde(rename = ":travis_build_web_url")]
    build_web_url: String,
    #[serde(skip)]
    commit: String,
    #[serde(rename = ":travis_commit_range")]
    commit_range: String,
    #[serde(rename = ":travis_cpu_arch")]
    cpu_arch: String,
    #[serde(rename = ":travis_dist")]
    dist: String,
    #[serde(rename = ":travis_event_type")]
    event_type: String,
    #[serde(rename = ":travis_job_id")]
    job_id: u64,
    #[serde(rename = ":travis_job_name")]
    job_name: String,
    // Dotted build.job form, e.g. "42.1".
    #[serde(rename = ":travis_job_number")]
    job_number: String,
    #[serde(skip)]
    job_web_url: String,
    #[serde(rename = ":travis_os_name")]
    os_name: String,
    #[serde(skip)]
    pull_request: String,
    #[serde(
        rename = ":travis_pull_request_branch",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_branch: String,
    #[serde(rename = ":travis_pull_request_number", skip_serializing_if = "is_zero")]
    pull_request_number: u64,
    #[serde(
        rename = ":travis_pull_request_sha",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_sha: String,
    #[serde(
        rename = ":travis_pull_request_slug",
        skip_serializing_if = "String::is_empty"
    )]
    pull_request_slug: String,
    #[serde(skip)]
    repo_slug: String,
    #[serde(rename = ":travis_sudo")]
    sudo: bool,
    #[serde(rename = ":travis_tag")]
    tag: String,
    #[serde(rename = ":travis_test_result")]
    test_result: u32,
}

impl Extractor for TravisMetadata {
    const KIND: ProviderKind = ProviderKind::Travis;
    const COMMIT_VARIABLE: &'static str = "TRAVIS_COMMIT";
    const ENV: &'static [EnvVar<Self>] = &[
        EnvVar::text("TRAVIS_BRANCH", |m: &mut Self| &mut m.branch),
        EnvVar::text("TRAVIS_BUILD_DIR", |m: &mut Self| &mut m.build_dir),
        EnvVar::uint64("TRAVIS_BUILD_ID", |m: &mut Self| &mut m.build_id),
        EnvVar::uint64("TRAVIS_BUILD_NUMBER", |m: &mut Self| &mut m.build_number),
        EnvVar::text("TRAVIS_BUILD_WEB_URL", |m: &mut Self| &mut m.build_web_url),
        EnvVar::text("TRAVIS_COMMIT", |m: &mut Self| &mut m.commit),
        EnvVar::text("TRAVIS_COMMIT_RANGE", |m: &mut Self| &mut m.commit_range),
        EnvVar::text("TRAVIS_CPU_ARCH", |m: &mut Self| &mut m.cpu_arch),
        EnvVar::text("TRAVIS_DIST", |m: &mut Self| &mut m.dist),
        EnvVar::text("TRAVIS_EVENT_TYPE", |m: &mut Self| &mut m.event_type),
        EnvVar::uint64("TRAVIS_JOB_ID", |m: &mut Self| &mut m.job_id),
        EnvVar::text("TRAVIS_JOB_NAME", |m: &mut Self| &mut m.job_name),
        EnvVar::text("TRAVIS_JOB_NUMBER", |m: &mut Self| &mut m.job_number),
        EnvVar::text("TRAVIS_JOB_WEB_URL", |m: &mut Self| &mut m.job_web_url),
        EnvVar::text("TRAVIS_OS_NAME", |m: &mut Self| &mut m.os_name),
        EnvVar::text("TRAVIS_PULL_REQUEST", |m: &mut Self| &mut m.pull_request),
        EnvVar::text("TRAVIS_PULL_REQUEST_BRANCH", |m: &mut Self| {
            &mut m.pull_request_branch
        }),
        EnvVar::text("TRAVIS_PULL_REQUEST_SHA", |m: &mut Self| {
            &mut m.pull_request_sha
        }),
        EnvVar::text("TRAVIS_PULL_REQUEST_SLUG", |m: &mut Self| {
            &mut m.pull_request_slug
        }),
        EnvVar::text("TRAVIS_REPO_SLUG", |m: &mut Self| &mut m.repo_slug),
        EnvVar::flag("TRAVIS_SUDO", |m: &mut Self| &mut m.sudo),
        EnvVar::text("TRAVIS_TAG", |m: &mut Self| &mut m.tag),
        EnvVar::uint32("TRAVIS_TEST_RESULT", |m: &mut Self| &mut m.test_result),
    ];

    fn derive(&mut self, _envs: &Env) -> Result<()> {
        self.pull_request_number = parse_pull_request_number(&self.pull_request);
        Ok(())
    }

    fn branch(&self) -> &str {
        &self.branch
    }

    fn build_url(&self) -> &str {
        &self.job_web_url
    }

    fn commit_sha(&self) -> &str {
        &self.commit
    }

    fn repo_name_with_owner(&self) -> &str {
        &self.repo_slug
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
        envs.insert("TRAVIS".into(), "true".into());
        ProviderMetadata::detect(&envs).unwrap()
    }

    #[test]
    fn test_pull_request_fields() {
        let meta = detect(&[
            ("TRAVIS_PULL_REQUEST", "12"),
            ("TRAVIS_PULL_REQUEST_BRANCH", "some-feature"),
            ("TRAVIS_PULL_REQUEST_SHA", "d1f1d2e1b5c6a7f8e9d0c1b2a3f4e5d6c7b8a9f0"),
            ("TRAVIS_PULL_REQUEST_SLUG", "some-fork/some-repo"),
        ]);
        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert!(yaml.contains(":travis_pull_request_branch: some-feature\n"));
        assert!(yaml.contains(":travis_pull_request_number: 12\n"));
        assert!(yaml.contains(":travis_pull_request_slug: some-fork/some-repo\n"));
    }

    #[test]
    fn test_tag_is_always_emitted() {
        let meta = detect(&[]);
        let yaml = serde_yaml::to_string(&meta).unwrap();
        assert!(yaml.contains(":travis_tag: ''\n"));
        assert!(!yaml.contains(":travis_pull_request_number"));
    }

    #[test]
    fn test_build_url_is_job_url() {
        let meta = detect(&[(
            "TRAVIS_JOB_WEB_URL",
            "https://travis-ci.org/some-owner/some-repo/jobs/8675309",
        )]);
        assert_eq!(
            meta.build_url(),
            "https://travis-ci.org/some-owner/some-repo/jobs/8675309"
        );
    }
}

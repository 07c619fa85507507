//! The unified metadata record attached to every submission.

use crate::commit::CommitResolver;
use crate::env::{self, Env};
use crate::error::Result;
use crate::provider::ProviderMetadata;
use crate::version::Version;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use tracing::warn;

/// Overrides the check name reported for the build.
pub const CHECK_NAME_VARIABLE: &str = "BUILDPULSE_CHECK_NAME";

/// Build, commit and reporter metadata for one set of test results.
///
/// Universal fields serialize first; the detected provider's own fields
/// follow in a second block.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    #[serde(
        rename = ":authored_at",
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339_opt"
    )]
    authored_at: Option<DateTime<FixedOffset>>,
    #[serde(rename = ":author_email", skip_serializing_if = "String::is_empty")]
    author_email: String,
    #[serde(rename = ":author_name", skip_serializing_if = "String::is_empty")]
    author_name: String,
    #[serde(rename = ":branch")]
    branch: String,
    #[serde(rename = ":build_url")]
    build_url: String,
    #[serde(rename = ":check")]
    check: String,
    #[serde(rename = ":ci_provider")]
    ci_provider: String,
    #[serde(rename = ":commit_message", skip_serializing_if = "String::is_empty")]
    commit_message: String,
    #[serde(rename = ":commit_metadata_source")]
    commit_metadata_source: String,
    #[serde(rename = ":commit")]
    commit_sha: String,
    #[serde(
        rename = ":committed_at",
        skip_serializing_if = "Option::is_none",
        serialize_with = "rfc3339_opt"
    )]
    committed_at: Option<DateTime<FixedOffset>>,
    #[serde(rename = ":committer_email", skip_serializing_if = "String::is_empty")]
    committer_email: String,
    #[serde(rename = ":committer_name", skip_serializing_if = "String::is_empty")]
    committer_name: String,
    #[serde(rename = ":quota_id", skip_serializing_if = "String::is_empty")]
    quota_id: String,
    #[serde(rename = ":repo_name_with_owner")]
    repo_name_with_owner: String,
    #[serde(rename = ":reporter_os")]
    reporter_os: String,
    #[serde(rename = ":reporter_version")]
    reporter_version: String,
    #[serde(rename = ":tags", skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(rename = ":timestamp", serialize_with = "rfc3339")]
    timestamp: DateTime<Utc>,
    #[serde(rename = ":tree", skip_serializing_if = "String::is_empty")]
    tree_sha: String,

    #[serde(skip)]
    commit_resolved: bool,
    #[serde(skip)]
    provider: ProviderMetadata,
}

impl Metadata {
    /// Assemble metadata for the current build.
    ///
    /// Detects the CI provider from `envs`, resolves the commit under test
    /// through `resolver`, and stamps the record with `now()`. A failed
    /// commit lookup is logged and leaves only the raw SHA populated.
    ///
    /// # Errors
    ///
    /// Returns an error if provider detection or extraction fails.
    pub fn new(
        version: &Version,
        envs: &Env,
        tags: Vec<String>,
        quota_id: impl Into<String>,
        resolver: &dyn CommitResolver,
        now: impl FnOnce() -> DateTime<Utc>,
    ) -> Result<Self> {
        let provider = ProviderMetadata::detect(envs)?;

        let check = match env::lookup(envs, CHECK_NAME_VARIABLE) {
            "" => provider.name().to_string(),
            custom => custom.to_string(),
        };

        let mut metadata = Self {
            authored_at: None,
            author_email: String::new(),
            author_name: String::new(),
            branch: provider.branch().to_string(),
            build_url: provider.build_url().to_string(),
            check,
            ci_provider: provider.name().to_string(),
            commit_message: String::new(),
            commit_metadata_source: resolver.source().to_string(),
            commit_sha: String::new(),
            committed_at: None,
            committer_email: String::new(),
            committer_name: String::new(),
            quota_id: quota_id.into(),
            repo_name_with_owner: provider.repo_name_with_owner().to_string(),
            reporter_os: version.os.clone(),
            reporter_version: version.number.clone(),
            tags,
            timestamp: now(),
            tree_sha: String::new(),
            commit_resolved: false,
            provider,
        };
        metadata.resolve_commit(resolver);

        Ok(metadata)
    }

    fn resolve_commit(&mut self, resolver: &dyn CommitResolver) {
        let sha = self.provider.commit_sha().to_string();

        match resolver.lookup(&sha) {
            Ok(commit) => {
                self.authored_at = commit.authored_at;
                self.author_email = commit.author_email;
                self.author_name = commit.author_name;
                self.commit_message = commit.message.trim().to_string();
                self.commit_sha = commit.sha;
                self.committed_at = commit.committed_at;
                self.committer_email = commit.committer_email;
                self.committer_name = commit.committer_name;
                self.tree_sha = commit.tree_sha;
                self.commit_resolved = true;
            }
            Err(err) => {
                warn!(
                    "❌\n\
                     ❌ Commit lookup unsuccessful: {err}\n\
                     ❌\n\
                     ❌ Test results will not be analyzed for this build. Please get in touch at https://buildpulse.io/contact so we can resolve this problem together.\n\
                     ❌\n\
                     ❌ In a future release, this issue will become a fatal error with a nonzero exit code.\n\
                     ❌"
                );
                self.commit_sha = sha;
            }
        }
    }

    /// Render the metadata as YAML: universal fields, then provider fields.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Serialization`] if either block fails to
    /// serialize.
    pub fn to_yaml(&self) -> Result<String> {
        let mut out = serde_yaml::to_string(self)?;
        out.push_str(&serde_yaml::to_string(&self.provider)?);
        Ok(out)
    }

    /// Whether the commit lookup succeeded.
    #[must_use]
    pub const fn commit_resolved(&self) -> bool {
        self.commit_resolved
    }

    /// The detected provider's metadata.
    #[must_use]
    pub const fn provider(&self) -> &ProviderMetadata {
        &self.provider
    }

    /// Branch under test.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Check name, either overridden or the provider name.
    #[must_use]
    pub fn check(&self) -> &str {
        &self.check
    }

    /// Commit SHA under test.
    #[must_use]
    pub fn commit_sha(&self) -> &str {
        &self.commit_sha
    }

    /// Tree SHA of the commit, empty if unknown.
    #[must_use]
    pub fn tree_sha(&self) -> &str {
        &self.tree_sha
    }

    /// Repository identifier in `owner/repo` form.
    #[must_use]
    pub fn repo_name_with_owner(&self) -> &str {
        &self.repo_name_with_owner
    }

    /// Where commit details came from, `Repository` or `Static`.
    #[must_use]
    pub fn commit_metadata_source(&self) -> &str {
        &self.commit_metadata_source
    }

    /// Author name of the commit, empty if unresolved.
    #[must_use]
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Trimmed commit message, empty if unresolved.
    #[must_use]
    pub fn commit_message(&self) -> &str {
        &self.commit_message
    }
}

fn rfc3339<S, Tz>(time: &DateTime<Tz>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    serializer.serialize_str(&rfc3339_nano(time))
}

/// RFC 3339 with the fractional seconds trimmed of trailing zeros, and
/// dropped entirely when zero.
fn rfc3339_nano<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let text = time.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let Some((whole, rest)) = text.split_once('.') else {
        return text;
    };
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (fraction, zone) = rest.split_at(digits);
    match fraction.trim_end_matches('0') {
        "" => format!("{whole}{zone}"),
        fraction => format!("{whole}.{fraction}{zone}"),
    }
}

#[allow(clippy::ref_option)]
fn rfc3339_opt<S: Serializer>(
    time: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match time {
        Some(time) => rfc3339(time, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::commit::{Commit, StaticCommitResolver};
    use crate::error::Error;
    use chrono::TimeZone;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    struct FailingResolver;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    impl CommitResolver for FailingResolver {
        fn lookup(&self, sha: &str) -> Result<Commit> {
            Err(Error::commit_not_found(sha, "object not found"))
        }

        fn source(&self) -> &'static str {
            "Repository"
        }
    }

    fn github_env(extra: &[(&str, &str)]) -> Env {
        let mut envs: Env = [
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_SHA", "1f192ff735f887dd7a25229b2ece0422d17931f5"),
            ("GITHUB_REPOSITORY", "some-owner/some-repo"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        for (k, v) in extra {
            envs.insert((*k).to_string(), (*v).to_string());
        }
        envs
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 7, 11, 1, 2, 3).unwrap()
    }

    fn build(envs: &Env, resolver: &dyn CommitResolver) -> Metadata {
        Metadata::new(&Version::default(), envs, Vec::new(), "", resolver, fixed_now).unwrap()
    }

    #[test]
    fn test_check_name_override() {
        let meta = build(
            &github_env(&[(CHECK_NAME_VARIABLE, "some-custom-check-name")]),
            &StaticCommitResolver::default(),
        );
        assert_eq!(meta.check(), "some-custom-check-name");
        assert!(
            meta.to_yaml()
                .unwrap()
                .contains(":check: some-custom-check-name\n")
        );
    }

    #[test]
    fn test_check_name_empty_falls_back() {
        let meta = build(
            &github_env(&[(CHECK_NAME_VARIABLE, "")]),
            &StaticCommitResolver::default(),
        );
        assert_eq!(meta.check(), "github-actions");
    }

    #[test]
    fn test_check_name_absent_falls_back() {
        let meta = build(&github_env(&[]), &StaticCommitResolver::default());
        assert_eq!(meta.check(), "github-actions");
    }

    #[test]
    fn test_failed_lookup_keeps_raw_sha() {
        let meta = build(&github_env(&[]), &FailingResolver);

        assert!(!meta.commit_resolved());
        assert_eq!(meta.commit_sha(), "1f192ff735f887dd7a25229b2ece0422d17931f5");
        assert_eq!(meta.commit_metadata_source(), "Repository");
        assert_eq!(meta.tree_sha(), "");
        assert_eq!(meta.author_name(), "");
        assert_eq!(meta.commit_message(), "");

        let yaml = meta.to_yaml().unwrap();
        assert!(yaml.contains(":commit: 1f192ff735f887dd7a25229b2ece0422d17931f5\n"));
        assert!(yaml.contains(":commit_metadata_source: Repository\n"));
        for absent in [
            ":authored_at",
            ":author_email",
            ":author_name",
            ":commit_message",
            ":committed_at",
            ":committer_email",
            ":committer_name",
            ":tree",
        ] {
            assert!(!yaml.contains(absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn test_failed_lookup_warns_with_banner() {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .without_time()
            .with_level(false)
            .with_target(false)
            .with_max_level(tracing::Level::WARN)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            build(&github_env(&[]), &FailingResolver);
        });

        let text = buffer.text();
        assert!(text.contains("Commit lookup unsuccessful: unable to find commit with SHA"));
        assert!(text.contains("Test results will not be analyzed for this build"));

        let banner: Vec<&str> = text
            .lines()
            .skip_while(|line| !line.trim_start().starts_with('❌'))
            .take_while(|line| !line.trim().is_empty())
            .collect();
        assert_eq!(banner.len(), 7);
        for line in banner {
            assert!(line.trim_start().starts_with('❌'), "unmarked line: {line}");
        }
    }

    #[test]
    fn test_timestamp_fraction_trims_trailing_zeros() {
        let at = |nanos| Utc.with_ymd_and_hms(2020, 7, 11, 1, 2, 3).unwrap()
            + chrono::Duration::nanoseconds(nanos);
        assert_eq!(rfc3339_nano(&at(123_400_000)), "2020-07-11T01:02:03.1234Z");
        assert_eq!(rfc3339_nano(&at(5)), "2020-07-11T01:02:03.000000005Z");
        assert_eq!(rfc3339_nano(&at(0)), "2020-07-11T01:02:03Z");

        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = at(500_000_000).with_timezone(&offset);
        assert_eq!(rfc3339_nano(&local), "2020-07-10T20:02:03.5-05:00");

        let meta = Metadata::new(
            &Version::default(),
            &github_env(&[]),
            Vec::new(),
            "",
            &StaticCommitResolver::default(),
            || at(123_400_000),
        )
        .unwrap();
        assert!(
            meta.to_yaml()
                .unwrap()
                .contains(":timestamp: 2020-07-11T01:02:03.1234Z\n")
        );
    }

    #[test]
    fn test_message_is_trimmed() {
        let resolver = StaticCommitResolver::new(Commit {
            message: "\n  Fix the flux capacitor\n\n".to_string(),
            ..Commit::default()
        });
        let meta = build(&github_env(&[]), &resolver);
        assert!(meta.commit_resolved());
        assert_eq!(meta.commit_message(), "Fix the flux capacitor");
    }

    #[test]
    fn test_provider_error_propagates() {
        let envs: Env = [("BUILDKITE", "true"), ("BUILDKITE_REPO", "nope")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let err = Metadata::new(
            &Version::default(),
            &envs,
            Vec::new(),
            "",
            &StaticCommitResolver::default(),
            fixed_now,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedUrl { .. }));
    }

    #[test]
    fn test_timestamp_uses_clock() {
        let meta = build(&github_env(&[]), &StaticCommitResolver::default());
        assert!(
            meta.to_yaml()
                .unwrap()
                .contains(":timestamp: 2020-07-11T01:02:03Z\n")
        );
    }
}

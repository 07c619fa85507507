//! End-to-end `submit` runs against an in-memory object store.

#![allow(clippy::unwrap_used)]

use buildpulse_metadata::{Commit, CommitResolver, Env, Version};
use buildpulse_test_reporter::cli::{CliError, SubmitArgs};
use buildpulse_test_reporter::commands::submit::{
    CommitResolverFactory, DefaultCommitResolverFactory, Submit,
};
use buildpulse_test_reporter::process_env;
use buildpulse_test_reporter::tracing::{LogCapture, capture_layer};
use async_trait::async_trait;
use buildpulse_upload::{MemoryStore, ObjectStore};
use chrono::{DateTime, TimeZone, Utc};
use flate2::read::GzDecoder;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tracing_subscriber::layer::SubscriberExt;

const SHA: &str = "1f192ff735f887dd7a25229b2ece0422d17931f5";
const TREE: &str = "0da9df599c02da5e7f5058b7108dcd5e1929a0fe";

/// Records which resolver was requested and hands back static ones.
#[derive(Default)]
struct RecordingFactory {
    repository_paths: RefCell<Vec<PathBuf>>,
    static_commits: RefCell<Vec<Commit>>,
    fail_repository: bool,
}

impl CommitResolverFactory for RecordingFactory {
    fn from_repository(
        &self,
        path: &Path,
    ) -> buildpulse_metadata::Result<Box<dyn CommitResolver>> {
        self.repository_paths.borrow_mut().push(path.to_path_buf());
        if self.fail_repository {
            return Err(buildpulse_metadata::Error::repository_not_found(
                path,
                "could not find repository",
            ));
        }
        Ok(DefaultCommitResolverFactory.from_static(Commit::default()))
    }

    fn from_static(&self, commit: Commit) -> Box<dyn CommitResolver> {
        self.static_commits.borrow_mut().push(commit.clone());
        DefaultCommitResolverFactory.from_static(commit)
    }
}

fn version() -> Version {
    Version {
        number: "v1.2.3".to_string(),
        commit: "abc1234".to_string(),
        os: "linux".to_string(),
        toolchain: "rustc 1.85.0".to_string(),
    }
}

fn github_env(sha: &str) -> Env {
    [
        ("BUILDPULSE_ACCESS_KEY_ID", "some-access-key-id"),
        ("BUILDPULSE_SECRET_ACCESS_KEY", "some-secret-access-key"),
        ("GITHUB_ACTIONS", "true"),
        ("GITHUB_REF", "refs/heads/some-branch"),
        ("GITHUB_REPOSITORY", "some-owner/some-repo"),
        ("GITHUB_RUN_ATTEMPT", "1"),
        ("GITHUB_RUN_ID", "8675309"),
        ("GITHUB_SHA", sha),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn results_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("unit")).unwrap();
    std::fs::write(dir.path().join("unit/report.xml"), "<testsuites/>").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
    dir
}

fn args(results: &TempDir) -> SubmitArgs {
    SubmitArgs {
        paths: vec![results.path().display().to_string()],
        account_id: Some(42),
        repository_id: Some(8_675_309),
        tree: Some(TREE.to_string()),
        ..SubmitArgs::default()
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 7, 11, 1, 2, 3).unwrap()
}

fn unpack(bytes: &[u8]) -> BTreeMap<String, Option<String>> {
    let mut archive = tar::Archive::new(GzDecoder::new(bytes));
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let path = entry
                .path()
                .unwrap()
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string();
            if entry.header().entry_type().is_dir() {
                return (path, None);
            }
            let mut contents = String::new();
            entry.read_to_string(&mut contents).unwrap();
            (path, Some(contents))
        })
        .collect()
}

#[tokio::test]
async fn test_submit_uploads_archive() {
    let results = results_dir();
    let factory = RecordingFactory::default();
    let submit = Submit::new(
        version(),
        &args(&results),
        github_env(SHA),
        &factory,
        LogCapture::new(),
    )
    .unwrap();

    let store = MemoryStore::new();
    let key = submit.run(&store).await.unwrap();

    assert!(key.starts_with("8675309/buildpulse-"), "unexpected key {key}");
    assert!(key.ends_with(".gz"));
    assert_eq!(
        store.keys(),
        vec![("42.buildpulse-uploads".to_string(), key.clone())]
    );

    let entries = unpack(&store.get("42.buildpulse-uploads", &key).unwrap());
    assert!(entries.contains_key("buildpulse.log"));
    assert_eq!(
        entries.get("test_results/unit/report.xml"),
        Some(&Some("<testsuites/>".to_string()))
    );
    assert_eq!(entries.get("test_results/unit"), Some(&None));
    assert!(!entries.keys().any(|k| k.ends_with("notes.txt")));

    let yaml = entries["buildpulse.yml"].clone().unwrap();
    assert!(yaml.contains(":ci_provider: github-actions\n"));
    assert!(yaml.contains(&format!(":commit: {SHA}\n")));
    assert!(yaml.contains(&format!(":tree: {TREE}\n")));
    assert!(yaml.contains(":commit_metadata_source: Static\n"));
    assert!(yaml.contains(":reporter_version: v1.2.3\n"));
}

/// Store that rejects every upload.
struct RejectingStore;

#[async_trait]
impl ObjectStore for RejectingStore {
    async fn put(&self, bucket: &str, key: &str, _body: Vec<u8>) -> buildpulse_upload::Result<()> {
        Err(buildpulse_upload::Error::upload(bucket, key, "access denied"))
    }
}

#[test]
fn test_upload_failure_is_runtime_error() {
    let results = results_dir();
    let submit = Submit::new(
        version(),
        &args(&results),
        github_env(SHA),
        &RecordingFactory::default(),
        LogCapture::new(),
    )
    .unwrap();

    let err = tokio_test::block_on(submit.run(&RejectingStore)).unwrap_err();
    assert!(matches!(err, CliError::Other { .. }));
    assert!(err.to_string().contains("access denied"));
}

#[test]
fn test_tree_selects_static_resolver() {
    let results = results_dir();
    let factory = RecordingFactory::default();
    Submit::new(
        version(),
        &args(&results),
        github_env(SHA),
        &factory,
        LogCapture::new(),
    )
    .unwrap();

    assert!(factory.repository_paths.borrow().is_empty());
    let commits = factory.static_commits.borrow();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].tree_sha, TREE);
    assert_eq!(commits[0].sha, "");
}

#[test]
fn test_repository_dir_selects_repository_resolver() {
    let results = results_dir();
    let checkout = TempDir::new().unwrap();
    let factory = RecordingFactory::default();
    let args = SubmitArgs {
        tree: None,
        repository_dir: Some(checkout.path().to_path_buf()),
        ..args(&results)
    };

    Submit::new(version(), &args, github_env(SHA), &factory, LogCapture::new()).unwrap();

    assert_eq!(
        *factory.repository_paths.borrow(),
        vec![checkout.path().to_path_buf()]
    );
    assert!(factory.static_commits.borrow().is_empty());
}

#[test]
fn test_unopenable_repository_is_fatal() {
    let results = results_dir();
    let factory = RecordingFactory {
        fail_repository: true,
        ..RecordingFactory::default()
    };
    let args = SubmitArgs {
        tree: None,
        ..args(&results)
    };

    let err = Submit::new(version(), &args, github_env(SHA), &factory, LogCapture::new())
        .unwrap_err();
    assert!(matches!(err, CliError::Config { .. }));
    assert!(
        err.to_string()
            .starts_with("invalid value for flag --repository-dir: no repository found at")
    );
}

#[test]
fn test_package_includes_coverage_tags_and_quota() {
    let results = results_dir();
    let coverage = TempDir::new().unwrap();
    std::fs::write(coverage.path().join("lcov.info"), "TN:\n").unwrap();

    let args = SubmitArgs {
        coverage_files: vec![coverage.path().display().to_string()],
        tags: vec!["tag1".to_string(), "tag2".to_string()],
        quota_id: Some("quota1".to_string()),
        ..args(&results)
    };
    let submit = Submit::new(
        version(),
        &args,
        github_env(SHA),
        &RecordingFactory::default(),
        LogCapture::new(),
    )
    .unwrap();

    let entries = unpack(&submit.package(fixed_now).unwrap());
    assert_eq!(
        entries.get("coverage/lcov.info"),
        Some(&Some("TN:\n".to_string()))
    );

    let yaml = entries["buildpulse.yml"].clone().unwrap();
    assert!(yaml.contains(":tags:\n- tag1\n- tag2\n"));
    assert!(yaml.contains(":quota_id: quota1\n"));
    assert!(yaml.contains(":timestamp: 2020-07-11T01:02:03Z\n"));
}

#[test]
fn test_no_results_found() {
    let results = TempDir::new().unwrap();
    std::fs::write(results.path().join("notes.txt"), "nothing here").unwrap();
    let submit = Submit::new(
        version(),
        &args(&results),
        github_env(SHA),
        &RecordingFactory::default(),
        LogCapture::new(),
    )
    .unwrap();

    let err = submit.package(fixed_now).unwrap_err();
    assert!(matches!(err, CliError::Config { .. }));
}

#[test]
fn test_provider_errors_surface() {
    let results = results_dir();
    let mut envs = github_env(SHA);
    envs.insert("GITHUB_RUN_ID".to_string(), "not-a-number".to_string());
    let submit = Submit::new(
        version(),
        &args(&results),
        envs,
        &RecordingFactory::default(),
        LogCapture::new(),
    )
    .unwrap();

    let err = submit.package(fixed_now).unwrap_err();
    assert!(matches!(err, CliError::Other { .. }));
    assert!(err.to_string().contains("GITHUB_RUN_ID"));
}

#[test]
fn test_log_is_shipped_with_results() {
    let results = results_dir();
    let capture = LogCapture::new();
    let subscriber = tracing_subscriber::registry().with(capture_layer(&capture));

    let archive = tracing::subscriber::with_default(subscriber, || {
        let submit = Submit::new(
            version(),
            &args(&results),
            github_env(SHA),
            &RecordingFactory::default(),
            capture.clone(),
        )
        .unwrap();
        submit.package(fixed_now).unwrap()
    });

    let entries = unpack(&archive);
    let log = entries["buildpulse.log"].clone().unwrap();
    assert!(log.contains(
        "Current version: BuildPulse Test Reporter v1.2.3 (linux abc1234 rustc 1.85.0)"
    ));
    assert!(log.contains("Initiating `submit`"));
    assert!(log.contains("Detected build environment: github-actions"));
    assert!(log.contains("Using $GITHUB_SHA environment variable as commit SHA"));
    assert!(log.contains("Flushing log to buildpulse.log"));
}

fn git(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Some Author")
        .env("GIT_AUTHOR_EMAIL", "some-author@example.com")
        .env("GIT_AUTHOR_DATE", "2020-07-09T04:05:06-05:00")
        .env("GIT_COMMITTER_NAME", "Some Committer")
        .env("GIT_COMMITTER_EMAIL", "some-committer@example.com")
        .env("GIT_COMMITTER_DATE", "2020-07-10T07:08:09+13:00")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", dir)
        .output()
        .ok()?;
    output
        .status
        .success()
        .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[test]
fn test_commit_details_from_checkout() {
    let checkout = TempDir::new().unwrap();
    let dir = checkout.path();
    if git(dir, &["init", "--quiet"]).is_none() {
        eprintln!("git unavailable; skipping");
        return;
    }
    std::fs::write(dir.join("README"), "hello\n").unwrap();
    git(dir, &["add", "README"]).unwrap();
    git(
        dir,
        &["commit", "--quiet", "--no-gpg-sign", "-m", "Add README"],
    )
    .unwrap();
    let sha = git(dir, &["rev-parse", "HEAD"]).unwrap();
    let tree = git(dir, &["rev-parse", "HEAD^{tree}"]).unwrap();

    let results = results_dir();
    let args = SubmitArgs {
        tree: None,
        repository_dir: Some(dir.to_path_buf()),
        ..args(&results)
    };
    let submit = Submit::new(
        version(),
        &args,
        github_env(&sha),
        &DefaultCommitResolverFactory,
        LogCapture::new(),
    )
    .unwrap();

    let entries = unpack(&submit.package(fixed_now).unwrap());
    let yaml = entries["buildpulse.yml"].clone().unwrap();
    assert!(yaml.contains(":commit_metadata_source: Repository\n"));
    assert!(yaml.contains(&format!(":commit: {sha}\n")));
    assert!(yaml.contains(&format!(":tree: {tree}\n")));
    assert!(yaml.contains(":author_name: Some Author\n"));
    assert!(yaml.contains(":authored_at: 2020-07-09T04:05:06-05:00\n"));
    assert!(yaml.contains(":committed_at: 2020-07-10T07:08:09+13:00\n"));
    assert!(yaml.contains(":commit_message: Add README\n"));
}

#[test]
fn test_process_env_snapshot() {
    temp_env::with_vars(
        [
            ("BUILDPULSE_ACCESS_KEY_ID", Some("from-process")),
            ("BUILDPULSE_CHECK_NAME", None),
        ],
        || {
            let envs = process_env();
            assert_eq!(
                envs.get("BUILDPULSE_ACCESS_KEY_ID").map(String::as_str),
                Some("from-process")
            );
            assert!(!envs.contains_key("BUILDPULSE_CHECK_NAME"));
        },
    );
}

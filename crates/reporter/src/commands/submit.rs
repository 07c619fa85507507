//! `test-reporter submit`
//!
//! Validates the invocation, resolves build metadata, packages the results
//! with `buildpulse.yml` and `buildpulse.log`, and uploads the archive.

use crate::cli::{CliError, SubmitArgs};
use crate::discovery::{self, Discovered};
use crate::tracing::LogCapture;
use buildpulse_metadata::{
    Commit, CommitResolver, Env, Metadata, RepositoryCommitResolver, StaticCommitResolver, Version,
};
use buildpulse_upload::{ArchiveBuilder, Credentials, ObjectStore, S3Store, bucket_name, new_object_key};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

/// Required access key ID variable.
pub const ACCESS_KEY_ID_VARIABLE: &str = "BUILDPULSE_ACCESS_KEY_ID";
/// Required secret access key variable.
pub const SECRET_ACCESS_KEY_VARIABLE: &str = "BUILDPULSE_SECRET_ACCESS_KEY";
/// Optional bucket override.
pub const BUCKET_VARIABLE: &str = "BUILDPULSE_BUCKET";

static TREE_SHA: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("^[0-9a-f]{40}$").ok());

/// Creates the commit resolver used for a submission.
pub trait CommitResolverFactory {
    /// Resolver backed by the git repository containing `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository can be opened at `path`.
    fn from_repository(&self, path: &Path) -> buildpulse_metadata::Result<Box<dyn CommitResolver>>;

    /// Resolver that always answers with `commit`.
    fn from_static(&self, commit: Commit) -> Box<dyn CommitResolver>;
}

/// Production resolvers: a real repository or a static commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCommitResolverFactory;

impl CommitResolverFactory for DefaultCommitResolverFactory {
    fn from_repository(&self, path: &Path) -> buildpulse_metadata::Result<Box<dyn CommitResolver>> {
        Ok(Box::new(RepositoryCommitResolver::new(path)?))
    }

    fn from_static(&self, commit: Commit) -> Box<dyn CommitResolver> {
        Box::new(StaticCommitResolver::new(commit))
    }
}

/// Validated settings for one submission.
#[derive(Debug, Clone)]
pub struct SubmitConfig {
    /// Test result inputs as given on the command line.
    pub paths: Vec<String>,
    /// Coverage inputs as given on the command line.
    pub coverage_paths: Vec<String>,
    /// BuildPulse account ID.
    pub account_id: u64,
    /// BuildPulse repository ID.
    pub repository_id: u64,
    /// Checkout used for commit lookup.
    pub repository_dir: PathBuf,
    /// Tree SHA supplied instead of a checkout.
    pub tree: Option<String>,
    /// Tags attached to the submission.
    pub tags: Vec<String>,
    /// Quota the submission counts against.
    pub quota_id: String,
    /// Upload credentials.
    pub credentials: Credentials,
    /// Destination bucket.
    pub bucket: String,
}

fn required_env<'a>(envs: &'a Env, name: &str) -> Result<&'a str, CliError> {
    match envs.get(name).map(String::as_str) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(CliError::config(format!(
            "missing required environment variable: {name}"
        ))),
    }
}

fn required_id(value: Option<u64>, flag: &str) -> Result<u64, CliError> {
    match value {
        Some(id) if id != 0 => Ok(id),
        _ => Err(CliError::config(format!("missing required flag: --{flag}"))),
    }
}

impl SubmitConfig {
    /// Validate `args` and the credential variables in `envs`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the first missing or malformed
    /// flag, path or variable.
    pub fn from_args(args: &SubmitArgs, envs: &Env) -> Result<Self, CliError> {
        for path in &args.paths {
            if !discovery::is_pattern(path) && !Path::new(path).exists() {
                return Err(CliError::config(format!("path does not exist: {path}")));
            }
        }

        let account_id = required_id(args.account_id, "account-id")?;
        let repository_id = required_id(args.repository_id, "repository-id")?;

        let credentials = Credentials::new(
            required_env(envs, ACCESS_KEY_ID_VARIABLE)?,
            required_env(envs, SECRET_ACCESS_KEY_VARIABLE)?,
        );

        if args.repository_dir.is_some() && args.tree.is_some() {
            return Err(CliError::config(
                "invalid use of flag --repository-dir with flag --tree: use one or the other, but not both",
            ));
        }

        if let Some(tree) = &args.tree
            && !TREE_SHA.as_ref().is_some_and(|re| re.is_match(tree))
        {
            return Err(CliError::config(format!(
                "invalid value \"{tree}\" for flag --tree: should be a 40-character SHA-1 hash"
            )));
        }

        let repository_dir = args
            .repository_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        if !repository_dir.is_dir() {
            return Err(CliError::config(format!(
                "invalid value for flag --repository-dir: {} is not a directory",
                repository_dir.display()
            )));
        }

        let bucket = envs
            .get(BUCKET_VARIABLE)
            .filter(|b| !b.is_empty())
            .cloned()
            .unwrap_or_else(|| bucket_name(account_id));

        Ok(Self {
            paths: args.paths.clone(),
            coverage_paths: args.coverage_files.clone(),
            account_id,
            repository_id,
            repository_dir,
            tree: args.tree.clone(),
            tags: args.tags.clone(),
            quota_id: args.quota_id.clone().unwrap_or_default(),
            credentials,
            bucket,
        })
    }
}

/// A validated submission, ready to package and upload.
pub struct Submit {
    version: Version,
    config: SubmitConfig,
    envs: Env,
    resolver: Box<dyn CommitResolver>,
    capture: LogCapture,
}

impl std::fmt::Debug for Submit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submit")
            .field("version", &self.version)
            .field("config", &self.config)
            .field("resolver", &self.resolver.source())
            .finish_non_exhaustive()
    }
}

impl Submit {
    /// Validate the invocation and choose a commit resolver.
    ///
    /// `--tree` selects a static resolver seeded with that tree SHA;
    /// otherwise the repository at `--repository-dir` is opened.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for invalid arguments or when the
    /// repository cannot be opened.
    pub fn new(
        version: Version,
        args: &SubmitArgs,
        envs: Env,
        factory: &dyn CommitResolverFactory,
        capture: LogCapture,
    ) -> Result<Self, CliError> {
        info!("Current version: {}", version);
        info!("Initiating `submit`");
        debug!(args = ?args, "Parsed submit arguments");
        if let Ok(dir) = std::env::current_dir() {
            debug!(working_directory = %dir.display(), "Resolved working directory");
        }

        let config = SubmitConfig::from_args(args, &envs)?;

        let resolver = match &config.tree {
            Some(tree) => factory.from_static(Commit {
                tree_sha: tree.clone(),
                ..Commit::default()
            }),
            None => factory
                .from_repository(&config.repository_dir)
                .map_err(|e| {
                    CliError::config_with_help(
                        format!("invalid value for flag --repository-dir: {e}"),
                        "Run from a git checkout, pass --repository-dir, or pass --tree when no checkout is available",
                    )
                })?,
        };

        Ok(Self {
            version,
            config,
            envs,
            resolver,
            capture,
        })
    }

    /// The validated settings.
    #[must_use]
    pub const fn config(&self) -> &SubmitConfig {
        &self.config
    }

    /// Build the metadata document and the archive, stamped with `now()`.
    ///
    /// # Errors
    ///
    /// Returns an error if no results are found, metadata cannot be
    /// resolved, or a file cannot be archived.
    pub fn package(&self, now: impl FnOnce() -> DateTime<Utc>) -> Result<Vec<u8>, CliError> {
        let results = discovery::test_results(&self.config.paths)?;
        let coverage = discovery::coverage_files(&self.config.coverage_paths)?;
        info!(
            results = results.len(),
            coverage = coverage.len(),
            "Collected files for submission"
        );

        let metadata = Metadata::new(
            &self.version,
            &self.envs,
            self.config.tags.clone(),
            self.config.quota_id.clone(),
            self.resolver.as_ref(),
            now,
        )?;
        let yaml = metadata.to_yaml()?;

        let mut archive = ArchiveBuilder::new();
        archive.add_bytes("buildpulse.yml", yaml.as_bytes())?;
        add_section(&mut archive, "test_results", &results)?;
        add_section(&mut archive, "coverage", &coverage)?;

        info!("Flushing log to buildpulse.log");
        archive.add_bytes("buildpulse.log", &self.capture.contents())?;

        Ok(archive.finish()?)
    }

    /// Package and upload the results, returning the object key.
    ///
    /// # Errors
    ///
    /// Returns an error if packaging or the upload fails.
    pub async fn run(&self, store: &dyn ObjectStore) -> Result<String, CliError> {
        let archive = self.package(Utc::now)?;
        let key = new_object_key(self.config.repository_id);
        store.put(&self.config.bucket, &key, archive).await?;
        info!(bucket = %self.config.bucket, key = %key, "Submitted test results");
        Ok(key)
    }
}

fn add_section(
    archive: &mut ArchiveBuilder,
    section: &str,
    files: &[Discovered],
) -> Result<(), CliError> {
    for file in files {
        archive.add_file(&file.source, Path::new(section).join(&file.relative))?;
    }
    Ok(())
}

/// Run `submit` against the real environment and S3.
///
/// # Errors
///
/// Returns an error if validation, packaging or the upload fails.
pub async fn execute(
    version: Version,
    args: &SubmitArgs,
    envs: Env,
    capture: LogCapture,
) -> Result<String, CliError> {
    let submit = Submit::new(version, args, envs, &DefaultCommitResolverFactory, capture)?;
    let store = S3Store::new(&submit.config().credentials).await;
    submit.run(&store).await
}

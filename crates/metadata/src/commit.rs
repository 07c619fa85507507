//! Commit lookup backed by a local checkout or by a caller-supplied value.

use crate::error::{Error, Result};
use chrono::{DateTime, FixedOffset};
use std::path::Path;
use tracing::{debug, info};

/// Metadata describing a single git commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// Full 40-character commit SHA.
    pub sha: String,
    /// SHA of the tree the commit points at.
    pub tree_sha: String,
    /// Author name.
    pub author_name: String,
    /// Author email.
    pub author_email: String,
    /// Authored-at time in the author's recorded offset.
    pub authored_at: Option<DateTime<FixedOffset>>,
    /// Committer name.
    pub committer_name: String,
    /// Committer email.
    pub committer_email: String,
    /// Committed-at time in the committer's recorded offset.
    pub committed_at: Option<DateTime<FixedOffset>>,
    /// Raw commit message.
    pub message: String,
}

/// Resolves a commit SHA to full commit metadata.
pub trait CommitResolver {
    /// Look up the commit identified by `sha`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommitNotFound`] if the commit cannot be resolved.
    fn lookup(&self, sha: &str) -> Result<Commit>;

    /// Label describing where commit data comes from.
    fn source(&self) -> &'static str;
}

/// Looks up commits in a local git repository.
pub struct RepositoryCommitResolver {
    repo: gix::Repository,
}

impl std::fmt::Debug for RepositoryCommitResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryCommitResolver")
            .field("git_dir", &self.repo.git_dir())
            .finish()
    }
}

impl RepositoryCommitResolver {
    /// Open the repository containing `path`, searching parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepositoryNotFound`] when no repository is found.
    pub fn new(path: &Path) -> Result<Self> {
        let repo = gix::discover(path)
            .map_err(|e| Error::repository_not_found(path, e.to_string()))?;
        debug!(git_dir = %repo.git_dir().display(), "Opened git repository");
        Ok(Self { repo })
    }

    /// Where HEAD points, for decorating lookup failures.
    fn describe_head(&self) -> Option<String> {
        let id = self.repo.head_id().ok()?;
        Some(match self.repo.head_name().ok().flatten() {
            Some(name) => format!("repository's HEAD reference is {} ({id})", name.as_bstr()),
            None => format!("repository's HEAD reference is detached at {id}"),
        })
    }

    fn read_commit(&self, sha: &str) -> Result<Commit> {
        let not_found = |message: String| Error::commit_not_found(sha, message);

        let id = gix::ObjectId::from_hex(sha.as_bytes()).map_err(|e| not_found(e.to_string()))?;
        let commit = self
            .repo
            .find_commit(id)
            .map_err(|e| not_found(e.to_string()))?;

        let author = commit.author().map_err(|e| not_found(e.to_string()))?;
        let committer = commit.committer().map_err(|e| not_found(e.to_string()))?;
        let authored_at = author.time().map_err(|e| not_found(e.to_string()))?;
        let committed_at = committer.time().map_err(|e| not_found(e.to_string()))?;
        let tree = commit.tree_id().map_err(|e| not_found(e.to_string()))?;

        Ok(Commit {
            sha: commit.id().to_string(),
            tree_sha: tree.to_string(),
            author_name: author.name.to_string(),
            author_email: author.email.to_string(),
            authored_at: to_datetime(authored_at),
            committer_name: committer.name.to_string(),
            committer_email: committer.email.to_string(),
            committed_at: to_datetime(committed_at),
            message: commit.message_raw_sloppy().to_string(),
        })
    }
}

impl CommitResolver for RepositoryCommitResolver {
    fn lookup(&self, sha: &str) -> Result<Commit> {
        info!("Looking up info for commit `{}` in git repository", sha);
        match self.read_commit(sha) {
            Ok(commit) => {
                info!("Found commit info");
                Ok(commit)
            }
            Err(Error::CommitNotFound { sha, message }) => match self.describe_head() {
                Some(head) => {
                    info!("{}", head);
                    Err(Error::commit_not_found(sha, format!("{message}; {head}")))
                }
                None => Err(Error::commit_not_found(sha, message)),
            },
            Err(err) => Err(err),
        }
    }

    fn source(&self) -> &'static str {
        "Repository"
    }
}

/// Converts a git timestamp into a datetime in its recorded offset.
fn to_datetime(time: gix::date::Time) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset)?;
    DateTime::from_timestamp(time.seconds, 0).map(|utc| utc.with_timezone(&offset))
}

/// Returns a canned commit with the requested SHA filled in.
///
/// Used when the caller knows the tree SHA but has no checkout available.
#[derive(Debug, Clone, Default)]
pub struct StaticCommitResolver {
    template: Commit,
}

impl StaticCommitResolver {
    /// Create a resolver that always answers with `template`.
    #[must_use]
    pub fn new(template: Commit) -> Self {
        Self { template }
    }
}

impl CommitResolver for StaticCommitResolver {
    fn lookup(&self, sha: &str) -> Result<Commit> {
        Ok(Commit {
            sha: sha.to_string(),
            ..self.template.clone()
        })
    }

    fn source(&self) -> &'static str {
        "Static"
    }
}

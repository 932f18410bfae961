//! Native git access using the `git2` crate.
//!
//! Derives the short hash used to stamp builds, replacing an external
//! `git rev-parse --short HEAD` / `git diff --stat HEAD` pair.

use git2::{Repository, StatusOptions};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Suffix appended to the short hash when tracked files differ from HEAD.
pub const DIRTY_SUFFIX: &str = ".DIRTY";

static SHORTHASH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{7,}$").expect("valid shorthash regex"));

/// Errors that can occur during git operations
#[derive(Debug, Error)]
pub enum GitError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Reference not found: {0}")]
    RefNotFound(String),

    #[error("Invalid short hash: {0}")]
    InvalidHash(String),

    #[error("Git2 error: {0}")]
    Git2(#[from] git2::Error),
}

/// Result type for git operations
pub type GitResult<T> = Result<T, GitError>;

/// Check that a short hash looks like abbreviated lowercase hex.
pub fn is_valid_shorthash(hash: &str) -> bool {
    SHORTHASH_REGEX.is_match(hash)
}

/// Read-only view of the project repository
pub struct GitManager {
    repo_path: PathBuf,
}

impl GitManager {
    /// Opens the repository containing `path` (searching parent directories)
    pub fn open(path: impl AsRef<Path>) -> GitResult<Self> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|e| {
            GitError::Repository(format!(
                "Failed to open repository at {:?}: {}",
                path, e
            ))
        })?;

        let repo_path = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());

        Ok(GitManager { repo_path })
    }

    fn repository(&self) -> GitResult<Repository> {
        Repository::open(&self.repo_path)
            .map_err(|e| GitError::Repository(format!("Failed to open repository: {}", e)))
    }

    /// Gets the current HEAD commit hash
    ///
    /// # Returns
    /// The full commit hash as a string
    pub fn get_head_commit(&self) -> GitResult<String> {
        let repo = self.repository()?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GitError::RefNotFound(format!("Failed to resolve HEAD: {}", e)))?;
        Ok(commit.id().to_string())
    }

    /// Abbreviated HEAD commit id, as `git rev-parse --short HEAD` prints it
    pub fn short_hash(&self) -> GitResult<String> {
        let repo = self.repository()?;
        let commit = repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GitError::RefNotFound(format!("Failed to resolve HEAD: {}", e)))?;

        let short = commit.as_object().short_id()?;
        let hash = short
            .as_str()
            .ok_or_else(|| GitError::InvalidHash("short id is not UTF-8".to_string()))?
            .to_string();

        if !is_valid_shorthash(&hash) {
            return Err(GitError::InvalidHash(hash));
        }
        Ok(hash)
    }

    /// Whether tracked files differ from HEAD (index or worktree).
    ///
    /// Untracked and ignored files are not considered.
    pub fn is_dirty(&self) -> GitResult<bool> {
        let repo = self.repository()?;
        let mut options = StatusOptions::new();
        options
            .include_untracked(false)
            .include_ignored(false)
            .exclude_submodules(true);

        let statuses = repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .any(|entry| entry.status() != git2::Status::CURRENT))
    }

    /// Short hash of HEAD with `.DIRTY` appended for a modified tree
    pub fn shorthash_from_head(&self) -> GitResult<String> {
        let mut hash = self.short_hash()?;
        if self.is_dirty()? {
            log::warn!("[Git] Working tree has uncommitted changes");
            hash.push_str(DIRTY_SUFFIX);
        }
        Ok(hash)
    }

    /// Returns the path to the repository working directory
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

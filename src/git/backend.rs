//! Version-control capability used by the status aggregator
//!
//! The aggregator only talks to a repository through [`VcsBackend`], so the
//! scan pipeline does not care whether answers come from the `git` binary or
//! a test double.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use super::porcelain::WorkingTreeChanges;

/// An opened repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    /// Directory the repository was opened from
    pub root: PathBuf,
    /// Repository without a working tree
    pub is_bare: bool,
}

/// What HEAD points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// On a named local branch (possibly without commits yet)
    Branch(String),
    /// HEAD points directly at a commit
    Detached,
}

impl Head {
    pub fn branch_name(&self) -> Option<&str> {
        match self {
            Head::Branch(name) => Some(name),
            Head::Detached => None,
        }
    }
}

/// Commit distance between a local branch and its upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingDelta {
    /// Short name of the upstream, e.g. `origin/main`
    pub upstream: String,
    /// Commits on the local branch missing from the upstream
    pub ahead: u32,
    /// Commits on the upstream missing from the local branch
    pub behind: u32,
}

/// A local branch whose upstream has commits it lacks, or the other way round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchDivergence {
    pub branch: String,
    pub upstream: String,
    pub ahead: u32,
    pub behind: u32,
}

/// Trait for version-control backends to implement
#[async_trait]
pub trait VcsBackend: Send + Sync {
    /// Returns the display name for this backend
    fn name(&self) -> &str;

    /// Opens the repository rooted at `path`
    ///
    /// Fails when `path` is not itself the root of a readable repository.
    async fn open(&self, path: &Path) -> Result<RepoHandle>;

    /// Reads the current branch or detects a detached HEAD
    async fn current_branch(&self, repo: &RepoHandle) -> Result<Head>;

    /// Ahead/behind counts for `branch`, `None` when no upstream is configured
    async fn tracking_delta(&self, repo: &RepoHandle, branch: &str)
        -> Result<Option<TrackingDelta>>;

    /// Every local branch that differs from its upstream
    async fn diverged_branches(&self, repo: &RepoHandle) -> Result<Vec<BranchDivergence>>;

    /// Staged, unstaged and conflicted entries of the working tree
    async fn working_tree_changes(&self, repo: &RepoHandle) -> Result<WorkingTreeChanges>;

    /// Whether the working tree has staged or unstaged modifications
    async fn is_dirty(&self, repo: &RepoHandle) -> Result<bool> {
        Ok(self.working_tree_changes(repo).await?.is_dirty())
    }

    /// Untracked files, excluding ignored ones
    async fn untracked_files(&self, repo: &RepoHandle) -> Result<Vec<PathBuf>>;

    /// Whether any stash entry exists
    async fn has_stash(&self, repo: &RepoHandle) -> Result<bool>;
}

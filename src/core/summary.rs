//! Per-repository status record

use std::path::PathBuf;

use serde::Serialize;

use super::config::StatusFilter;
use crate::git::{BranchDivergence, RepoState, WorkingTreeChanges};

/// Snapshot of one repository, built once per scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    pub path: PathBuf,
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
    /// Upstream branch, `None` when no upstream is configured
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    /// Other local branches that differ from their upstream
    pub diverged_branches: Vec<BranchDivergence>,
    /// Staged or unstaged modifications to tracked files
    pub is_dirty: bool,
    pub staged: usize,
    pub unstaged: usize,
    pub conflicted: usize,
    pub untracked: usize,
    pub stashed: bool,
    pub bare: bool,
    /// Why the repository could not be opened or queried
    pub error: Option<String>,
}

impl RepositorySummary {
    /// Summary of a repository that could not be read
    pub fn errored(path: PathBuf, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(path)
        }
    }

    /// Summary of a bare repository
    pub fn bare(path: PathBuf, branch: Option<String>, stashed: bool) -> Self {
        Self {
            branch,
            stashed,
            bare: true,
            ..Self::empty(path)
        }
    }

    pub(crate) fn empty(path: PathBuf) -> Self {
        Self {
            path,
            branch: None,
            upstream: None,
            ahead: 0,
            behind: 0,
            diverged_branches: Vec::new(),
            is_dirty: false,
            staged: 0,
            unstaged: 0,
            conflicted: 0,
            untracked: 0,
            stashed: false,
            bare: false,
            error: None,
        }
    }

    pub(crate) fn with_changes(mut self, changes: WorkingTreeChanges) -> Self {
        self.is_dirty = changes.is_dirty();
        self.staged = changes.staged;
        self.unstaged = changes.unstaged;
        self.conflicted = changes.conflicted;
        self
    }

    pub fn is_errored(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.branch.is_none() && !self.is_errored()
    }

    /// The current branch or any other local branch differs from its upstream
    pub fn is_out_of_sync(&self) -> bool {
        self.ahead > 0 || self.behind > 0 || !self.diverged_branches.is_empty()
    }

    pub fn state(&self) -> RepoState {
        if self.is_errored() {
            RepoState::Errored
        } else if self.bare {
            RepoState::Bare
        } else {
            match (self.is_dirty, self.is_out_of_sync()) {
                (true, true) => RepoState::DirtyOutOfSync,
                (true, false) => RepoState::Dirty,
                (false, true) => RepoState::OutOfSync,
                (false, false) => RepoState::Clean,
            }
        }
    }

    /// Whether this summary passes `filter`
    pub fn matches(&self, filter: StatusFilter) -> bool {
        let readable = !self.is_errored();
        match filter {
            StatusFilter::All => true,
            StatusFilter::Ok => readable && !self.is_dirty,
            StatusFilter::Ko => readable && self.is_dirty,
            StatusFilter::Remote => readable && self.is_out_of_sync(),
            StatusFilter::Nok => readable && (self.is_dirty || self.is_out_of_sync()),
            StatusFilter::Unknown => !readable,
        }
    }
}

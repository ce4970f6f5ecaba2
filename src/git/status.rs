//! Repository state enumeration and utilities

use serde::Serialize;

/// Overall state of a scanned repository
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RepoState {
    /// Clean working tree, level with its upstream (or no upstream)
    Clean,
    /// Staged or unstaged modifications
    Dirty,
    /// Ahead of or behind its upstream
    OutOfSync,
    /// Both dirty and out of sync
    DirtyOutOfSync,
    /// Repository without a working tree
    Bare,
    /// Repository could not be opened or queried
    Errored,
}

impl RepoState {
    /// Returns the emoji symbol for this state
    pub fn symbol(&self) -> &str {
        match self {
            RepoState::Clean => "🟢",
            RepoState::OutOfSync => "🟡",
            RepoState::Dirty | RepoState::DirtyOutOfSync => "🔴",
            RepoState::Bare => "🟠",
            RepoState::Errored => "⚠️",
        }
    }

    /// Returns the text representation of this state, as serialized to JSON
    pub fn text(&self) -> &str {
        match self {
            RepoState::Clean => "clean",
            RepoState::Dirty => "dirty",
            RepoState::OutOfSync => "out-of-sync",
            RepoState::DirtyOutOfSync => "dirty-out-of-sync",
            RepoState::Bare => "bare",
            RepoState::Errored => "errored",
        }
    }
}
